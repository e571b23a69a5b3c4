pub mod config;
pub mod http_client;
pub mod logging;
pub mod payload_normalizer;
pub mod trade_date;

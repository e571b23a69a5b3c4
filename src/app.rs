use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::utils::config::SyncConfig;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn build_pool(cfg: &SyncConfig) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(cfg.database_url.clone());
    let pool = Pool::builder()
        .max_size(cfg.db_pool_size)
        .build(manager)?;
    Ok(pool)
}

/// 启动时执行尚未应用的迁移，建表并声明唯一约束
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("数据库迁移失败: {e}"))?;
    if !applied.is_empty() {
        tracing::info!("已应用 {} 个数据库迁移", applied.len());
    }
    Ok(())
}

//! Database layer: pool, schema and the Postgres user store.

mod pool;
mod repositories;

pub use pool::{create_pool, ensure_schema, DbPool};
pub use repositories::PgUserStore;

/// Database layer for CampaignHub
///
/// - `pool`: PostgreSQL connection pool construction, health check and shutdown
/// - `migrations`: Embedded schema migrations
///
/// Models live in the `models` module at crate root level.

pub mod migrations;
pub mod pool;

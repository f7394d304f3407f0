/// Database models for CampaignHub
///
/// Each model carries its own queries. Every query is generic over
/// `sqlx::PgExecutor`, so services can run them on the pool or inside a
/// transaction.
///
/// # Models
///
/// - `user`: Artist accounts
/// - `campaign`: Campaigns and their status enum
/// - `campaign_task`: Per-campaign to-do items
/// - `waitlist`: Pre-launch signups

pub mod campaign;
pub mod campaign_task;
pub mod user;
pub mod waitlist;

pub use campaign::{Campaign, CampaignStatus, CreateCampaign, UpdateCampaign};
pub use campaign_task::{CampaignTask, CreateCampaignTask};
pub use user::{CreateUser, User};
pub use waitlist::WaitlistEntry;

/// Service layer
///
/// One service per resource. Each holds a clone of the pool it was built
/// with; every call checks out a connection (or opens a transaction for
/// writes) for its own duration only.
///
/// - `user`: Artist signup and lookup
/// - `campaign`: Campaigns, progress updates and campaign tasks
/// - `waitlist`: Pre-launch waitlist

pub mod campaign;
pub mod user;
pub mod waitlist;

pub use campaign::CampaignService;
pub use user::UserService;
pub use waitlist::{JoinOutcome, WaitlistService, WaitlistStats};

use sqlx::PgPool;

/// All services, built from one pool at bootstrap
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub campaigns: CampaignService,
    pub waitlist: WaitlistService,
}

impl Services {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserService::new(pool.clone()),
            campaigns: CampaignService::new(pool.clone()),
            waitlist: WaitlistService::new(pool),
        }
    }
}

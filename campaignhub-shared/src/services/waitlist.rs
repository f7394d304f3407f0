//! Waitlist business logic: idempotent join, stats, listing.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::error::{is_unique_violation, ServiceError, ServiceResult};
use crate::models::WaitlistEntry;
use crate::validation::{email_fits, is_valid_email, normalize_email, MAX_EMAIL_LEN};

/// Result of a join request
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// A new entry was inserted
    ///
    /// `position` is the waitlist size right after the insert, i.e. the
    /// 1-based rank of this signup.
    Joined { entry: WaitlistEntry, position: i64 },

    /// The email was already on the list; nothing was written
    AlreadyJoined { entry: WaitlistEntry },
}

impl JoinOutcome {
    pub fn entry(&self) -> &WaitlistEntry {
        match self {
            JoinOutcome::Joined { entry, .. } | JoinOutcome::AlreadyJoined { entry } => entry,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, JoinOutcome::Joined { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitlistStats {
    pub total_signups: i64,
    pub status: &'static str,
}

#[derive(Clone)]
pub struct WaitlistService {
    pool: PgPool,
}

impl WaitlistService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds an email to the waitlist, or returns the existing entry
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the email is malformed or too long
    /// - `Conflict` if a concurrent join inserted the same email between the
    ///   lookup and the insert
    #[instrument(skip_all)]
    pub async fn join_waitlist(&self, email: &str) -> ServiceResult<JoinOutcome> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ServiceError::invalid_input("Valid email address is required"));
        }
        if !email_fits(&email) {
            return Err(ServiceError::invalid_input(format!(
                "Email must be at most {} characters",
                MAX_EMAIL_LEN
            )));
        }

        let mut tx = self.pool.begin().await?;

        if let Some(entry) = WaitlistEntry::find_by_email(&mut *tx, &email).await? {
            info!(entry_id = entry.id, "Email already on the waitlist");
            return Ok(JoinOutcome::AlreadyJoined { entry });
        }

        let entry = WaitlistEntry::create(&mut *tx, &email, Utc::now())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    warn!("Concurrent waitlist join hit the email constraint");
                    ServiceError::conflict("Email is already on the waitlist")
                } else {
                    e.into()
                }
            })?;

        let position = WaitlistEntry::count_total(&mut *tx).await?;

        tx.commit().await?;

        info!(entry_id = entry.id, position, "New waitlist signup");
        Ok(JoinOutcome::Joined { entry, position })
    }

    #[instrument(skip(self))]
    pub async fn get_waitlist_stats(&self) -> ServiceResult<WaitlistStats> {
        let total_signups = WaitlistEntry::count_total(&self.pool).await?;

        Ok(WaitlistStats {
            total_signups,
            status: "active",
        })
    }

    /// All entries, most recent first
    #[instrument(skip(self))]
    pub async fn get_all_waitlist_entries(&self) -> ServiceResult<Vec<WaitlistEntry>> {
        Ok(WaitlistEntry::list_all(&self.pool).await?)
    }
}

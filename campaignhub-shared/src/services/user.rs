//! User business logic: signup, lookup, listing.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::error::{is_unique_violation, ServiceError, ServiceResult};
use crate::models::{Campaign, CreateUser, User};
use crate::validation::{
    email_fits, is_valid_email, normalize_email, trim_optional, MAX_EMAIL_LEN, MAX_NAME_LEN,
};

const DUPLICATE_EMAIL: &str = "User with this email already exists";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a user from a raw email and optional artist name
    ///
    /// The email is trimmed and lower-cased before validation and storage; the
    /// artist name is trimmed and dropped if blank.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the email is malformed or too long, or the artist
    ///   name is too long or contains NUL
    /// - `Conflict` if a user already has this email, including when a
    ///   concurrent insert wins the race
    #[instrument(skip_all)]
    pub async fn create_user(&self, email: &str, artist_name: Option<&str>) -> ServiceResult<User> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ServiceError::invalid_input("Invalid email format"));
        }
        if !email_fits(&email) {
            return Err(ServiceError::invalid_input(format!(
                "Email must be at most {} characters",
                MAX_EMAIL_LEN
            )));
        }

        let artist_name = trim_optional(artist_name)?;
        if artist_name
            .as_deref()
            .is_some_and(|name| name.chars().count() > MAX_NAME_LEN)
        {
            return Err(ServiceError::invalid_input(format!(
                "Artist name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        let mut tx = self.pool.begin().await?;

        if User::find_by_email(&mut *tx, &email).await?.is_some() {
            warn!("Rejected signup for an email that already has a user");
            return Err(ServiceError::conflict(DUPLICATE_EMAIL));
        }

        let user = User::create(
            &mut *tx,
            CreateUser {
                email,
                artist_name,
                created_at: Utc::now(),
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("Concurrent signup hit the users email constraint");
                ServiceError::conflict(DUPLICATE_EMAIL)
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        info!(user_id = user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: i64) -> ServiceResult<User> {
        User::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Every user, in insertion order
    #[instrument(skip(self))]
    pub async fn get_all_users(&self) -> ServiceResult<Vec<User>> {
        Ok(User::list_all(&self.pool).await?)
    }

    /// Campaigns owned by a user, in insertion order
    #[instrument(skip(self))]
    pub async fn get_user_campaigns(&self, user_id: i64) -> ServiceResult<Vec<Campaign>> {
        let mut conn = self.pool.acquire().await?;

        if !User::exists(&mut *conn, user_id).await? {
            return Err(ServiceError::not_found("User"));
        }

        Ok(Campaign::list_by_user(&mut *conn, user_id).await?)
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A one-time token bound to a user, redeemed for account confirmation or a password reset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Token {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Token {
    pub fn new(token: String, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            user_id,
            created_at: Utc::now(),
        }
    }

    /// A token is expired once `ttl_minutes` have elapsed since it was issued.
    pub fn is_expired(&self, ttl_minutes: i64) -> bool {
        Utc::now() - self.created_at >= Duration::minutes(ttl_minutes)
    }
}

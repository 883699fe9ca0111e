//! Gallery users. Accounts are provisioned elsewhere; the catalog only
//! needs the public url and display name.

use gallery_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub url: String,
    pub display_name: String,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255))]
    pub url: String,
    #[validate(length(min = 1, max = 255))]
    pub display_name: String,
    #[validate(email)]
    pub email: Option<String>,
}

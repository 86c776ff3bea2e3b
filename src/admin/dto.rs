use serde::Serialize;
use time::OffsetDateTime;

use crate::{auth::claims::Role, db::User, portfolio::dto::PositionView};

/// User as listed to admins; the password hash never leaves the store layer.
#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for AdminUserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            role: u.role(),
            email: u.email,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct UserPortfolio {
    pub user_id: i64,
    pub email: String,
    pub portfolio: Vec<PositionView>,
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::Admin;
use crate::schemas::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AdminLogin {
    #[validate(length(min = 1, max = 150, message = "username must not be empty"))]
    pub(crate) username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            full_name: admin.full_name,
            is_active: admin.is_active,
            created_at: format_primitive(admin.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) admin: AdminResponse,
}

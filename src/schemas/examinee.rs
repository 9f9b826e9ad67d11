use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::pagination::default_limit;
use crate::db::models::Examinee;
use crate::schemas::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamineeCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1..100 characters"))]
    pub(crate) name: String,
    #[serde(alias = "lastName")]
    #[validate(length(min = 1, max = 100, message = "last_name must be 1..100 characters"))]
    pub(crate) last_name: String,
    #[serde(default, alias = "middleName")]
    #[validate(length(max = 100, message = "middle_name must be at most 100 characters"))]
    pub(crate) middle_name: Option<String>,
    #[validate(length(min = 3, max = 20, message = "phone must be 3..20 characters"))]
    pub(crate) phone: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamineeUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "name must be 1..100 characters"))]
    pub(crate) name: Option<String>,
    #[serde(default, alias = "lastName")]
    #[validate(length(min = 1, max = 100, message = "last_name must be 1..100 characters"))]
    pub(crate) last_name: Option<String>,
    #[serde(default, alias = "middleName")]
    #[validate(length(max = 100, message = "middle_name must be at most 100 characters"))]
    pub(crate) middle_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 3, max = 20, message = "phone must be 3..20 characters"))]
    pub(crate) phone: Option<String>,
}

/// Public lookup by full name; every part is required.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamineeLookup {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub(crate) name: String,
    #[serde(default, alias = "lastName")]
    #[validate(length(min = 1, message = "last_name is required"))]
    pub(crate) last_name: String,
    #[serde(default, alias = "middleName")]
    #[validate(length(min = 1, message = "middle_name is required"))]
    pub(crate) middle_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExamineeListQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamineeResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) last_name: String,
    pub(crate) middle_name: Option<String>,
    pub(crate) phone: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<Examinee> for ExamineeResponse {
    fn from(examinee: Examinee) -> Self {
        Self {
            id: examinee.id,
            name: examinee.name,
            last_name: examinee.last_name,
            middle_name: examinee.middle_name,
            phone: examinee.phone,
            created_at: format_primitive(examinee.created_at),
            updated_at: format_primitive(examinee.updated_at),
        }
    }
}

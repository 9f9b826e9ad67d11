use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

pub(crate) mod auth;
pub(crate) mod content;
pub(crate) mod examinee;
pub(crate) mod mock;
pub(crate) mod result;

pub(crate) use crate::core::time::{format_date, format_primitive};

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) today: String,
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    crate::core::time::parse_date(&raw)
        .map_err(|_| serde::de::Error::custom("date must be formatted as YYYY-MM-DD"))
}

pub(crate) fn deserialize_option_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            crate::core::time::parse_date(&raw)
                .map_err(|_| serde::de::Error::custom("date must be formatted as YYYY-MM-DD"))
        })
        .transpose()
}

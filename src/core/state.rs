use std::sync::Arc;

use sqlx::PgPool;
use time::Date;

use crate::core::{config::Settings, redis::RedisHandle, time::today_at_offset};

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, redis: RedisHandle) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, redis }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    /// Calendar day used for every mock activation and delivery decision.
    pub(crate) fn exam_today(&self) -> Date {
        today_at_offset(self.inner.settings.exam().timezone_offset_hours)
    }
}

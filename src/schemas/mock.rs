use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::pagination::default_limit;
use crate::db::{models::Mock, types::MockStatus};
use crate::repositories::mocks::MockContentIds;
use crate::schemas::{deserialize_date, deserialize_option_date, format_date, format_primitive};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MockCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: String,
    #[validate(range(min = 1, message = "number must be positive"))]
    pub(crate) number: i32,
    #[serde(default)]
    pub(crate) status: Option<MockStatus>,
    #[serde(alias = "examDate", deserialize_with = "deserialize_date")]
    pub(crate) exam_date: time::Date,
    #[serde(default, alias = "durationMinutes")]
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub(crate) duration_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MockUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "number must be positive"))]
    pub(crate) number: Option<i32>,
    #[serde(default)]
    pub(crate) status: Option<MockStatus>,
    #[serde(default, alias = "examDate", deserialize_with = "deserialize_option_date")]
    pub(crate) exam_date: Option<time::Date>,
    #[serde(default, alias = "durationMinutes")]
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub(crate) duration_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MockContentUpdate {
    #[serde(default, alias = "readingTests")]
    pub(crate) reading_tests: Vec<String>,
    #[serde(default, alias = "listeningTests")]
    pub(crate) listening_tests: Vec<String>,
    #[serde(default, alias = "speakingTests")]
    pub(crate) speaking_tests: Vec<String>,
    #[serde(default, alias = "writingTests")]
    pub(crate) writing_tests: Vec<String>,
}

impl From<MockContentUpdate> for MockContentIds {
    fn from(payload: MockContentUpdate) -> Self {
        let dedup = |mut ids: Vec<String>| {
            ids.sort();
            ids.dedup();
            ids
        };
        Self {
            reading: dedup(payload.reading_tests),
            listening: dedup(payload.listening_tests),
            speaking: dedup(payload.speaking_tests),
            writing: dedup(payload.writing_tests),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MockListQuery {
    #[serde(default)]
    pub(crate) status: Option<MockStatus>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct MockResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) number: i32,
    pub(crate) status: MockStatus,
    pub(crate) exam_date: String,
    pub(crate) duration_minutes: i32,
    pub(crate) reading_tests: Vec<String>,
    pub(crate) listening_tests: Vec<String>,
    pub(crate) speaking_tests: Vec<String>,
    pub(crate) writing_tests: Vec<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl MockResponse {
    pub(crate) fn new(mock: Mock, content: MockContentIds) -> Self {
        Self {
            id: mock.id,
            title: mock.title,
            number: mock.number,
            status: mock.status,
            exam_date: format_date(mock.exam_date),
            duration_minutes: mock.duration_minutes,
            reading_tests: content.reading,
            listening_tests: content.listening,
            speaking_tests: content.speaking,
            writing_tests: content.writing,
            created_at: format_primitive(mock.created_at),
            updated_at: format_primitive(mock.updated_at),
        }
    }
}

/// Public view of the mock served today.
#[derive(Debug, Serialize)]
pub(crate) struct TodayMockResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) number: i32,
    pub(crate) exam_date: String,
    pub(crate) duration_minutes: i32,
    pub(crate) reading_tests: Vec<String>,
    pub(crate) listening_tests: Vec<String>,
    pub(crate) speaking_tests: Vec<String>,
    pub(crate) writing_tests: Vec<String>,
}

impl TodayMockResponse {
    pub(crate) fn new(mock: Mock, content: MockContentIds) -> Self {
        Self {
            id: mock.id,
            title: mock.title,
            number: mock.number,
            exam_date: format_date(mock.exam_date),
            duration_minutes: mock.duration_minutes,
            reading_tests: content.reading,
            listening_tests: content.listening,
            speaking_tests: content.speaking,
            writing_tests: content.writing,
        }
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::pagination::default_limit;
use crate::db::models::{BandScore, TestResult};
use crate::schemas::examinee::ExamineeResponse;
use crate::schemas::format_primitive;
use crate::services::banding::RawScores;

#[derive(Debug, Deserialize)]
pub(crate) struct TestResultCreate {
    #[serde(alias = "userId", alias = "user")]
    pub(crate) user_id: String,
    #[serde(default, alias = "mockId", alias = "mock")]
    pub(crate) mock_id: Option<String>,
    #[serde(default, alias = "readingCorrectAnswers")]
    pub(crate) reading_correct_answers: i32,
    #[serde(default, alias = "listeningCorrectAnswers")]
    pub(crate) listening_correct_answers: i32,
    #[serde(default, alias = "speakingScore")]
    pub(crate) speaking_score: Decimal,
    #[serde(default, alias = "writingScore")]
    pub(crate) writing_score: Decimal,
}

impl TestResultCreate {
    pub(crate) fn raw_scores(&self) -> RawScores {
        RawScores {
            reading_correct: self.reading_correct_answers,
            listening_correct: self.listening_correct_answers,
            speaking_score: self.speaking_score,
            writing_score: self.writing_score,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TestResultUpdate {
    #[serde(default, alias = "mockId", deserialize_with = "deserialize_some")]
    pub(crate) mock_id: Option<Option<String>>,
    #[serde(default, alias = "readingCorrectAnswers")]
    pub(crate) reading_correct_answers: Option<i32>,
    #[serde(default, alias = "listeningCorrectAnswers")]
    pub(crate) listening_correct_answers: Option<i32>,
    #[serde(default, alias = "speakingScore")]
    pub(crate) speaking_score: Option<Decimal>,
    #[serde(default, alias = "writingScore")]
    pub(crate) writing_score: Option<Decimal>,
}

/// Distinguishes an explicit `null` from an absent field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TestResultListQuery {
    #[serde(default, alias = "userId")]
    pub(crate) user_id: Option<String>,
    #[serde(default, alias = "mockId")]
    pub(crate) mock_id: Option<String>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BandScoreListQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct BandScoreResponse {
    pub(crate) test_result_id: String,
    pub(crate) reading_band: Decimal,
    pub(crate) listening_band: Decimal,
    pub(crate) speaking_band: Decimal,
    pub(crate) writing_band: Decimal,
    pub(crate) overall_band: Decimal,
    pub(crate) computed_at: String,
}

impl From<BandScore> for BandScoreResponse {
    fn from(score: BandScore) -> Self {
        Self {
            test_result_id: score.test_result_id,
            reading_band: score.reading_band,
            listening_band: score.listening_band,
            speaking_band: score.speaking_band,
            writing_band: score.writing_band,
            overall_band: score.overall_band,
            computed_at: format_primitive(score.computed_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TestResultResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) mock_id: Option<String>,
    pub(crate) reading_correct_answers: i32,
    pub(crate) listening_correct_answers: i32,
    pub(crate) speaking_score: Decimal,
    pub(crate) writing_score: Decimal,
    pub(crate) test_date: String,
    pub(crate) updated_at: String,
    pub(crate) band_score: Option<BandScoreResponse>,
}

impl TestResultResponse {
    pub(crate) fn new(result: TestResult, band_score: Option<BandScore>) -> Self {
        Self {
            id: result.id,
            user_id: result.user_id,
            mock_id: result.mock_id,
            reading_correct_answers: result.reading_correct_answers,
            listening_correct_answers: result.listening_correct_answers,
            speaking_score: result.speaking_score,
            writing_score: result.writing_score,
            test_date: format_primitive(result.test_date),
            updated_at: format_primitive(result.updated_at),
            band_score: band_score.map(BandScoreResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamineeResultsResponse {
    pub(crate) user: ExamineeResponse,
    pub(crate) results: Vec<TestResultResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamineeBandsResponse {
    pub(crate) user: ExamineeResponse,
    pub(crate) band_score: BandScoreResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_missing_mock() {
        let missing: TestResultUpdate = serde_json::from_str("{}").expect("parse");
        assert_eq!(missing.mock_id, None);

        let cleared: TestResultUpdate = serde_json::from_str(r#"{"mock_id": null}"#).expect("parse");
        assert_eq!(cleared.mock_id, Some(None));

        let set: TestResultUpdate = serde_json::from_str(r#"{"mockId": "m-1"}"#).expect("parse");
        assert_eq!(set.mock_id, Some(Some("m-1".to_string())));
    }

    #[test]
    fn create_accepts_numeric_and_string_scores() {
        let payload: TestResultCreate = serde_json::from_str(
            r#"{"user_id": "u", "reading_correct_answers": 30, "speaking_score": 6.5, "writing_score": "7.0"}"#,
        )
        .expect("parse");

        let raw = payload.raw_scores();
        assert_eq!(raw.reading_correct, 30);
        assert_eq!(raw.listening_correct, 0);
        assert_eq!(raw.speaking_score, Decimal::new(65, 1));
        assert_eq!(raw.writing_score, Decimal::new(70, 1));
    }
}

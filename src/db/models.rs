use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::{ListeningQuestionType, MockStatus, ReadingQuestionType};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Admin {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// A person sitting mock exams. Stored in `users`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Examinee {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) last_name: String,
    pub(crate) middle_name: Option<String>,
    pub(crate) phone: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Mock {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) number: i32,
    pub(crate) status: MockStatus,
    pub(crate) exam_date: Date,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestResult {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) mock_id: Option<String>,
    pub(crate) reading_correct_answers: i32,
    pub(crate) listening_correct_answers: i32,
    pub(crate) speaking_score: Decimal,
    pub(crate) writing_score: Decimal,
    pub(crate) test_date: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub(crate) struct BandScore {
    pub(crate) test_result_id: String,
    pub(crate) reading_band: Decimal,
    pub(crate) listening_band: Decimal,
    pub(crate) speaking_band: Decimal,
    pub(crate) writing_band: Decimal,
    pub(crate) overall_band: Decimal,
    pub(crate) computed_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ReadingTest {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ReadingPassage {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) instruction: String,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) passage_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ReadingQuestion {
    pub(crate) id: String,
    pub(crate) passage_id: String,
    pub(crate) instruction: Option<String>,
    pub(crate) question_type: ReadingQuestionType,
    pub(crate) question_text: String,
    pub(crate) question_number: i32,
    pub(crate) options: Option<Json<serde_json::Value>>,
    pub(crate) summary_text: Option<String>,
    pub(crate) diagram_labels: Option<Json<serde_json::Value>>,
    pub(crate) paragraph_mapping: Option<Json<serde_json::Value>>,
    pub(crate) correct_answer: Json<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionTable {
    pub(crate) id: String,
    pub(crate) reading_question_id: Option<String>,
    pub(crate) listening_question_id: Option<String>,
    pub(crate) columns: Json<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionTableRow {
    pub(crate) id: String,
    pub(crate) table_id: String,
    pub(crate) row_data: Json<Vec<String>>,
    pub(crate) row_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionTableAnswer {
    pub(crate) id: String,
    pub(crate) table_id: String,
    pub(crate) number: i32,
    pub(crate) correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ListeningTest {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ListeningSection {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) section_number: i32,
    pub(crate) instruction: Option<String>,
    pub(crate) start_time_seconds: Option<i32>,
    pub(crate) end_time_seconds: Option<i32>,
    pub(crate) audio_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ListeningQuestion {
    pub(crate) id: String,
    pub(crate) section_id: String,
    pub(crate) question_number: i32,
    pub(crate) question_type: ListeningQuestionType,
    pub(crate) question_text: String,
    pub(crate) options: Option<Json<serde_json::Value>>,
    pub(crate) correct_answer: Json<serde_json::Value>,
    pub(crate) instruction: Option<String>,
    pub(crate) map_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SpeakingTest {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SpeakingQuestion {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) title: String,
    pub(crate) question_text: String,
    pub(crate) position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SpeakingCueCard {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) topic: String,
    pub(crate) description: String,
    pub(crate) position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct WritingTest {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct WritingTask1 {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) question_text: String,
    pub(crate) image: Option<String>,
    pub(crate) position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct WritingTask2 {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) question_text: String,
    pub(crate) position: i32,
}

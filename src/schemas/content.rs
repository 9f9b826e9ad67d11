use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::types::{ListeningQuestionType, ReadingQuestionType};

const fn default_reading_duration() -> i32 {
    60
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TableAnswerCreate {
    #[validate(range(min = 0, message = "answer number must be non-negative"))]
    pub(crate) number: i32,
    #[serde(alias = "correctAnswer")]
    #[validate(length(min = 1, max = 255, message = "correct_answer must be 1..255 characters"))]
    pub(crate) correct_answer: String,
}

/// Completion table. Rows carry `[[n]]` placeholders that the answers fill.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionTableCreate {
    #[validate(length(min = 1, message = "columns must not be empty"))]
    pub(crate) columns: Vec<String>,
    #[serde(default)]
    pub(crate) rows: Vec<Vec<String>>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) answers: Vec<TableAnswerCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ReadingQuestionCreate {
    #[serde(alias = "questionNumber")]
    #[validate(range(min = 0, message = "question_number must be non-negative"))]
    pub(crate) question_number: i32,
    #[serde(alias = "questionType")]
    pub(crate) question_type: ReadingQuestionType,
    #[serde(default)]
    pub(crate) instruction: Option<String>,
    #[serde(alias = "questionText")]
    pub(crate) question_text: String,
    #[serde(default)]
    pub(crate) options: Option<serde_json::Value>,
    #[serde(default, alias = "summaryText")]
    pub(crate) summary_text: Option<String>,
    #[serde(default, alias = "diagramLabels")]
    pub(crate) diagram_labels: Option<serde_json::Value>,
    #[serde(default, alias = "paragraphMapping")]
    pub(crate) paragraph_mapping: Option<serde_json::Value>,
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: serde_json::Value,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) table: Option<QuestionTableCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PassageCreate {
    #[validate(range(min = 0, message = "order must be non-negative"))]
    pub(crate) order: i32,
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) instruction: String,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: String,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<ReadingQuestionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ReadingTestCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: String,
    #[serde(default = "default_reading_duration", alias = "durationMinutes")]
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub(crate) duration_minutes: i32,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) passages: Vec<PassageCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ListeningQuestionCreate {
    #[serde(alias = "questionNumber")]
    #[validate(range(min = 0, message = "question_number must be non-negative"))]
    pub(crate) question_number: i32,
    #[serde(alias = "questionType")]
    pub(crate) question_type: ListeningQuestionType,
    #[serde(alias = "questionText")]
    pub(crate) question_text: String,
    #[serde(default)]
    pub(crate) options: Option<serde_json::Value>,
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: serde_json::Value,
    #[serde(default)]
    pub(crate) instruction: Option<String>,
    #[serde(default, alias = "mapImage")]
    pub(crate) map_image: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) table: Option<QuestionTableCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ListeningSectionCreate {
    #[serde(alias = "sectionNumber")]
    #[validate(range(min = 0, message = "section_number must be non-negative"))]
    pub(crate) section_number: i32,
    #[serde(default)]
    pub(crate) instruction: Option<String>,
    #[serde(default, alias = "startTime", alias = "start_time")]
    #[validate(range(min = 0, message = "start_time must be non-negative"))]
    pub(crate) start_time_seconds: Option<i32>,
    #[serde(default, alias = "endTime", alias = "end_time")]
    #[validate(range(min = 0, message = "end_time must be non-negative"))]
    pub(crate) end_time_seconds: Option<i32>,
    #[serde(default, alias = "audioFile")]
    pub(crate) audio_file: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<ListeningQuestionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ListeningTestCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) sections: Vec<ListeningSectionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SpeakingQuestionCreate {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(alias = "questionText")]
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub(crate) question_text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CueCardCreate {
    #[validate(length(min = 1, max = 255, message = "topic must be 1..255 characters"))]
    pub(crate) topic: String,
    pub(crate) description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SpeakingTestCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) part1: Vec<SpeakingQuestionCreate>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) part2: Vec<CueCardCreate>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) part3: Vec<SpeakingQuestionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct WritingTaskCreate {
    #[serde(alias = "questionText")]
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub(crate) question_text: String,
    #[serde(default)]
    pub(crate) image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct WritingTestCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) task1: Vec<WritingTaskCreate>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) task2: Vec<WritingTaskCreate>,
}

// Read views. `correct_answer` and table `answers` are only filled for admins.

#[derive(Debug, Serialize)]
pub(crate) struct TableRowView {
    pub(crate) id: String,
    pub(crate) order: i32,
    pub(crate) row_data: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TableAnswerView {
    pub(crate) id: String,
    pub(crate) number: i32,
    pub(crate) correct_answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionTableView {
    pub(crate) id: String,
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<TableRowView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) answers: Option<Vec<TableAnswerView>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadingQuestionView {
    pub(crate) id: String,
    pub(crate) question_number: i32,
    pub(crate) question_type: ReadingQuestionType,
    pub(crate) instruction: Option<String>,
    pub(crate) question_text: String,
    pub(crate) options: Option<serde_json::Value>,
    pub(crate) summary_text: Option<String>,
    pub(crate) diagram_labels: Option<serde_json::Value>,
    pub(crate) paragraph_mapping: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correct_answer: Option<serde_json::Value>,
    pub(crate) table: Option<QuestionTableView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PassageView {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) order: i32,
    pub(crate) title: String,
    pub(crate) instruction: String,
    pub(crate) text: String,
    pub(crate) questions: Vec<ReadingQuestionView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadingTestView {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: String,
    pub(crate) passages: Vec<PassageView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListeningQuestionView {
    pub(crate) id: String,
    pub(crate) question_number: i32,
    pub(crate) question_type: ListeningQuestionType,
    pub(crate) question_text: String,
    pub(crate) instruction: Option<String>,
    pub(crate) options: Option<serde_json::Value>,
    pub(crate) map_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correct_answer: Option<serde_json::Value>,
    pub(crate) table: Option<QuestionTableView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListeningSectionView {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) section_number: i32,
    pub(crate) instruction: Option<String>,
    pub(crate) start_time: Option<i32>,
    pub(crate) end_time: Option<i32>,
    pub(crate) audio_file: Option<String>,
    pub(crate) questions: Vec<ListeningQuestionView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListeningTestView {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: String,
    pub(crate) sections: Vec<ListeningSectionView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SpeakingQuestionView {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) question_text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CueCardView {
    pub(crate) id: String,
    pub(crate) topic: String,
    pub(crate) description: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SpeakingTestView {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: String,
    pub(crate) part1: Vec<SpeakingQuestionView>,
    pub(crate) part2: Vec<CueCardView>,
    pub(crate) part3: Vec<SpeakingQuestionView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WritingTaskView {
    pub(crate) id: String,
    pub(crate) question_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) image: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WritingTestView {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: String,
    pub(crate) task1: Vec<WritingTaskView>,
    pub(crate) task2: Vec<WritingTaskView>,
}

/// Summary row for admin content listings.
#[derive(Debug, Serialize)]
pub(crate) struct ContentSummary {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: String,
}

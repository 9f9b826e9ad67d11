use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "mockstatus", rename_all = "lowercase")]
pub(crate) enum MockStatus {
    Pending,
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "readingquestiontype", rename_all = "snake_case")]
pub(crate) enum ReadingQuestionType {
    MultipleChoice,
    TrueFalseNotGiven,
    MatchingHeadings,
    SentenceCompletion,
    SummaryCompletion,
    DiagramLabeling,
    ShortAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "listeningquestiontype", rename_all = "snake_case")]
pub(crate) enum ListeningQuestionType {
    MultipleChoice,
    FormCompletion,
    TableCompletion,
    NoteCompletion,
    MapLabelling,
    Matching,
    SentenceCompletion,
    ShortAnswer,
}

//! Nested creation and assembly of exam content.
//!
//! Creation writes a whole test tree in one transaction. Assembly loads children in batches
//! (one query per level) and stitches them together in memory.

use std::collections::{BTreeSet, HashMap};

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{
    ListeningSection, ListeningTest, QuestionTable, ReadingPassage, ReadingTest, SpeakingCueCard,
    SpeakingQuestion, SpeakingTest, WritingTask1, WritingTask2, WritingTest,
};
use crate::repositories::question_tables::{self, TableOwner};
use crate::repositories::speaking::QuestionPart;
use crate::repositories::{listening, reading, speaking, writing};
use crate::schemas::content::{
    CueCardView, ListeningQuestionView, ListeningSectionView, ListeningTestCreate,
    ListeningTestView, PassageView, QuestionTableCreate, QuestionTableView, ReadingQuestionView,
    ReadingTestCreate, ReadingTestView, SpeakingQuestionView, SpeakingTestCreate,
    SpeakingTestView, TableAnswerView, TableRowView, WritingTaskView, WritingTestCreate,
    WritingTestView,
};
use crate::schemas::format_primitive;

#[derive(Debug, Error)]
pub(crate) enum ContentError {
    #[error("{0}")]
    Invalid(String),
    #[error("Duplicate {0}")]
    Duplicate(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Whether assembled views carry correct answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Answers {
    Hidden,
    Revealed,
}

impl Answers {
    fn reveal<T>(self, value: T) -> Option<T> {
        match self {
            Answers::Revealed => Some(value),
            Answers::Hidden => None,
        }
    }
}

/// Numbers of every `[[n]]` placeholder appearing in the table rows.
pub(crate) fn table_placeholders(rows: &[Vec<String>]) -> BTreeSet<i32> {
    let mut numbers = BTreeSet::new();
    for cell in rows.iter().flatten() {
        let mut rest = cell.as_str();
        while let Some(start) = rest.find("[[") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("]]") else { break };
            if let Ok(number) = after[..end].trim().parse::<i32>() {
                numbers.insert(number);
            }
            rest = &after[end + 2..];
        }
    }
    numbers
}

/// Every answer must fill a placeholder, and no placeholder may be answered twice.
pub(crate) fn check_table(table: &QuestionTableCreate) -> Result<(), ContentError> {
    let placeholders = table_placeholders(&table.rows);
    let mut seen = BTreeSet::new();

    for answer in &table.answers {
        if answer.number < 0 {
            return Err(ContentError::Invalid(format!(
                "Table answer [[{}]] must not be negative",
                answer.number
            )));
        }
        if !seen.insert(answer.number) {
            return Err(ContentError::Invalid(format!(
                "Table answer [[{}]] is given more than once",
                answer.number
            )));
        }
        if !placeholders.contains(&answer.number) {
            return Err(ContentError::Invalid(format!(
                "Table answer [[{}]] has no matching placeholder in the rows",
                answer.number
            )));
        }
    }
    Ok(())
}

fn map_unique(err: sqlx::Error, what: &'static str) -> ContentError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ContentError::Duplicate(what)
        }
        _ => ContentError::Database(err),
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

async fn insert_table(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    owner: TableOwner<'_>,
    table: &QuestionTableCreate,
) -> Result<(), ContentError> {
    let table_id = new_id();
    question_tables::create(&mut **tx, &table_id, owner, &table.columns).await?;

    for (row_order, row) in table.rows.iter().enumerate() {
        question_tables::add_row(&mut **tx, &new_id(), &table_id, row, row_order as i32).await?;
    }
    for answer in &table.answers {
        question_tables::add_answer(
            &mut **tx,
            &new_id(),
            &table_id,
            answer.number,
            &answer.correct_answer,
        )
        .await
        .map_err(|err| map_unique(err, "table answer number"))?;
    }
    Ok(())
}

pub(crate) async fn create_reading_test(
    pool: &PgPool,
    payload: &ReadingTestCreate,
) -> Result<ReadingTest, ContentError> {
    for question in payload.passages.iter().flat_map(|passage| &passage.questions) {
        if let Some(table) = &question.table {
            check_table(table)?;
        }
    }

    let mut tx = pool.begin().await?;
    let test = reading::create_test(
        &mut *tx,
        &new_id(),
        payload.title.trim(),
        payload.duration_minutes,
        primitive_now_utc(),
    )
    .await?;

    for passage in &payload.passages {
        let passage_id = new_id();
        reading::create_passage(
            &mut *tx,
            reading::CreatePassage {
                id: &passage_id,
                test_id: &test.id,
                instruction: &passage.instruction,
                title: &passage.title,
                text: &passage.text,
                passage_order: passage.order,
            },
        )
        .await
        .map_err(|err| map_unique(err, "passage order"))?;

        for question in &passage.questions {
            let question_id = new_id();
            reading::create_question(
                &mut *tx,
                reading::CreateQuestion {
                    id: &question_id,
                    passage_id: &passage_id,
                    instruction: question.instruction.as_deref(),
                    question_type: question.question_type,
                    question_text: &question.question_text,
                    question_number: question.question_number,
                    options: question.options.as_ref(),
                    summary_text: question.summary_text.as_deref(),
                    diagram_labels: question.diagram_labels.as_ref(),
                    paragraph_mapping: question.paragraph_mapping.as_ref(),
                    correct_answer: &question.correct_answer,
                },
            )
            .await?;

            if let Some(table) = &question.table {
                insert_table(&mut tx, TableOwner::Reading(&question_id), table).await?;
            }
        }
    }

    tx.commit().await?;
    tracing::info!(test_id = %test.id, passages = payload.passages.len(), "Reading test created");
    Ok(test)
}

pub(crate) async fn create_listening_test(
    pool: &PgPool,
    payload: &ListeningTestCreate,
) -> Result<ListeningTest, ContentError> {
    for section in &payload.sections {
        if let (Some(start), Some(end)) = (section.start_time_seconds, section.end_time_seconds) {
            if end < start {
                return Err(ContentError::Invalid(format!(
                    "Section {} ends before it starts",
                    section.section_number
                )));
            }
        }
        for table in section.questions.iter().filter_map(|question| question.table.as_ref()) {
            check_table(table)?;
        }
    }

    let mut tx = pool.begin().await?;
    let test =
        listening::create_test(&mut *tx, &new_id(), payload.title.trim(), primitive_now_utc())
            .await?;

    for section in &payload.sections {
        let section_id = new_id();
        listening::create_section(
            &mut *tx,
            listening::CreateSection {
                id: &section_id,
                test_id: &test.id,
                section_number: section.section_number,
                instruction: section.instruction.as_deref(),
                start_time_seconds: section.start_time_seconds,
                end_time_seconds: section.end_time_seconds,
                audio_file: section.audio_file.as_deref(),
            },
        )
        .await
        .map_err(|err| map_unique(err, "section number"))?;

        for question in &section.questions {
            let question_id = new_id();
            listening::create_question(
                &mut *tx,
                listening::CreateQuestion {
                    id: &question_id,
                    section_id: &section_id,
                    question_number: question.question_number,
                    question_type: question.question_type,
                    question_text: &question.question_text,
                    options: question.options.as_ref(),
                    correct_answer: &question.correct_answer,
                    instruction: question.instruction.as_deref(),
                    map_image: question.map_image.as_deref(),
                },
            )
            .await
            .map_err(|err| map_unique(err, "question number"))?;

            if let Some(table) = &question.table {
                insert_table(&mut tx, TableOwner::Listening(&question_id), table).await?;
            }
        }
    }

    tx.commit().await?;
    tracing::info!(test_id = %test.id, sections = payload.sections.len(), "Listening test created");
    Ok(test)
}

pub(crate) async fn create_speaking_test(
    pool: &PgPool,
    payload: &SpeakingTestCreate,
) -> Result<SpeakingTest, ContentError> {
    let mut tx = pool.begin().await?;
    let test =
        speaking::create_test(&mut *tx, &new_id(), payload.title.trim(), primitive_now_utc())
            .await?;

    for (part, questions) in [(QuestionPart::One, &payload.part1), (QuestionPart::Three, &payload.part3)]
    {
        for (position, question) in questions.iter().enumerate() {
            let row = SpeakingQuestion {
                id: new_id(),
                test_id: test.id.clone(),
                title: question.title.clone(),
                question_text: question.question_text.clone(),
                position: position as i32,
            };
            speaking::add_question(&mut *tx, part, &row).await?;
        }
    }
    for (position, card) in payload.part2.iter().enumerate() {
        let row = SpeakingCueCard {
            id: new_id(),
            test_id: test.id.clone(),
            topic: card.topic.clone(),
            description: card.description.clone(),
            position: position as i32,
        };
        speaking::add_cue_card(&mut *tx, &row).await?;
    }

    tx.commit().await?;
    tracing::info!(test_id = %test.id, "Speaking test created");
    Ok(test)
}

pub(crate) async fn create_writing_test(
    pool: &PgPool,
    payload: &WritingTestCreate,
) -> Result<WritingTest, ContentError> {
    let mut tx = pool.begin().await?;
    let test =
        writing::create_test(&mut *tx, &new_id(), payload.title.trim(), primitive_now_utc())
            .await?;

    for (position, task) in payload.task1.iter().enumerate() {
        let row = WritingTask1 {
            id: new_id(),
            test_id: test.id.clone(),
            question_text: task.question_text.clone(),
            image: task.image.clone(),
            position: position as i32,
        };
        writing::add_task1(&mut *tx, &row).await?;
    }
    for (position, task) in payload.task2.iter().enumerate() {
        let row = WritingTask2 {
            id: new_id(),
            test_id: test.id.clone(),
            question_text: task.question_text.clone(),
            position: position as i32,
        };
        writing::add_task2(&mut *tx, &row).await?;
    }

    tx.commit().await?;
    tracing::info!(test_id = %test.id, "Writing test created");
    Ok(test)
}

enum TableQuestions<'a> {
    Reading(&'a [String]),
    Listening(&'a [String]),
}

/// Tables keyed by the id of the question that owns them.
async fn load_tables(
    pool: &PgPool,
    questions: TableQuestions<'_>,
    answers: Answers,
) -> Result<HashMap<String, QuestionTableView>, sqlx::Error> {
    let tables: Vec<QuestionTable> = match questions {
        TableQuestions::Reading(ids) => question_tables::list_for_reading_questions(pool, ids).await?,
        TableQuestions::Listening(ids) => {
            question_tables::list_for_listening_questions(pool, ids).await?
        }
    };
    if tables.is_empty() {
        return Ok(HashMap::new());
    }

    let table_ids: Vec<String> = tables.iter().map(|table| table.id.clone()).collect();
    let mut rows_by_table: HashMap<String, Vec<TableRowView>> = HashMap::new();
    for row in question_tables::rows_for_tables(pool, &table_ids).await? {
        rows_by_table.entry(row.table_id).or_default().push(TableRowView {
            id: row.id,
            order: row.row_order,
            row_data: row.row_data.0,
        });
    }

    let mut answers_by_table: HashMap<String, Vec<TableAnswerView>> = HashMap::new();
    if answers == Answers::Revealed {
        for answer in question_tables::answers_for_tables(pool, &table_ids).await? {
            answers_by_table.entry(answer.table_id).or_default().push(TableAnswerView {
                id: answer.id,
                number: answer.number,
                correct_answer: answer.correct_answer,
            });
        }
    }

    let mut by_question = HashMap::new();
    for table in tables {
        let Some(question_id) = table.reading_question_id.or(table.listening_question_id) else {
            continue;
        };
        let view = QuestionTableView {
            rows: rows_by_table.remove(&table.id).unwrap_or_default(),
            answers: answers.reveal(answers_by_table.remove(&table.id).unwrap_or_default()),
            id: table.id,
            columns: table.columns.0,
        };
        by_question.insert(question_id, view);
    }
    Ok(by_question)
}

pub(crate) async fn assemble_passages(
    pool: &PgPool,
    passages: Vec<ReadingPassage>,
    answers: Answers,
) -> Result<Vec<PassageView>, sqlx::Error> {
    let passage_ids: Vec<String> = passages.iter().map(|passage| passage.id.clone()).collect();
    let questions = reading::questions_for_passages(pool, &passage_ids).await?;
    let question_ids: Vec<String> = questions.iter().map(|question| question.id.clone()).collect();
    let mut tables = load_tables(pool, TableQuestions::Reading(&question_ids), answers).await?;

    let mut by_passage: HashMap<String, Vec<ReadingQuestionView>> = HashMap::new();
    for question in questions {
        let table = tables.remove(&question.id);
        by_passage.entry(question.passage_id).or_default().push(ReadingQuestionView {
            id: question.id,
            question_number: question.question_number,
            question_type: question.question_type,
            instruction: question.instruction,
            question_text: question.question_text,
            options: question.options.map(|value| value.0),
            summary_text: question.summary_text,
            diagram_labels: question.diagram_labels.map(|value| value.0),
            paragraph_mapping: question.paragraph_mapping.map(|value| value.0),
            correct_answer: answers.reveal(question.correct_answer.0),
            table,
        });
    }

    Ok(passages
        .into_iter()
        .map(|passage| PassageView {
            questions: by_passage.remove(&passage.id).unwrap_or_default(),
            id: passage.id,
            test_id: passage.test_id,
            order: passage.passage_order,
            title: passage.title,
            instruction: passage.instruction,
            text: passage.text,
        })
        .collect())
}

pub(crate) async fn assemble_reading_tests(
    pool: &PgPool,
    tests: Vec<ReadingTest>,
    answers: Answers,
) -> Result<Vec<ReadingTestView>, sqlx::Error> {
    let test_ids: Vec<String> = tests.iter().map(|test| test.id.clone()).collect();
    let passages = reading::passages_for_tests(pool, &test_ids).await?;

    let mut by_test: HashMap<String, Vec<PassageView>> = HashMap::new();
    for passage in assemble_passages(pool, passages, answers).await? {
        by_test.entry(passage.test_id.clone()).or_default().push(passage);
    }

    Ok(tests
        .into_iter()
        .map(|test| ReadingTestView {
            passages: by_test.remove(&test.id).unwrap_or_default(),
            id: test.id,
            title: test.title,
            duration_minutes: test.duration_minutes,
            created_at: format_primitive(test.created_at),
        })
        .collect())
}

pub(crate) async fn assemble_sections(
    pool: &PgPool,
    sections: Vec<ListeningSection>,
    answers: Answers,
) -> Result<Vec<ListeningSectionView>, sqlx::Error> {
    let section_ids: Vec<String> = sections.iter().map(|section| section.id.clone()).collect();
    let questions = listening::questions_for_sections(pool, &section_ids).await?;
    let question_ids: Vec<String> = questions.iter().map(|question| question.id.clone()).collect();
    let mut tables = load_tables(pool, TableQuestions::Listening(&question_ids), answers).await?;

    let mut by_section: HashMap<String, Vec<ListeningQuestionView>> = HashMap::new();
    for question in questions {
        let table = tables.remove(&question.id);
        by_section.entry(question.section_id).or_default().push(ListeningQuestionView {
            id: question.id,
            question_number: question.question_number,
            question_type: question.question_type,
            question_text: question.question_text,
            instruction: question.instruction,
            options: question.options.map(|value| value.0),
            map_image: question.map_image,
            correct_answer: answers.reveal(question.correct_answer.0),
            table,
        });
    }

    Ok(sections
        .into_iter()
        .map(|section| ListeningSectionView {
            questions: by_section.remove(&section.id).unwrap_or_default(),
            id: section.id,
            test_id: section.test_id,
            section_number: section.section_number,
            instruction: section.instruction,
            start_time: section.start_time_seconds,
            end_time: section.end_time_seconds,
            audio_file: section.audio_file,
        })
        .collect())
}

pub(crate) async fn assemble_listening_tests(
    pool: &PgPool,
    tests: Vec<ListeningTest>,
    answers: Answers,
) -> Result<Vec<ListeningTestView>, sqlx::Error> {
    let test_ids: Vec<String> = tests.iter().map(|test| test.id.clone()).collect();
    let sections = listening::sections_for_tests(pool, &test_ids).await?;

    let mut by_test: HashMap<String, Vec<ListeningSectionView>> = HashMap::new();
    for section in assemble_sections(pool, sections, answers).await? {
        by_test.entry(section.test_id.clone()).or_default().push(section);
    }

    Ok(tests
        .into_iter()
        .map(|test| ListeningTestView {
            sections: by_test.remove(&test.id).unwrap_or_default(),
            id: test.id,
            title: test.title,
            created_at: format_primitive(test.created_at),
        })
        .collect())
}

fn group_questions(questions: Vec<SpeakingQuestion>) -> HashMap<String, Vec<SpeakingQuestionView>> {
    let mut grouped: HashMap<String, Vec<SpeakingQuestionView>> = HashMap::new();
    for question in questions {
        grouped.entry(question.test_id).or_default().push(SpeakingQuestionView {
            id: question.id,
            title: question.title,
            question_text: question.question_text,
        });
    }
    grouped
}

pub(crate) async fn assemble_speaking_tests(
    pool: &PgPool,
    tests: Vec<SpeakingTest>,
) -> Result<Vec<SpeakingTestView>, sqlx::Error> {
    let test_ids: Vec<String> = tests.iter().map(|test| test.id.clone()).collect();
    let mut part1 =
        group_questions(speaking::questions_for_tests(pool, QuestionPart::One, &test_ids).await?);
    let mut part3 =
        group_questions(speaking::questions_for_tests(pool, QuestionPart::Three, &test_ids).await?);

    let mut part2: HashMap<String, Vec<CueCardView>> = HashMap::new();
    for card in speaking::cue_cards_for_tests(pool, &test_ids).await? {
        part2.entry(card.test_id).or_default().push(CueCardView {
            id: card.id,
            topic: card.topic,
            description: card.description,
        });
    }

    Ok(tests
        .into_iter()
        .map(|test| SpeakingTestView {
            part1: part1.remove(&test.id).unwrap_or_default(),
            part2: part2.remove(&test.id).unwrap_or_default(),
            part3: part3.remove(&test.id).unwrap_or_default(),
            id: test.id,
            title: test.title,
            created_at: format_primitive(test.created_at),
        })
        .collect())
}

pub(crate) async fn assemble_writing_tests(
    pool: &PgPool,
    tests: Vec<WritingTest>,
) -> Result<Vec<WritingTestView>, sqlx::Error> {
    let test_ids: Vec<String> = tests.iter().map(|test| test.id.clone()).collect();

    let mut task1: HashMap<String, Vec<WritingTaskView>> = HashMap::new();
    for task in writing::task1_for_tests(pool, &test_ids).await? {
        task1.entry(task.test_id).or_default().push(WritingTaskView {
            id: task.id,
            question_text: task.question_text,
            image: task.image,
        });
    }
    let mut task2: HashMap<String, Vec<WritingTaskView>> = HashMap::new();
    for task in writing::task2_for_tests(pool, &test_ids).await? {
        task2.entry(task.test_id).or_default().push(WritingTaskView {
            id: task.id,
            question_text: task.question_text,
            image: None,
        });
    }

    Ok(tests
        .into_iter()
        .map(|test| WritingTestView {
            task1: task1.remove(&test.id).unwrap_or_default(),
            task2: task2.remove(&test.id).unwrap_or_default(),
            id: test.id,
            title: test.title,
            created_at: format_primitive(test.created_at),
        })
        .collect())
}

//! Mock lifecycle: normalization and validation on every save, the single-active rule and
//! selection of the mock served on a given day.

use sqlx::PgPool;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::core::{metrics, time::primitive_now_utc};
use crate::db::{models::Mock, types::MockStatus};
use crate::repositories::mocks::{self, CreateMock, UpdateMock};

const NUMBER_UNIQUE_CONSTRAINT: &str = "mocks_number_key";
const SINGLE_ACTIVE_INDEX: &str = "ux_mocks_single_active";

#[derive(Debug, Error)]
pub(crate) enum ActivationError {
    #[error("Mock #{number} is already active. Deactivate it before activating another mock.")]
    AnotherMockActive { number: i32 },
    #[error("Exam date {exam_date} is in the past; only an inactive mock may keep it")]
    ExamDateInPast { exam_date: Date },
    #[error("A mock with number {0} already exists")]
    DuplicateNumber(i32),
    #[error("Mock not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub(crate) enum ServableMockError {
    #[error("No exam is available today")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// The fields of a mock that its lifecycle rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lifecycle {
    pub(crate) status: MockStatus,
    pub(crate) exam_date: Date,
}

pub(crate) struct NewMock {
    pub(crate) title: String,
    pub(crate) number: i32,
    pub(crate) status: MockStatus,
    pub(crate) exam_date: Date,
    pub(crate) duration_minutes: i32,
}

#[derive(Debug, Default)]
pub(crate) struct MockChanges {
    pub(crate) title: Option<String>,
    pub(crate) number: Option<i32>,
    pub(crate) status: Option<MockStatus>,
    pub(crate) exam_date: Option<Date>,
    pub(crate) duration_minutes: Option<i32>,
}

pub(crate) enum MockSave {
    Create(NewMock),
    Update { id: String, changes: MockChanges },
}

#[derive(Debug)]
pub(crate) struct SavedMock {
    pub(crate) mock: Mock,
    /// Set when a past exam date forced the mock to inactive.
    pub(crate) expired: bool,
    pub(crate) deactivated: Vec<String>,
}

/// A mock whose exam date has passed is inactive, whatever status was requested.
pub(crate) fn normalize_on_save(lifecycle: Lifecycle, today: Date) -> Lifecycle {
    if lifecycle.exam_date < today {
        Lifecycle { status: MockStatus::Inactive, ..lifecycle }
    } else {
        lifecycle
    }
}

/// Rules checked after normalization. `other_active` is the number of a different mock that is
/// still active for today or a later day.
pub(crate) fn validate_for_save(
    lifecycle: Lifecycle,
    today: Date,
    other_active: Option<i32>,
) -> Result<(), ActivationError> {
    if lifecycle.status == MockStatus::Active {
        if let Some(number) = other_active {
            return Err(ActivationError::AnotherMockActive { number });
        }
    }

    if lifecycle.exam_date < today && lifecycle.status != MockStatus::Inactive {
        return Err(ActivationError::ExamDateInPast { exam_date: lifecycle.exam_date });
    }

    Ok(())
}

/// Creates or updates a mock under the activation lock.
///
/// Saves are serialized by a transaction-scoped advisory lock, so the single-active check,
/// the deactivation of other mocks and the write itself are observed atomically.
pub(crate) async fn save_mock(
    pool: &PgPool,
    save: MockSave,
    today: Date,
) -> Result<SavedMock, ActivationError> {
    let result = save_locked(pool, save, today).await;

    match &result {
        Ok(saved) => {
            metrics::record_mock_save(if saved.expired { "expired" } else { "saved" });
            metrics::record_mock_deactivations(saved.deactivated.len() as u64);
        }
        Err(ActivationError::AnotherMockActive { .. }) => {
            metrics::record_mock_save("rejected_active")
        }
        Err(ActivationError::ExamDateInPast { .. }) => metrics::record_mock_save("rejected_date"),
        Err(_) => metrics::record_mock_save("failed"),
    }

    result
}

async fn save_locked(
    pool: &PgPool,
    save: MockSave,
    today: Date,
) -> Result<SavedMock, ActivationError> {
    let mut tx = pool.begin().await?;
    mocks::lock_for_save(&mut *tx).await?;

    let (id, existing, title, number, requested, duration_minutes) = match save {
        MockSave::Create(new) => (
            Uuid::new_v4().to_string(),
            None,
            new.title,
            new.number,
            Lifecycle { status: new.status, exam_date: new.exam_date },
            new.duration_minutes,
        ),
        MockSave::Update { id, changes } => {
            let current = mocks::find_by_id_for_update(&mut *tx, &id)
                .await?
                .ok_or(ActivationError::NotFound)?;
            let requested = Lifecycle {
                status: changes.status.unwrap_or(current.status),
                exam_date: changes.exam_date.unwrap_or(current.exam_date),
            };
            (
                id,
                Some(current.status),
                changes.title.unwrap_or(current.title),
                changes.number.unwrap_or(current.number),
                requested,
                changes.duration_minutes.unwrap_or(current.duration_minutes),
            )
        }
    };

    let lifecycle = normalize_on_save(requested, today);
    let expired = lifecycle.status != requested.status;

    let other_active = if lifecycle.status == MockStatus::Active {
        mocks::find_other_current_active(&mut *tx, &id, today).await?.map(|mock| mock.number)
    } else {
        None
    };
    validate_for_save(lifecycle, today, other_active)?;

    let now = primitive_now_utc();
    let deactivated = if lifecycle.status == MockStatus::Active {
        mocks::deactivate_others(&mut *tx, &id, now).await?
    } else {
        Vec::new()
    };

    let written = match existing {
        None => {
            mocks::create(
                &mut *tx,
                CreateMock {
                    id: &id,
                    title: &title,
                    number,
                    status: lifecycle.status,
                    exam_date: lifecycle.exam_date,
                    duration_minutes,
                    created_at: now,
                    updated_at: now,
                },
            )
            .await
        }
        Some(_) => {
            mocks::update(
                &mut *tx,
                &id,
                UpdateMock {
                    title: &title,
                    number,
                    status: lifecycle.status,
                    exam_date: lifecycle.exam_date,
                    duration_minutes,
                    updated_at: now,
                },
            )
            .await
        }
    };
    let mock = written.map_err(|err| map_write_error(err, number))?;

    tx.commit().await?;

    if expired {
        tracing::info!(
            mock_id = %mock.id,
            exam_date = %mock.exam_date,
            "Mock exam date has passed; saved as inactive"
        );
    }
    if existing == Some(MockStatus::Inactive) && mock.status == MockStatus::Active {
        tracing::info!(mock_id = %mock.id, number = mock.number, "Inactive mock re-activated");
    }
    if !deactivated.is_empty() {
        tracing::info!(
            mock_id = %mock.id,
            deactivated = ?deactivated,
            "Deactivated previously active mocks"
        );
    }

    Ok(SavedMock { mock, expired, deactivated })
}

fn map_write_error(err: sqlx::Error, number: i32) -> ActivationError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some(NUMBER_UNIQUE_CONSTRAINT) => return ActivationError::DuplicateNumber(number),
            Some(SINGLE_ACTIVE_INDEX) => return ActivationError::AnotherMockActive { number },
            _ => {}
        }
    }
    ActivationError::Database(err)
}

/// The mock delivered to examinees on `today`: active and dated exactly today.
pub(crate) async fn select_servable_mock(
    pool: &PgPool,
    today: Date,
) -> Result<Mock, ServableMockError> {
    mocks::find_servable(pool, today).await?.ok_or(ServableMockError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 05 - 10);

    fn lifecycle(status: MockStatus, exam_date: Date) -> Lifecycle {
        Lifecycle { status, exam_date }
    }

    #[test]
    fn past_date_forces_inactive() {
        for status in [MockStatus::Pending, MockStatus::Active, MockStatus::Inactive] {
            let normalized = normalize_on_save(lifecycle(status, date!(2024 - 05 - 09)), TODAY);
            assert_eq!(normalized.status, MockStatus::Inactive, "from {status:?}");
        }
    }

    #[test]
    fn today_and_future_dates_keep_requested_status() {
        for exam_date in [TODAY, date!(2024 - 06 - 01)] {
            for status in [MockStatus::Pending, MockStatus::Active, MockStatus::Inactive] {
                let input = lifecycle(status, exam_date);
                assert_eq!(normalize_on_save(input, TODAY), input);
            }
        }
    }

    #[test]
    fn second_active_mock_is_rejected() {
        let err = validate_for_save(lifecycle(MockStatus::Active, TODAY), TODAY, Some(7))
            .expect_err("rejected");
        assert!(matches!(err, ActivationError::AnotherMockActive { number: 7 }));
    }

    #[test]
    fn other_active_mock_does_not_block_non_active_saves() {
        for status in [MockStatus::Pending, MockStatus::Inactive] {
            assert!(validate_for_save(lifecycle(status, TODAY), TODAY, Some(7)).is_ok());
        }
    }

    #[test]
    fn past_date_is_rejected_unless_inactive() {
        let past = date!(2024 - 01 - 01);
        assert!(matches!(
            validate_for_save(lifecycle(MockStatus::Pending, past), TODAY, None),
            Err(ActivationError::ExamDateInPast { .. })
        ));
        assert!(validate_for_save(lifecycle(MockStatus::Inactive, past), TODAY, None).is_ok());
    }

    #[test]
    fn normalized_past_mock_always_validates() {
        let normalized = normalize_on_save(lifecycle(MockStatus::Active, date!(2023 - 12 - 31)), TODAY);
        assert!(validate_for_save(normalized, TODAY, Some(3)).is_ok());
    }

    fn new_mock(number: i32, status: MockStatus, exam_date: Date) -> MockSave {
        MockSave::Create(NewMock {
            title: format!("Mock {number}"),
            number,
            status,
            exam_date,
            duration_minutes: 180,
        })
    }

    async fn active_ids(pool: &PgPool) -> Vec<String> {
        sqlx::query_scalar::<_, String>("SELECT id FROM mocks WHERE status = 'active'")
            .fetch_all(pool)
            .await
            .expect("active ids")
    }

    #[tokio::test]
    async fn activating_while_another_is_current_is_rejected() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let today = ctx.state.exam_today();

        let first = save_mock(pool, new_mock(1, MockStatus::Active, today), today)
            .await
            .expect("first");
        let err = save_mock(pool, new_mock(2, MockStatus::Active, today), today)
            .await
            .expect_err("second rejected");

        assert!(matches!(err, ActivationError::AnotherMockActive { number: 1 }));
        assert_eq!(active_ids(pool).await, vec![first.mock.id]);
    }

    #[tokio::test]
    async fn stale_active_mock_is_flipped_when_another_activates() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let today = ctx.state.exam_today();
        let yesterday = today.previous_day().expect("yesterday");

        let stale = save_mock(pool, new_mock(1, MockStatus::Active, yesterday), yesterday)
            .await
            .expect("stale");
        let fresh = save_mock(pool, new_mock(2, MockStatus::Active, today), today)
            .await
            .expect("fresh");

        assert_eq!(fresh.deactivated, vec![stale.mock.id.clone()]);
        assert_eq!(active_ids(pool).await, vec![fresh.mock.id]);
    }

    #[tokio::test]
    async fn saving_with_past_date_persists_inactive() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let today = ctx.state.exam_today();
        let last_week = today - time::Duration::days(7);

        let saved = save_mock(pool, new_mock(4, MockStatus::Active, last_week), today)
            .await
            .expect("saved");

        assert!(saved.expired);
        assert_eq!(saved.mock.status, MockStatus::Inactive);
        let stored = mocks::find_by_id(pool, &saved.mock.id).await.expect("find").expect("row");
        assert_eq!(stored.status, MockStatus::Inactive);
    }

    #[tokio::test]
    async fn stored_mocks_expire_on_next_save_after_their_date() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let today = ctx.state.exam_today();
        let yesterday = today.previous_day().expect("yesterday");

        for (number, status) in [(30, MockStatus::Active), (31, MockStatus::Pending)] {
            let stored = save_mock(pool, new_mock(number, status, yesterday), yesterday)
                .await
                .expect("stored");
            assert_eq!(stored.mock.status, status);

            let saved = save_mock(
                pool,
                MockSave::Update {
                    id: stored.mock.id.clone(),
                    changes: MockChanges {
                        title: Some(format!("Renamed {number}")),
                        ..MockChanges::default()
                    },
                },
                today,
            )
            .await
            .expect("updated");

            assert!(saved.expired, "from {status:?}");
            assert_eq!(saved.mock.status, MockStatus::Inactive);
            assert_eq!(saved.mock.exam_date, yesterday);
            let row = mocks::find_by_id(pool, &stored.mock.id).await.expect("find").expect("row");
            assert_eq!(row.status, MockStatus::Inactive);
            assert_eq!(row.title, format!("Renamed {number}"));
        }
    }

    #[tokio::test]
    async fn update_merges_changes_and_reactivates() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let today = ctx.state.exam_today();

        let saved = save_mock(pool, new_mock(5, MockStatus::Inactive, today), today)
            .await
            .expect("created");
        let updated = save_mock(
            pool,
            MockSave::Update {
                id: saved.mock.id.clone(),
                changes: MockChanges { status: Some(MockStatus::Active), ..MockChanges::default() },
            },
            today,
        )
        .await
        .expect("updated");

        assert_eq!(updated.mock.status, MockStatus::Active);
        assert_eq!(updated.mock.title, "Mock 5");
        assert_eq!(updated.mock.exam_date, today);
    }

    #[tokio::test]
    async fn duplicate_number_is_reported() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let today = ctx.state.exam_today();

        save_mock(pool, new_mock(9, MockStatus::Pending, today), today).await.expect("first");
        let err = save_mock(pool, new_mock(9, MockStatus::Pending, today), today)
            .await
            .expect_err("duplicate");

        assert!(matches!(err, ActivationError::DuplicateNumber(9)));
    }

    #[tokio::test]
    async fn concurrent_activations_leave_one_active() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db().clone();
        let today = ctx.state.exam_today();

        let (first, second) = tokio::join!(
            save_mock(&pool, new_mock(11, MockStatus::Active, today), today),
            save_mock(&pool, new_mock(12, MockStatus::Active, today), today),
        );

        assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(active_ids(&pool).await.len(), 1);
    }

    #[tokio::test]
    async fn servable_mock_requires_active_and_today() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let today = ctx.state.exam_today();
        let tomorrow = today.next_day().expect("tomorrow");

        assert!(matches!(
            select_servable_mock(pool, today).await,
            Err(ServableMockError::NotFound)
        ));

        save_mock(pool, new_mock(20, MockStatus::Pending, today), today).await.expect("pending");
        let future = save_mock(pool, new_mock(21, MockStatus::Active, tomorrow), today)
            .await
            .expect("future");
        assert!(matches!(
            select_servable_mock(pool, today).await,
            Err(ServableMockError::NotFound)
        ));

        let servable = select_servable_mock(pool, tomorrow).await.expect("servable");
        assert_eq!(servable.id, future.mock.id);
    }
}

//! Task aggregate and field validation tests.

use super::SteppingClock;
use crate::identity::domain::IdentityId;
use crate::task::domain::{
    DurationHours, FieldUpdate, PagePolicy, PageRequest, Task, TaskDescription, TaskDomainError,
    TaskDraft, TaskPriority, TaskStatus, TaskTitle, TaskUpdate,
};
use chrono::Duration;
use mockable::Clock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> SteppingClock {
    SteppingClock::new()
}

fn task(clock: &SteppingClock) -> Task {
    let draft = TaskDraft::new(TaskTitle::new("Write report").expect("valid title"));
    Task::new(IdentityId::new(), draft, clock)
}

#[rstest]
#[case("", TaskDomainError::EmptyTitle)]
#[case("   \t ", TaskDomainError::EmptyTitle)]
#[case("line\nbreak", TaskDomainError::UnprintableTitle)]
#[case("bell\u{7}", TaskDomainError::UnprintableTitle)]
fn title_rejects_invalid_values(#[case] raw: &str, #[case] expected: TaskDomainError) {
    assert_eq!(TaskTitle::new(raw), Err(expected));
}

#[rstest]
fn title_is_trimmed_and_bounded() {
    assert_eq!(
        TaskTitle::new("  Write report ").expect("valid").as_str(),
        "Write report"
    );
    assert!(TaskTitle::new("x".repeat(TaskTitle::MAX_LENGTH)).is_ok());
    assert_eq!(
        TaskTitle::new("x".repeat(TaskTitle::MAX_LENGTH + 1)),
        Err(TaskDomainError::TitleTooLong(TaskTitle::MAX_LENGTH + 1))
    );
}

#[rstest]
fn description_length_is_counted_in_characters() {
    assert!(TaskDescription::new("é".repeat(TaskDescription::MAX_LENGTH)).is_ok());
    let err = TaskDescription::new("é".repeat(TaskDescription::MAX_LENGTH + 1))
        .expect_err("too long");
    assert_eq!(err.field(), "description");
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(999, true)]
#[case(1_000, false)]
fn duration_hours_range(#[case] hours: u64, #[case] valid: bool) {
    assert_eq!(DurationHours::new(hours).is_ok(), valid);
}

#[rstest]
#[case("pending", TaskStatus::Pending)]
#[case("IN_PROGRESS", TaskStatus::InProgress)]
#[case(" completed ", TaskStatus::Completed)]
fn status_parses_case_insensitively(#[case] raw: &str, #[case] expected: TaskStatus) {
    assert_eq!(TaskStatus::try_from(raw), Ok(expected));
}

#[rstest]
fn priority_rejects_unknown_values() {
    assert!(TaskPriority::try_from("critical").is_err());
    assert_eq!(TaskPriority::try_from("Urgent"), Ok(TaskPriority::Urgent));
}

#[rstest]
fn new_task_is_pending_without_suggestions(clock: SteppingClock) {
    let task = task(&clock);

    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(task.ai_priority(), None);
    assert_eq!(task.ai_estimated_duration(), None);
    assert_eq!(task.completed_at(), None);
    assert_eq!(task.created_at(), task.updated_at());
}

#[rstest]
fn completing_stamps_once_and_reopening_clears(clock: SteppingClock) {
    let mut task = task(&clock);

    clock.advance(Duration::minutes(5));
    task.apply_update(TaskUpdate::new().with_status(TaskStatus::Completed), &clock);
    let stamped = task.completed_at().expect("completion stamped");
    assert_eq!(stamped, task.updated_at());

    clock.advance(Duration::minutes(5));
    task.apply_update(TaskUpdate::new().with_status(TaskStatus::Completed), &clock);
    assert_eq!(task.completed_at(), Some(stamped));

    clock.advance(Duration::minutes(5));
    task.apply_update(TaskUpdate::new().with_status(TaskStatus::InProgress), &clock);
    assert_eq!(task.completed_at(), None);
}

#[rstest]
fn empty_update_still_refreshes_updated_at(clock: SteppingClock) {
    let mut task = task(&clock);
    let before = task.updated_at();

    clock.advance(Duration::seconds(30));
    task.apply_update(TaskUpdate::new(), &clock);

    assert!(task.updated_at() > before);
    assert_eq!(task.title().as_str(), "Write report");
}

#[rstest]
fn updated_at_never_moves_backwards(clock: SteppingClock) {
    let mut task = task(&clock);
    let before = task.updated_at();

    clock.rewind(Duration::hours(1));
    task.apply_update(TaskUpdate::new().with_status(TaskStatus::InProgress), &clock);

    assert_eq!(task.updated_at(), before);
}

#[rstest]
fn nullable_fields_can_be_set_and_cleared(clock: SteppingClock) {
    let mut task = task(&clock);
    let deadline = clock.utc() + Duration::days(2);

    task.apply_update(
        TaskUpdate::new()
            .with_priority(FieldUpdate::Set(TaskPriority::High))
            .with_deadline(FieldUpdate::Set(deadline))
            .with_description(FieldUpdate::Set(
                TaskDescription::new("Q4 summary").expect("valid"),
            )),
        &clock,
    );
    assert_eq!(task.priority(), Some(TaskPriority::High));
    assert_eq!(task.deadline(), Some(deadline));
    assert!(task.description().is_some());

    task.apply_update(
        TaskUpdate::new()
            .with_priority(FieldUpdate::Clear)
            .with_deadline(FieldUpdate::Clear),
        &clock,
    );
    assert_eq!(task.priority(), None);
    assert_eq!(task.deadline(), None);
    assert!(task.description().is_some());
}

#[rstest]
fn overdue_requires_past_deadline_and_open_status(clock: SteppingClock) {
    let mut task = task(&clock);
    let deadline = clock.utc() + Duration::hours(1);
    task.apply_update(TaskUpdate::new().with_deadline(FieldUpdate::Set(deadline)), &clock);

    assert!(!task.is_overdue(deadline - Duration::minutes(1)));
    assert!(task.is_overdue(deadline + Duration::minutes(1)));

    task.apply_update(TaskUpdate::new().with_status(TaskStatus::Completed), &clock);
    assert!(!task.is_overdue(deadline + Duration::minutes(1)));
}

#[rstest]
#[case(None, 20)]
#[case(Some(0), 1)]
#[case(Some(50), 50)]
#[case(Some(10_000), 100)]
fn page_limit_is_clamped(#[case] requested: Option<u32>, #[case] expected: u32) {
    let page = PageRequest::new(0, requested, &PagePolicy::default());
    assert_eq!(page.limit(), expected);
}

#[rstest]
fn page_policy_keeps_default_within_max() {
    let policy = PagePolicy::new(500, 50);
    assert_eq!(policy.default_limit(), 50);
    assert_eq!(PagePolicy::new(5, 0).max_limit(), 1);
}

#[rstest]
fn field_update_from_nullable() {
    assert_eq!(FieldUpdate::<u8>::from_nullable(None), FieldUpdate::Unchanged);
    assert_eq!(FieldUpdate::<u8>::from_nullable(Some(None)), FieldUpdate::Clear);
    assert_eq!(FieldUpdate::from_nullable(Some(Some(3_u8))), FieldUpdate::Set(3));
}

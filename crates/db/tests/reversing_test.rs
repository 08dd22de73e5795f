//! Integration tests for the reversing-entry schedule.

mod common;

use common::{account, ctx, date, post, setup_seeded};
use ledgerbook_core::ledger::{LedgerError, LineInput};
use ledgerbook_core::reversal::{ApprovalStatus, QueueStatus};
use ledgerbook_db::{
    PeriodRepository, PostingRepository, ReversingRepository, ScheduleOptions, SkipReason,
};
use ledgerbook_shared::types::{EntryId, QueueItemId};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

/// Posts an accrual on January 31 and schedules its reversal for
/// February 1.
async fn schedule_accrual(
    db: &DatabaseConnection,
    opts: ScheduleOptions,
) -> (EntryId, QueueItemId) {
    let expense = account(db, "Salaries Expense").await;
    let payable = account(db, "Salaries Payable").await;
    let entry_id = post(
        db,
        date(2025, 1, 31),
        "Accrued salaries",
        vec![LineInput::debit(expense, dec!(400)), LineInput::credit(payable, dec!(400))],
    )
    .await;
    let item = ReversingRepository::new(db.clone())
        .schedule(&ctx(), entry_id, date(2025, 2, 1), opts)
        .await
        .unwrap();
    (entry_id, QueueItemId::new(item.id))
}

/// Makes "February 2025" the current period so reversals dated
/// February 1 have somewhere to land.
async fn open_february(db: &DatabaseConnection) {
    PeriodRepository::new(db.clone())
        .create_period(&ctx(), "February 2025", Some(date(2025, 2, 1)), Some(date(2025, 2, 28)), true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_item_not_yet_due_is_skipped() {
    let db = setup_seeded().await;
    let (_, queue_id) = schedule_accrual(&db, ScheduleOptions::default()).await;

    let outcome = ReversingRepository::new(db.clone())
        .process_schedule(&ctx(), date(2025, 1, 31))
        .await
        .unwrap();
    assert!(outcome.completed.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].queue_id, queue_id);
    assert_eq!(outcome.skipped[0].reason, SkipReason::NotDue { due: date(2025, 2, 1) });

    let queue = ReversingRepository::new(db).list_queue(Some(QueueStatus::Pending)).await.unwrap();
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn test_due_item_posts_swapped_entry_and_completes() {
    let db = setup_seeded().await;
    let (original_id, queue_id) = schedule_accrual(&db, ScheduleOptions::default()).await;
    open_february(&db).await;

    let repo = ReversingRepository::new(db.clone());
    let outcome = repo.process_schedule(&ctx(), date(2025, 2, 1)).await.unwrap();
    assert_eq!(outcome.completed.len(), 1);
    assert!(outcome.skipped.is_empty());
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.completed[0].queue_id, queue_id);

    // The reversal swaps every line of the original.
    let reversal_id = outcome.completed[0].reversal_entry_id;
    let (entry, lines) =
        PostingRepository::new(db.clone()).get_entry_with_lines(reversal_id).await.unwrap();
    assert!(entry.is_reversing);
    assert_eq!(entry.entry_date, date(2025, 2, 1));
    let expense = account(&db, "Salaries Expense").await;
    let expense_line = lines.iter().find(|l| l.account_id == expense.into_inner()).unwrap();
    assert_eq!(expense_line.credit, dec!(400));

    // The queue item is done and points at the entry it created.
    let queue = repo.list_queue(None).await.unwrap();
    let item = &queue[0];
    assert_eq!(item.status, QueueStatus::Completed.as_str());
    assert_eq!(item.reversed_entry_id, Some(reversal_id.into_inner()));
    assert_eq!(item.original_entry_id, original_id.into_inner());

    // With a status-change history row behind it.
    let history = repo.history_for(queue_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].field, "status");
    assert_eq!(history[0].old_value.as_deref(), Some("pending"));
    assert_eq!(history[0].new_value.as_deref(), Some("completed"));

    // Reversing entries close the cycle: step 10 alone, no cascade.
    let february = PeriodRepository::new(db.clone()).current_period().await.unwrap().unwrap();
    let steps = PeriodRepository::new(db.clone())
        .get_cycle_status(ledgerbook_shared::types::PeriodId::new(february.id))
        .await
        .unwrap();
    assert_eq!(steps[9].status, "completed");
    assert_ne!(steps[8].status, "completed");
}

#[tokio::test]
async fn test_unapproved_item_waits_then_posts_after_signoff() {
    let db = setup_seeded().await;
    let opts = ScheduleOptions { approval_required: true, authorization_level: 3, ..Default::default() };
    let (_, queue_id) = schedule_accrual(&db, opts).await;
    open_february(&db).await;

    let repo = ReversingRepository::new(db.clone());

    // Due, but nobody has signed off.
    let outcome = repo.process_schedule(&ctx(), date(2025, 2, 1)).await.unwrap();
    assert!(outcome.completed.is_empty());
    assert_eq!(outcome.skipped[0].reason, SkipReason::AwaitingApproval);
    assert_eq!(repo.list_queue(Some(QueueStatus::Pending)).await.unwrap().len(), 1);

    repo.record_approval(&ctx(), queue_id, "carol", "controller", 2, ApprovalStatus::Approved)
        .await
        .unwrap();

    let outcome = repo.process_schedule(&ctx(), date(2025, 2, 1)).await.unwrap();
    assert_eq!(outcome.completed.len(), 1);
    assert!(repo.list_queue(Some(QueueStatus::Pending)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_approval_below_required_level_does_not_unlock() {
    let db = setup_seeded().await;
    let opts = ScheduleOptions { approval_required: true, authorization_level: 2, ..Default::default() };
    let (_, queue_id) = schedule_accrual(&db, opts).await;
    open_february(&db).await;

    let repo = ReversingRepository::new(db.clone());
    repo.record_approval(&ctx(), queue_id, "dave", "clerk", 5, ApprovalStatus::Approved)
        .await
        .unwrap();

    let outcome = repo.process_schedule(&ctx(), date(2025, 2, 1)).await.unwrap();
    assert!(outcome.completed.is_empty());
    assert_eq!(outcome.skipped[0].reason, SkipReason::AwaitingApproval);
}

#[tokio::test]
async fn test_rejection_alone_does_not_unlock() {
    let db = setup_seeded().await;
    let opts = ScheduleOptions { approval_required: true, authorization_level: 3, ..Default::default() };
    let (_, queue_id) = schedule_accrual(&db, opts).await;
    open_february(&db).await;

    let repo = ReversingRepository::new(db.clone());
    repo.record_approval(&ctx(), queue_id, "carol", "controller", 1, ApprovalStatus::Rejected)
        .await
        .unwrap();

    let outcome = repo.process_schedule(&ctx(), date(2025, 2, 1)).await.unwrap();
    assert!(outcome.completed.is_empty());
    assert_eq!(outcome.skipped[0].reason, SkipReason::AwaitingApproval);
}

#[tokio::test]
async fn test_process_item_enforces_readiness_and_completion() {
    let db = setup_seeded().await;
    let opts = ScheduleOptions { approval_required: true, authorization_level: 3, ..Default::default() };
    let (_, queue_id) = schedule_accrual(&db, opts).await;
    open_february(&db).await;

    let repo = ReversingRepository::new(db.clone());

    let err = repo.process_item(&ctx(), queue_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::ReversalNotReady { .. }));

    repo.record_approval(&ctx(), queue_id, "carol", "controller", 2, ApprovalStatus::Approved)
        .await
        .unwrap();
    let outcome = repo.process_item(&ctx(), queue_id).await.unwrap();
    assert_eq!(outcome.completed.queue_id, queue_id);
    // Cycle tracker problems ride along in the outcome; a healthy run has
    // none.
    assert!(outcome.warnings.is_empty());
    let february = PeriodRepository::new(db.clone()).current_period().await.unwrap().unwrap();
    let steps = PeriodRepository::new(db.clone())
        .get_cycle_status(ledgerbook_shared::types::PeriodId::new(february.id))
        .await
        .unwrap();
    assert_eq!(steps[9].status, "completed");

    let err = repo.process_item(&ctx(), queue_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::QueueItemCompleted { .. }));

    let err = repo.process_item(&ctx(), QueueItemId::new(999_999)).await.unwrap_err();
    assert!(matches!(err, LedgerError::QueueItemNotFound { .. }));
}

#[tokio::test]
async fn test_scheduling_unknown_entry_refused() {
    let db = setup_seeded().await;
    let err = ReversingRepository::new(db)
        .schedule(&ctx(), EntryId::new(999_999), date(2025, 2, 1), ScheduleOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::EntryNotFound { .. }));
}

//! Integration tests for the posting engine.

mod common;

use common::{account, ctx, current_period_id, date, post, setup_seeded};
use ledgerbook_core::ledger::{EntryStatus, ErrorKind, LedgerError, LineInput};
use ledgerbook_db::entities::{journal_entries, journal_lines};
use ledgerbook_db::{
    AuditLogRepository, PeriodRepository, PostingRepository, RecordEntryInput, ReportRepository,
    TrialBalanceFilter,
};
use ledgerbook_shared::types::AccountId;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

#[tokio::test]
async fn test_cash_sale_posts_balances_and_advances_cycle() {
    let db = setup_seeded().await;
    let cash = account(&db, "Cash").await;
    let revenue = account(&db, "Service Revenue").await;

    let outcome = PostingRepository::new(db.clone())
        .record_entry(
            &ctx(),
            RecordEntryInput::new(
                date(2025, 1, 10),
                "Cash sale",
                vec![LineInput::debit(cash, dec!(250)), LineInput::credit(revenue, dec!(250))],
            ),
        )
        .await
        .unwrap();
    assert!(outcome.warnings.is_empty());

    let report = ReportRepository::new(db.clone())
        .compute_trial_balance(&TrialBalanceFilter::default())
        .await
        .unwrap();
    assert!(report.is_balanced());
    assert_eq!(report.total_debit, dec!(250));

    // Steps 1 and 2 complete on the first posted entry.
    let period_id = current_period_id(&db).await;
    let steps =
        PeriodRepository::new(db.clone()).get_cycle_status(period_id).await.unwrap();
    assert_eq!(steps[0].status, "completed");
    assert_eq!(steps[1].status, "completed");
    assert_eq!(steps[2].status, "pending");

    // And the entry leaves an audit trail.
    let audit = AuditLogRepository::new(db).list(10).await.unwrap();
    assert!(audit.iter().any(|row| row.action == "journal_entry_recorded"));
}

#[tokio::test]
async fn test_unbalanced_entry_rejected_and_nothing_written() {
    let db = setup_seeded().await;
    let cash = account(&db, "Cash").await;
    let revenue = account(&db, "Service Revenue").await;

    let err = PostingRepository::new(db.clone())
        .record_entry(
            &ctx(),
            RecordEntryInput::new(
                date(2025, 1, 10),
                "Fat-fingered sale",
                vec![LineInput::debit(cash, dec!(200.00)), LineInput::credit(revenue, dec!(100.00))],
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, LedgerError::Unbalanced { difference, .. } if difference == dec!(100.00)));

    assert!(journal_entries::Entity::find().all(&db).await.unwrap().is_empty());
    assert!(journal_lines::Entity::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_posting_into_closed_period_refused() {
    let db = setup_seeded().await;
    let cash = account(&db, "Cash").await;
    let revenue = account(&db, "Service Revenue").await;
    let period_id = current_period_id(&db).await;

    PeriodRepository::new(db.clone()).close_period(&ctx(), period_id).await.unwrap();

    let err = PostingRepository::new(db.clone())
        .record_entry(
            &ctx(),
            RecordEntryInput::new(
                date(2025, 1, 20),
                "Late sale",
                vec![LineInput::debit(cash, dec!(50)), LineInput::credit(revenue, dec!(50))],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::PeriodClosed { .. }));
    assert_eq!(err.kind(), ErrorKind::State);
}

#[tokio::test]
async fn test_date_outside_period_bounds_refused() {
    let db = setup_seeded().await;
    let cash = account(&db, "Cash").await;
    let revenue = account(&db, "Service Revenue").await;

    let err = PostingRepository::new(db.clone())
        .record_entry(
            &ctx(),
            RecordEntryInput::new(
                date(2025, 2, 1),
                "February sale in January",
                vec![LineInput::debit(cash, dec!(75)), LineInput::credit(revenue, dec!(75))],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DateOutsidePeriod { .. }));
}

#[tokio::test]
async fn test_unknown_account_refused() {
    let db = setup_seeded().await;
    let cash = account(&db, "Cash").await;

    let err = PostingRepository::new(db.clone())
        .record_entry(
            &ctx(),
            RecordEntryInput::new(
                date(2025, 1, 5),
                "Sale to nowhere",
                vec![
                    LineInput::debit(cash, dec!(10)),
                    LineInput::credit(AccountId::new(999_999), dec!(10)),
                ],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound { .. }));
}

#[tokio::test]
async fn test_draft_entries_excluded_from_reports_and_cycle() {
    let db = setup_seeded().await;
    let cash = account(&db, "Cash").await;
    let revenue = account(&db, "Service Revenue").await;

    let mut input = RecordEntryInput::new(
        date(2025, 1, 12),
        "Pending sale",
        vec![LineInput::debit(cash, dec!(300)), LineInput::credit(revenue, dec!(300))],
    );
    input.status = EntryStatus::Draft;
    PostingRepository::new(db.clone()).record_entry(&ctx(), input).await.unwrap();

    let report = ReportRepository::new(db.clone())
        .compute_trial_balance(&TrialBalanceFilter::default())
        .await
        .unwrap();
    assert_eq!(report.total_debit, dec!(0));
    assert_eq!(report.total_credit, dec!(0));

    let period_id = current_period_id(&db).await;
    let steps = PeriodRepository::new(db.clone()).get_cycle_status(period_id).await.unwrap();
    assert!(steps.iter().take(2).all(|s| s.status != "completed"));
}

#[tokio::test]
async fn test_reverse_entry_swaps_lines_and_nets_to_zero() {
    let db = setup_seeded().await;
    let expense = account(&db, "Salaries Expense").await;
    let payable = account(&db, "Salaries Payable").await;

    let original = post(
        &db,
        date(2025, 1, 31),
        "Accrued salaries",
        vec![LineInput::debit(expense, dec!(400)), LineInput::credit(payable, dec!(400))],
    )
    .await;

    let outcome = PostingRepository::new(db.clone())
        .reverse_entry(&ctx(), original, date(2025, 1, 31))
        .await
        .unwrap();

    let (entry, lines) = PostingRepository::new(db.clone())
        .get_entry_with_lines(outcome.entry_id)
        .await
        .unwrap();
    assert!(entry.is_reversing);
    let expense_line =
        lines.iter().find(|l| l.account_id == expense.into_inner()).unwrap();
    assert_eq!(expense_line.credit, dec!(400));
    assert_eq!(expense_line.debit, dec!(0));

    // Original plus reversal sum to zero on every account.
    let report = ReportRepository::new(db.clone())
        .compute_trial_balance(&TrialBalanceFilter::default())
        .await
        .unwrap();
    for row in &report.rows {
        assert_eq!(row.net_debit, dec!(0), "account {} should net to zero", row.code);
        assert_eq!(row.net_credit, dec!(0), "account {} should net to zero", row.code);
    }
}

#[tokio::test]
async fn test_schedule_reverse_on_enqueues_item_in_same_commit() {
    let db = setup_seeded().await;
    let expense = account(&db, "Rent Expense").await;
    let payable = account(&db, "Accounts Payable").await;

    let mut input = RecordEntryInput::new(
        date(2025, 1, 31),
        "Accrued rent",
        vec![LineInput::debit(expense, dec!(900)), LineInput::credit(payable, dec!(900))],
    );
    input.schedule_reverse_on = Some(date(2025, 2, 1));
    let outcome = PostingRepository::new(db.clone()).record_entry(&ctx(), input).await.unwrap();

    let queue = ledgerbook_db::ReversingRepository::new(db.clone())
        .list_queue(None)
        .await
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].original_entry_id, outcome.entry_id.into_inner());
    assert_eq!(queue[0].reverse_on, date(2025, 2, 1));
    assert_eq!(queue[0].status, "pending");
}

//! Journal engine behavior against the in-memory store.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{JournalId, OrganizationId};

use super::*;
use crate::error::ErrorKind;
use crate::store::{LedgerStore, MemoryStore, Store, StoreTx};
use crate::test_support::{date, seed_account};

struct Ledger {
    store: MemoryStore,
    org: OrganizationId,
    cash: Account,
    revenue: Account,
}

async fn ledger() -> Ledger {
    let store = MemoryStore::new();
    let org = OrganizationId::new();
    let cash = seed_account(&store, org, "1000", AccountType::Asset).await;
    let revenue = seed_account(&store, org, "4000", AccountType::Income).await;
    Ledger {
        store,
        org,
        cash,
        revenue,
    }
}

fn sale(ledger: &Ledger, debit: Decimal, credit: Decimal) -> PostJournalInput {
    PostJournalInput {
        organization_id: ledger.org,
        date: date(2024, 1, 15),
        reference: Some("INV-1".to_string()),
        source: JournalSource::Manual,
        lines: vec![
            JournalLineInput::debit(ledger.cash.id, debit),
            JournalLineInput::credit(ledger.revenue.id, credit),
        ],
        created_by: None,
    }
}

async fn manual_journals(ledger: &Ledger) -> Vec<Journal> {
    let mut tx = ledger.store.begin_read_only().await.unwrap();
    tx.journals_by_source(ledger.org, JournalSource::Manual)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_post_balanced_journal() {
    let ledger = ledger().await;
    let engine = JournalEngine::default();

    let journal = engine
        .post_journal(&ledger.store, sale(&ledger, dec!(100), dec!(100)))
        .await
        .unwrap();

    assert_eq!(journal.journal_number, "JV-000001");
    assert_eq!(journal.total_debit, dec!(100));
    assert_eq!(journal.total_credit, dec!(100));
    assert_eq!(journal.lines.len(), 2);
    assert_eq!(journal.lines[0].line_number, 1);
    assert_eq!(journal.lines[1].line_number, 2);

    let persisted = manual_journals(&ledger).await;
    assert_eq!(persisted, vec![journal]);
}

#[tokio::test]
async fn test_journal_numbers_increase() {
    let ledger = ledger().await;
    let engine = JournalEngine::default();

    for expected in ["JV-000001", "JV-000002", "JV-000003"] {
        let journal = engine
            .post_journal(&ledger.store, sale(&ledger, dec!(10), dec!(10)))
            .await
            .unwrap();
        assert_eq!(journal.journal_number, expected);
    }
}

#[tokio::test]
async fn test_unbalanced_journal_is_not_persisted() {
    let ledger = ledger().await;
    let engine = JournalEngine::default();

    let err = engine
        .post_journal(&ledger.store, sale(&ledger, dec!(100), dec!(99.98)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnbalancedJournal);
    assert!(matches!(
        err,
        LedgerError::Unbalanced { difference, .. } if difference == dec!(0.02)
    ));
    assert!(manual_journals(&ledger).await.is_empty());

    // A failed posting does not burn a journal number.
    let journal = engine
        .post_journal(&ledger.store, sale(&ledger, dec!(1), dec!(1)))
        .await
        .unwrap();
    assert_eq!(journal.journal_number, "JV-000001");
}

#[tokio::test]
async fn test_sub_cent_difference_is_accepted() {
    let ledger = ledger().await;
    let journal = JournalEngine::default()
        .post_journal(&ledger.store, sale(&ledger, dec!(100.005), dec!(100)))
        .await
        .unwrap();
    assert_eq!(journal.total_debit - journal.total_credit, dec!(0.005));
}

#[tokio::test]
async fn test_unknown_account_rejected() {
    let ledger = ledger().await;
    let foreign = seed_account(&ledger.store, OrganizationId::new(), "1000", AccountType::Asset)
        .await;

    let mut input = sale(&ledger, dec!(5), dec!(5));
    input.lines[0].account_id = foreign.id;

    let err = JournalEngine::default()
        .post_journal(&ledger.store, input)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(id) if id == foreign.id));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_inactive_account_rejected() {
    let ledger = ledger().await;
    let mut closed = ledger.revenue.clone();
    closed.is_active = false;
    ledger.store.add_account(closed.clone()).await;

    let err = JournalEngine::default()
        .post_journal(&ledger.store, sale(&ledger, dec!(5), dec!(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountInactive(id) if id == closed.id));
}

#[tokio::test]
async fn test_check_ledger_balance_is_idempotent() {
    let ledger = ledger().await;
    let engine = JournalEngine::default();
    let journal = engine
        .post_journal(&ledger.store, sale(&ledger, dec!(250.50), dec!(250.50)))
        .await
        .unwrap();

    let first = engine
        .check_ledger_balance(&ledger.store, ledger.org, journal.id)
        .await
        .unwrap();
    let second = engine
        .check_ledger_balance(&ledger.store, ledger.org, journal.id)
        .await
        .unwrap();

    assert!(first.balanced);
    assert_eq!(first.total_debit, dec!(250.50));
    assert_eq!(first.difference, Decimal::ZERO);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_check_ledger_balance_scoped_to_organization() {
    let ledger = ledger().await;
    let engine = JournalEngine::default();
    let journal = engine
        .post_journal(&ledger.store, sale(&ledger, dec!(1), dec!(1)))
        .await
        .unwrap();

    let err = engine
        .check_ledger_balance(&ledger.store, OrganizationId::new(), journal.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::JournalNotFound(_)));

    let err = engine
        .check_ledger_balance(&ledger.store, ledger.org, JournalId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_post_in_caller_transaction_rolls_back_together() {
    let ledger = ledger().await;
    let engine = JournalEngine::default();

    let mut tx = ledger.store.begin().await.unwrap();
    let journal = engine
        .post_journal_in(&mut tx, sale(&ledger, dec!(7), dec!(7)))
        .await
        .unwrap();
    let check = engine
        .check_ledger_balance_in(&mut tx, ledger.org, journal.id)
        .await
        .unwrap();
    assert!(check.balanced);
    tx.rollback().await.unwrap();

    assert!(manual_journals(&ledger).await.is_empty());
}

#[tokio::test]
async fn test_configured_tolerance() {
    let ledger = ledger().await;
    let strict = JournalEngine::new(dec!(0.001)).unwrap();

    let err = strict
        .post_journal(&ledger.store, sale(&ledger, dec!(100.005), dec!(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unbalanced { .. }));
    assert_eq!(strict.tolerance(), dec!(0.001));
}

#[rstest::rstest]
#[case(dec!(0))]
#[case(dec!(-0.01))]
#[case(dec!(0.0101))]
#[case(dec!(0.05))]
fn test_tolerance_outside_bounds_rejected(#[case] tolerance: Decimal) {
    let err = JournalEngine::new(tolerance).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTolerance(t) if t == tolerance));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.http_status_code(), 400);
}

#[test]
fn test_tolerance_at_bound_accepted() {
    let engine = JournalEngine::new(dec!(0.01)).unwrap();
    assert_eq!(engine.tolerance(), dec!(0.01));
}

#[test]
fn test_loose_configured_tolerance_rejected() {
    let config = tally_shared::config::LedgerConfig {
        balance_tolerance: dec!(0.05),
    };
    assert!(matches!(
        JournalEngine::from_config(&config),
        Err(LedgerError::InvalidTolerance(_))
    ));

    let config = tally_shared::config::LedgerConfig::default();
    assert_eq!(
        JournalEngine::from_config(&config).unwrap().tolerance(),
        dec!(0.01)
    );
}

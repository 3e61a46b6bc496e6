// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! LedgerService public API integration tests.

use bank_ledger::{
    EntryType, LedgerError, LedgerService, MemoryGateway, Posting, Snapshot, TransactionEntry,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn empty_service() -> LedgerService {
    LedgerService::open(MemoryGateway::with_snapshot(Snapshot::default()))
}

fn summary(entries: &[TransactionEntry]) -> Vec<(EntryType, Decimal, Decimal)> {
    entries
        .iter()
        .map(|e| (e.entry_type, e.amount, e.running_balance))
        .collect()
}

// === Postings ===

#[test]
fn credit_debit_and_rejected_overdraft() {
    let service = empty_service();
    service.signup("1001", "Asha", "password123").unwrap();
    assert_eq!(service.balance("1001"), Decimal::ZERO);

    let opening = service
        .post_transaction(Posting::credit("1001", "Opening", dec!(1000)))
        .unwrap();
    assert_eq!(opening.running_balance, dec!(1000));

    let groceries = service
        .post_transaction(Posting::debit("1001", "Groceries", dec!(150)))
        .unwrap();
    assert_eq!(groceries.running_balance, dec!(850));
    assert_eq!(groceries.description, "Groceries");

    assert_eq!(
        summary(&service.transactions("1001")),
        vec![
            (EntryType::Debit, dec!(150), dec!(850)),
            (EntryType::Credit, dec!(1000), dec!(1000)),
        ]
    );

    let result = service.post_transaction(Posting::debit("1001", "Rent", dec!(1000)));
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(service.balance("1001"), dec!(850));
    assert_eq!(service.transactions("1001").len(), 2);
}

#[test]
fn debit_of_exact_balance_reaches_zero() {
    let service = empty_service();
    service
        .post_transaction(Posting::credit("1001", "Opening", dec!(99.99)))
        .unwrap();
    let entry = service
        .post_transaction(Posting::debit("1001", "All of it", dec!(99.99)))
        .unwrap();
    assert_eq!(entry.running_balance, Decimal::ZERO);
}

#[test]
fn debit_on_empty_account_fails() {
    let service = empty_service();
    let before = service.snapshot();

    let result = service.post_transaction(Posting::debit("1001", "Coffee", dec!(3.50)));
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(service.snapshot(), before);
}

#[test]
fn posting_to_account_without_signup_opens_ledger() {
    let service = empty_service();
    service
        .post_transaction(Posting::credit("7777", "Cash", dec!(20)))
        .unwrap();
    assert_eq!(service.balance("7777"), dec!(20));
    assert!(service.find_account("7777").is_none());
}

// === Transfers ===

#[test]
fn transfer_mirrors_credit_to_recipient() {
    let service = empty_service();
    service.signup("A", "Alice", "a").unwrap();
    service.signup("B", "Bob", "b").unwrap();
    service
        .post_transaction(Posting::credit("A", "Opening", dec!(500)))
        .unwrap();

    let sent = service
        .post_transaction(Posting::debit("A", "Dinner", dec!(200)).to("B"))
        .unwrap();

    assert_eq!(sent.running_balance, dec!(300));
    assert_eq!(service.balance("A"), dec!(300));
    assert_eq!(service.balance("B"), dec!(200));

    let received = service.transactions("B");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].description, "Received from A");
    assert_eq!(received[0].entry_type, EntryType::Credit);
    assert_eq!(received[0].amount, dec!(200));
    assert_eq!(received[0].date, sent.date);
}

#[test]
fn transfer_adds_to_existing_recipient_balance() {
    let service = LedgerService::open(MemoryGateway::with_snapshot(Snapshot::seed()));

    service
        .post_transaction(Posting::debit("1002", "Loan", dec!(1000)).to("1001"))
        .unwrap();

    assert_eq!(service.balance("1002"), dec!(9000));
    assert_eq!(service.balance("1001"), dec!(5850));
    assert_eq!(service.transactions("1001").len(), 3);
    assert_eq!(service.verify(), Ok(()));
}

#[test]
fn transfer_to_unknown_recipient_only_debits() {
    let service = empty_service();
    service.signup("A", "", "a").unwrap();
    service
        .post_transaction(Posting::credit("A", "Opening", dec!(500)))
        .unwrap();

    let sent = service
        .post_transaction(Posting::debit("A", "Lost", dec!(200)).to("nobody"))
        .unwrap();

    assert_eq!(sent.running_balance, dec!(300));
    assert_eq!(service.transactions("A").len(), 2);
    assert!(service.transactions("nobody").is_empty());
}

#[test]
fn rejected_transfer_touches_neither_account() {
    let service = empty_service();
    service.signup("A", "", "a").unwrap();
    service.signup("B", "", "b").unwrap();
    service
        .post_transaction(Posting::credit("A", "Opening", dec!(50)))
        .unwrap();
    let before = service.snapshot();

    let result = service.post_transaction(Posting::debit("A", "Too much", dec!(51)).to("B"));
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(service.snapshot(), before);
}

// === Accounts ===

#[test]
fn signup_creates_empty_ledger() {
    let service = empty_service();
    let account = service.signup("2001", "Ravi", "pw").unwrap();

    assert_eq!(account.account_number.as_str(), "2001");
    assert!(service.snapshot().transactions.contains("2001"));
    assert!(service.transactions("2001").is_empty());
}

#[test]
fn duplicate_signup_is_rejected() {
    let service = empty_service();
    service.signup("2001", "Ravi", "pw").unwrap();
    let before = service.snapshot();

    assert_eq!(
        service.signup("2001", "Someone else", "other"),
        Err(LedgerError::DuplicateAccount)
    );
    assert_eq!(service.snapshot(), before);
}

#[test]
fn login_matches_number_and_password_exactly() {
    let service = LedgerService::open(MemoryGateway::with_snapshot(Snapshot::seed()));

    let account = service.login("1001", "password123").unwrap();
    assert_eq!(account.display_name(), "User");

    assert_eq!(service.login("1001", "pass"), Err(LedgerError::InvalidCredentials));
    assert_eq!(service.login("1003", "pass"), Err(LedgerError::InvalidCredentials));
}

#[test]
fn update_account_changes_login() {
    let service = LedgerService::open(MemoryGateway::with_snapshot(Snapshot::seed()));
    service
        .update_account("1002", Some("Meera".into()), Some("new".into()))
        .unwrap();

    assert!(service.login("1002", "pass").is_err());
    assert_eq!(service.login("1002", "new").unwrap().name, "Meera");
}

// === Persistence through the service ===

#[test]
fn every_mutation_is_persisted() {
    let gateway = std::sync::Arc::new(MemoryGateway::with_snapshot(Snapshot::default()));
    let service = LedgerService::open(std::sync::Arc::clone(&gateway));

    service.signup("1001", "", "pw").unwrap();
    assert_eq!(gateway.stored(), Some(service.snapshot()));

    service
        .post_transaction(Posting::credit("1001", "Opening", dec!(10)))
        .unwrap();
    assert_eq!(gateway.stored(), Some(service.snapshot()));

    service.delete_account("1001").unwrap();
    assert_eq!(gateway.stored(), Some(service.snapshot()));
}

// === Amount range ===

#[test]
fn amounts_beyond_f64_precision_stay_exact() {
    let service = empty_service();
    let big = dec!(9007199254740993);

    service.post_transaction(Posting::credit("1001", "Opening", big)).unwrap();
    let entry = service
        .post_transaction(Posting::debit("1001", "Cents", dec!(0.01)))
        .unwrap();

    assert_eq!(entry.running_balance, dec!(9007199254740992.99));
    assert_eq!(service.balance("1001"), dec!(9007199254740992.99));
    assert_eq!(service.verify(), Ok(()));
}

#[test]
fn transfer_that_would_overflow_recipient_is_rejected() {
    let service = empty_service();
    service.signup("A", "", "a").unwrap();
    service.signup("B", "", "b").unwrap();
    service.post_transaction(Posting::credit("A", "Opening", dec!(100))).unwrap();
    service
        .post_transaction(Posting::credit("B", "Opening", Decimal::MAX - dec!(10)))
        .unwrap();

    assert_eq!(
        service.post_transaction(Posting::debit("A", "Transfer", dec!(50)).to("B")),
        Err(LedgerError::BalanceOverflow)
    );
    assert_eq!(
        summary(&service.transactions("A")),
        vec![(EntryType::Credit, dec!(100), dec!(100))]
    );
    assert_eq!(service.balance("B"), Decimal::MAX - dec!(10));

    service
        .post_transaction(Posting::debit("A", "Transfer", dec!(10)).to("B"))
        .unwrap();
    assert_eq!(service.balance("A"), dec!(90));
    assert_eq!(service.balance("B"), Decimal::MAX);
    assert_eq!(service.verify(), Ok(()));
}

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

//! Per-account transaction history.
//!
//! Each account's entries are kept most-recent-first, so the head entry's
//! running balance is the account's current balance. The store performs no
//! validation of its own; [`crate::LedgerService`] decides what gets posted.

use crate::base::AccountNumber;
use crate::error::LedgerError;
use crate::transaction::TransactionEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Entry lists indexed by account number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerStore {
    ledgers: BTreeMap<AccountNumber, VecDeque<TransactionEntry>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance, or zero for an account with no history.
    pub fn latest_balance(&self, account_number: &str) -> Decimal {
        self.ledgers
            .get(account_number)
            .and_then(|entries| entries.front())
            .map(|entry| entry.running_balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// All entries for an account, most recent first.
    pub fn entries_for(&self, account_number: &str) -> Vec<TransactionEntry> {
        self.ledgers
            .get(account_number)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Inserts `entry` as the newest entry for the account.
    pub fn prepend(&mut self, account_number: &AccountNumber, entry: TransactionEntry) {
        self.ledgers
            .entry(account_number.clone())
            .or_default()
            .push_front(entry);
    }

    /// Ensures an entry list exists, leaving any existing history alone.
    pub fn open(&mut self, account_number: &AccountNumber) {
        self.ledgers.entry(account_number.clone()).or_default();
    }

    /// Removes the newest entry. Only used to undo a posting that could not be persisted.
    pub(crate) fn pop_front(&mut self, account_number: &str) -> Option<TransactionEntry> {
        self.ledgers.get_mut(account_number)?.pop_front()
    }

    /// Drops the whole history of an account.
    pub fn remove(&mut self, account_number: &str) -> Option<Vec<TransactionEntry>> {
        self.ledgers
            .remove(account_number)
            .map(|entries| entries.into_iter().collect())
    }

    pub(crate) fn insert(&mut self, account_number: AccountNumber, entries: Vec<TransactionEntry>) {
        self.ledgers.insert(account_number, entries.into());
    }

    pub fn contains(&self, account_number: &str) -> bool {
        self.ledgers.contains_key(account_number)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &AccountNumber> {
        self.ledgers.keys()
    }

    /// Checks the running-balance chain of one account.
    ///
    /// Walking from newest to oldest, each entry's prior balance must equal
    /// the running balance of the entry below it, and the oldest entry must
    /// start from zero.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Corrupted`] - The chain breaks at the reported index.
    pub fn verify(&self, account_number: &str) -> Result<(), LedgerError> {
        let Some(entries) = self.ledgers.get(account_number) else {
            return Ok(());
        };

        for (index, entry) in entries.iter().enumerate() {
            let expected = entries
                .get(index + 1)
                .map(|older| older.running_balance)
                .unwrap_or(Decimal::ZERO);
            if entry.amount <= Decimal::ZERO || entry.prior_balance() != Some(expected) {
                return Err(LedgerError::Corrupted {
                    account: AccountNumber::from(account_number),
                    index,
                });
            }
        }
        Ok(())
    }

    pub fn verify_all(&self) -> Result<(), LedgerError> {
        self.ledgers
            .keys()
            .try_for_each(|account| self.verify(account.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::EntryType;
    use rust_decimal_macros::dec;

    fn entry(amount: Decimal, entry_type: EntryType, running_balance: Decimal) -> TransactionEntry {
        TransactionEntry::new("1/1/2026", "test", amount, entry_type, running_balance)
    }

    #[test]
    fn empty_account_has_zero_balance() {
        let store = LedgerStore::new();
        assert_eq!(store.latest_balance("1001"), Decimal::ZERO);
        assert!(store.entries_for("1001").is_empty());
    }

    #[test]
    fn prepend_puts_newest_first() {
        let mut store = LedgerStore::new();
        let account = AccountNumber::from("1001");
        store.prepend(&account, entry(dec!(1000), EntryType::Credit, dec!(1000)));
        store.prepend(&account, entry(dec!(150), EntryType::Debit, dec!(850)));

        let entries = store.entries_for("1001");
        assert_eq!(entries[0].running_balance, dec!(850));
        assert_eq!(entries[1].running_balance, dec!(1000));
        assert_eq!(store.latest_balance("1001"), dec!(850));
    }

    #[test]
    fn open_does_not_clear_history() {
        let mut store = LedgerStore::new();
        let account = AccountNumber::from("1001");
        store.prepend(&account, entry(dec!(10), EntryType::Credit, dec!(10)));
        store.open(&account);
        assert_eq!(store.entries_for("1001").len(), 1);

        let fresh = AccountNumber::from("2002");
        store.open(&fresh);
        assert!(store.contains("2002"));
        assert!(store.entries_for("2002").is_empty());
    }

    #[test]
    fn pop_front_undoes_prepend() {
        let mut store = LedgerStore::new();
        let account = AccountNumber::from("1001");
        store.prepend(&account, entry(dec!(10), EntryType::Credit, dec!(10)));
        store.prepend(&account, entry(dec!(5), EntryType::Credit, dec!(15)));

        let popped = store.pop_front("1001").unwrap();
        assert_eq!(popped.running_balance, dec!(15));
        assert_eq!(store.latest_balance("1001"), dec!(10));
    }

    #[test]
    fn verify_accepts_consistent_chain() {
        let mut store = LedgerStore::new();
        let account = AccountNumber::from("1001");
        store.prepend(&account, entry(dec!(1000), EntryType::Credit, dec!(1000)));
        store.prepend(&account, entry(dec!(150), EntryType::Debit, dec!(850)));
        store.prepend(&account, entry(dec!(0.25), EntryType::Credit, dec!(850.25)));
        assert_eq!(store.verify_all(), Ok(()));
    }

    #[test]
    fn verify_reports_broken_link() {
        let mut store = LedgerStore::new();
        let account = AccountNumber::from("1001");
        store.prepend(&account, entry(dec!(1000), EntryType::Credit, dec!(1000)));
        store.prepend(&account, entry(dec!(150), EntryType::Debit, dec!(900)));

        assert_eq!(
            store.verify("1001"),
            Err(LedgerError::Corrupted {
                account: account.clone(),
                index: 0
            })
        );
    }

    #[test]
    fn verify_rejects_oldest_first_ordering() {
        let mut store = LedgerStore::new();
        let account = AccountNumber::from("1001");
        store.insert(
            account.clone(),
            vec![
                entry(dec!(5000), EntryType::Credit, dec!(5000)),
                entry(dec!(150), EntryType::Debit, dec!(4850)),
            ],
        );
        assert!(store.verify("1001").is_err());
    }

    #[test]
    fn verify_reports_out_of_range_entry() {
        let mut store = LedgerStore::new();
        store.insert(
            AccountNumber::from("1001"),
            vec![entry(dec!(1), EntryType::Debit, Decimal::MAX)],
        );
        assert_eq!(
            store.verify("1001"),
            Err(LedgerError::Corrupted {
                account: AccountNumber::from("1001"),
                index: 0
            })
        );
    }
}

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

//! The unit of persistence.
//!
//! A [`Snapshot`] is the complete state of the bank: every account and every
//! ledger. It is serialized as
//!
//! ```json
//! { "users": [ { "accountNumber": "1001", "name": "", "password": "..." } ],
//!   "transactions": { "1001": [ { "date": "...", "runningBalance": 4850.0, ... } ] } }
//! ```

use crate::account::{Account, AccountStore};
use crate::base::AccountNumber;
use crate::ledger::LedgerStore;
use crate::transaction::{EntryType, TransactionEntry};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: AccountStore,
    #[serde(default)]
    pub transactions: LedgerStore,
}

impl Snapshot {
    pub fn new(users: AccountStore, transactions: LedgerStore) -> Self {
        Self {
            users,
            transactions,
        }
    }

    /// Dataset used when no usable snapshot exists.
    pub fn seed() -> Self {
        let users = [
            Account::new(AccountNumber::from("1001"), "", "password123"),
            Account::new(AccountNumber::from("1002"), "", "pass"),
        ]
        .into_iter()
        .collect();

        let mut transactions = LedgerStore::new();
        transactions.insert(
            AccountNumber::from("1001"),
            vec![
                TransactionEntry::new(
                    "12/16/2025",
                    "Grocery Store",
                    dec!(150),
                    EntryType::Debit,
                    dec!(4850),
                ),
                TransactionEntry::new(
                    "12/15/2025",
                    "Opening Balance",
                    dec!(5000),
                    EntryType::Credit,
                    dec!(5000),
                ),
            ],
        );
        transactions.insert(
            AccountNumber::from("1002"),
            vec![TransactionEntry::new(
                "12/10/2025",
                "Salary",
                dec!(10000),
                EntryType::Credit,
                dec!(10000),
            )],
        );

        Self::new(users, transactions)
    }
}

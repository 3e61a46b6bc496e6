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

//! Ledger entries.
//!
//! A [`TransactionEntry`] records one posting against an account together
//! with the balance it left behind:
//! - [`EntryType::Credit`] adds `amount` to the prior running balance
//! - [`EntryType::Debit`] subtracts it

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a posting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Credit,
    Debit,
}

impl EntryType {
    /// Applies `amount` to `balance` in this direction.
    ///
    /// Returns `None` if the result is outside the [`Decimal`] range.
    pub fn apply(self, balance: Decimal, amount: Decimal) -> Option<Decimal> {
        match self {
            Self::Credit => balance.checked_add(amount),
            Self::Debit => balance.checked_sub(amount),
        }
    }

    /// Reverses [`EntryType::apply`], recovering the prior balance.
    pub fn revert(self, balance: Decimal, amount: Decimal) -> Option<Decimal> {
        match self {
            Self::Credit => balance.checked_sub(amount),
            Self::Debit => balance.checked_add(amount),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credit => write!(f, "credit"),
            Self::Debit => write!(f, "debit"),
        }
    }
}

/// One immutable ledger entry.
///
/// Amounts are kept as [`Decimal`] in memory and written as exact JSON
/// numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    pub date: String,
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Balance after this entry is applied.
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub running_balance: Decimal,
}

impl TransactionEntry {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        entry_type: EntryType,
        running_balance: Decimal,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount,
            entry_type,
            running_balance,
        }
    }

    /// Balance the account held immediately before this entry, or `None` if
    /// the entry is out of range.
    pub fn prior_balance(&self) -> Option<Decimal> {
        self.entry_type.revert(self.running_balance, self.amount)
    }
}

/// Today's local date in `M/D/YYYY` form, e.g. `12/15/2025`.
pub fn today() -> String {
    chrono::Local::now().format("%-m/%-d/%Y").to_string()
}

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

//! # Bank Ledger
//!
//! This library provides the account and ledger core of a retail-banking
//! service: signup and login, a per-account transaction ledger with a running
//! balance, and peer-to-peer transfers that mirror a credit into the
//! recipient's ledger.
//!
//! ## Core Components
//!
//! - [`LedgerService`]: Posts credits, debits and transfers; owns the state and its persistence
//! - [`AccountStore`]: Customer records with plaintext credential checks
//! - [`LedgerStore`]: Most-recent-first entry lists per account
//! - [`PersistenceGateway`]: Loads and stores the whole [`Snapshot`]
//! - [`LedgerError`]: Error types for account and ledger operations
//!
//! ## Example
//!
//! ```
//! use bank_ledger::{LedgerService, MemoryGateway, Posting, Snapshot};
//! use rust_decimal_macros::dec;
//!
//! let service = LedgerService::open(MemoryGateway::with_snapshot(Snapshot::default()));
//! service.signup("1001", "Asha", "secret").unwrap();
//!
//! service.post_transaction(Posting::credit("1001", "Opening", dec!(1000))).unwrap();
//! let entry = service.post_transaction(Posting::debit("1001", "Groceries", dec!(150))).unwrap();
//! assert_eq!(entry.running_balance, dec!(850));
//! ```
//!
//! ## Thread Safety
//!
//! The service serializes every mutation behind a single lock and persists
//! the snapshot before releasing it, so concurrent debits can never both
//! pass the same balance check.

pub mod account;
pub mod api;
mod base;
pub mod error;
pub mod ledger;
pub mod persistence;
mod service;
pub mod snapshot;
pub mod statement;
mod transaction;

pub use account::{Account, AccountStore};
pub use base::AccountNumber;
pub use error::{LedgerError, PersistError};
pub use ledger::LedgerStore;
pub use persistence::{JsonFileGateway, MemoryGateway, PersistenceGateway};
pub use service::{LedgerService, Posting, ServiceConfig};
pub use snapshot::Snapshot;
pub use transaction::{EntryType, TransactionEntry, today};

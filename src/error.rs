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

//! Error types for account and ledger operations.

use crate::base::AccountNumber;
use thiserror::Error;

/// Account and ledger errors.
///
/// Every variant except [`LedgerError::Persistence`] is an expected,
/// user-facing condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Signup with an account number that is already taken
    #[error("Account already exists")]
    DuplicateAccount,

    /// No account matches both account number and password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Amount is zero or negative
    #[error("Invalid amount")]
    InvalidAmount,

    /// Debit would take the running balance below zero
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Posting would take a balance outside the representable range
    #[error("Balance limit exceeded")]
    BalanceOverflow,

    /// Referenced account does not exist
    #[error("Account not found")]
    AccountNotFound,

    /// Running-balance chain is broken for an account
    #[error("ledger for account {account} is inconsistent at entry {index}")]
    Corrupted { account: AccountNumber, index: usize },

    /// Snapshot could not be written
    #[error("failed to persist snapshot: {0}")]
    Persistence(String),
}

/// Errors raised by a persistence gateway.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<PersistError> for LedgerError {
    fn from(err: PersistError) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(LedgerError::DuplicateAccount.to_string(), "Account already exists");
        assert_eq!(LedgerError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(LedgerError::InvalidAmount.to_string(), "Invalid amount");
        assert_eq!(LedgerError::InsufficientFunds.to_string(), "Insufficient funds");
        assert_eq!(LedgerError::AccountNotFound.to_string(), "Account not found");
        assert_eq!(LedgerError::BalanceOverflow.to_string(), "Balance limit exceeded");
        assert_eq!(
            LedgerError::Corrupted {
                account: AccountNumber::from("1001"),
                index: 2
            }
            .to_string(),
            "ledger for account 1001 is inconsistent at entry 2"
        );
    }

    #[test]
    fn persist_error_converts_to_persistence() {
        let io = std::io::Error::other("disk full");
        let err: LedgerError = PersistError::from(io).into();
        assert_eq!(
            err,
            LedgerError::Persistence("snapshot I/O failed: disk full".to_string())
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::InsufficientFunds;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}

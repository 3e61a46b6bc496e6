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

//! Account management.
//!
//! [`AccountStore`] owns every customer record. It keeps signup order so a
//! persisted snapshot lists users the way they were created.
//!
//! # Example
//!
//! ```
//! use bank_ledger::{AccountNumber, AccountStore};
//!
//! let mut store = AccountStore::new();
//! store.create(AccountNumber::from("1001"), "Asha", "secret").unwrap();
//! assert!(store.authenticate("1001", "secret").is_ok());
//! ```

use crate::base::AccountNumber;
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};

/// Customer record.
///
/// Passwords are stored and compared in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: AccountNumber,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

impl Account {
    const DEFAULT_DISPLAY_NAME: &'static str = "User";

    pub fn new(
        account_number: AccountNumber,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            account_number,
            name: name.into(),
            password: password.into(),
        }
    }

    /// Name shown to the customer; records without one read as `"User"`.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            Self::DEFAULT_DISPLAY_NAME
        } else {
            &self.name
        }
    }
}

/// Ordered collection of customer accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountStore {
    accounts: Vec<Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DuplicateAccount`] - The account number is already taken.
    pub fn create(
        &mut self,
        account_number: AccountNumber,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Account, LedgerError> {
        if self.find(account_number.as_str()).is_some() {
            return Err(LedgerError::DuplicateAccount);
        }
        let account = Account::new(account_number, name, password);
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// Returns the account whose number and password both match exactly.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidCredentials`] - No such account, or wrong password.
    pub fn authenticate(&self, account_number: &str, password: &str) -> Result<Account, LedgerError> {
        self.accounts
            .iter()
            .find(|a| a.account_number.as_str() == account_number && a.password == password)
            .cloned()
            .ok_or(LedgerError::InvalidCredentials)
    }

    pub fn find(&self, account_number: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.account_number.as_str() == account_number)
    }

    /// Changes the name and/or password of an existing account.
    ///
    /// The account number itself is immutable.
    pub fn update(
        &mut self,
        account_number: &str,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<Account, LedgerError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.account_number.as_str() == account_number)
            .ok_or(LedgerError::AccountNotFound)?;

        if let Some(name) = name {
            account.name = name;
        }
        if let Some(password) = password {
            account.password = password;
        }
        Ok(account.clone())
    }

    /// Removes an account, returning its record.
    pub fn remove(&mut self, account_number: &str) -> Result<Account, LedgerError> {
        let position = self
            .accounts
            .iter()
            .position(|a| a.account_number.as_str() == account_number)
            .ok_or(LedgerError::AccountNotFound)?;
        Ok(self.accounts.remove(position))
    }

    /// Puts a removed account back at its original position.
    pub(crate) fn restore(&mut self, position: usize, account: Account) {
        let position = position.min(self.accounts.len());
        self.accounts.insert(position, account);
    }

    pub(crate) fn position(&self, account_number: &str) -> Option<usize> {
        self.accounts
            .iter()
            .position(|a| a.account_number.as_str() == account_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl FromIterator<Account> for AccountStore {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().collect(),
        }
    }
}

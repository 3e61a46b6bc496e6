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

//! Ledger service.
//!
//! The [`LedgerService`] owns the bank [`Snapshot`] and its
//! [`PersistenceGateway`]. Every operation that reads a balance and then
//! writes an entry runs under one lock, and the snapshot is persisted before
//! the lock is released.
//!
//! # Postings
//!
//! - **Credit**: adds the amount to the account's running balance.
//! - **Debit**: subtracts the amount; fails if the balance would go negative.
//! - **Transfer**: a debit naming a recipient. The recipient receives a
//!   mirrored credit `"Received from <sender>"`.
//!
//! If the snapshot cannot be persisted the in-memory change is rolled back,
//! so memory never runs ahead of the last successful write.

use crate::account::Account;
use crate::base::AccountNumber;
use crate::error::LedgerError;
use crate::persistence::PersistenceGateway;
use crate::snapshot::Snapshot;
use crate::transaction::{EntryType, TransactionEntry, today};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

/// Service-level settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Reject transfers whose recipient does not exist instead of posting
    /// the debit without a mirrored credit.
    pub strict_transfers: bool,
}

/// A request to post one entry against an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub account_number: AccountNumber,
    pub description: String,
    pub amount: Decimal,
    pub entry_type: EntryType,
    pub recipient: Option<AccountNumber>,
}

impl Posting {
    pub fn credit(
        account_number: impl Into<AccountNumber>,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            description: description.into(),
            amount,
            entry_type: EntryType::Credit,
            recipient: None,
        }
    }

    pub fn debit(
        account_number: impl Into<AccountNumber>,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            entry_type: EntryType::Debit,
            ..Self::credit(account_number, description, amount)
        }
    }

    /// Names the account that receives the mirrored credit.
    pub fn to(mut self, recipient: impl Into<AccountNumber>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }
}

/// Core banking operations over a persisted snapshot.
pub struct LedgerService {
    state: Mutex<Snapshot>,
    gateway: Box<dyn PersistenceGateway>,
    config: ServiceConfig,
}

impl LedgerService {
    /// Loads the snapshot from `gateway` with default settings.
    pub fn open(gateway: impl PersistenceGateway + 'static) -> Self {
        Self::with_config(gateway, ServiceConfig::default())
    }

    pub fn with_config(gateway: impl PersistenceGateway + 'static, config: ServiceConfig) -> Self {
        let snapshot = gateway.load();
        if let Err(e) = snapshot.transactions.verify_all() {
            warn!(error = %e, "loaded snapshot violates the running-balance invariant");
        }
        info!(
            users = snapshot.users.len(),
            strict_transfers = config.strict_transfers,
            "ledger service ready"
        );

        Self {
            state: Mutex::new(snapshot),
            gateway: Box::new(gateway),
            config,
        }
    }

    pub fn config(&self) -> ServiceConfig {
        self.config
    }

    /// Posts a credit, debit or transfer and returns the sender's new entry.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - Amount is zero or negative.
    /// - [`LedgerError::InsufficientFunds`] - Debit exceeds the current balance.
    /// - [`LedgerError::BalanceOverflow`] - A resulting balance would not fit
    ///   in a [`Decimal`]; nothing was posted.
    /// - [`LedgerError::AccountNotFound`] - Transfer to an unknown account with
    ///   [`ServiceConfig::strict_transfers`] set.
    /// - [`LedgerError::Persistence`] - The snapshot could not be written;
    ///   nothing was posted.
    pub fn post_transaction(&self, posting: Posting) -> Result<TransactionEntry, LedgerError> {
        if posting.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let mut state = self.state.lock();
        let sender = &posting.account_number;

        let sender_balance = state.transactions.latest_balance(sender.as_str());
        if posting.entry_type == EntryType::Debit && sender_balance < posting.amount {
            return Err(LedgerError::InsufficientFunds);
        }

        // Both balances are computed before anything is prepended.
        let sender_after = posting
            .entry_type
            .apply(sender_balance, posting.amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        let mirror = match self.mirror_target(&state, &posting)? {
            Some(recipient) => {
                let balance = EntryType::Credit
                    .apply(state.transactions.latest_balance(recipient.as_str()), posting.amount)
                    .ok_or(LedgerError::BalanceOverflow)?;
                Some((recipient, balance))
            }
            None => None,
        };

        let date = today();
        let sender_entry = TransactionEntry::new(
            date.clone(),
            posting.description,
            posting.amount,
            posting.entry_type,
            sender_after,
        );

        let sender_had_ledger = state.transactions.contains(sender.as_str());
        state.transactions.prepend(sender, sender_entry.clone());

        let mut recipient_had_ledger = true;
        if let Some((recipient, balance)) = &mirror {
            recipient_had_ledger = state.transactions.contains(recipient.as_str());
            state.transactions.prepend(
                recipient,
                TransactionEntry::new(
                    date,
                    format!("Received from {}", sender),
                    posting.amount,
                    EntryType::Credit,
                    *balance,
                ),
            );
        }

        if let Err(e) = self.commit(&state) {
            if let Some((recipient, _)) = &mirror {
                state.transactions.pop_front(recipient.as_str());
                if !recipient_had_ledger {
                    state.transactions.remove(recipient.as_str());
                }
            }
            state.transactions.pop_front(sender.as_str());
            if !sender_had_ledger {
                state.transactions.remove(sender.as_str());
            }
            return Err(e);
        }

        debug!(
            account = %sender,
            entry_type = %sender_entry.entry_type,
            amount = %sender_entry.amount,
            balance = %sender_entry.running_balance,
            recipient = ?mirror.as_ref().map(|(recipient, _)| recipient.as_str()),
            "posted transaction"
        );
        Ok(sender_entry)
    }

    /// Decides which account, if any, receives a mirrored credit.
    fn mirror_target(
        &self,
        state: &Snapshot,
        posting: &Posting,
    ) -> Result<Option<AccountNumber>, LedgerError> {
        let Some(recipient) = &posting.recipient else {
            return Ok(None);
        };
        if posting.entry_type != EntryType::Debit || recipient == &posting.account_number {
            return Ok(None);
        }
        if state.users.find(recipient.as_str()).is_some() {
            return Ok(Some(recipient.clone()));
        }
        if self.config.strict_transfers {
            return Err(LedgerError::AccountNotFound);
        }

        warn!(
            account = %posting.account_number,
            recipient = %recipient,
            "transfer recipient does not exist, posting debit without mirrored credit"
        );
        Ok(None)
    }

    /// Creates an account with an empty ledger.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DuplicateAccount`] - The account number is taken.
    /// - [`LedgerError::Persistence`] - The snapshot could not be written.
    pub fn signup(
        &self,
        account_number: impl Into<AccountNumber>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Account, LedgerError> {
        let account_number = account_number.into();
        let mut state = self.state.lock();

        let account = state.users.create(account_number.clone(), name, password)?;
        let had_ledger = state.transactions.contains(account_number.as_str());
        state.transactions.open(&account_number);

        if let Err(e) = self.commit(&state) {
            let removed = state.users.remove(account_number.as_str());
            debug_assert!(removed.is_ok(), "account created under the same lock");
            if !had_ledger {
                state.transactions.remove(account_number.as_str());
            }
            return Err(e);
        }

        info!(account = %account_number, "account created");
        Ok(account)
    }

    /// Checks credentials and returns the matching account.
    pub fn login(&self, account_number: &str, password: &str) -> Result<Account, LedgerError> {
        self.state.lock().users.authenticate(account_number, password)
    }

    /// All entries for an account, most recent first.
    pub fn transactions(&self, account_number: &str) -> Vec<TransactionEntry> {
        self.state.lock().transactions.entries_for(account_number)
    }

    pub fn balance(&self, account_number: &str) -> Decimal {
        self.state.lock().transactions.latest_balance(account_number)
    }

    pub fn find_account(&self, account_number: &str) -> Option<Account> {
        self.state.lock().users.find(account_number).cloned()
    }

    pub fn list_accounts(&self) -> Vec<Account> {
        self.state.lock().users.iter().cloned().collect()
    }

    /// Changes an account's name and/or password.
    pub fn update_account(
        &self,
        account_number: &str,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<Account, LedgerError> {
        let mut state = self.state.lock();

        let previous = state
            .users
            .find(account_number)
            .cloned()
            .ok_or(LedgerError::AccountNotFound)?;
        let updated = state.users.update(account_number, name, password)?;

        if let Err(e) = self.commit(&state) {
            let restored = state
                .users
                .update(account_number, Some(previous.name), Some(previous.password));
            debug_assert!(restored.is_ok(), "account found under the same lock");
            return Err(e);
        }

        info!(account = %account_number, "account updated");
        Ok(updated)
    }

    /// Deletes an account together with its ledger history.
    pub fn delete_account(&self, account_number: &str) -> Result<Account, LedgerError> {
        let mut state = self.state.lock();

        let position = state
            .users
            .position(account_number)
            .ok_or(LedgerError::AccountNotFound)?;
        let account = state.users.remove(account_number)?;
        let history = state.transactions.remove(account_number);

        if let Err(e) = self.commit(&state) {
            state.users.restore(position, account);
            if let Some(history) = history {
                state
                    .transactions
                    .insert(AccountNumber::from(account_number), history);
            }
            return Err(e);
        }

        info!(account = %account_number, "account deleted");
        Ok(account)
    }

    /// Checks the running-balance invariant of every ledger.
    pub fn verify(&self) -> Result<(), LedgerError> {
        self.state.lock().transactions.verify_all()
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().clone()
    }

    /// Writes the current state through the gateway.
    pub fn flush(&self) -> Result<(), LedgerError> {
        let state = self.state.lock();
        self.commit(&state)?;
        info!("snapshot flushed");
        Ok(())
    }

    fn commit(&self, state: &Snapshot) -> Result<(), LedgerError> {
        self.gateway.save(state).map_err(|e| {
            error!(error = %e, "failed to persist snapshot");
            LedgerError::from(e)
        })
    }
}

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

//! Account registry.
//!
//! The [`Ledger`] owns a set of [`Account`]s addressed by [`AccountId`] and a
//! [`Journal`] of every record they produce. It forwards deposits, withdrawals
//! and transfers to the accounts themselves, so the per-account locking rules
//! apply unchanged.
//!
//! # Thread Safety
//!
//! Accounts are stored as `Arc<Account>` in a [`DashMap`]. Lookups clone the
//! `Arc` and release the map shard before any account lock is taken, so the
//! map never participates in the account lock order.

use crate::TransactionError;
use crate::account::{Account, AccountSnapshot};
use crate::base::AccountId;
use crate::journal::Journal;
use crate::statistics::Statistics;
use crate::transaction::Transaction;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Registry of accounts plus a journal of every record they produce.
///
/// # Invariants
///
/// - Account identifiers are unique within a ledger.
/// - Every record returned by a ledger operation is also in [`Ledger::journal`].
///   Records made directly through an [`Account`] handle are only in that
///   account's history.
/// - The sum of all balances changes only through deposits and withdrawals;
///   transfers conserve it.
pub struct Ledger {
    /// Accounts indexed by identifier.
    accounts: DashMap<AccountId, Arc<Account>>,
    /// Every record produced through this ledger.
    journal: Journal,
}

impl Ledger {
    /// Creates a new ledger with no accounts.
    pub fn new() -> Self {
        Ledger {
            accounts: DashMap::new(),
            journal: Journal::new(),
        }
    }

    /// Opens and registers a new account.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::DuplicateAccount`] - `id` is already registered.
    /// - [`TransactionError::InvalidInitialBalance`] - `initial_balance` is negative.
    pub fn open_account(
        &self,
        id: impl Into<AccountId>,
        initial_balance: Decimal,
    ) -> Result<Arc<Account>, TransactionError> {
        let id = id.into();
        match self.accounts.entry(id.clone()) {
            Entry::Occupied(_) => Err(TransactionError::DuplicateAccount(id.0)),
            Entry::Vacant(entry) => {
                let account = Arc::new(Account::with_balance(id.clone(), initial_balance)?);
                entry.insert(Arc::clone(&account));
                tracing::info!(account = %id, %initial_balance, "account opened");
                Ok(account)
            }
        }
    }

    /// Retrieves an account by identifier.
    pub fn get_account(&self, id: &str) -> Option<Arc<Account>> {
        self.accounts.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns all accounts ordered by identifier.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        let mut accounts: Vec<Arc<Account>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Consistent view of every account, ordered by identifier.
    ///
    /// See [`Account::snapshot_all`]: no transfer between two registered
    /// accounts is ever visible half-applied.
    pub fn snapshot(&self) -> Vec<AccountSnapshot> {
        let accounts = self.accounts();
        Account::snapshot_all(accounts.iter().map(Arc::as_ref))
    }

    /// Aggregates over every account's history.
    ///
    /// Histories are the source of truth, so operations applied directly on
    /// an [`Account`] handle are counted even though they bypass the journal.
    pub fn statistics(&self) -> Statistics {
        let snapshots = self.snapshot();
        Statistics::from_transactions(
            snapshots
                .iter()
                .flat_map(|snapshot| snapshot.transactions.iter().map(Arc::as_ref)),
        )
    }

    /// Deposits into the account registered as `id`.
    ///
    /// # Errors
    ///
    /// [`TransactionError::AccountNotFound`] plus anything [`Account::deposit`] returns.
    pub fn deposit(
        &self,
        id: &str,
        amount: Decimal,
        description: &str,
    ) -> Result<Arc<Transaction>, TransactionError> {
        let account = self.require(id)?;
        let transaction = account
            .deposit(amount, description)
            .inspect_err(|e| tracing::debug!(account = id, %amount, "deposit rejected: {e}"))?;
        self.journal_record(&transaction);
        Ok(transaction)
    }

    /// Withdraws from the account registered as `id`.
    ///
    /// # Errors
    ///
    /// [`TransactionError::AccountNotFound`] plus anything [`Account::withdraw`] returns.
    pub fn withdraw(
        &self,
        id: &str,
        amount: Decimal,
        description: &str,
    ) -> Result<Arc<Transaction>, TransactionError> {
        let account = self.require(id)?;
        let transaction = account
            .withdraw(amount, description)
            .inspect_err(|e| tracing::debug!(account = id, %amount, "withdrawal rejected: {e}"))?;
        self.journal_record(&transaction);
        Ok(transaction)
    }

    /// Transfers between two registered accounts.
    ///
    /// # Errors
    ///
    /// [`TransactionError::AccountNotFound`] for either side plus anything
    /// [`Account::transfer`] returns.
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        description: &str,
    ) -> Result<(Arc<Transaction>, Arc<Transaction>), TransactionError> {
        let sender = self.require(from)?;
        let recipient = self.require(to)?;
        let (debit, credit) = sender
            .transfer(&recipient, amount, description)
            .inspect_err(|e| tracing::debug!(from, to, %amount, "transfer rejected: {e}"))?;
        self.journal_record(&debit);
        self.journal_record(&credit);
        Ok((debit, credit))
    }

    fn require(&self, id: &str) -> Result<Arc<Account>, TransactionError> {
        self.get_account(id)
            .ok_or_else(|| TransactionError::AccountNotFound(id.to_owned()))
    }

    /// Indexes an already-applied record.
    ///
    /// The balance change has happened by now, so a journal conflict is
    /// reported but cannot undo the operation.
    fn journal_record(&self, transaction: &Arc<Transaction>) {
        if let Err(e) = self.journal.record(Arc::clone(transaction)) {
            tracing::error!(tx = %transaction.id(), "failed to journal transaction: {e}");
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

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
//! An [`Account`] owns a balance and an append-only history of the
//! [`Transaction`] records it took part in. Every balance change goes through
//! [`Account::deposit`], [`Account::withdraw`] or [`Account::transfer`], each of
//! which validates first and mutates only once nothing can fail any more.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use account_ledger::Account;
//!
//! let alice = Account::with_balance("ACC001", dec!(2500.00)).unwrap();
//! let bob = Account::with_balance("ACC002", dec!(1200.00)).unwrap();
//!
//! alice.deposit(dec!(500.00), "Monthly salary").unwrap();
//! alice.transfer(&bob, dec!(250.00), "Rent split payment").unwrap();
//!
//! assert_eq!(alice.balance(), dec!(2750.00));
//! assert_eq!(bob.balance(), dec!(1450.00));
//! ```

use crate::TransactionError;
use crate::base::AccountId;
use crate::transaction::{Direction, Transaction, TransactionKind};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use std::sync::Arc;

#[derive(Debug)]
struct AccountData {
    initial_balance: Decimal,
    balance: Decimal,
    /// Completed records in the order they were applied.
    transactions: Vec<Arc<Transaction>>,
}

impl AccountData {
    fn new(initial_balance: Decimal) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            transactions: Vec::new(),
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance went negative: {}",
            self.balance
        );
    }

    /// Balance after crediting `amount`, without applying it.
    fn credited(&self, amount: Decimal) -> Result<Decimal, TransactionError> {
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidAmount);
        }
        self.balance
            .checked_add(amount)
            .ok_or(TransactionError::BalanceOverflow)
    }

    /// Balance after debiting `amount`, without applying it.
    fn debited(&self, amount: Decimal) -> Result<Decimal, TransactionError> {
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidAmount);
        }
        if self.balance < amount {
            return Err(TransactionError::InsufficientFunds);
        }
        Ok(self.balance - amount)
    }

    /// Applies a balance computed by [`credited`](Self::credited) or
    /// [`debited`](Self::debited) and records the completed transaction.
    fn commit(&mut self, balance: Decimal, mut transaction: Transaction) -> Arc<Transaction> {
        transaction.complete();
        let transaction = Arc::new(transaction);
        self.balance = balance;
        self.transactions.push(Arc::clone(&transaction));
        self.assert_invariants();
        transaction
    }
}

/// Point-in-time view of an account, read under a single lock acquisition.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub balance: Decimal,
    pub transactions: Vec<Arc<Transaction>>,
}

/// Ledger account.
///
/// Balance and history live behind one mutex, so readers always see either
/// the state before or after an operation. Transfers lock both accounts in
/// ascending [`AccountId`] order, which rules out deadlock between transfers
/// crossing in opposite directions.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    inner: Mutex<AccountData>,
}

impl Account {
    const DECIMAL_PRECISION: u32 = 4;

    /// Opens an account with a zero balance.
    pub fn new(id: impl Into<AccountId>) -> Self {
        Self {
            id: id.into(),
            inner: Mutex::new(AccountData::new(Decimal::ZERO)),
        }
    }

    /// Opens an account with an initial balance.
    ///
    /// # Errors
    ///
    /// [`TransactionError::InvalidInitialBalance`] if `initial_balance` is negative.
    pub fn with_balance(
        id: impl Into<AccountId>,
        initial_balance: Decimal,
    ) -> Result<Self, TransactionError> {
        if initial_balance < Decimal::ZERO {
            return Err(TransactionError::InvalidInitialBalance);
        }
        Ok(Self {
            id: id.into(),
            inner: Mutex::new(AccountData::new(initial_balance)),
        })
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn balance(&self) -> Decimal {
        self.inner.lock().balance
    }

    pub fn initial_balance(&self) -> Decimal {
        self.inner.lock().initial_balance
    }

    pub fn transaction_count(&self) -> usize {
        self.inner.lock().transactions.len()
    }

    /// Returns the history in chronological order.
    pub fn transactions(&self) -> Vec<Arc<Transaction>> {
        self.inner.lock().transactions.clone()
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        self.snapshot_of(&self.inner.lock())
    }

    /// Snapshots several accounts under one consistent view, ordered by id.
    ///
    /// Locks are taken in the same ascending `(id, address)` order transfers
    /// use and are all held until the last snapshot is built, so a transfer
    /// between two of the accounts is seen either fully applied or not at all.
    /// The same account passed twice is snapshotted once.
    pub fn snapshot_all<'a, I>(accounts: I) -> Vec<AccountSnapshot>
    where
        I: IntoIterator<Item = &'a Account>,
    {
        let mut accounts: Vec<&Account> = accounts.into_iter().collect();
        accounts.sort_by(|a, b| a.lock_key().cmp(&b.lock_key()));
        accounts.dedup_by(|a, b| std::ptr::eq(*a, *b));

        let guards: Vec<MutexGuard<'_, AccountData>> =
            accounts.iter().map(|account| account.inner.lock()).collect();
        accounts
            .iter()
            .zip(&guards)
            .map(|(account, data)| account.snapshot_of(data))
            .collect()
    }

    fn snapshot_of(&self, data: &AccountData) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id.clone(),
            balance: data.balance,
            transactions: data.transactions.clone(),
        }
    }

    /// Checks that the balance equals the initial balance plus the net effect
    /// of every completed record in the history.
    pub fn verify_balance(&self) -> bool {
        let data = self.inner.lock();
        let replayed = data
            .transactions
            .iter()
            .fold(data.initial_balance, |balance, tx| {
                balance + tx.signed_amount()
            });
        replayed == data.balance
    }

    /// Credits `amount` and records a completed deposit.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InvalidAmount`] - `amount` is zero or negative.
    /// - [`TransactionError::BalanceOverflow`] - the new balance is not representable.
    pub fn deposit(
        &self,
        amount: Decimal,
        description: &str,
    ) -> Result<Arc<Transaction>, TransactionError> {
        let mut data = self.inner.lock();
        let balance = data.credited(amount)?;
        let transaction =
            Transaction::new(self.id.clone(), amount, TransactionKind::Deposit, description)?;
        let transaction = data.commit(balance, transaction);

        tracing::debug!(account = %self.id, %amount, %balance, tx = %transaction.id(), "deposit applied");
        Ok(transaction)
    }

    /// Debits `amount` and records a completed withdrawal.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InvalidAmount`] - `amount` is zero or negative.
    /// - [`TransactionError::InsufficientFunds`] - `amount` exceeds the balance.
    pub fn withdraw(
        &self,
        amount: Decimal,
        description: &str,
    ) -> Result<Arc<Transaction>, TransactionError> {
        let mut data = self.inner.lock();
        let balance = data.debited(amount)?;
        let transaction = Transaction::new(
            self.id.clone(),
            amount,
            TransactionKind::Withdrawal,
            description,
        )?;
        let transaction = data.commit(balance, transaction);

        tracing::debug!(account = %self.id, %amount, %balance, tx = %transaction.id(), "withdrawal applied");
        Ok(transaction)
    }

    /// Moves `amount` from this account to `recipient`.
    ///
    /// Returns the `(debit, credit)` pair: the debit is appended to this
    /// account's history, the credit to the recipient's. Both accounts stay
    /// locked from validation until both records are appended.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::SelfTransfer`] - `recipient` is this account.
    /// - [`TransactionError::InvalidAmount`] - `amount` is zero or negative.
    /// - [`TransactionError::InsufficientFunds`] - `amount` exceeds the sender's balance.
    /// - [`TransactionError::BalanceOverflow`] - the recipient's new balance is not representable.
    pub fn transfer(
        &self,
        recipient: &Account,
        amount: Decimal,
        description: &str,
    ) -> Result<(Arc<Transaction>, Arc<Transaction>), TransactionError> {
        if std::ptr::eq(self, recipient) {
            return Err(TransactionError::SelfTransfer);
        }

        let (mut sender, mut receiver) = self.lock_pair(recipient);

        // Every fallible step happens before the first mutation.
        let sender_balance = sender.debited(amount)?;
        let recipient_balance = receiver.credited(amount)?;
        let debit = Transaction::new(
            self.id.clone(),
            amount,
            TransactionKind::Transfer {
                counterparty: recipient.id.clone(),
                direction: Direction::Debit,
            },
            format!("Transfer to {}: {}", recipient.id, description),
        )?;
        let credit = Transaction::new(
            recipient.id.clone(),
            amount,
            TransactionKind::Transfer {
                counterparty: self.id.clone(),
                direction: Direction::Credit,
            },
            format!("Transfer from {}: {}", self.id, description),
        )?;

        let debit = sender.commit(sender_balance, debit);
        let credit = receiver.commit(recipient_balance, credit);

        tracing::debug!(
            from = %self.id,
            to = %recipient.id,
            %amount,
            debit = %debit.id(),
            credit = %credit.id(),
            "transfer applied"
        );
        Ok((debit, credit))
    }

    /// Locks `self` and `other`, always in ascending `(id, address)` order.
    ///
    /// Guards are returned as `(self, other)` regardless of acquisition order.
    fn lock_pair<'a>(
        &'a self,
        other: &'a Account,
    ) -> (MutexGuard<'a, AccountData>, MutexGuard<'a, AccountData>) {
        if self.lock_key() < other.lock_key() {
            let mine = self.inner.lock();
            let theirs = other.inner.lock();
            (mine, theirs)
        } else {
            let theirs = other.inner.lock();
            let mine = self.inner.lock();
            (mine, theirs)
        }
    }

    fn lock_key(&self) -> (&AccountId, usize) {
        (&self.id, self as *const Account as usize)
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Account", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field(
            "balance",
            &data.balance.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.serialize_field("transactions", &data.transactions)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionStatus;
    use rust_decimal_macros::dec;

    // === AccountData Internal Tests ===

    #[test]
    fn credited_does_not_mutate() {
        let data = AccountData::new(dec!(100.00));
        assert_eq!(data.credited(dec!(5.00)), Ok(dec!(105.00)));
        assert_eq!(data.balance, dec!(100.00));
    }

    #[test]
    fn debited_does_not_mutate() {
        let data = AccountData::new(dec!(100.00));
        assert_eq!(data.debited(dec!(100.00)), Ok(Decimal::ZERO));
        assert_eq!(data.balance, dec!(100.00));
    }

    #[test]
    fn debited_checks_amount_before_funds() {
        let data = AccountData::new(Decimal::ZERO);
        assert_eq!(data.debited(dec!(-1)), Err(TransactionError::InvalidAmount));
        assert_eq!(
            data.debited(dec!(1)),
            Err(TransactionError::InsufficientFunds)
        );
    }

    #[test]
    fn credited_reports_overflow() {
        let data = AccountData::new(Decimal::MAX);
        assert_eq!(
            data.credited(dec!(1)),
            Err(TransactionError::BalanceOverflow)
        );
    }

    #[test]
    fn commit_completes_and_appends() {
        let mut data = AccountData::new(Decimal::ZERO);
        let tx = Transaction::new(
            AccountId::from("ACC001"),
            dec!(10),
            TransactionKind::Deposit,
            "",
        )
        .unwrap();
        let balance = data.credited(tx.amount()).unwrap();
        let tx = data.commit(balance, tx);
        assert_eq!(tx.status(), TransactionStatus::Completed);
        assert_eq!(data.balance, dec!(10));
        assert_eq!(data.transactions.len(), 1);
        assert!(Arc::ptr_eq(&tx, &data.transactions[0]));
    }

    // === Locking ===

    #[test]
    fn lock_pair_returns_guards_in_caller_order() {
        let low = Account::with_balance("ACC001", dec!(1)).unwrap();
        let high = Account::with_balance("ACC002", dec!(2)).unwrap();

        let (mine, theirs) = high.lock_pair(&low);
        assert_eq!(mine.balance, dec!(2));
        assert_eq!(theirs.balance, dec!(1));
    }

    #[test]
    fn lock_pair_handles_duplicate_ids() {
        let a = Account::with_balance("ACC001", dec!(1)).unwrap();
        let b = Account::with_balance("ACC001", dec!(2)).unwrap();

        let (mine, theirs) = a.lock_pair(&b);
        assert_eq!(mine.balance, dec!(1));
        assert_eq!(theirs.balance, dec!(2));
    }

    #[test]
    fn snapshot_all_orders_by_id_and_skips_repeats() {
        let high = Account::with_balance("ACC002", dec!(2)).unwrap();
        let low = Account::with_balance("ACC001", dec!(1)).unwrap();
        low.deposit(dec!(4), "").unwrap();

        let snapshots = Account::snapshot_all([&high, &low, &high]);
        let ids: Vec<&str> = snapshots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["ACC001", "ACC002"]);
        assert_eq!(snapshots[0].balance, dec!(5));
        assert_eq!(snapshots[0].transactions.len(), 1);
        assert_eq!(snapshots[1].balance, dec!(2));
    }

    #[test]
    fn snapshot_all_keeps_same_id_accounts_apart() {
        let a = Account::with_balance("ACC001", dec!(1)).unwrap();
        let b = Account::with_balance("ACC001", dec!(2)).unwrap();

        let total: Decimal = Account::snapshot_all([&a, &b])
            .iter()
            .map(|s| s.balance)
            .sum();
        assert_eq!(total, dec!(3));
    }

    // === Serialization Tests ===

    #[test]
    fn serializer_rounds_to_four_decimal_places() {
        let account = Account::new("ACC001");
        account.inner.lock().balance = dec!(123.456789);

        let parsed = serde_json::to_value(&account).unwrap();
        assert_eq!(parsed["id"], "ACC001");
        assert_eq!(parsed["balance"].as_str().unwrap(), "123.4568");
    }

    #[test]
    fn serializer_includes_history() {
        let account = Account::with_balance("ACC001", dec!(10.00)).unwrap();
        account.withdraw(dec!(2.50), "Coffee shop").unwrap();

        let parsed = serde_json::to_value(&account).unwrap();
        assert_eq!(parsed["balance"].as_str().unwrap(), "7.50");
        let history = parsed["transactions"].as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["type"], "withdrawal");
        assert_eq!(history[0]["description"], "Coffee shop");
    }
}

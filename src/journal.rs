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

//! Thread-safe journal of completed transaction records.
//!
//! Every record produced through the [`Ledger`](crate::Ledger) is indexed here
//! by its identifier for lookup by ID. Records made directly on an account
//! handle never reach the journal.

use crate::TransactionError;
use crate::base::TransactionId;
use crate::statistics::Statistics;
use crate::transaction::Transaction;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// An append-only, duplicate-rejecting index of transaction records.
///
/// Records are shared with the owning account's history through [`Arc`];
/// the journal never mutates them.
#[derive(Debug)]
pub struct Journal {
    transactions: DashMap<TransactionId, Arc<Transaction>>,
}

impl Journal {
    /// Creates a new empty journal.
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
        }
    }

    /// Adds a record to the journal.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::DuplicateTransaction`] if a record
    /// with the same ID is already present.
    pub fn record(&self, transaction: Arc<Transaction>) -> Result<(), TransactionError> {
        // Entry API gives an atomic check-and-insert.
        match self.transactions.entry(transaction.id()) {
            Entry::Occupied(_) => Err(TransactionError::DuplicateTransaction),
            Entry::Vacant(entry) => {
                entry.insert(transaction);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &TransactionId) -> Option<Arc<Transaction>> {
        self.transactions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn statistics(&self) -> Statistics {
        let transactions: Vec<Arc<Transaction>> = self
            .transactions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        Statistics::from_transactions(transactions.iter().map(Arc::as_ref))
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

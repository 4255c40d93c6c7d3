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

//! Transaction records.
//!
//! A record captures one monetary movement on one account. Its status follows
//! a single transition:
//! - [`Pending`] → [`Completed`] (via [`Transaction::complete`])
//! - [`Pending`] → [`Failed`] (via [`Transaction::fail`])
//!
//! Both targets are terminal. Once an account operation has completed a record
//! it is wrapped in an [`Arc`](std::sync::Arc) and never mutated again.
//!
//! [`Pending`]: TransactionStatus::Pending
//! [`Completed`]: TransactionStatus::Completed
//! [`Failed`]: TransactionStatus::Failed

use crate::TransactionError;
use crate::base::{AccountId, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Which half of a transfer a record describes.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sender side: funds leave the owning account.
    Debit,
    /// Recipient side: funds enter the owning account.
    Credit,
}

/// Kind of monetary movement.
///
/// The counterparty only exists on [`TransactionKind::Transfer`], so a
/// non-transfer record can never carry one.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer {
        counterparty: AccountId,
        direction: Direction,
    },
    Payment,
}

impl TransactionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Transfer { .. } => "TRANSFER",
            Self::Payment => "PAYMENT",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        })
    }
}

/// One auditable monetary movement.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Transaction {
    id: TransactionId,
    account_id: AccountId,
    amount: Decimal,
    #[serde(flatten)]
    kind: TransactionKind,
    description: String,
    timestamp: DateTime<Utc>,
    status: TransactionStatus,
}

impl Transaction {
    /// Creates a pending record with a fresh identifier and the current time.
    ///
    /// # Errors
    ///
    /// [`TransactionError::InvalidAmount`] if `amount` is zero or negative.
    pub fn new(
        account_id: AccountId,
        amount: Decimal,
        kind: TransactionKind,
        description: impl Into<String>,
    ) -> Result<Self, TransactionError> {
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidAmount);
        }
        Ok(Self {
            id: TransactionId::generate(),
            account_id,
            amount,
            kind,
            description: description.into(),
            timestamp: Utc::now(),
            status: TransactionStatus::Pending,
        })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The other side of a transfer; `None` for every other kind.
    pub fn counterparty(&self) -> Option<&AccountId> {
        match &self.kind {
            TransactionKind::Transfer { counterparty, .. } => Some(counterparty),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn complete(&mut self) {
        debug_assert_eq!(
            self.status,
            TransactionStatus::Pending,
            "completing transaction {} in terminal state",
            self.id
        );
        self.status = TransactionStatus::Completed;
    }

    pub fn fail(&mut self) {
        debug_assert_eq!(
            self.status,
            TransactionStatus::Pending,
            "failing transaction {} in terminal state",
            self.id
        );
        self.status = TransactionStatus::Failed;
    }

    /// Balance effect of this record on its owning account.
    ///
    /// Only completed records move money; pending and failed ones yield zero.
    pub fn signed_amount(&self) -> Decimal {
        if self.status != TransactionStatus::Completed {
            return Decimal::ZERO;
        }
        match &self.kind {
            TransactionKind::Deposit
            | TransactionKind::Transfer {
                direction: Direction::Credit,
                ..
            } => self.amount,
            TransactionKind::Withdrawal
            | TransactionKind::Payment
            | TransactionKind::Transfer {
                direction: Direction::Debit,
                ..
            } => -self.amount,
        }
    }
}

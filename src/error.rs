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

//! Error types for ledger operations and webhook signature checks.

use thiserror::Error;

/// Ledger operation errors.
///
/// Every variant is a precondition failure detected before any balance or
/// history is touched, so a returned error always means "nothing changed".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Withdrawal or transfer would exceed the balance
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Account opened with a negative balance
    #[error("initial balance must not be negative")]
    InvalidInitialBalance,

    /// Sender and recipient are the same account
    #[error("cannot transfer to the same account")]
    SelfTransfer,

    /// Resulting balance does not fit in a decimal
    #[error("balance overflow")]
    BalanceOverflow,

    /// No account registered under the given identifier
    #[error("account {0} not found")]
    AccountNotFound(String),

    /// An account with this identifier is already registered
    #[error("account {0} already exists")]
    DuplicateAccount(String),

    /// Duplicate transaction ID
    #[error("duplicate transaction ID")]
    DuplicateTransaction,
}

/// Webhook signature verification errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header must start with `sha256=`")]
    MissingPrefix,

    #[error("signature is not valid hex")]
    InvalidHex,

    #[error("invalid signing secret")]
    InvalidSecret,

    #[error("signature mismatch")]
    Mismatch,
}

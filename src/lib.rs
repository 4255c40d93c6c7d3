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

//! # Account Ledger
//!
//! This library provides an in-memory ledger of accounts holding monetary
//! balances, with deposits, withdrawals, and atomic transfers between
//! accounts. Every balance change leaves an auditable [`Transaction`] record
//! in the owning account's history.
//!
//! ## Core Components
//!
//! - [`Account`]: Balance plus append-only history; validates and applies operations
//! - [`Transaction`]: Immutable-once-completed record of one monetary movement
//! - [`Ledger`]: Registry of accounts addressed by [`AccountId`], with a [`Journal`]
//! - [`TransactionError`]: Error types for rejected operations
//!
//! ## Example
//!
//! ```
//! use account_ledger::{Ledger, TransactionError, TransactionStatus};
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new();
//! ledger.open_account("ACC001", dec!(2500.00)).unwrap();
//! ledger.open_account("ACC002", dec!(1200.00)).unwrap();
//!
//! let deposit = ledger.deposit("ACC001", dec!(500.00), "Monthly salary").unwrap();
//! assert_eq!(deposit.status(), TransactionStatus::Completed);
//!
//! let (debit, credit) = ledger
//!     .transfer("ACC001", "ACC002", dec!(250.00), "Rent split payment")
//!     .unwrap();
//! assert_eq!(debit.counterparty().unwrap().as_str(), "ACC002");
//! assert_eq!(credit.counterparty().unwrap().as_str(), "ACC001");
//!
//! let result = ledger.withdraw("ACC001", dec!(10000.00), "Large withdrawal attempt");
//! assert_eq!(result.unwrap_err(), TransactionError::InsufficientFunds);
//!
//! assert_eq!(ledger.get_account("ACC001").unwrap().balance(), dec!(2750.00));
//! assert_eq!(ledger.get_account("ACC002").unwrap().balance(), dec!(1450.00));
//! ```
//!
//! ## Thread Safety
//!
//! Each account guards its balance and history with its own mutex. Transfers
//! lock both accounts in ascending identifier order, so concurrent transfers
//! never deadlock and no reader ever sees one side applied without the other.

pub mod account;
mod base;
pub mod error;
mod journal;
mod ledger;
pub mod signature;
mod statistics;
mod transaction;

pub use account::{Account, AccountSnapshot};
pub use base::{AccountId, TransactionId};
pub use error::{SignatureError, TransactionError};
pub use journal::Journal;
pub use ledger::Ledger;
pub use statistics::Statistics;
pub use transaction::{Direction, Transaction, TransactionKind, TransactionStatus};

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

//! Aggregate figures over a set of transaction records.

use crate::transaction::Transaction;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Count, volume and average size of a set of records.
///
/// Both halves of a transfer are separate records and are counted separately.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Statistics {
    pub transaction_count: usize,
    pub total_volume: Decimal,
    /// Mean record amount rounded to cents; `None` when there are no records.
    pub average_size: Option<Decimal>,
}

impl Statistics {
    const AVERAGE_PRECISION: u32 = 2;

    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let (count, volume) = transactions
            .into_iter()
            .fold((0usize, Decimal::ZERO), |(count, volume), tx| {
                (count + 1, volume + tx.amount())
            });

        let average_size = (count > 0)
            .then(|| (volume / Decimal::from(count)).round_dp(Self::AVERAGE_PRECISION));

        Self {
            transaction_count: count,
            total_volume: volume,
            average_size,
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Transactions Processed: {}", self.transaction_count)?;
        writeln!(f, "Total Transaction Volume: ${}", self.total_volume)?;
        match self.average_size {
            Some(average) => write!(f, "Average Transaction Size: ${average:.2}"),
            None => write!(f, "Average Transaction Size: n/a"),
        }
    }
}

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

//! CSV account statements.
//!
//! # CSV Format
//!
//! Columns: `date, description, type, amount, balance`, most recent first.
//!
//! ```csv
//! date,description,type,amount,balance
//! 12/16/2025,Grocery Store,debit,150.00,4850.00
//! 12/15/2025,Opening Balance,credit,5000.00,5000.00
//! ```

use crate::transaction::{EntryType, TransactionEntry};
use csv::Writer;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct StatementRow<'a> {
    date: &'a str,
    description: &'a str,
    #[serde(rename = "type")]
    entry_type: EntryType,
    amount: String,
    balance: String,
}

impl<'a> From<&'a TransactionEntry> for StatementRow<'a> {
    fn from(entry: &'a TransactionEntry) -> Self {
        Self {
            date: &entry.date,
            description: &entry.description,
            entry_type: entry.entry_type,
            amount: format!("{:.2}", entry.amount),
            balance: format!("{:.2}", entry.running_balance),
        }
    }
}

/// Writes `entries` as a CSV statement.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_statement<W: Write>(entries: &[TransactionEntry], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    if entries.is_empty() {
        wtr.write_record(["date", "description", "type", "amount", "balance"])?;
    }
    for entry in entries {
        wtr.serialize(StatementRow::from(entry))?;
    }

    wtr.flush()?;
    Ok(())
}

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

//! Core identifier type for customer accounts.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Customer-facing account number.
///
/// Account numbers are opaque strings chosen at signup. Comparison is exact
/// and case-sensitive: `"A1"` and `"a1"` are different accounts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AccountNumber(pub String);

impl AccountNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AccountNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for AccountNumber {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_is_case_sensitive() {
        assert_ne!(AccountNumber::from("ab1"), AccountNumber::from("AB1"));
        assert_eq!(AccountNumber::from("ab1"), AccountNumber::new("ab1".to_string()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&AccountNumber::from("1001")).unwrap();
        assert_eq!(json, "\"1001\"");
    }
}

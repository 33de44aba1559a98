//! Journal-type filter over journal numbers.
//!
//! A journal numbered `bN` is the *breakdown* of the *commitment* journal
//! `N`. Reports can count either side, both, or the net view in which a
//! breakdown replaces its commitment.
//!
//! A reversing entry `N-R` is classified as `N`, so it is counted exactly
//! when the entry it offsets is counted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ledger::reversal::REVERSAL_SUFFIX;
use crate::reports::error::ReportError;

/// Prefix marking a breakdown journal number.
pub const BREAKDOWN_PREFIX: char = 'b';

/// Which journals a report counts, by number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalTypeFilter {
    /// Every journal.
    #[default]
    All,
    /// Only unprefixed numbers.
    Commitment,
    /// Only `b`-prefixed numbers.
    Breakdown,
    /// Every breakdown, plus commitments without a breakdown.
    Net,
    /// Only complete `N` / `bN` pairs, both members.
    Paired,
}

impl JournalTypeFilter {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Commitment => "commitment",
            Self::Breakdown => "breakdown",
            Self::Net => "net",
            Self::Paired => "paired",
        }
    }

    /// Returns the numbers this filter admits.
    ///
    /// One pass builds the set of present numbers, a second decides each
    /// number by its base number with constant-time lookups.
    #[must_use]
    pub fn admitted<'a, I>(self, numbers: I) -> HashSet<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: HashSet<&'a str> = numbers.into_iter().collect();
        if self == Self::All {
            return present;
        }

        let bases: HashSet<&str> = present.iter().map(|n| base_number(n)).collect();
        present
            .iter()
            .copied()
            .filter(|number| self.admits(base_number(number), &bases))
            .collect()
    }

    fn admits(self, number: &str, present: &HashSet<&str>) -> bool {
        match (self, commitment_of(number)) {
            (Self::All, _) | (Self::Net | Self::Breakdown, Some(_)) => true,
            (Self::Commitment, commitment) => commitment.is_none(),
            (Self::Breakdown, None) => false,
            (Self::Net, None) => !present.contains(breakdown_of(number).as_str()),
            (Self::Paired, Some(commitment)) => present.contains(commitment),
            (Self::Paired, None) => present.contains(breakdown_of(number).as_str()),
        }
    }
}

impl std::fmt::Display for JournalTypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JournalTypeFilter {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "commitment" => Ok(Self::Commitment),
            "breakdown" => Ok(Self::Breakdown),
            "net" => Ok(Self::Net),
            "paired" => Ok(Self::Paired),
            _ => Err(ReportError::InvalidJournalType(s.to_string())),
        }
    }
}

/// The number a reversing entry offsets: `N-R` -> `N`, `N-R-R` -> `N`.
#[must_use]
pub fn base_number(number: &str) -> &str {
    let mut base = number;
    while let Some(rest) = base.strip_suffix(REVERSAL_SUFFIX) {
        base = rest;
    }
    base
}

/// Returns true for breakdown numbers (`bN`).
#[must_use]
pub fn is_breakdown(number: &str) -> bool {
    commitment_of(number).is_some()
}

/// `bN` -> `Some("N")`, anything else -> `None`.
#[must_use]
pub fn commitment_of(number: &str) -> Option<&str> {
    number
        .strip_prefix(BREAKDOWN_PREFIX)
        .filter(|rest| !rest.is_empty())
}

/// `N` -> `bN`.
#[must_use]
pub fn breakdown_of(number: &str) -> String {
    format!("{BREAKDOWN_PREFIX}{number}")
}

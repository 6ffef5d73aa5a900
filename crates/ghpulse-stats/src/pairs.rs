//! Contributor pair ranking.
//!
//! Identifies pairs of contributors that modified the same files, which
//! points at shared ownership and likely review partners.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::contributors::ContributorFileMap;

/// An unordered pair of distinct contributor logins.
///
/// Stored normalized: `first` is the lexicographically smaller login.
///
/// # Examples
///
/// ```
/// use ghpulse_stats::pairs::ContributorPair;
///
/// let pair = ContributorPair::new("bob", "alice").unwrap();
/// assert_eq!(pair.first(), "alice");
/// assert_eq!(pair.to_string(), "alice - bob");
/// assert_eq!(pair, ContributorPair::new("alice", "bob").unwrap());
/// assert!(ContributorPair::new("alice", "alice").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContributorPair {
    first: String,
    second: String,
}

impl ContributorPair {
    /// Normalize `a` and `b` into a pair; `None` if they are the same login.
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Less => Some(Self {
                first: a.to_string(),
                second: b.to_string(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                first: b.to_string(),
                second: a.to_string(),
            }),
        }
    }

    /// The lexicographically smaller login.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger login.
    pub fn second(&self) -> &str {
        &self.second
    }
}

impl fmt::Display for ContributorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.first, self.second)
    }
}

/// Co-occurrence count per contributor pair.
pub type PairFrequency = HashMap<ContributorPair, u32>;

/// A pair together with the number of files both contributors modified.
///
/// # Examples
///
/// ```
/// use ghpulse_stats::pairs::{ContributorPair, RankedPair};
///
/// let ranked = RankedPair {
///     pair: ContributorPair::new("alice", "bob").unwrap(),
///     shared_files: 12,
/// };
/// assert_eq!(ranked.to_string(), "alice - bob : 12");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPair {
    /// The contributor pair.
    #[serde(flatten)]
    pub pair: ContributorPair,
    /// Files modified by both contributors.
    pub shared_files: u32,
}

impl fmt::Display for RankedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.pair, self.shared_files)
    }
}

/// Count, for every file, every unordered pair of distinct contributors.
///
/// A file with fewer than two contributors contributes nothing.
///
/// # Examples
///
/// ```
/// use ghpulse_stats::contributors::ContributorFileMap;
/// use ghpulse_stats::pairs::{count_pairs, ContributorPair};
///
/// let map: ContributorFileMap = [("x.txt", "a"), ("x.txt", "b"), ("y.txt", "a")]
///     .into_iter()
///     .collect();
/// let counts = count_pairs(&map);
/// assert_eq!(counts[&ContributorPair::new("a", "b").unwrap()], 1);
/// assert_eq!(counts.len(), 1);
/// ```
pub fn count_pairs(map: &ContributorFileMap) -> PairFrequency {
    let mut frequency = PairFrequency::new();

    for (_, logins) in map.iter() {
        let logins: Vec<&str> = logins.iter().map(String::as_str).collect();
        for i in 0..logins.len() {
            for j in (i + 1)..logins.len() {
                if let Some(pair) = ContributorPair::new(logins[i], logins[j]) {
                    *frequency.entry(pair).or_default() += 1;
                }
            }
        }
    }

    frequency
}

/// Sort pairs by descending count and keep the first `limit`.
///
/// Equal counts are ordered by the pair's logins so the output is stable
/// across runs.
pub fn rank_pairs(frequency: PairFrequency, limit: usize) -> Vec<RankedPair> {
    let mut ranked: Vec<RankedPair> = frequency
        .into_iter()
        .map(|(pair, shared_files)| RankedPair { pair, shared_files })
        .collect();

    ranked.sort_by(|a, b| {
        b.shared_files
            .cmp(&a.shared_files)
            .then_with(|| a.pair.cmp(&b.pair))
    });
    ranked.truncate(limit);

    ranked
}

/// Rank the contributor pairs of `map`, keeping the top `limit`.
pub fn top_pairs(map: &ContributorFileMap, limit: usize) -> Vec<RankedPair> {
    rank_pairs(count_pairs(map), limit)
}

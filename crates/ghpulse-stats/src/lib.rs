//! Contributor analytics over a repository's commit and pull-request history.
//!
//! - [`contributors`] builds the file→contributors map from commits
//! - [`pairs`] ranks contributor pairs by the number of files they share
//! - [`grouping`] groups commits by author login
//! - [`weekly`] computes per-contributor activity inside a trailing window
//! - [`pipeline`] runs either analysis end to end against a
//!   [`ghpulse_core::RepositorySource`]
//!
//! Per-item remote failures never abort an analysis: the item is logged,
//! recorded as a [`ghpulse_core::SkippedItem`], and processing continues.

pub mod contributors;
pub mod grouping;
pub mod memory;
pub mod pairs;
pub mod pipeline;
mod progress;
pub mod weekly;

//! Core types, configuration, and error handling for ghpulse.
//!
//! This crate provides the shared foundation used by the other ghpulse crates:
//! - [`PulseError`]: unified error type using `thiserror` and `miette`
//! - [`PulseConfig`]: configuration loaded from `.ghpulse.toml`
//! - [`Credential`]: the platform access token, read from the environment
//! - [`RepositorySource`]: the remote operations the analyses consume
//! - Shared types: [`Commit`], [`FileChange`], [`PullRequest`],
//!   [`ReviewComment`], [`Contributor`], [`RepoId`], [`OutputFormat`]

mod config;
mod error;
mod source;
mod types;

pub use config::{AnalysisConfig, Credential, GitHubConfig, PulseConfig, MAX_WINDOW_DAYS};
pub use error::PulseError;
pub use source::{ProgressObserver, RepositorySource};
pub use types::{
    Commit, Contributor, FileChange, ItemKind, OutputFormat, PullRequest, PullState, RepoId,
    RepositoryInfo, ReviewComment, SkippedItem,
};

/// A convenience `Result` type for ghpulse operations.
pub type Result<T> = std::result::Result<T, PulseError>;

//! GitHub REST access for ghpulse.
//!
//! Wraps `octocrab` to resolve a repository and list its commits, commit
//! files, pull requests, review comments, and contributors. The resolved
//! [`client::RemoteRepository`] implements [`ghpulse_core::RepositorySource`].

pub mod client;
mod wire;

pub use client::{GitHubClient, RemoteRepository};

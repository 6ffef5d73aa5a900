/// Errors that can occur across ghpulse.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette::Report` at the boundary.
///
/// # Examples
///
/// ```
/// use ghpulse_core::PulseError;
///
/// let err = PulseError::MissingCredential { var: "GITHUB_TOKEN".into() };
/// assert!(err.to_string().contains("GITHUB_TOKEN"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PulseError {
    /// Filesystem or terminal I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable access token in the environment.
    #[error("{var} is not set or empty")]
    #[diagnostic(help("export {var}=<personal access token> before running ghpulse"))]
    MissingCredential {
        /// Name of the environment variable that was consulted first.
        var: String,
    },

    /// The requested repository does not exist or is not visible to the token.
    #[error("repository not found: {repo}")]
    #[diagnostic(help("check the owner and repository name, and that the token can read it"))]
    RepositoryNotFound {
        /// The `owner/name` that was requested.
        repo: String,
    },

    /// A single remote item (commit, pull request) was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Platform API or transport failure.
    #[error("GitHub API error: {0}")]
    Api(String),

    /// A repository reference that is not of the form `owner/name`.
    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepo(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

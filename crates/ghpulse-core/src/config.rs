use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PulseError;

/// Fallback variable consulted when the configured token variable is unset.
const FALLBACK_TOKEN_ENV: &str = "GH_TOKEN";

/// Longest accepted activity window, about a century.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// Top-level configuration loaded from `.ghpulse.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use ghpulse_core::PulseConfig;
///
/// let config = PulseConfig::default();
/// assert_eq!(config.analysis.top_pairs, 10);
/// assert_eq!(config.analysis.window_days, 7);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Platform connection settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Analysis tuning.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl PulseConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Io`] if the file cannot be read,
    /// [`PulseError::Toml`] if the content is not valid TOML, or
    /// [`PulseError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ghpulse_core::PulseConfig;
    /// use std::path::Path;
    ///
    /// let config = PulseConfig::from_file(Path::new(".ghpulse.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, PulseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Toml`] if parsing fails, or
    /// [`PulseError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghpulse_core::PulseConfig;
    ///
    /// let toml = r#"
    /// [analysis]
    /// top_pairs = 5
    /// "#;
    /// let config = PulseConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.analysis.top_pairs, 5);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, PulseError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the analyses cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Config`] naming the offending key.
    pub fn validate(&self) -> Result<(), PulseError> {
        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err(PulseError::Config(format!(
                "github.per_page must be between 1 and 100, got {}",
                self.github.per_page
            )));
        }
        if self.analysis.top_pairs == 0 {
            return Err(PulseError::Config(
                "analysis.top_pairs must be at least 1".into(),
            ));
        }
        if self.analysis.window_days == 0 || self.analysis.window_days > MAX_WINDOW_DAYS {
            return Err(PulseError::Config(format!(
                "analysis.window_days must be between 1 and {MAX_WINDOW_DAYS}, got {}",
                self.analysis.window_days
            )));
        }
        if self.analysis.concurrency == 0 {
            return Err(PulseError::Config(
                "analysis.concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// GitHub connection configuration.
///
/// # Examples
///
/// ```
/// use ghpulse_core::GitHubConfig;
///
/// let config = GitHubConfig::default();
/// assert_eq!(config.api_url, "https://api.github.com");
/// assert_eq!(config.token_env, "GITHUB_TOKEN");
/// assert_eq!(config.per_page, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL (default: `https://api.github.com`).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Environment variable holding the access token (default: `GITHUB_TOKEN`).
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Page size for list endpoints (default: 100, the platform maximum).
    #[serde(default = "default_per_page")]
    pub per_page: u8,
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}

fn default_per_page() -> u8 {
    100
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            per_page: default_per_page(),
        }
    }
}

/// Analysis tuning.
///
/// # Examples
///
/// ```
/// use ghpulse_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.top_pairs, 10);
/// assert_eq!(config.window_days, 7);
/// assert_eq!(config.concurrency, 8);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of contributor pairs to surface (default: 10).
    #[serde(default = "default_top_pairs")]
    pub top_pairs: usize,
    /// Length of the activity window in days (default: 7, at most [`MAX_WINDOW_DAYS`]).
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Maximum in-flight per-commit lookups (default: 8).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_top_pairs() -> usize {
    10
}

fn default_window_days() -> u32 {
    7
}

fn default_concurrency() -> usize {
    8
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_pairs: default_top_pairs(),
            window_days: default_window_days(),
            concurrency: default_concurrency(),
        }
    }
}

/// Access token for the platform API.
///
/// Constructed once at startup and handed to the client. The token value is
/// never printed by `Debug`.
///
/// # Examples
///
/// ```
/// use ghpulse_core::Credential;
///
/// let cred = Credential::from_lookup("GITHUB_TOKEN", |name| {
///     (name == "GITHUB_TOKEN").then(|| "ghp_example".to_string())
/// })
/// .unwrap();
/// assert_eq!(cred.expose(), "ghp_example");
/// assert!(!format!("{cred:?}").contains("ghp_example"));
/// ```
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Read the token from `var`, falling back to `GH_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::MissingCredential`] if neither variable holds a
    /// non-empty value.
    pub fn from_env(var: &str) -> Result<Self, PulseError> {
        Self::from_lookup(var, |name| std::env::var(name).ok())
    }

    /// Resolve the token through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::MissingCredential`] if neither `var` nor the
    /// fallback yields a non-empty value.
    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Self, PulseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        [var, FALLBACK_TOKEN_ENV]
            .into_iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .map(Self)
            .ok_or_else(|| PulseError::MissingCredential { var: var.into() })
    }

    /// The raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = PulseConfig::default();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert_eq!(config.github.per_page, 100);
        assert_eq!(config.analysis.top_pairs, 10);
        assert_eq!(config.analysis.window_days, 7);
        assert_eq!(config.analysis.concurrency, 8);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[github]
api_url = "https://github.example.com/api/v3"
token_env = "GHE_TOKEN"
per_page = 50

[analysis]
top_pairs = 3
window_days = 14
concurrency = 2
"#;
        let config = PulseConfig::from_toml(toml).unwrap();
        assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.github.token_env, "GHE_TOKEN");
        assert_eq!(config.github.per_page, 50);
        assert_eq!(config.analysis.top_pairs, 3);
        assert_eq!(config.analysis.window_days, 14);
        assert_eq!(config.analysis.concurrency, 2);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = PulseConfig::from_toml("").unwrap();
        assert_eq!(config.analysis.top_pairs, 10);
        assert_eq!(config.github.per_page, 100);
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = PulseConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = PulseConfig::from_toml("[github]\nper_page = 0\n").unwrap_err();
        assert!(err.to_string().contains("per_page"));

        let err = PulseConfig::from_toml("[analysis]\nconcurrency = 0\n").unwrap_err();
        assert!(err.to_string().contains("concurrency"));

        let err = PulseConfig::from_toml("[analysis]\nwindow_days = 0\n").unwrap_err();
        assert!(err.to_string().contains("window_days"));
    }

    #[test]
    fn window_days_is_bounded() {
        let err = PulseConfig::from_toml("[analysis]\nwindow_days = 100000000\n").unwrap_err();
        assert!(matches!(err, PulseError::Config(_)));
        assert!(err.to_string().contains("window_days"));

        let toml = format!("[analysis]\nwindow_days = {MAX_WINDOW_DAYS}\n");
        let config = PulseConfig::from_toml(&toml).unwrap();
        assert_eq!(config.analysis.window_days, MAX_WINDOW_DAYS);
    }

    #[test]
    fn credential_prefers_configured_variable() {
        let cred = Credential::from_lookup("GITHUB_TOKEN", |name| match name {
            "GITHUB_TOKEN" => Some("primary".into()),
            "GH_TOKEN" => Some("fallback".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cred.expose(), "primary");
    }

    #[test]
    fn credential_falls_back_to_gh_token() {
        let cred = Credential::from_lookup("GITHUB_TOKEN", |name| {
            (name == "GH_TOKEN").then(|| "fallback".to_string())
        })
        .unwrap();
        assert_eq!(cred.expose(), "fallback");
    }

    #[test]
    fn empty_credential_is_missing() {
        let err = Credential::from_lookup("GITHUB_TOKEN", |_| Some("  ".into())).unwrap_err();
        assert!(matches!(err, PulseError::MissingCredential { ref var } if var == "GITHUB_TOKEN"));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::from_lookup("T", |_| Some("secret".into())).unwrap();
        assert_eq!(format!("{cred:?}"), "Credential(***)");
    }
}

//! Runtime configuration: secrets and tunable settings.
//!
//! Secrets (the GitHub token and the Gemini API key) come from the
//! environment or the command line and must both be present before any
//! query is served. Tunables come from an optional YAML document; every key
//! is optional and falls back to the documented default.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Error},
    gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL},
    github::MAX_PAGE_SIZE,
    prompt::{DEFAULT_TOP_K, PromptStyle},
    retry::RetryConfig,
};

const MAX_TOP_K: usize = 20;

/// Credentials for both external services.
///
/// The [`std::fmt::Debug`] implementation never prints secret values.
#[derive(Clone,)]
pub struct Secrets
{
    github_token:   String,
    gemini_api_key: String,
}

impl std::fmt::Debug for Secrets
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("Secrets",)
            .field("github_token", &"<redacted>",)
            .field("gemini_api_key", &"<redacted>",)
            .finish()
    }
}

impl Secrets
{
    /// Validates that both secrets are present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming every missing secret.
    ///
    /// # Examples
    ///
    /// ```
    /// use devscope::Secrets;
    ///
    /// assert!(Secrets::new(Some("ghp_x".into(),), None,).is_err());
    /// assert!(Secrets::new(Some("ghp_x".into(),), Some("key".into(),),).is_ok());
    /// ```
    pub fn new(github_token: Option<String,>, gemini_api_key: Option<String,>,) -> Result<Self, Error,>
    {
        let github_token = github_token.filter(|value| !value.trim().is_empty(),);
        let gemini_api_key = gemini_api_key.filter(|value| !value.trim().is_empty(),);

        match (github_token, gemini_api_key,) {
            (Some(github_token,), Some(gemini_api_key,),) => Ok(Self {
                github_token,
                gemini_api_key,
            },),
            (github_token, gemini_api_key,) => {
                let missing: Vec<&str,> = [
                    github_token.is_none().then_some("GITHUB_TOKEN",),
                    gemini_api_key.is_none().then_some("GEMINI_API_KEY",),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(Error::configuration(format!("missing secrets: {}", missing.join(", "),),),)
            }
        }
    }

    pub fn github_token(&self,) -> &str
    {
        &self.github_token
    }

    pub fn gemini_api_key(&self,) -> &str
    {
        &self.gemini_api_key
    }
}

/// Tunable settings loaded from YAML.
///
/// # Examples
///
/// ```
/// use devscope::{PromptStyle, parse_settings};
///
/// let settings = parse_settings("generation:\n  style: strengths\n  top_k: 5\n",)?;
/// assert_eq!(settings.generation.style, PromptStyle::Strengths);
/// assert_eq!(settings.github.page_size, 100);
/// # Ok::<(), devscope::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct Settings
{
    pub github:     GitHubSettings,
    pub generation: GenerationSettings,
    pub cache:      CacheSettings,
}

/// Code-hosting API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSettings
{
    /// Optional API endpoint override, e.g. for GitHub Enterprise.
    pub base_url:             Option<String,>,
    /// Repositories fetched per query, `1..=100`.
    #[serde(deserialize_with = "deserialize_page_size")]
    pub page_size:            u8,
    pub request_timeout_secs: u64,
    pub retry:                RetryConfig,
}

impl Default for GitHubSettings
{
    fn default() -> Self
    {
        Self {
            base_url:             None,
            page_size:            MAX_PAGE_SIZE,
            request_timeout_secs: 10,
            retry:                RetryConfig::default(),
        }
    }
}

/// Generation service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSettings
{
    pub base_url:     String,
    pub model:        String,
    pub style:        PromptStyle,
    /// Repositories embedded in each prompt, `1..=20`.
    #[serde(deserialize_with = "deserialize_top_k")]
    pub top_k:        usize,
    /// Whether to issue the additional skills request.
    pub skills:       bool,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings
{
    fn default() -> Self
    {
        Self {
            base_url:     DEFAULT_GEMINI_BASE_URL.to_owned(),
            model:        DEFAULT_GEMINI_MODEL.to_owned(),
            style:        PromptStyle::default(),
            top_k:        DEFAULT_TOP_K,
            skills:       true,
            timeout_secs: 30,
        }
    }
}

/// Snapshot memo settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings
{
    /// Lifetime of a cached snapshot; `0` disables the cache.
    pub ttl_secs: u64,
}

impl Default for CacheSettings
{
    fn default() -> Self
    {
        Self {
            ttl_secs: 600,
        }
    }
}

impl Settings
{
    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the first violated rule.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.github.retry.max_attempts == 0 {
            return Err(Error::validation("github.retry.max_attempts must be at least 1",),);
        }
        if !(self.github.retry.backoff_factor >= 1.0) {
            return Err(Error::validation("github.retry.backoff_factor must be at least 1.0",),);
        }
        if self.github.request_timeout_secs == 0 {
            return Err(Error::validation("github.request_timeout_secs must be positive",),);
        }
        if self.generation.timeout_secs == 0 {
            return Err(Error::validation("generation.timeout_secs must be positive",),);
        }
        if self.generation.model.trim().is_empty() {
            return Err(Error::validation("generation.model cannot be empty",),);
        }
        if self.generation.base_url.trim().is_empty() {
            return Err(Error::validation("generation.base_url cannot be empty",),);
        }

        Ok((),)
    }

    pub fn request_timeout(&self,) -> Duration
    {
        Duration::from_secs(self.github.request_timeout_secs,)
    }

    pub fn generation_timeout(&self,) -> Duration
    {
        Duration::from_secs(self.generation.timeout_secs,)
    }

    pub fn cache_ttl(&self,) -> Duration
    {
        Duration::from_secs(self.cache.ttl_secs,)
    }
}

/// Loads and validates settings from the YAML file at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, [`Error::Parse`] for
/// malformed YAML and [`Error::Validation`] for out-of-range values.
pub fn load_settings(path: &Path,) -> Result<Settings, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_settings(&contents,)
}

/// Parses and validates settings from a YAML string.
///
/// An empty document yields the defaults.
///
/// # Errors
///
/// See [`load_settings`].
pub fn parse_settings(contents: &str,) -> Result<Settings, Error,>
{
    let settings: Settings = if contents.trim().is_empty() {
        Settings::default()
    } else {
        serde_yaml::from_str(contents,)?
    };
    settings.validate()?;
    Ok(settings,)
}

fn deserialize_page_size<'de, D,>(deserializer: D,) -> Result<u8, D::Error,>
where
    D: serde::Deserializer<'de,>,
{
    let value = u8::deserialize(deserializer,)?;
    if value == 0 || value > MAX_PAGE_SIZE {
        return Err(serde::de::Error::custom("github.page_size must be between 1 and 100",),);
    }
    Ok(value,)
}

fn deserialize_top_k<'de, D,>(deserializer: D,) -> Result<usize, D::Error,>
where
    D: serde::Deserializer<'de,>,
{
    let value = usize::deserialize(deserializer,)?;
    if value == 0 || value > MAX_TOP_K {
        return Err(serde::de::Error::custom("generation.top_k must be between 1 and 20",),);
    }
    Ok(value,)
}

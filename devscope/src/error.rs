#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the devscope crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Only the fetcher's hard failures ([`Error::NotFound`],
//! [`Error::Unauthorized`], [`Error::Upstream`]) reach callers of the analysis
//! pipeline. Generation failures are folded into
//! [`InsightOutcome::Unavailable`](crate::InsightOutcome::Unavailable) by the
//! composer and never abort a query.

use std::path::{Path, PathBuf};

/// Unified error type returned by the fetcher, the generation client, the
/// configuration loader and the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Required secrets or settings are missing or invalid. Fatal at startup.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human readable description of the configuration problem.
        message: String
    },
    /// The requested account does not exist or carries no login.
    #[error("user '{username}' not found")]
    NotFound {
        /// Username that failed to resolve.
        username: String
    },
    /// The remote service rejected the supplied credentials.
    #[error("{service} rejected the supplied credentials: {message}")]
    Unauthorized {
        /// Name of the remote service.
        service: &'static str,
        /// Message reported by the service.
        message: String
    },
    /// Network failures, timeouts, rate limiting and server-side errors.
    #[error("{service} is unavailable: {message}")]
    Upstream {
        /// Name of the remote service.
        service: &'static str,
        /// Message describing the transient failure.
        message: String
    },
    /// The generation service failed or produced no usable text.
    #[error("text generation failed: {message}")]
    Generation {
        /// Message describing the generation failure.
        message: String
    },
    /// Input rejected before contacting any service.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Reading the settings file or a standard stream failed.
    #[error("I/O failure on {path:?}: {source}")]
    Io {
        /// Settings file, or a pseudo path such as `<stdin>`.
        path:   PathBuf,
        source: std::io::Error
    },
    /// The settings file is not valid YAML for [`crate::Settings`].
    #[error("invalid settings file: {source}")]
    Parse {
        source: serde_yaml::Error
    },
    /// An [`crate::Analysis`] could not be written as JSON.
    #[error("failed to serialize analysis: {source}")]
    Serialize {
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a configuration error.
    pub fn configuration<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Configuration {
            message: message.into()
        }
    }

    /// Constructs a not-found error for the given username.
    pub fn not_found<U>(username: U) -> Self
    where
        U: Into<String>
    {
        Self::NotFound {
            username: username.into()
        }
    }

    /// Constructs an unauthorized error attributed to `service`.
    pub fn unauthorized<M>(service: &'static str, message: M) -> Self
    where
        M: Into<String>
    {
        Self::Unauthorized {
            service,
            message: message.into()
        }
    }

    /// Constructs a transient upstream error attributed to `service`.
    pub fn upstream<M>(service: &'static str, message: M) -> Self
    where
        M: Into<String>
    {
        Self::Upstream {
            service,
            message: message.into()
        }
    }

    /// Constructs a generation error.
    pub fn generation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Generation {
            message: message.into()
        }
    }

    /// Constructs a validation error for locally rejected input.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Reports whether retrying the failed operation may succeed.
    ///
    /// Only [`Error::Upstream`] is transient. Not-found and credential
    /// failures are stable answers and are never retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Message shown to the user; identical to [`std::fmt::Display`].
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Wraps `source` as [`Error::Io`] attributed to `path`.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

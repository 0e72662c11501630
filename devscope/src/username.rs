// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Validation of user-supplied account names.
//!
//! Accepted names contain ASCII alphanumerics, hyphens and underscores (the
//! latter appear in enterprise managed-user logins), are at most 39
//! characters long and do not start with a hyphen. Anything else is rejected
//! before a request is built, so a name can always be interpolated into an
//! API path unescaped.

use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::error::Error;

/// Maximum login length accepted by GitHub.
pub const MAX_USERNAME_LEN: usize = 39;

static USERNAME_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$",).expect("valid username pattern",)
},);

/// Account name that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash,)]
pub struct Username(String,);

impl Username
{
    /// Validates `input` after trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty, overlong or malformed names.
    ///
    /// # Examples
    ///
    /// ```
    /// use devscope::Username;
    ///
    /// let name = Username::parse("  octocat ",).expect("valid name",);
    /// assert_eq!(name.as_str(), "octocat");
    /// assert!(Username::parse("../etc",).is_err());
    /// ```
    pub fn parse(input: &str,) -> Result<Self, Error,>
    {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("username cannot be empty",),);
        }
        if trimmed.len() > MAX_USERNAME_LEN {
            return Err(Error::validation(format!(
                "username cannot exceed {MAX_USERNAME_LEN} characters"
            ),),);
        }
        if !USERNAME_PATTERN.is_match(trimmed,) {
            return Err(Error::validation(format!("'{trimmed}' is not a valid GitHub username"),),);
        }

        Ok(Self(trimmed.to_owned(),),)
    }

    pub fn as_str(&self,) -> &str
    {
        &self.0
    }

    /// Case-insensitive key; GitHub logins compare without case.
    pub fn cache_key(&self,) -> String
    {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for Username
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(&self.0,)
    }
}

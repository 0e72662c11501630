// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Profile and repository snapshots decoded from GitHub REST payloads.
//!
//! Decoding is deliberately lenient: numeric fields that are missing, null,
//! negative or of the wrong type collapse to `0`, and optional text fields
//! that are blank collapse to `None`. The only hard requirement is the
//! profile `login`; a payload without it is reported as
//! [`Error::NotFound`](crate::Error::NotFound).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::Error;

/// Public account metadata for the queried user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default)]
pub struct Profile
{
    /// Stable external identifier.
    #[serde(deserialize_with = "lenient_string")]
    pub login:        String,
    /// Display name chosen by the user.
    #[serde(deserialize_with = "lenient_text")]
    pub name:         Option<String,>,
    #[serde(deserialize_with = "lenient_text")]
    pub bio:          Option<String,>,
    #[serde(deserialize_with = "lenient_string")]
    pub avatar_url:   String,
    #[serde(deserialize_with = "lenient_count")]
    pub public_repos: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub followers:    u64,
    #[serde(deserialize_with = "lenient_count")]
    pub following:    u64,
    /// Account creation timestamp in ISO-8601 form.
    #[serde(deserialize_with = "lenient_string")]
    pub created_at:   String,
    #[serde(deserialize_with = "lenient_text")]
    pub location:     Option<String,>,
    #[serde(deserialize_with = "lenient_text")]
    pub company:      Option<String,>,
    /// Link to the profile page.
    #[serde(rename(deserialize = "html_url"), deserialize_with = "lenient_string")]
    pub url:          String,
}

impl Profile
{
    /// Decodes a profile payload returned for `username`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the payload is not an object or lacks
    /// a non-empty `login`.
    pub fn from_value(username: &str, value: Value,) -> Result<Self, Error,>
    {
        if !value.is_object() {
            return Err(Error::not_found(username,),);
        }

        let profile: Profile =
            serde_json::from_value(value,).map_err(|_| Error::not_found(username,),)?;
        if profile.login.trim().is_empty() {
            return Err(Error::not_found(username,),);
        }

        Ok(profile,)
    }

    /// Display name, falling back to the login.
    pub fn display_name(&self,) -> &str
    {
        self.name.as_deref().unwrap_or(&self.login,)
    }
}

/// One public repository owned by the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default)]
pub struct Repository
{
    #[serde(deserialize_with = "lenient_string")]
    pub name:        String,
    /// Primary language detected by GitHub; `None` when undetected.
    #[serde(deserialize_with = "lenient_text")]
    pub language:    Option<String,>,
    #[serde(rename(deserialize = "stargazers_count"), deserialize_with = "lenient_count")]
    pub stars:       u64,
    /// Size in kilobytes.
    #[serde(deserialize_with = "lenient_count")]
    pub size:        u64,
    #[serde(deserialize_with = "lenient_string")]
    pub created_at:  String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String,>,
    #[serde(rename(deserialize = "html_url"), deserialize_with = "lenient_string")]
    pub url:         String,
}

impl Repository
{
    /// Detected language, treating a blank value as undetected.
    pub fn primary_language(&self,) -> Option<&str,>
    {
        self.language.as_deref().filter(|language| !language.trim().is_empty(),)
    }
}

/// Decodes a repository listing payload.
///
/// Anything other than a JSON array yields an empty list. Array items that
/// are not objects are skipped.
pub fn repositories_from_value(value: Value,) -> Vec<Repository,>
{
    let Value::Array(items,) = value else {
        warn!("repository listing was not an array; treating it as empty");
        return Vec::new();
    };

    let mut repositories = Vec::with_capacity(items.len(),);
    for (index, item,) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!("skipping repository entry {} with unexpected shape", index);
            continue;
        }
        match serde_json::from_value::<Repository,>(item,) {
            Ok(repository,) => repositories.push(repository,),
            Err(error,) => warn!("skipping repository entry {}: {}", index, error),
        }
    }

    repositories
}

fn lenient_count<'de, D,>(deserializer: D,) -> Result<u64, D::Error,>
where
    D: Deserializer<'de,>,
{
    let value = Value::deserialize(deserializer,)?;
    Ok(count_from_value(&value,),)
}

fn lenient_string<'de, D,>(deserializer: D,) -> Result<String, D::Error,>
where
    D: Deserializer<'de,>,
{
    match Value::deserialize(deserializer,)? {
        Value::String(text,) => Ok(text,),
        _ => Ok(String::new(),),
    }
}

fn lenient_text<'de, D,>(deserializer: D,) -> Result<Option<String,>, D::Error,>
where
    D: Deserializer<'de,>,
{
    match Value::deserialize(deserializer,)? {
        Value::String(text,) if !text.trim().is_empty() => Ok(Some(text,),),
        _ => Ok(None,),
    }
}

fn count_from_value(value: &Value,) -> u64
{
    match value {
        Value::Number(number,) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|float| float.is_finite() && *float > 0.0,).map(|float| float as u64,),)
            .unwrap_or(0,),
        _ => 0,
    }
}

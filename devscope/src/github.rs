// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Profile and repository retrieval through the GitHub REST API.
///
/// Responses are fetched as raw JSON and decoded leniently by
/// [`crate::model`]. HTTP failures are classified so that callers can tell a
/// missing user apart from rejected credentials and from transient outages.
use std::time::Duration;

use async_trait::async_trait;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig as TransportRetry};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::Error,
    model::{Profile, Repository, repositories_from_value},
    retry::{RetryConfig, retry_with_backoff},
};

const SERVICE: &str = "github";
/// Largest page GitHub serves for repository listings.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Source of profile snapshots.
///
/// Implemented by [`GitHubFetcher`]; tests substitute in-memory fakes.
#[async_trait]
pub trait ProfileSource: Send + Sync
{
    /// Fetches the public profile for `username`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown users, [`Error::Unauthorized`] for
    /// rejected credentials, [`Error::Upstream`] for everything transient.
    async fn fetch_profile(&self, username: &str,) -> Result<Profile, Error,>;

    /// Fetches one page of public repositories, most recently updated first.
    ///
    /// # Errors
    ///
    /// Same classification as [`ProfileSource::fetch_profile`].
    async fn fetch_repositories(
        &self,
        username: &str,
        page_size: u8,
    ) -> Result<Vec<Repository,>, Error,>;
}

#[derive(Debug, Serialize,)]
struct RepositoryQuery
{
    per_page: u8,
    sort:     &'static str,
}

/// Octocrab-backed [`ProfileSource`].
#[derive(Debug, Clone,)]
pub struct GitHubFetcher
{
    octocrab: Octocrab,
    retry:    RetryConfig,
    timeout:  Duration,
}

impl GitHubFetcher
{
    /// Builds an authenticated client.
    ///
    /// `base_url` overrides the public API endpoint, which is how GitHub
    /// Enterprise installations and HTTP fakes are addressed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the client cannot be built or
    /// the base URL is invalid.
    pub fn new(
        token: &str,
        base_url: Option<&str,>,
        retry: RetryConfig,
        timeout: Duration,
    ) -> Result<Self, Error,>
    {
        // Backoff is owned by `retry_with_backoff`; the transport must send once.
        let mut builder =
            Octocrab::builder().add_retry_config(TransportRetry::None,).personal_token(token,);
        if let Some(base_url,) = base_url {
            builder = builder.base_uri(base_url,).map_err(|e| {
                Error::configuration(format!("invalid GitHub base URL '{base_url}': {e}"),)
            },)?;
        }

        let octocrab = builder.build().map_err(|e| {
            Error::configuration(format!("failed to initialize GitHub client: {e}"),)
        },)?;

        Ok(Self {
            octocrab,
            retry,
            timeout,
        },)
    }

    async fn get_json(
        &self,
        username: &str,
        route: String,
        query: Option<&RepositoryQuery,>,
    ) -> Result<Value, Error,>
    {
        let operation = format!("GET {route}");
        retry_with_backoff(&self.retry, &operation, || {
            let octocrab = self.octocrab.clone();
            let route = route.clone();
            async move {
                let request = octocrab.get::<Value, _, _,>(route, query,);
                match tokio::time::timeout(self.timeout, request,).await {
                    Ok(Ok(value,),) => Ok(value,),
                    Ok(Err(error,),) => Err(classify(username, error,),),
                    Err(_,) => Err(Error::upstream(
                        SERVICE,
                        format!("request timed out after {}ms", self.timeout.as_millis()),
                    ),),
                }
            }
        },)
        .await
    }
}

#[async_trait]
impl ProfileSource for GitHubFetcher
{
    async fn fetch_profile(&self, username: &str,) -> Result<Profile, Error,>
    {
        debug!("Fetching profile for {}", username);
        let value = self.get_json(username, format!("/users/{username}"), None,).await?;
        Profile::from_value(username, value,)
    }

    async fn fetch_repositories(
        &self,
        username: &str,
        page_size: u8,
    ) -> Result<Vec<Repository,>, Error,>
    {
        let query = RepositoryQuery {
            per_page: page_size.clamp(1, MAX_PAGE_SIZE,),
            sort:     "updated",
        };
        debug!("Fetching up to {} repositories for {}", query.per_page, username);

        let value =
            self.get_json(username, format!("/users/{username}/repos"), Some(&query,),).await?;
        let repositories = repositories_from_value(value,);

        info!("Fetched {} repositories for {}", repositories.len(), username);
        Ok(repositories,)
    }
}

/// Maps an Octocrab failure onto the crate error taxonomy.
///
/// 404 means the user does not exist and 401 means the token was rejected.
/// Every other status (403 and 429 rate limiting, 5xx) and every transport
/// failure is transient.
fn classify(username: &str, error: octocrab::Error,) -> Error
{
    match error {
        octocrab::Error::GitHub {
            source, ..
        } => match source.status_code.as_u16() {
            404 => Error::not_found(username,),
            401 => Error::unauthorized(SERVICE, source.message.clone(),),
            status => Error::upstream(SERVICE, format!("HTTP {status}: {}", source.message),),
        },
        other => Error::upstream(SERVICE, other.to_string(),),
    }
}

// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! End-to-end analysis of one username.
//!
//! A query validates the name, fetches the profile and the repository
//! listing concurrently (or reuses a cached snapshot), derives the
//! aggregates, and then requests the insight report and the skills list
//! concurrently. Only fetcher failures abort a query. Every query takes a
//! ticket. A query that finishes after a newer one has started is reported
//! as [`QueryOutcome::Superseded`] and its results are dropped.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{Datelike, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    aggregate::{Aggregates, ProfileSummary, aggregate, summarize},
    cache::{ProfileSnapshot, SnapshotCache},
    config::{Secrets, Settings},
    error::Error,
    gemini::GeminiClient,
    github::{GitHubFetcher, ProfileSource},
    insight::{InsightComposer, InsightOutcome},
    model::{Profile, Repository},
    prompt::SkillList,
    username::Username,
};

/// Repository-derived views, or the reason they could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepositoryViews
{
    Available
    {
        #[serde(flatten)]
        aggregates: Aggregates,
    },
    Unavailable
    {
        reason: String,
    },
}

impl RepositoryViews
{
    pub fn aggregates(&self,) -> Option<&Aggregates,>
    {
        match self {
            Self::Available {
                aggregates,
            } => Some(aggregates,),
            Self::Unavailable {
                ..
            } => None,
        }
    }
}

/// Everything the presentation layer needs for one profile.
#[derive(Debug, Clone, Serialize,)]
pub struct Analysis
{
    pub profile:      Profile,
    pub summary:      ProfileSummary,
    pub repositories: RepositoryViews,
    pub insight:      InsightOutcome<String,>,
    pub skills:       InsightOutcome<SkillList,>,
}

/// Result of [`Analyzer::analyze`].
#[derive(Debug, Clone,)]
pub enum QueryOutcome
{
    /// The query finished and is still the latest one.
    Completed(Box<Analysis,>,),
    /// A newer query started before this one finished.
    Superseded
    {
        username: String,
    },
}

/// Per-analyzer knobs that do not belong to a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct AnalyzerOptions
{
    pub page_size: u8,
    pub skills:    bool,
    pub cache_ttl: Duration,
}

/// Query orchestrator holding injected collaborators.
pub struct Analyzer
{
    source:   Arc<dyn ProfileSource,>,
    composer: InsightComposer,
    cache:    SnapshotCache,
    options:  AnalyzerOptions,
    latest:   AtomicU64,
}

impl std::fmt::Debug for Analyzer
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("Analyzer",)
            .field("composer", &self.composer,)
            .field("options", &self.options,)
            .finish_non_exhaustive()
    }
}

impl Analyzer
{
    pub fn new(
        source: Arc<dyn ProfileSource,>,
        composer: InsightComposer,
        options: AnalyzerOptions,
    ) -> Self
    {
        Self {
            source,
            composer,
            cache: SnapshotCache::new(options.cache_ttl,),
            options,
            latest: AtomicU64::new(0,),
        }
    }

    /// Builds the production analyzer from validated secrets and settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when either HTTP client cannot be
    /// constructed.
    pub fn connect(secrets: &Secrets, settings: &Settings,) -> Result<Self, Error,>
    {
        let fetcher = GitHubFetcher::new(
            secrets.github_token(),
            settings.github.base_url.as_deref(),
            settings.github.retry.clone(),
            settings.request_timeout(),
        )?;
        let generator = GeminiClient::new(
            secrets.gemini_api_key(),
            settings.generation.model.clone(),
            settings.generation.base_url.clone(),
            settings.generation_timeout(),
        )?;
        let composer = InsightComposer::new(
            Arc::new(generator,),
            settings.generation.style,
            settings.generation.top_k,
            settings.generation_timeout(),
        );

        Ok(Self::new(
            Arc::new(fetcher,),
            composer,
            AnalyzerOptions {
                page_size: settings.github.page_size,
                skills:    settings.generation.skills,
                cache_ttl: settings.cache_ttl(),
            },
        ),)
    }

    /// Analyzes `input` as a username.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for malformed names, and the fetcher's
    /// [`Error::NotFound`], [`Error::Unauthorized`] or [`Error::Upstream`]
    /// when the profile itself cannot be obtained. Generation problems never
    /// surface here.
    pub async fn analyze(&self, input: &str,) -> Result<QueryOutcome, Error,>
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst,) + 1;
        let username = Username::parse(input,)?;

        let (profile, repositories,) = self.snapshot(&username,).await?;
        if self.is_stale(ticket,) {
            return Ok(self.superseded(&username,),);
        }

        let current_year = Utc::now().year();
        let (views, summary,) = match &repositories {
            Ok(repositories,) => (
                RepositoryViews::Available {
                    aggregates: aggregate(repositories,),
                },
                summarize(&profile, repositories, current_year,),
            ),
            Err(reason,) => (
                RepositoryViews::Unavailable {
                    reason: reason.clone(),
                },
                summarize(&profile, &[], current_year,),
            ),
        };

        let (insight, skills,) = match &repositories {
            Ok(repositories,) => {
                let skills = async {
                    if self.options.skills {
                        self.composer.skills(&profile, repositories,).await
                    } else {
                        InsightOutcome::Skipped
                    }
                };
                tokio::join!(self.composer.report(&profile, repositories,), skills)
            }
            Err(_,) => {
                let reason = "repository data unavailable".to_owned();
                (
                    InsightOutcome::Unavailable {
                        reason: reason.clone(),
                    },
                    InsightOutcome::Unavailable {
                        reason,
                    },
                )
            }
        };

        if self.is_stale(ticket,) {
            return Ok(self.superseded(&username,),);
        }

        info!("Completed analysis for {}", username);
        Ok(QueryOutcome::Completed(Box::new(Analysis {
            profile,
            summary,
            repositories: views,
            insight,
            skills,
        },),),)
    }

    /// Cached or freshly fetched profile plus repository listing.
    ///
    /// The listing is `Err(reason)` when only the repository call failed.
    async fn snapshot(
        &self,
        username: &Username,
    ) -> Result<(Profile, Result<Vec<Repository,>, String,>,), Error,>
    {
        let key = username.cache_key();
        if let Some(snapshot,) = self.cache.get(&key,) {
            return Ok((snapshot.profile.clone(), Ok(snapshot.repositories.clone(),),),);
        }

        let (profile, repositories,) = tokio::join!(
            self.source.fetch_profile(username.as_str(),),
            self.source.fetch_repositories(username.as_str(), self.options.page_size,)
        );
        let profile = profile?;

        match repositories {
            Ok(repositories,) => {
                let snapshot = self.cache.insert(key, ProfileSnapshot {
                    profile: profile.clone(),
                    repositories,
                },);
                Ok((profile, Ok(snapshot.repositories.clone(),),),)
            }
            Err(error,) => {
                warn!("Repository listing for {} unavailable: {}", username, error);
                Ok((profile, Err(error.to_display_string(),),),)
            }
        }
    }

    fn is_stale(&self, ticket: u64,) -> bool
    {
        self.latest.load(Ordering::SeqCst,) != ticket
    }

    fn superseded(&self, username: &Username,) -> QueryOutcome
    {
        debug!("Discarding superseded analysis for {}", username);
        QueryOutcome::Superseded {
            username: username.to_string(),
        }
    }
}

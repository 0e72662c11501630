// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Generated insight report and skills list.
//!
//! The composer owns no client of its own: a [`TextGenerator`] is injected
//! at construction. Every failure (error, timeout, empty reply) is folded
//! into [`InsightOutcome::Unavailable`] so that a generation outage never
//! hides the profile or its metrics.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    error::Error,
    model::{Profile, Repository},
    prompt::{PromptStyle, SkillList, build_prompt, build_skills_prompt, extract_skills},
};

/// Text generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync
{
    /// Produces a completion for `prompt`.
    ///
    /// # Errors
    ///
    /// Any [`Error`]; callers treat all of them as "insight unavailable".
    async fn generate(&self, prompt: &str,) -> Result<String, Error,>;
}

/// Result slot for a generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsightOutcome<T,>
{
    /// Generation succeeded.
    Ready { value: T },
    /// Generation failed; the presentation layer renders a fallback.
    Unavailable { reason: String },
    /// Generation was not requested.
    Skipped,
}

impl<T,> InsightOutcome<T,>
{
    pub fn ready(&self,) -> Option<&T,>
    {
        match self {
            Self::Ready {
                value,
            } => Some(value,),
            _ => None,
        }
    }

    pub fn is_unavailable(&self,) -> bool
    {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Builds prompts and turns generation replies into outcomes.
#[derive(Clone,)]
pub struct InsightComposer
{
    generator: Arc<dyn TextGenerator,>,
    style:     PromptStyle,
    top_k:     usize,
    timeout:   Duration,
}

impl std::fmt::Debug for InsightComposer
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("InsightComposer",)
            .field("style", &self.style,)
            .field("top_k", &self.top_k,)
            .field("timeout", &self.timeout,)
            .finish_non_exhaustive()
    }
}

impl InsightComposer
{
    pub fn new(
        generator: Arc<dyn TextGenerator,>,
        style: PromptStyle,
        top_k: usize,
        timeout: Duration,
    ) -> Self
    {
        Self {
            generator,
            style,
            top_k,
            timeout,
        }
    }

    /// Requests the primary report. Issues exactly one generation call.
    pub async fn report(&self, profile: &Profile, repositories: &[Repository],) -> InsightOutcome<String,>
    {
        let prompt = build_prompt(profile, repositories, self.top_k, self.style,);
        match self.generate("insight report", &prompt,).await {
            Ok(text,) => InsightOutcome::Ready {
                value: text.trim().to_owned(),
            },
            Err(reason,) => InsightOutcome::Unavailable {
                reason,
            },
        }
    }

    /// Requests the stricter skills reply and parses it.
    ///
    /// A reply without any usable token is still `Ready` with an empty list.
    pub async fn skills(&self, profile: &Profile, repositories: &[Repository],) -> InsightOutcome<SkillList,>
    {
        let prompt = build_skills_prompt(profile, repositories, self.top_k,);
        match self.generate("skills list", &prompt,).await {
            Ok(text,) => InsightOutcome::Ready {
                value: extract_skills(&text,),
            },
            Err(reason,) => InsightOutcome::Unavailable {
                reason,
            },
        }
    }

    async fn generate(&self, label: &str, prompt: &str,) -> Result<String, String,>
    {
        match tokio::time::timeout(self.timeout, self.generator.generate(prompt,),).await {
            Ok(Ok(text,),) => {
                info!("Generated {} ({} bytes)", label, text.len());
                Ok(text,)
            }
            Ok(Err(error,),) => {
                warn!("{} unavailable: {}", label, error);
                Err(error.to_display_string(),)
            }
            Err(_,) => {
                warn!("{} timed out after {}ms", label, self.timeout.as_millis());
                Err(format!("generation timed out after {}ms", self.timeout.as_millis()),)
            }
        }
    }
}

// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Core of a GitHub profile analytics dashboard.
//!
//! The library fetches a public profile and its repository listing, derives
//! language, activity and size views from the listing, and asks a generative
//! model for a recruiter-style report plus a short skills list. Fetch
//! failures are typed [`Error`] values. Generation failures never abort a
//! query and surface as [`InsightOutcome::Unavailable`] instead. Rendering
//! is left to callers, which receive a serializable [`Analysis`].

mod aggregate;
mod cache;
mod config;
mod error;
mod gemini;
mod github;
mod insight;
mod model;
mod pipeline;
mod prompt;
pub mod retry;
mod username;

pub use aggregate::{
    ActivityTally, Aggregates, ImpactRow, LanguageCount, LanguageTally, ProfileSummary,
    TOP_SIZE_LIMIT, TopSizeRanking, UNKNOWN_LANGUAGE, UNKNOWN_YEAR, YearCount, activity_tally,
    aggregate, impact_rows, language_tally, rank_by_size, summarize,
};
pub use cache::{MAX_CACHED_PROFILES, ProfileSnapshot, SnapshotCache};
pub use config::{
    CacheSettings, GenerationSettings, GitHubSettings, Secrets, Settings, load_settings,
    parse_settings,
};
pub use error::{Error, io_error};
pub use gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiClient};
pub use github::{GitHubFetcher, MAX_PAGE_SIZE, ProfileSource};
pub use insight::{InsightComposer, InsightOutcome, TextGenerator};
pub use model::{Profile, Repository, repositories_from_value};
pub use pipeline::{Analysis, Analyzer, AnalyzerOptions, QueryOutcome, RepositoryViews};
pub use prompt::{
    DEFAULT_TOP_K, PromptStyle, SKILL_LIMIT, SkillList, build_prompt, build_skills_prompt,
    extract_skills,
};
pub use username::{MAX_USERNAME_LEN, Username};

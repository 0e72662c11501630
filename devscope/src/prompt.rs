// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Prompt templates for the generation service and parsing of its replies.
//!
//! Repositories are taken in the order the API returned them, never
//! re-sorted. Descriptions are flattened onto one line so that a multi-line
//! description cannot break the entry list. The bio is embedded verbatim.

use serde::{Deserialize, Serialize};

use crate::model::{Profile, Repository};

/// Maximum number of entries in a [`SkillList`].
pub const SKILL_LIMIT: usize = 5;
/// Default number of repositories embedded in a prompt.
pub const DEFAULT_TOP_K: usize = 6;

const BIO_PLACEHOLDER: &str = "N/A";
const LANGUAGE_PLACEHOLDER: &str = "unknown";
const DESCRIPTION_PLACEHOLDER: &str = "No description provided";

/// Template used for the primary insight report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle
{
    /// Structured markdown evaluation written as a senior technical recruiter.
    #[default]
    Recruiter,
    /// Three short bullet points about strengths, derived from project names.
    Strengths,
}

/// Ordered, bounded list of skill names parsed from generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
#[serde(transparent)]
pub struct SkillList(Vec<String,>,);

impl SkillList
{
    pub fn as_slice(&self,) -> &[String]
    {
        &self.0
    }

    pub fn len(&self,) -> usize
    {
        self.0.len()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.0.is_empty()
    }

    pub fn into_inner(self,) -> Vec<String,>
    {
        self.0
    }
}

/// Builds the report prompt for `profile` using at most `top_k` repositories.
///
/// # Examples
///
/// ```
/// use devscope::{Profile, PromptStyle, build_prompt};
///
/// let profile = Profile {
///     login: "octocat".to_owned(),
///     bio: Some("Ships things".to_owned(),),
///     ..Profile::default()
/// };
/// let prompt = build_prompt(&profile, &[], 6, PromptStyle::Recruiter,);
/// assert!(prompt.contains("Ships things"));
/// ```
pub fn build_prompt(
    profile: &Profile,
    repositories: &[Repository],
    top_k: usize,
    style: PromptStyle,
) -> String
{
    let selected = &repositories[..repositories.len().min(top_k,)];

    match style {
        PromptStyle::Recruiter => recruiter_prompt(profile, selected,),
        PromptStyle::Strengths => strengths_prompt(profile, selected,),
    }
}

/// Builds the stricter prompt whose reply is parsed by [`extract_skills`].
pub fn build_skills_prompt(profile: &Profile, repositories: &[Repository], top_k: usize,) -> String
{
    let selected = &repositories[..repositories.len().min(top_k,)];

    format!(
        "Based on the GitHub projects below, name the {SKILL_LIMIT} most prominent technical \
         skills of this developer.\nReturn exactly {SKILL_LIMIT} comma-separated skill names and \
         nothing else.\n\nBio: {bio}\n\nProjects:\n{projects}\n",
        bio = bio_or_placeholder(profile,),
        projects = repository_entries(selected,),
    )
}

/// Parses a comma-separated skill reply.
///
/// Tokens are trimmed, empty tokens dropped and the result truncated to
/// [`SKILL_LIMIT`] entries. Malformed replies never fail; prose without
/// commas comes back as a single entry.
///
/// # Examples
///
/// ```
/// use devscope::extract_skills;
///
/// let skills = extract_skills("Python, Go, , SQL,,Rust",);
/// assert_eq!(skills.as_slice(), ["Python", "Go", "SQL", "Rust"]);
/// assert!(extract_skills("",).is_empty());
/// ```
pub fn extract_skills(text: &str,) -> SkillList
{
    SkillList(
        text.split(',',)
            .map(str::trim,)
            .filter(|token| !token.is_empty(),)
            .take(SKILL_LIMIT,)
            .map(str::to_owned,)
            .collect(),
    )
}

fn recruiter_prompt(profile: &Profile, repositories: &[Repository],) -> String
{
    format!(
        "Act as a Senior Technical Recruiter at a top tech company hiring graduate engineers.\n\
         Analyze this candidate's GitHub profile.\n\n\
         Candidate Profile:\n\
         - Bio: {bio}\n\
         - Public Repos: {public_repos}\n\
         - Followers: {followers}\n\n\
         Top Projects:\n\
         {projects}\n\n\
         Output Requirement:\n\
         Provide a structured Markdown report with:\n\
         1. Hiring Verdict: a one-sentence summary of their employability.\n\
         2. Tech Stack Strength: core languages and frameworks they seem proficient in.\n\
         3. Project Complexity Analysis: are these simple tutorials or complex applications?\n\
         4. Career Recommendation: which specific role fits them best (for example Backend \
         Engineer, Data Scientist, Frontend Developer)?\n\n\
         Tone: professional, insightful and constructive.\n",
        bio = bio_or_placeholder(profile,),
        public_repos = profile.public_repos,
        followers = profile.followers,
        projects = repository_entries(repositories,),
    )
}

fn strengths_prompt(profile: &Profile, repositories: &[Repository],) -> String
{
    format!(
        "Analyze this developer based on these GitHub projects:\n\
         {projects}\n\n\
         Bio: {bio}\n\
         Public Repos: {public_repos}\n\
         Followers: {followers}\n\n\
         Give 3 short professional bullet points about strengths.\n",
        projects = repository_entries(repositories,),
        bio = bio_or_placeholder(profile,),
        public_repos = profile.public_repos,
        followers = profile.followers,
    )
}

fn repository_entries(repositories: &[Repository],) -> String
{
    repositories
        .iter()
        .map(|repository| {
            format!(
                "- {name} (Lang: {language}, Stars: {stars}): {description}",
                name = single_line(&repository.name,),
                language = repository.primary_language().unwrap_or(LANGUAGE_PLACEHOLDER,),
                stars = repository.stars,
                description = repository
                    .description
                    .as_deref()
                    .map(single_line,)
                    .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_owned(),),
            )
        },)
        .collect::<Vec<_,>>()
        .join("\n",)
}

fn bio_or_placeholder(profile: &Profile,) -> &str
{
    profile.bio.as_deref().unwrap_or(BIO_PLACEHOLDER,)
}

fn single_line(text: &str,) -> String
{
    text.split(['\r', '\n',],).map(str::trim,).filter(|part| !part.is_empty(),).collect::<Vec<_,>>().join(" ",)
}

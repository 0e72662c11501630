// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Pure aggregation over a fetched repository list.
//!
//! Every function here is total: an empty list produces empty views, and
//! numeric fields were already clamped to non-negative values when the
//! payload was decoded. The language tally and the activity tally apply
//! different membership rules. Repositories without a detected language are
//! left out of the former but always counted in the latter.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike};
use serde::Serialize;

use crate::model::{Profile, Repository};

/// Number of repositories kept in [`TopSizeRanking`].
pub const TOP_SIZE_LIMIT: usize = 5;
/// Language label used by [`ImpactRow`] when none was detected.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";
/// Year bucket for repositories whose timestamp has no leading year.
pub const UNKNOWN_YEAR: &str = "0000";
const BIO_PLACEHOLDER: &str = "No bio provided";

/// Count of repositories using one primary language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct LanguageCount
{
    pub language: String,
    pub count:    usize,
}

/// Language histogram ordered by count descending, ties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
#[serde(transparent)]
pub struct LanguageTally
{
    entries: Vec<LanguageCount,>,
}

impl LanguageTally
{
    pub fn entries(&self,) -> &[LanguageCount]
    {
        &self.entries
    }

    /// Count recorded for `language`, if any.
    pub fn get(&self, language: &str,) -> Option<usize,>
    {
        self.entries.iter().find(|entry| entry.language == language,).map(|entry| entry.count,)
    }

    /// Sum of all counts.
    pub fn total(&self,) -> usize
    {
        self.entries.iter().map(|entry| entry.count,).sum()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }
}

/// Count of repositories created in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct YearCount
{
    /// Four-digit year.
    pub year:  String,
    pub count: usize,
}

/// Repository creation histogram ordered ascending by year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
#[serde(transparent)]
pub struct ActivityTally
{
    entries: Vec<YearCount,>,
}

impl ActivityTally
{
    pub fn entries(&self,) -> &[YearCount]
    {
        &self.entries
    }

    pub fn get(&self, year: &str,) -> Option<usize,>
    {
        self.entries.iter().find(|entry| entry.year == year,).map(|entry| entry.count,)
    }

    pub fn total(&self,) -> usize
    {
        self.entries.iter().map(|entry| entry.count,).sum()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }
}

/// Size and star projection of a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct ImpactRow
{
    pub name:     String,
    /// Size in kilobytes.
    pub size:     u64,
    pub stars:    u64,
    /// Primary language or [`UNKNOWN_LANGUAGE`].
    pub language: String,
}

impl From<&Repository,> for ImpactRow
{
    fn from(repository: &Repository,) -> Self
    {
        Self {
            name:     repository.name.clone(),
            size:     repository.size,
            stars:    repository.stars,
            language: repository.primary_language().unwrap_or(UNKNOWN_LANGUAGE,).to_owned(),
        }
    }
}

/// Largest repositories, descending by size with ties kept in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
#[serde(transparent)]
pub struct TopSizeRanking
{
    rows: Vec<ImpactRow,>,
}

impl TopSizeRanking
{
    pub fn rows(&self,) -> &[ImpactRow]
    {
        &self.rows
    }

    pub fn len(&self,) -> usize
    {
        self.rows.len()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.rows.is_empty()
    }
}

/// Every derived view over one repository list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
pub struct Aggregates
{
    pub languages:   LanguageTally,
    pub activity:    ActivityTally,
    pub impact:      Vec<ImpactRow,>,
    pub top_by_size: TopSizeRanking,
}

/// Headline metrics for the profile card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct ProfileSummary
{
    pub display_name: String,
    pub bio:          String,
    pub location:     Option<String,>,
    pub company:      Option<String,>,
    pub avatar_url:   String,
    pub url:          String,
    pub public_repos: u64,
    pub total_stars:  u64,
    pub followers:    u64,
    pub following:    u64,
    /// Whole years between account creation and `current_year`.
    pub years_active: u32,
}

/// Computes all repository-derived views in a single call.
///
/// # Examples
///
/// ```
/// use devscope::{Repository, aggregate};
///
/// let views = aggregate(&[],);
/// assert!(views.languages.is_empty());
/// assert!(views.top_by_size.is_empty());
///
/// let repo = Repository {
///     name: "cli".to_owned(),
///     language: Some("Rust".to_owned(),),
///     created_at: "2021-03-01T00:00:00Z".to_owned(),
///     ..Repository::default()
/// };
/// let views = aggregate(&[repo],);
/// assert_eq!(views.languages.get("Rust"), Some(1));
/// assert_eq!(views.activity.get("2021"), Some(1));
/// ```
pub fn aggregate(repositories: &[Repository],) -> Aggregates
{
    let impact = impact_rows(repositories,);
    let top_by_size = rank_by_size(&impact,);

    Aggregates {
        languages: language_tally(repositories,),
        activity: activity_tally(repositories,),
        impact,
        top_by_size,
    }
}

/// Groups repositories by primary language, skipping those without one.
pub fn language_tally(repositories: &[Repository],) -> LanguageTally
{
    let mut entries: Vec<LanguageCount,> = Vec::new();
    let mut index: HashMap<&str, usize,> = HashMap::new();

    for language in repositories.iter().filter_map(Repository::primary_language,) {
        match index.get(language,) {
            Some(&position,) => entries[position].count += 1,
            None => {
                index.insert(language, entries.len(),);
                entries.push(LanguageCount {
                    language: language.to_owned(), count: 1,
                },);
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    entries.sort_by(|left, right| right.count.cmp(&left.count,),);

    LanguageTally {
        entries,
    }
}

/// Groups every repository by the year prefix of its creation timestamp.
pub fn activity_tally(repositories: &[Repository],) -> ActivityTally
{
    let mut years: BTreeMap<String, usize,> = BTreeMap::new();
    for repository in repositories {
        *years.entry(creation_year(&repository.created_at,),).or_default() += 1;
    }

    ActivityTally {
        entries: years.into_iter().map(|(year, count,)| YearCount { year, count, },).collect(),
    }
}

/// Projects each repository onto an [`ImpactRow`].
pub fn impact_rows(repositories: &[Repository],) -> Vec<ImpactRow,>
{
    repositories.iter().map(ImpactRow::from,).collect()
}

/// Keeps the [`TOP_SIZE_LIMIT`] largest rows.
pub fn rank_by_size(rows: &[ImpactRow],) -> TopSizeRanking
{
    let mut ranked = rows.to_vec();
    ranked.sort_by(|left, right| right.size.cmp(&left.size,),);
    ranked.truncate(TOP_SIZE_LIMIT,);

    TopSizeRanking {
        rows: ranked,
    }
}

/// Builds the headline metrics shown next to the avatar.
pub fn summarize(profile: &Profile, repositories: &[Repository], current_year: i32,) -> ProfileSummary
{
    let years_active = DateTime::parse_from_rfc3339(&profile.created_at,)
        .map(|created| (current_year - created.year()).max(0,) as u32,)
        .unwrap_or(0,);

    ProfileSummary {
        display_name: profile.display_name().to_owned(),
        bio: profile.bio.clone().unwrap_or_else(|| BIO_PLACEHOLDER.to_owned(),),
        location: profile.location.clone(),
        company: profile.company.clone(),
        avatar_url: profile.avatar_url.clone(),
        url: profile.url.clone(),
        public_repos: profile.public_repos,
        total_stars: repositories
            .iter()
            .map(|repository| repository.stars,)
            .fold(0, u64::saturating_add,),
        followers: profile.followers,
        following: profile.following,
        years_active,
    }
}

fn creation_year(timestamp: &str,) -> String
{
    match timestamp.get(..4,) {
        Some(year,) if year.bytes().all(|byte| byte.is_ascii_digit(),) => year.to_owned(),
        _ => UNKNOWN_YEAR.to_owned(),
    }
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;

    fn repo(name: &str, language: Option<&str,>, size: u64, created_at: &str,) -> Repository
    {
        Repository {
            name: name.to_owned(),
            language: language.map(str::to_owned,),
            size,
            created_at: created_at.to_owned(),
            ..Repository::default()
        }
    }

    fn repository_strategy() -> impl Strategy<Value = Repository,>
    {
        (
            "[a-z]{1,8}",
            prop::option::of(prop::sample::select(vec!["Rust", "Go", "Python", "TypeScript"],),),
            0u64..50,
            0u64..500,
            2008u32..2026,
        )
            .prop_map(|(name, language, size, stars, year,)| Repository {
                name,
                language: language.map(str::to_owned,),
                stars,
                size,
                created_at: format!("{year}-06-01T12:00:00Z"),
                ..Repository::default()
            },)
    }

    proptest! {
        #[test]
        fn activity_counts_every_repository(repos in prop::collection::vec(repository_strategy(), 0..40)) {
            prop_assert_eq!(activity_tally(&repos).total(), repos.len());
        }

        #[test]
        fn language_total_matches_repositories_with_language(repos in prop::collection::vec(repository_strategy(), 0..40)) {
            let with_language = repos.iter().filter(|repo| repo.language.is_some()).count();
            let tally = language_tally(&repos);
            prop_assert_eq!(tally.total(), with_language);
            prop_assert!(tally.total() <= repos.len());
            prop_assert_eq!(tally.total() == repos.len(), with_language == repos.len());
        }

        #[test]
        fn top_ranking_is_stable_descending_prefix(repos in prop::collection::vec(repository_strategy(), 0..40)) {
            let rows = impact_rows(&repos);
            let ranking = rank_by_size(&rows);
            prop_assert_eq!(ranking.len(), repos.len().min(TOP_SIZE_LIMIT));

            for pair in ranking.rows().windows(2) {
                prop_assert!(pair[0].size >= pair[1].size);
            }

            let mut expected: Vec<(usize, &ImpactRow)> = rows.iter().enumerate().collect();
            expected.sort_by(|left, right| right.1.size.cmp(&left.1.size).then(left.0.cmp(&right.0)));
            let expected: Vec<&ImpactRow> = expected.into_iter().take(TOP_SIZE_LIMIT).map(|(_, row)| row).collect();
            prop_assert_eq!(ranking.rows().iter().collect::<Vec<_>>(), expected);
        }

        #[test]
        fn languages_are_sorted_by_count(repos in prop::collection::vec(repository_strategy(), 0..40)) {
            let tally = language_tally(&repos);
            for pair in tally.entries().windows(2) {
                prop_assert!(pair[0].count >= pair[1].count);
            }
        }
    }

    #[test]
    fn empty_input_produces_empty_views()
    {
        let views = aggregate(&[],);
        assert!(views.languages.is_empty());
        assert!(views.activity.is_empty());
        assert!(views.impact.is_empty());
        assert!(views.top_by_size.is_empty());
    }

    #[test]
    fn language_ties_keep_first_seen_order()
    {
        let repos = vec![
            repo("a", Some("Go",), 1, "2020-01-01T00:00:00Z",),
            repo("b", Some("Rust",), 1, "2020-01-01T00:00:00Z",),
            repo("c", Some("Rust",), 1, "2020-01-01T00:00:00Z",),
            repo("d", Some("Python",), 1, "2020-01-01T00:00:00Z",),
            repo("e", Some("Go",), 1, "2020-01-01T00:00:00Z",),
            repo("f", None, 1, "2020-01-01T00:00:00Z",),
        ];

        let tally = language_tally(&repos,);
        let order: Vec<&str,> =
            tally.entries().iter().map(|entry| entry.language.as_str(),).collect();
        assert_eq!(order, vec!["Go", "Rust", "Python"]);
        assert_eq!(tally.total(), 5);
    }

    #[test]
    fn activity_is_ascending_and_includes_unlanguaged_repositories()
    {
        let repos = vec![
            repo("new", None, 1, "2023-05-01T00:00:00Z",),
            repo("old", Some("C",), 1, "2015-02-01T00:00:00Z",),
            repo("mid", None, 1, "2019-07-01T00:00:00Z",),
            repo("mid2", Some("Go",), 1, "2019-09-01T00:00:00Z",),
        ];

        let tally = activity_tally(&repos,);
        let years: Vec<(&str, usize,),> =
            tally.entries().iter().map(|entry| (entry.year.as_str(), entry.count,),).collect();
        assert_eq!(years, vec![("2015", 1), ("2019", 2), ("2023", 1)]);
    }

    #[test]
    fn malformed_timestamps_fall_into_unknown_year()
    {
        let repos = vec![repo("blank", None, 0, "",), repo("odd", None, 0, "soon",)];
        let tally = activity_tally(&repos,);
        assert_eq!(tally.get(UNKNOWN_YEAR), Some(2));
    }

    #[test]
    fn impact_rows_substitute_unknown_language()
    {
        let rows = impact_rows(&[repo("tool", None, 42, "2020-01-01T00:00:00Z",)],);
        assert_eq!(rows[0].language, UNKNOWN_LANGUAGE);
        assert_eq!(rows[0].size, 42);
    }

    #[test]
    fn ranking_returns_all_when_fewer_than_limit()
    {
        let rows = impact_rows(&[
            repo("small", None, 1, "2020-01-01T00:00:00Z",),
            repo("big", None, 9, "2020-01-01T00:00:00Z",),
        ],);
        let ranking = rank_by_size(&rows,);
        let names: Vec<&str,> = ranking.rows().iter().map(|row| row.name.as_str(),).collect();
        assert_eq!(names, vec!["big", "small"]);
    }

    #[test]
    fn summary_totals_stars_and_years()
    {
        let profile = Profile {
            login: "octocat".to_owned(),
            created_at: "2011-01-25T18:44:36Z".to_owned(),
            public_repos: 2,
            ..Profile::default()
        };
        let mut first = repo("a", None, 1, "2020-01-01T00:00:00Z",);
        first.stars = 3;
        let mut second = repo("b", None, 1, "2020-01-01T00:00:00Z",);
        second.stars = 4;

        let summary = summarize(&profile, &[first, second], 2025,);
        assert_eq!(summary.total_stars, 7);
        assert_eq!(summary.years_active, 14);
        assert_eq!(summary.display_name, "octocat");
        assert_eq!(summary.bio, "No bio provided");
    }

    #[test]
    fn summary_years_never_negative()
    {
        let profile = Profile {
            login: "future".to_owned(),
            created_at: "2030-01-01T00:00:00Z".to_owned(),
            ..Profile::default()
        };
        assert_eq!(summarize(&profile, &[], 2025,).years_active, 0);
    }

    #[test]
    fn blank_language_is_unknown_in_every_view()
    {
        let views = aggregate(&[
            repo("empty", Some("",), 5, "2020-01-01T00:00:00Z",),
            repo("spaces", Some("   ",), 3, "2021-01-01T00:00:00Z",),
        ],);

        assert_eq!(views.languages.total(), 0);
        assert_eq!(views.activity.total(), 2);
        assert!(views.impact.iter().all(|row| row.language == UNKNOWN_LANGUAGE));
        assert!(views.top_by_size.rows().iter().all(|row| row.language == UNKNOWN_LANGUAGE));
    }

    #[test]
    fn total_stars_saturate_instead_of_overflowing()
    {
        let mut huge = repo("huge", None, 1, "2020-01-01T00:00:00Z",);
        huge.stars = u64::MAX - 1;
        let mut more = repo("more", None, 1, "2020-01-01T00:00:00Z",);
        more.stars = 10;

        let summary = summarize(&Profile::default(), &[huge, more], 2025,);
        assert_eq!(summary.total_stars, u64::MAX);
    }
}

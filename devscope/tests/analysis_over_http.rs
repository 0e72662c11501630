// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use std::time::Duration;

use devscope::{
    Analysis, Analyzer, Error, GeminiClient, GitHubFetcher, ProfileSource, QueryOutcome, Secrets,
    Settings, TextGenerator, retry::RetryConfig,
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn fast_retry() -> RetryConfig
{
    RetryConfig {
        max_attempts:     2,
        initial_delay_ms: 1,
        backoff_factor:   1.0,
    }
}

fn settings(server: &MockServer,) -> Settings
{
    let mut settings = Settings::default();
    settings.github.base_url = Some(server.uri(),);
    settings.github.retry = fast_retry();
    settings.generation.base_url = server.uri();
    settings.generation.timeout_secs = 1;
    settings.cache.ttl_secs = 0;
    settings
}

fn secrets() -> Secrets
{
    Secrets::new(Some("ghp_test".to_owned(),), Some("gemini-test".to_owned(),),)
        .expect("secrets present",)
}

fn user() -> Value
{
    json!({
        "login": "octocat",
        "name": "The Octocat",
        "bio": null,
        "avatar_url": "https://avatars.githubusercontent.com/u/583231",
        "html_url": "https://github.com/octocat",
        "public_repos": 3,
        "followers": 42,
        "following": 9,
        "created_at": "2011-01-25T18:44:36Z",
        "location": "San Francisco",
        "company": "@github"
    })
}

fn repositories() -> Value
{
    json!([
        {
            "name": "Spoon-Knife",
            "language": "HTML",
            "stargazers_count": 12000,
            "size": 12,
            "created_at": "2011-01-27T19:30:43Z",
            "description": "This repo is for demonstration purposes only.",
            "html_url": "https://github.com/octocat/Spoon-Knife"
        },
        {
            "name": "linguist",
            "language": "Ruby",
            "stargazers_count": 500,
            "size": 9000,
            "created_at": "2016-05-12T11:00:00Z",
            "description": null,
            "html_url": "https://github.com/octocat/linguist"
        },
        {
            "name": "octocat.github.io",
            "language": null,
            "stargazers_count": 80,
            "size": 300,
            "created_at": "2016-08-01T09:00:00Z",
            "html_url": "https://github.com/octocat/octocat.github.io"
        }
    ])
}

fn github_error(message: &str,) -> Value
{
    json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    })
}

fn generated(text: &str,) -> Value
{
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
}

async fn mount_profile(server: &MockServer,)
{
    Mock::given(method("GET",),)
        .and(path("/users/octocat",),)
        .respond_with(ResponseTemplate::new(200,).set_body_json(user(),),)
        .mount(server,)
        .await;
    Mock::given(method("GET",),)
        .and(path("/users/octocat/repos",),)
        .and(query_param("per_page", "100",),)
        .and(query_param("sort", "updated",),)
        .respond_with(ResponseTemplate::new(200,).set_body_json(repositories(),),)
        .mount(server,)
        .await;
}

fn fetcher(server: &MockServer,) -> GitHubFetcher
{
    let uri = server.uri();
    GitHubFetcher::new("ghp_test", Some(uri.as_str(),), fast_retry(), Duration::from_secs(5,),)
        .expect("fetcher",)
}

async fn completed(analyzer: &Analyzer, username: &str,) -> Analysis
{
    match analyzer.analyze(username,).await.expect("analysis succeeds",) {
        QueryOutcome::Completed(analysis,) => *analysis,
        other => panic!("expected completed analysis, got {other:?}"),
    }
}

#[tokio::test]
async fn fetcher_decodes_profile_and_repositories()
{
    let server = MockServer::start().await;
    mount_profile(&server,).await;

    let fetcher = fetcher(&server,);

    let profile = fetcher.fetch_profile("octocat",).await.expect("profile",);
    assert_eq!(profile.login, "octocat");
    assert_eq!(profile.url, "https://github.com/octocat");
    assert!(profile.bio.is_none());

    let repositories = fetcher.fetch_repositories("octocat", 100,).await.expect("repositories",);
    assert_eq!(repositories.len(), 3);
    assert_eq!(repositories[0].stars, 12000);
    assert!(repositories[2].language.is_none());
}

#[tokio::test]
async fn fetcher_maps_missing_user_to_not_found()
{
    let server = MockServer::start().await;
    Mock::given(method("GET",),)
        .and(path("/users/ZZZ_does_not_exist_123",),)
        .respond_with(ResponseTemplate::new(404,).set_body_json(github_error("Not Found",),),)
        .mount(&server,)
        .await;

    let fetcher = fetcher(&server,);

    let error = fetcher.fetch_profile("ZZZ_does_not_exist_123",).await.expect_err("missing user",);
    match error {
        Error::NotFound {
            username,
        } => assert_eq!(username, "ZZZ_does_not_exist_123"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn fetcher_maps_rejected_token_to_unauthorized()
{
    let server = MockServer::start().await;
    Mock::given(method("GET",),)
        .and(path("/users/octocat",),)
        .respond_with(ResponseTemplate::new(401,).set_body_json(github_error("Bad credentials",),),)
        .mount(&server,)
        .await;

    let fetcher = fetcher(&server,);

    let error = fetcher.fetch_profile("octocat",).await.expect_err("rejected token",);
    assert!(matches!(error, Error::Unauthorized { .. }), "got {error:?}");
}

#[tokio::test]
async fn fetcher_reports_server_errors_as_upstream()
{
    let server = MockServer::start().await;
    Mock::given(method("GET",),)
        .and(path("/users/octocat",),)
        .respond_with(
            ResponseTemplate::new(503,).set_body_json(github_error("Service Unavailable",),),
        )
        .mount(&server,)
        .await;

    let fetcher = fetcher(&server,);

    let error = fetcher.fetch_profile("octocat",).await.expect_err("outage",);
    assert!(error.is_transient(), "got {error:?}");

    let requests = server.received_requests().await.expect("request recording enabled",);
    assert_eq!(requests.len(), fast_retry().max_attempts as usize);
}

#[tokio::test]
async fn single_attempt_budget_sends_one_request()
{
    let server = MockServer::start().await;
    Mock::given(method("GET",),)
        .and(path("/users/octocat",),)
        .respond_with(ResponseTemplate::new(502,).set_body_json(github_error("Bad Gateway",),),)
        .expect(1,)
        .mount(&server,)
        .await;

    let uri = server.uri();
    let single = RetryConfig {
        max_attempts: 1, ..fast_retry()
    };
    let fetcher = GitHubFetcher::new("ghp_test", Some(uri.as_str(),), single, Duration::from_secs(5,),)
        .expect("fetcher",);

    let error = fetcher.fetch_profile("octocat",).await.expect_err("outage",);
    assert!(matches!(error, Error::Upstream { .. }), "got {error:?}");
}

#[tokio::test]
async fn gemini_client_sends_key_and_returns_text()
{
    let server = MockServer::start().await;
    Mock::given(method("POST",),)
        .and(path(GENERATE_PATH,),)
        .and(header("x-goog-api-key", "gemini-test",),)
        .respond_with(
            ResponseTemplate::new(200,).set_body_json(generated("Strong Rust background",),),
        )
        .expect(1,)
        .mount(&server,)
        .await;

    let client =
        GeminiClient::new("gemini-test", "gemini-2.0-flash", server.uri(), Duration::from_secs(5,),)
            .expect("client",);

    let text = client.generate("Summarize",).await.expect("generation",);
    assert_eq!(text, "Strong Rust background");
}

#[tokio::test]
async fn full_analysis_combines_metrics_and_insights()
{
    let server = MockServer::start().await;
    mount_profile(&server,).await;
    Mock::given(method("POST",),)
        .and(path(GENERATE_PATH,),)
        .and(body_string_contains("comma-separated",),)
        .respond_with(ResponseTemplate::new(200,).set_body_json(generated("Ruby, HTML, , Git",),),)
        .expect(1,)
        .mount(&server,)
        .await;
    Mock::given(method("POST",),)
        .and(path(GENERATE_PATH,),)
        .and(body_string_contains("Senior Technical Recruiter",),)
        .respond_with(
            ResponseTemplate::new(200,).set_body_json(generated("## Hiring Verdict\nHire.\n",),),
        )
        .expect(1,)
        .mount(&server,)
        .await;

    let analyzer = Analyzer::connect(&secrets(), &settings(&server,),).expect("analyzer",);
    let analysis = completed(&analyzer, "octocat",).await;

    let aggregates = analysis.repositories.aggregates().expect("aggregates",);
    assert_eq!(aggregates.languages.total(), 2);
    assert_eq!(aggregates.activity.get("2016"), Some(2));
    assert_eq!(aggregates.top_by_size.rows()[0].name, "linguist");
    assert_eq!(aggregates.impact[2].language, "Unknown");
    assert_eq!(analysis.summary.total_stars, 12580);
    assert_eq!(analysis.summary.bio, "No bio provided");
    assert_eq!(analysis.insight.ready().map(String::as_str), Some("## Hiring Verdict\nHire."));
    assert_eq!(
        analysis.skills.ready().map(|skills| skills.as_slice().to_vec()),
        Some(vec!["Ruby".to_owned(), "HTML".to_owned(), "Git".to_owned()])
    );
}

#[tokio::test]
async fn rate_limited_generation_keeps_metrics()
{
    let server = MockServer::start().await;
    mount_profile(&server,).await;
    Mock::given(method("POST",),)
        .and(path(GENERATE_PATH,),)
        .respond_with(ResponseTemplate::new(429,).set_body_string("quota exhausted",),)
        .mount(&server,)
        .await;

    let analyzer = Analyzer::connect(&secrets(), &settings(&server,),).expect("analyzer",);
    let analysis = completed(&analyzer, "octocat",).await;

    assert!(analysis.insight.is_unavailable());
    assert!(analysis.skills.is_unavailable());
    assert_eq!(analysis.repositories.aggregates().map(|views| views.top_by_size.len()), Some(3));
}

#[tokio::test]
async fn slow_generation_times_out_without_failing_the_query()
{
    let server = MockServer::start().await;
    mount_profile(&server,).await;
    Mock::given(method("POST",),)
        .and(path(GENERATE_PATH,),)
        .respond_with(
            ResponseTemplate::new(200,)
                .set_body_json(generated("too late",),)
                .set_delay(Duration::from_secs(5,),),
        )
        .mount(&server,)
        .await;

    let analyzer = Analyzer::connect(&secrets(), &settings(&server,),).expect("analyzer",);
    let analysis = completed(&analyzer, "octocat",).await;

    assert!(analysis.insight.is_unavailable());
    assert!(analysis.skills.is_unavailable());
    assert_eq!(analysis.profile.login, "octocat");

    let aggregates = analysis.repositories.aggregates().expect("aggregates",);
    assert_eq!(aggregates.languages.total(), 2);
    assert_eq!(aggregates.languages.get("Ruby"), Some(1));
    assert_eq!(aggregates.activity.get("2016"), Some(2));
    assert_eq!(aggregates.activity.total(), 3);
    assert_eq!(aggregates.top_by_size.rows()[0].name, "linguist");
}

#[tokio::test]
async fn missing_user_never_reaches_generation()
{
    let server = MockServer::start().await;
    Mock::given(method("GET",),)
        .and(path("/users/ZZZ_does_not_exist_123",),)
        .respond_with(ResponseTemplate::new(404,).set_body_json(github_error("Not Found",),),)
        .mount(&server,)
        .await;
    Mock::given(method("GET",),)
        .and(path("/users/ZZZ_does_not_exist_123/repos",),)
        .respond_with(ResponseTemplate::new(404,).set_body_json(github_error("Not Found",),),)
        .mount(&server,)
        .await;
    Mock::given(method("POST",),)
        .and(path(GENERATE_PATH,),)
        .respond_with(ResponseTemplate::new(200,).set_body_json(generated("unused",),),)
        .expect(0,)
        .mount(&server,)
        .await;

    let analyzer = Analyzer::connect(&secrets(), &settings(&server,),).expect("analyzer",);
    let error = analyzer.analyze("ZZZ_does_not_exist_123",).await.expect_err("missing user",);

    assert!(matches!(error, Error::NotFound { .. }), "got {error:?}");
}

//! Integration tests for the GraphQL client against a mock server.

use std::time::Duration;

use hubmail::github::{
    GithubClient, HubmailError, ItemCount, PageDirection, PageRequest, PersonalAccessToken,
    RepositoryLocator, ResourceFetcher, Thread, ThreadGateway, ThreadKind, ThreadLocator,
};
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ghp_test";

fn client_for(server: &MockServer) -> GithubClient {
    let token = PersonalAccessToken::new(TOKEN).expect("token should be valid");
    GithubClient::new(
        token,
        &format!("{}/graphql", server.uri()),
        Duration::from_secs(5),
    )
    .expect("client should build")
}

fn issue_node(number: u64) -> serde_json::Value {
    json!({
        "__typename": "Issue",
        "id": format!("I_{number}"),
        "number": number,
        "title": format!("Issue {number}"),
        "url": format!("https://github.com/octo/repo/issues/{number}"),
        "author": { "login": "octocat", "name": "The Octocat", "email": "" },
        "body": "It broke",
        "createdAt": "2021-03-04T05:06:07Z"
    })
}

#[rstest]
#[tokio::test]
async fn thread_query_sends_bearer_token_and_operation_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_partial_json(json!({
            "operationName": "Issue",
            "variables": { "user": "octo", "repo": "repo", "number": 7, "html": false }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "repository": { "thread": issue_node(7) } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let locator =
        ThreadLocator::parse("https://github.com/octo/repo/issues/7").expect("valid locator");
    let thread = client_for(&server)
        .thread(&locator, false)
        .await
        .expect("thread should load");

    assert!(matches!(thread, Thread::Issue(_)));
    assert_eq!(thread.data().title, "Issue 7");
    assert_eq!(thread.data().author.address(), "", "empty email is absent");
}

#[rstest]
#[tokio::test]
async fn graphql_errors_are_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "repository": null },
            "errors": [
                { "message": "Could not resolve to a Repository with the name 'octo/nope'." }
            ]
        })))
        .mount(&server)
        .await;

    let locator =
        ThreadLocator::parse("https://github.com/octo/nope/issues/1").expect("valid locator");
    let result = client_for(&server).thread(&locator, false).await;

    assert!(
        matches!(
            result,
            Err(HubmailError::Graphql { ref operation, ref message })
                if operation == "Issue" && message.contains("Could not resolve")
        ),
        "expected Graphql error, got {result:?}"
    );
}

#[rstest]
#[case::unauthorised(401)]
#[case::forbidden(403)]
#[tokio::test]
async fn rejected_token_is_an_authentication_error(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({ "message": "Bad credentials" })),
        )
        .mount(&server)
        .await;

    let locator =
        ThreadLocator::parse("https://github.com/octo/repo/pull/3").expect("valid locator");
    let result = client_for(&server).thread(&locator, false).await;

    assert!(
        matches!(
            result,
            Err(HubmailError::Authentication { ref message }) if message.contains("Bad credentials")
        ),
        "expected Authentication error, got {result:?}"
    );
}

#[rstest]
#[tokio::test]
async fn from_end_page_uses_backward_operation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "IssuesFromEnd",
            "variables": { "numThreads": 2, "cursor": null }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "repository": { "threads": {
                "nodes": [issue_node(4), issue_node(5)],
                "pageInfo": { "hasMore": true, "nextCursor": "before-4" }
            } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repository = RepositoryLocator::from_owner_repo("octo", "repo").expect("valid repo");
    let request = PageRequest {
        size: ItemCount::Last(2).page_size(20),
        cursor: None,
        direction: PageDirection::FromEnd,
    };
    let page = client_for(&server)
        .threads_page(&repository, ThreadKind::Issue, request, false)
        .await
        .expect("page should load");

    let numbers: Vec<u64> = page.items.iter().map(|t| t.data().number).collect();
    assert_eq!(numbers, vec![4, 5]);
    assert_eq!(page.next_cursor.as_deref(), Some("before-4"));
}

#[rstest]
#[tokio::test]
async fn comment_page_reports_end_of_walk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "Comments",
            "variables": { "id": "I_7", "cursor": "c1" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "node": { "comments": {
                "nodes": [{
                    "id": "IC_9",
                    "databaseId": 9,
                    "author": null,
                    "body": "late reply",
                    "createdAt": "2021-03-05T00:00:00Z"
                }],
                "pageInfo": { "hasMore": false, "nextCursor": "c2" }
            } } }
        })))
        .mount(&server)
        .await;

    let request = PageRequest {
        size: 20,
        cursor: Some("c1".to_owned()),
        direction: PageDirection::FromStart,
    };
    let page = client_for(&server)
        .comments_page("I_7", request, false)
        .await
        .expect("page should load");

    assert_eq!(page.next_cursor, None);
    let comment = page.items.first().expect("one comment");
    assert_eq!(comment.database_id, 9);
    assert_eq!(comment.author.name(), "ghost");
}

#[rstest]
#[tokio::test]
async fn resource_fetch_is_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/octo/repo/pull/3.patch"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(b"From abc Mon Sep 17 00:00:00 2001\n".to_vec()),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client
        .fetch(&format!("{}/octo/repo/pull/3.patch", server.uri()))
        .await
        .expect("patch should download");

    assert!(body.starts_with(b"From abc"));
    let requests = server.received_requests().await.expect("recording enabled");
    let request = requests.first().expect("one request");
    assert!(
        !request.headers.contains_key("authorization"),
        "downloads must not carry the token"
    );
}

#[rstest]
#[tokio::test]
async fn resource_fetch_requires_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .fetch(&format!("{}/missing.png", server.uri()))
        .await;

    assert!(
        matches!(result, Err(HubmailError::Api { ref message }) if message.contains("404")),
        "expected Api error, got {result:?}"
    );
}

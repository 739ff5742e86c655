//! Integration tests for the API client against a mock server.

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use microblog_client::client::ApiClient;
use microblog_client::config::Config;
use microblog_client::error::ApiError;
use microblog_client::models::Author;
use microblog_client::session::Session;
use microblog_client::validate::{ImageAttachment, LoginForm, NewPost, RegisterForm};

fn test_client(server: &MockServer) -> ApiClient {
    let config = Config {
        api_base_url: server.uri().parse().unwrap(),
        ..Config::for_testing()
    };
    ApiClient::new(&config).unwrap()
}

fn test_session() -> Session {
    Session {
        token: "tok-123".to_string(),
        user: Author {
            id: 1,
            name: "Sami".to_string(),
            username: "sami".to_string(),
            profile_image: None,
        },
    }
}

fn author_json() -> serde_json::Value {
    json!({"id": 1, "name": "Sami", "username": "sami", "profile_image": []})
}

fn post_json(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": null,
        "body": format!("post {id}"),
        "created_at": "2 hours ago",
        "comments_count": 0,
        "author": author_json(),
    })
}

#[tokio::test]
async fn test_fetch_page_sends_limit_and_page() {
    let server = MockServer::start().await;
    let posts: Vec<_> = (1..=10).map(post_json).collect();
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("limit", "10"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": posts })))
        .expect(1)
        .mount(&server)
        .await;

    let page = test_client(&server).fetch_page(3).await.unwrap();
    assert_eq!(page.posts.len(), 10);
    // Full page: the heuristic reports another page.
    assert_eq!(page.next, Some(4));
    assert_eq!(page.posts[0].body, "post 1");
}

#[tokio::test]
async fn test_fetch_page_short_page_has_no_next() {
    let server = MockServer::start().await;
    let posts: Vec<_> = (1..=4).map(post_json).collect();
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": posts })))
        .mount(&server)
        .await;

    let page = test_client(&server).fetch_page(1).await.unwrap();
    assert_eq!(page.posts.len(), 4);
    assert_eq!(page.next, None);
}

#[tokio::test]
async fn test_error_message_taken_from_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Server exploded"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_page(1).await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "Server exploded");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_message_falls_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_page(1).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch posts");
}

#[tokio::test]
async fn test_fetch_post_returns_comments() {
    let server = MockServer::start().await;
    let mut detail = post_json(42);
    detail["comments_count"] = json!(2);
    detail["comments"] = json!([
        {"id": 100, "body": "nice", "author": author_json()},
        {"id": 101, "body": "agreed", "author": author_json()},
    ]);
    Mock::given(method("GET"))
        .and(path("/posts/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": detail })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = test_client(&server).fetch_post(42).await.unwrap();
    assert_eq!(detail.post.id, 42);
    assert_eq!(detail.post.comments_count, 2);
    assert_eq!(detail.comments.len(), 2);
}

#[tokio::test]
async fn test_login_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"username": "sami", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-999",
            "user": author_json(),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = test_client(&server)
        .login(&LoginForm {
            username: "sami".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.token, "tok-999");
    assert_eq!(session.user.username, "sami");
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .login(&LoginForm {
            username: "sami".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn test_create_post_sends_bearer_and_multipart() {
    let server = MockServer::start().await;
    let mut created = post_json(77);
    created["title"] = json!("hello");
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_string_contains("name=\"body\""))
        .and(body_string_contains("name=\"title\""))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"photo.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": created })))
        .expect(1)
        .mount(&server)
        .await;

    let new_post = NewPost {
        title: Some("hello".to_string()),
        body: "first post".to_string(),
        image: Some(ImageAttachment {
            file_name: "photo.png".to_string(),
            bytes: vec![0; 64],
        }),
    };
    let post = test_client(&server)
        .create_post(&test_session(), &new_post)
        .await
        .unwrap();
    assert_eq!(post.id, 77);
}

#[tokio::test]
async fn test_create_comment_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts/42/comments"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_json(json!({"body": "nice post"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 200, "body": "nice post", "author": author_json()},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let comment = test_client(&server)
        .create_comment(&test_session(), 42, "nice post")
        .await
        .unwrap();
    assert_eq!(comment.id, 200);
    assert_eq!(comment.body, "nice post");
}

#[tokio::test]
async fn test_register_sends_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_string_contains("name=\"username\""))
        .and(body_string_contains("name=\"password\""))
        .and(body_string_contains("name=\"name\""))
        .and(body_string_contains("name=\"email\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-new",
            "user": {"id": 9, "name": "Nora", "username": "nora", "profile_image": null},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = test_client(&server)
        .register(&RegisterForm {
            name: "Nora".to_string(),
            username: "nora".to_string(),
            email: "nora@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret1".to_string(),
            image: None,
        })
        .await
        .unwrap();
    assert_eq!(session.token, "tok-new");
    assert_eq!(session.user.id, 9);
}

use std::{sync::Arc, time::Duration};

use application::{Clock, SystemClock};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use infrastructure::{BcryptPasswordHasher, Infrastructure, JwtTokenService, Storage};
use serde_json::{json, Value};
use tower::ServiceExt;

use web_api::{router, AppState};

const PRIVATE_KEY: &str = include_str!("../../infrastructure/testdata/app.rsa");
const PUBLIC_KEY: &str = include_str!("../../infrastructure/testdata/app.rsa.pub");
const OTHER_PRIVATE_KEY: &str = include_str!("../../infrastructure/testdata/other.rsa");
const OTHER_PUBLIC_KEY: &str = include_str!("../../infrastructure/testdata/other.rsa.pub");
const PASSWORD: &str = "correct horse battery";

fn token_service(private: &str, public: &str) -> JwtTokenService {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    JwtTokenService::from_rsa_pem(
        private.as_bytes(),
        public.as_bytes(),
        "chat",
        time::Duration::minutes(100),
        clock,
    )
    .expect("test keys")
}

fn app() -> Router {
    let infrastructure = Infrastructure::new(
        Storage::in_memory(),
        Arc::new(BcryptPasswordHasher::new(4)),
        Arc::new(token_service(PRIVATE_KEY, PUBLIC_KEY)),
        Arc::new(SystemClock),
    );
    router(
        AppState::from_infrastructure(&infrastructure),
        Duration::from_secs(10),
    )
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("utf8 body")
    }
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let header = |name| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let location = header(header::LOCATION);
    let content_type = header(header::CONTENT_TYPE);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec();

    Reply {
        status,
        location,
        content_type,
        body,
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

async fn signup_and_signin(app: &Router, login: &str) -> (String, String) {
    let reply = send(
        app,
        json_request("POST", "/signup", None, json!({"login": login, "password": PASSWORD})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let id = reply.json()["id"].as_str().expect("id").to_owned();
    assert_eq!(reply.location, Some(format!("/accounts/{id}")));

    let reply = send(
        app,
        json_request("POST", "/signin", None, json!({"login": login, "password": PASSWORD})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/jwt"));

    (id, reply.text())
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let reply = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn signup_validation_and_duplicates() {
    let app = app();

    let reply = send(
        &app,
        json_request("POST", "/signup", None, json!({"login": "a b", "password": PASSWORD})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["code"], "INVALID_FORMAT");

    signup_and_signin(&app, "alice1").await;
    let reply = send(
        &app,
        json_request("POST", "/signup", None, json!({"login": "alice1", "password": PASSWORD})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn signin_failures_are_bad_requests() {
    let app = app();
    signup_and_signin(&app, "alice1").await;

    let reply = send(
        &app,
        json_request(
            "POST",
            "/signin",
            None,
            json!({"login": "alice1", "password": "wrong horse battery"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["code"], "INVALID_PASSWORD");

    let reply = send(
        &app,
        json_request("POST", "/signin", None, json!({"login": "nobody1", "password": PASSWORD})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["code"], "INVALID_LOGIN");
}

#[tokio::test]
async fn bearer_header_problems() {
    let app = app();
    let (id, _) = signup_and_signin(&app, "alice1").await;
    let uri = format!("/accounts/{id}");

    let missing = send(
        &app,
        Request::builder().uri(&uri).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let malformed = send(
        &app,
        Request::builder()
            .uri(&uri)
            .header(header::AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    let garbage = send(&app, authed("GET", &uri, "not-a-token")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let forged = token_service(OTHER_PRIVATE_KEY, OTHER_PUBLIC_KEY);
    let forged_token =
        application::TokenService::issue(&forged, &domain::AccountId::from(id.as_str()))
            .expect("issue");
    let forged = send(&app, authed("GET", &uri, &forged_token)).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn accounts_are_only_visible_to_themselves() {
    let app = app();
    let (alice_id, alice_token) = signup_and_signin(&app, "alice1").await;
    let (bob_id, _) = signup_and_signin(&app, "bobby2").await;

    let own = send(&app, authed("GET", &format!("/accounts/{alice_id}"), &alice_token)).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.json(), json!({"id": alice_id, "login": "alice1"}));

    let other = send(&app, authed("GET", &format!("/accounts/{bob_id}"), &alice_token)).await;
    assert_eq!(other.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn room_membership_and_messages() {
    let app = app();
    let (alice_id, alice) = signup_and_signin(&app, "alice1").await;
    let (bob_id, bob) = signup_and_signin(&app, "bobby2").await;
    let (carol_id, carol) = signup_and_signin(&app, "carol3").await;

    let created = send(&app, authed("POST", "/rooms", &alice)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let room = created.json();
    let room_id = room["id"].as_str().unwrap().to_owned();
    assert_eq!(created.location, Some(format!("/rooms/{room_id}")));
    assert_eq!(room["creator-id"], alice_id.as_str());
    assert_eq!(room["members-count"], 1);

    let room_uri = format!("/rooms/{room_id}");
    let messages_uri = format!("/rooms/{room_id}/messages");

    // 非成员看到的与房间不存在相同
    let hidden = send(&app, authed("GET", &room_uri, &bob)).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
    let missing = send(&app, authed("GET", "/rooms/ffff", &bob)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(hidden.json(), missing.json());
    let hidden = send(&app, authed("GET", &messages_uri, &bob)).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let updated = send(
        &app,
        json_request(
            "PUT",
            &room_uri,
            Some(&alice),
            json!({"members": [{"id": bob_id}, {"id": carol_id}, {"id": bob_id}]}),
        ),
    )
    .await;
    assert_eq!(updated.status, StatusCode::NO_CONTENT);

    let fetched = send(&app, authed("GET", &room_uri, &bob)).await.json();
    assert_eq!(fetched["members-count"], 3);
    assert_eq!(
        fetched["member-ids"],
        json!([alice_id.clone(), bob_id.clone(), carol_id.clone()])
    );

    let listed = send(&app, authed("GET", "/rooms", &carol)).await.json();
    assert_eq!(listed, json!({"room-ids": [room_id.clone()], "rooms-number": 1}));

    let posted = send(
        &app,
        json_request("POST", &messages_uri, Some(&bob), json!({"text": "hello"})),
    )
    .await;
    assert_eq!(posted.status, StatusCode::CREATED);
    assert_eq!(posted.json()["author-id"], bob_id.as_str());
    assert!(posted.json()["created-at"].is_string());

    send(
        &app,
        json_request("POST", &messages_uri, Some(&carol), json!({"text": "hi bob"})),
    )
    .await;

    // 删除 bob，同时尝试删除创建者（被忽略）
    let updated = send(
        &app,
        json_request(
            "PUT",
            &room_uri,
            Some(&carol),
            json!({"members": [{"id": bob_id, "delete": true}, {"id": alice_id, "delete": true}]}),
        ),
    )
    .await;
    assert_eq!(updated.status, StatusCode::NO_CONTENT);

    let listed = send(&app, authed("GET", &messages_uri, &alice)).await.json();
    let texts: Vec<_> = listed["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(texts, vec!["hello", "hi bob"]);

    let gone = send(&app, authed("GET", &messages_uri, &bob)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let none = send(&app, authed("GET", "/rooms", &bob)).await.json();
    assert_eq!(none, json!({"room-ids": [], "rooms-number": 0}));

    let fetched = send(&app, authed("GET", &room_uri, &alice)).await.json();
    assert_eq!(fetched["member-ids"], json!([alice_id, carol_id]));
}

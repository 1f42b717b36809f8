#![allow(dead_code)]

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};
use stw::models::{
    CreatePostArgs, CreateUserArgs, FeedResponse, MutationReply, ReplyStatus, StwPost,
};

type Params = Query<HashMap<String, String>>;

#[derive(Default)]
pub struct BackendState {
    /// Oldest first.
    pub posts: Vec<StwPost>,
    pub subscriptions: HashMap<String, HashSet<String>>,
    pub requests: Vec<String>,
    /// Serve the bot check page to GETs and DELETEs without a passcode cookie.
    pub bot_check: bool,
    clock: i64,
}

pub const BOT_CHECK_PAGE: &str = "<html><head>Confirm you are not Bot</head><body>\
<form method='post'><input type='submit' value='ImNotBot'></form></body></html>";

/// In-process stand-in for the stw web server.
#[derive(Clone, Default)]
pub struct Backend {
    pub state: Arc<Mutex<BackendState>>,
}

impl Backend {
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn seed_post(&self, user_id: &str, contents: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.clock += 0x1000;
        let posted = format!("{:x}", 0x17b3c0000000000_i64 + state.clock);
        state.posts.push(StwPost {
            user_id: user_id.to_string(),
            contents: contents.to_string(),
            posted: posted.clone(),
        });
        posted
    }

    pub fn enable_bot_check(&self) {
        self.state.lock().unwrap().bot_check = true;
    }

    fn log(&self, request: String) {
        self.state.lock().unwrap().requests.push(request);
    }
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> &'a str {
    params.get(name).map(String::as_str).unwrap_or_default()
}

fn ok(post_key: Option<String>) -> Json<MutationReply> {
    Json(MutationReply {
        post_key,
        status: Some(ReplyStatus::Ok),
    })
}

async fn create_user(
    State(backend): State<Backend>,
    Json(args): Json<CreateUserArgs>,
) -> Json<MutationReply> {
    backend.log(format!("POST /users {}", args.user_id));
    ok(None)
}

async fn create_post(
    State(backend): State<Backend>,
    Json(args): Json<CreatePostArgs>,
) -> Json<MutationReply> {
    backend.log(format!("POST /posts {} {}", args.user_id, args.contents));
    let posted = backend.seed_post(&args.user_id, &args.contents);
    ok(Some(format!("{}:post_{}", args.user_id, posted)))
}

async fn delete_post(State(backend): State<Backend>, Query(params): Params) -> Json<MutationReply> {
    let (user_id, post_key) = (param(&params, "UserID"), param(&params, "PostKey"));
    backend.log(format!("DELETE /posts {user_id} {post_key}"));

    let mut state = backend.state.lock().unwrap();
    let before = state.posts.len();
    state
        .posts
        .retain(|post| format!("{}:post_{}", post.user_id, post.posted) != post_key);

    if state.posts.len() == before {
        Json(MutationReply {
            post_key: None,
            status: Some(ReplyStatus::NoSuchPost),
        })
    } else {
        ok(None)
    }
}

async fn subscribe(State(backend): State<Backend>, Query(params): Params) -> Json<MutationReply> {
    let (user_id, target) = (param(&params, "UserID"), param(&params, "TargetUserID"));
    backend.log(format!("POST /subscriptions {user_id} {target}"));
    backend
        .state
        .lock()
        .unwrap()
        .subscriptions
        .entry(user_id.to_string())
        .or_default()
        .insert(target.to_string());
    ok(None)
}

async fn unsubscribe(
    State(backend): State<Backend>,
    Query(params): Params,
) -> (StatusCode, Json<MutationReply>) {
    let (user_id, target) = (param(&params, "UserID"), param(&params, "TargetUserID"));
    backend.log(format!("DELETE /subscriptions {user_id} {target}"));

    let mut state = backend.state.lock().unwrap();
    let removed = state
        .subscriptions
        .get_mut(user_id)
        .map(|targets| targets.remove(target))
        .unwrap_or(false);

    if removed {
        (StatusCode::OK, ok(None))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(MutationReply {
                post_key: None,
                status: Some(ReplyStatus::NoSuchTargetUser),
            }),
        )
    }
}

fn newest_first(posts: impl Iterator<Item = StwPost>) -> Json<FeedResponse> {
    let mut posts: Vec<StwPost> = posts.collect();
    posts.reverse();
    Json(FeedResponse {
        posts: (!posts.is_empty()).then_some(posts),
        status: Some(ReplyStatus::Ok),
    })
}

async fn timeline(State(backend): State<Backend>, Query(params): Params) -> Json<FeedResponse> {
    let user_id = param(&params, "UserID").to_string();
    backend.log(format!("GET /timeline {user_id}"));

    let state = backend.state.lock().unwrap();
    newest_first(
        state
            .posts
            .iter()
            .filter(|post| post.user_id == user_id)
            .cloned(),
    )
}

/// Users implicitly follow themselves.
async fn home(State(backend): State<Backend>, Query(params): Params) -> Json<FeedResponse> {
    let user_id = param(&params, "UserID").to_string();
    backend.log(format!("GET /home {user_id}"));

    let state = backend.state.lock().unwrap();
    let following = state.subscriptions.get(&user_id).cloned().unwrap_or_default();
    newest_first(
        state
            .posts
            .iter()
            .filter(|post| post.user_id == user_id || following.contains(&post.user_id))
            .cloned(),
    )
}

fn has_passcode(request: &Request) -> bool {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|cookies| cookies.split(';').any(|c| c.trim() == "passcode=passcode"))
}

/// Any POST earns the cookie and goes through; other methods without it get
/// the bot check page.
async fn bot_check(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    let enabled = backend.state.lock().unwrap().bot_check;
    if !enabled || has_passcode(&request) {
        return next.run(request).await;
    }

    if request.method() == Method::POST {
        let mut response = next.run(request).await;
        response
            .headers_mut()
            .insert(header::SET_COOKIE, HeaderValue::from_static("passcode=passcode"));
        return response;
    }

    backend.log(format!("BOTCHECK {} {}", request.method(), request.uri().path()));
    Html(BOT_CHECK_PAGE).into_response()
}

async fn index(State(backend): State<Backend>, method: Method) -> Html<&'static str> {
    backend.log(format!("{method} /"));
    Html("<html><body>stw</body></html>")
}

pub fn router(backend: Backend) -> Router {
    Router::new()
        .route("/", get(index).post(index))
        .route("/users", post(create_user))
        .route("/posts", post(create_post).delete(delete_post))
        .route("/subscriptions", post(subscribe).delete(unsubscribe))
        .route("/home", get(home))
        .route("/timeline", get(timeline))
        .route("/broken", get(|| async { "{\"Posts\": [" }))
        .route(
            "/fail",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable") }),
        )
        .route("/stubborn", get(|| async { Html(BOT_CHECK_PAGE) }))
        .layer(middleware::from_fn_with_state(backend.clone(), bot_check))
        .with_state(backend)
}

/// Serves the fake on an ephemeral port and returns its base URL.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = router(backend.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), backend)
}

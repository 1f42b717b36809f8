use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use std::time::Duration;

use super::{Ack, GatewayError};
use crate::models::{CreatePostArgs, CreateUserArgs, FeedResponse, MutationReply, Post, PostKey};
use crate::resolver::Endpoint;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Submit button label of the page a loaded server serves instead of the
/// requested resource.
const BOT_CHECK_MARKER: &str = "ImNotBot";

fn is_bot_check(body: &str) -> bool {
    body.trim_start().starts_with("<html") && body.contains(BOT_CHECK_MARKER)
}

/// Remote operations of the stw web server. Every call resolves exactly once;
/// only HTTP 200 counts as success.
#[async_trait]
pub trait StwApi: Send + Sync {
    async fn create_user(&self, user_id: &str) -> GatewayResult<Ack>;
    async fn create_post(&self, author_id: &str, contents: &str) -> GatewayResult<Ack>;
    async fn delete_post(&self, author_id: &str, post_key: &PostKey) -> GatewayResult<Ack>;
    async fn subscribe(&self, subscriber_id: &str, target_id: &str) -> GatewayResult<Ack>;
    async fn unsubscribe(&self, subscriber_id: &str, target_id: &str) -> GatewayResult<Ack>;
    async fn fetch_feed(&self, endpoint: &Endpoint) -> GatewayResult<Vec<Post>>;
}

pub struct StwClient {
    client: Client,
    base_url: String,
}

impl StwClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request, answering the server's bot check once if it shows up.
    /// The answer leaves a `passcode` cookie in the client's store, so later
    /// requests pass straight through.
    async fn send(&self, request: RequestBuilder) -> GatewayResult<String> {
        let retry = request.try_clone();
        let body = Self::read(request).await?;
        if !is_bot_check(&body) {
            return Ok(body);
        }

        debug!("server asked for a bot check, answering it");
        self.answer_bot_check().await?;

        let body = Self::read(retry.ok_or(GatewayError::BotCheck)?).await?;
        if is_bot_check(&body) {
            return Err(GatewayError::BotCheck);
        }
        Ok(body)
    }

    async fn read(request: RequestBuilder) -> GatewayResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(GatewayError::Status { status, body });
        }

        Ok(body)
    }

    /// Posting the form is the whole answer; the server sets the cookie on
    /// any POST and the reply body is the site index.
    async fn answer_bot_check(&self) -> GatewayResult<()> {
        let response = self.client.post(self.url("/")).send().await?;
        debug!("bot check answered with {}", response.status());
        Ok(())
    }

    async fn send_mutation(&self, request: RequestBuilder) -> GatewayResult<Ack> {
        let body = self.send(request).await?;

        // reply bodies are informational, an unreadable one does not fail the call
        let reply: MutationReply = serde_json::from_str(&body).unwrap_or_default();
        debug!("mutation reply: {}", body.trim());

        Ok(Ack {
            status: reply.status,
            post_key: reply.post_key,
            body,
        })
    }
}

#[async_trait]
impl StwApi for StwClient {
    async fn create_user(&self, user_id: &str) -> GatewayResult<Ack> {
        let args = CreateUserArgs {
            user_id: user_id.to_string(),
        };
        self.send_mutation(self.client.post(self.url("/users")).json(&args)).await
    }

    async fn create_post(&self, author_id: &str, contents: &str) -> GatewayResult<Ack> {
        let args = CreatePostArgs {
            user_id: author_id.to_string(),
            contents: contents.to_string(),
        };
        self.send_mutation(self.client.post(self.url("/posts")).json(&args)).await
    }

    async fn delete_post(&self, author_id: &str, post_key: &PostKey) -> GatewayResult<Ack> {
        let request = self
            .client
            .delete(self.url("/posts"))
            .query(&[("UserID", author_id), ("PostKey", post_key.as_str())]);
        self.send_mutation(request).await
    }

    async fn subscribe(&self, subscriber_id: &str, target_id: &str) -> GatewayResult<Ack> {
        let request = self
            .client
            .post(self.url("/subscriptions"))
            .query(&[("UserID", subscriber_id), ("TargetUserID", target_id)]);
        self.send_mutation(request).await
    }

    async fn unsubscribe(&self, subscriber_id: &str, target_id: &str) -> GatewayResult<Ack> {
        let request = self
            .client
            .delete(self.url("/subscriptions"))
            .query(&[("UserID", subscriber_id), ("TargetUserID", target_id)]);
        self.send_mutation(request).await
    }

    async fn fetch_feed(&self, endpoint: &Endpoint) -> GatewayResult<Vec<Post>> {
        let request = self
            .client
            .get(self.url(endpoint.path()))
            .query(&[("UserID", endpoint.user_id())]);

        let body = self.send(request).await?;
        let feed: FeedResponse = serde_json::from_str(&body)?;

        Ok(feed.into_posts())
    }
}

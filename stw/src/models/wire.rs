use serde::{Deserialize, Serialize};

use super::Post;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct StwPost {
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub contents: String,
    pub posted: String,
}

/// Body of `GET /home` and `GET /timeline`.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct FeedResponse {
    // the server encodes an empty list as null
    #[serde(default)]
    pub posts: Option<Vec<StwPost>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReplyStatus>,
}

impl FeedResponse {
    pub fn into_posts(self) -> Vec<Post> {
        self.posts
            .unwrap_or_default()
            .into_iter()
            .map(Post::from)
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreatePostArgs {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "Contents")]
    pub contents: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateUserArgs {
    #[serde(rename = "UserID")]
    pub user_id: String,
}

/// Reply of every mutating endpoint. `PostKey` is only set by `POST /posts`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct MutationReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReplyStatus>,
}

/// Application level status carried in reply bodies.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(from = "i64", into = "i64")]
pub enum ReplyStatus {
    Ok,
    NoSuchUser,
    NoSuchPost,
    NoSuchTargetUser,
    Exists,
    NotReady,
    Unknown(i64),
}

impl From<i64> for ReplyStatus {
    fn from(code: i64) -> Self {
        match code {
            1 => ReplyStatus::Ok,
            2 => ReplyStatus::NoSuchUser,
            3 => ReplyStatus::NoSuchPost,
            4 => ReplyStatus::NoSuchTargetUser,
            5 => ReplyStatus::Exists,
            6 => ReplyStatus::NotReady,
            other => ReplyStatus::Unknown(other),
        }
    }
}

impl From<ReplyStatus> for i64 {
    fn from(status: ReplyStatus) -> Self {
        match status {
            ReplyStatus::Ok => 1,
            ReplyStatus::NoSuchUser => 2,
            ReplyStatus::NoSuchPost => 3,
            ReplyStatus::NoSuchTargetUser => 4,
            ReplyStatus::Exists => 5,
            ReplyStatus::NotReady => 6,
            ReplyStatus::Unknown(code) => code,
        }
    }
}

pub mod wire;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fmt;

pub use wire::{CreatePostArgs, CreateUserArgs, FeedResponse, MutationReply, ReplyStatus, StwPost};

/// Separates the author from the hex timestamp inside a post key.
pub const POST_KEY_SEPARATOR: &str = ":post_";

/// Text shown by the transient placeholder while a feed is loading.
pub const PLACEHOLDER_TEXT: &str = "Loading...";

/// A post as held by the client. The backend owns posts; the client only keeps
/// ephemeral copies for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub author_id: String,
    pub contents: String,
    /// Hex encoded nanoseconds since epoch, exactly as the server sent it.
    pub posted_at: String,
}

impl Post {
    pub fn new(
        author_id: impl Into<String>,
        contents: impl Into<String>,
        posted_at: impl Into<String>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            contents: contents.into(),
            posted_at: posted_at.into(),
        }
    }

    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_TEXT, PLACEHOLDER_TEXT, "0")
    }

    pub fn key(&self) -> PostKey {
        PostKey::new(&self.author_id, &self.posted_at)
    }

    pub fn posted_nanos(&self) -> Result<i64> {
        parse_hex_nanos(&self.posted_at)
    }

    pub fn posted_local(&self) -> Result<DateTime<Local>> {
        nanos_to_local(self.posted_nanos()?)
    }
}

impl From<StwPost> for Post {
    fn from(post: StwPost) -> Self {
        Self {
            author_id: post.user_id,
            contents: post.contents,
            posted_at: post.posted,
        }
    }
}

/// Composite post address `<author>:post_<hex timestamp>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostKey(String);

impl PostKey {
    pub fn new(author_id: &str, posted_at: &str) -> Self {
        Self(format!("{author_id}{POST_KEY_SEPARATOR}{posted_at}"))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        raw.split_once(POST_KEY_SEPARATOR)
            .with_context(|| format!("invalid post key '{raw}'"))?;
        Ok(Self(raw.to_string()))
    }

    /// Splits the key back into `(author_id, posted_at)`.
    pub fn parts(&self) -> (&str, &str) {
        // parse and new both guarantee the separator is present
        self.0
            .split_once(POST_KEY_SEPARATOR)
            .unwrap_or((self.0.as_str(), ""))
    }

    pub fn author_id(&self) -> &str {
        self.parts().0
    }

    pub fn posted_at(&self) -> &str {
        self.parts().1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn parse_hex_nanos(hex: &str) -> Result<i64> {
    i64::from_str_radix(hex.trim_start_matches("0x"), 16)
        .with_context(|| format!("invalid hex timestamp '{hex}'"))
}

/// Nanoseconds are reduced to milliseconds by integer division before the
/// local time conversion.
pub fn nanos_to_local(nanos: i64) -> Result<DateTime<Local>> {
    Local
        .timestamp_millis_opt(nanos / 1_000_000)
        .single()
        .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))
}

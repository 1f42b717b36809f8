use owo_colors::OwoColorize;
use std::fmt;

use crate::models::{nanos_to_local, parse_hex_nanos, Post, PostKey, POST_KEY_SEPARATOR};
use crate::state::NavBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Subscribe,
    Unsubscribe,
    Delete,
}

impl ControlKind {
    pub const ALL: [ControlKind; 3] = [
        ControlKind::Subscribe,
        ControlKind::Unsubscribe,
        ControlKind::Delete,
    ];

    fn suffix(self) -> &'static str {
        match self {
            ControlKind::Subscribe => "a",
            ControlKind::Unsubscribe => "b",
            ControlKind::Delete => "c",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlKind::Subscribe => "subscribe",
            ControlKind::Unsubscribe => "unsubscribe",
            ControlKind::Delete => "delete",
        }
    }
}

/// Button attached to a rendered post, tagged `<post key>.<a|b|c>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionControl {
    pub kind: ControlKind,
    pub id: String,
}

impl ActionControl {
    fn new(key: &PostKey, kind: ControlKind) -> Self {
        Self {
            kind,
            id: format!("{}.{}", key, kind.suffix()),
        }
    }
}

/// Strips the control suffix from a tag, leaving the post key. Anything that
/// is not a post key plus a known suffix is returned unchanged.
pub fn tag_post_key(tag: &str) -> &str {
    match tag.rsplit_once('.') {
        Some((key, suffix))
            if key.contains(POST_KEY_SEPARATOR)
                && ControlKind::ALL.iter().any(|kind| kind.suffix() == suffix) =>
        {
            key
        }
        _ => tag,
    }
}

/// Author a tag points at. A tag that carries no post key is taken to be a
/// user name already.
pub fn tag_author(tag: &str) -> &str {
    let key = tag_post_key(tag);
    key.split_once(POST_KEY_SEPARATOR)
        .map(|(author, _)| author)
        .unwrap_or(key)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    /// Fresh for every render, never reused across refreshes.
    pub render_id: u64,
    pub post: Post,
    pub key: PostKey,
    pub controls: [ActionControl; 3],
}

impl PostView {
    pub fn control(&self, kind: ControlKind) -> &ActionControl {
        match kind {
            ControlKind::Subscribe => &self.controls[0],
            ControlKind::Unsubscribe => &self.controls[1],
            ControlKind::Delete => &self.controls[2],
        }
    }
}

pub fn format_time(posted_at: &str) -> String {
    parse_hex_nanos(posted_at)
        .and_then(nanos_to_local)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| "Invalid Date".to_string())
}

impl fmt::Display for PostView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", format!("@{}", self.post.author_id).bright_cyan().bold())?;
        writeln!(f, "{}", self.post.contents)?;
        writeln!(
            f,
            "{}",
            format!("Posted at: {}", format_time(&self.post.posted_at)).dimmed()
        )?;
        let controls = self
            .controls
            .iter()
            .map(|control| format!("[{}] {}", control.kind.label(), control.id))
            .collect::<Vec<_>>()
            .join("  ");
        write!(f, "{}", controls.dimmed())
    }
}

/// Ordered list of rendered posts. Rebuilt on every refresh, never diffed.
#[derive(Debug, Clone, Default)]
pub struct DisplayedFeed {
    views: Vec<PostView>,
    next_render_id: u64,
}

impl DisplayedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn build(&mut self, post: Post) -> PostView {
        self.next_render_id += 1;
        let key = post.key();
        let controls = ControlKind::ALL.map(|kind| ActionControl::new(&key, kind));
        PostView {
            render_id: self.next_render_id,
            post,
            key,
            controls,
        }
    }

    pub fn clear(&mut self) {
        self.views.clear();
    }

    pub fn render_append(&mut self, post: Post) {
        let view = self.build(post);
        self.views.push(view);
    }

    pub fn render_prepend(&mut self, post: Post) {
        let view = self.build(post);
        self.views.insert(0, view);
    }

    /// Keeps the given order exactly.
    pub fn replace_all(&mut self, posts: impl IntoIterator<Item = Post>) {
        self.clear();
        for post in posts {
            self.render_append(post);
        }
    }

    pub fn views(&self) -> &[PostView] {
        &self.views
    }

    pub fn posts(&self) -> Vec<&Post> {
        self.views.iter().map(|view| &view.post).collect()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn find_control(&self, id: &str) -> Option<(&PostView, &ActionControl)> {
        self.views.iter().find_map(|view| {
            view.controls
                .iter()
                .find(|control| control.id == id)
                .map(|control| (view, control))
        })
    }
}

pub fn render_nav(nav: &NavBar) -> String {
    nav.controls()
        .iter()
        .map(|control| {
            if control.on {
                format!("[{}]", control.label).black().on_bright_green().to_string()
            } else {
                format!(" {} ", control.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_feed(nav: &NavBar, feed: &DisplayedFeed) -> String {
    let mut sections = vec![render_nav(nav)];

    if feed.is_empty() {
        sections.push("No posts.".dimmed().to_string());
    } else {
        sections.extend(feed.views().iter().map(|view| view.to_string()));
    }

    let separator = format!("\n{}\n", "─".repeat(60));
    sections.join(separator.as_str())
}

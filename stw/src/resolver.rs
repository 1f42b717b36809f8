use std::{fmt, str::FromStr};

use crate::state::Session;

/// Feed tabs of the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Home,
    MyTimeline,
    Discover,
}

impl View {
    pub const ALL: [View; 3] = [View::Home, View::MyTimeline, View::Discover];

    pub fn label(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::MyTimeline => "MyTimeline",
            View::Discover => "Discover",
        }
    }

    pub fn from_label(label: &str) -> Option<View> {
        View::ALL
            .into_iter()
            .find(|view| view.label() == label.trim())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::from_label(s).ok_or_else(|| {
            format!(
                "unknown view '{s}', expected one of {}",
                View::ALL.map(View::label).join(", ")
            )
        })
    }
}

/// Remote feed location: a path plus the `UserID` query value. An empty
/// endpoint means no fetch is issued.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    path: &'static str,
    user_id: String,
}

impl Endpoint {
    pub fn new(path: &'static str, user_id: &str) -> Self {
        Self {
            path,
            user_id: user_id.to_string(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "{}?UserID={}", self.path, self.user_id)
    }
}

/// Discover has no endpoint of its own on the server and reads the home feed.
pub fn resolve(view: View, user_id: &str) -> Endpoint {
    match view {
        View::Home => Endpoint::new("/home", user_id),
        View::MyTimeline => Endpoint::new("/timeline", user_id),
        View::Discover => Endpoint::new("/home", user_id),
    }
}

pub fn resolve_label(label: &str, user_id: &str) -> Endpoint {
    match View::from_label(label) {
        Some(view) => resolve(view, user_id),
        None => Endpoint::empty(),
    }
}

pub fn resolve_session(session: &Session) -> Endpoint {
    resolve_label(&session.view_label, &session.user_id)
}

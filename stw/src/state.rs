use crate::render::DisplayedFeed;
use crate::resolver::View;

/// Snapshot of who is acting and which tab is shown, taken once at the start
/// of every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub view_label: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavControl {
    pub label: String,
    pub on: bool,
}

/// Navigation bar. At most one control is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavBar {
    controls: Vec<NavControl>,
}

impl NavBar {
    pub fn new(active: View) -> Self {
        let controls = View::ALL
            .into_iter()
            .map(|view| NavControl {
                label: view.label().to_string(),
                on: view == active,
            })
            .collect();
        Self { controls }
    }

    pub fn controls(&self) -> &[NavControl] {
        &self.controls
    }

    /// Label of the control marked on, "Home" when none is.
    pub fn active_label(&self) -> &str {
        self.controls
            .iter()
            .find(|control| control.on)
            .map(|control| control.label.as_str())
            .unwrap_or(View::Home.label())
    }

    /// Turns on the control whose label matches and every other control off.
    pub fn activate(&mut self, label: &str) {
        for control in &mut self.controls {
            control.on = control.label == label.trim();
        }
    }
}

impl Default for NavBar {
    fn default() -> Self {
        Self::new(View::Home)
    }
}

/// Everything the terminal shows.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub user_id: String,
    pub nav: NavBar,
    pub feed: DisplayedFeed,
}

impl ClientState {
    pub fn new(user_id: &str, view: View) -> Self {
        Self {
            user_id: user_id.to_string(),
            nav: NavBar::new(view),
            feed: DisplayedFeed::default(),
        }
    }

    pub fn session(&self) -> Session {
        Session {
            view_label: self.nav.active_label().to_string(),
            user_id: self.user_id.clone(),
        }
    }
}

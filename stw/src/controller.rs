use log::debug;
use serde::Deserialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use crate::api::{stw::StwApi, Ack, GatewayError};
use crate::models::{Post, PostKey};
use crate::render::{tag_author, tag_post_key};
use crate::resolver::{resolve_session, View};
use crate::state::{ClientState, Session};

/// When a finished mutation triggers a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshOn {
    Success,
    Always,
}

impl RefreshOn {
    fn should_refresh(self, accepted: bool) -> bool {
        match self {
            RefreshOn::Success => accepted,
            RefreshOn::Always => true,
        }
    }
}

/// Subscribe refreshes even when the request failed while unsubscribe only
/// refreshes on success; both can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub subscribe: RefreshOn,
    pub unsubscribe: RefreshOn,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            subscribe: RefreshOn::Always,
            unsubscribe: RefreshOn::Success,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The feed was redrawn with this many posts.
    Applied(usize),
    /// A newer refresh started while this one was in flight.
    Stale,
    Failed,
    NoEndpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    pub accepted: bool,
    pub refresh: Option<RefreshOutcome>,
}

/// Maps user actions to gateway calls and ends every one of them in a full
/// resolve, fetch and redraw cycle.
pub struct Controller<A> {
    api: A,
    state: Mutex<ClientState>,
    generation: AtomicU64,
    policy: RefreshPolicy,
}

impl<A: StwApi> Controller<A> {
    pub fn new(api: A, user_id: &str, view: View) -> Self {
        Self {
            api,
            state: Mutex::new(ClientState::new(user_id, view)),
            generation: AtomicU64::new(0),
            policy: RefreshPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn state(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> Session {
        self.state().session()
    }

    pub fn snapshot(&self) -> ClientState {
        self.state().clone()
    }

    pub async fn post(&self, contents: &str) -> ActionOutcome {
        let session = self.session();
        debug!("post as '{}'", session.user_id);
        let result = self.api.create_post(&session.user_id, contents).await;
        self.finish("post", result, RefreshOn::Success).await
    }

    pub async fn delete(&self, tag: &str) -> ActionOutcome {
        let post_key = match PostKey::parse(tag_post_key(tag)) {
            Ok(post_key) => post_key,
            Err(e) => {
                debug!("ignore delete: {e}");
                return ActionOutcome {
                    accepted: false,
                    refresh: None,
                };
            }
        };

        let session = self.session();
        debug!("delete {} as '{}'", post_key, session.user_id);
        let result = self.api.delete_post(&session.user_id, &post_key).await;
        self.finish("delete", result, RefreshOn::Success).await
    }

    /// Subscribes to the author of the post a control id belongs to.
    pub async fn subscribe(&self, tag: &str) -> ActionOutcome {
        self.subscribe_user(tag_author(tag)).await
    }

    /// Subscribes to a user by name. The name is sent as is.
    pub async fn subscribe_user(&self, target: &str) -> ActionOutcome {
        let session = self.session();
        debug!("'{}' subscribes to '{}'", session.user_id, target);
        let result = self.api.subscribe(&session.user_id, target).await;
        self.finish("subscribe", result, self.policy.subscribe).await
    }

    pub async fn unsubscribe(&self, tag: &str) -> ActionOutcome {
        self.unsubscribe_user(tag_author(tag)).await
    }

    pub async fn unsubscribe_user(&self, target: &str) -> ActionOutcome {
        let session = self.session();
        debug!("'{}' unsubscribes from '{}'", session.user_id, target);
        let result = self.api.unsubscribe(&session.user_id, target).await;
        self.finish("unsubscribe", result, self.policy.unsubscribe).await
    }

    pub async fn register(&self) -> ActionOutcome {
        let session = self.session();
        debug!("register '{}'", session.user_id);
        let result = self.api.create_user(&session.user_id).await;
        self.finish("register", result, RefreshOn::Success).await
    }

    pub async fn switch_view(&self, label: &str) -> ActionOutcome {
        self.state().nav.activate(label);
        debug!("switch view to {label}");
        ActionOutcome {
            accepted: true,
            refresh: Some(self.refresh().await),
        }
    }

    /// The identifier is taken as is, empty included.
    pub async fn switch_user(&self, user_id: &str) -> ActionOutcome {
        self.state().user_id = user_id.to_string();
        debug!("switch user to '{user_id}'");
        ActionOutcome {
            accepted: true,
            refresh: Some(self.refresh().await),
        }
    }

    async fn finish(
        &self,
        action: &str,
        result: Result<Ack, GatewayError>,
        refresh_on: RefreshOn,
    ) -> ActionOutcome {
        let accepted = match result {
            Ok(ack) => {
                debug!("{action} accepted: {:?}", ack.status);
                true
            }
            Err(e) => {
                debug!("{action} failed: {e}");
                false
            }
        };

        let refresh = if refresh_on.should_refresh(accepted) {
            Some(self.refresh().await)
        } else {
            None
        };

        ActionOutcome { accepted, refresh }
    }

    /// Resolves the endpoint for the current session, shows the placeholder,
    /// fetches and redraws. Responses of superseded refreshes are dropped.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (endpoint, generation) = {
            let mut state = self.state();
            let endpoint = resolve_session(&state.session());
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.feed.render_prepend(Post::placeholder());
            (endpoint, generation)
        };

        if endpoint.is_empty() {
            debug!("no endpoint for the active view, skip fetch");
            return RefreshOutcome::NoEndpoint;
        }

        debug!("refresh #{generation} from {endpoint}");
        match self.api.fetch_feed(&endpoint).await {
            Ok(posts) => {
                let mut state = self.state();
                if self.generation.load(Ordering::SeqCst) != generation {
                    debug!("discard stale refresh #{generation}");
                    return RefreshOutcome::Stale;
                }
                let count = posts.len();
                state.feed.replace_all(posts);
                RefreshOutcome::Applied(count)
            }
            Err(e) => {
                debug!("refresh #{generation} failed: {e}");
                RefreshOutcome::Failed
            }
        }
    }
}

//! Per-guest navigation state.
//!
//! Each browsing session owns one [`FlowController`]; requests lock the
//! registry, apply a single transition or render, and release it.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use invitation_flow::{
    AnimationError, AnimationPolicy, Animator, EntranceCue, FlowController, Frame, Navigator,
    View,
};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub(crate) type GuestFlow = FlowController<RedirectNavigator, CssAnimator>;

/// Records the path the flow asked to navigate to so the handler can answer
/// with a redirect.
#[derive(Debug, Default)]
pub(crate) struct RedirectNavigator {
    pending: Option<String>,
}

impl RedirectNavigator {
    pub(crate) fn take_redirect(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl Navigator for RedirectNavigator {
    fn navigate(&mut self, path: &str) {
        self.pending = Some(path.to_string());
    }
}

/// Entrance animations are emitted as CSS classes on the first render of a
/// mount; the browser tears them down with the page.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CssAnimator {
    enabled: bool,
}

impl CssAnimator {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Animator for CssAnimator {
    type Handle = ();

    fn start(
        &mut self,
        _view: View,
        _cues: &[EntranceCue],
        _policy: &AnimationPolicy,
    ) -> Result<(), AnimationError> {
        if self.enabled {
            Ok(())
        } else {
            Err(AnimationError::Disabled)
        }
    }
}

/// Moves a flow onto the RSVP view, opening the invitation first if needed,
/// and renders it.
pub(crate) fn advance_to_rsvp(flow: &mut GuestFlow) -> Frame {
    if flow.current() == View::Intro {
        flow.open_invitation();
        flow.navigator_mut().take_redirect();
    }
    flow.follow(View::Rsvp);
    flow.render()
}

struct GuestSession {
    flow: GuestFlow,
    last_seen: Instant,
}

#[derive(Clone)]
pub(crate) struct FlowSessions {
    inner: Arc<Mutex<HashMap<Uuid, GuestSession>>>,
    idle_timeout: Duration,
}

impl FlowSessions {
    pub(crate) fn new(idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Registers a new session, pruning idle ones first.
    pub(crate) async fn start(&self, flow: GuestFlow) -> Uuid {
        let mut sessions = self.inner.lock().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_seen) < self.idle_timeout);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "expired idle guest sessions");
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            GuestSession {
                flow,
                last_seen: now,
            },
        );
        id
    }

    /// Runs `f` against a live session. `None` when unknown or idle too long.
    pub(crate) async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut GuestFlow) -> R,
    ) -> Option<R> {
        let mut sessions = self.inner.lock().await;
        let now = Instant::now();
        let expired = match sessions.get(&id) {
            Some(session) => now.duration_since(session.last_seen) >= self.idle_timeout,
            None => return None,
        };
        if expired {
            sessions.remove(&id);
            return None;
        }

        let session = sessions.get_mut(&id)?;
        session.last_seen = now;
        Some(f(&mut session.flow))
    }

    pub(crate) async fn end(&self, id: Uuid) -> bool {
        self.inner.lock().await.remove(&id).is_some()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
#[path = "tests/sessions_tests.rs"]
mod tests;

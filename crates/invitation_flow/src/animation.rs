use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::view::View;

const DEFAULT_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entrance {
    FadeDown,
    FadeUp,
}

/// Page region an entrance animation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    DateOrnament,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntranceCue {
    pub block: Block,
    pub entrance: Entrance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationPolicy {
    pub duration: Duration,
    /// Play once per mount; never replay on re-render.
    pub once: bool,
}

impl Default for AnimationPolicy {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            once: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("animations are disabled")]
    Disabled,
    #[error("animation driver failed: {0}")]
    Driver(String),
}

/// Plays entrance animations for a mounted view.
///
/// The returned handle lives as long as the mount; dropping it cancels
/// whatever is still running.
pub trait Animator {
    type Handle;

    fn start(
        &mut self,
        view: View,
        cues: &[EntranceCue],
        policy: &AnimationPolicy,
    ) -> Result<Self::Handle, AnimationError>;
}

/// Scoped lifetime of one displayed view.
///
/// Acquired when a view is mounted and released when the controller moves
/// on. Owns the animation handle, so leaving the view cancels its timers.
pub struct ViewMount<H> {
    view: View,
    policy: AnimationPolicy,
    handle: Option<H>,
    cues_pending: bool,
}

impl<H> ViewMount<H> {
    pub fn acquire<A>(view: View, policy: AnimationPolicy, animator: &mut A) -> Self
    where
        A: Animator<Handle = H>,
    {
        let cues = view.entrances();
        if cues.is_empty() {
            return Self::static_mount(view, policy);
        }

        match animator.start(view, cues, &policy) {
            Ok(handle) => {
                debug!(%view, duration_ms = policy.duration.as_millis() as u64, "entrance animation started");
                Self {
                    view,
                    policy,
                    handle: Some(handle),
                    cues_pending: true,
                }
            }
            Err(AnimationError::Disabled) => Self::static_mount(view, policy),
            Err(error) => {
                warn!(%view, %error, "entrance animation unavailable; rendering statically");
                Self::static_mount(view, policy)
            }
        }
    }

    fn static_mount(view: View, policy: AnimationPolicy) -> Self {
        Self {
            view,
            policy,
            handle: None,
            cues_pending: false,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn policy(&self) -> &AnimationPolicy {
        &self.policy
    }

    pub fn is_animated(&self) -> bool {
        self.handle.is_some()
    }

    /// Cues to emit on this render. Non-empty at most once per mount when the
    /// policy is one-shot.
    pub fn take_cues(&mut self) -> Vec<EntranceCue> {
        if !self.cues_pending {
            return Vec::new();
        }
        if self.policy.once {
            self.cues_pending = false;
        }
        self.view.entrances().to_vec()
    }
}

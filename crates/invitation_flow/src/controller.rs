use serde::Serialize;
use tracing::debug;

use crate::{
    animation::{AnimationPolicy, Animator, EntranceCue, ViewMount},
    view::{EventDetails, GuestName, View},
};

/// Routing capability of the host shell.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced { from: View, to: View },
    Stay,
    Ignored,
}

/// User actions offered by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// "Buka Undangan"
    OpenInvitation,
    /// "Konfirmasi & Kirim Ucapan", handled by the RSVP backend.
    ConfirmAttendance,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::OpenInvitation => "Buka Undangan",
            Action::ConfirmAttendance => "Konfirmasi & Kirim Ucapan",
        }
    }
}

/// Everything needed to draw the active view once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub view: View,
    pub guest_name: String,
    pub groom: String,
    pub bride: String,
    pub date_label: String,
    pub actions: Vec<Action>,
    pub entrances: Vec<EntranceCue>,
    pub animated: bool,
    pub animation_duration_ms: u64,
}

pub struct FlowController<N, A: Animator> {
    state: View,
    guest: GuestName,
    event: EventDetails,
    policy: AnimationPolicy,
    navigator: N,
    animator: A,
    mount: ViewMount<A::Handle>,
}

impl<N: Navigator, A: Animator> FlowController<N, A> {
    /// Starts a session on the intro view.
    pub fn new(guest: GuestName, event: EventDetails, navigator: N, animator: A) -> Self {
        Self::with_policy(guest, event, navigator, animator, AnimationPolicy::default())
    }

    pub fn with_policy(
        guest: GuestName,
        event: EventDetails,
        navigator: N,
        mut animator: A,
        policy: AnimationPolicy,
    ) -> Self {
        let mount = ViewMount::acquire(View::Intro, policy, &mut animator);
        Self {
            state: View::Intro,
            guest,
            event,
            policy,
            navigator,
            animator,
            mount,
        }
    }

    pub fn current(&self) -> View {
        self.state
    }

    pub fn guest(&self) -> &GuestName {
        &self.guest
    }

    pub fn event(&self) -> &EventDetails {
        &self.event
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn is_animated(&self) -> bool {
        self.mount.is_animated()
    }

    /// The single advance control on the intro view.
    pub fn open_invitation(&mut self) -> Transition {
        if self.state != View::Intro {
            return Transition::Ignored;
        }
        let transition = self.enter(View::Opening);
        self.navigator.navigate(View::Opening.path());
        transition
    }

    /// External (scroll/route) navigation. Only moves forward, and only after
    /// the invitation has been opened.
    pub fn follow(&mut self, target: View) -> Transition {
        if target == self.state {
            return Transition::Stay;
        }
        if self.state == View::Intro || target < self.state {
            debug!(from = %self.state, to = %target, "navigation refused");
            return Transition::Ignored;
        }
        self.enter(target)
    }

    /// Session reload: back to a freshly mounted intro.
    pub fn restart(&mut self) {
        self.enter(View::Intro);
    }

    pub fn render(&mut self) -> Frame {
        match self.state {
            View::Intro => self.show_intro(),
            View::Opening => self.show_opening(),
            View::Quotes => self.show_quotes(),
            View::Rsvp => self.show_rsvp(),
        }
    }

    fn show_intro(&mut self) -> Frame {
        self.frame(vec![Action::OpenInvitation])
    }

    fn show_opening(&mut self) -> Frame {
        self.frame(Vec::new())
    }

    fn show_quotes(&mut self) -> Frame {
        self.frame(Vec::new())
    }

    fn show_rsvp(&mut self) -> Frame {
        self.frame(vec![Action::ConfirmAttendance])
    }

    fn frame(&mut self, actions: Vec<Action>) -> Frame {
        Frame {
            view: self.state,
            guest_name: self.guest.as_str().to_string(),
            groom: self.event.groom.clone(),
            bride: self.event.bride.clone(),
            date_label: self.event.date_label.clone(),
            actions,
            entrances: self.mount.take_cues(),
            animated: self.mount.is_animated(),
            animation_duration_ms: self.mount.policy().duration.as_millis() as u64,
        }
    }

    fn enter(&mut self, target: View) -> Transition {
        let from = self.state;
        self.state = target;
        self.remount();
        debug!(%from, to = %target, "view transition");
        Transition::Advanced { from, to: target }
    }

    fn remount(&mut self) {
        // The previous mount (and its animation handle) is dropped here.
        self.mount = ViewMount::acquire(self.state, self.policy, &mut self.animator);
    }
}

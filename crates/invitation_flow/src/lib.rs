//! Guest-facing invitation flow.
//!
//! A [`FlowController`] owns the navigation state of one browsing session
//! and walks it through `Intro -> Opening -> Quotes -> Rsvp`. Rendering
//! produces a [`Frame`]; routing and animation playback are delegated to the
//! [`Navigator`] and [`Animator`] capabilities supplied by the host.

mod animation;
mod controller;
mod view;

pub use animation::{
    AnimationError, AnimationPolicy, Animator, Block, Entrance, EntranceCue, ViewMount,
};
pub use controller::{Action, FlowController, Frame, Navigator, Transition};
pub use view::{
    EventDetails, GuestName, View, DEFAULT_BRIDE_NAME, DEFAULT_DATE_LABEL, DEFAULT_GROOM_NAME,
    DEFAULT_GUEST_NAME, QUOTE_SOURCE, QUOTE_TEXT,
};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

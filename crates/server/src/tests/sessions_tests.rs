use super::*;
use invitation_flow::{EventDetails, GuestName, Transition};

fn flow(animated: bool) -> GuestFlow {
    FlowController::new(
        GuestName::resolve(Some("Ahmad")),
        EventDetails::default(),
        RedirectNavigator::default(),
        CssAnimator::new(animated),
    )
}

#[tokio::test]
async fn open_invitation_leaves_a_redirect_for_the_handler() {
    let sessions = FlowSessions::new(Duration::from_secs(60));
    let id = sessions.start(flow(true)).await;

    let redirect = sessions
        .with_session(id, |flow| {
            assert!(matches!(
                flow.open_invitation(),
                Transition::Advanced { .. }
            ));
            flow.navigator_mut().take_redirect()
        })
        .await
        .expect("session");
    assert_eq!(redirect.as_deref(), Some("/opening"));

    let second = sessions
        .with_session(id, |flow| {
            flow.open_invitation();
            flow.navigator_mut().take_redirect()
        })
        .await
        .expect("session");
    assert_eq!(second, None);
}

#[tokio::test]
async fn disabled_animations_render_statically() {
    let sessions = FlowSessions::new(Duration::from_secs(60));
    let id = sessions.start(flow(false)).await;
    let frame = sessions
        .with_session(id, |flow| flow.render())
        .await
        .expect("session");
    assert!(!frame.animated);
    assert!(frame.entrances.is_empty());
}

#[tokio::test]
async fn idle_sessions_expire() {
    let sessions = FlowSessions::new(Duration::ZERO);
    let id = sessions.start(flow(true)).await;
    assert!(sessions.with_session(id, |_| ()).await.is_none());
    assert_eq!(sessions.len().await, 0);
}

#[tokio::test]
async fn starting_a_session_prunes_idle_ones() {
    let sessions = FlowSessions::new(Duration::ZERO);
    sessions.start(flow(true)).await;
    sessions.start(flow(true)).await;
    assert_eq!(sessions.len().await, 1);
}

#[tokio::test]
async fn ended_sessions_are_forgotten() {
    let sessions = FlowSessions::new(Duration::from_secs(60));
    let id = sessions.start(flow(true)).await;
    assert!(sessions.end(id).await);
    assert!(!sessions.end(id).await);
    assert!(sessions.with_session(id, |_| ()).await.is_none());
    assert!(sessions
        .with_session(Uuid::new_v4(), |_| ())
        .await
        .is_none());
}

#[test]
fn advance_to_rsvp_opens_the_invitation_on_the_way() {
    let mut guest = flow(true);
    let frame = advance_to_rsvp(&mut guest);
    assert_eq!(frame.view, View::Rsvp);
    assert_eq!(guest.current(), View::Rsvp);
    assert_eq!(guest.navigator_mut().take_redirect(), None);

    let again = advance_to_rsvp(&mut guest);
    assert_eq!(again.view, View::Rsvp);
}

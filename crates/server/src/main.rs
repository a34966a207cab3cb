use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use invitation_flow::{Frame, GuestName, Transition, View};
use serde::Deserialize;
use shared::{
    domain::Attendance,
    error::ApiError,
    invite::parse_invite_code,
    protocol::{RsvpReceipt, RsvpRequest, ServerEvent, WishPayload},
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod admin;
mod api;
mod app_state;
mod config;
mod cookies;
mod pages;
mod sessions;

use api::{list_wishes, status_for, submit_rsvp};
use app_state::{AppState, SiteConfig};
use config::{load_settings, prepare_database_url};
use cookies::{cookie_value, session_cookie, GUEST_SESSION_COOKIE};
use pages::{invitation_page, message_page, Notice, RsvpDraft};
use sessions::advance_to_rsvp;

const MAX_BODY_BYTES: usize = 16 * 1024;
const RSVP_THANKS: &str = "Terima kasih, ucapan Anda telah terkirim.";

#[derive(Debug, Deserialize)]
struct IntroQuery {
    to: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RsvpForm {
    guest_name: String,
    attendance: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct WishesQuery {
    limit: Option<u32>,
    before: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let site = SiteConfig::from_settings(&settings)?;
    if site.admin_password.is_none() {
        warn!("admin_password is not set; admin dashboard disabled");
    }

    let app = build_router(Arc::new(AppState::new(storage, site)));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, public_url = %settings.public_url, "invitation server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.site.assets_dir);
    Router::new()
        .route("/", get(intro))
        .route("/open", post(open_invitation))
        .route("/opening", get(opening))
        .route("/quotes", get(quotes))
        .route("/rsvp", get(rsvp).post(rsvp_submit))
        .route("/api/rsvp", post(api_rsvp))
        .route("/api/wishes", get(api_wishes))
        .route("/ws/wishes", get(ws_handler))
        .route("/healthz", get(healthz))
        .route("/admin", get(admin::dashboard))
        .route("/admin/login", get(admin::login_form).post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route("/admin/guests", post(admin::create_guest))
        .route("/admin/guests/:guest_id/delete", post(admin::delete_guest))
        .nest_service("/assets", assets)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

pub(crate) fn html_error(status: StatusCode, title: &str, message: &str) -> Response {
    (status, Html(message_page(title, message))).into_response()
}

fn guest_cookie(state: &AppState, session_id: Uuid) -> HeaderValue {
    let max_age = i64::try_from(state.site.guest_session_idle.as_secs()).unwrap_or(i64::MAX);
    session_cookie(GUEST_SESSION_COOKIE, &session_id.to_string(), max_age)
}

fn guest_session_id(headers: &HeaderMap) -> Option<Uuid> {
    cookie_value(headers, GUEST_SESSION_COOKIE).and_then(|raw| Uuid::parse_str(raw).ok())
}

async fn resolve_guest(state: &AppState, query: &IntroQuery) -> GuestName {
    if let Some(guest_id) = query.code.as_deref().and_then(parse_invite_code) {
        match state.storage.guest_name(guest_id).await {
            Ok(Some(name)) => return GuestName::resolve(Some(&name)),
            Ok(None) => debug!(guest_id = guest_id.0, "invite code for unknown guest"),
            Err(error) => warn!(%error, "guest lookup failed; using query name"),
        }
    }
    GuestName::resolve(query.to.as_deref())
}

fn publish_wish(state: &AppState, wish: WishPayload) {
    info!(rsvp_id = wish.rsvp_id.0, attendance = wish.attendance.as_str(), "rsvp received");
    let _ = state.events.send(ServerEvent::WishReceived { wish });
}

/// Entry point of a browsing session; loading it always restarts the flow.
async fn intro(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IntroQuery>,
    headers: HeaderMap,
) -> Response {
    if let Some(previous) = guest_session_id(&headers) {
        state.sessions.end(previous).await;
    }

    let guest = resolve_guest(&state, &q).await;
    let mut flow = state.new_flow(guest);
    let frame = flow.render();
    let session_id = state.sessions.start(flow).await;

    (
        [(header::SET_COOKIE, guest_cookie(&state, session_id))],
        Html(invitation_page(&frame, None, None)),
    )
        .into_response()
}

async fn open_invitation(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    let Some(session_id) = guest_session_id(&headers) else {
        return Redirect::to(View::Intro.path());
    };
    let target = state
        .sessions
        .with_session(session_id, |flow| {
            flow.open_invitation();
            flow.navigator_mut()
                .take_redirect()
                .unwrap_or_else(|| flow.current().path().to_string())
        })
        .await;
    Redirect::to(target.as_deref().unwrap_or(View::Intro.path()))
}

async fn show_view(state: &AppState, headers: &HeaderMap, view: View) -> Response {
    let Some(session_id) = guest_session_id(headers) else {
        return Redirect::to(View::Intro.path()).into_response();
    };
    let outcome = state
        .sessions
        .with_session(session_id, |flow| match flow.follow(view) {
            Transition::Ignored => Err(flow.current().path()),
            Transition::Advanced { .. } | Transition::Stay => Ok(flow.render()),
        })
        .await;

    match outcome {
        None => Redirect::to(View::Intro.path()).into_response(),
        Some(Err(current)) => Redirect::to(current).into_response(),
        Some(Ok(frame)) => Html(invitation_page(&frame, None, None)).into_response(),
    }
}

async fn opening(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    show_view(&state, &headers, View::Opening).await
}

async fn quotes(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    show_view(&state, &headers, View::Quotes).await
}

async fn rsvp(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    show_view(&state, &headers, View::Rsvp).await
}

/// Stores the RSVP whatever state the guest's session is in, then shows the
/// RSVP view with the outcome. A missing or expired session is replaced by a
/// fresh one already on the RSVP view.
async fn rsvp_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<RsvpForm>,
) -> Response {
    let submitted = match form.attendance.parse::<Attendance>() {
        Ok(attendance) => {
            let request = RsvpRequest {
                guest_name: form.guest_name.clone(),
                attendance,
                message: form.message.clone(),
            };
            submit_rsvp(&state.storage, request).await
        }
        Err(message) => Err(ApiError::validation(message)),
    };

    let (status, notice, draft) = match submitted {
        Ok(wish) => {
            publish_wish(&state, wish);
            (StatusCode::OK, Notice::Success(RSVP_THANKS.to_string()), None)
        }
        Err(error) => {
            let draft = RsvpDraft {
                guest_name: &form.guest_name,
                attendance: &form.attendance,
                message: &form.message,
            };
            (status_for(&error), Notice::Error(error.message), Some(draft))
        }
    };

    let live = match guest_session_id(&headers) {
        Some(session_id) => state.sessions.with_session(session_id, advance_to_rsvp).await,
        None => None,
    };
    let page = |frame: &Frame| Html(invitation_page(frame, Some(&notice), draft.as_ref()));
    match live {
        Some(frame) => (status, page(&frame)).into_response(),
        None => {
            let mut flow = state.new_flow(GuestName::resolve(Some(&form.guest_name)));
            let frame = advance_to_rsvp(&mut flow);
            let session_id = state.sessions.start(flow).await;
            debug!(%session_id, "rsvp posted without a live session; started one");
            (
                status,
                [(header::SET_COOKIE, guest_cookie(&state, session_id))],
                page(&frame),
            )
                .into_response()
        }
    }
}

async fn api_rsvp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RsvpRequest>,
) -> Result<Json<RsvpReceipt>, (StatusCode, Json<ApiError>)> {
    let wish = submit_rsvp(&state.storage, req)
        .await
        .map_err(|e| (status_for(&e), Json(e)))?;
    let receipt = RsvpReceipt {
        rsvp_id: wish.rsvp_id,
        accepted_at: wish.sent_at,
    };
    publish_wish(&state, wish);
    Ok(Json(receipt))
}

async fn api_wishes(
    State(state): State<Arc<AppState>>,
    Query(q): Query<WishesQuery>,
) -> Result<Json<Vec<WishPayload>>, (StatusCode, Json<ApiError>)> {
    let wishes = list_wishes(&state.storage, q.limit, q.before)
        .await
        .map_err(|e| (status_for(&e), Json(e)))?;
    Ok(Json(wishes))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

async fn ws_connection(state: Arc<AppState>, socket: axum::extract::ws::WebSocket) {
    use axum::extract::ws::Message;
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut events_rx = state.events.subscribe();

    let send_task = tokio::spawn(async move {
        loop {
            let event = match events_rx.recv().await {
                Ok(event) => event,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "wishes subscriber lagged");
                    ServerEvent::Error(ApiError::internal(format!(
                        "missed {skipped} wishes; reload /api/wishes"
                    )))
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            };
            let text = match serde_json::to_string(&event) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(_msg)) = receiver.next().await {}

    send_task.abort();
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            error!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

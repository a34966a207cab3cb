//! Admin dashboard behind a stored session token.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use shared::{
    domain::{AdminToken, GuestId},
    invite::invitation_link,
};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::{
    api::{wish_from_stored, MAX_GUEST_NAME_CHARS},
    app_state::AppState,
    cookies::{cookie_value, expired_cookie, session_cookie, ADMIN_SESSION_COOKIE},
    html_error,
    pages::{admin_dashboard_page, admin_login_page, Dashboard, GuestRow, Notice},
};

const LOGIN_PATH: &str = "/admin/login";
const DASHBOARD_PATH: &str = "/admin";
const RECENT_WISHES: u32 = 20;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuestForm {
    name: String,
}

fn admin_disabled() -> Response {
    html_error(
        StatusCode::FORBIDDEN,
        "Admin",
        "Admin dashboard is disabled on this server.",
    )
}

fn passwords_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

fn admin_token(headers: &HeaderMap) -> Option<AdminToken> {
    cookie_value(headers, ADMIN_SESSION_COOKIE).and_then(|raw| raw.parse().ok())
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<AdminToken, Response> {
    if state.site.admin_password.is_none() {
        return Err(admin_disabled());
    }
    let Some(token) = admin_token(headers) else {
        return Err(Redirect::to(LOGIN_PATH).into_response());
    };
    match state.storage.admin_session_valid(token).await {
        Ok(true) => Ok(token),
        Ok(false) => Err(Redirect::to(LOGIN_PATH).into_response()),
        Err(error) => {
            warn!(%error, "admin session lookup failed");
            Err(html_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Admin",
                "Session check failed.",
            ))
        }
    }
}

pub(crate) async fn login_form(State(state): State<Arc<AppState>>) -> Response {
    if state.site.admin_password.is_none() {
        return admin_disabled();
    }
    Html(admin_login_page(None)).into_response()
}

pub(crate) async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let Some(expected) = state.site.admin_password.as_deref() else {
        return admin_disabled();
    };
    if !passwords_match(expected, &form.password) {
        warn!("admin login rejected");
        return (
            StatusCode::UNAUTHORIZED,
            Html(admin_login_page(Some("Password salah."))),
        )
            .into_response();
    }

    if let Err(error) = state.storage.purge_expired_admin_sessions().await {
        warn!(%error, "failed to purge expired admin sessions");
    }
    let token = match state
        .storage
        .create_admin_session(state.site.admin_session_ttl)
        .await
    {
        Ok(token) => token,
        Err(error) => {
            warn!(%error, "failed to create admin session");
            return html_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Admin",
                "Could not start a session.",
            );
        }
    };
    info!("admin session opened");

    let cookie = session_cookie(
        ADMIN_SESSION_COOKIE,
        &token.to_string(),
        state.site.admin_session_ttl.num_seconds(),
    );
    ([(header::SET_COOKIE, cookie)], Redirect::to(DASHBOARD_PATH)).into_response()
}

async fn render_dashboard(state: &AppState, status: StatusCode, notice: Option<Notice>) -> Response {
    let loaded = async {
        let summary = state.storage.rsvp_summary().await?;
        let wishes = state.storage.list_rsvps(RECENT_WISHES, None).await?;
        let guests = state.storage.list_guests().await?;
        anyhow::Ok((summary, wishes, guests))
    }
    .await;

    match loaded {
        Ok((summary, wishes, guests)) => {
            let dashboard = Dashboard {
                summary,
                wishes: wishes.into_iter().map(wish_from_stored).collect(),
                guests: guests
                    .into_iter()
                    .map(|guest| GuestRow {
                        guest_id: guest.guest_id.0,
                        link: invitation_link(&state.site.public_url, guest.guest_id).to_string(),
                        name: guest.name,
                    })
                    .collect(),
            };
            (
                status,
                Html(admin_dashboard_page(&dashboard, notice.as_ref())),
            )
                .into_response()
        }
        Err(error) => {
            warn!(%error, "failed to load dashboard");
            html_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Admin",
                "Dashboard data is unavailable.",
            )
        }
    }
}

pub(crate) async fn dashboard(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(response) = require_admin(&state, &headers).await {
        return response;
    }
    render_dashboard(&state, StatusCode::OK, None).await
}

pub(crate) async fn create_guest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<GuestForm>,
) -> Response {
    if let Err(response) = require_admin(&state, &headers).await {
        return response;
    }

    let name = form.name.trim();
    if name.is_empty() || name.chars().count() > MAX_GUEST_NAME_CHARS {
        let notice = Notice::Error(format!(
            "Nama tamu harus 1 sampai {MAX_GUEST_NAME_CHARS} karakter."
        ));
        return render_dashboard(&state, StatusCode::BAD_REQUEST, Some(notice)).await;
    }

    match state.storage.create_guest(name).await {
        Ok(guest_id) => {
            info!(guest_id = guest_id.0, "guest record saved");
            Redirect::to(DASHBOARD_PATH).into_response()
        }
        Err(error) => {
            warn!(%error, "failed to save guest");
            html_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Tamu",
                "Guest could not be saved.",
            )
        }
    }
}

pub(crate) async fn delete_guest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(guest_id): Path<i64>,
) -> Response {
    if let Err(response) = require_admin(&state, &headers).await {
        return response;
    }

    match state.storage.delete_guest(GuestId(guest_id)).await {
        Ok(true) => {
            info!(guest_id, "guest record deleted");
            Redirect::to(DASHBOARD_PATH).into_response()
        }
        Ok(false) => {
            let notice = Notice::Error("Tamu tidak ditemukan.".to_string());
            render_dashboard(&state, StatusCode::NOT_FOUND, Some(notice)).await
        }
        Err(error) => {
            warn!(%error, "failed to delete guest");
            html_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Tamu",
                "Guest could not be deleted.",
            )
        }
    }
}

/// Invalidates the stored session, not just the cookie.
pub(crate) async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = admin_token(&headers) {
        if let Err(error) = state.storage.delete_admin_session(token).await {
            warn!(%error, "failed to delete admin session");
        }
        info!("admin session closed");
    }
    (
        [(header::SET_COOKIE, expired_cookie(ADMIN_SESSION_COOKIE))],
        Redirect::to("/"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::passwords_match;

    #[test]
    fn password_comparison_requires_exact_match() {
        assert!(passwords_match("rahasia", "rahasia"));
        assert!(!passwords_match("rahasia", "rahasiA"));
        assert!(!passwords_match("rahasia", "rahasia2"));
        assert!(!passwords_match("rahasia", ""));
    }
}

use axum::http::{header, HeaderMap, HeaderValue};

pub(crate) const GUEST_SESSION_COOKIE: &str = "invitation_session";
pub(crate) const ADMIN_SESSION_COOKIE: &str = "admin_session";

pub(crate) fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// `Set-Cookie` value for an HttpOnly, same-site session cookie.
pub(crate) fn session_cookie(name: &str, value: &str, max_age_secs: i64) -> HeaderValue {
    let cookie = format!(
        "{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age_secs.max(0)
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

pub(crate) fn expired_cookie(name: &str) -> HeaderValue {
    session_cookie(name, "", 0)
}

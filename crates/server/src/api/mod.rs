use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::Utc;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{RsvpReceipt, RsvpRequest, WishPayload},
};
use storage::{Storage, StoredRsvp};

pub const MAX_GUEST_NAME_CHARS: usize = 80;
pub const MAX_MESSAGE_CHARS: usize = 500;
pub const DEFAULT_WISHES_LIMIT: u32 = 50;

/// Destination of "Konfirmasi & Kirim Ucapan".
#[async_trait]
pub trait RsvpBackend: Send + Sync {
    async fn submit(&self, request: &RsvpRequest) -> Result<RsvpReceipt, ApiError>;
}

#[async_trait]
impl RsvpBackend for Storage {
    async fn submit(&self, request: &RsvpRequest) -> Result<RsvpReceipt, ApiError> {
        let accepted_at = Utc::now();
        let rsvp_id = self
            .insert_rsvp(
                &request.guest_name,
                request.attendance,
                &request.message,
                accepted_at,
            )
            .await
            .map_err(internal)?;
        Ok(RsvpReceipt {
            rsvp_id,
            accepted_at,
        })
    }
}

/// Trims and bounds a submission.
pub fn validate_rsvp(request: RsvpRequest) -> Result<RsvpRequest, ApiError> {
    let guest_name = request.guest_name.trim().to_string();
    if guest_name.is_empty() {
        return Err(ApiError::validation("guest name cannot be empty"));
    }
    if guest_name.chars().count() > MAX_GUEST_NAME_CHARS {
        return Err(ApiError::validation(format!(
            "guest name exceeds {MAX_GUEST_NAME_CHARS} characters"
        )));
    }

    let message = request.message.trim().to_string();
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::validation(format!(
            "message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }

    Ok(RsvpRequest {
        guest_name,
        attendance: request.attendance,
        message,
    })
}

/// Validates and forwards a submission; returns the wish to publish.
pub async fn submit_rsvp(
    backend: &dyn RsvpBackend,
    request: RsvpRequest,
) -> Result<WishPayload, ApiError> {
    let request = validate_rsvp(request)?;
    let receipt = backend.submit(&request).await?;
    Ok(WishPayload {
        rsvp_id: receipt.rsvp_id,
        guest_name: request.guest_name,
        attendance: request.attendance,
        message: request.message,
        sent_at: receipt.accepted_at,
    })
}

pub async fn list_wishes(
    storage: &Storage,
    limit: Option<u32>,
    before: Option<i64>,
) -> Result<Vec<WishPayload>, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_WISHES_LIMIT).clamp(1, 100);
    let rsvps = storage
        .list_rsvps(limit, before)
        .await
        .map_err(internal)?;
    Ok(rsvps.into_iter().map(wish_from_stored).collect())
}

pub fn wish_from_stored(rsvp: StoredRsvp) -> WishPayload {
    WishPayload {
        rsvp_id: rsvp.rsvp_id,
        guest_name: rsvp.guest_name,
        attendance: rsvp.attendance,
        message: rsvp.message,
        sent_at: rsvp.created_at,
    }
}

pub fn status_for(error: &ApiError) -> StatusCode {
    match error.code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;

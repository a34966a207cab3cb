use super::*;
use shared::domain::{Attendance, RsvpId};

fn request(name: &str, message: &str) -> RsvpRequest {
    RsvpRequest {
        guest_name: name.to_string(),
        attendance: Attendance::Attending,
        message: message.to_string(),
    }
}

struct RejectingBackend;

#[async_trait]
impl RsvpBackend for RejectingBackend {
    async fn submit(&self, _request: &RsvpRequest) -> Result<RsvpReceipt, ApiError> {
        Err(ApiError::internal("backend offline"))
    }
}

#[test]
fn validation_trims_and_bounds_fields() {
    let ok = validate_rsvp(request("  Ahmad ", "  Selamat menempuh hidup baru  ")).expect("valid");
    assert_eq!(ok.guest_name, "Ahmad");
    assert_eq!(ok.message, "Selamat menempuh hidup baru");

    let err = validate_rsvp(request("   ", "")).expect_err("blank name");
    assert_eq!(err.code, ErrorCode::Validation);

    let long_name = "a".repeat(MAX_GUEST_NAME_CHARS + 1);
    assert!(validate_rsvp(request(&long_name, "")).is_err());

    let long_message = "é".repeat(MAX_MESSAGE_CHARS + 1);
    assert!(validate_rsvp(request("Ahmad", &long_message)).is_err());
    assert!(validate_rsvp(request("Ahmad", &"é".repeat(MAX_MESSAGE_CHARS))).is_ok());
}

#[tokio::test]
async fn submitted_rsvp_is_listed_as_a_wish() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let wish = submit_rsvp(&storage, request("Ahmad", "Barakallah"))
        .await
        .expect("submit");
    assert_eq!(wish.rsvp_id, RsvpId(1));

    let wishes = list_wishes(&storage, None, None).await.expect("list");
    assert_eq!(wishes.len(), 1);
    assert_eq!(wishes[0].guest_name, "Ahmad");
    assert_eq!(wishes[0].message, "Barakallah");
    assert_eq!(wishes[0].attendance, Attendance::Attending);
}

#[tokio::test]
async fn invalid_rsvp_never_reaches_the_backend() {
    let err = submit_rsvp(&RejectingBackend, request("", "hi"))
        .await
        .expect_err("invalid");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backend_failure_surfaces_as_internal_error() {
    let err = submit_rsvp(&RejectingBackend, request("Ahmad", ""))
        .await
        .expect_err("backend down");
    assert_eq!(err.code, ErrorCode::Internal);
    assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn wishes_limit_is_clamped() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    for i in 0..3 {
        submit_rsvp(&storage, request(&format!("guest {i}"), ""))
            .await
            .expect("submit");
    }

    let one = list_wishes(&storage, Some(0), None).await.expect("list");
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].guest_name, "guest 2");

    let older = list_wishes(&storage, Some(500), Some(2)).await.expect("list");
    assert_eq!(older.len(), 1);
    assert_eq!(older[0].guest_name, "guest 0");
}

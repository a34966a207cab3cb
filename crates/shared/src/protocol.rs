use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{Attendance, RsvpId},
    error::ApiError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsvpRequest {
    pub guest_name: String,
    pub attendance: Attendance,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsvpReceipt {
    pub rsvp_id: RsvpId,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishPayload {
    pub rsvp_id: RsvpId,
    pub guest_name: String,
    pub attendance: Attendance,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RsvpSummary {
    pub attending: u64,
    pub not_attending: u64,
    pub undecided: u64,
}

impl RsvpSummary {
    pub fn total(&self) -> u64 {
        self.attending + self.not_attending + self.undecided
    }

    pub fn count_for(&self, attendance: Attendance) -> u64 {
        match attendance {
            Attendance::Attending => self.attending,
            Attendance::NotAttending => self.not_attending,
            Attendance::Undecided => self.undecided,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    WishReceived { wish: WishPayload },
    /// The subscriber fell behind; clients should refetch `/api/wishes`.
    Error(ApiError),
}

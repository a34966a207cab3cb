use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(GuestId);
id_newtype!(RsvpId);

/// Opaque token identifying an authenticated admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminToken(pub Uuid);

impl AdminToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AdminToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attendance {
    Attending,
    NotAttending,
    Undecided,
}

impl Attendance {
    pub const ALL: [Attendance; 3] = [
        Attendance::Attending,
        Attendance::NotAttending,
        Attendance::Undecided,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Attendance::Attending => "attending",
            Attendance::NotAttending => "not_attending",
            Attendance::Undecided => "undecided",
        }
    }

    /// Label shown to guests on the RSVP form.
    pub fn label(self) -> &'static str {
        match self {
            Attendance::Attending => "Hadir",
            Attendance::NotAttending => "Tidak Hadir",
            Attendance::Undecided => "Masih Ragu",
        }
    }
}

impl FromStr for Attendance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attendance::ALL
            .into_iter()
            .find(|attendance| attendance.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown attendance '{s}'"))
    }
}

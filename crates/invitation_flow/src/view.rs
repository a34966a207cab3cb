use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::{Block, Entrance, EntranceCue};

pub const DEFAULT_GUEST_NAME: &str = "NAMA TAMU";
pub const DEFAULT_GROOM_NAME: &str = "Wira";
pub const DEFAULT_BRIDE_NAME: &str = "Sofi";
pub const DEFAULT_DATE_LABEL: &str = "26 September 2025";

pub const QUOTE_TEXT: &str = "Dan di antara tanda-tanda kekuasaan-Nya ialah Dia menciptakan \
untukmu pasangan hidup dari jenismu sendiri, supaya kamu merasa tenteram kepadanya, dan \
dijadikan-Nya di antaramu rasa kasih dan sayang.";
pub const QUOTE_SOURCE: &str = "QS. Ar-Rum: 21";

const TITLE_ENTRANCES: &[EntranceCue] = &[
    EntranceCue {
        block: Block::DateOrnament,
        entrance: Entrance::FadeDown,
    },
    EntranceCue {
        block: Block::Title,
        entrance: Entrance::FadeUp,
    },
];

/// One full-screen presentation unit, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Intro,
    Opening,
    Quotes,
    Rsvp,
}

impl View {
    pub const SEQUENCE: [View; 4] = [View::Intro, View::Opening, View::Quotes, View::Rsvp];

    pub fn path(self) -> &'static str {
        match self {
            View::Intro => "/",
            View::Opening => "/opening",
            View::Quotes => "/quotes",
            View::Rsvp => "/rsvp",
        }
    }

    pub fn from_path(path: &str) -> Option<View> {
        let path = path.split('?').next().unwrap_or_default();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        View::SEQUENCE.into_iter().find(|view| view.path() == path)
    }

    pub fn position(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<View> {
        View::SEQUENCE.get(self.position() + 1).copied()
    }

    /// Entrance animations played when this view is mounted.
    pub fn entrances(self) -> &'static [EntranceCue] {
        match self {
            View::Intro | View::Opening => TITLE_ENTRANCES,
            View::Quotes | View::Rsvp => &[],
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Intro => "intro",
            View::Opening => "opening",
            View::Quotes => "quotes",
            View::Rsvp => "rsvp",
        };
        f.write_str(name)
    }
}

/// Name printed on the invitation. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestName(String);

impl GuestName {
    /// Falls back to [`DEFAULT_GUEST_NAME`] for missing or blank input.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => Self(name.to_string()),
            None => Self::placeholder(),
        }
    }

    pub fn placeholder() -> Self {
        Self(DEFAULT_GUEST_NAME.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == DEFAULT_GUEST_NAME
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GuestName {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for GuestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub groom: String,
    pub bride: String,
    pub date_label: String,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            groom: DEFAULT_GROOM_NAME.into(),
            bride: DEFAULT_BRIDE_NAME.into(),
            date_label: DEFAULT_DATE_LABEL.into(),
        }
    }
}

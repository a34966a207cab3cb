//! Invite codes carried in per-guest invitation links.
//!
//! A code is the URL-safe, unpadded base64 encoding of `guest:<id>`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use url::Url;

use crate::domain::GuestId;

const INVITE_PREFIX: &str = "guest:";

pub fn invite_code_for(guest_id: GuestId) -> String {
    URL_SAFE_NO_PAD.encode(format!("{INVITE_PREFIX}{}", guest_id.0).as_bytes())
}

pub fn parse_invite_code(code: &str) -> Option<GuestId> {
    let decoded = URL_SAFE_NO_PAD.decode(code.trim().as_bytes()).ok()?;
    let decoded_text = String::from_utf8(decoded).ok()?;
    decoded_text
        .strip_prefix(INVITE_PREFIX)
        .and_then(|id| id.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .map(GuestId)
}

/// The intro page of `public_url` addressed to one guest record.
pub fn invitation_link(public_url: &Url, guest_id: GuestId) -> Url {
    let mut link = public_url.clone();
    link.set_query(None);
    link.set_fragment(None);
    link.query_pairs_mut()
        .append_pair("code", &invite_code_for(guest_id));
    link
}

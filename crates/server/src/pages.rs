//! Server-rendered HTML.

use std::fmt::Write as _;

use invitation_flow::{
    Action, Block, Entrance, Frame, View, DEFAULT_GUEST_NAME, QUOTE_SOURCE, QUOTE_TEXT,
};
use shared::{
    domain::Attendance,
    protocol::{RsvpSummary, WishPayload},
};

const STYLE: &str = r#"
body { margin: 0; font-family: Georgia, serif; background: #f7f1e8; color: #4a3b2a; text-align: center; }
.view { min-height: 100vh; display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 2rem; box-sizing: border-box; }
.date-ornament img { max-width: 180px; }
.date { letter-spacing: .2em; text-transform: uppercase; }
h1 { font-size: 2.6rem; font-weight: normal; margin: .4rem 0; }
.guest-name { font-size: 1.4rem; font-weight: bold; }
.notice { padding: .6rem 1rem; border-radius: 6px; }
.notice.success { background: #e3f1df; } .notice.error { background: #f6dcdc; }
button, .next { background: #8a6d46; color: #fff; border: 0; border-radius: 999px; padding: .7rem 1.6rem; text-decoration: none; transition: transform .2s ease; cursor: pointer; }
button:hover, .next:hover { transform: scale(1.04); }
form.rsvp { display: grid; gap: .6rem; width: min(420px, 100%); }
table { border-collapse: collapse; margin: 1rem auto; } td, th { padding: .3rem .8rem; border-bottom: 1px solid #d9ccb8; }
.animate { animation-iteration-count: 1; animation-fill-mode: both; animation-timing-function: ease-out; }
.fade-down { animation-name: fade-down; } .fade-up { animation-name: fade-up; }
@keyframes fade-down { from { opacity: 0; transform: translateY(-24px); } to { opacity: 1; transform: none; } }
@keyframes fade-up { from { opacity: 0; transform: translateY(24px); } to { opacity: 1; transform: none; } }
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    Success(String),
    Error(String),
}

pub(crate) struct GuestRow {
    pub(crate) guest_id: i64,
    pub(crate) name: String,
    pub(crate) link: String,
}

/// RSVP input echoed back into the form after a rejected submission.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RsvpDraft<'a> {
    pub(crate) guest_name: &'a str,
    pub(crate) attendance: &'a str,
    pub(crate) message: &'a str,
}

pub(crate) struct Dashboard {
    pub(crate) summary: RsvpSummary,
    pub(crate) wishes: Vec<WishPayload>,
    pub(crate) guests: Vec<GuestRow>,
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<link rel=\"stylesheet\" href=\"/assets/invitation.css\">\n\
         <style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Class and style attributes for a block; empty unless its entrance plays on
/// this render.
fn entrance_attrs(frame: &Frame, block: Block) -> String {
    let Some(cue) = frame.entrances.iter().find(|cue| cue.block == block) else {
        return String::new();
    };
    let class = match cue.entrance {
        Entrance::FadeDown => "fade-down",
        Entrance::FadeUp => "fade-up",
    };
    format!(
        " animate {class}\" style=\"animation-duration: {}ms",
        frame.animation_duration_ms
    )
}

fn title_blocks(frame: &Frame) -> String {
    format!(
        "<div class=\"date-ornament{date_attrs}\">\n\
         <img src=\"/assets/ornament.png\" alt=\"\">\n\
         <p class=\"date\">{date}</p>\n</div>\n\
         <div class=\"title{title_attrs}\">\n\
         <p>The Wedding of</p>\n<h1>{groom} &amp; {bride}</h1>\n</div>\n",
        date_attrs = entrance_attrs(frame, Block::DateOrnament),
        title_attrs = entrance_attrs(frame, Block::Title),
        date = escape_html(&frame.date_label),
        groom = escape_html(&frame.groom),
        bride = escape_html(&frame.bride),
    )
}

fn notice_html(notice: Option<&Notice>) -> String {
    match notice {
        Some(Notice::Success(text)) => {
            format!("<p class=\"notice success\">{}</p>\n", escape_html(text))
        }
        Some(Notice::Error(text)) => format!(
            "<p class=\"notice error\" role=\"alert\">{}</p>\n",
            escape_html(text)
        ),
        None => String::new(),
    }
}

fn rsvp_form(frame: &Frame, draft: Option<&RsvpDraft<'_>>) -> String {
    let prefill = match draft {
        Some(draft) => escape_html(draft.guest_name),
        None if frame.guest_name == DEFAULT_GUEST_NAME => String::new(),
        None => escape_html(&frame.guest_name),
    };
    let chosen = draft.map(|draft| draft.attendance);
    let mut options = String::new();
    for attendance in Attendance::ALL {
        let selected = if chosen == Some(attendance.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            options,
            "<option value=\"{}\"{selected}>{}</option>",
            attendance.as_str(),
            attendance.label()
        );
    }
    format!(
        "<form class=\"rsvp\" method=\"post\" action=\"{action}\">\n\
         <input name=\"guest_name\" placeholder=\"Nama\" maxlength=\"80\" required value=\"{prefill}\">\n\
         <select name=\"attendance\">\n{options}</select>\n\
         <textarea name=\"message\" maxlength=\"500\" placeholder=\"Ucapan &amp; doa\">{message}</textarea>\n\
         <button type=\"submit\">{label}</button>\n</form>\n",
        action = View::Rsvp.path(),
        message = escape_html(draft.map_or("", |draft| draft.message)),
        label = escape_html(Action::ConfirmAttendance.label()),
    )
}

fn actions_html(frame: &Frame, draft: Option<&RsvpDraft<'_>>) -> String {
    let mut html = String::new();
    for action in &frame.actions {
        match action {
            Action::OpenInvitation => {
                let _ = write!(
                    html,
                    "<form method=\"post\" action=\"/open\">\
                     <button type=\"submit\">{}</button></form>\n",
                    escape_html(action.label())
                );
            }
            Action::ConfirmAttendance => html.push_str(&rsvp_form(frame, draft)),
        }
    }
    html
}

pub(crate) fn invitation_page(
    frame: &Frame,
    notice: Option<&Notice>,
    draft: Option<&RsvpDraft<'_>>,
) -> String {
    let mut body = format!("<section class=\"view view-{}\">\n", frame.view);
    match frame.view {
        View::Intro => {
            body.push_str(&title_blocks(frame));
            let _ = write!(
                body,
                "<div class=\"guest\">\n<p>Kepada Yth. Bapak/Ibu/Saudara/i</p>\n\
                 <p class=\"guest-name\">{}</p>\n</div>\n",
                escape_html(&frame.guest_name)
            );
        }
        View::Opening => body.push_str(&title_blocks(frame)),
        View::Quotes => {
            let _ = write!(
                body,
                "<blockquote>\n<p>{}</p>\n<footer>{}</footer>\n</blockquote>\n",
                escape_html(QUOTE_TEXT),
                escape_html(QUOTE_SOURCE)
            );
        }
        View::Rsvp => {
            let _ = write!(
                body,
                "<h2>Konfirmasi Kehadiran</h2>\n<p>{} &amp; {}</p>\n",
                escape_html(&frame.groom),
                escape_html(&frame.bride)
            );
        }
    }
    body.push_str(&notice_html(notice));
    body.push_str(&actions_html(frame, draft));
    if frame.view != View::Intro {
        if let Some(next) = frame.view.next() {
            let _ = writeln!(
                body,
                "<a class=\"next\" href=\"{}\">Lanjut</a>",
                next.path()
            );
        }
    }
    body.push_str("</section>");

    let title = format!("The Wedding of {} & {}", frame.groom, frame.bride);
    document(&title, &body)
}

pub(crate) fn message_page(title: &str, message: &str) -> String {
    let body = format!(
        "<section class=\"view\">\n<h2>{}</h2>\n<p>{}</p>\n<a class=\"next\" href=\"/\">Kembali</a>\n</section>",
        escape_html(title),
        escape_html(message)
    );
    document(title, &body)
}

pub(crate) fn admin_login_page(error: Option<&str>) -> String {
    let notice = error.map(|text| Notice::Error(text.to_string()));
    let body = format!(
        "<section class=\"view\">\n<h2>Admin</h2>\n{}\
         <form class=\"rsvp\" method=\"post\" action=\"/admin/login\">\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
         <button type=\"submit\">Masuk</button>\n</form>\n</section>",
        notice_html(notice.as_ref())
    );
    document("Admin", &body)
}

pub(crate) fn admin_dashboard_page(dashboard: &Dashboard, notice: Option<&Notice>) -> String {
    let mut body = String::from("<section class=\"view\">\n<h2>Dashboard</h2>\n");
    body.push_str(&notice_html(notice));

    body.push_str("<table>\n<tr><th>Kehadiran</th><th>Jumlah</th></tr>\n");
    for attendance in Attendance::ALL {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td></tr>",
            attendance.label(),
            dashboard.summary.count_for(attendance)
        );
    }
    let _ = writeln!(
        body,
        "<tr><th>Total</th><th>{}</th></tr>\n</table>",
        dashboard.summary.total()
    );

    body.push_str("<h3>Ucapan</h3>\n<table>\n");
    for wish in &dashboard.wishes {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&wish.guest_name),
            wish.attendance.label(),
            escape_html(&wish.message),
            wish.sent_at.format("%Y-%m-%d %H:%M")
        );
    }
    body.push_str("</table>\n");

    body.push_str("<h3>Tamu</h3>\n<table>\n");
    for guest in &dashboard.guests {
        let _ = writeln!(
            body,
            "<tr><td>{name}</td><td><a href=\"{link}\">{link}</a></td>\
             <td><form method=\"post\" action=\"/admin/guests/{id}/delete\">\
             <button type=\"submit\">Hapus</button></form></td></tr>",
            name = escape_html(&guest.name),
            link = escape_html(&guest.link),
            id = guest.guest_id,
        );
    }
    body.push_str(
        "</table>\n<form class=\"rsvp\" method=\"post\" action=\"/admin/guests\">\n\
         <input name=\"name\" placeholder=\"Nama tamu\" maxlength=\"80\" required>\n\
         <button type=\"submit\">Tambah Tamu</button>\n</form>\n\
         <form method=\"post\" action=\"/admin/logout\"><button type=\"submit\">Logout</button></form>\n\
         </section>",
    );

    document("Admin Dashboard", &body)
}

#[cfg(test)]
#[path = "tests/pages_tests.rs"]
mod tests;

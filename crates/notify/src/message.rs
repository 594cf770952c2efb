//! Rendering of the notification mail body.

use crate::batch::NotificationBatch;
use std::fmt::Write;
use time::format_description::well_known::Rfc3339;

/// Subject line of every notification.
pub const SUBJECT: &str = "New File(s) Uploaded";

const HTML_HEAD: &str = concat!(
    "<!DOCTYPE html>",
    "<html lang=\"en\">",
    "<head>",
    "<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">",
    "<meta name=\"viewport\" content=\"width=device-width\">",
    "<title>New File(s) Uploaded</title>",
    "<style>",
    "body{font-family:Segoe UI,Roboto,'Helvetica Neue',Arial,sans-serif;max-width:640px;margin-left:auto;margin-right:auto}",
    "ul{padding:0 0.5em;margin-top:0}",
    "li{margin-bottom:15px;margin-left:17px}",
    "p+ul{margin-top:0}",
    ".content{padding:0.5em}",
    "header{background:#14213D}",
    "header h1{text-align:center;color:rgba(255,255,255,0.85);margin:0.4em 0;font-weight:500}",
    "footer{color:#666;font-size:12px;padding:0.5em}",
    "</style>",
    "</head>",
    "<body>",
    "<header><h1>Secure File Exchange</h1></header>",
    "<div class=\"content\">",
    "<p>New files have been uploaded to your exchange.</p>",
);

fn drained_at(batch: &NotificationBatch) -> String {
    batch
        .drained_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| batch.drained_at.to_string())
}

/// HTML body: one paragraph and list per session.
pub fn render_html(batch: &NotificationBatch) -> String {
    let mut body = String::from(HTML_HEAD);

    for group in &batch.sessions {
        let _ = write!(
            body,
            "<p>The new files in folder '{}' are:</p><ul>",
            escape_html(group.session.as_str())
        );
        for file in &group.files {
            let _ = write!(body, "<li>{}</li>", escape_html(file));
        }
        body.push_str("</ul>");
    }

    let _ = write!(
        body,
        "</div><footer>Collected at {}</footer></body></html>",
        drained_at(batch)
    );
    body
}

/// Plain-text alternative of [`render_html`].
pub fn render_text(batch: &NotificationBatch) -> String {
    let mut body = String::from("New files have been uploaded to your exchange.\n");

    for group in &batch.sessions {
        let _ = write!(body, "\nThe new files in folder '{}' are:\n", group.session);
        for file in &group.files {
            let _ = writeln!(body, "  - {file}");
        }
    }

    let _ = write!(body, "\nCollected at {}\n", drained_at(batch));
    body
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

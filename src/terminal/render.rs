use std::io::{self, Write};

use serde::Serialize;

use crate::domain::email::{MessageDetail, MessageSummary};
use crate::domain::page::PageWindow;

const SENDER_COLS: usize = 28;
const SUBJECT_COLS: usize = 60;

#[derive(Serialize)]
struct Listing<'a> {
    messages: &'a [MessageSummary],
    page: &'a PageWindow,
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn write_listing<W: Write>(
    out: &mut W,
    items: &[MessageSummary],
    window: &PageWindow,
) -> io::Result<()> {
    if items.is_empty() {
        writeln!(out, "(no messages on this page)")?;
    }
    for m in items {
        writeln!(
            out,
            "{:>6}  {:<16}  {:<w_from$}  {}",
            m.id,
            m.display_date,
            clip(&m.sender, SENDER_COLS),
            clip(&m.subject, SUBJECT_COLS),
            w_from = SENDER_COLS,
        )?;
    }
    writeln!(
        out,
        "page {}/{} ({} messages)",
        window.page_number, window.total_pages, window.total_items
    )
}

pub fn write_listing_json<W: Write>(
    out: &mut W,
    items: &[MessageSummary],
    window: &PageWindow,
) -> io::Result<()> {
    serde_json::to_writer_pretty(
        &mut *out,
        &Listing {
            messages: items,
            page: window,
        },
    )?;
    writeln!(out)
}

pub fn write_message<W: Write>(out: &mut W, msg: &MessageDetail, width: usize) -> io::Result<()> {
    writeln!(out, "From:    {}", msg.sender)?;
    writeln!(out, "Date:    {}", msg.display_date)?;
    writeln!(out, "Subject: {}", msg.subject)?;
    writeln!(out)?;
    if msg.html {
        writeln!(out, "{}", html_to_text(&msg.body, width))
    } else {
        writeln!(out, "{}", msg.body.trim_end())
    }
}

pub fn write_message_json<W: Write>(out: &mut W, msg: &MessageDetail) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, msg)?;
    writeln!(out)
}

fn html_to_text(html: &str, width: usize) -> String {
    match html2text::from_read(html.as_bytes(), width) {
        Ok(text) => text.trim_end().to_string(),
        Err(e) => {
            log::warn!("cannot render HTML body, showing source: {e}");
            html.to_string()
        }
    }
}

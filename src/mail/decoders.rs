use mailparse::{DispositionType, ParsedMail};

/// Decodes a header value that may contain RFC 2047 encoded-words.
///
/// Never fails. Bytes that are not valid UTF-8 are replaced with U+FFFD before
/// encoded-words are expanded.
pub fn decode_header_field(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);

    // mailparse expects a full "Key: value" header line
    let mut line = b"X: ".to_vec();
    line.extend_from_slice(text.as_bytes());
    line.extend_from_slice(b"\r\n");

    match mailparse::parse_header(&line) {
        Ok((h, _idx)) => h.get_value(),
        Err(e) => {
            log::debug!("header decode failed, using raw value: {e}");
            text.into_owned()
        }
    }
}

/// Body chosen for display and whether it is HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedBody {
    pub text: String,
    pub html: bool,
}

/// Picks the body to display.
///
/// Multi-part messages are walked depth-first, skipping attachments: the first
/// `text/html` part wins, otherwise the first `text/plain` part. Returns an
/// empty string when neither exists.
pub fn select_body(msg: &ParsedMail) -> String {
    select_body_part(msg).text
}

pub fn select_body_part(msg: &ParsedMail) -> SelectedBody {
    if msg.subparts.is_empty() {
        return SelectedBody {
            text: part_text(msg),
            html: is_html(msg),
        };
    }

    let mut plain: Option<&ParsedMail> = None;
    let mut stack = vec![msg];
    while let Some(part) = stack.pop() {
        // push in reverse so parts come off the stack in document order
        stack.extend(part.subparts.iter().rev());

        if is_attachment(part) {
            continue;
        }
        if is_html(part) {
            return SelectedBody {
                text: part_text(part),
                html: true,
            };
        }
        if plain.is_none() && part.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
            plain = Some(part);
        }
    }

    SelectedBody {
        text: plain.map(part_text).unwrap_or_default(),
        html: false,
    }
}

fn is_html(part: &ParsedMail) -> bool {
    part.ctype.mimetype.eq_ignore_ascii_case("text/html")
}

fn is_attachment(part: &ParsedMail) -> bool {
    part.get_content_disposition().disposition == DispositionType::Attachment
}

/// Transfer-decodes a part and converts it using its declared charset.
///
/// Parts without a charset parameter are read as UTF-8. mailparse already
/// falls back to lossy UTF-8 for unknown charsets; binary parts it refuses are
/// read raw.
fn part_text(part: &ParsedMail) -> String {
    if !part.ctype.params.contains_key("charset") {
        return match part.get_body_raw() {
            Ok(raw) => String::from_utf8_lossy(&raw).into_owned(),
            Err(e) => {
                log::warn!("cannot decode {} body: {e}", part.ctype.mimetype);
                String::new()
            }
        };
    }
    match part.get_body() {
        Ok(body) => body,
        Err(e) => {
            log::warn!("cannot decode {} body, using raw bytes: {e}", part.ctype.mimetype);
            match part.get_body_raw() {
                Ok(raw) => String::from_utf8_lossy(&raw).into_owned(),
                Err(_) => String::new(),
            }
        }
    }
}

use crate::ows::error::OwsError;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Extracts the messages of an OWS `ExceptionReport` (or a WMS-style
/// `ServiceExceptionReport`). Returns `None` when the document root is anything else.
pub(crate) fn exception_message(body: &str) -> Option<String> {
    let trimmed = body.trim_start();
    if !trimmed.starts_with('<') || !trimmed.contains("ExceptionReport") {
        return None;
    }
    match collect_exception_texts(trimmed) {
        Ok(None) => None,
        Ok(Some(messages)) if !messages.is_empty() => Some(messages.join("; ")),
        // Unreadable or empty report, fall back to the head of the document
        _ => Some(trimmed.lines().take(10).collect::<Vec<_>>().join("\n")),
    }
}

fn is_report(local_name: &[u8]) -> bool {
    local_name == b"ExceptionReport" || local_name == b"ServiceExceptionReport"
}

fn collect_exception_texts(xml: &str) -> Result<Option<Vec<String>>, OwsError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut messages = Vec::new();
    let mut seen_root = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if !seen_root => {
                if !is_report(e.local_name().as_ref()) {
                    return Ok(None);
                }
                seen_root = true;
            }
            Event::Empty(ref e) if !seen_root => {
                return Ok(is_report(e.local_name().as_ref()).then(Vec::new));
            }
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"ExceptionText" | b"ServiceException" => {
                    let text = reader.read_text(e.name())?;
                    let text = unescape_text(&text)?;
                    if !text.is_empty() {
                        messages.push(text);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(Some(messages))
}

pub(crate) fn unescape_text(text: &str) -> Result<String, OwsError> {
    unescape(text.trim())
        .map(|text| text.into_owned())
        .map_err(|e| OwsError::XmlParse(e.into()))
}

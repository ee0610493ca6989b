use crate::ows::error::OwsError;
use crate::ows::exception::unescape_text;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Lists the `FeatureType/Name` entries advertised in a WFS capabilities document.
pub(crate) fn feature_type_names(xml: &str) -> Result<Vec<String>, OwsError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut names = Vec::new();
    let mut in_feature_type = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"FeatureType" => in_feature_type = true,
                b"Name" if in_feature_type => {
                    let text = reader.read_text(e.name())?;
                    names.push(unescape_text(&text)?);
                }
                _ => {}
            },
            Event::End(ref e) if e.local_name().as_ref() == b"FeatureType" => {
                in_feature_type = false;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(names)
}

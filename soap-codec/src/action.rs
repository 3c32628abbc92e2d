//! SOAP action extraction

use quick_xml::events::Event;
use quick_xml::Reader;

/// Extract the action name from a SOAP request body.
///
/// The action is the local name of the first child element of the SOAP
/// `Body`, with any namespace prefix stripped. Returns `None` for
/// malformed XML, an empty body, or a document without a body.
pub fn extract_action(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut in_body = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local_name = e.local_name();
                let name = String::from_utf8_lossy(local_name.as_ref()).into_owned();

                if in_body {
                    return Some(name);
                }

                if name == "Body" {
                    in_body = true;
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}

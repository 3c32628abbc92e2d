//! SOAP envelope rendering
//!
//! The envelope is serialized in exactly one place so every response
//! document carries the same XML declaration, namespace block and empty
//! header. Handlers never concatenate envelope markup themselves.

use quick_xml::escape::escape;

/// Escape a string for safe inclusion in XML content/attributes.
/// Converts &, <, >, ", ' to their XML entity equivalents.
pub fn xml_escape(s: &str) -> String {
    escape(s).to_string()
}

/// A complete SOAP 1.2 response document.
///
/// [`Envelope::success`] wraps an already-rendered, namespaced body
/// fragment; [`Envelope::fault`] builds a `Sender` fault from a subcode
/// QName and a reason string, escaping both.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    body: String,
}

impl Envelope {
    pub fn success(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn fault(subcode: &str, reason: &str) -> Self {
        let body = format!(
            r#"<soap-env:Fault>
            <soap-env:Code>
                <soap-env:Value>soap-env:Sender</soap-env:Value>
                <soap-env:Subcode>
                    <soap-env:Value>{}</soap-env:Value>
                </soap-env:Subcode>
            </soap-env:Code>
            <soap-env:Reason>
                <soap-env:Text xml:lang="en">{}</soap-env:Text>
            </soap-env:Reason>
        </soap-env:Fault>"#,
            xml_escape(subcode),
            xml_escape(reason)
        );
        Self { body }
    }

    /// Serialize the full document. Every namespace prefix a body fragment
    /// may use is declared here, including the addressing and notification
    /// prefixes the event responses rely on.
    pub fn render(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soap-env:Envelope xmlns:soap-env="http://www.w3.org/2003/05/soap-envelope"
                   xmlns:tds="http://www.onvif.org/ver10/device/wsdl"
                   xmlns:trt="http://www.onvif.org/ver10/media/wsdl"
                   xmlns:tptz="http://www.onvif.org/ver20/ptz/wsdl"
                   xmlns:timg="http://www.onvif.org/ver20/imaging/wsdl"
                   xmlns:tev="http://www.onvif.org/ver10/events/wsdl"
                   xmlns:tt="http://www.onvif.org/ver10/schema"
                   xmlns:tns1="http://www.onvif.org/ver10/topics"
                   xmlns:wsa="http://www.w3.org/2005/08/addressing"
                   xmlns:wsnt="http://docs.oasis-open.org/wsn/b-2"
                   xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd">
    <soap-env:Header/>
    <soap-env:Body>
        {}
    </soap-env:Body>
</soap-env:Envelope>"#,
            self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wraps_body_fragment() {
        let xml = Envelope::success("<tds:GetDeviceInformationResponse/>").render();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<soap-env:Header/>"));
        assert!(xml.contains("<tds:GetDeviceInformationResponse/>"));
        assert!(xml.contains(r#"xmlns:wsa="http://www.w3.org/2005/08/addressing""#));
        assert!(xml.contains(r#"xmlns:wsnt="http://docs.oasis-open.org/wsn/b-2""#));
        assert!(xml.contains(r#"xmlns:tns1="http://www.onvif.org/ver10/topics""#));
        assert!(xml.ends_with("</soap-env:Envelope>"));
    }

    #[test]
    fn fault_carries_sender_code_and_subcode() {
        let xml = Envelope::fault("wsse:FailedAuthentication", "An error occurred when verifying security").render();
        assert!(xml.contains("<soap-env:Value>soap-env:Sender</soap-env:Value>"));
        assert!(xml.contains("<soap-env:Value>wsse:FailedAuthentication</soap-env:Value>"));
        assert!(xml.contains(r#"<soap-env:Text xml:lang="en">An error occurred when verifying security</soap-env:Text>"#));
    }

    #[test]
    fn fault_escapes_reason() {
        let xml = Envelope::fault("Sender", "bad <thing> & worse").render();
        assert!(xml.contains("bad &lt;thing&gt; &amp; worse"));
        assert!(!xml.contains("bad <thing>"));
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(xml_escape("a&b<c>"), "a&amp;b&lt;c&gt;");
        assert_eq!(xml_escape("plain"), "plain");
    }
}

//! XML parsing for WS-Security UsernameToken
//!
//! Extracts authentication credentials from SOAP Security headers.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Parsed UsernameToken from a SOAP Security header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameToken {
    pub username: String,
    /// Base64-encoded password digest
    pub digest: String,
    /// Base64-encoded nonce
    pub nonce: String,
    /// Timestamp string, hashed verbatim
    pub created: String,
}

#[derive(Clone, Copy)]
enum TokenField {
    Username,
    Digest,
    Nonce,
    Created,
}

/// Pull the UsernameToken out of a SOAP envelope.
///
/// Field text is collected only while inside `Security/UsernameToken`, so
/// body elements that happen to share local names cannot leak in. Returns
/// `None` when the header, the token or any of its four fields is absent,
/// or when the document is not well-formed XML.
pub fn extract_token(xml: &str) -> Option<UsernameToken> {
    let mut reader = Reader::from_str(xml);

    let mut in_security = false;
    let mut in_token = false;
    let mut current: Option<TokenField> = None;

    let mut username: Option<String> = None;
    let mut digest: Option<String> = None;
    let mut nonce: Option<String> = None;
    let mut created: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local_name = e.local_name();
                match local_name.as_ref() {
                    b"Security" => in_security = true,
                    b"UsernameToken" if in_security => in_token = true,
                    b"Username" if in_token => current = Some(TokenField::Username),
                    b"Password" if in_token => current = Some(TokenField::Digest),
                    b"Nonce" if in_token => current = Some(TokenField::Nonce),
                    b"Created" if in_token => current = Some(TokenField::Created),
                    _ => {}
                }
            }

            Ok(Event::Text(t)) => {
                if let Some(field) = current {
                    let text = t.unescape().ok()?.trim().to_string();
                    match field {
                        TokenField::Username => username = Some(text),
                        TokenField::Digest => digest = Some(text),
                        TokenField::Nonce => nonce = Some(text),
                        TokenField::Created => created = Some(text),
                    }
                }
            }

            Ok(Event::End(e)) => {
                let local_name = e.local_name();
                match local_name.as_ref() {
                    b"Security" => in_security = false,
                    b"UsernameToken" => in_token = false,
                    _ => current = None,
                }
            }

            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }

    Some(UsernameToken {
        username: username?,
        digest: digest?,
        nonce: nonce?,
        created: created?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNED_REQUEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"
            xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd"
            xmlns:wsu="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
  <s:Header>
    <wsse:Security>
      <wsse:UsernameToken>
        <wsse:Username>admin</wsse:Username>
        <wsse:Password Type="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest">tuOSpGlFlIXsozq4HFNeeGeFLEI=</wsse:Password>
        <wsse:Nonce EncodingType="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary">LKqI6G/AikKCQrN0zqZFlg==</wsse:Nonce>
        <wsu:Created>2010-09-16T07:50:45.000Z</wsu:Created>
      </wsse:UsernameToken>
    </wsse:Security>
  </s:Header>
  <s:Body>
    <GetDeviceInformation/>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn parses_complete_token() {
        let token = extract_token(SIGNED_REQUEST).unwrap();
        assert_eq!(token.username, "admin");
        assert_eq!(token.digest, "tuOSpGlFlIXsozq4HFNeeGeFLEI=");
        assert_eq!(token.nonce, "LKqI6G/AikKCQrN0zqZFlg==");
        assert_eq!(token.created, "2010-09-16T07:50:45.000Z");
    }

    #[test]
    fn missing_header_yields_none() {
        let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
            <s:Body><GetDeviceInformation/></s:Body>
        </s:Envelope>"#;
        assert_eq!(extract_token(xml), None);
    }

    #[test]
    fn incomplete_token_yields_none() {
        let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
          <s:Header>
            <Security>
              <UsernameToken>
                <Password>digest</Password>
                <Nonce>bm9uY2U=</Nonce>
                <Created>2024-01-01T00:00:00Z</Created>
              </UsernameToken>
            </Security>
          </s:Header>
          <s:Body/>
        </s:Envelope>"#;
        assert_eq!(extract_token(xml), None);
    }

    #[test]
    fn token_fields_outside_security_are_ignored() {
        let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
          <s:Body>
            <Username>intruder</Username>
            <Password>digest</Password>
            <Nonce>bm9uY2U=</Nonce>
            <Created>2024-01-01T00:00:00Z</Created>
          </s:Body>
        </s:Envelope>"#;
        assert_eq!(extract_token(xml), None);
    }

    #[test]
    fn malformed_xml_yields_none() {
        assert_eq!(extract_token("<s:Envelope><Security><UsernameToken"), None);
        assert_eq!(extract_token(""), None);
    }
}

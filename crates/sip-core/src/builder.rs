use crate::types::method::Method;
use crate::types::uri::SipUri;

/// Builds a SIP URI string the way S2 describes: `build_sip_uri(user="u",
/// host="h", port=5061) => "sip:u@h:5061"`, omitting the port when it is
/// the scheme default (or unset).
pub fn build_sip_uri(user: Option<&str>, host: &str, port: Option<u16>) -> String {
    let mut uri = SipUri::new(host);
    if let Some(user) = user {
        uri = uri.with_user(user);
    }
    if let Some(port) = port {
        if port != uri.scheme.default_port() {
            uri = uri.with_port(port);
        }
    }
    uri.to_string()
}

pub fn parse_sip_uri(s: &str) -> Result<SipUri, crate::error::Error> {
    SipUri::parse(s)
}

/// Whether `method` is one of the methods the UA-server's OPTIONS handler
/// advertises in its `Allow` header.
pub fn is_supported_method(method: Method) -> bool {
    matches!(
        method,
        Method::Invite
            | Method::Ack
            | Method::Bye
            | Method::Cancel
            | Method::Register
            | Method::Options
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_sip_uri_matches_s2() {
        assert_eq!(build_sip_uri(Some("u"), "h", Some(5061)), "sip:u@h:5061");
        assert_eq!(build_sip_uri(None, "h", None), "sip:h");
    }
}

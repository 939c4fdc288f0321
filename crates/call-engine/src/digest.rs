use md5::{Digest, Md5};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// SIP Digest helper (§4.6): available for a future `401 WWW-Authenticate`
/// extension but not invoked from `Registrar::register` in this core —
/// REGISTER always succeeds unauthenticated.
fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn ha1(username: &str, realm: &str, password: &str) -> String {
    md5_hex(&format!("{username}:{realm}:{password}"))
}

pub fn ha2(method: &str, uri: &str) -> String {
    md5_hex(&format!("{method}:{uri}"))
}

/// `response = md5(HA1:nonce:HA2)`, or with qop, `md5(HA1:nonce:nc:cnonce:qop:HA2)`.
pub fn response(ha1: &str, nonce: &str, ha2: &str, qop: Option<(&str, &str)>) -> String {
    match qop {
        Some((nc, cnonce)) => md5_hex(&format!("{ha1}:{nonce}:{nc}:{cnonce}:auth:{ha2}")),
        None => md5_hex(&format!("{ha1}:{nonce}:{ha2}")),
    }
}

pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

pub fn www_authenticate_header(realm: &str, nonce: &str) -> String {
    format!("Digest realm=\"{realm}\", nonce=\"{nonce}\", algorithm=MD5")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_matches_reference_formula_without_qop() {
        let h1 = ha1("alice", "example.com", "secret");
        let h2 = ha2("REGISTER", "sip:example.com");
        let resp = response(&h1, "a-nonce", &h2, None);
        assert_eq!(resp.len(), 32);
        assert!(resp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn response_changes_with_qop_parameters() {
        let h1 = ha1("alice", "example.com", "secret");
        let h2 = ha2("REGISTER", "sip:example.com");
        let without_qop = response(&h1, "n", &h2, None);
        let with_qop = response(&h1, "n", &h2, Some(("00000001", "c0")));
        assert_ne!(without_qop, with_qop);
    }

    #[test]
    fn nonce_is_nonempty_and_alphanumeric() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

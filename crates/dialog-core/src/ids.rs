use rand::distributions::Alphanumeric;
use rand::Rng;

const TAG_LEN: usize = 10;
const CALL_ID_RANDOM_LEN: usize = 16;
pub const BRANCH_MAGIC_COOKIE: &str = "z9hG4bK";

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// A 10-character alphanumeric tag, unique within the UA by construction
/// (cryptographically strong randomness from `rand`'s default RNG).
pub fn generate_tag() -> String {
    random_alphanumeric(TAG_LEN)
}

/// A Via branch parameter: the RFC 3261 magic cookie followed by a random
/// suffix. The suffix embeds nothing meaningful beyond uniqueness.
pub fn generate_branch() -> String {
    format!("{BRANCH_MAGIC_COOKIE}{}", random_alphanumeric(16))
}

/// `<16-char random>-<ms-timestamp>@<local-host-label>`.
pub fn generate_call_id(host_label: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!("{}-{}@{}", random_alphanumeric(CALL_ID_RANDOM_LEN), millis, host_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_has_expected_length() {
        assert_eq!(generate_tag().len(), TAG_LEN);
    }

    #[test]
    fn branch_has_magic_cookie_prefix() {
        assert!(generate_branch().starts_with(BRANCH_MAGIC_COOKIE));
    }

    #[test]
    fn call_id_has_expected_shape() {
        let id = generate_call_id("host1");
        let (random_part, rest) = id.split_once('-').unwrap();
        assert_eq!(random_part.len(), CALL_ID_RANDOM_LEN);
        assert!(rest.ends_with("@host1"));
    }

    #[test]
    fn successive_ids_are_distinct() {
        assert_ne!(generate_tag(), generate_tag());
        assert_ne!(generate_call_id("h"), generate_call_id("h"));
    }
}

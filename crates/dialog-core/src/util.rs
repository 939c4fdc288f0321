/// Extracts the `tag=` parameter from a From/To header value, e.g.
/// `<sip:a@b>;tag=abc123` -> `Some("abc123")`.
pub fn extract_tag(header_value: &str) -> Option<String> {
    header_value
        .split(';')
        .skip(1)
        .find_map(|part| part.trim().strip_prefix("tag=").map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tag_param() {
        assert_eq!(extract_tag("<sip:a@b>;tag=abc123"), Some("abc123".to_string()));
        assert_eq!(extract_tag("<sip:a@b>"), None);
    }
}

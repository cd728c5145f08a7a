//! Registration expiration extraction from free-text WHOIS responses.
//!
//! WHOIS has no common schema, so this is a best-effort heuristic: a short
//! list of labels is tried in priority order and the first line carrying the
//! winning label provides the value. The value is returned exactly as the
//! registry wrote it; no date parsing or normalisation happens here.

/// Expiration labels, highest priority first.
///
/// A line such as `Registry Expiry Date: ...` also contains `Expiry Date:`,
/// so the first entry already covers most gTLD registries.
pub const EXPIRATION_PATTERNS: &[&str] = &["Expiry Date:", "Registry Expiry Date:", "Expires On:"];

/// Find the registration expiration in a raw WHOIS response.
///
/// The first pattern found anywhere in the text wins and later patterns are
/// not consulted. Within the winning pattern, the first line containing it
/// supplies everything after its first colon, trimmed. Lines whose remainder
/// is empty are passed over. Returns `None` when no pattern is present or the
/// winning pattern carries no value.
pub fn extract_expiration(raw: &str) -> Option<String> {
    EXPIRATION_PATTERNS
        .iter()
        .find(|pattern| raw.contains(**pattern))
        .and_then(|pattern| first_value_for(raw, pattern))
}

fn first_value_for(raw: &str, pattern: &str) -> Option<String> {
    raw.split('\n')
        .filter(|line| line.contains(pattern))
        .filter_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_expiry_date() {
        let raw = "Domain Name: EXAMPLE.COM\nRegistry Expiry Date: 2030-01-01T00:00:00Z\nRegistrar: Example\n";
        assert_eq!(
            extract_expiration(raw),
            Some("2030-01-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_priority_beats_position() {
        // "Expiry Date:" is matched on its own line even though a
        // lower-priority label appears earlier in the text
        let raw = "Expires On: 2031-05-05\nDomain: example.net\nExpiry Date: 2029-09-09\n";
        assert_eq!(extract_expiration(raw), Some("2029-09-09".to_string()));
    }

    #[test]
    fn test_expiry_date_wins_over_registry_expiry_date() {
        let raw = "Registry Expiry Date: 2030-01-01T00:00:00Z\nRegistrar Registration Expiration Date: 2030-01-02\nExpiry Date: 2035-06-30\n";
        // Both labels are present; the first line containing "Expiry Date:"
        // is the registry line, which is what the heuristic reports
        assert_eq!(
            extract_expiration(raw),
            Some("2030-01-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_expires_on() {
        let raw = "Domain Name: example.com\nExpires On: 12-Dec-2025\n";
        assert_eq!(extract_expiration(raw), Some("12-Dec-2025".to_string()));
    }

    #[test]
    fn test_no_pattern() {
        assert_eq!(extract_expiration("Domain Name: example.com\nStatus: active\n"), None);
        assert_eq!(extract_expiration(""), None);
    }

    #[test]
    fn test_first_matching_line_wins() {
        let raw = "Expiry Date: 2026-01-01\nExpiry Date: 2027-01-01\n";
        assert_eq!(extract_expiration(raw), Some("2026-01-01".to_string()));
    }

    #[test]
    fn test_everything_after_first_colon_is_kept() {
        let raw = "Expiry Date: 2030-01-01 12:30:00 UTC\n";
        assert_eq!(
            extract_expiration(raw),
            Some("2030-01-01 12:30:00 UTC".to_string())
        );
    }

    #[test]
    fn test_crlf_and_padding_trimmed() {
        let raw = "Domain: example.co\r\n   Expires On:     2027-02-03   \r\n";
        assert_eq!(extract_expiration(raw), Some("2027-02-03".to_string()));
    }

    #[test]
    fn test_empty_value_skipped() {
        let raw = "Expiry Date:\nExpiry Date: 2028-08-08\n";
        assert_eq!(extract_expiration(raw), Some("2028-08-08".to_string()));

        assert_eq!(extract_expiration("Expiry Date:\n"), None);
    }

    #[test]
    fn test_empty_winning_label_does_not_fall_through() {
        let raw = "Expiry Date:   \nExpires On: 2028-08-09\n";
        assert_eq!(extract_expiration(raw), None);
    }

    #[test]
    fn test_label_is_case_sensitive() {
        assert_eq!(extract_expiration("expiry date: 2030-01-01\n"), None);
    }

    #[test]
    fn test_repeatable() {
        let raw = "Registry Expiry Date: 2030-01-01T00:00:00Z\n";
        assert_eq!(extract_expiration(raw), extract_expiration(raw));
    }
}

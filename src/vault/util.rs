use chrono::{SecondsFormat, Utc};

/// Return the current UTC time as an ISO-8601 string.
///
/// All persisted timestamps use this format so that lexicographic order is
/// chronological order. This is the single, canonical implementation — **do
/// not** duplicate this helper in other modules.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Reduce `input` to a filesystem-safe file stem. Video and channel keys are
/// already URL-safe upstream; this keeps them intact while refusing path
/// separators and other surprises.
pub fn sanitize_file_stem(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_dash = false;
    for ch in input.chars() {
        let keep = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
        if keep {
            out.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "item".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{now_iso8601, sanitize_file_stem};

    #[test]
    fn sanitize_keeps_upstream_id_alphabet() {
        assert_eq!(sanitize_file_stem("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(sanitize_file_stem("a_b-c"), "a_b-c");
    }

    #[test]
    fn sanitize_rewrites_separators() {
        assert_eq!(sanitize_file_stem("../etc/passwd"), "etc-passwd");
        assert_eq!(sanitize_file_stem("///"), "item");
    }

    #[test]
    fn now_is_sortable_utc() {
        let now = now_iso8601();
        assert!(now.ends_with('Z'));
        assert_eq!(now.len(), "2026-01-01T00:00:00Z".len());
    }
}

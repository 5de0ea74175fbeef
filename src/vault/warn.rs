fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_ascii_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if ch.is_ascii_graphic() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WarnEvent<'a> {
    pub code: &'a str,
    pub stage: &'a str,
    pub channel: &'a str,
    pub video: &'a str,
    pub reason: &'a str,
    pub err: &'a str,
}

/// One structured warning line per recovered per-unit failure. Retry is always
/// the next scheduled invocation, so there is no retry field to report.
pub fn emit(event: WarnEvent) {
    eprintln!(
        "CHATVAULT_WARN code={} stage={} channel={} video={} reason={} err={}",
        sanitize_value(event.code),
        sanitize_value(event.stage),
        sanitize_value(event.channel),
        sanitize_value(event.video),
        sanitize_value(event.reason),
        sanitize_value(event.err),
    );
}

#[cfg(test)]
mod tests {
    use super::sanitize_value;

    #[test]
    fn sanitize_value_rewrites_whitespace() {
        assert_eq!(sanitize_value("a b\tc"), "a_b_c");
    }

    #[test]
    fn sanitize_value_falls_back_for_empty() {
        assert_eq!(sanitize_value("   "), "na");
    }
}

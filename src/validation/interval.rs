//! Duration literals such as `24h`, `30m`, `1h 30m` or `500ms`.

use std::time::Duration;

use crate::errors::{Error, Result};

/// Parse a duration literal with humantime's grammar.
pub fn parse_interval(literal: &str) -> Result<Duration> {
    humantime::parse_duration(literal.trim()).map_err(|e| Error::parse("duration", literal, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_parse_common_forms() {
        assert_eq!(parse_interval("24h").unwrap(), Duration::from_secs(24 * 3600));
        assert_eq!(parse_interval("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_interval("1h 30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_error_echoes_parser() {
        let err = parse_interval("5 fortnights").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("unknown time unit"));
        assert!(err.to_string().contains("'5 fortnights'"));
    }

    #[test]
    fn test_bare_number_rejected() {
        let err = parse_interval("30").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}

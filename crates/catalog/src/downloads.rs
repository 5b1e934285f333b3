//! Coarse parsing of download counters.
//!
//! Counters are display strings such as `"1.2K"`, `"3M"` or `"10,000+"`.
//! They are only ever used for sorting, so anything unreadable counts as 0.

/// Parses a download counter into an approximate number.
///
/// ```
/// use portal_catalog::parse_downloads;
///
/// assert_eq!(parse_downloads(Some("1.5K")), 1500);
/// assert_eq!(parse_downloads(Some("2M")), 2_000_000);
/// assert_eq!(parse_downloads(None), 0);
/// ```
pub fn parse_downloads(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '+')
        .collect();

    let (number, multiplier) = match cleaned.chars().last() {
        Some('k' | 'K') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('m' | 'M') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        Some('b' | 'B') => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    match number.parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => (n * multiplier).round() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes() {
        assert_eq!(parse_downloads(Some("1.5K")), 1500);
        assert_eq!(parse_downloads(Some("1.2k")), 1200);
        assert_eq!(parse_downloads(Some("2M")), 2_000_000);
        assert_eq!(parse_downloads(Some("3m")), 3_000_000);
        assert_eq!(parse_downloads(Some("1B")), 1_000_000_000);
    }

    #[test]
    fn plain_numbers() {
        assert_eq!(parse_downloads(Some("42")), 42);
        assert_eq!(parse_downloads(Some("10,000+")), 10_000);
        assert_eq!(parse_downloads(Some(" 7 ")), 7);
    }

    #[test]
    fn missing_or_garbage_is_zero() {
        assert_eq!(parse_downloads(None), 0);
        assert_eq!(parse_downloads(Some("")), 0);
        assert_eq!(parse_downloads(Some("K")), 0);
        assert_eq!(parse_downloads(Some("lots")), 0);
        assert_eq!(parse_downloads(Some("-5")), 0);
    }
}

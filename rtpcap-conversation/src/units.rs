//! Normalization of human readable byte counters such as `9,018kB`.

/// Suffixes used by the conversation table and their multipliers.
const UNITS: &[(&str, u64)] = &[
    ("bytes", 1),
    ("kB", 1_000),
    ("MB", 1_000_000),
    ("GB", 1_000_000_000),
    ("TB", 1_000_000_000_000),
];

/// parse_byte_count converts a counter like `6,311bytes` or `13MB` into a
/// byte count. A bare number is taken as bytes. Returns `None` for unknown
/// suffixes, empty numbers and overflow.
pub fn parse_byte_count(s: &str) -> Option<u64> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != ',')
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);

    let digits: String = number.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return None;
    }
    let value: u64 = digits.parse().ok()?;

    let multiplier = match suffix.trim() {
        "" => 1,
        suffix => UNITS.iter().find(|(unit, _)| *unit == suffix)?.1,
    };
    value.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte_count() {
        assert_eq!(parse_byte_count("0bytes"), Some(0));
        assert_eq!(parse_byte_count("868bytes"), Some(868));
        assert_eq!(parse_byte_count("6,311bytes"), Some(6311));
        assert_eq!(parse_byte_count("15kB"), Some(15_000));
        assert_eq!(parse_byte_count("9,018kB"), Some(9_018_000));
        assert_eq!(parse_byte_count("13MB"), Some(13_000_000));
        assert_eq!(parse_byte_count("2GB"), Some(2_000_000_000));
        assert_eq!(parse_byte_count("1TB"), Some(1_000_000_000_000));
        assert_eq!(parse_byte_count("1234"), Some(1234));
        assert_eq!(parse_byte_count(" 12 kB "), Some(12_000));
    }

    #[test]
    fn test_parse_byte_count_rejects() {
        assert_eq!(parse_byte_count(""), None);
        assert_eq!(parse_byte_count("kB"), None);
        assert_eq!(parse_byte_count("12KiB"), None);
        assert_eq!(parse_byte_count("99999999999999999999bytes"), None);
        assert_eq!(parse_byte_count("20000000TB"), None);
    }
}

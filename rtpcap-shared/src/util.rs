use crate::error::{Error, Result};

/// Separator between sequence numbers in a rendered frame sequence list.
pub const SEP: char = '|';

/// validate_separator rejects separators that would merge with the numbers
/// (digits, sign) or with the comma separated row the list is written into.
pub fn validate_separator(sep: char) -> Result<char> {
    if sep.is_ascii_digit() || matches!(sep, '-' | '+' | ',' | '"' | '\n' | '\r') {
        return Err(Error::InvalidSeparator(sep));
    }
    Ok(sep)
}

/// join_seq_list renders sequence numbers in arrival order, joined by `sep`.
pub fn join_seq_list(seqs: &[u16], sep: char) -> String {
    let mut out = String::with_capacity(seqs.len() * 6);
    for (i, seq) in seqs.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(&seq.to_string());
    }
    out
}

/// split_seq_list is the inverse of [`join_seq_list`]. An empty string is an
/// empty list.
pub fn split_seq_list(s: &str, sep: char) -> Result<Vec<u16>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }

    s.split(sep)
        .map(|token| {
            let value: i64 = token
                .trim()
                .parse()
                .map_err(|e| Error::InvalidSequenceToken(token.to_owned(), e))?;
            u16::try_from(value).map_err(|_| Error::InvalidSequenceNumber(value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_seq_list() {
        assert_eq!(
            join_seq_list(&[9017, 9018, 9019, 9020, 9021], SEP),
            "9017|9018|9019|9020|9021"
        );
        assert_eq!(join_seq_list(&[65535], SEP), "65535");
        assert_eq!(join_seq_list(&[], SEP), "");
        assert_eq!(join_seq_list(&[1, 2], ':'), "1:2");
    }

    #[test]
    fn test_split_seq_list_preserves_arrival_order() {
        let seqs = vec![65534, 65535, 0, 3, 1];
        let rendered = join_seq_list(&seqs, SEP);
        assert_eq!(split_seq_list(&rendered, SEP).unwrap(), seqs);
        assert!(split_seq_list("", SEP).unwrap().is_empty());
    }

    #[test]
    fn test_validate_separator() {
        for sep in [SEP, ':', ';', ' ', '/'] {
            assert_eq!(validate_separator(sep), Ok(sep));
        }
        for sep in ['0', '7', '-', '+', ',', '"', '\n'] {
            assert_eq!(validate_separator(sep), Err(Error::InvalidSeparator(sep)));
        }
    }

    #[test]
    fn test_split_seq_list_rejects_bad_tokens() {
        assert!(matches!(
            split_seq_list("1|x|3", SEP),
            Err(Error::InvalidSequenceToken(ref t, _)) if t == "x"
        ));
        assert_eq!(
            split_seq_list("1|65536", SEP),
            Err(Error::InvalidSequenceNumber(65536))
        );
        assert_eq!(
            split_seq_list("-2", SEP),
            Err(Error::InvalidSequenceNumber(-2))
        );
    }
}

//! Base-62 short key encoding.
//!
//! Short keys are the public face of a link identifier: the positional base-62
//! representation of [`Link::id`](crate::domain::entities::Link) over the
//! alphabet `0-9A-Za-z`, most significant digit first.

/// Digit alphabet; a symbol's value is its index.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: i64 = 62;

/// Errors produced while converting between keys and identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid key format: {0:?}")]
    InvalidKeyFormat(String),

    #[error("Invalid identifier: {0} is negative")]
    InvalidIdentifier(i64),

    #[error("Key {0:?} exceeds the supported identifier range")]
    IdentifierOverflow(String),
}

/// Decodes a short key into its identifier.
///
/// # Errors
///
/// Returns [`KeyError::InvalidKeyFormat`] if `key` is empty or contains a
/// character outside the alphabet, and [`KeyError::IdentifierOverflow`] if
/// the value does not fit in an `i64`.
///
/// # Examples
///
/// ```
/// use quicklink_redirect::domain::key_codec::decode;
///
/// assert_eq!(decode("21").unwrap(), 125);
/// assert!(decode("@@@").is_err());
/// ```
pub fn decode(key: &str) -> Result<i64, KeyError> {
    if key.is_empty() {
        return Err(KeyError::InvalidKeyFormat(String::new()));
    }

    key.bytes().try_fold(0i64, |acc, byte| {
        let digit = digit_value(byte).ok_or_else(|| KeyError::InvalidKeyFormat(key.to_string()))?;

        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| KeyError::IdentifierOverflow(key.to_string()))
    })
}

/// Encodes an identifier as its canonical short key.
///
/// The result never carries a leading `0` symbol, except for the key of
/// zero itself.
///
/// # Errors
///
/// Returns [`KeyError::InvalidIdentifier`] if `id` is negative.
///
/// # Examples
///
/// ```
/// use quicklink_redirect::domain::key_codec::encode;
///
/// assert_eq!(encode(125).unwrap(), "21");
/// assert_eq!(encode(0).unwrap(), "0");
/// ```
pub fn encode(id: i64) -> Result<String, KeyError> {
    if id < 0 {
        return Err(KeyError::InvalidIdentifier(id));
    }

    let mut remaining = id;
    let mut digits = Vec::with_capacity(11);

    loop {
        digits.push(ALPHABET[(remaining % BASE) as usize]);
        remaining /= BASE;
        if remaining == 0 {
            break;
        }
    }

    digits.reverse();
    Ok(digits.into_iter().map(char::from).collect())
}

fn digit_value(byte: u8) -> Option<i64> {
    let value = match byte {
        b'0'..=b'9' => byte - b'0',
        b'A'..=b'Z' => byte - b'A' + 10,
        b'a'..=b'z' => byte - b'a' + 36,
        _ => return None,
    };
    Some(i64::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode(0).unwrap(), "0");
        assert_eq!(encode(9).unwrap(), "9");
        assert_eq!(encode(10).unwrap(), "A");
        assert_eq!(encode(61).unwrap(), "z");
        assert_eq!(encode(62).unwrap(), "10");
        assert_eq!(encode(125).unwrap(), "21");
        assert_eq!(encode(3843).unwrap(), "zz");
    }

    #[test]
    fn test_decode_known_values() {
        assert_eq!(decode("0").unwrap(), 0);
        assert_eq!(decode("A").unwrap(), 10);
        assert_eq!(decode("a").unwrap(), 36);
        assert_eq!(decode("21").unwrap(), 125);
        assert_eq!(decode("zz").unwrap(), 3843);
    }

    #[test]
    fn test_decode_is_case_sensitive() {
        assert_ne!(decode("Zz").unwrap(), decode("zZ").unwrap());
        assert_eq!(decode("Zz").unwrap(), 2231);
    }

    #[test]
    fn test_decode_accepts_leading_zero_symbols() {
        assert_eq!(decode("0021").unwrap(), 125);
    }

    #[test]
    fn test_decode_empty_key() {
        assert!(matches!(decode(""), Err(KeyError::InvalidKeyFormat(_))));
    }

    #[test]
    fn test_decode_rejects_characters_outside_alphabet() {
        for key in ["@@@", "ab-c", "ab_c", "a b", "abc/", "é", "21\n", "+1"] {
            assert!(
                matches!(decode(key), Err(KeyError::InvalidKeyFormat(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_max_identifier() {
        assert_eq!(encode(i64::MAX).unwrap(), "AzL8n0Y58m7");
        assert_eq!(decode("AzL8n0Y58m7").unwrap(), i64::MAX);
    }

    #[test]
    fn test_decode_overflow() {
        assert!(matches!(
            decode("AzL8n0Y58m8"),
            Err(KeyError::IdentifierOverflow(_))
        ));
        assert!(matches!(
            decode("zzzzzzzzzzzz"),
            Err(KeyError::IdentifierOverflow(_))
        ));
    }

    #[test]
    fn test_encode_negative_identifier() {
        assert_eq!(encode(-1), Err(KeyError::InvalidIdentifier(-1)));
        assert!(encode(i64::MIN).is_err());
    }

    #[test]
    fn test_round_trip_samples() {
        let mut id: i64 = 1;
        while id < i64::MAX / 7 {
            for candidate in [id - 1, id, id + 1] {
                let key = encode(candidate).unwrap();
                assert_eq!(decode(&key).unwrap(), candidate);
            }
            id *= 7;
        }
    }

    #[test]
    fn test_encoding_is_canonical() {
        for id in [1, 61, 62, 63, 3843, 3844, 1_000_000, i64::MAX] {
            let key = encode(id).unwrap();
            assert!(!key.starts_with('0'), "{key} has a leading zero symbol");
            assert_eq!(encode(decode(&key).unwrap()).unwrap(), key);
        }
    }
}

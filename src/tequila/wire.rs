//! Tequila's flat `key=value` text format.
//!
//! Requests and responses are newline-delimited `key=value` pairs. Nothing is escaped: a value
//! containing a newline cannot be represented, which is what the server expects.

use std::collections::HashMap;

pub fn encode<K, V>(fields: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fields
        .iter()
        .map(|(key, value)| format!("{}={}\n", key.as_ref(), value.as_ref()))
        .collect()
}

/// Lines without `=` are dropped. The first `=` separates key from value, and the last
/// occurrence of a repeated key wins.
pub fn decode(text: &str) -> HashMap<String, String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_insertion_order() {
        let body = encode(&[
            ("client", "SATOSA TequilaBackend"),
            ("service", "my-app"),
            ("urlaccess", "https://broker/tequila/back-from-tequila"),
        ]);

        assert_eq!(
            body,
            "client=SATOSA TequilaBackend\nservice=my-app\nurlaccess=https://broker/tequila/back-from-tequila\n"
        );
    }

    #[test]
    fn test_encode_empty() {
        let fields: [(&str, &str); 0] = [];
        assert_eq!(encode(&fields), "");
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_decode_strips_carriage_returns() {
        let decoded = decode("a=1\nb=2\r\n");

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get("a").map(String::as_str), Some("1"));
        assert_eq!(decoded.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_decode_drops_garbage_lines() {
        let decoded = decode("garbage\nkey=value");

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("key").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_decode_splits_on_first_equal_sign() {
        let decoded = decode("require=group=admins|group=staff\n");
        assert_eq!(
            decoded.get("require").map(String::as_str),
            Some("group=admins|group=staff")
        );
    }

    #[test]
    fn test_decode_last_duplicate_wins() {
        let decoded = decode("key=first\nkey=second\n");
        assert_eq!(decoded.get("key").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_round_trip() {
        let fields = vec![
            ("name".to_string(), "Jane".to_string()),
            ("email".to_string(), "jane@example.com".to_string()),
            ("empty".to_string(), String::new()),
            ("with_equal".to_string(), "a=b".to_string()),
        ];

        let decoded = decode(&encode(&fields));
        let expected: HashMap<String, String> = fields.into_iter().collect();
        assert_eq!(decoded, expected);
    }
}

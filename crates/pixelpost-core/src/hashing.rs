//! One-way hashing and match-key normalization
//!
//! Identity fields leave the process only as lowercase hex SHA-256 digests.
//! Each field is normalized first so that server-side digests agree with the
//! digests the browser pixel produces for the same user.

use sha2::{Digest, Sha256};

/// SHA-256 over the UTF-8 bytes of `value`, as 64 lowercase hex characters.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let hash = hasher.finalize();
    format!("{:x}", hash)
}

/// Hashes an email address. Matched case-insensitively, surrounding
/// whitespace ignored.
pub fn hash_email(email: &str) -> String {
    sha256_hex(&email.trim().to_lowercase())
}

/// Hashes a phone number. Only digits participate in matching.
pub fn hash_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    sha256_hex(&digits)
}

/// Hashes a name or locality field (first/last name, city, state):
/// lowercased and trimmed.
pub fn hash_name(value: &str) -> String {
    sha256_hex(&value.trim().to_lowercase())
}

/// Hashes a country code. Uppercased, not trimmed.
pub fn hash_country(country: &str) -> String {
    sha256_hex(&country.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_64_lowercase_hex_chars() {
        let digest = sha256_hex("anything");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(sha256_hex("value"), sha256_hex("value"));
        assert_ne!(sha256_hex("value"), sha256_hex("other"));
    }

    #[test]
    fn test_empty_string_hashes() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_email_normalized_before_hashing() {
        // sha256("test@example.com")
        let expected = "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b";
        assert_eq!(hash_email("test@example.com"), expected);
        assert_eq!(hash_email("Test@Example.COM"), expected);
        assert_eq!(hash_email("  test@example.com  "), expected);
    }

    #[test]
    fn test_phone_stripped_to_digits() {
        // sha256("12345678901")
        let expected = "254aa248acb47dd654ca3ea53f48c2c26d641d23d7e2e93a1ec56258df7674c4";
        assert_eq!(hash_phone("+1 (234) 567-8901"), expected);
        assert_eq!(hash_phone("12345678901"), expected);
    }

    #[test]
    fn test_names_lowercased() {
        // sha256("john") / sha256("doe")
        assert_eq!(
            hash_name("JOHN"),
            "96d9632f363564cc3032521409cf22a852f2032eec099ed5967c0d000cec607a"
        );
        assert_eq!(
            hash_name("DOE"),
            "799ef92a11af918e3fb741df42934f3b568ed2d93ac1df74f1b8d41a27932a6f"
        );
        assert_eq!(hash_name("john"), hash_name(" John "));
    }

    #[test]
    fn test_country_uppercased() {
        assert_eq!(hash_country("us"), hash_country("US"));
        assert_eq!(hash_country("US"), sha256_hex("US"));
    }
}

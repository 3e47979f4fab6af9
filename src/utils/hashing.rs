//! SHA-256 helpers for API keys and conversion user data

use sha2::{Digest, Sha256};

/// SHA-256 hex (lowercase)
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Trimmed, lowercased email; None when empty
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    (!email.is_empty()).then_some(email)
}

/// Digits only; None when no digits remain
pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

pub fn hash_email(email: &str) -> Option<String> {
    normalize_email(email).map(|e| sha256_hex(&e))
}

pub fn hash_phone(phone: &str) -> Option<String> {
    normalize_phone(phone).map(|p| sha256_hex(&p))
}

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_SIMILARITY: f64 = 0.7;

const COMMON_PASSWORDS: &[&str] = &[
    "12345", "123456", "123456789", "12345678", "password", "qwerty", "qwerty123", "1234567890",
    "111111", "1234567", "123123", "abc123", "password1", "password123", "iloveyou",
    "admin", "admin123", "welcome", "welcome1", "letmein", "monkey", "dragon", "football",
    "baseball", "sunshine", "princess", "master", "shadow", "superman", "trustno1",
    "whatever", "starwars", "passw0rd", "p@ssw0rd", "p@ssword", "zaq12wsx", "qwertyuiop",
    "1q2w3e4r", "1qaz2wsx", "asdfghjkl", "asdfasdf", "michael", "jennifer", "charlie",
    "freedom", "hello123", "login", "loveme", "ninja", "secret", "solo", "access",
    "flower", "hottie", "mustang", "batman", "killer", "jordan23", "computer", "internet",
    "changeme", "default", "000000", "654321", "987654321", "11111111", "00000000",
    "12341234", "88888888", "asdf1234", "qwer1234", "q1w2e3r4", "google", "nepal123",
    "investo", "investo123", "money123", "finance1",
];

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Checks password strength and returns every rule the password breaks.
///
/// `attributes` are `(label, value)` pairs of account data the password must
/// not resemble, e.g. `("username", "alice")`.
pub fn password_problems(plain: &str, attributes: &[(&str, &str)]) -> Vec<String> {
    let mut problems = Vec::new();
    let lowered = plain.to_lowercase();

    for (label, value) in attributes {
        if is_too_similar(&lowered, &value.to_lowercase()) {
            problems.push(format!("The password is too similar to the {label}."));
            break;
        }
    }

    if plain.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    if COMMON_PASSWORDS.contains(&lowered.trim()) {
        problems.push("This password is too common.".to_string());
    }

    if !plain.is_empty() && plain.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}

fn is_too_similar(password: &str, attribute: &str) -> bool {
    if attribute.is_empty() || password.is_empty() {
        return false;
    }
    // Compare against the whole value and each word-ish part (email local
    // part, domain labels, ...).
    std::iter::once(attribute)
        .chain(attribute.split(|c: char| !c.is_alphanumeric()))
        .filter(|part| part.chars().count() >= 3)
        .any(|part| password.contains(part) || quick_ratio(password, part) >= MAX_SIMILARITY)
}

/// Upper bound on sequence similarity: `2 * shared chars / total chars`.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    let mut remaining: Vec<char> = b.chars().collect();
    let mut matches = 0usize;
    for c in a.chars() {
        if let Some(pos) = remaining.iter().position(|&r| r == c) {
            remaining.swap_remove(pos);
            matches += 1;
        }
    }
    2.0 * matches as f64 / total as f64
}

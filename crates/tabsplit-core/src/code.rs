//! # Session Codes
//!
//! Short human-shareable codes people type to join a session.
//!
//! ## Code Space
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  6 characters from [A-Z0-9]  →  36^6 ≈ 2.18 billion codes               │
//! │                                                                         │
//! │    "K7Q2ZD"   "000000"   "ABCDEF"                                       │
//! │                                                                         │
//! │  generate_unique_code():                                                │
//! │    loop {                                                               │
//! │      candidate = random 6 chars                                         │
//! │      if !is_taken(candidate) → return                                   │
//! │    }                                                                    │
//! │                                                                         │
//! │  The caller must hold whatever lock protects the code index while      │
//! │  this runs AND while inserting the result; otherwise two sessions      │
//! │  can race onto the same code.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rand::Rng;
use tracing::warn;

/// Number of characters in a session code.
pub const CODE_LENGTH: usize = 6;

/// Characters a session code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Attempts after which a warning is logged (the code space is filling up).
const RETRY_WARN_THRESHOLD: u32 = 100;

/// Draws one random code, without checking for collisions.
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Draws codes until `is_taken` reports one as free.
///
/// Never gives up: with 2 billion codes a long run of collisions means the
/// store is nearly full, which is logged once.
pub fn generate_unique_code<R, F>(rng: &mut R, mut is_taken: F) -> String
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> bool,
{
    let mut attempts: u32 = 0;
    loop {
        let candidate = random_code(rng);
        if !is_taken(&candidate) {
            return candidate;
        }

        attempts += 1;
        if attempts == RETRY_WARN_THRESHOLD {
            warn!(attempts, "Session code generation keeps colliding");
        }
    }
}

/// Normalizes user input before lookup: trims and uppercases.
///
/// ## Example
/// ```rust
/// use tabsplit_core::code::normalize_code;
///
/// assert_eq!(normalize_code(" k7q2zd "), "K7Q2ZD");
/// ```
pub fn normalize_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Checks that a string has the shape of a session code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_random_code_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let code = random_code(&mut rng);
            assert!(is_valid_code(&code), "bad code {}", code);
        }
    }

    #[test]
    fn test_generate_unique_skips_taken_codes() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut taken = HashSet::new();
        let mut rejected = 0;

        // Mark the first three candidates as taken.
        let code = generate_unique_code(&mut rng, |candidate| {
            if rejected < 3 {
                rejected += 1;
                taken.insert(candidate.to_string());
                true
            } else {
                false
            }
        });

        assert_eq!(rejected, 3);
        assert!(!taken.contains(&code));
        assert!(is_valid_code(&code));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("abc123"), "ABC123");
        assert_eq!(normalize_code("  XyZ789\n"), "XYZ789");
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("ABC123"));
        assert!(!is_valid_code("abc123"));
        assert!(!is_valid_code("ABC12"));
        assert!(!is_valid_code("ABC1234"));
        assert!(!is_valid_code("ABC-12"));
    }
}

//! Client-secret thumbprints with timing-attack resistant comparison.
//!
//! Secrets are stored only as SHA-256 thumbprints; the same function runs at
//! store time and at compare time so the two values line up. Verification
//! hashes the candidate and compares thumbprints with `subtle`, so comparison
//! time is independent of where the first differing byte sits.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Deterministic SHA-256 thumbprint of a plaintext secret, lowercase hex.
#[must_use]
pub fn hash_client_secret(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    let mut thumbprint = String::with_capacity(digest.len() * 2);
    for byte in digest {
        // Writing to a String cannot fail.
        let _ = write!(thumbprint, "{byte:02x}");
    }
    thumbprint
}

/// Whether `candidate` hashes to `stored_thumbprint`.
///
/// The candidate is hashed first, so comparison operates on fixed-length
/// values and runs in constant time. A stored thumbprint of the wrong length
/// fails fast; length is not a secret.
#[must_use]
pub fn verify_client_secret(candidate: &str, stored_thumbprint: &str) -> bool {
    let candidate_thumbprint = hash_client_secret(candidate);
    if candidate_thumbprint.len() != stored_thumbprint.len() {
        return false;
    }
    candidate_thumbprint
        .as_bytes()
        .ct_eq(stored_thumbprint.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn thumbprint_is_deterministic() {
        assert_eq!(hash_client_secret("secret"), hash_client_secret("secret"));
        assert_ne!(hash_client_secret("secret"), hash_client_secret("secre_"));
    }

    #[test]
    fn thumbprint_is_lowercase_hex_of_fixed_length() {
        let thumbprint = hash_client_secret("anything");
        assert_eq!(thumbprint.len(), 64);
        assert!(thumbprint.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn verification_round_trips() {
        let stored = hash_client_secret("correct horse battery staple");
        assert!(verify_client_secret("correct horse battery staple", &stored));
        assert!(!verify_client_secret("correct horse battery stapl_", &stored));
        assert!(!verify_client_secret("", &stored));
    }

    #[test]
    fn malformed_stored_thumbprint_never_matches() {
        assert!(!verify_client_secret("secret", ""));
        assert!(!verify_client_secret("secret", "deadbeef"));
    }

    #[test]
    fn comparison_time_is_independent_of_mismatch_position() {
        // Statistical check: a mismatch in the first hex digit and one in the
        // last must cost the same. May be noisy on loaded machines; the
        // threshold is far below anything exploitable over a network.
        let stored = hash_client_secret("the stored client secret value!!");
        let mut early = stored.clone().into_bytes();
        early[0] = if early[0] == b'0' { b'1' } else { b'0' };
        let early = String::from_utf8(early).unwrap();
        let mut late = stored.clone().into_bytes();
        let last = late.len() - 1;
        late[last] = if late[last] == b'0' { b'1' } else { b'0' };
        let late = String::from_utf8(late).unwrap();

        for _ in 0..1_000 {
            let _ = verify_client_secret("probe", &early);
            let _ = verify_client_secret("probe", &late);
        }

        let start = Instant::now();
        for _ in 0..10_000 {
            let _ = verify_client_secret("probe", &early);
        }
        let early_time = start.elapsed();

        let start = Instant::now();
        for _ in 0..10_000 {
            let _ = verify_client_secret("probe", &late);
        }
        let late_time = start.elapsed();

        let diff_ns =
            (early_time.as_nanos() as i128 - late_time.as_nanos() as i128).abs() / 10_000;
        assert!(
            diff_ns < 500,
            "timing difference too large: {diff_ns}ns per comparison"
        );
    }
}

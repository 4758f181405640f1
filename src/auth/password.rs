/// Password Hashing and Verification
///
/// PBKDF2-HMAC-SHA256 with a random 16-byte salt, serialized as a
/// self-describing `iterations.salt.key` record (base64 fields). The
/// record embeds its own iteration count, so verification always uses the
/// cost factor that was active when the hash was created and raising the
/// configured default never breaks stored hashes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const FIELD_DELIMITER: char = '.';

/// Hash a password with the given PBKDF2 iteration count
///
/// The password is treated as an opaque blob; length and charset policy
/// belong to the registration layer. Never fails.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut key);

    format!(
        "{}{}{}{}{}",
        iterations,
        FIELD_DELIMITER,
        STANDARD.encode(salt),
        FIELD_DELIMITER,
        STANDARD.encode(key)
    )
}

/// Verify a password against a stored hash record
///
/// A malformed record (wrong field count, non-numeric iteration count,
/// invalid base64) is never an error, only "does not match". The derived
/// key is compared in constant time.
pub fn verify_password(stored: &str, password: &str) -> bool {
    let mut fields = stored.splitn(3, FIELD_DELIMITER);
    let (Some(iterations), Some(salt), Some(expected)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return false;
    };

    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = STANDARD.decode(salt) else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(expected) else {
        return false;
    };

    // Derive to the stored key's length so historical records with a
    // different output size still verify.
    let mut actual = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut actual);

    actual.ct_eq(&expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("Secr3t!", TEST_ITERATIONS);
        assert!(verify_password(&hash, "Secr3t!"));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("Secr3t!", TEST_ITERATIONS);
        assert!(!verify_password(&hash, "secr3t!"));
        assert!(!verify_password(&hash, ""));
    }

    #[test]
    fn record_embeds_iteration_count_and_delimited_fields() {
        let hash = hash_password("pw", 2_048);
        let fields: Vec<&str> = hash.split('.').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], "2048");
    }

    #[test]
    fn verification_uses_the_stored_iteration_count() {
        // A record written under an older, lower cost factor must still
        // verify after the default is raised.
        let old_hash = hash_password("pw", 500);
        assert!(verify_password(&old_hash, "pw"));
    }

    #[test]
    fn same_password_hashes_differently_each_time() {
        let a = hash_password("pw", TEST_ITERATIONS);
        let b = hash_password("pw", TEST_ITERATIONS);
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_records_verify_false_without_panicking() {
        let cases = [
            "",
            "no-delimiters",
            "one.field",
            "NaN.c2FsdA==.a2V5",
            "1000.!!notbase64!!.a2V5",
            "1000.c2FsdA==.!!notbase64!!",
            "1000.c2FsdA==.a2V5.extra",
        ];
        for stored in cases {
            assert!(!verify_password(stored, "pw"), "accepted: {:?}", stored);
        }
    }

    #[test]
    fn trailing_field_after_third_delimiter_is_part_of_the_key() {
        // splitn(3) folds everything after the second delimiter into the
        // key field; the extra delimiter makes the base64 invalid.
        let hash = hash_password("pw", TEST_ITERATIONS);
        assert!(!verify_password(&format!("{}.", hash), "pw"));
    }
}

// =========================
// tests/unit/password_tests.rs
// =========================
//! Unit tests for credential hashing
use backend_lib::auth::CredentialHasher;
use backend_lib::config::HashCost;

#[test]
fn test_password_hashing_and_verification() {
    let hasher = CredentialHasher::new(&HashCost::fast_for_tests()).unwrap();
    let password = "SecureP@ssw0rd";
    let hash = hasher.hash(password).unwrap();

    assert_ne!(password, hash);
    assert!(hash.starts_with("$scrypt$"));
    assert!(hasher.verify(password, &hash));
    assert!(!hasher.verify("SecureP@ssw0rd ", &hash));
    assert!(!hasher.verify("", &hash));
}

#[test]
fn test_hashes_are_salted() {
    let hasher = CredentialHasher::new(&HashCost::fast_for_tests()).unwrap();
    let first = hasher.hash("SecureP@ssw0rd").unwrap();
    let second = hasher.hash("SecureP@ssw0rd").unwrap();

    assert_ne!(first, second);
    assert!(hasher.verify("SecureP@ssw0rd", &first));
    assert!(hasher.verify("SecureP@ssw0rd", &second));
}

#[test]
fn test_digest_from_other_cost_still_verifies() {
    let cheap = CredentialHasher::new(&HashCost::fast_for_tests()).unwrap();
    let dearer = CredentialHasher::new(&HashCost {
        log_n: 6,
        ..HashCost::fast_for_tests()
    })
    .unwrap();

    let hash = cheap.hash("SecureP@ssw0rd").unwrap();
    assert!(dearer.verify("SecureP@ssw0rd", &hash));
}

#[test]
fn test_malformed_digest_never_matches() {
    let hasher = CredentialHasher::new(&HashCost::fast_for_tests()).unwrap();
    assert!(!hasher.verify("SecureP@ssw0rd", "not a phc string"));
    assert!(!hasher.verify("SecureP@ssw0rd", ""));
}

use sha2::{Digest, Sha256};

const ITERATIONS: u32 = 10_000;

pub(crate) fn new_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Iterated, salted SHA-256, hex encoded.
pub(crate) fn hash(password: &str, salt: &str) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..ITERATIONS {
        digest = Sha256::new()
            .chain_update(digest.as_slice())
            .chain_update(salt.as_bytes())
            .finalize();
    }
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn verify(password: &str, salt: &str, expected: &str) -> bool {
    let actual = hash(password, salt);
    // constant time
    actual.len() == expected.len()
        && actual
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

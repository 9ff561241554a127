use sha2::{Digest, Sha256};

const CHECKSUM_SALT: &str = "exWOhxnV2KLuSvOdE70k";

/// Salted SHA-256 over the persisted session fields, as lowercase hex.
///
/// The layout of the salted string is fixed; existing save records depend on it.
pub fn compute_checksum(life_count: u32, infinite_lives: bool) -> String {
    let salted = format!(
        "{}{}{}{}{}",
        &CHECKSUM_SALT[10..],
        life_count,
        &CHECKSUM_SALT[..6],
        u8::from(infinite_lives),
        &CHECKSUM_SALT[3..11],
    );
    Sha256::digest(salted.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/*
 * Responsibility
 * - Small shared helpers (ids, temporary credentials, ordering)
 */
use chrono::{DateTime, Utc};
use rand::Rng;

const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random identifier: `length` random bytes rendered as lowercase hex, so
/// the result is `2 * length` characters.
pub fn generate_id(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}

/// Random temporary password for directory-created users. The directory
/// forces a change on first sign-in, so entropy matters more than policy
/// here.
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let index = rng.random_range(0..PASSWORD_CHARSET.len());
            PASSWORD_CHARSET[index] as char
        })
        .collect()
}

/// Sort records newest-first by the given timestamp accessor.
pub fn sort_by_newest<T>(items: &mut [T], timestamp: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| timestamp(b).cmp(&timestamp(a)));
}

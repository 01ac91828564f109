//! Client-side identifier generation.
//!
//! All identifiers share the shape `<prefix><millis><sep><suffix>` where the
//! suffix is nine random base36 characters. Uniqueness is probabilistic only.

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

fn generate(prefix: &str, separator: char) -> String {
    format!(
        "{prefix}{}{separator}{}",
        Utc::now().timestamp_millis(),
        random_suffix()
    )
}

/// Session token for guest carts, e.g. `guest_1718000000000_k3j9x0a1b`.
pub fn guest_session_id() -> String {
    generate("guest_", '_')
}

/// Reference handed to the payment gateway for a single attempt.
pub fn transaction_reference() -> String {
    generate("TXN_", '_')
}

/// Identifier sent with the order draft and shown on confirmation.
pub fn order_id() -> String {
    generate("ORD-", '-')
}

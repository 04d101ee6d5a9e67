//! Human-readable order codes

use rand::Rng;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Server-side order code: `ORD-<year>-<4 random base36 chars>`
pub fn generate_order_code(year: i32) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("ORD-{}-{}", year, suffix)
}

/// Code for an order created while the client is offline: `SIP-0001`
pub fn offline_order_code(seq: u32) -> String {
    format!("SIP-{:04}", seq)
}

/// Whether a code was minted offline and has not been replayed yet
pub fn is_offline_code(code: &str) -> bool {
    code.starts_with("SIP-")
}

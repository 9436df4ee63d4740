//! Core Types for the Stability Pool
//!
//! Account identifiers and the small helpers shared by every crate.

use sha2::{Digest, Sha256};

/// Type alias for ledger accounts and depositors (32-byte hash)
pub type Address = [u8; 32];

/// The all-zero address, never a valid account
pub const ZERO_ADDRESS: Address = [0u8; 32];

/// Check whether an address is the zero address
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}

/// Derive a deterministic account id from a domain tag and a label
///
/// `derive_address(b"stability-pool", "ETH")` always yields the same id, and
/// different domains never collide for the same label.
pub fn derive_address(domain: &[u8], label: &str) -> Address {
    let mut hasher = Sha256::new();
    hasher.update((domain.len() as u64).to_le_bytes());
    hasher.update(domain);
    hasher.update(label.as_bytes());
    let result = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&result);
    id
}

/// First four bytes of an address as hex, for log lines and error messages
pub fn short_hex(address: &Address) -> String {
    address[..4].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_address_is_deterministic() {
        let a = derive_address(b"stability-pool", "ETH");
        let b = derive_address(b"stability-pool", "ETH");
        let c = derive_address(b"active-pool", "ETH");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!is_zero_address(&a));
    }

    #[test]
    fn test_short_hex() {
        let mut addr = ZERO_ADDRESS;
        addr[0] = 0xab;
        addr[3] = 0x01;
        assert_eq!(short_hex(&addr), "ab000001");
    }
}

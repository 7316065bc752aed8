//! Interoperable address encoding
//!
//! Canonical, versioned binary encoding of chains and addresses, parsed
//! byte-for-byte by the destination contracts. Both encodings share the same
//! header:
//!
//! ```text
//! | version (2B) | chain type (2B) | chainRefLen (1B) | chainRef (var) | addrLen (1B) | addr (var) |
//! ```
//!
//! - Chain-only form: chainRef carries the minimal big-endian chain id,
//!   addrLen is zero.
//! - Address-only form: chainRefLen is zero, addr carries the 20-byte
//!   EVM address.
//!
//! Both functions are pure and total; the output must be byte-identical
//! across implementations.

use crate::error::{InteropError, Result};
use alloy::primitives::{Address, U256};

/// Encoding version of the interoperable address format.
pub const INTEROP_ADDRESS_VERSION: [u8; 2] = [0x00, 0x01];

/// Chain type code for EVM-style chains.
pub const CHAIN_TYPE_EVM: [u8; 2] = [0x00, 0x00];

/// Encode a chain id in chain-only interoperable form.
///
/// The chain reference is the minimal big-endian encoding of the id (empty
/// for zero). The reference length must fit the single length byte.
pub fn format_chain(chain_id: U256) -> Result<Vec<u8>> {
    let chain_ref = minimal_be_bytes(chain_id);
    if chain_ref.len() > 255 {
        return Err(InteropError::validation(format!(
            "chain reference too long: {} bytes (max 255)",
            chain_ref.len()
        )));
    }

    let mut out = Vec::with_capacity(6 + chain_ref.len());
    out.extend_from_slice(&INTEROP_ADDRESS_VERSION);
    out.extend_from_slice(&CHAIN_TYPE_EVM);
    out.push(chain_ref.len() as u8);
    out.extend_from_slice(&chain_ref);
    out.push(0); // no address component
    Ok(out)
}

/// Encode a 20-byte address in address-only interoperable form.
///
/// Always 26 bytes: 6-byte header plus the address.
pub fn format_address(address: Address) -> Vec<u8> {
    let mut out = Vec::with_capacity(26);
    out.extend_from_slice(&INTEROP_ADDRESS_VERSION);
    out.extend_from_slice(&CHAIN_TYPE_EVM);
    out.push(0); // no chain reference
    out.push(20);
    out.extend_from_slice(address.as_slice());
    out
}

/// Minimal big-endian byte encoding of a U256 (empty for zero).
fn minimal_be_bytes(value: U256) -> Vec<u8> {
    let full = value.to_be_bytes::<32>();
    let first = full.iter().position(|&b| b != 0).unwrap_or(32);
    full[first..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_format_chain_layout() {
        let encoded = format_chain(U256::from(271u64)).unwrap();
        // 271 = 0x010F, minimal encoding is two bytes
        assert_eq!(encoded, vec![0x00, 0x01, 0x00, 0x00, 0x02, 0x01, 0x0F, 0x00]);
    }

    #[test]
    fn test_format_chain_single_byte_ref() {
        let encoded = format_chain(U256::from(9u64)).unwrap();
        assert_eq!(encoded, vec![0x00, 0x01, 0x00, 0x00, 0x01, 0x09, 0x00]);
    }

    #[test]
    fn test_format_chain_zero() {
        // Zero has an empty minimal encoding
        let encoded = format_chain(U256::ZERO).unwrap();
        assert_eq!(encoded, vec![0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_format_chain_ref_len_is_minimal() {
        for (id, expected_len) in [
            (U256::from(1u64), 1usize),
            (U256::from(0xFFu64), 1),
            (U256::from(0x100u64), 2),
            (U256::from(0xFFFFFFu64), 3),
            (U256::MAX, 32),
        ] {
            let encoded = format_chain(id).unwrap();
            assert_eq!(encoded[4] as usize, expected_len, "chain id {id}");
            assert_eq!(encoded.len(), 6 + expected_len);
            // Trailing address-length byte stays zero in chain-only form
            assert_eq!(*encoded.last().unwrap(), 0);
        }
    }

    #[test]
    fn test_format_address_is_26_bytes() {
        let addr = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let encoded = format_address(addr);
        assert_eq!(encoded.len(), 26);
        assert_eq!(&encoded[..4], &[0x00, 0x01, 0x00, 0x00]);
        assert_eq!(encoded[4], 0); // no chain reference
        assert_eq!(encoded[5], 20);
        assert_eq!(&encoded[6..], addr.as_slice());
    }

    #[test]
    fn test_format_address_zero() {
        let encoded = format_address(Address::ZERO);
        assert_eq!(encoded.len(), 26);
        assert!(encoded[6..].iter().all(|&b| b == 0));
    }
}

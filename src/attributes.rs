//! Attribute encoding for bundles and calls
//!
//! Attributes are small tagged parameters: a 4-byte selector followed by
//! ABI-encoded arguments, structurally identical to a zero-output pure
//! function call. The selector acts as a type discriminator, so the
//! declarations below go through `sol!` and the selectors stay
//! keccak-derived rather than hand-written.
//!
//! Bundle-level attributes: `executionAddress`, `unbundlerAddress`.
//! Call-level attributes: `indirectCall`, `interopCallValue`.

use alloy::primitives::{Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    /// Restrict bundle execution to one executor (interoperable-encoded).
    function executionAddress(bytes executor);

    /// Permit unbundling by one address (interoperable-encoded).
    function unbundlerAddress(bytes unbundler);

    /// Route the call through the asset router with a message value.
    function indirectCall(uint256 messageValue);

    /// Attach native value to a direct call.
    function interopCallValue(uint256 value);
}

// ============================================================================
// Builders
// ============================================================================

/// Bundle attribute: only `executor` may execute the bundle.
pub fn execution_address(executor: Vec<u8>) -> Bytes {
    executionAddressCall {
        executor: executor.into(),
    }
    .abi_encode()
    .into()
}

/// Bundle attribute: `unbundler` may unbundle on the destination.
pub fn unbundler_address(unbundler: Vec<u8>) -> Bytes {
    unbundlerAddressCall {
        unbundler: unbundler.into(),
    }
    .abi_encode()
    .into()
}

/// Call attribute: route through the asset router carrying `message_value`.
pub fn indirect_call(message_value: U256) -> Bytes {
    indirectCallCall {
        messageValue: message_value,
    }
    .abi_encode()
    .into()
}

/// Call attribute: attach `value` of native token to a direct call.
pub fn interop_call_value(value: U256) -> Bytes {
    interopCallValueCall { value }.abi_encode().into()
}

// ============================================================================
// Decoding (inspection tooling)
// ============================================================================

/// A decoded attribute, best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAttribute {
    /// Raw 4-byte selector (zeroed when the input is shorter than 4 bytes).
    pub selector: [u8; 4],
    /// Attribute name, or `"unknown"`.
    pub name: String,
    /// Full signature when the selector is recognized.
    pub signature: Option<String>,
    /// Stringified arguments; raw hex for unknown selectors.
    pub args: Vec<String>,
}

impl DecodedAttribute {
    fn unknown(raw: &[u8]) -> Self {
        let mut selector = [0u8; 4];
        let len = raw.len().min(4);
        selector[..len].copy_from_slice(&raw[..len]);
        Self {
            selector,
            name: "unknown".to_string(),
            signature: None,
            args: vec![format!("0x{}", hex::encode(raw))],
        }
    }
}

/// Decode an attribute into a readable form.
///
/// Never fails: unrecognized selectors and malformed argument data fall back
/// to `name = "unknown"` with the raw bytes as the single argument.
pub fn decode_attribute(raw: &[u8]) -> DecodedAttribute {
    if raw.len() < 4 {
        return DecodedAttribute::unknown(raw);
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&raw[..4]);

    if selector == executionAddressCall::SELECTOR {
        if let Ok(call) = executionAddressCall::abi_decode(raw, true) {
            return DecodedAttribute {
                selector,
                name: "executionAddress".to_string(),
                signature: Some(executionAddressCall::SIGNATURE.to_string()),
                args: vec![format!("0x{}", hex::encode(&call.executor))],
            };
        }
    } else if selector == unbundlerAddressCall::SELECTOR {
        if let Ok(call) = unbundlerAddressCall::abi_decode(raw, true) {
            return DecodedAttribute {
                selector,
                name: "unbundlerAddress".to_string(),
                signature: Some(unbundlerAddressCall::SIGNATURE.to_string()),
                args: vec![format!("0x{}", hex::encode(&call.unbundler))],
            };
        }
    } else if selector == indirectCallCall::SELECTOR {
        if let Ok(call) = indirectCallCall::abi_decode(raw, true) {
            return DecodedAttribute {
                selector,
                name: "indirectCall".to_string(),
                signature: Some(indirectCallCall::SIGNATURE.to_string()),
                args: vec![call.messageValue.to_string()],
            };
        }
    } else if selector == interopCallValueCall::SELECTOR {
        if let Ok(call) = interopCallValueCall::abi_decode(raw, true) {
            return DecodedAttribute {
                selector,
                name: "interopCallValue".to_string(),
                signature: Some(interopCallValueCall::SIGNATURE.to_string()),
                args: vec![call.value.to_string()],
            };
        }
    }

    DecodedAttribute::unknown(raw)
}

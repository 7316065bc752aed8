//! Interop contract ABI definitions
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the contracts
//! the core talks to: the source-chain interop center (bundle dispatch), the
//! destination handler (verification/execution lifecycle), the destination
//! root storage, the L1 messenger, and plain ERC-20 approvals.
//!
//! The event and call shapes are fixed, versioned structures owned by the
//! on-chain contracts; this module is the single place they are spelled out.

use crate::error::{InteropError, Result};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};

/// Prefix byte identifying a bundle payload inside an L2->L1 message.
pub const BUNDLE_IDENTIFIER: u8 = 0x01;

sol! {
    /// One call of a bundle, wire form.
    struct InteropCallStarter {
        bytes to;
        bytes data;
        bytes[] callAttributes;
    }

    /// The L2->L1 message a proof covers.
    struct L2Message {
        uint16 txNumberInBatch;
        address sender;
        bytes data;
    }

    /// Merkle inclusion proof for an L2->L1 message.
    struct InclusionProof {
        uint256 chainId;
        uint256 l1BatchNumber;
        uint256 l2MessageIndex;
        L2Message message;
        bytes32[] proof;
    }

    /// Source-chain dispatch contract.
    #[sol(rpc)]
    contract InteropCenter {
        /// Dispatch a bundle of calls to another chain.
        function sendBundle(
            bytes destinationChain,
            InteropCallStarter[] callStarters,
            bytes[] bundleAttributes
        ) external payable returns (bytes32 bundleHash);

        /// Emitted once per dispatched bundle.
        event InteropBundleSent(
            bytes32 indexed bundleHash,
            uint256 sourceChainId,
            uint256 destinationChainId
        );
    }

    /// Destination-chain verification/execution contract.
    #[sol(rpc)]
    contract InteropHandler {
        /// Execute a proven bundle.
        function executeBundle(bytes encodedData, InclusionProof proof) external;

        /// Bundle inclusion verified.
        event InteropBundleVerified(bytes32 indexed bundleHash);

        /// Bundle executed (terminal).
        event InteropBundleExecuted(bytes32 indexed bundleHash);

        /// Bundle unbundled (terminal).
        event InteropBundleUnbundled(bytes32 indexed bundleHash);
    }

    /// Destination-chain storage of settled source-batch roots.
    #[sol(rpc)]
    contract InteropRootStorage {
        /// Root settled for `(chainId, batchNumber)`, zero while pending.
        function interopRoots(uint256 chainId, uint256 batchNumber) external view returns (bytes32);
    }

    /// Source-chain system contract emitting L2->L1 messages.
    #[sol(rpc)]
    contract L1Messenger {
        /// Raw cross-chain message, hashed into the batch root.
        event L1MessageSent(address indexed sender, bytes32 indexed hash, bytes message);
    }

    /// Minimal ERC-20 surface for approvals.
    #[sol(rpc)]
    contract ERC20 {
        function approve(address spender, uint256 value) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

// ============================================================================
// Topics
// ============================================================================

/// Topic of the bundle-sent event.
pub fn bundle_sent_topic() -> B256 {
    InteropCenter::InteropBundleSent::SIGNATURE_HASH
}

/// Topic of the L2->L1 message event.
pub fn l1_message_sent_topic() -> B256 {
    L1Messenger::L1MessageSent::SIGNATURE_HASH
}

/// Lifecycle event topics in precedence order (most advanced first).
pub fn lifecycle_topics() -> [(crate::types::InteropPhase, B256); 3] {
    use crate::types::InteropPhase;
    [
        (
            InteropPhase::Unbundled,
            InteropHandler::InteropBundleUnbundled::SIGNATURE_HASH,
        ),
        (
            InteropPhase::Executed,
            InteropHandler::InteropBundleExecuted::SIGNATURE_HASH,
        ),
        (
            InteropPhase::Verified,
            InteropHandler::InteropBundleVerified::SIGNATURE_HASH,
        ),
    ]
}

// ============================================================================
// Decode / encode helpers
// ============================================================================

/// Decoded bundle-sent event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleSent {
    pub bundle_hash: B256,
    pub source_chain_id: U256,
    pub destination_chain_id: U256,
}

/// Decode a bundle-sent log from its raw topics and data.
pub fn decode_bundle_sent(topics: &[B256], data: &[u8]) -> Result<BundleSent> {
    let event =
        InteropCenter::InteropBundleSent::decode_raw_log(topics.iter().copied(), data, true)
            .map_err(|e| InteropError::state(format!("malformed bundle-sent log: {e}")))?;
    Ok(BundleSent {
        bundle_hash: event.bundleHash,
        source_chain_id: event.sourceChainId,
        destination_chain_id: event.destinationChainId,
    })
}

/// Decode the message bytes of an L1-message-sent log.
///
/// Data shorter than its declared ABI offset/length header is a decoding
/// failure, never a silent truncation.
pub fn decode_l1_message(topics: &[B256], data: &[u8]) -> Result<Bytes> {
    let event = L1Messenger::L1MessageSent::decode_raw_log(topics.iter().copied(), data, true)
        .map_err(|e| InteropError::state(format!("malformed L1-message-sent log: {e}")))?;
    Ok(event.message)
}

/// Build calldata for `InteropCenter::sendBundle` from a built plan.
pub fn encode_send_bundle(plan: &crate::types::BundlePlan) -> Bytes {
    let call = InteropCenter::sendBundleCall {
        destinationChain: plan.dst_chain.clone(),
        callStarters: plan
            .starters
            .iter()
            .map(|starter| InteropCallStarter {
                to: starter.to.clone(),
                data: starter.data.clone(),
                callAttributes: starter.call_attributes.clone(),
            })
            .collect(),
        bundleAttributes: plan.bundle_attributes.clone(),
    };
    call.abi_encode().into()
}

/// Build calldata for `InteropHandler::executeBundle`.
pub fn encode_execute_bundle(
    encoded_data: &Bytes,
    proof: &crate::types::MessageInclusionProof,
) -> Bytes {
    let call = InteropHandler::executeBundleCall {
        encodedData: encoded_data.clone(),
        proof: InclusionProof {
            chainId: proof.chain_id,
            l1BatchNumber: proof.l1_batch_number,
            l2MessageIndex: U256::from(proof.l2_message_index),
            message: L2Message {
                txNumberInBatch: proof.message.tx_number_in_batch,
                sender: proof.message.sender,
                data: proof.message.data.clone(),
            },
            proof: proof.proof.clone(),
        },
    };
    call.abi_encode().into()
}

/// Build calldata for an ERC-20 approval.
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    ERC20::approveCall {
        spender,
        value: amount,
    }
    .abi_encode()
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BundlePlan, CallStarter, MessageInclusionProof, ProofMessage, QuoteTotals,
    };
    use alloy::sol_types::SolValue;

    #[test]
    fn test_bundle_sent_roundtrip() {
        let bundle_hash = B256::repeat_byte(0x11);
        let topics = vec![bundle_sent_topic(), bundle_hash];
        let data = (U256::from(271u64), U256::from(260u64)).abi_encode();

        let decoded = decode_bundle_sent(&topics, &data).unwrap();
        assert_eq!(decoded.bundle_hash, bundle_hash);
        assert_eq!(decoded.source_chain_id, U256::from(271u64));
        assert_eq!(decoded.destination_chain_id, U256::from(260u64));
    }

    #[test]
    fn test_bundle_sent_truncated_data_fails() {
        let topics = vec![bundle_sent_topic(), B256::ZERO];
        let err = decode_bundle_sent(&topics, &[0x00; 8]).unwrap_err();
        assert!(err.to_string().contains("bundle-sent"));
    }

    #[test]
    fn test_l1_message_truncated_data_fails() {
        let topics = vec![l1_message_sent_topic(), B256::ZERO, B256::ZERO];
        // Declares an offset past the end of the buffer
        let mut data = vec![0u8; 32];
        data[31] = 0xFF;
        assert!(decode_l1_message(&topics, &data).is_err());
    }

    #[test]
    fn test_lifecycle_topics_precedence_order() {
        use crate::types::InteropPhase;
        let topics = lifecycle_topics();
        assert_eq!(topics[0].0, InteropPhase::Unbundled);
        assert_eq!(topics[1].0, InteropPhase::Executed);
        assert_eq!(topics[2].0, InteropPhase::Verified);
        assert_ne!(topics[0].1, topics[1].1);
        assert_ne!(topics[1].1, topics[2].1);
    }

    #[test]
    fn test_encode_send_bundle_selector() {
        let plan = BundlePlan {
            dst_chain: Bytes::from(vec![0x00, 0x01, 0x00, 0x00, 0x01, 0x09, 0x00]),
            starters: vec![CallStarter {
                to: Bytes::from(vec![0xAA; 26]),
                data: Bytes::new(),
                call_attributes: vec![Bytes::from(vec![0x11; 36])],
            }],
            bundle_attributes: vec![],
            approvals: vec![],
            quote: QuoteTotals::default(),
        };
        let calldata = encode_send_bundle(&plan);
        assert_eq!(&calldata[..4], InteropCenter::sendBundleCall::SELECTOR);
    }

    #[test]
    fn test_encode_execute_bundle_selector() {
        let proof = MessageInclusionProof {
            chain_id: U256::from(271u64),
            l1_batch_number: U256::from(12u64),
            l2_message_index: 3,
            message: ProofMessage {
                tx_number_in_batch: 7,
                sender: Address::ZERO,
                data: Bytes::from(vec![BUNDLE_IDENTIFIER, 0xAB]),
            },
            proof: vec![B256::repeat_byte(0x22)],
        };
        let calldata = encode_execute_bundle(&Bytes::from(vec![0xAB]), &proof);
        assert_eq!(&calldata[..4], InteropHandler::executeBundleCall::SELECTOR);
    }
}

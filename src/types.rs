//! Core data model for cross-chain bundles
//!
//! Actions, request parameters, the per-request build context, the produced
//! transaction plan, and the finalization-lifecycle types shared by the
//! route planner, bundle builder, and finalization service.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Actions
// ============================================================================

/// A single action to execute on the destination chain.
///
/// Closed sum type: every consumption site matches exhaustively, so a new
/// action kind cannot silently fall through route selection or bundle
/// building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteropAction {
    /// Transfer native value to `to` on the destination chain.
    SendNative { to: Address, amount: U256 },
    /// Transfer an ERC-20 token to `to` on the destination chain.
    SendErc20 {
        token: Address,
        to: Address,
        amount: U256,
    },
    /// Arbitrary contract call on the destination chain.
    Call {
        to: Address,
        data: Option<Bytes>,
        value: Option<U256>,
    },
}

impl InteropAction {
    /// Native value this action carries (zero for plain calls and ERC-20s).
    pub fn native_value(&self) -> U256 {
        match self {
            InteropAction::SendNative { amount, .. } => *amount,
            InteropAction::SendErc20 { .. } => U256::ZERO,
            InteropAction::Call { value, .. } => value.unwrap_or(U256::ZERO),
        }
    }

    /// True for ERC-20 transfer actions.
    pub fn is_erc20(&self) -> bool {
        matches!(self, InteropAction::SendErc20 { .. })
    }
}

/// Caller-supplied request for a cross-chain bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteropParams {
    /// Destination chain id.
    pub dst_chain_id: U256,
    /// Actions to execute on the destination chain.
    pub actions: Vec<InteropAction>,
    /// Restrict execution to a single executor address.
    pub execution: Option<ExecutionOptions>,
    /// Allow unbundling by a specific address.
    pub unbundling: Option<UnbundlingOptions>,
    /// Sender override (defaults to the signer).
    pub sender: Option<Address>,
}

/// Execution restriction attached as a bundle attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Only this address may execute the bundle on the destination.
    pub only: Address,
}

/// Unbundling permission attached as a bundle attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnbundlingOptions {
    /// This address may unbundle on the destination.
    pub by: Address,
}

// ============================================================================
// Build context and plan
// ============================================================================

/// Per-request build context.
///
/// Pure immutable data assembled once per call and passed explicitly;
/// never persisted, never shared as ambient state.
#[derive(Debug, Clone, Copy)]
pub struct BuildCtx {
    /// Destination chain id.
    pub dst_chain_id: U256,
    /// Base (gas) token on the source chain.
    pub base_token_src: Address,
    /// Base (gas) token on the destination chain.
    pub base_token_dst: Address,
    /// Asset router that carries token transfer payloads.
    pub asset_router: Address,
    /// Vault that locks/mints bridged token value; approval spender.
    pub native_token_vault: Address,
}

/// One call of a bundle, in wire-encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStarter {
    /// Interoperable-address-encoded target.
    pub to: Bytes,
    /// Call payload (empty for plain value transfers).
    pub data: Bytes,
    /// Call-level attributes (selector-tagged).
    pub call_attributes: Vec<Bytes>,
}

/// An ERC-20 approval the caller must place before sending the bundle.
///
/// Aggregated per unique token across actions; recomputed on every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalNeed {
    /// Token contract to approve on.
    pub token: Address,
    /// Spender (the native token vault).
    pub spender: Address,
    /// Total amount across all actions on this token.
    pub amount: U256,
}

/// Quote totals derived from the action set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    /// Sum of native value carried by the bundle.
    pub total_action_value: U256,
    /// Sum of ERC-20 amounts bridged through the asset router.
    pub bridged_token_total: U256,
}

/// A fully built transaction plan for one bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundlePlan {
    /// Interoperable-address-encoded destination chain.
    pub dst_chain: Bytes,
    /// Wire-encoded calls, in action order.
    pub starters: Vec<CallStarter>,
    /// Bundle-level attributes, passed through unchanged.
    pub bundle_attributes: Vec<Bytes>,
    /// ERC-20 approvals required before submission.
    pub approvals: Vec<ApprovalNeed>,
    /// Quote totals for the caller.
    pub quote: QuoteTotals,
}

// ============================================================================
// Finalization lifecycle
// ============================================================================

/// Bundle identifiers, enriched lazily from a bare source tx hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInteropIds {
    /// Source-chain transaction that sent the bundle.
    pub l2_src_tx_hash: Option<B256>,
    /// Bundle hash from the bundle-sent event.
    pub bundle_hash: Option<B256>,
    /// Destination chain id from the bundle-sent event.
    pub dst_chain_id: Option<U256>,
    /// Destination execution transaction, once known.
    pub dst_exec_tx_hash: Option<B256>,
}

impl ResolvedInteropIds {
    /// Start from a bare source transaction hash.
    pub fn from_tx_hash(tx_hash: B256) -> Self {
        Self {
            l2_src_tx_hash: Some(tx_hash),
            ..Default::default()
        }
    }

    /// True once both the bundle hash and destination chain are known.
    pub fn is_resolved(&self) -> bool {
        self.bundle_hash.is_some() && self.dst_chain_id.is_some()
    }
}

/// Lifecycle phase of a bundle.
///
/// Precedence is the declaration order: the most advanced phase observed in
/// destination logs wins, and the lifecycle never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteropPhase {
    /// No identifiers known yet.
    Unknown,
    /// Bundle dispatched on the source chain.
    Sent,
    /// Inclusion verified on the destination chain.
    Verified,
    /// Executed on the destination chain (terminal).
    Executed,
    /// Unbundled on the destination chain (terminal).
    Unbundled,
}

impl InteropPhase {
    /// Lowercase phase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteropPhase::Unknown => "unknown",
            InteropPhase::Sent => "sent",
            InteropPhase::Verified => "verified",
            InteropPhase::Executed => "executed",
            InteropPhase::Unbundled => "unbundled",
        }
    }

    /// True for phases from which no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InteropPhase::Executed | InteropPhase::Unbundled)
    }
}

impl fmt::Display for InteropPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observed status of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteropStatus {
    /// Current lifecycle phase.
    pub phase: InteropPhase,
    /// Identifiers known at derivation time.
    pub ids: ResolvedInteropIds,
}

// ============================================================================
// Finalization inputs
// ============================================================================

/// Root the destination chain must expose before execution is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedInteropRoot {
    /// Chain whose batch root is being awaited (the source chain).
    pub root_chain_id: U256,
    /// Batch the bundle message was included in.
    pub batch_number: U256,
    /// Root value the destination must store for that slot.
    pub expected_root: B256,
}

/// The L2->L1 message the proof covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMessage {
    /// Position of the sending transaction within its batch (u16 on the wire).
    pub tx_number_in_batch: u16,
    /// Contract that emitted the message (the interop center).
    pub sender: Address,
    /// Raw message bytes, identifier prefix included.
    pub data: Bytes,
}

/// Merkle inclusion proof for a cross-chain message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInclusionProof {
    /// Source chain id.
    pub chain_id: U256,
    /// Batch the message was included in.
    pub l1_batch_number: U256,
    /// Index of the message within the batch.
    pub l2_message_index: u64,
    /// The message itself.
    pub message: ProofMessage,
    /// Merkle path.
    pub proof: Vec<B256>,
}

/// Everything required to execute a bundle on the destination chain.
///
/// Safe to re-derive at any time: derivation is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteropFinalizationInfo {
    /// Source-chain transaction that sent the bundle.
    pub l2_src_tx_hash: B256,
    /// Bundle hash.
    pub bundle_hash: B256,
    /// Destination chain id.
    pub dst_chain_id: U256,
    /// Root the destination must expose.
    pub expected_root: ExpectedInteropRoot,
    /// Inclusion proof for the bundle message.
    pub proof: MessageInclusionProof,
    /// Opaque bundle payload (identifier prefix stripped).
    pub encoded_data: Bytes,
}

/// Polling parameters for finalization waits.
///
/// One absolute deadline (`timeout`) covers every polling stage; the
/// interval is fixed, not exponential.
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Fixed interval between polls.
    pub poll: Duration,
    /// Absolute deadline across all stages.
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(1_000),
            timeout: Duration::from_millis(300_000),
        }
    }
}

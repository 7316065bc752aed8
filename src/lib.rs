//! Interop-RS: Cross-Chain Bundle Core
//!
//! This crate is the interoperability core of a multi-chain SDK. Callers
//! submit a set of heterogeneous actions (native transfer, token transfer,
//! contract call) for execution on another chain; the crate selects a
//! bridging route, encodes the bundle in the canonical interoperable-address
//! wire format, produces a transaction plan with any required token
//! approvals, and tracks the bundle through its proof-gated finalization
//! lifecycle to execution on the destination chain.
//!
//! - **Address Codec** - canonical interoperable encoding of chains and addresses
//! - **Attributes** - selector-tagged bundle/call parameters
//! - **Route / Bundle** - direct-vs-indirect route selection and plan construction
//! - **Finalization** - status derivation, proof waiting, idempotent execution
//! - **EVM Client** - alloy-backed implementation of the chain client trait
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! interop-rs = { path = "../interop-rs" }
//! ```
//!
//! Chain access is injected through [`client::ChainClient`] and time through
//! [`clock::Clock`], so the core is testable without RPC endpoints or real
//! delays.

pub mod address_codec;
pub mod attributes;
pub mod bundle;
pub mod client;
pub mod clock;
pub mod config;
pub mod contracts;
pub mod error;
pub mod evm;
pub mod finalize;
pub mod interop;
pub mod route;
pub mod types;

// Re-export commonly used items at the crate root
pub use address_codec::{format_address, format_chain};
pub use attributes::{
    decode_attribute, execution_address, indirect_call, interop_call_value, unbundler_address,
    DecodedAttribute,
};
pub use bundle::{build_bundle, quote_totals};
pub use client::{ChainClient, ExtendedReceipt, L2ToL1Log, LogEntry, LogProof, SubmittedTx, TxReceipt};
pub use clock::{Clock, TokioClock};
pub use config::InteropConfig;
pub use error::{InteropError, Result};
pub use evm::EvmChainClient;
pub use finalize::{ExecutionHandle, FinalizationService};
pub use interop::InteropClient;
pub use route::{pick_route, preflight, Route};
pub use types::{
    ApprovalNeed, BuildCtx, BundlePlan, CallStarter, ExecutionOptions, InteropAction,
    InteropFinalizationInfo, InteropParams, InteropPhase, InteropStatus, MessageInclusionProof,
    ProofMessage, QuoteTotals, ResolvedInteropIds, UnbundlingOptions, WaitOptions,
};

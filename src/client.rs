//! Chain client abstraction
//!
//! The core never talks to an RPC library directly: it consumes this trait,
//! injected per chain. The production implementation lives in [`crate::evm`];
//! tests drive the core with scripted mocks.
//!
//! Methods return `eyre::Result` so implementations can attach whatever
//! context they have; the core maps failures into the
//! [`crate::error::InteropError`] taxonomy with the stage they occurred in.

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use eyre::Result;

/// A single log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: Address,
    /// Transaction the log was emitted in.
    pub tx_hash: B256,
    /// Topics (topic 0 is the event signature hash).
    pub topics: Vec<B256>,
    /// Non-indexed data.
    pub data: Bytes,
}

/// Transaction receipt, plain form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub tx_index: u64,
    /// False when the transaction reverted.
    pub success: bool,
    pub logs: Vec<LogEntry>,
}

/// One L2->L1 system log attached to a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L2ToL1Log {
    /// Emitting system contract (the messenger for user messages).
    pub sender: Address,
    pub key: B256,
    /// For messenger entries, the keccak hash of the message bytes.
    pub value: B256,
}

/// Receipt extended with the ordered L2->L1 log list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedReceipt {
    pub receipt: TxReceipt,
    /// L2->L1 logs in emission order; message indices derive from this.
    pub l2_to_l1_logs: Vec<L2ToL1Log>,
}

/// Inclusion proof for one L2->L1 log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogProof {
    /// Batch root the proof commits to.
    pub root: B256,
    /// Batch containing the log.
    pub batch_number: U256,
    /// Message index within the batch.
    pub id: u64,
    /// Merkle path.
    pub proof: Vec<B256>,
}

/// Handle for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedTx {
    pub tx_hash: B256,
}

/// RPC surface the interop core needs from one chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Receipt for a transaction, `None` while unmined.
    async fn get_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>>;

    /// Receipt extended with L2->L1 logs, `None` while unmined.
    async fn get_receipt_with_l2_to_l1(&self, tx_hash: B256) -> Result<Option<ExtendedReceipt>>;

    /// Logs from `address` matching `topic0` (and `topic1` when given),
    /// over the full chain history.
    async fn get_logs(
        &self,
        address: Address,
        topic0: B256,
        topic1: Option<B256>,
    ) -> Result<Vec<LogEntry>>;

    /// Inclusion proof for the L2->L1 log at `index` of `tx_hash`.
    ///
    /// Implementations surface "proof not produced yet" as an error whose
    /// text matches [`crate::error::is_proof_pending`].
    async fn get_log_proof(&self, tx_hash: B256, index: u64) -> Result<LogProof>;

    /// Settled root for `(chain_id, batch_number)` in the root storage
    /// contract; zero while pending.
    async fn read_interop_root(
        &self,
        storage: Address,
        chain_id: U256,
        batch_number: U256,
    ) -> Result<B256>;

    /// Sign and submit a transaction.
    async fn submit(&self, to: Address, calldata: Bytes, value: U256) -> Result<SubmittedTx>;
}

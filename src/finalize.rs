//! Bundle finalization state machine
//!
//! Drives a bundle from dispatch on the source chain to execution on the
//! destination: status derivation from lifecycle logs, proof-gated waiting
//! under one shared absolute deadline, and idempotent execution.
//!
//! Lifecycle: `Unknown -> Sent -> Verified -> {Executed | Unbundled}`.
//! Status never regresses; the most advanced phase observed in destination
//! logs wins. `derive_status` and `wait_for_finalization` are read-only;
//! `execute_bundle` pre-checks the destination lifecycle, but exactly-once
//! execution is ultimately guaranteed by the destination contract itself.

use crate::client::{ChainClient, ExtendedReceipt, LogEntry, TxReceipt};
use crate::clock::Clock;
use crate::config::InteropConfig;
use crate::contracts::{
    self, bundle_sent_topic, l1_message_sent_topic, lifecycle_topics, BundleSent,
    BUNDLE_IDENTIFIER,
};
use crate::error::{is_proof_pending, InteropError, Result};
use crate::types::{
    ExpectedInteropRoot, InteropFinalizationInfo, InteropPhase, InteropStatus,
    MessageInclusionProof, ProofMessage, ResolvedInteropIds, WaitOptions,
};
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Finalization service for one source/destination chain pair.
pub struct FinalizationService {
    src: Arc<dyn ChainClient>,
    dst: Arc<dyn ChainClient>,
    clock: Arc<dyn Clock>,
    cfg: InteropConfig,
}

impl FinalizationService {
    pub fn new(
        src: Arc<dyn ChainClient>,
        dst: Arc<dyn ChainClient>,
        clock: Arc<dyn Clock>,
        cfg: InteropConfig,
    ) -> Self {
        Self {
            src,
            dst,
            clock,
            cfg,
        }
    }

    pub fn config(&self) -> &InteropConfig {
        &self.cfg
    }

    // ========================================================================
    // Status derivation
    // ========================================================================

    /// Enrich bare identifiers from the source chain.
    ///
    /// With the bundle hash and destination chain already known this is a
    /// no-op; otherwise the source receipt must exist and contain exactly
    /// one bundle-sent log.
    pub async fn resolve_ids(&self, ids: &ResolvedInteropIds) -> Result<ResolvedInteropIds> {
        if ids.is_resolved() {
            return Ok(*ids);
        }
        let tx_hash = ids.l2_src_tx_hash.ok_or_else(|| {
            InteropError::state("cannot resolve bundle: no source tx hash and no bundle hash")
        })?;

        let receipt = self
            .src
            .get_receipt(tx_hash)
            .await
            .map_err(|e| InteropError::rpc("source receipt", e))?
            .ok_or_else(|| {
                InteropError::state(format!("source receipt {tx_hash} not found"))
            })?;

        let sent = locate_bundle_sent(&receipt.logs, self.cfg.interop_center)?;
        debug!(
            tx_hash = %tx_hash,
            bundle_hash = %sent.bundle_hash,
            dst_chain_id = %sent.destination_chain_id,
            "resolved bundle identifiers"
        );

        Ok(ResolvedInteropIds {
            l2_src_tx_hash: Some(tx_hash),
            bundle_hash: Some(sent.bundle_hash),
            dst_chain_id: Some(sent.destination_chain_id),
            dst_exec_tx_hash: ids.dst_exec_tx_hash,
        })
    }

    /// Derive the current lifecycle status of a bundle.
    pub async fn derive_status(&self, ids: &ResolvedInteropIds) -> Result<InteropStatus> {
        if ids.l2_src_tx_hash.is_none() && !ids.is_resolved() {
            return Ok(InteropStatus {
                phase: InteropPhase::Unknown,
                ids: *ids,
            });
        }

        let resolved = self.resolve_ids(ids).await?;
        let bundle_hash = resolved
            .bundle_hash
            .ok_or_else(|| InteropError::state("bundle hash missing after resolution"))?;

        match self.destination_phase(bundle_hash).await? {
            Some((phase, log_tx_hash)) => Ok(InteropStatus {
                phase,
                ids: ResolvedInteropIds {
                    dst_exec_tx_hash: if phase.is_terminal() {
                        Some(log_tx_hash)
                    } else {
                        resolved.dst_exec_tx_hash
                    },
                    ..resolved
                },
            }),
            None => Ok(InteropStatus {
                phase: InteropPhase::Sent,
                ids: resolved,
            }),
        }
    }

    /// Most advanced lifecycle phase recorded on the destination, if any,
    /// together with the transaction that emitted it.
    ///
    /// Queries in precedence order and returns the first hit. At most one of
    /// Executed/Unbundled can exist per bundle; that is a destination
    /// contract invariant this client assumes rather than re-verifies.
    async fn destination_phase(&self, bundle_hash: B256) -> Result<Option<(InteropPhase, B256)>> {
        for (phase, topic) in lifecycle_topics() {
            let logs = self
                .dst
                .get_logs(self.cfg.interop_handler, topic, Some(bundle_hash))
                .await
                .map_err(|e| InteropError::rpc("destination lifecycle logs", e))?;
            if let Some(log) = logs.first() {
                debug!(bundle_hash = %bundle_hash, phase = %phase, "destination lifecycle hit");
                return Ok(Some((phase, log.tx_hash)));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Finalization wait
    // ========================================================================

    /// Wait until the bundle is executable on the destination chain.
    ///
    /// Four polling stages share one absolute deadline: the source receipt,
    /// the inclusion proof, and the destination root; the message parse in
    /// between is synchronous. Only "not mined yet", "proof not produced
    /// yet", and "root still zero" are retried; everything else propagates
    /// immediately.
    pub async fn wait_for_finalization(
        &self,
        ids: &ResolvedInteropIds,
        opts: &WaitOptions,
    ) -> Result<InteropFinalizationInfo> {
        let tx_hash = ids.l2_src_tx_hash.ok_or_else(|| {
            InteropError::state("cannot finalize: no source transaction hash")
        })?;
        let deadline = Deadline::start(self.clock.as_ref(), opts.timeout);

        // Stage 1: source receipt with L2->L1 log ordering.
        let extended = loop {
            match self.src.get_receipt_with_l2_to_l1(tx_hash).await {
                Ok(Some(receipt)) => break receipt,
                Ok(None) => {
                    debug!(tx_hash = %tx_hash, "source transaction not mined yet");
                    deadline.pause("source receipt", opts.poll).await?;
                }
                Err(e) => return Err(InteropError::rpc("source receipt", e)),
            }
        };

        let sent = locate_bundle_sent(&extended.receipt.logs, self.cfg.interop_center)?;

        // Stage 2: the bundle message and its position among L2->L1 logs.
        let (message, message_index) =
            locate_bundle_message(&extended, self.cfg.l1_messenger, self.cfg.interop_center)?;
        let encoded_data = Bytes::from(message[1..].to_vec());

        // Stage 3: inclusion proof; only "not yet produced" is retried.
        let log_proof = loop {
            match self.src.get_log_proof(tx_hash, message_index).await {
                Ok(proof) => break proof,
                Err(e) if is_proof_pending(&format!("{e:#}")) => {
                    debug!(tx_hash = %tx_hash, index = message_index, "inclusion proof pending");
                    deadline.pause("inclusion proof", opts.poll).await?;
                }
                Err(e) => return Err(InteropError::rpc("inclusion proof", e)),
            }
        };

        // Stage 4: destination root for (source chain, batch).
        loop {
            let root = self
                .dst
                .read_interop_root(
                    self.cfg.interop_root_storage,
                    sent.source_chain_id,
                    log_proof.batch_number,
                )
                .await
                .map_err(|e| InteropError::rpc("interop root", e))?;

            if root == log_proof.root {
                break;
            }
            if root != B256::ZERO {
                // A different batch finalized at this slot: protocol
                // invariant violated, retrying cannot help.
                return Err(InteropError::state(format!(
                    "interop root mismatch for chain {} batch {}: expected {}, found {}",
                    sent.source_chain_id, log_proof.batch_number, log_proof.root, root
                )));
            }
            debug!(
                chain_id = %sent.source_chain_id,
                batch = %log_proof.batch_number,
                "interop root not settled yet"
            );
            deadline.pause("interop root", opts.poll).await?;
        }

        info!(
            bundle_hash = %sent.bundle_hash,
            batch = %log_proof.batch_number,
            message_index = log_proof.id,
            "bundle finalized and executable"
        );

        Ok(InteropFinalizationInfo {
            l2_src_tx_hash: tx_hash,
            bundle_hash: sent.bundle_hash,
            dst_chain_id: sent.destination_chain_id,
            expected_root: ExpectedInteropRoot {
                root_chain_id: sent.source_chain_id,
                batch_number: log_proof.batch_number,
                expected_root: log_proof.root,
            },
            proof: MessageInclusionProof {
                chain_id: sent.source_chain_id,
                l1_batch_number: log_proof.batch_number,
                l2_message_index: log_proof.id,
                message: ProofMessage {
                    tx_number_in_batch: u16::try_from(extended.receipt.tx_index).map_err(
                        |_| {
                            InteropError::state(format!(
                                "transaction index {} exceeds the u16 wire field",
                                extended.receipt.tx_index
                            ))
                        },
                    )?,
                    sender: self.cfg.interop_center,
                    data: message,
                },
                proof: log_proof.proof,
            },
            encoded_data,
        })
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Submit the bundle for execution on the destination chain.
    ///
    /// Refuses when the destination already records a terminal phase. The
    /// check is check-then-act: a racing executor surfaces here as a state
    /// error or as a contract revert from [`ExecutionHandle::wait`].
    pub async fn execute_bundle(
        &self,
        info: &InteropFinalizationInfo,
    ) -> Result<ExecutionHandle<'_>> {
        if let Some((phase, _)) = self.destination_phase(info.bundle_hash).await? {
            if phase.is_terminal() {
                return Err(InteropError::state(format!(
                    "bundle {} already {} on chain {}",
                    info.bundle_hash, phase, info.dst_chain_id
                )));
            }
        }

        let calldata = contracts::encode_execute_bundle(&info.encoded_data, &info.proof);
        let submitted = self
            .dst
            .submit(self.cfg.interop_handler, calldata, U256::ZERO)
            .await
            .map_err(|e| InteropError::rpc("execute submission", e))?;

        info!(
            bundle_hash = %info.bundle_hash,
            tx_hash = %submitted.tx_hash,
            "submitted bundle execution"
        );

        Ok(ExecutionHandle {
            service: self,
            tx_hash: submitted.tx_hash,
        })
    }
}

/// Handle for a submitted execution transaction.
pub struct ExecutionHandle<'a> {
    service: &'a FinalizationService,
    /// Destination execution transaction hash.
    pub tx_hash: B256,
}

impl std::fmt::Debug for ExecutionHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

impl ExecutionHandle<'_> {
    /// Wait for the execution receipt; resolves only on success.
    pub async fn wait(&self, opts: &WaitOptions) -> Result<TxReceipt> {
        let deadline = Deadline::start(self.service.clock.as_ref(), opts.timeout);
        loop {
            match self.service.dst.get_receipt(self.tx_hash).await {
                Ok(Some(receipt)) => {
                    if receipt.success {
                        return Ok(receipt);
                    }
                    warn!(tx_hash = %self.tx_hash, "bundle execution reverted");
                    return Err(InteropError::execution(format!(
                        "execution transaction {} reverted",
                        self.tx_hash
                    )));
                }
                Ok(None) => deadline.pause("execution receipt", opts.poll).await?,
                Err(e) => return Err(InteropError::rpc("execution receipt", e)),
            }
        }
    }
}

// ============================================================================
// Log location helpers
// ============================================================================

/// Locate and decode the single bundle-sent log from the interop center.
fn locate_bundle_sent(logs: &[LogEntry], center: Address) -> Result<BundleSent> {
    let topic = bundle_sent_topic();
    let mut matches = logs
        .iter()
        .filter(|log| log.address == center && log.topics.first() == Some(&topic));

    let log = matches
        .next()
        .ok_or_else(|| InteropError::state(format!("no bundle-sent log from center {center}")))?;
    if matches.next().is_some() {
        return Err(InteropError::state(format!(
            "multiple bundle-sent logs from center {center} in one receipt"
        )));
    }
    contracts::decode_bundle_sent(&log.topics, &log.data)
}

/// Locate the single bundle message in an extended receipt.
///
/// Only messages whose indexed sender is the interop center qualify; other
/// contracts may emit through the same messenger in the same transaction.
/// Returns the raw message bytes (identifier prefix included) and the
/// message's index among the messenger's L2->L1 logs, recovered by matching
/// the message hash against the log values.
fn locate_bundle_message(
    extended: &ExtendedReceipt,
    messenger: Address,
    center: Address,
) -> Result<(Bytes, u64)> {
    let topic = l1_message_sent_topic();
    let sender_topic = center.into_word();
    let mut matches = extended.receipt.logs.iter().filter(|log| {
        log.address == messenger
            && log.topics.first() == Some(&topic)
            && log.topics.get(1) == Some(&sender_topic)
    });

    let log = matches.next().ok_or_else(|| {
        InteropError::state(format!(
            "no L1-message-sent log from {center} via messenger {messenger}"
        ))
    })?;
    if matches.next().is_some() {
        return Err(InteropError::state(format!(
            "multiple L1-message-sent logs from {center} via messenger {messenger} in one receipt"
        )));
    }

    let message = contracts::decode_l1_message(&log.topics, &log.data)?;
    match message.first() {
        Some(&BUNDLE_IDENTIFIER) => {}
        Some(other) => {
            return Err(InteropError::state(format!(
                "unexpected message identifier byte 0x{other:02x} (expected 0x{BUNDLE_IDENTIFIER:02x})"
            )));
        }
        None => return Err(InteropError::state("empty L2->L1 message")),
    }

    let message_hash = keccak256(&message);
    let index = extended
        .l2_to_l1_logs
        .iter()
        .position(|entry| entry.sender == messenger && entry.value == message_hash)
        .ok_or_else(|| {
            InteropError::state(format!(
                "message hash {message_hash} not present in L2->L1 logs"
            ))
        })?;

    Ok((message, index as u64))
}

// ============================================================================
// Deadline
// ============================================================================

/// One absolute deadline shared by every polling stage of an operation.
struct Deadline<'a> {
    clock: &'a dyn Clock,
    started_at: Duration,
    limit: Duration,
}

impl<'a> Deadline<'a> {
    fn start(clock: &'a dyn Clock, limit: Duration) -> Self {
        Self {
            clock,
            started_at: clock.now(),
            limit,
        }
    }

    /// Sleep one poll interval, or fail if that would cross the deadline.
    async fn pause(&self, stage: &'static str, poll: Duration) -> Result<()> {
        let elapsed = self.clock.now().saturating_sub(self.started_at);
        if elapsed + poll > self.limit {
            return Err(InteropError::Timeout { stage, elapsed });
        }
        self.clock.sleep(poll).await;
        Ok(())
    }
}

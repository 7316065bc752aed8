//! Interop client facade
//!
//! Thin orchestration over the core components: quote a request, prepare a
//! transaction plan, dispatch it, and track the sent bundle through
//! finalization and execution. Holds no mutable state; the per-request build context is
//! assembled fresh on every call.

use crate::attributes::{execution_address, unbundler_address};
use crate::bundle::{build_bundle, quote_totals};
use crate::client::ChainClient;
use crate::clock::Clock;
use crate::contracts::{encode_approve, encode_send_bundle};
use crate::error::{InteropError, Result};
use crate::finalize::{ExecutionHandle, FinalizationService};
use crate::route::{pick_route, preflight, Route};
use crate::types::{
    ApprovalNeed, BundlePlan, InteropFinalizationInfo, InteropParams, InteropStatus, QuoteTotals,
    ResolvedInteropIds, WaitOptions,
};
use crate::{address_codec, config::InteropConfig};
use alloy::primitives::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

/// High-level client for one source/destination chain pair.
pub struct InteropClient {
    src: Arc<dyn ChainClient>,
    finalization: FinalizationService,
}

impl InteropClient {
    pub fn new(
        src: Arc<dyn ChainClient>,
        dst: Arc<dyn ChainClient>,
        clock: Arc<dyn Clock>,
        cfg: InteropConfig,
    ) -> Self {
        Self {
            src: src.clone(),
            finalization: FinalizationService::new(src, dst, clock, cfg),
        }
    }

    /// The underlying finalization service.
    pub fn finalization(&self) -> &FinalizationService {
        &self.finalization
    }

    fn cfg(&self) -> &InteropConfig {
        self.finalization.config()
    }

    /// Route selection for a request, after preflight validation.
    pub fn plan_route(&self, params: &InteropParams) -> Result<Route> {
        let ctx = self.cfg().build_ctx(params.dst_chain_id);
        let route = pick_route(&params.actions, &ctx);
        preflight(route, params, &ctx)?;
        Ok(route)
    }

    /// Quote totals for a request without building the full plan.
    pub fn quote(&self, params: &InteropParams) -> Result<QuoteTotals> {
        self.plan_route(params)?;
        quote_totals(&params.actions)
    }

    /// Build the full transaction plan.
    ///
    /// `per_action_payloads` carries the externally resolved asset-router
    /// transfer payload per action (empty slice is fine for the direct
    /// route).
    pub fn prepare(
        &self,
        params: &InteropParams,
        per_action_payloads: &[Option<Bytes>],
    ) -> Result<BundlePlan> {
        let ctx = self.cfg().build_ctx(params.dst_chain_id);
        let route = pick_route(&params.actions, &ctx);
        preflight(route, params, &ctx)?;

        let mut bundle_attributes = Vec::new();
        if let Some(execution) = &params.execution {
            bundle_attributes.push(execution_address(address_codec::format_address(
                execution.only,
            )));
        }
        if let Some(unbundling) = &params.unbundling {
            bundle_attributes.push(unbundler_address(address_codec::format_address(
                unbundling.by,
            )));
        }

        debug!(
            route = %route,
            dst_chain_id = %params.dst_chain_id,
            bundle_attributes = bundle_attributes.len(),
            "preparing bundle plan"
        );
        build_bundle(route, params, &ctx, bundle_attributes, per_action_payloads)
    }

    /// Dispatch a built plan to the interop center on the source chain.
    ///
    /// Carries the plan's total action value as transaction value; the
    /// plan's approvals must be placed first. The returned identifiers seed
    /// status derivation and finalization.
    pub async fn create(&self, plan: &BundlePlan) -> Result<ResolvedInteropIds> {
        let calldata = encode_send_bundle(plan);
        let submitted = self
            .src
            .submit(
                self.cfg().interop_center,
                calldata,
                plan.quote.total_action_value,
            )
            .await
            .map_err(|e| InteropError::rpc("bundle submission", e))?;

        info!(
            tx_hash = %submitted.tx_hash,
            value = %plan.quote.total_action_value,
            "dispatched bundle"
        );
        Ok(ResolvedInteropIds::from_tx_hash(submitted.tx_hash))
    }

    /// Calldata for one approval of a plan, ready to submit to the token.
    pub fn approval_calldata(&self, approval: &ApprovalNeed) -> Bytes {
        encode_approve(approval.spender, approval.amount)
    }

    /// Current lifecycle status of a bundle.
    pub async fn status(&self, ids: &ResolvedInteropIds) -> Result<InteropStatus> {
        self.finalization.derive_status(ids).await
    }

    /// Wait until a bundle is executable, using the configured intervals.
    pub async fn wait_for_finalization(
        &self,
        ids: &ResolvedInteropIds,
    ) -> Result<InteropFinalizationInfo> {
        let opts = self.cfg().wait_options();
        self.finalization.wait_for_finalization(ids, &opts).await
    }

    /// Wait with caller-supplied intervals.
    pub async fn wait_for_finalization_with(
        &self,
        ids: &ResolvedInteropIds,
        opts: &WaitOptions,
    ) -> Result<InteropFinalizationInfo> {
        self.finalization.wait_for_finalization(ids, opts).await
    }

    /// Execute a finalized bundle on the destination chain.
    pub async fn execute(
        &self,
        info: &InteropFinalizationInfo,
    ) -> Result<ExecutionHandle<'_>> {
        self.finalization.execute_bundle(info).await
    }
}

//! Planning tests driven through the high-level client: route selection,
//! quoting, plan construction, and approval calldata.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use interop_rs::client::{
    ChainClient, ExtendedReceipt, LogEntry, LogProof, SubmittedTx, TxReceipt,
};
use interop_rs::types::{ExecutionOptions, UnbundlingOptions};
use interop_rs::{
    decode_attribute, format_address, format_chain, InteropAction, InteropClient, InteropConfig,
    InteropError, InteropParams, Route, TokioClock,
};
use std::sync::Arc;

const BASE_TOKEN: Address = Address::repeat_byte(0x8A);
const OTHER_BASE: Address = Address::repeat_byte(0x8B);
const TOKEN: Address = Address::repeat_byte(0xEE);
const RECIPIENT: Address = Address::repeat_byte(0xAA);
const EXECUTOR: Address = Address::repeat_byte(0xE1);

/// Chain client that answers nothing; planning never touches a chain.
struct NullChain;

#[async_trait]
impl ChainClient for NullChain {
    async fn get_receipt(&self, _tx_hash: B256) -> eyre::Result<Option<TxReceipt>> {
        Ok(None)
    }

    async fn get_receipt_with_l2_to_l1(
        &self,
        _tx_hash: B256,
    ) -> eyre::Result<Option<ExtendedReceipt>> {
        Ok(None)
    }

    async fn get_logs(
        &self,
        _address: Address,
        _topic0: B256,
        _topic1: Option<B256>,
    ) -> eyre::Result<Vec<LogEntry>> {
        Ok(vec![])
    }

    async fn get_log_proof(&self, _tx_hash: B256, _index: u64) -> eyre::Result<LogProof> {
        Err(eyre::eyre!("proof not found"))
    }

    async fn read_interop_root(
        &self,
        _storage: Address,
        _chain_id: U256,
        _batch_number: U256,
    ) -> eyre::Result<B256> {
        Ok(B256::ZERO)
    }

    async fn submit(
        &self,
        _to: Address,
        _calldata: Bytes,
        _value: U256,
    ) -> eyre::Result<SubmittedTx> {
        Err(eyre::eyre!("no signer"))
    }
}

fn client(base_src: Address, base_dst: Address) -> InteropClient {
    let cfg = InteropConfig {
        interop_center: Address::repeat_byte(0x08),
        interop_handler: Address::repeat_byte(0x09),
        interop_root_storage: Address::repeat_byte(0x0A),
        l1_messenger: Address::repeat_byte(0x88),
        asset_router: Address::repeat_byte(0x03),
        native_token_vault: Address::repeat_byte(0x04),
        base_token_src: base_src,
        base_token_dst: base_dst,
        poll_ms: 1_000,
        timeout_ms: 10_000,
    };
    InteropClient::new(
        Arc::new(NullChain),
        Arc::new(NullChain),
        Arc::new(TokioClock::new()),
        cfg,
    )
}

fn params(actions: Vec<InteropAction>) -> InteropParams {
    InteropParams {
        dst_chain_id: U256::from(260u64),
        actions,
        execution: None,
        unbundling: None,
        sender: None,
    }
}

fn native(amount: u64) -> InteropAction {
    InteropAction::SendNative {
        to: RECIPIENT,
        amount: U256::from(amount),
    }
}

fn erc20(amount: u64) -> InteropAction {
    InteropAction::SendErc20 {
        token: TOKEN,
        to: RECIPIENT,
        amount: U256::from(amount),
    }
}

#[test]
fn plan_route_direct_for_native_only() {
    let client = client(BASE_TOKEN, BASE_TOKEN);
    let route = client.plan_route(&params(vec![native(10)])).unwrap();
    assert_eq!(route, Route::Direct);
}

#[test]
fn plan_route_indirect_for_erc20() {
    let client = client(BASE_TOKEN, BASE_TOKEN);
    let route = client.plan_route(&params(vec![erc20(10)])).unwrap();
    assert_eq!(route, Route::Indirect);
}

#[test]
fn plan_route_indirect_for_base_mismatch() {
    let client = client(BASE_TOKEN, OTHER_BASE);
    let route = client.plan_route(&params(vec![native(10)])).unwrap();
    assert_eq!(route, Route::Indirect);
}

#[test]
fn plan_route_rejects_empty_bundle() {
    let client = client(BASE_TOKEN, BASE_TOKEN);
    let err = client.plan_route(&params(vec![])).unwrap_err();
    assert!(matches!(err, InteropError::Validation(_)));
}

#[test]
fn quote_sums_native_and_bridged_value() {
    let client = client(BASE_TOKEN, BASE_TOKEN);
    let totals = client
        .quote(&params(vec![
            native(10),
            InteropAction::Call {
                to: RECIPIENT,
                data: None,
                value: Some(U256::from(5)),
            },
            erc20(100),
        ]))
        .unwrap();
    assert_eq!(totals.total_action_value, U256::from(15));
    assert_eq!(totals.bridged_token_total, U256::from(100));
}

#[test]
fn prepare_direct_plan_carries_encoded_destination() {
    let client = client(BASE_TOKEN, BASE_TOKEN);
    let plan = client.prepare(&params(vec![native(10)]), &[]).unwrap();

    assert_eq!(
        plan.dst_chain,
        Bytes::from(format_chain(U256::from(260u64)).unwrap())
    );
    assert_eq!(plan.starters.len(), 1);
    assert!(plan.approvals.is_empty());
    assert!(plan.bundle_attributes.is_empty());
}

#[test]
fn prepare_attaches_execution_and_unbundling_attributes() {
    let client = client(BASE_TOKEN, BASE_TOKEN);
    let mut request = params(vec![native(10)]);
    request.execution = Some(ExecutionOptions { only: EXECUTOR });
    request.unbundling = Some(UnbundlingOptions { by: RECIPIENT });

    let plan = client.prepare(&request, &[]).unwrap();
    assert_eq!(plan.bundle_attributes.len(), 2);

    let execution = decode_attribute(&plan.bundle_attributes[0]);
    assert_eq!(execution.name, "executionAddress");
    assert_eq!(
        execution.args[0],
        format!("0x{}", hex::encode(format_address(EXECUTOR)))
    );

    let unbundling = decode_attribute(&plan.bundle_attributes[1]);
    assert_eq!(unbundling.name, "unbundlerAddress");
}

#[test]
fn prepare_indirect_plan_yields_aggregated_approval() {
    let client = client(BASE_TOKEN, BASE_TOKEN);
    let payload = || Some(Bytes::from(vec![0x01, 0xAB]));
    let plan = client
        .prepare(&params(vec![erc20(7), erc20(11)]), &[payload(), payload()])
        .unwrap();

    assert_eq!(plan.approvals.len(), 1);
    let approval = plan.approvals[0];
    assert_eq!(approval.token, TOKEN);
    assert_eq!(approval.amount, U256::from(18));

    let calldata = client.approval_calldata(&approval);
    assert_eq!(&calldata[..4], interop_rs::contracts::ERC20::approveCall::SELECTOR);
}

#[test]
fn prepare_rejects_erc20_without_payload() {
    let client = client(BASE_TOKEN, BASE_TOKEN);
    let err = client
        .prepare(&params(vec![erc20(7)]), &[None])
        .unwrap_err();
    assert!(err.to_string().contains("payload"));
}

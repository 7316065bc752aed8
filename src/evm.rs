//! EVM-backed chain client
//!
//! Production [`ChainClient`] over an alloy HTTP provider. Receipts, logs,
//! root reads, and submission go through alloy; the proof and extended
//! receipt methods are not part of the standard provider surface, so they go
//! over raw JSON-RPC.

use crate::client::{
    ChainClient, ExtendedReceipt, L2ToL1Log, LogEntry, LogProof, SubmittedTx, TxReceipt,
};
use crate::contracts::InteropRootStorage;
use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, TxKind, B256, U256},
    providers::{
        fillers::{FillProvider, JoinFill, WalletFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::{Filter, TransactionInput, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info};

#[allow(clippy::type_complexity)]
type SignerProvider = FillProvider<
    JoinFill<Identity, WalletFiller<EthereumWallet>>,
    RootProvider<Http<Client>>,
    Http<Client>,
    Ethereum,
>;

/// Chain client backed by an alloy HTTP provider.
pub struct EvmChainClient {
    provider: RootProvider<Http<Client>>,
    signer: Option<SignerProvider>,
    http: reqwest::Client,
    rpc_url: String,
}

impl EvmChainClient {
    /// Create a read-only client.
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL: {}", e))?,
        );
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        info!(rpc_url = %rpc_url, "Created read-only EVM chain client");

        Ok(Self {
            provider,
            signer: None,
            http,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Create a client with signing capabilities.
    pub fn with_signer(rpc_url: &str, private_key: &str) -> Result<Self> {
        let mut client = Self::new(rpc_url)?;

        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| eyre!("Invalid private key: {}", e))?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new().wallet(wallet).on_http(
            rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL: {}", e))?,
        );

        info!(rpc_url = %rpc_url, address = %address, "Created EVM chain client with signer");

        client.signer = Some(provider);
        Ok(client)
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> Result<u64> {
        let chain_id = self.provider.get_chain_id().await?;
        Ok(chain_id)
    }

    /// Perform a raw JSON-RPC call, returning `None` for a null result.
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .json::<RpcResponse<T>>()
            .await?;

        if let Some(error) = response.error {
            return Err(eyre!("RPC error: {} - {}", error.code, error.message));
        }

        Ok(response.result)
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    async fn get_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>> {
        let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? else {
            return Ok(None);
        };

        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| LogEntry {
                address: log.address(),
                tx_hash,
                topics: log.topics().to_vec(),
                data: log.data().data.clone(),
            })
            .collect();

        Ok(Some(TxReceipt {
            tx_hash,
            block_number: receipt.block_number.unwrap_or_default(),
            tx_index: receipt.transaction_index.unwrap_or_default(),
            success: receipt.status(),
            logs,
        }))
    }

    async fn get_receipt_with_l2_to_l1(&self, tx_hash: B256) -> Result<Option<ExtendedReceipt>> {
        let raw: Option<RawExtendedReceipt> = self
            .rpc_call(
                "eth_getTransactionReceipt",
                serde_json::json!([format!("{tx_hash:#x}")]),
            )
            .await?;

        let Some(raw) = raw else { return Ok(None) };
        // Treat a receipt without a block as unmined
        let Some(block_number) = raw.block_number.as_deref() else {
            return Ok(None);
        };

        let logs = raw
            .logs
            .iter()
            .map(|log| -> Result<LogEntry> {
                Ok(LogEntry {
                    address: Address::from_str(&log.address)?,
                    tx_hash,
                    topics: log
                        .topics
                        .iter()
                        .map(|t| Ok(B256::from_str(t)?))
                        .collect::<Result<Vec<_>>>()?,
                    data: Bytes::from_str(&log.data)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let l2_to_l1_logs = raw
            .l2_to_l1_logs
            .iter()
            .map(|log| -> Result<L2ToL1Log> {
                Ok(L2ToL1Log {
                    sender: Address::from_str(&log.sender)?,
                    key: B256::from_str(&log.key)?,
                    value: B256::from_str(&log.value)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(ExtendedReceipt {
            receipt: TxReceipt {
                tx_hash,
                block_number: parse_hex_u64(block_number)?,
                tx_index: raw
                    .transaction_index
                    .as_deref()
                    .map(parse_hex_u64)
                    .transpose()?
                    .unwrap_or_default(),
                success: raw.status.as_deref() != Some("0x0"),
                logs,
            },
            l2_to_l1_logs,
        }))
    }

    async fn get_logs(
        &self,
        address: Address,
        topic0: B256,
        topic1: Option<B256>,
    ) -> Result<Vec<LogEntry>> {
        let mut filter = Filter::new()
            .address(address)
            .event_signature(topic0)
            .from_block(0u64);
        if let Some(topic1) = topic1 {
            filter = filter.topic1(topic1);
        }

        let logs = self.provider.get_logs(&filter).await?;
        debug!(address = %address, count = logs.len(), "fetched logs");

        Ok(logs
            .iter()
            .map(|log| LogEntry {
                address: log.address(),
                tx_hash: log.transaction_hash.unwrap_or_default(),
                topics: log.topics().to_vec(),
                data: log.data().data.clone(),
            })
            .collect())
    }

    async fn get_log_proof(&self, tx_hash: B256, index: u64) -> Result<LogProof> {
        let raw: Option<RawLogProof> = self
            .rpc_call(
                "zks_getL2ToL1LogProof",
                serde_json::json!([format!("{tx_hash:#x}"), index]),
            )
            .await?;

        let raw = raw.ok_or_else(|| {
            eyre!("log proof not yet available for {tx_hash} index {index}")
        })?;

        Ok(LogProof {
            root: B256::from_str(&raw.root)?,
            batch_number: U256::from(raw.batch_number),
            id: raw.id,
            proof: raw
                .proof
                .iter()
                .map(|p| Ok(B256::from_str(p)?))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    async fn read_interop_root(
        &self,
        storage: Address,
        chain_id: U256,
        batch_number: U256,
    ) -> Result<B256> {
        let contract = InteropRootStorage::new(storage, &self.provider);
        let result = contract
            .interopRoots(chain_id, batch_number)
            .call()
            .await
            .map_err(|e| eyre!("Failed to read interop root: {}", e))?;
        Ok(result._0)
    }

    async fn submit(&self, to: Address, calldata: Bytes, value: U256) -> Result<SubmittedTx> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| eyre!("client has no signer; submission requires a private key"))?;

        let request = TransactionRequest {
            to: Some(TxKind::Call(to)),
            input: TransactionInput::new(calldata),
            value: Some(value),
            ..Default::default()
        };

        let pending = signer.send_transaction(request).await?;
        let tx_hash = *pending.tx_hash();
        debug!(to = %to, tx_hash = %tx_hash, "submitted transaction");

        Ok(SubmittedTx { tx_hash })
    }
}

// ============================================================================
// Raw JSON-RPC shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtendedReceipt {
    block_number: Option<String>,
    transaction_index: Option<String>,
    status: Option<String>,
    #[serde(default)]
    logs: Vec<RawLog>,
    #[serde(default)]
    l2_to_l1_logs: Vec<RawL2ToL1Log>,
}

#[derive(Debug, Deserialize)]
struct RawLog {
    address: String,
    topics: Vec<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawL2ToL1Log {
    sender: String,
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLogProof {
    root: String,
    #[serde(alias = "l1BatchNumber")]
    batch_number: u64,
    id: u64,
    proof: Vec<String>,
}

/// Parse a 0x-prefixed hex quantity.
fn parse_hex_u64(hex: &str) -> Result<u64> {
    let value = u64::from_str_radix(hex.trim_start_matches("0x"), 16)?;
    Ok(value)
}

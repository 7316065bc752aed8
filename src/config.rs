//! Interop configuration
//!
//! Contract addresses and polling defaults for one source/destination chain
//! pair. Deserializable so embedding services can load it from their own
//! config layer; every interval has a serde default.

use crate::types::{BuildCtx, WaitOptions};
use alloy::primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default asset router system contract address.
pub const DEFAULT_ASSET_ROUTER: Address = address!("0000000000000000000000000000000000010003");

/// Default native token vault system contract address.
pub const DEFAULT_NATIVE_TOKEN_VAULT: Address =
    address!("0000000000000000000000000000000000010004");

/// Default L1 messenger system contract address.
pub const DEFAULT_L1_MESSENGER: Address = address!("0000000000000000000000000000000000008008");

/// Configuration for one source/destination chain pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteropConfig {
    /// Source-chain bundle dispatch contract.
    pub interop_center: Address,
    /// Destination-chain verification/execution contract.
    pub interop_handler: Address,
    /// Destination-chain root storage contract.
    pub interop_root_storage: Address,
    /// Source-chain L2->L1 messenger.
    #[serde(default = "default_l1_messenger")]
    pub l1_messenger: Address,
    /// Source-chain asset router.
    #[serde(default = "default_asset_router")]
    pub asset_router: Address,
    /// Source-chain native token vault (approval spender).
    #[serde(default = "default_native_token_vault")]
    pub native_token_vault: Address,
    /// Base (gas) token on the source chain.
    pub base_token_src: Address,
    /// Base (gas) token on the destination chain.
    pub base_token_dst: Address,
    /// Fixed polling interval, milliseconds.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
    /// Absolute deadline across all polling stages, milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_asset_router() -> Address {
    DEFAULT_ASSET_ROUTER
}

fn default_native_token_vault() -> Address {
    DEFAULT_NATIVE_TOKEN_VAULT
}

fn default_l1_messenger() -> Address {
    DEFAULT_L1_MESSENGER
}

fn default_poll_ms() -> u64 {
    1_000
}

fn default_timeout_ms() -> u64 {
    300_000
}

impl InteropConfig {
    /// Wait options from the configured intervals.
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            poll: Duration::from_millis(self.poll_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    /// Assemble the per-request build context for one destination chain.
    pub fn build_ctx(&self, dst_chain_id: U256) -> BuildCtx {
        BuildCtx {
            dst_chain_id,
            base_token_src: self.base_token_src,
            base_token_dst: self.base_token_dst,
            asset_router: self.asset_router,
            native_token_vault: self.native_token_vault,
        }
    }
}

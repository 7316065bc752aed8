//! Route selection and preflight validation
//!
//! A bundle travels one of two routes:
//!
//! - **Direct**: native value is forwarded 1:1 to the destination. Possible
//!   only when no token payload is carried and both chains settle gas in the
//!   same base token.
//! - **Indirect**: token transfers (and mismatched-base economics) go
//!   through the asset-router / native-vault path.
//!
//! Preflight is synchronous and side-effect free; every failure is a
//! validation error.

use crate::error::{InteropError, Result};
use crate::types::{BuildCtx, InteropAction, InteropParams};
use alloy::primitives::U256;
use std::fmt;
use tracing::debug;

/// Bridging route for a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Direct,
    Indirect,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Direct => "direct",
            Route::Indirect => "indirect",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Choose the route for an action set.
///
/// Indirect if any action is an ERC-20 transfer or the base tokens differ;
/// direct otherwise. Base tokens are `Address` values, so equality is on
/// bytes and hex casing cannot matter.
pub fn pick_route(actions: &[InteropAction], ctx: &BuildCtx) -> Route {
    let has_erc20 = actions.iter().any(|a| a.is_erc20());
    let base_mismatch = ctx.base_token_src != ctx.base_token_dst;

    let route = if has_erc20 || base_mismatch {
        Route::Indirect
    } else {
        Route::Direct
    };
    debug!(
        route = %route,
        has_erc20,
        base_mismatch,
        actions = actions.len(),
        "picked bridging route"
    );
    route
}

/// Validate `params` against the chosen route. Synchronous, no side effects.
pub fn preflight(route: Route, params: &InteropParams, ctx: &BuildCtx) -> Result<()> {
    if params.actions.is_empty() {
        return Err(InteropError::validation("bundle has no actions"));
    }

    let base_mismatch = ctx.base_token_src != ctx.base_token_dst;
    let has_erc20 = params.actions.iter().any(|a| a.is_erc20());

    match route {
        Route::Direct => {
            if has_erc20 {
                return Err(InteropError::validation(
                    "direct route cannot carry ERC-20 transfers",
                ));
            }
            if base_mismatch {
                return Err(InteropError::validation(format!(
                    "direct route requires matching base tokens (src {}, dst {})",
                    ctx.base_token_src, ctx.base_token_dst
                )));
            }
        }
        Route::Indirect => {
            if !has_erc20 && !base_mismatch {
                return Err(InteropError::validation(
                    "indirect route with no ERC-20 transfers and matching base tokens; use the direct route",
                ));
            }
            if base_mismatch {
                // Native value cannot cross mismatched bases 1:1 on this route
                for action in &params.actions {
                    if let InteropAction::Call { to, value, .. } = action {
                        if value.unwrap_or(U256::ZERO) > U256::ZERO {
                            return Err(InteropError::validation(format!(
                                "call to {to} carries native value but base tokens differ"
                            )));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

//! Bundle plan construction
//!
//! Turns a validated action set into the wire-encoded call starters, the
//! ERC-20 approvals the caller must place first, and the quote totals.
//!
//! Token transfer payloads are precomputed by the caller (asset-identity
//! resolution is external) and consumed here as opaque bytes: any action
//! carrying one routes through the asset router.

use crate::address_codec::{format_address, format_chain};
use crate::attributes::{indirect_call, interop_call_value};
use crate::error::{InteropError, Result};
use crate::route::Route;
use crate::types::{
    ApprovalNeed, BuildCtx, BundlePlan, CallStarter, InteropAction, InteropParams, QuoteTotals,
};
use alloy::primitives::{Bytes, U256};
use std::collections::BTreeMap;
use tracing::debug;

/// Compute quote totals for an action set.
///
/// `total_action_value` sums native transfer amounts and positive call
/// values; `bridged_token_total` sums ERC-20 amounts. Overflow is a
/// validation error, never a wrap.
pub fn quote_totals(actions: &[InteropAction]) -> Result<QuoteTotals> {
    let mut totals = QuoteTotals::default();
    for action in actions {
        totals.total_action_value = totals
            .total_action_value
            .checked_add(action.native_value())
            .ok_or_else(|| InteropError::validation("total action value overflows u256"))?;
        if let InteropAction::SendErc20 { amount, .. } = action {
            totals.bridged_token_total = totals
                .bridged_token_total
                .checked_add(*amount)
                .ok_or_else(|| InteropError::validation("bridged token total overflows u256"))?;
        }
    }
    Ok(totals)
}

/// Build the transaction plan for a bundle.
///
/// `per_action_payloads` aligns with `params.actions`: for the indirect
/// route it carries the precomputed asset-router transfer payload of each
/// action that needs one (mandatory for ERC-20 transfers). The direct route
/// ignores it.
pub fn build_bundle(
    route: Route,
    params: &InteropParams,
    ctx: &BuildCtx,
    bundle_attributes: Vec<Bytes>,
    per_action_payloads: &[Option<Bytes>],
) -> Result<BundlePlan> {
    let starters = match route {
        Route::Direct => params
            .actions
            .iter()
            .map(direct_starter)
            .collect::<Result<Vec<_>>>()?,
        Route::Indirect => {
            if per_action_payloads.len() != params.actions.len() {
                return Err(InteropError::validation(format!(
                    "expected {} per-action payloads, got {}",
                    params.actions.len(),
                    per_action_payloads.len()
                )));
            }
            params
                .actions
                .iter()
                .zip(per_action_payloads)
                .map(|(action, payload)| indirect_starter(action, payload.as_ref(), ctx))
                .collect::<Result<Vec<_>>>()?
        }
    };

    let approvals = match route {
        Route::Direct => Vec::new(),
        Route::Indirect => collect_approvals(&params.actions, ctx)?,
    };

    let quote = quote_totals(&params.actions)?;
    let dst_chain = Bytes::from(format_chain(ctx.dst_chain_id)?);

    debug!(
        route = %route,
        starters = starters.len(),
        approvals = approvals.len(),
        total_action_value = %quote.total_action_value,
        bridged_token_total = %quote.bridged_token_total,
        "built bundle plan"
    );

    Ok(BundlePlan {
        dst_chain,
        starters,
        bundle_attributes,
        approvals,
        quote,
    })
}

/// Starter for the direct route: the target is addressed directly and native
/// value rides as a call attribute.
fn direct_starter(action: &InteropAction) -> Result<CallStarter> {
    match action {
        InteropAction::SendNative { to, amount } => Ok(CallStarter {
            to: format_address(*to).into(),
            data: Bytes::new(),
            call_attributes: vec![interop_call_value(*amount)],
        }),
        InteropAction::Call { to, data, value } => {
            let value = value.unwrap_or(U256::ZERO);
            Ok(CallStarter {
                to: format_address(*to).into(),
                data: data.clone().unwrap_or_default(),
                call_attributes: if value > U256::ZERO {
                    vec![interop_call_value(value)]
                } else {
                    Vec::new()
                },
            })
        }
        InteropAction::SendErc20 { token, .. } => Err(InteropError::validation(format!(
            "ERC-20 transfer of {token} cannot ride the direct route"
        ))),
    }
}

/// Starter for the indirect route: actions with a transfer payload go
/// through the asset router, the rest encode as in the direct case.
fn indirect_starter(
    action: &InteropAction,
    payload: Option<&Bytes>,
    ctx: &BuildCtx,
) -> Result<CallStarter> {
    if let Some(payload) = payload {
        return Ok(CallStarter {
            to: format_address(ctx.asset_router).into(),
            data: payload.clone(),
            call_attributes: vec![indirect_call(U256::ZERO)],
        });
    }
    match action {
        InteropAction::SendErc20 { token, .. } => Err(InteropError::validation(format!(
            "ERC-20 transfer of {token} is missing its asset-router payload"
        ))),
        InteropAction::SendNative { .. } | InteropAction::Call { .. } => direct_starter(action),
    }
}

/// Aggregate approvals per unique token, spender fixed to the vault.
fn collect_approvals(actions: &[InteropAction], ctx: &BuildCtx) -> Result<Vec<ApprovalNeed>> {
    let mut per_token = BTreeMap::new();
    for action in actions {
        if let InteropAction::SendErc20 { token, amount, .. } = action {
            let total: &mut U256 = per_token.entry(*token).or_default();
            *total = total
                .checked_add(*amount)
                .ok_or_else(|| InteropError::validation(format!("approval for {token} overflows u256")))?;
        }
    }
    Ok(per_token
        .into_iter()
        .map(|(token, amount)| ApprovalNeed {
            token,
            spender: ctx.native_token_vault,
            amount,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::decode_attribute;
    use alloy::primitives::{address, Address};

    fn ctx() -> BuildCtx {
        BuildCtx {
            dst_chain_id: U256::from(260u64),
            base_token_src: address!("000000000000000000000000000000000000800A"),
            base_token_dst: address!("000000000000000000000000000000000000800A"),
            asset_router: address!("0000000000000000000000000000000000010003"),
            native_token_vault: address!("0000000000000000000000000000000000010004"),
        }
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

    const TOKEN: Address = address!("00000000000000000000000000000000000000EE");
    const RECIPIENT: Address = address!("00000000000000000000000000000000000000AA");

    fn erc20(amount: u64) -> InteropAction {
        InteropAction::SendErc20 {
            token: TOKEN,
            to: RECIPIENT,
            amount: U256::from(amount),
        }
    }

    #[test]
    fn test_quote_totals_mixed_actions() {
        let actions = vec![
            InteropAction::SendNative {
                to: RECIPIENT,
                amount: U256::from(10),
            },
            InteropAction::Call {
                to: RECIPIENT,
                data: None,
                value: None,
            },
            InteropAction::Call {
                to: RECIPIENT,
                data: None,
                value: Some(U256::from(5)),
            },
            erc20(100),
        ];
        let totals = quote_totals(&actions).unwrap();
        assert_eq!(totals.total_action_value, U256::from(15));
        assert_eq!(totals.bridged_token_total, U256::from(100));
    }

    #[test]
    fn test_direct_native_single_starter() {
        let params = params(vec![InteropAction::SendNative {
            to: RECIPIENT,
            amount: U256::from(100),
        }]);
        let plan = build_bundle(Route::Direct, &params, &ctx(), vec![], &[]).unwrap();

        assert_eq!(plan.starters.len(), 1);
        assert_eq!(plan.approvals.len(), 0);
        let starter = &plan.starters[0];
        assert!(starter.data.is_empty());
        assert_eq!(starter.to, Bytes::from(format_address(RECIPIENT)));
        assert_eq!(starter.call_attributes.len(), 1);
        let attr = decode_attribute(&starter.call_attributes[0]);
        assert_eq!(attr.name, "interopCallValue");
        assert_eq!(attr.args, vec!["100".to_string()]);
        assert_eq!(plan.quote.total_action_value, U256::from(100));
    }

    #[test]
    fn test_direct_call_without_value_has_no_attributes() {
        let params = params(vec![InteropAction::Call {
            to: RECIPIENT,
            data: Some(Bytes::from(vec![0xCA, 0xFE])),
            value: None,
        }]);
        let plan = build_bundle(Route::Direct, &params, &ctx(), vec![], &[]).unwrap();
        assert_eq!(plan.starters[0].data, Bytes::from(vec![0xCA, 0xFE]));
        assert!(plan.starters[0].call_attributes.is_empty());
    }

    #[test]
    fn test_indirect_erc20_router_starter_and_approval() {
        let payload = Bytes::from(vec![0x01, 0xDE, 0xAD]);
        let params = params(vec![erc20(50)]);
        let plan = build_bundle(
            Route::Indirect,
            &params,
            &ctx(),
            vec![],
            &[Some(payload.clone())],
        )
        .unwrap();

        assert_eq!(plan.approvals.len(), 1);
        assert_eq!(plan.approvals[0].token, TOKEN);
        assert_eq!(plan.approvals[0].spender, ctx().native_token_vault);
        assert_eq!(plan.approvals[0].amount, U256::from(50));

        assert_eq!(plan.starters.len(), 1);
        let starter = &plan.starters[0];
        assert_eq!(starter.to, Bytes::from(format_address(ctx().asset_router)));
        assert_eq!(starter.data, payload);
        let attr = decode_attribute(&starter.call_attributes[0]);
        assert_eq!(attr.name, "indirectCall");
    }

    #[test]
    fn test_indirect_approvals_aggregate_per_token() {
        // Three transfers on the same token yield one summed approval
        let params = params(vec![erc20(7), erc20(11), erc20(13)]);
        let payload = || Some(Bytes::from(vec![0x01]));
        let plan = build_bundle(
            Route::Indirect,
            &params,
            &ctx(),
            vec![],
            &[payload(), payload(), payload()],
        )
        .unwrap();

        assert_eq!(plan.approvals.len(), 1);
        assert_eq!(plan.approvals[0].amount, U256::from(31));
        assert_eq!(plan.starters.len(), 3);
    }

    #[test]
    fn test_indirect_native_bypasses_router() {
        let params = params(vec![
            erc20(50),
            InteropAction::SendNative {
                to: RECIPIENT,
                amount: U256::from(9),
            },
        ]);
        let plan = build_bundle(
            Route::Indirect,
            &params,
            &ctx(),
            vec![],
            &[Some(Bytes::from(vec![0x01])), None],
        )
        .unwrap();

        // The native starter addresses the recipient, not the router
        assert_eq!(plan.starters[1].to, Bytes::from(format_address(RECIPIENT)));
        let attr = decode_attribute(&plan.starters[1].call_attributes[0]);
        assert_eq!(attr.name, "interopCallValue");
    }

    #[test]
    fn test_indirect_erc20_missing_payload_fails() {
        let params = params(vec![erc20(50)]);
        let err = build_bundle(Route::Indirect, &params, &ctx(), vec![], &[None]).unwrap_err();
        assert!(err.to_string().contains("payload"));
    }

    #[test]
    fn test_indirect_payload_count_mismatch_fails() {
        let params = params(vec![erc20(50)]);
        let err = build_bundle(Route::Indirect, &params, &ctx(), vec![], &[]).unwrap_err();
        assert!(matches!(err, InteropError::Validation(_)));
    }

    #[test]
    fn test_bundle_attributes_pass_through() {
        let attrs = vec![Bytes::from(vec![0xAA; 8]), Bytes::from(vec![0xBB; 8])];
        let params = params(vec![InteropAction::SendNative {
            to: RECIPIENT,
            amount: U256::from(1),
        }]);
        let plan = build_bundle(Route::Direct, &params, &ctx(), attrs.clone(), &[]).unwrap();
        assert_eq!(plan.bundle_attributes, attrs);
    }

    #[test]
    fn test_dst_chain_is_chain_only_encoding() {
        let params = params(vec![InteropAction::SendNative {
            to: RECIPIENT,
            amount: U256::from(1),
        }]);
        let plan = build_bundle(Route::Direct, &params, &ctx(), vec![], &[]).unwrap();
        assert_eq!(
            plan.dst_chain,
            Bytes::from(format_chain(U256::from(260u64)).unwrap())
        );
    }
}

use erc20_approval_guard::operator::BatchAllowanceOperator;
use erc20_approval_guard::orchestrator::{high_risk_subset, run_revocations};
use erc20_approval_guard::registry::ProtocolRegistry;
use erc20_approval_guard::risk::{risk_stats, sorted_by_risk, RiskEngine, RiskLevel};
use erc20_approval_guard_test::fixtures::{approval, MAX_UINT256_DEC};
use erc20_approval_guard_test::MockTokenLedger;
use std::str::FromStr;
use web3::types::{Address, U256};

const OWNER: &str = "0x00000000000000000000000000000000000000aa";
const PANCAKE_V2: &str = "0x10ed43c718714eb63d5aa57b78b54704e256024e";
const SHADY_SPENDER: &str = "0x00000000000000000000000000000000000000bb";
const USDT: &str = "0x55d398326f99059ff775485246999027b3197955";
const SCAM_TOKEN: &str = "0x00000000000000000000000000000000000000cc";
const OBSCURE_TOKEN: &str = "0x00000000000000000000000000000000000000dd";

fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

/// Full pipeline: classify a wallet's approvals, pick the high risk
/// subset, revoke it through the operator and verify only those
/// allowances were zeroed.
#[tokio::test]
async fn scan_classify_and_revoke_high_risk() {
    let records = vec![
        // unlimited to a well known router, keep
        approval(USDT, PANCAKE_V2, MAX_UINT256_DEC).symbol("USDT").build(),
        // unlimited to an unknown unlabeled contract, revoke
        approval(USDT, SHADY_SPENDER, MAX_UINT256_DEC).symbol("USDT").build(),
        // spam token approval, revoke
        approval(SCAM_TOKEN, SHADY_SPENDER, "1000")
            .symbol("FREE-AIRDROP")
            .spam(true)
            .build(),
        // limited to an unverified unknown contract, medium, keep
        approval(OBSCURE_TOKEN, SHADY_SPENDER, "250")
            .symbol("OBS")
            .verified(false)
            .build(),
    ];

    let engine = RiskEngine::new(ProtocolRegistry::builtin());
    let classified = sorted_by_risk(engine.analyze(records));
    let stats = risk_stats(&classified);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.high, 2);
    assert_eq!(stats.medium, 1);
    assert_eq!(stats.low, 1);

    // high risk entries sort first
    assert!(classified[0].risk_level == RiskLevel::High);
    assert!(classified[1].risk_level == RiskLevel::High);

    let ledger = MockTokenLedger::new();
    for (token, spender) in [
        (USDT, PANCAKE_V2),
        (USDT, SHADY_SPENDER),
        (SCAM_TOKEN, SHADY_SPENDER),
        (OBSCURE_TOKEN, SHADY_SPENDER),
    ] {
        ledger.set_allowance(addr(token), addr(OWNER), addr(spender), U256::max_value());
    }
    let operator = BatchAllowanceOperator::new(ledger, addr(OWNER));

    let candidates = high_risk_subset(classified);
    assert_eq!(candidates.len(), 2);

    let result = run_revocations(&operator, &candidates, None).await;
    assert_eq!(result.done, 2);
    assert_eq!(result.failed, 0);
    assert!(result.changed());

    // the two high risk allowances are gone
    assert_eq!(
        operator
            .ledger()
            .allowance_of(addr(USDT), addr(OWNER), addr(SHADY_SPENDER)),
        U256::zero()
    );
    assert_eq!(
        operator
            .ledger()
            .allowance_of(addr(SCAM_TOKEN), addr(OWNER), addr(SHADY_SPENDER)),
        U256::zero()
    );
    // the low and medium risk ones are untouched
    assert_eq!(
        operator
            .ledger()
            .allowance_of(addr(USDT), addr(OWNER), addr(PANCAKE_V2)),
        U256::max_value()
    );
    assert_eq!(
        operator
            .ledger()
            .allowance_of(addr(OBSCURE_TOKEN), addr(OWNER), addr(SHADY_SPENDER)),
        U256::max_value()
    );

    // a re-check through the operator reflects the new state
    let allowances = operator
        .batch_check_allowances(
            addr(OWNER),
            &[addr(USDT), addr(USDT)],
            &[addr(SHADY_SPENDER), addr(PANCAKE_V2)],
        )
        .await
        .unwrap();
    assert_eq!(allowances, vec![U256::zero(), U256::max_value()]);
}

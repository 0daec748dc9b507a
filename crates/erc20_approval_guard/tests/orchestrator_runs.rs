use erc20_approval_guard::operator::BatchAllowanceOperator;
use erc20_approval_guard::orchestrator::{high_risk_subset, run_revocations, RunResult};
use erc20_approval_guard::registry::ProtocolRegistry;
use erc20_approval_guard::risk::{ClassifiedApproval, RiskEngine, RiskLevel};
use erc20_approval_guard_common::events::RunProgress;
use erc20_approval_guard_test::fixtures::{approval, MAX_UINT256_DEC};
use erc20_approval_guard_test::MockTokenLedger;
use std::str::FromStr;
use web3::types::{Address, U256};

const OWNER: &str = "0x00000000000000000000000000000000000000aa";
const SPENDER: &str = "0x00000000000000000000000000000000000000bb";
const TOKEN_1: &str = "0x0000000000000000000000000000000000000001";
const TOKEN_2: &str = "0x0000000000000000000000000000000000000002";
const TOKEN_3: &str = "0x0000000000000000000000000000000000000003";

fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

fn candidates(tokens: &[&str]) -> Vec<ClassifiedApproval> {
    let engine = RiskEngine::new(ProtocolRegistry::builtin());
    engine.analyze(
        tokens
            .iter()
            .map(|token| approval(token, SPENDER, MAX_UINT256_DEC).build())
            .collect(),
    )
}

fn seeded_ledger(tokens: &[&str]) -> MockTokenLedger {
    let ledger = MockTokenLedger::new();
    for token in tokens {
        ledger.set_allowance(addr(token), addr(OWNER), addr(SPENDER), U256::max_value());
    }
    ledger
}

#[tokio::test]
async fn test_run_revokes_every_candidate() {
    let tokens = [TOKEN_1, TOKEN_2, TOKEN_3];
    let operator = BatchAllowanceOperator::new(seeded_ledger(&tokens), addr(OWNER));

    let result = run_revocations(&operator, &candidates(&tokens), None).await;
    assert_eq!(
        result,
        RunResult {
            done: 3,
            failed: 0,
            total: 3,
        }
    );
    assert!(result.changed());
    for token in tokens {
        assert_eq!(
            operator
                .ledger()
                .allowance_of(addr(token), addr(OWNER), addr(SPENDER)),
            U256::zero()
        );
    }
}

#[tokio::test]
async fn test_failure_never_stops_the_loop() {
    let tokens = [TOKEN_1, TOKEN_2, TOKEN_3];
    let ledger = seeded_ledger(&tokens);
    ledger.mark_approve_rejecting(addr(TOKEN_2));
    let operator = BatchAllowanceOperator::new(ledger, addr(OWNER));

    let result = run_revocations(&operator, &candidates(&tokens), None).await;
    assert_eq!(
        result,
        RunResult {
            done: 2,
            failed: 1,
            total: 3,
        }
    );
    // the item after the failing one was still processed
    assert_eq!(
        operator
            .ledger()
            .allowance_of(addr(TOKEN_3), addr(OWNER), addr(SPENDER)),
        U256::zero()
    );
}

#[tokio::test]
async fn test_bad_candidate_addresses_count_as_failed() {
    // a zero token address and an unparseable one both come back from
    // upstream data occasionally; each is one failed item, the rest of
    // the run is unaffected
    let ledger = seeded_ledger(&[TOKEN_1]);
    let operator = BatchAllowanceOperator::new(ledger, addr(OWNER));

    let engine = RiskEngine::new(ProtocolRegistry::builtin());
    let candidates = engine.analyze(vec![
        approval(
            "0x0000000000000000000000000000000000000000",
            SPENDER,
            MAX_UINT256_DEC,
        )
        .build(),
        approval("not-an-address", SPENDER, MAX_UINT256_DEC).build(),
        approval(TOKEN_1, SPENDER, MAX_UINT256_DEC).build(),
    ]);

    let result = run_revocations(&operator, &candidates, None).await;
    assert_eq!(
        result,
        RunResult {
            done: 1,
            failed: 2,
            total: 3,
        }
    );
    assert_eq!(
        operator
            .ledger()
            .allowance_of(addr(TOKEN_1), addr(OWNER), addr(SPENDER)),
        U256::zero()
    );
}

#[tokio::test]
async fn test_all_failed_run_reports_no_change() {
    let tokens = [TOKEN_1, TOKEN_2];
    let ledger = seeded_ledger(&tokens);
    ledger.mark_approve_rejecting(addr(TOKEN_1));
    ledger.mark_approve_rejecting(addr(TOKEN_2));
    let operator = BatchAllowanceOperator::new(ledger, addr(OWNER));

    let result = run_revocations(&operator, &candidates(&tokens), None).await;
    assert!(!result.changed());
    assert_eq!(result.failed, 2);
}

#[tokio::test]
async fn test_progress_snapshot_after_every_item() {
    let tokens = [TOKEN_1, TOKEN_2, TOKEN_3];
    let ledger = seeded_ledger(&tokens);
    ledger.mark_approve_rejecting(addr(TOKEN_2));
    let operator = BatchAllowanceOperator::new(ledger, addr(OWNER));

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let result = run_revocations(&operator, &candidates(&tokens), Some(tx)).await;

    let mut snapshots = Vec::new();
    while let Ok(snapshot) = rx.try_recv() {
        snapshots.push(snapshot);
    }
    assert_eq!(snapshots.len(), 3);
    assert_eq!(
        snapshots[0],
        RunProgress {
            done: 1,
            failed: 0,
            total: 3,
        }
    );
    assert_eq!(
        snapshots[2],
        RunProgress {
            done: result.done,
            failed: result.failed,
            total: result.total,
        }
    );
}

#[tokio::test]
async fn test_high_risk_subset_filters_levels() {
    let engine = RiskEngine::new(ProtocolRegistry::builtin());
    let classified = engine.analyze(vec![
        approval(TOKEN_1, SPENDER, MAX_UINT256_DEC).build(),
        approval(TOKEN_2, SPENDER, "100").build(),
        approval(TOKEN_3, SPENDER, MAX_UINT256_DEC).build(),
    ]);
    let subset = high_risk_subset(classified);
    assert_eq!(subset.len(), 2);
    assert!(subset
        .iter()
        .all(|classified| classified.risk_level == RiskLevel::High));
}

#[tokio::test]
async fn test_empty_candidate_list() {
    let operator = BatchAllowanceOperator::new(MockTokenLedger::new(), addr(OWNER));
    let result = run_revocations(&operator, &[], None).await;
    assert_eq!(result, RunResult::default());
    assert!(!result.changed());
}

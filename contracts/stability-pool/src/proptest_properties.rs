//! Property-based tests using `proptest` for pool accounting invariants.
//!
//! 1. **Proportionality**: a full offset pays every depositor `C * d_i / D`.
//! 2. **Partial offset conservation**: compounded deposits sum to `D - debt`
//!    and collateral gains sum to `C`, never exceeding either.
//! 3. **Monotonicity**: between re-anchors gains only grow and deposits
//!    only shrink.
//! 4. **Query idempotence**: reads never change the answer.
//! 5. **Atomicity**: a rejected deposit leaves the pool untouched.

use proptest::prelude::*;

use sp_common::{
    ledger::{Asset, MemoryLedger},
    types::Address,
    Decimal,
};

use crate::{PoolConfig, StabilityPool};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Per-depositor truncation budget, in raw units
const WEI_TOLERANCE: u128 = 1_000;

fn depositor(i: usize) -> Address {
    let mut addr = [0u8; 32];
    addr[0] = 0xd0;
    addr[31] = i as u8;
    addr
}

fn pool_with_deposits(amounts: &[u64]) -> StabilityPool<MemoryLedger> {
    let config = PoolConfig::derive("ETH");
    let mut ledger = MemoryLedger::new();
    let Ok(()) = ledger.mint(Asset::Collateral, &config.active_pool, Decimal::from_units(1_000_000)) else {
        panic!("mint collateral");
    };
    for (i, amount) in amounts.iter().enumerate() {
        let Ok(()) = ledger.mint(Asset::DebtToken, &depositor(i), Decimal::from_units(*amount)) else {
            panic!("mint debt token");
        };
    }

    let Ok(mut pool) = StabilityPool::new(config, ledger) else {
        panic!("valid pool");
    };
    for (i, amount) in amounts.iter().enumerate() {
        let Ok(_) = pool.provide_to_sp(depositor(i), Decimal::from_units(*amount)) else {
            panic!("deposit accepted");
        };
    }
    pool
}

fn sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |acc, v| {
        let Ok(total) = acc.checked_add(v) else {
            panic!("sum overflow");
        };
        total
    })
}

fn deposits_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..=500, 1..=6)
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_full_offset_is_proportional(
        amounts in deposits_strategy(),
        collateral in 1u64..=1_000,
    ) {
        let mut pool = pool_with_deposits(&amounts);
        let total: u64 = amounts.iter().sum();

        let result = pool.offset(Decimal::from_units(total), Decimal::from_units(collateral));
        prop_assert!(result.is_ok());
        prop_assert_eq!(pool.current_epoch(), 1);
        prop_assert_eq!(pool.p(), Decimal::ONE);

        for (i, amount) in amounts.iter().enumerate() {
            let expected = Decimal::from_units(collateral)
                .mul_div(Decimal::from_units(*amount), Decimal::from_units(total))
                .unwrap_or(Decimal::ZERO);
            let gain = pool.collateral_gain(&depositor(i)).unwrap_or(Decimal::ONE);
            prop_assert!(
                gain.abs_diff(expected) <= Decimal::from_wei(WEI_TOLERANCE),
                "depositor {} gain {} expected {}", i, gain, expected
            );
            prop_assert!(gain <= expected);
            prop_assert_eq!(pool.compounded_deposit(&depositor(i)).ok(), Some(Decimal::ZERO));
        }
    }

    #[test]
    fn prop_partial_offset_conserves_value(
        amounts in deposits_strategy(),
        pct in 1u64..=99,
        collateral in 1u64..=1_000,
    ) {
        let mut pool = pool_with_deposits(&amounts);
        let total = Decimal::from_units(amounts.iter().sum());
        let debt = total
            .mul_div(Decimal::from_units(pct), Decimal::from_units(100))
            .unwrap_or(Decimal::ZERO);

        prop_assert!(pool.offset(debt, Decimal::from_units(collateral)).is_ok());

        let remaining = total.saturating_sub(debt);
        let n = amounts.len() as u128;

        let compounded = sum((0..amounts.len()).map(|i| {
            pool.compounded_deposit(&depositor(i)).unwrap_or(Decimal::ZERO)
        }));
        prop_assert!(compounded <= remaining);
        prop_assert!(
            compounded.abs_diff(remaining) <= Decimal::from_wei(WEI_TOLERANCE * n),
            "compounded {} remaining {}", compounded, remaining
        );

        let gains = sum((0..amounts.len()).map(|i| {
            pool.collateral_gain(&depositor(i)).unwrap_or(Decimal::ZERO)
        }));
        prop_assert!(gains <= Decimal::from_units(collateral));
        prop_assert!(
            gains.abs_diff(Decimal::from_units(collateral)) <= Decimal::from_wei(WEI_TOLERANCE * n),
            "gains {} collateral {}", gains, collateral
        );
    }
}

// ---------------------------------------------------------------------------
// Monotonicity and idempotence
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_gains_grow_deposits_shrink(
        offsets in prop::collection::vec((1u64..=50, 1u64..=10), 1..=5),
    ) {
        let mut pool = pool_with_deposits(&[100, 300]);
        let watched = depositor(0);
        let mut last_gain = Decimal::ZERO;
        let mut last_deposit = Decimal::from_units(100);

        for (pct, collateral) in offsets {
            let debt = pool
                .total_deposits()
                .mul_div(Decimal::from_units(pct), Decimal::from_units(100))
                .unwrap_or(Decimal::ZERO);
            prop_assert!(pool.offset(debt, Decimal::from_units(collateral)).is_ok());

            let gain = pool.collateral_gain(&watched).unwrap_or(Decimal::ZERO);
            let deposit = pool.compounded_deposit(&watched).unwrap_or(Decimal::ONE);
            prop_assert!(gain >= last_gain);
            prop_assert!(deposit <= last_deposit);
            last_gain = gain;
            last_deposit = deposit;
        }
    }

    #[test]
    fn prop_queries_are_idempotent(
        amounts in deposits_strategy(),
        pct in 1u64..=100,
        collateral in 0u64..=1_000,
    ) {
        let mut pool = pool_with_deposits(&amounts);
        let debt = pool
            .total_deposits()
            .mul_div(Decimal::from_units(pct), Decimal::from_units(100))
            .unwrap_or(Decimal::ZERO);
        prop_assert!(pool.offset(debt, Decimal::from_units(collateral)).is_ok());

        let before = pool.snapshot();
        for i in 0..amounts.len() {
            let first = (pool.compounded_deposit(&depositor(i)), pool.collateral_gain(&depositor(i)));
            let second = (pool.compounded_deposit(&depositor(i)), pool.collateral_gain(&depositor(i)));
            prop_assert_eq!(first, second);
        }
        prop_assert_eq!(pool.snapshot(), before);
    }

    #[test]
    fn prop_rejected_deposit_changes_nothing(
        amounts in deposits_strategy(),
        excess in 1u64..=1_000,
    ) {
        let mut pool = pool_with_deposits(&amounts);
        let before = pool.snapshot();
        let events = pool.events().len();

        // Every depositor already moved their whole balance into the pool
        let result = pool.provide_to_sp(depositor(0), Decimal::from_units(excess));

        prop_assert!(result.is_err());
        prop_assert_eq!(pool.snapshot(), before);
        prop_assert_eq!(pool.events().len(), events);
    }
}

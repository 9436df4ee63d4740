//! Compounding Engine
//!
//! Product-sum accounting: every offset updates `P`, `S`, scale and epoch in
//! constant time, and a depositor's compounded deposit and collateral gain
//! are derived lazily from the snapshot stored with their record.
//!
//! ```text
//! compounded = initial * P / P_snapshot            (same scale)
//! compounded = initial * P / P_snapshot / 10^9     (one scale later)
//! gain       = initial * (S[e][s] - S_snap + S[e][s+1] / 10^9) / P_snapshot / 10^18
//! ```

use sp_common::{
    constants::{
        pool::{DUST_DIVISOR, MAX_SCALE_GAP, SCALE_FACTOR},
        precision::DECIMAL_PRECISION,
    },
    errors::{AmountErrorReason, PoolError, PoolResult},
    math::{div_rem, mul_div, mul_div_rem},
    Decimal, U256,
};

use crate::registry::DepositRecord;
use crate::state::PoolState;

/// Per-unit values of a single offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardsPerUnit {
    /// Collateral gained per unit of deposit (10^18-scaled)
    pub collateral_gain_per_unit: Decimal,
    /// Fraction of every deposit consumed (10^18-scaled, 1.0 = all of it)
    pub debt_loss_per_unit: Decimal,
    /// Truncation remainder to carry into the next offset
    pub collateral_error: Decimal,
}

/// What an offset did to the accumulators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetOutcome {
    pub rewards: RewardsPerUnit,
    /// Bucket that received the collateral gain
    pub sum_epoch: u64,
    pub sum_scale: u64,
    pub new_sum: Decimal,
    pub new_p: Decimal,
    pub epoch_changed: bool,
    pub scale_changed: bool,
}

/// Per-unit collateral gain and debt loss for an offset of `debt` against
/// the current deposits
///
/// The collateral error left by the previous offset is folded into this
/// numerator. A debt equal to the whole pool yields a loss of exactly 1.0;
/// any other loss is rounded up so the pool never under-absorbs debt.
pub fn compute_rewards_per_unit_staked(
    state: &PoolState,
    collateral: Decimal,
    debt: Decimal,
) -> PoolResult<RewardsPerUnit> {
    let total = state.total_deposits;
    if total.is_zero() {
        return Err(PoolError::EmptyPool);
    }
    if debt.is_zero() {
        return Err(PoolError::InvalidAmount {
            amount: debt,
            reason: AmountErrorReason::Zero,
        });
    }
    if debt > total {
        return Err(PoolError::InvalidAmount {
            amount: debt,
            reason: AmountErrorReason::TooLarge,
        });
    }

    let numerator = collateral
        .raw()
        .checked_mul(DECIMAL_PRECISION)
        .and_then(|n| n.checked_add(state.last_collateral_error.raw()))
        .ok_or(PoolError::Overflow)?;
    let (gain_per_unit, collateral_error) = div_rem(numerator, total.raw())?;

    let loss_per_unit = if debt == total {
        DECIMAL_PRECISION
    } else {
        let (loss, remainder) = mul_div_rem(debt.raw(), DECIMAL_PRECISION, total.raw())?;
        if remainder.is_zero() {
            loss
        } else {
            loss + U256::from(1u64)
        }
    };

    Ok(RewardsPerUnit {
        collateral_gain_per_unit: Decimal::from_raw(gain_per_unit),
        debt_loss_per_unit: Decimal::from_raw(loss_per_unit),
        collateral_error: Decimal::from_raw(collateral_error),
    })
}

/// Absorb `debt` into the pool and credit `collateral` to its depositors
///
/// The caller clamps `debt` to the pool's total deposits beforehand.
pub fn apply_offset(
    state: &mut PoolState,
    debt: Decimal,
    collateral: Decimal,
) -> PoolResult<OffsetOutcome> {
    let rewards = compute_rewards_per_unit_staked(state, collateral, debt)?;
    let current_p = state.product_p.raw();

    // 1. Accumulate the collateral gain into the current (epoch, scale) bucket
    let marginal = rewards
        .collateral_gain_per_unit
        .raw()
        .checked_mul(current_p)
        .ok_or(PoolError::Overflow)?;
    let (sum_epoch, sum_scale) = (state.current_epoch, state.current_scale);
    let new_sum = state
        .sum_at(sum_epoch, sum_scale)
        .checked_add(Decimal::from_raw(marginal))?;
    state.set_sum(sum_epoch, sum_scale, new_sum);
    state.last_collateral_error = rewards.collateral_error;

    // 2. Shrink P, rescaling or starting a new epoch where needed
    let new_product_factor = DECIMAL_PRECISION
        .checked_sub(rewards.debt_loss_per_unit.raw())
        .ok_or(PoolError::Underflow)?;

    let mut epoch_changed = false;
    let mut scale_changed = false;

    let new_p = if new_product_factor.is_zero() {
        state.current_epoch = state.current_epoch.checked_add(1).ok_or(PoolError::Overflow)?;
        state.current_scale = 0;
        epoch_changed = true;
        DECIMAL_PRECISION
    } else {
        let shrunk = mul_div(current_p, new_product_factor, DECIMAL_PRECISION)?;
        if shrunk < SCALE_FACTOR {
            state.current_scale = state.current_scale.checked_add(1).ok_or(PoolError::Overflow)?;
            scale_changed = true;
            let widened = current_p
                .checked_mul(new_product_factor)
                .ok_or(PoolError::Overflow)?;
            mul_div(widened, SCALE_FACTOR, DECIMAL_PRECISION)?
        } else {
            shrunk
        }
    };

    if new_p.is_zero() {
        return Err(PoolError::InvalidStateTransition);
    }
    state.product_p = Decimal::from_raw(new_p);

    // 3. Deposits shrink by the absorbed debt
    state.total_deposits = state.total_deposits.checked_sub(debt)?;

    log::debug!(
        "offset applied: loss/unit {} gain/unit {} P {} S[{}][{}] {}",
        rewards.debt_loss_per_unit,
        rewards.collateral_gain_per_unit,
        state.product_p,
        sum_epoch,
        sum_scale,
        new_sum
    );

    Ok(OffsetOutcome {
        rewards,
        sum_epoch,
        sum_scale,
        new_sum,
        new_p: state.product_p,
        epoch_changed,
        scale_changed,
    })
}

/// Current value of a deposit after every offset since its snapshot
pub fn compounded_deposit(state: &PoolState, record: &DepositRecord) -> PoolResult<Decimal> {
    let initial = record.initial_deposit;
    if initial.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let snapshot = &record.snapshot;
    // The pool was emptied since the snapshot
    if snapshot.epoch != state.current_epoch {
        return Ok(Decimal::ZERO);
    }
    if snapshot.p.is_zero() {
        return Err(PoolError::DivisionByZero);
    }

    let scale_diff = state
        .current_scale
        .checked_sub(snapshot.scale)
        .ok_or(PoolError::InvalidStateTransition)?;

    let compounded = match scale_diff {
        0 => mul_div(initial.raw(), state.product_p.raw(), snapshot.p.raw())?,
        d if d <= MAX_SCALE_GAP => {
            mul_div(initial.raw(), state.product_p.raw(), snapshot.p.raw())? / SCALE_FACTOR
        }
        _ => U256::ZERO,
    };

    // Below one billionth of the principal counts as fully consumed
    if compounded < initial.raw() / DUST_DIVISOR {
        return Ok(Decimal::ZERO);
    }

    Ok(Decimal::from_raw(compounded).min(initial))
}

/// Collateral earned by a deposit since its snapshot
///
/// Gains recorded in the snapshot's epoch still count after the pool was
/// emptied; later epochs contribute nothing.
pub fn collateral_gain(state: &PoolState, record: &DepositRecord) -> PoolResult<Decimal> {
    let initial = record.initial_deposit;
    if initial.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let snapshot = &record.snapshot;
    if snapshot.p.is_zero() {
        return Err(PoolError::DivisionByZero);
    }

    let first_portion = state
        .sum_at(snapshot.epoch, snapshot.scale)
        .raw()
        .checked_sub(snapshot.s.raw())
        .ok_or(PoolError::Underflow)?;
    let second_portion = state.sum_at(snapshot.epoch, snapshot.scale.saturating_add(1)).raw() / SCALE_FACTOR;
    let portions = first_portion
        .checked_add(second_portion)
        .ok_or(PoolError::Overflow)?;

    let gain = mul_div(initial.raw(), portions, snapshot.p.raw())? / DECIMAL_PRECISION;
    Ok(Decimal::from_raw(gain))
}

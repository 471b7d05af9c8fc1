//! Order sizing and position reconciliation
//!
//! Pure decision logic shared by every exchange: given one alert and the
//! cached positions of the target exchange, pick the final side, size and
//! limit price, or decide that no order should be sent.
//!
//! Rules, in order:
//! 1. Buy alerts are dropped on sell-only exchanges.
//! 2. The limit price is the reference price moved by the slippage tolerance.
//! 3. Closing-direction alerts (sell vs. long, buy vs. short) need an open
//!    position and must clear the minimum profit gate; they never size past
//!    the open position.
//! 4. Otherwise a flatten request (`orderMode: full` or zero target) takes the
//!    whole position when the order runs against it.
//! 5. Anything else keeps the requested size.

use rust_decimal::Decimal;
use tracing::debug;

use super::types::{
    OrderInstruction, SizingBranch, SizingInput, SizingPolicy, SizingVerdict, SkipReason,
};
use crate::common::traits::PositionView;
use crate::common::types::{Direction, Side, TradingMode};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Compute the order for one alert against a position snapshot
pub fn size_order<V>(input: &SizingInput, positions: &V, policy: &SizingPolicy) -> SizingVerdict
where
    V: PositionView + ?Sized,
{
    if policy.trading_mode == TradingMode::OnlySell && input.side == Side::Buy {
        return SizingVerdict::Skip(SkipReason::SellOnlyMode);
    }

    let limit_price = limit_price(input.side, input.price, input.slippage_percentage);

    let (size, branch) = if input.is_closing_direction() {
        let Some(position) = positions.position(&input.market) else {
            return SizingVerdict::Skip(SkipReason::PositionNotExists);
        };

        // closing direction implies a direction is present
        let direction = input.direction.unwrap_or(Direction::Long);
        let profit = profit_percent(input.price, position.entry_price);
        if let Some(threshold) = input.min_profit.or(policy.default_min_profit) {
            if directional_profit(profit, direction) < threshold {
                return SizingVerdict::Skip(SkipReason::ProfitNotReached {
                    profit,
                    threshold,
                    direction,
                });
            }
        }

        let held = position.size.abs();
        let size = if input.wants_flatten() {
            held
        } else {
            input.size.min(held)
        };
        (size, SizingBranch::Closing)
    } else if input.wants_flatten() {
        match positions.position(&input.market) {
            None if input.targets_flat() => {
                return SizingVerdict::Skip(SkipReason::NothingToFlatten);
            }
            Some(position) if input.side == Side::closing(position.side) => {
                (position.size.abs(), SizingBranch::Flatten)
            }
            _ => (input.size, SizingBranch::Requested),
        }
    } else {
        (input.size, SizingBranch::Requested)
    };

    debug!(
        market = %input.market,
        side = %input.side,
        requested = %input.size,
        size = %size,
        branch = ?branch,
        "order sized"
    );

    SizingVerdict::Proceed(OrderInstruction {
        side: input.side,
        size,
        limit_price,
        reference_price: input.price,
        slippage_percentage: input.slippage_percentage,
        branch,
    })
}

/// Reference price moved against us by the slippage tolerance
///
/// Validated alerts keep `price * (100 + slippage)` representable and the
/// slippage below 100.
pub fn limit_price(side: Side, price: Decimal, slippage_percentage: Decimal) -> Decimal {
    match side {
        Side::Buy => price * (HUNDRED + slippage_percentage) / HUNDRED,
        Side::Sell => price * (HUNDRED - slippage_percentage) / HUNDRED,
    }
}

/// Percentage move from entry to the reference price; positive favors a long
pub fn profit_percent(price: Decimal, entry_price: Decimal) -> Decimal {
    if entry_price.is_zero() {
        return Decimal::ZERO;
    }
    // saturate instead of overflowing on a near-zero entry price
    let saturated = if price >= entry_price {
        Decimal::MAX
    } else {
        Decimal::MIN
    };
    (price - entry_price)
        .checked_div(entry_price)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .unwrap_or(saturated)
}

/// Profit from the point of view of a position in `direction`
pub fn directional_profit(profit: Decimal, direction: Direction) -> Decimal {
    match direction {
        Direction::Long => profit,
        Direction::Short => -profit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{OrderMode, Position, PositionSide};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn input(side: Side, size: Decimal) -> SizingInput {
        SizingInput {
            market: "BTC-USD".to_string(),
            side,
            size,
            price: dec!(100),
            slippage_percentage: dec!(0),
            order_mode: OrderMode::Standard,
            new_position_size: Some(dec!(1)),
            direction: None,
            min_profit: None,
        }
    }

    fn long(size: Decimal, entry: Decimal) -> Vec<Position> {
        vec![Position::new("BTC-USD", PositionSide::Long, size, entry)]
    }

    fn short(size: Decimal, entry: Decimal) -> Vec<Position> {
        vec![Position::new("BTC-USD", PositionSide::Short, size, entry)]
    }

    fn proceed(verdict: SizingVerdict) -> OrderInstruction {
        match verdict {
            SizingVerdict::Proceed(instruction) => instruction,
            SizingVerdict::Skip(reason) => panic!("unexpected skip: {}", reason),
        }
    }

    #[test]
    fn test_sell_only_mode_drops_buys() {
        let policy = SizingPolicy {
            trading_mode: TradingMode::OnlySell,
            ..Default::default()
        };

        let verdict = size_order(&input(Side::Buy, dec!(1)), &long(dec!(1), dec!(90)), &policy);
        assert_eq!(verdict, SizingVerdict::Skip(SkipReason::SellOnlyMode));

        let verdict = size_order(&input(Side::Sell, dec!(1)), &long(dec!(1), dec!(90)), &policy);
        assert!(verdict.instruction().is_some());
    }

    #[test]
    fn test_limit_price_applies_slippage() {
        assert_eq!(limit_price(Side::Buy, dec!(200), dec!(0.5)), dec!(201));
        assert_eq!(limit_price(Side::Sell, dec!(200), dec!(0.5)), dec!(199));
        assert_eq!(limit_price(Side::Sell, dec!(200), dec!(0)), dec!(200));
    }

    #[test]
    fn test_requested_size_is_kept_without_special_conditions() {
        let positions = long(dec!(3), dec!(90));
        for side in [Side::Buy, Side::Sell] {
            let instruction = proceed(size_order(
                &input(side, dec!(0.7)),
                &positions,
                &SizingPolicy::default(),
            ));
            assert_eq!(instruction.size, dec!(0.7));
            assert_eq!(instruction.branch, SizingBranch::Requested);
        }
    }

    #[test]
    fn test_closing_without_position_is_skipped() {
        let mut alert = input(Side::Sell, dec!(1));
        alert.direction = Some(Direction::Long);

        let verdict = size_order(&alert, &Vec::<Position>::new(), &SizingPolicy::default());
        assert_eq!(verdict, SizingVerdict::Skip(SkipReason::PositionNotExists));

        // a position in another market does not count
        let other = vec![Position::new("ETH-USD", PositionSide::Long, dec!(1), dec!(10))];
        let verdict = size_order(&alert, &other, &SizingPolicy::default());
        assert_eq!(verdict, SizingVerdict::Skip(SkipReason::PositionNotExists));
    }

    #[test]
    fn test_closing_caps_at_position_size() {
        let mut alert = input(Side::Sell, dec!(5));
        alert.direction = Some(Direction::Long);

        let instruction = proceed(size_order(
            &alert,
            &long(dec!(2), dec!(90)),
            &SizingPolicy::default(),
        ));
        assert_eq!(instruction.size, dec!(2));
        assert_eq!(instruction.branch, SizingBranch::Closing);

        alert.size = dec!(0.5);
        let instruction = proceed(size_order(
            &alert,
            &long(dec!(2), dec!(90)),
            &SizingPolicy::default(),
        ));
        assert_eq!(instruction.size, dec!(0.5));
    }

    #[test]
    fn test_closing_full_mode_takes_whole_position() {
        let mut alert = input(Side::Buy, dec!(0.1));
        alert.direction = Some(Direction::Short);
        alert.order_mode = OrderMode::Full;

        let instruction = proceed(size_order(
            &alert,
            &short(dec!(4), dec!(120)),
            &SizingPolicy::default(),
        ));
        assert_eq!(instruction.size, dec!(4));
        assert_eq!(instruction.side, Side::Buy);
    }

    #[test]
    fn test_profit_gate_boundary_is_inclusive() {
        let mut alert = input(Side::Sell, dec!(1));
        alert.direction = Some(Direction::Long);
        alert.price = dec!(102);
        let positions = long(dec!(1), dec!(100));

        alert.min_profit = Some(dec!(2));
        assert!(size_order(&alert, &positions, &SizingPolicy::default())
            .instruction()
            .is_some());

        alert.min_profit = Some(dec!(2.0001));
        assert!(matches!(
            size_order(&alert, &positions, &SizingPolicy::default()),
            SizingVerdict::Skip(SkipReason::ProfitNotReached { .. })
        ));
    }

    #[test]
    fn test_short_profit_is_negated() {
        let mut alert = input(Side::Buy, dec!(1));
        alert.direction = Some(Direction::Short);
        alert.min_profit = Some(dec!(5));
        let positions = short(dec!(1), dec!(100));

        // price fell 10%: a short is 10% in profit
        alert.price = dec!(90);
        assert!(size_order(&alert, &positions, &SizingPolicy::default())
            .instruction()
            .is_some());

        // price rose 10%: a short is losing
        alert.price = dec!(110);
        assert_eq!(
            size_order(&alert, &positions, &SizingPolicy::default()),
            SizingVerdict::Skip(SkipReason::ProfitNotReached {
                profit: dec!(10),
                threshold: dec!(5),
                direction: Direction::Short,
            })
        );
    }

    #[test]
    fn test_alert_threshold_overrides_default() {
        let mut alert = input(Side::Sell, dec!(1));
        alert.direction = Some(Direction::Long);
        alert.price = dec!(101);
        let positions = long(dec!(1), dec!(100));
        let policy = SizingPolicy {
            default_min_profit: Some(dec!(3)),
            ..Default::default()
        };

        assert!(size_order(&alert, &positions, &policy).skip_reason().is_some());

        alert.min_profit = Some(dec!(0.5));
        assert!(size_order(&alert, &positions, &policy).instruction().is_some());
    }

    #[test]
    fn test_no_threshold_disables_gate() {
        let mut alert = input(Side::Sell, dec!(1));
        alert.direction = Some(Direction::Long);
        alert.price = dec!(50);

        let verdict = size_order(&alert, &long(dec!(1), dec!(100)), &SizingPolicy::default());
        assert!(verdict.instruction().is_some());
    }

    #[test]
    fn test_zero_target_without_position_is_skipped() {
        let mut alert = input(Side::Sell, dec!(1));
        alert.new_position_size = Some(dec!(0));

        let verdict = size_order(&alert, &Vec::<Position>::new(), &SizingPolicy::default());
        assert_eq!(verdict, SizingVerdict::Skip(SkipReason::NothingToFlatten));
    }

    #[test]
    fn test_full_mode_without_position_keeps_requested_size() {
        let mut alert = input(Side::Buy, dec!(1.5));
        alert.order_mode = OrderMode::Full;

        let instruction = proceed(size_order(
            &alert,
            &Vec::<Position>::new(),
            &SizingPolicy::default(),
        ));
        assert_eq!(instruction.size, dec!(1.5));
    }

    #[test]
    fn test_flatten_against_opposite_position() {
        let mut alert = input(Side::Buy, dec!(0.5));
        alert.new_position_size = Some(dec!(0));

        let instruction = proceed(size_order(
            &alert,
            &short(dec!(3), dec!(100)),
            &SizingPolicy::default(),
        ));
        assert_eq!(instruction.size, dec!(3));
        assert_eq!(instruction.branch, SizingBranch::Flatten);

        // same-side position is not flattened
        let instruction = proceed(size_order(
            &alert,
            &long(dec!(3), dec!(100)),
            &SizingPolicy::default(),
        ));
        assert_eq!(instruction.size, dec!(0.5));
    }

    #[test]
    fn test_opposite_position_without_direction_or_flatten_keeps_size() {
        let alert = input(Side::Buy, dec!(0.5));

        let instruction = proceed(size_order(
            &alert,
            &short(dec!(2), dec!(100)),
            &SizingPolicy::default(),
        ));
        assert_eq!(instruction.size, dec!(0.5));
        assert_eq!(instruction.branch, SizingBranch::Requested);
    }

    #[test]
    fn test_flatten_is_repeatable() {
        let mut alert = input(Side::Sell, dec!(1));
        alert.order_mode = OrderMode::Full;
        let positions = long(dec!(2.25), dec!(100));

        let first = size_order(&alert, &positions, &SizingPolicy::default());
        let second = size_order(&alert, &positions, &SizingPolicy::default());
        assert_eq!(first, second);
        assert_eq!(proceed(first).size, dec!(2.25));
    }

    #[test]
    fn test_profitable_close_to_flat_takes_whole_long() {
        let mut alert = input(Side::Sell, dec!(1));
        alert.direction = Some(Direction::Long);
        alert.new_position_size = Some(dec!(0));
        alert.price = dec!(110);
        alert.min_profit = Some(dec!(0));

        let instruction = proceed(size_order(
            &alert,
            &long(dec!(1.5), dec!(100)),
            &SizingPolicy::default(),
        ));
        assert_eq!(instruction.size, dec!(1.5));
        assert_eq!(instruction.side, Side::Sell);
        assert_eq!(instruction.branch, SizingBranch::Closing);
        assert_eq!(profit_percent(alert.price, dec!(100)), dec!(10));
    }

    #[test]
    fn test_losing_close_to_flat_is_skipped() {
        let mut alert = input(Side::Sell, dec!(1));
        alert.direction = Some(Direction::Long);
        alert.new_position_size = Some(dec!(0));
        alert.price = dec!(95);
        alert.min_profit = Some(dec!(2));

        let verdict = size_order(&alert, &long(dec!(1.5), dec!(100)), &SizingPolicy::default());
        assert_eq!(
            verdict,
            SizingVerdict::Skip(SkipReason::ProfitNotReached {
                profit: dec!(-5),
                threshold: dec!(2),
                direction: Direction::Long,
            })
        );
        assert!(verdict
            .skip_reason()
            .unwrap()
            .to_string()
            .starts_with("profit level not reached"));
    }

    #[test]
    fn test_profit_with_zero_entry_price() {
        assert_eq!(profit_percent(dec!(100), dec!(0)), dec!(0));
        assert_eq!(profit_percent(dec!(110), dec!(100)), dec!(10));
        assert_eq!(profit_percent(dec!(95), dec!(100)), dec!(-5));
        assert_eq!(
            profit_percent(dec!(1000000000000000000), dec!(0.0000000000000000001)),
            Decimal::MAX
        );
    }
}

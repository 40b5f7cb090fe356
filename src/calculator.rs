//! Payout, odds and marketplace pricing.
//!
//! Every function here is pure. Amounts that can become fractional (rewards,
//! per-point prices, fees) are [`Decimal`] and are never rounded: the display
//! layer decides how many places to show. Integer inputs are widened into
//! `Decimal` before multiplying, so a product of two large `u64` values is an
//! [`CalcError::Overflow`] rather than a wrapped number.
use crate::api::*;
use crate::settings::MarketRules;
use log::trace;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum CalcError {
    #[error("Arithmetic overflow")]
    Overflow,
    #[error("Event {0} is still open")]
    EventNotResolved(RowId),
    #[error("Listing {0} has no points left")]
    EmptyListing(RowId),
    #[error("Amount {0} is negative")]
    Negative(Decimal),
}

/// `(stake * total_pool) / winning_pool`, or zero when nobody backed the
/// winning side.
pub fn calculate_reward(
    stake: Points,
    total_pool: Points,
    winning_pool: Points,
) -> Result<Decimal, CalcError> {
    // A stake nominally on the winning side is forfeited here.
    if winning_pool == 0 {
        return Ok(Decimal::ZERO);
    }
    let out = Decimal::from(stake)
        .checked_mul(Decimal::from(total_pool))
        .ok_or(CalcError::Overflow)?;
    out.checked_div(Decimal::from(winning_pool))
        .ok_or(CalcError::Overflow)
}

fn payout(event: &Event, side: Side, amount: Points) -> Result<Payout, CalcError> {
    let total_pool = event
        .yes_pool
        .checked_add(event.no_pool)
        .ok_or(CalcError::Overflow)?;
    let winning_pool = event.pool(side);
    let reward = calculate_reward(amount, total_pool, winning_pool)?;
    Ok(Payout {
        stake: amount,
        total_pool,
        winning_pool,
        reward,
        profit: reward - Decimal::from(amount),
    })
}

/// What a stake collects from a resolved event. The winning pool is the pool
/// of the winning side regardless of which side the stake is on.
pub fn calculate_payout(event: &Event, stake: &Stake) -> Result<Payout, CalcError> {
    match event.status {
        EventStatus::Resolved(outcome) => {
            let out = payout(event, Side::from(outcome), stake.amount)?;
            trace!(
                "Payout for {} on event {}: {} (profit {})",
                stake.amount,
                event.id,
                out.reward,
                out.profit
            );
            Ok(out)
        }
        EventStatus::Open => Err(CalcError::EventNotResolved(event.id)),
    }
}

/// Reward a hypothetical stake would collect if `side` wins with the pools as
/// they are now. Zero while the amount or the chosen pool is zero.
pub fn potential_reward(event: &Event, side: Side, amount: Points) -> Result<Payout, CalcError> {
    payout(event, side, amount)
}

pub fn is_winning_stake(event: &Event, stake: &Stake) -> bool {
    event.id == stake.event && event.status.winner() == Some(stake.side)
}

/// Return on investment in percent for a `probe` sized stake on `side`.
/// `None` when either the total pool or the chosen pool is empty.
pub fn roi_percent(
    yes_pool: Points,
    no_pool: Points,
    side: Side,
    probe: Points,
) -> Option<Decimal> {
    let total_pool = yes_pool.checked_add(no_pool)?;
    let winning_pool = match side {
        Side::Yes => yes_pool,
        Side::No => no_pool,
    };
    if total_pool == 0 || winning_pool == 0 || probe == 0 {
        return None;
    }
    let reward = calculate_reward(probe, total_pool, winning_pool).ok()?;
    let probe = Decimal::from(probe);
    ((reward - probe) / probe).checked_mul(Decimal::ONE_HUNDRED)
}

/// Share of the total pool backing yes and no, in percent. An empty event is
/// shown as an even split.
pub fn pool_split(yes_pool: Points, no_pool: Points) -> (Decimal, Decimal) {
    let total = Decimal::from(yes_pool) + Decimal::from(no_pool);
    let yes_percent = if total > Decimal::ZERO {
        Decimal::from(yes_pool) / total * Decimal::ONE_HUNDRED
    } else {
        Decimal::from(50)
    };
    (yes_percent, Decimal::ONE_HUNDRED - yes_percent)
}

pub fn odds(event: &Event, rules: &MarketRules) -> OddsResponse {
    let (yes_percent, no_percent) = pool_split(event.yes_pool, event.no_pool);
    OddsResponse {
        yes_percent,
        no_percent,
        yes_roi: roi_percent(event.yes_pool, event.no_pool, Side::Yes, rules.roi_probe),
        no_roi: roi_percent(event.yes_pool, event.no_pool, Side::No, rules.roi_probe),
    }
}

pub fn protocol_fee(cost: Decimal, fee_bps: u32) -> Result<Decimal, CalcError> {
    cost.checked_mul(Decimal::from(fee_bps))
        .ok_or(CalcError::Overflow)?
        .checked_div(Decimal::from(BASIS_POINTS))
        .ok_or(CalcError::Overflow)
}

pub fn price_per_point(listing: &Listing) -> Result<Decimal, CalcError> {
    if listing.points == 0 {
        return Err(CalcError::EmptyListing(listing.id));
    }
    Ok(Decimal::from(listing.price) / Decimal::from(listing.points))
}

/// Prices a partial or full purchase of `points` from `listing`. The quote is
/// linear in `points` and does not check availability, see [`can_buy`].
pub fn quote_buy(listing: &Listing, points: Points, fee_bps: u32) -> Result<BuyQuote, CalcError> {
    let price_per_point = price_per_point(listing)?;
    let cost = Decimal::from(points)
        .checked_mul(price_per_point)
        .ok_or(CalcError::Overflow)?;
    let protocol_fee = protocol_fee(cost, fee_bps)?;
    Ok(BuyQuote {
        points,
        price_per_point,
        cost,
        protocol_fee,
        seller_amount: cost - protocol_fee,
        total_cost: cost,
    })
}

pub fn can_buy(listing: &Listing, points: Points) -> bool {
    points > 0 && points <= listing.points && listing.active
}

pub fn can_stake(event: &Event, user_points: Points, amount: Points) -> bool {
    amount > 0 && amount <= user_points && event.status.is_open()
}

pub fn can_sell(earned_points: Points, rules: &MarketRules) -> bool {
    earned_points >= rules.sell_threshold
}

pub fn can_create(
    earned_points: Points,
    user_points: Points,
    points: Points,
    price: MinorUnits,
    rules: &MarketRules,
) -> bool {
    can_sell(earned_points, rules) && points > 0 && points <= user_points && price > 0
}

/// Whole currency units to minor units. Anything finer than one minor unit is
/// dropped.
pub fn to_minor_units(units: Decimal) -> Result<MinorUnits, CalcError> {
    use rust_decimal::prelude::ToPrimitive;
    if units.is_sign_negative() && !units.is_zero() {
        return Err(CalcError::Negative(units));
    }
    units
        .checked_mul(Decimal::from(MINOR_UNITS_PER_UNIT))
        .ok_or(CalcError::Overflow)?
        .trunc()
        .to_u64()
        .ok_or(CalcError::Overflow)
}

pub fn quote_listing(
    points: Points,
    price: MinorUnits,
    rules: &MarketRules,
) -> Result<ListingQuote, CalcError> {
    let price_per_point = if points > 0 {
        Decimal::from(price) / Decimal::from(points)
    } else {
        Decimal::ZERO
    };
    Ok(ListingQuote {
        points,
        price,
        price_per_point,
        listing_fee: rules.listing_fee,
        protocol_fee_on_sale: protocol_fee(Decimal::from(price), rules.protocol_fee_bps)?,
        total_cost: rules.listing_fee,
    })
}

/// Win rate in basis points, 0 when nothing was predicted yet.
pub fn win_rate_bps(wins: u32, total_predictions: u32) -> u32 {
    if total_predictions == 0 {
        return 0;
    }
    (u64::from(wins.min(total_predictions)) * u64::from(BASIS_POINTS)
        / u64::from(total_predictions)) as u32
}

#[cfg(test)]
mod test {
    use super::*;
    use rust_decimal_macros::dec;

    fn event(yes_pool: Points, no_pool: Points, status: EventStatus) -> Event {
        Event {
            id: 1,
            description: "Will it work?".to_string(),
            yes_pool,
            no_pool,
            status,
            creator: "ADMIN".to_string(),
        }
    }
    fn listing(points: Points, price: MinorUnits, active: bool) -> Listing {
        Listing {
            id: 1,
            seller: "SELLER_01".to_string(),
            points,
            price,
            active,
        }
    }

    #[test]
    fn it_works() {
        let event = event(5000, 3000, EventStatus::Resolved(true));
        let stake = Stake {
            event: 1,
            side: Side::Yes,
            amount: 500,
        };
        let payout = calculate_payout(&event, &stake).unwrap();
        assert_eq!(payout.total_pool, 8000);
        assert_eq!(payout.winning_pool, 5000);
        assert_eq!(payout.reward, dec!(800));
        assert_eq!(payout.profit, dec!(300));
        assert!(is_winning_stake(&event, &stake));
    }

    #[test]
    fn reward_is_proportional_to_the_winning_pool() {
        for (stake, total, winning) in [(1, 1, 1), (300, 6000, 4000), (7, 10, 3), (0, 5, 5)] {
            let reward = calculate_reward(stake, total, winning).unwrap();
            assert_eq!(
                reward,
                Decimal::from(stake) * Decimal::from(total) / Decimal::from(winning)
            );
        }
        assert_eq!(calculate_reward(300, 6000, 4000).unwrap(), dec!(450));
    }

    #[test]
    fn empty_winning_pool_forfeits_stake() {
        assert_eq!(calculate_reward(500, 3000, 0).unwrap(), Decimal::ZERO);
        let event = event(0, 3000, EventStatus::Resolved(true));
        let stake = Stake {
            event: 1,
            side: Side::Yes,
            amount: 500,
        };
        let payout = calculate_payout(&event, &stake).unwrap();
        assert_eq!(payout.reward, Decimal::ZERO);
        assert_eq!(payout.profit, dec!(-500));
    }

    #[test]
    fn open_event_has_no_payout() {
        let event = event(5000, 3000, EventStatus::Open);
        let stake = Stake {
            event: 1,
            side: Side::Yes,
            amount: 500,
        };
        assert_eq!(
            calculate_payout(&event, &stake),
            Err(CalcError::EventNotResolved(1))
        );
        assert!(!is_winning_stake(&event, &stake));
    }

    #[test]
    fn losing_stake_is_not_winning() {
        let event = event(2000, 4000, EventStatus::Resolved(false));
        let stake = Stake {
            event: 1,
            side: Side::Yes,
            amount: 200,
        };
        assert!(!is_winning_stake(&event, &stake));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            calculate_reward(u64::MAX, u64::MAX, 1),
            Err(CalcError::Overflow)
        );
    }

    #[test]
    fn fee_overflow_is_reported() {
        let pricey = listing(1, u64::MAX, true);
        assert_eq!(
            quote_buy(&pricey, 100_000_000, 200),
            Err(CalcError::Overflow)
        );
        assert_eq!(
            protocol_fee(Decimal::MAX, 200),
            Err(CalcError::Overflow)
        );
        assert_eq!(protocol_fee(dec!(1000000), 200), Ok(dec!(20000)));
    }

    #[test]
    fn listing_quote_survives_extreme_inputs() {
        let rules = MarketRules {
            protocol_fee_bps: u32::MAX,
            ..Default::default()
        };
        let quote = quote_listing(1, u64::MAX, &rules).unwrap();
        assert_eq!(quote.price_per_point, Decimal::from(u64::MAX));
        let quote = quote_listing(0, 0, &MarketRules::default()).unwrap();
        assert_eq!(quote.price_per_point, Decimal::ZERO);
        assert_eq!(quote.protocol_fee_on_sale, Decimal::ZERO);
    }

    #[test]
    fn extreme_pools_overflow_instead_of_wrapping() {
        let full = event(u64::MAX, 1, EventStatus::Open);
        assert_eq!(
            potential_reward(&full, Side::Yes, 1),
            Err(CalcError::Overflow)
        );
        let lopsided = event(u64::MAX - 1, 1, EventStatus::Open);
        assert_eq!(
            potential_reward(&lopsided, Side::No, u64::MAX),
            Err(CalcError::Overflow)
        );
        assert_eq!(roi_percent(u64::MAX, 1, Side::Yes, 100), None);
        assert_eq!(roi_percent(u64::MAX - 1, 1, Side::No, u64::MAX), None);
        // Large but representable pools still quote
        let roi = roi_percent(u64::MAX - 1, 1, Side::No, 100).unwrap();
        assert_eq!(roi, Decimal::from(u64::MAX - 1) * Decimal::ONE_HUNDRED);
    }

    #[test]
    fn potential_reward_follows_chosen_side() {
        let event = event(5000, 3000, EventStatus::Open);
        let yes = potential_reward(&event, Side::Yes, 100).unwrap();
        assert_eq!(yes.reward, dec!(160));
        assert_eq!(yes.profit, dec!(60));
        let no = potential_reward(&event, Side::No, 300).unwrap();
        assert_eq!(no.reward, dec!(800));
        assert_eq!(no.profit, dec!(500));
        let nothing = potential_reward(&event, Side::No, 0).unwrap();
        assert_eq!(nothing.reward, Decimal::ZERO);
    }

    #[test]
    fn roi_uses_probe_and_reports_empty_pools() {
        assert_eq!(roi_percent(5000, 3000, Side::Yes, 100), Some(dec!(60)));
        assert_eq!(
            roi_percent(5000, 3000, Side::No, 100).unwrap().round_dp(1),
            dec!(166.7)
        );
        assert_eq!(roi_percent(0, 3000, Side::Yes, 100), None);
        assert_eq!(roi_percent(0, 0, Side::No, 100), None);
    }

    #[test]
    fn pool_split_defaults_to_even() {
        assert_eq!(pool_split(0, 0), (dec!(50), dec!(50)));
        assert_eq!(pool_split(2000, 6000), (dec!(25), dec!(75)));
    }

    #[test]
    fn buy_quote_matches_listing_price() {
        let listing = listing(5000, 5_000_000, true);
        let quote = quote_buy(&listing, 1000, 200).unwrap();
        assert_eq!(quote.price_per_point, dec!(1000));
        assert_eq!(quote.cost, dec!(1000000));
        assert_eq!(quote.protocol_fee, dec!(20000));
        assert_eq!(quote.seller_amount, dec!(980000));
        assert_eq!(quote.total_cost, quote.cost);
    }

    #[test]
    fn buy_cost_is_linear() {
        let listing = listing(4000, 1_000_000, true);
        let one = quote_buy(&listing, 1, 200).unwrap();
        assert_eq!(one.price_per_point, dec!(250));
        for n in [2, 17, 3000] {
            let quote = quote_buy(&listing, n, 200).unwrap();
            assert_eq!(quote.cost, one.cost * Decimal::from(n));
            assert_eq!(quote.protocol_fee, quote.cost * dec!(0.02));
            assert_eq!(quote.seller_amount, quote.cost - quote.protocol_fee);
        }
    }

    #[test]
    fn empty_listing_has_no_price() {
        let listing = listing(0, 1_000_000, false);
        assert_eq!(quote_buy(&listing, 1, 200), Err(CalcError::EmptyListing(1)));
    }

    #[test]
    fn can_buy_checks_bounds_and_activity() {
        let active = listing(5000, 5_000_000, true);
        assert!(can_buy(&active, 1));
        assert!(can_buy(&active, 5000));
        assert!(!can_buy(&active, 0));
        assert!(!can_buy(&active, 5001));
        assert!(!can_buy(&listing(5000, 5_000_000, false), 10));
    }

    #[test]
    fn can_create_requires_eligibility() {
        let rules = MarketRules::default();
        assert!(can_create(10_000, 15_000, 5000, 1, &rules));
        assert!(!can_create(9_999, 15_000, 5000, 1, &rules));
        assert!(!can_create(12_000, 4_000, 5000, 1, &rules));
        assert!(!can_create(12_000, 15_000, 0, 1, &rules));
        assert!(!can_create(12_000, 15_000, 100, 0, &rules));
    }

    #[test]
    fn can_stake_requires_open_event() {
        let open = event(5000, 3000, EventStatus::Open);
        assert!(can_stake(&open, 1000, 1000));
        assert!(!can_stake(&open, 1000, 1001));
        assert!(!can_stake(&open, 1000, 0));
        let resolved = event(5000, 3000, EventStatus::Resolved(true));
        assert!(!can_stake(&resolved, 1000, 10));
    }

    #[test]
    fn listing_quote_charges_only_the_listing_fee() {
        let rules = MarketRules::default();
        let price = to_minor_units(dec!(5)).unwrap();
        assert_eq!(price, 5_000_000);
        let quote = quote_listing(5000, price, &rules).unwrap();
        assert_eq!(quote.total_cost, 10_000_000);
        assert_eq!(quote.listing_fee, 10_000_000);
        assert_eq!(quote.price_per_point, dec!(1000));
        assert_eq!(quote.protocol_fee_on_sale, dec!(100000));
    }

    #[test]
    fn minor_units_truncate() {
        assert_eq!(to_minor_units(dec!(0.0000019)).unwrap(), 1);
        assert_eq!(to_minor_units(dec!(2.5)).unwrap(), 2_500_000);
        assert_eq!(to_minor_units(dec!(-1)), Err(CalcError::Negative(dec!(-1))));
    }

    #[test]
    fn win_rate_in_basis_points() {
        assert_eq!(win_rate_bps(15, 25), 6000);
        assert_eq!(win_rate_bps(0, 0), 0);
        assert_eq!(win_rate_bps(3, 3), 10_000);
    }
}

//! Text the screens render for points, prices and rates.
use crate::api::{MinorUnits, Points, MINOR_UNITS_PER_UNIT};
use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY: &str = "STX";
pub const NOT_AVAILABLE: &str = "N/A";

/// `15000` -> `15,000`
pub fn group_digits(value: Points) -> String {
    group(&value.to_string())
}
fn group(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn round(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Grouped integer part with at most three fraction digits, trailing zeros
/// dropped.
pub fn group_decimal(value: Decimal) -> String {
    let value = round(value, 3).normalize();
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = value.abs();
    let int = abs.trunc();
    let fract = (abs - int).normalize();
    let int = group(&int.to_string());
    if fract.is_zero() {
        format!("{}{}", sign, int)
    } else {
        // "0.25" -> ".25"
        let fract = fract.to_string();
        format!("{}{}{}", sign, int, fract.trim_start_matches('0'))
    }
}

pub fn format_points(points: Points) -> String {
    format!("{} PTS", group_digits(points))
}
pub fn format_reward(points: Decimal) -> String {
    format!("{} PTS", group_decimal(points))
}
pub fn format_profit(points: Decimal) -> String {
    if points.is_sign_negative() && !points.is_zero() {
        format_reward(points)
    } else {
        format!("+{}", format_reward(points))
    }
}

pub fn to_units(minor: Decimal) -> Decimal {
    minor / Decimal::from(MINOR_UNITS_PER_UNIT)
}
/// Minor units as whole currency with a fixed number of places.
pub fn format_currency(minor: Decimal, places: u32) -> String {
    let units = round(to_units(minor), places);
    format!("{:.*} {}", places as usize, units, CURRENCY)
}
pub fn format_price(minor: MinorUnits) -> String {
    format_currency(Decimal::from(minor), 2)
}
/// Per-point price in thousandths of a unit, e.g. `1.000 mSTX/pt`.
pub fn format_price_per_point(price: MinorUnits, points: Points) -> String {
    if points == 0 {
        return NOT_AVAILABLE.to_string();
    }
    let milli = Decimal::from(price) / Decimal::from(points) / Decimal::ONE_THOUSAND;
    format!("{:.3} m{}/pt", round(milli, 3), CURRENCY)
}
pub fn format_win_rate(bps: u32) -> String {
    format!("{:.1}%", round(Decimal::from(bps) / Decimal::ONE_HUNDRED, 1))
}
pub fn format_percent(percent: Decimal) -> String {
    format!("{:.1}%", round(percent, 1))
}
pub fn format_roi(roi: Option<Decimal>) -> String {
    match roi {
        Some(roi) => format!("{:.1}% ROI", round(roi, 1)),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(10_000), "10,000");
        assert_eq!(group_digits(1_234_567), "1,234,567");
        assert_eq!(format_points(15000), "15,000 PTS");
    }

    #[test]
    fn rewards_keep_three_places() {
        assert_eq!(format_reward(dec!(800)), "800 PTS");
        assert_eq!(format_reward(dec!(2666.66666)), "2,666.667 PTS");
        assert_eq!(format_reward(dec!(0.25)), "0.25 PTS");
        assert_eq!(format_profit(dec!(300)), "+300 PTS");
        assert_eq!(format_profit(dec!(-500)), "-500 PTS");
    }

    #[test]
    fn rewards_beyond_u64_keep_every_digit() {
        assert_eq!(
            format_reward(dec!(100000000000000000000)),
            "100,000,000,000,000,000,000 PTS"
        );
        assert_eq!(
            format_profit(dec!(-18446744073709551616.5)),
            "-18,446,744,073,709,551,616.5 PTS"
        );
    }

    #[test]
    fn currency_and_rates() {
        assert_eq!(format_price(5_000_000), "5.00 STX");
        assert_eq!(format_currency(dec!(20000), 4), "0.0200 STX");
        assert_eq!(format_price_per_point(5_000_000, 5000), "1.000 mSTX/pt");
        assert_eq!(format_price_per_point(1, 0), "N/A");
        assert_eq!(format_win_rate(6000), "60.0%");
        assert_eq!(format_percent(dec!(62.5)), "62.5%");
        assert_eq!(format_roi(Some(dec!(166.6666))), "166.7% ROI");
        assert_eq!(format_roi(None), "N/A");
    }
}

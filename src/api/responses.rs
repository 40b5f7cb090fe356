use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::*;

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct Payout {
    pub stake: Points,
    pub total_pool: Points,
    pub winning_pool: Points,
    pub reward: Decimal,
    pub profit: Decimal,
}
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct BuyQuote {
    pub points: Points,
    pub price_per_point: Decimal,
    pub cost: Decimal,
    pub protocol_fee: Decimal,
    pub seller_amount: Decimal,
    /// What the buyer pays. The protocol fee comes out of the seller's side.
    pub total_cost: Decimal,
}
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct ListingQuote {
    pub points: Points,
    pub price: MinorUnits,
    pub price_per_point: Decimal,
    pub listing_fee: MinorUnits,
    pub protocol_fee_on_sale: Decimal,
    /// Only the listing fee is charged up front, the points are locked.
    pub total_cost: MinorUnits,
}
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct OddsResponse {
    pub yes_percent: Decimal,
    pub no_percent: Decimal,
    pub yes_roi: Option<Decimal>,
    pub no_roi: Option<Decimal>,
}
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct PortfolioSummary {
    pub points: Points,
    pub earned_points: Points,
    pub can_sell: bool,
    pub open: Vec<StakePosition>,
    pub won: Vec<StakePosition>,
    pub lost: Vec<StakePosition>,
    pub listings: Vec<Listing>,
    pub stats: Option<UserStats>,
}

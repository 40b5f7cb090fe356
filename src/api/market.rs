use serde::{Deserialize, Serialize};

pub type Points = u64;
/// Currency amount in minor units. One whole unit is [`MINOR_UNITS_PER_UNIT`].
pub type MinorUnits = u64;
pub type RowId = u64;
pub type Username = String;

pub const MINOR_UNITS_PER_UNIT: MinorUnits = 1_000_000;
pub const BASIS_POINTS: u32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: RowId,
    pub description: String,
    pub yes_pool: Points,
    pub no_pool: Points,
    pub status: EventStatus,
    pub creator: String,
}
/// `Resolved` carries the winning side, so an open event never has a winner.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EventStatus {
    Open,
    Resolved(bool),
}
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize, Hash, Default)]
pub enum Side {
    #[default]
    Yes,
    No,
}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stake {
    pub event: RowId,
    pub side: Side,
    pub amount: Points,
}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakePosition {
    pub stake: Stake,
    pub description: String,
    pub status: EventStatus,
}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    pub id: RowId,
    pub seller: Username,
    pub points: Points,
    pub price: MinorUnits,
    pub active: bool,
}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserAccount {
    pub username: Option<Username>,
    pub points: Points,
    pub earned_points: Points,
    pub stats: Option<UserStats>,
}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserStats {
    pub total_predictions: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_points_earned: Points,
    /// 0..=10000, where 10000 is 100%
    pub win_rate_bps: u32,
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::*;

// Snapshots
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    Open,
    Resolved,
}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct EventsRequest {
    pub filter: EventFilter,
}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EventRequest {
    pub event: RowId,
}

// Quotes
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuoteStakeRequest {
    pub event: RowId,
    pub side: Side,
    pub amount: Points,
}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuoteBuyRequest {
    pub listing: RowId,
    pub points: Points,
}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuoteListingRequest {
    pub points: Points,
    /// Whole currency units, converted to minor units on submit.
    pub price: Decimal,
}

// Intents. Amounts are the raw text a user typed so the service validates
// them exactly like the forms do.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StakeRequest {
    pub event: RowId,
    pub side: Side,
    pub amount: String,
}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BuyRequest {
    pub listing: RowId,
    pub points: String,
}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreateListingRequest {
    pub points: String,
    pub price: String,
}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ListingRequest {
    pub listing: RowId,
}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RegisterRequest {
    pub username: String,
}

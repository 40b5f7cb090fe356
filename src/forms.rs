//! Draft state behind the stake, claim, marketplace and registration dialogs.
//!
//! Every form keeps the raw text the user typed plus one error slot. Editing a
//! field clears the slot. `submit` either hands the parsed intent to the
//! [`Host`] or fills the slot with the single most relevant [`FormError`] and
//! returns it. Host failures of fire-and-forget intents are passed back to the
//! caller untouched; only registration shows them in the slot.
use crate::api::*;
use crate::calculator::{self, CalcError};
use crate::format;
use crate::host::Host;
use crate::settings::MarketRules;
use anyhow::Result;
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

pub const REGISTRATION_FAILED: &str = "REGISTRATION FAILED";

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum FormError {
    #[error("INVALID AMOUNT OR INSUFFICIENT POINTS")]
    InvalidStake,
    #[error("INSUFFICIENT POINTS AVAILABLE")]
    InsufficientPointsAvailable,
    #[error("INVALID AMOUNT")]
    InvalidAmount,
    #[error("NEED {}+ EARNED POINTS TO SELL", threshold(.0))]
    NotEligible(Points),
    #[error("INSUFFICIENT POINTS")]
    InsufficientPoints,
    #[error("INVALID AMOUNTS")]
    InvalidAmounts,
    #[error("EVENT NOT RESOLVED")]
    NotResolved,
    #[error("NOTHING TO CLAIM")]
    NothingToClaim,
    #[error("USERNAME REQUIRED")]
    UsernameRequired,
    #[error("USERNAME TOO LONG (MAX {0} CHARACTERS)")]
    UsernameTooLong(usize),
    #[error("{0}")]
    Registration(String),
}
fn threshold(points: &Points) -> String {
    format::group_digits(*points)
}

/// Whole, non-negative point counts. Anything else reads as zero, which every
/// form rejects.
pub fn parse_points(text: &str) -> Points {
    Decimal::from_str(text.trim())
        .ok()
        .filter(|d| d.fract().is_zero() && !d.is_sign_negative())
        .and_then(|d| d.to_u64())
        .unwrap_or(0)
}
pub fn parse_price(text: &str) -> Decimal {
    Decimal::from_str(text.trim()).unwrap_or(Decimal::ZERO)
}

fn reject(slot: &mut Option<FormError>, e: FormError) -> anyhow::Error {
    debug!("Rejected submission: {}", e);
    *slot = Some(e.clone());
    e.into()
}

#[derive(Debug, Clone)]
pub struct StakeForm {
    event: Event,
    user_points: Points,
    side: Side,
    amount: String,
    error: Option<FormError>,
}
impl StakeForm {
    /// Starts on the side of the user's stake on this event, if there is one.
    pub fn new(event: Event, user_points: Points, existing: Option<Stake>) -> Self {
        let side = existing.map(|s| s.side).unwrap_or_default();
        Self {
            event,
            user_points,
            side,
            amount: String::new(),
            error: None,
        }
    }
    pub fn side(&self) -> Side {
        self.side
    }
    pub fn select_side(&mut self, side: Side) {
        self.side = side;
    }
    pub fn edit_amount(&mut self, text: impl Into<String>) {
        self.amount = text.into();
        self.error = None;
    }
    pub fn amount(&self) -> Points {
        parse_points(&self.amount)
    }
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }
    pub fn can_submit(&self) -> bool {
        calculator::can_stake(&self.event, self.user_points, self.amount())
    }
    /// What the typed amount would collect if the selected side wins.
    pub fn potential_reward(&self) -> Result<Payout, CalcError> {
        calculator::potential_reward(&self.event, self.side, self.amount())
    }
    pub async fn submit<H: Host + Sync + ?Sized>(&mut self, host: &H) -> Result<()> {
        if !self.can_submit() {
            return Err(reject(&mut self.error, FormError::InvalidStake));
        }
        host.stake(self.event.id, self.amount(), self.side).await
    }
}

#[derive(Debug, Clone)]
pub struct ClaimForm {
    event: Event,
    stake: Stake,
    error: Option<FormError>,
}
impl ClaimForm {
    pub fn new(event: Event, stake: Stake) -> Self {
        Self {
            event,
            stake,
            error: None,
        }
    }
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }
    pub fn can_submit(&self) -> bool {
        calculator::is_winning_stake(&self.event, &self.stake)
    }
    pub fn payout(&self) -> Result<Payout, CalcError> {
        calculator::calculate_payout(&self.event, &self.stake)
    }
    pub async fn submit<H: Host + Sync + ?Sized>(&mut self, host: &H) -> Result<()> {
        if self.event.status.is_open() {
            return Err(reject(&mut self.error, FormError::NotResolved));
        }
        if !self.can_submit() {
            return Err(reject(&mut self.error, FormError::NothingToClaim));
        }
        host.claim(self.event.id).await
    }
}

#[derive(Debug, Clone)]
pub struct BuyForm {
    listing: Listing,
    fee_bps: u32,
    points: String,
    error: Option<FormError>,
}
impl BuyForm {
    pub fn new(listing: Listing, rules: &MarketRules) -> Self {
        Self {
            listing,
            fee_bps: rules.protocol_fee_bps,
            points: String::new(),
            error: None,
        }
    }
    pub fn edit_points(&mut self, text: impl Into<String>) {
        self.points = text.into();
        self.error = None;
    }
    pub fn points(&self) -> Points {
        parse_points(&self.points)
    }
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }
    pub fn can_submit(&self) -> bool {
        calculator::can_buy(&self.listing, self.points())
    }
    /// Price breakdown, shown once a positive amount is typed.
    pub fn quote(&self) -> Result<Option<BuyQuote>, CalcError> {
        match self.points() {
            0 => Ok(None),
            points => calculator::quote_buy(&self.listing, points, self.fee_bps).map(Some),
        }
    }
    pub async fn submit<H: Host + Sync + ?Sized>(&mut self, host: &H) -> Result<()> {
        let points = self.points();
        if !self.can_submit() {
            let e = if points > self.listing.points {
                FormError::InsufficientPointsAvailable
            } else {
                FormError::InvalidAmount
            };
            return Err(reject(&mut self.error, e));
        }
        host.buy(self.listing.id, points).await
    }
}

#[derive(Debug, Clone)]
pub struct CreateListingForm {
    user_points: Points,
    earned_points: Points,
    rules: MarketRules,
    points: String,
    price: String,
    error: Option<FormError>,
}
impl CreateListingForm {
    pub fn new(account: &UserAccount, rules: &MarketRules) -> Self {
        Self {
            user_points: account.points,
            earned_points: account.earned_points,
            rules: rules.clone(),
            points: String::new(),
            price: String::new(),
            error: None,
        }
    }
    pub fn edit_points(&mut self, text: impl Into<String>) {
        self.points = text.into();
        self.error = None;
    }
    /// Price of the whole listing in currency units.
    pub fn edit_price(&mut self, text: impl Into<String>) {
        self.price = text.into();
        self.error = None;
    }
    pub fn points(&self) -> Points {
        parse_points(&self.points)
    }
    /// Zero for anything that isn't a representable positive price.
    pub fn price(&self) -> MinorUnits {
        calculator::to_minor_units(parse_price(&self.price)).unwrap_or(0)
    }
    pub fn is_eligible(&self) -> bool {
        calculator::can_sell(self.earned_points, &self.rules)
    }
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }
    pub fn can_submit(&self) -> bool {
        calculator::can_create(
            self.earned_points,
            self.user_points,
            self.points(),
            self.price(),
            &self.rules,
        )
    }
    /// Cost summary, shown once both fields hold positive values.
    pub fn quote(&self) -> Option<ListingQuote> {
        let (points, price) = (self.points(), self.price());
        if points == 0 || price == 0 {
            return None;
        }
        calculator::quote_listing(points, price, &self.rules).ok()
    }
    pub async fn submit<H: Host + Sync + ?Sized>(&mut self, host: &H) -> Result<()> {
        if !self.can_submit() {
            let e = if !self.is_eligible() {
                FormError::NotEligible(self.rules.sell_threshold)
            } else if self.points() > self.user_points {
                FormError::InsufficientPoints
            } else {
                FormError::InvalidAmounts
            };
            return Err(reject(&mut self.error, e));
        }
        host.create_listing(self.points(), self.price()).await
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    max_len: usize,
    username: String,
    error: Option<FormError>,
}
impl RegistrationForm {
    pub fn new(rules: &MarketRules) -> Self {
        Self {
            max_len: rules.max_username_len,
            username: String::new(),
            error: None,
        }
    }
    pub fn edit_username(&mut self, text: impl Into<String>) {
        self.username = text.into();
        self.error = None;
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }
    pub fn can_submit(&self) -> bool {
        !self.username.trim().is_empty()
    }
    /// Registers the trimmed name and clears the draft on success. A host
    /// failure ends up in the error slot with the host's own message.
    pub async fn submit<H: Host + Sync + ?Sized>(&mut self, host: &H) -> Result<()> {
        self.error = None;
        if !self.can_submit() {
            return Err(reject(&mut self.error, FormError::UsernameRequired));
        }
        if self.username.chars().count() > self.max_len {
            return Err(reject(
                &mut self.error,
                FormError::UsernameTooLong(self.max_len),
            ));
        }
        let username = self.username.trim().to_string();
        match host.register(username.clone()).await {
            Ok(()) => {
                debug!("Registered {}", username);
                self.username.clear();
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                let message = if message.is_empty() {
                    REGISTRATION_FAILED.to_string()
                } else {
                    message
                };
                Err(reject(&mut self.error, FormError::Registration(message)))
            }
        }
    }
}

use crate::api::*;
use crate::calculator;
use crate::settings::{MarketRules, Settings};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::{debug, trace};
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Data layer and action handlers the forms and screens are wired to.
///
/// Intents are fire-and-forget: an `Ok` only means the host accepted the
/// request. `register` is the exception, its error message is shown to the
/// user as is.
#[async_trait]
pub trait Host {
    async fn register(&self, username: String) -> Result<()>;
    async fn stake(&self, event: RowId, amount: Points, side: Side) -> Result<()>;
    async fn claim(&self, event: RowId) -> Result<()>;
    async fn buy(&self, listing: RowId, points: Points) -> Result<()>;
    async fn create_listing(&self, points: Points, price: MinorUnits) -> Result<()>;
    async fn cancel_listing(&self, listing: RowId) -> Result<()>;

    async fn events(&self) -> Result<Vec<Event>>;
    async fn stakes(&self) -> Result<Vec<Stake>>;
    async fn listings(&self) -> Result<Vec<Listing>>;
    async fn account(&self) -> Result<UserAccount>;
}

#[derive(Debug, Default, Clone)]
struct MockState {
    events: Vec<Event>,
    stakes: Vec<Stake>,
    listings: Vec<Listing>,
    account: UserAccount,
    usernames: HashSet<Username>,
    claimed: HashSet<RowId>,
}
impl MockState {
    fn seeded() -> Self {
        let events = vec![
            Event {
                id: 1,
                description: "Will Bitcoin reach $100k by 2025?".to_string(),
                yes_pool: 5000,
                no_pool: 3000,
                status: EventStatus::Open,
                creator: "ADMIN".to_string(),
            },
            Event {
                id: 2,
                description: "Will Ethereum hit $5000?".to_string(),
                yes_pool: 2000,
                no_pool: 4000,
                status: EventStatus::Resolved(false),
                creator: "ADMIN".to_string(),
            },
            Event {
                id: 3,
                description: "Will Solana reach $200?".to_string(),
                yes_pool: 1500,
                no_pool: 1200,
                status: EventStatus::Open,
                creator: "ADMIN".to_string(),
            },
        ];
        let stakes = vec![
            Stake {
                event: 1,
                side: Side::Yes,
                amount: 500,
            },
            Stake {
                event: 2,
                side: Side::No,
                amount: 300,
            },
        ];
        let listings = (1..=3)
            .zip([(5000, 5), (3000, 3), (10000, 10)])
            .map(|(id, (points, units))| Listing {
                id,
                seller: format!("SELLER_0{}", id),
                points,
                price: units * MINOR_UNITS_PER_UNIT,
                active: true,
            })
            .collect::<Vec<_>>();
        let account = UserAccount {
            username: Some("PREDICTOR_01".to_string()),
            points: 15000,
            earned_points: 12000,
            stats: Some(UserStats {
                total_predictions: 25,
                wins: 15,
                losses: 10,
                total_points_earned: 12000,
                win_rate_bps: calculator::win_rate_bps(15, 25),
            }),
        };
        let mut usernames: HashSet<Username> =
            listings.iter().map(|listing| listing.seller.clone()).collect();
        usernames.insert("PREDICTOR_01".to_string());
        Self {
            events,
            stakes,
            listings,
            account,
            usernames,
            claimed: HashSet::new(),
        }
    }
    fn event_mut(&mut self, event: RowId) -> Result<&mut Event> {
        self.events
            .iter_mut()
            .find(|e| e.id == event)
            .ok_or(anyhow!("Event {} doesn't exist", event))
    }
    fn listing_mut(&mut self, listing: RowId) -> Result<&mut Listing> {
        self.listings
            .iter_mut()
            .find(|l| l.id == listing)
            .ok_or(anyhow!("Listing {} doesn't exist", listing))
    }
    fn username(&self) -> Result<Username> {
        self.account
            .username
            .clone()
            .context("Account is not registered")
    }
}

/// In-memory host serving fixed snapshots after a simulated load delay.
#[derive(Debug, Clone)]
pub struct MockHost {
    state: Arc<Mutex<MockState>>,
    rules: MarketRules,
    load_delay: Duration,
}
impl MockHost {
    /// A registered account with stakes, listings and earned points.
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::seeded())),
            rules: settings.rules.clone(),
            load_delay: settings.load_delay(),
        }
    }
    /// Same events and listings, but nobody is registered yet.
    pub fn unregistered(settings: &Settings) -> Self {
        let mut state = MockState::seeded();
        state.account = UserAccount::default();
        state.stakes.clear();
        state.usernames.remove("PREDICTOR_01");
        Self {
            state: Arc::new(Mutex::new(state)),
            rules: settings.rules.clone(),
            load_delay: settings.load_delay(),
        }
    }
    pub fn with_load_delay(mut self, load_delay: Duration) -> Self {
        self.load_delay = load_delay;
        self
    }
    async fn loading(&self) {
        if !self.load_delay.is_zero() {
            trace!("Simulating load for {:?}", self.load_delay);
            tokio::time::sleep(self.load_delay).await;
        }
    }
}
#[async_trait]
impl Host for MockHost {
    async fn register(&self, username: String) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.account.username.is_some() {
            bail!("ALREADY REGISTERED");
        }
        if state.usernames.contains(&username) {
            bail!("USERNAME ALREADY TAKEN");
        }
        state.usernames.insert(username.clone());
        state.account = UserAccount {
            username: Some(username.clone()),
            points: self.rules.starting_points,
            earned_points: 0,
            stats: None,
        };
        debug!(
            "Registered {} with {} starting points",
            username, self.rules.starting_points
        );
        Ok(())
    }
    async fn stake(&self, event: RowId, amount: Points, side: Side) -> Result<()> {
        let mut state = self.state.lock().await;
        state.username()?;
        let existing = state.stakes.iter().find(|s| s.event == event).cloned();
        if let Some(existing) = &existing {
            if existing.side != side {
                bail!("Cannot stake both sides of event {}", event);
            }
        }
        let points = state.account.points;
        let target = state.event_mut(event)?;
        if !calculator::can_stake(target, points, amount) {
            bail!("Can't stake {} points on event {}", amount, event);
        }
        let pool = target
            .pool(side)
            .checked_add(amount)
            .with_context(|| format!("{} pool of event {} overflows", side, event))?;
        let staked = existing
            .map_or(0, |s| s.amount)
            .checked_add(amount)
            .with_context(|| format!("Stake on event {} overflows", event))?;
        let balance = points
            .checked_sub(amount)
            .context("Stake exceeds the balance")?;

        let target = state.event_mut(event)?;
        match side {
            Side::Yes => target.yes_pool = pool,
            Side::No => target.no_pool = pool,
        }
        if let Some(existing) = state.stakes.iter_mut().find(|s| s.event == event) {
            existing.amount = staked;
        } else {
            state.stakes.push(Stake {
                event,
                side,
                amount,
            });
        }
        state.account.points = balance;
        debug!("Staked {} points on {} for event {}", amount, side, event);
        Ok(())
    }
    async fn claim(&self, event: RowId) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.claimed.contains(&event) {
            bail!("Reward for event {} was already claimed", event);
        }
        let target = state.event_mut(event)?.clone();
        let stake = state
            .stakes
            .iter()
            .find(|s| s.event == event)
            .cloned()
            .ok_or(anyhow!("No stake on event {}", event))?;
        if !calculator::is_winning_stake(&target, &stake) {
            bail!("Stake on event {} did not win", event);
        }
        let payout = calculator::calculate_payout(&target, &stake)?;
        let reward = payout
            .reward
            .trunc()
            .to_u64()
            .ok_or(anyhow!("Reward {} doesn't fit into points", payout.reward))?;
        let account = &state.account;
        let points = account
            .points
            .checked_add(reward)
            .context("Balance overflows")?;
        let earned_points = account
            .earned_points
            .checked_add(reward)
            .context("Earned points overflow")?;
        let total_points_earned = match &account.stats {
            Some(stats) => Some(
                stats
                    .total_points_earned
                    .checked_add(reward)
                    .context("Total points earned overflow")?,
            ),
            None => None,
        };

        state.account.points = points;
        state.account.earned_points = earned_points;
        if let (Some(stats), Some(total)) = (&mut state.account.stats, total_points_earned) {
            stats.total_points_earned = total;
        }
        state.claimed.insert(event);
        debug!("Claimed {} points from event {}", reward, event);
        Ok(())
    }
    async fn buy(&self, listing: RowId, points: Points) -> Result<()> {
        let mut state = self.state.lock().await;
        state.username()?;
        let balance = state
            .account
            .points
            .checked_add(points)
            .context("Balance overflows")?;
        let target = state.listing_mut(listing)?;
        if !calculator::can_buy(target, points) {
            bail!("Can't buy {} points from listing {}", points, listing);
        }
        target.points = target
            .points
            .checked_sub(points)
            .context("Listing has fewer points")?;
        if target.points == 0 {
            target.active = false;
        }
        state.account.points = balance;
        debug!("Bought {} points from listing {}", points, listing);
        Ok(())
    }
    async fn create_listing(&self, points: Points, price: MinorUnits) -> Result<()> {
        let mut state = self.state.lock().await;
        let seller = state.username()?;
        if !calculator::can_create(
            state.account.earned_points,
            state.account.points,
            points,
            price,
            &self.rules,
        ) {
            bail!("Can't list {} points for {}", points, price);
        }
        let balance = state
            .account
            .points
            .checked_sub(points)
            .context("Listing exceeds the balance")?;
        let id = state.listings.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        state.listings.push(Listing {
            id,
            seller,
            points,
            price,
            active: true,
        });
        state.account.points = balance;
        debug!("Created listing {} with {} points for {}", id, points, price);
        Ok(())
    }
    async fn cancel_listing(&self, listing: RowId) -> Result<()> {
        let mut state = self.state.lock().await;
        let seller = state.username()?;
        let balance = state.account.points;
        let target = state.listing_mut(listing)?;
        if target.seller != seller {
            bail!("Listing {} belongs to {}", listing, target.seller);
        }
        if !target.active {
            bail!("Listing {} is not active", listing);
        }
        let remaining = target.points;
        let balance = balance
            .checked_add(remaining)
            .context("Balance overflows")?;
        target.active = false;
        state.account.points = balance;
        debug!("Cancelled listing {}, returned {} points", listing, remaining);
        Ok(())
    }

    async fn events(&self) -> Result<Vec<Event>> {
        self.loading().await;
        Ok(self.state.lock().await.events.clone())
    }
    async fn stakes(&self) -> Result<Vec<Stake>> {
        self.loading().await;
        Ok(self.state.lock().await.stakes.clone())
    }
    async fn listings(&self) -> Result<Vec<Listing>> {
        self.loading().await;
        Ok(self.state.lock().await.listings.clone())
    }
    async fn account(&self) -> Result<UserAccount> {
        self.loading().await;
        Ok(self.state.lock().await.account.clone())
    }
}

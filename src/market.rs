use crate::api::*;
use crate::calculator;
use crate::forms::{BuyForm, ClaimForm, CreateListingForm, RegistrationForm, StakeForm};
use crate::host::Host;
use crate::overview;
use crate::settings::MarketRules;
use anyhow::{anyhow, Context, Result};
use log::debug;

/// Answers quotes from host snapshots and routes intents through the same
/// forms a user would fill in.
pub struct Market {
    host: Box<dyn Host + Send + Sync>,
    rules: MarketRules,
}
impl Market {
    pub fn new(host: Box<dyn Host + Send + Sync>, rules: MarketRules) -> Self {
        Self { host, rules }
    }
    async fn get_event(&self, event: RowId) -> Result<Event> {
        self.host
            .events()
            .await?
            .into_iter()
            .find(|e| e.id == event)
            .ok_or(anyhow!("Event {} doesn't exist", event))
    }
    async fn get_listing(&self, listing: RowId) -> Result<Listing> {
        self.host
            .listings()
            .await?
            .into_iter()
            .find(|l| l.id == listing)
            .ok_or(anyhow!("Listing {} doesn't exist", listing))
    }
    async fn get_stake(&self, event: RowId) -> Result<Option<Stake>> {
        let stakes = self.host.stakes().await?;
        Ok(overview::stake_for(&stakes, event).cloned())
    }

    pub async fn get_events(&self, filter: EventFilter) -> Result<Vec<Event>> {
        let events = self.host.events().await?;
        Ok(overview::filter_events(&events, filter))
    }
    pub async fn get_listings(&self) -> Result<Vec<Listing>> {
        let listings = self.host.listings().await?;
        Ok(overview::active_listings(&listings))
    }
    pub async fn get_account(&self) -> Result<UserAccount> {
        self.host.account().await
    }
    pub async fn get_positions(&self) -> Result<Vec<StakePosition>> {
        let (events, stakes) = tokio::try_join!(self.host.events(), self.host.stakes())?;
        Ok(overview::positions(&events, &stakes))
    }
    pub async fn get_portfolio(&self) -> Result<PortfolioSummary> {
        overview::load_portfolio(&*self.host, &self.rules).await
    }
    pub async fn get_odds(&self, event: RowId) -> Result<OddsResponse> {
        let event = self.get_event(event).await?;
        Ok(calculator::odds(&event, &self.rules))
    }

    pub async fn quote_stake(&self, request: QuoteStakeRequest) -> Result<Payout> {
        let event = self.get_event(request.event).await?;
        let payout = calculator::potential_reward(&event, request.side, request.amount)?;
        Ok(payout)
    }
    pub async fn quote_claim(&self, event: RowId) -> Result<Payout> {
        let event = self.get_event(event).await?;
        let stake = self
            .get_stake(event.id)
            .await?
            .with_context(|| format!("No stake on event {}", event.id))?;
        let payout = calculator::calculate_payout(&event, &stake)?;
        Ok(payout)
    }
    pub async fn quote_buy(&self, request: QuoteBuyRequest) -> Result<BuyQuote> {
        let listing = self.get_listing(request.listing).await?;
        let quote = calculator::quote_buy(&listing, request.points, self.rules.protocol_fee_bps)?;
        Ok(quote)
    }
    pub fn quote_listing(&self, request: QuoteListingRequest) -> Result<ListingQuote> {
        let price = calculator::to_minor_units(request.price)?;
        let quote = calculator::quote_listing(request.points, price, &self.rules)?;
        Ok(quote)
    }

    pub async fn stake(&self, request: StakeRequest) -> Result<()> {
        let (event, stake, account) = tokio::try_join!(
            self.get_event(request.event),
            self.get_stake(request.event),
            self.host.account()
        )?;
        let mut form = StakeForm::new(event, account.points, stake);
        form.select_side(request.side);
        form.edit_amount(request.amount);
        form.submit(&*self.host).await?;
        debug!(
            "Forwarded stake of {} on {} for event {}",
            form.amount(),
            request.side,
            request.event
        );
        Ok(())
    }
    pub async fn claim(&self, event: RowId) -> Result<()> {
        let event = self.get_event(event).await?;
        let stake = self
            .get_stake(event.id)
            .await?
            .with_context(|| format!("No stake on event {}", event.id))?;
        let mut form = ClaimForm::new(event, stake);
        form.submit(&*self.host).await
    }
    pub async fn buy(&self, request: BuyRequest) -> Result<()> {
        let listing = self.get_listing(request.listing).await?;
        let mut form = BuyForm::new(listing, &self.rules);
        form.edit_points(request.points);
        form.submit(&*self.host).await
    }
    pub async fn create_listing(&self, request: CreateListingRequest) -> Result<()> {
        let account = self.host.account().await?;
        let mut form = CreateListingForm::new(&account, &self.rules);
        form.edit_points(request.points);
        form.edit_price(request.price);
        form.submit(&*self.host).await
    }
    pub async fn cancel_listing(&self, listing: RowId) -> Result<()> {
        self.host.cancel_listing(listing).await
    }
    pub async fn register(&self, username: String) -> Result<()> {
        let mut form = RegistrationForm::new(&self.rules);
        form.edit_username(username);
        form.submit(&*self.host).await
    }
}

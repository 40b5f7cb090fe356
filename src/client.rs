use anyhow::{bail, Result};
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::api::*;

#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    client: reqwest::Client,
}
impl Client {
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::new();
        Self { url, client }
    }
    async fn post(&self, path: &'static str, request: impl Serialize) -> Result<Response> {
        let response = self
            .client
            .post(self.url.clone() + path)
            .json(&request)
            .send()
            .await?;
        bail_if_err(response).await
    }
    async fn get(&self, path: &'static str) -> Result<Response> {
        let response = self.client.get(self.url.clone() + path).send().await?;
        bail_if_err(response).await
    }
    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &'static str,
        request: impl Serialize,
    ) -> Result<T> {
        Ok(self.post(path, request).await?.json::<T>().await?)
    }
    async fn get_json<T: DeserializeOwned>(&self, path: &'static str) -> Result<T> {
        Ok(self.get(path).await?.json::<T>().await?)
    }

    pub async fn get_events(&self, request: EventsRequest) -> Result<Vec<Event>> {
        self.post_json("/get_events", request).await
    }
    pub async fn get_listings(&self) -> Result<Vec<Listing>> {
        self.get_json("/get_listings").await
    }
    pub async fn get_account(&self) -> Result<UserAccount> {
        self.get_json("/get_account").await
    }
    pub async fn get_positions(&self) -> Result<Vec<StakePosition>> {
        self.get_json("/get_positions").await
    }
    pub async fn get_portfolio(&self) -> Result<PortfolioSummary> {
        self.get_json("/get_portfolio").await
    }
    pub async fn get_odds(&self, request: EventRequest) -> Result<OddsResponse> {
        self.post_json("/get_odds", request).await
    }
    pub async fn quote_stake(&self, request: QuoteStakeRequest) -> Result<Payout> {
        self.post_json("/quote_stake", request).await
    }
    pub async fn quote_claim(&self, request: EventRequest) -> Result<Payout> {
        self.post_json("/quote_claim", request).await
    }
    pub async fn quote_buy(&self, request: QuoteBuyRequest) -> Result<BuyQuote> {
        self.post_json("/quote_buy", request).await
    }
    pub async fn quote_listing(&self, request: QuoteListingRequest) -> Result<ListingQuote> {
        self.post_json("/quote_listing", request).await
    }
    pub async fn stake(&self, request: StakeRequest) -> Result<()> {
        self.post("/stake", request).await?;
        Ok(())
    }
    pub async fn claim(&self, request: EventRequest) -> Result<()> {
        self.post("/claim", request).await?;
        Ok(())
    }
    pub async fn buy(&self, request: BuyRequest) -> Result<()> {
        self.post("/buy", request).await?;
        Ok(())
    }
    pub async fn create_listing(&self, request: CreateListingRequest) -> Result<()> {
        self.post("/create_listing", request).await?;
        Ok(())
    }
    pub async fn cancel_listing(&self, request: ListingRequest) -> Result<()> {
        self.post("/cancel_listing", request).await?;
        Ok(())
    }
    pub async fn register(&self, request: RegisterRequest) -> Result<()> {
        self.post("/register", request).await?;
        Ok(())
    }
}
async fn bail_if_err(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await?;
    if status == StatusCode::BAD_REQUEST {
        // Validation messages are meant to be shown as they are.
        bail!("{}", text)
    }
    bail!("{}: {}", status, text)
}

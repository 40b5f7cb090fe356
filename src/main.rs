use anyhow::{Context, Result};
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use axum_macros::debug_handler;
use clap::Parser;
use env_logger::{Builder, WriteStyle};
use log::{debug, info, LevelFilter};
use pointsmarket::api::*;
use pointsmarket::host::MockHost;
use pointsmarket::market::Market;
use pointsmarket::settings::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

type HandlerResult<T> = Result<T, (StatusCode, String)>;

#[debug_handler]
async fn get_events(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<EventsRequest>,
) -> HandlerResult<Json<Vec<Event>>> {
    let market = state.read().await;
    let events = market
        .get_events(request.filter)
        .await
        .map_err(map_any_err_and_code)?;
    Ok(Json(events))
}
async fn get_listings(State(state): State<Arc<RwLock<Market>>>) -> HandlerResult<Json<Vec<Listing>>> {
    let market = state.read().await;
    let listings = market.get_listings().await.map_err(map_any_err_and_code)?;
    Ok(Json(listings))
}
async fn get_account(State(state): State<Arc<RwLock<Market>>>) -> HandlerResult<Json<UserAccount>> {
    let market = state.read().await;
    let account = market.get_account().await.map_err(map_any_err_and_code)?;
    Ok(Json(account))
}
async fn get_positions(State(state): State<Arc<RwLock<Market>>>) -> HandlerResult<Json<Vec<StakePosition>>> {
    let market = state.read().await;
    let positions = market.get_positions().await.map_err(map_any_err_and_code)?;
    Ok(Json(positions))
}
async fn get_portfolio(State(state): State<Arc<RwLock<Market>>>) -> HandlerResult<Json<PortfolioSummary>> {
    let market = state.read().await;
    let portfolio = market.get_portfolio().await.map_err(map_any_err_and_code)?;
    Ok(Json(portfolio))
}
#[debug_handler]
async fn get_odds(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<EventRequest>,
) -> HandlerResult<Json<OddsResponse>> {
    let market = state.read().await;
    let odds = market
        .get_odds(request.event)
        .await
        .map_err(map_any_err_and_code)?;
    Ok(Json(odds))
}

async fn quote_stake(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<QuoteStakeRequest>,
) -> HandlerResult<Json<Payout>> {
    let market = state.read().await;
    let payout = market
        .quote_stake(request)
        .await
        .map_err(map_any_err_and_code)?;
    Ok(Json(payout))
}
async fn quote_claim(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<EventRequest>,
) -> HandlerResult<Json<Payout>> {
    let market = state.read().await;
    let payout = market
        .quote_claim(request.event)
        .await
        .map_err(map_any_err_and_code)?;
    Ok(Json(payout))
}
async fn quote_buy(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<QuoteBuyRequest>,
) -> HandlerResult<Json<BuyQuote>> {
    let market = state.read().await;
    let quote = market
        .quote_buy(request)
        .await
        .map_err(map_any_err_and_code)?;
    Ok(Json(quote))
}
async fn quote_listing(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<QuoteListingRequest>,
) -> HandlerResult<Json<ListingQuote>> {
    let market = state.read().await;
    let quote = market
        .quote_listing(request)
        .map_err(map_any_err_and_code)?;
    Ok(Json(quote))
}

#[debug_handler]
async fn stake(State(state): State<Arc<RwLock<Market>>>, Json(request): Json<StakeRequest>) -> HandlerResult<()> {
    let market = state.write().await;
    debug!(
        "Staking {} on {} for event {}",
        request.amount, request.side, request.event
    );
    market.stake(request).await.map_err(map_any_err_and_code)?;
    Ok(())
}
async fn claim(State(state): State<Arc<RwLock<Market>>>, Json(request): Json<EventRequest>) -> HandlerResult<()> {
    let market = state.write().await;
    market
        .claim(request.event)
        .await
        .map_err(map_any_err_and_code)?;
    debug!("Claimed reward for event {}", request.event);
    Ok(())
}
async fn buy(State(state): State<Arc<RwLock<Market>>>, Json(request): Json<BuyRequest>) -> HandlerResult<()> {
    let market = state.write().await;
    debug!(
        "Buying {} points from listing {}",
        request.points, request.listing
    );
    market.buy(request).await.map_err(map_any_err_and_code)?;
    Ok(())
}
async fn create_listing(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<CreateListingRequest>,
) -> HandlerResult<StatusCode> {
    let market = state.write().await;
    debug!(
        "Listing {} points for {} {}",
        request.points,
        request.price,
        pointsmarket::format::CURRENCY
    );
    market
        .create_listing(request)
        .await
        .map_err(map_any_err_and_code)?;
    Ok(StatusCode::CREATED)
}
async fn cancel_listing(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<ListingRequest>,
) -> HandlerResult<()> {
    let market = state.write().await;
    market
        .cancel_listing(request.listing)
        .await
        .map_err(map_any_err_and_code)?;
    debug!("Cancelled listing {}", request.listing);
    Ok(())
}
async fn register(
    State(state): State<Arc<RwLock<Market>>>,
    Json(request): Json<RegisterRequest>,
) -> HandlerResult<StatusCode> {
    let market = state.write().await;
    market
        .register(request.username.clone())
        .await
        .map_err(map_any_err_and_code)?;
    debug!("Registered {}", request.username);
    Ok(StatusCode::CREATED)
}

#[derive(Parser)]
struct Args {
    #[arg(short, long)]
    port: Option<u16>,
    /// Settings file, without extension.
    #[arg(short, long)]
    config: Option<String>,
    /// Start without a registered account.
    #[arg(short, long)]
    unregistered: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    Builder::default()
        .filter_level(LevelFilter::Debug)
        .write_style(WriteStyle::Always)
        .init();
    let cli = Args::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        settings.port = port;
    }
    let (_port, handle) = run_server(settings, cli.unregistered).await?;
    handle.await?;
    Ok(())
}

async fn run_server(settings: Settings, unregistered: bool) -> Result<(u16, JoinHandle<()>)> {
    let host = if unregistered {
        MockHost::unregistered(&settings)
    } else {
        MockHost::new(&settings)
    };
    let state = Arc::new(RwLock::new(Market::new(
        Box::new(host),
        settings.rules.clone(),
    )));
    let app = Router::new()
        .route("/get_events", post(get_events))
        .route("/get_listings", get(get_listings))
        .route("/get_account", get(get_account))
        .route("/get_positions", get(get_positions))
        .route("/get_portfolio", get(get_portfolio))
        .route("/get_odds", post(get_odds))
        .route("/quote_stake", post(quote_stake))
        .route("/quote_claim", post(quote_claim))
        .route("/quote_buy", post(quote_buy))
        .route("/quote_listing", post(quote_listing))
        .route("/stake", post(stake))
        .route("/claim", post(claim))
        .route("/buy", post(buy))
        .route("/create_listing", post(create_listing))
        .route("/cancel_listing", post(cancel_listing))
        .route("/register", post(register))
        .with_state(state);

    let addr: SocketAddr = format!("127.0.0.1:{}", settings.port)
        .parse()
        .context("invalid listen address")?;
    let server = axum::Server::try_bind(&addr)?.serve(app.into_make_service());
    let port = server.local_addr().port();
    info!("Listening on {}", server.local_addr());
    let handle = tokio::spawn(async move {
        if let Err(e) = server.await {
            log::error!("Server stopped: {}", e);
        }
    });
    Ok((port, handle))
}

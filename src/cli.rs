use anyhow::Result;
use clap::{Parser, Subcommand};
use pointsmarket::api::*;
use pointsmarket::client::Client;
use pointsmarket::format::*;
use rust_decimal::Decimal;

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, default_value = "http://127.0.0.1:8081")]
    url: String,
}
#[derive(Subcommand)]
enum Commands {
    GetEvents {
        #[arg(short, long)]
        open: bool,
        #[arg(short, long)]
        resolved: bool,
    },
    GetOdds {
        #[arg(short, long)]
        event: RowId,
    },
    GetListings,
    GetAccount,
    GetPortfolio,
    QuoteStake {
        #[arg(short, long)]
        event: RowId,
        #[arg(short, long)]
        side: Side,
        #[arg(short, long)]
        amount: Points,
    },
    QuoteClaim {
        #[arg(short, long)]
        event: RowId,
    },
    QuoteBuy {
        #[arg(short, long)]
        listing: RowId,
        #[arg(short, long)]
        points: Points,
    },
    QuoteListing {
        #[arg(short, long)]
        points: Points,
        #[arg(long)]
        price: Decimal,
    },
    Stake {
        #[arg(short, long)]
        event: RowId,
        #[arg(short, long)]
        side: Side,
        #[arg(short, long)]
        amount: String,
    },
    Claim {
        #[arg(short, long)]
        event: RowId,
    },
    Buy {
        #[arg(short, long)]
        listing: RowId,
        #[arg(short, long)]
        points: String,
    },
    CreateListing {
        #[arg(short, long)]
        points: String,
        #[arg(long)]
        price: String,
    },
    CancelListing {
        #[arg(short, long)]
        listing: RowId,
    },
    Register {
        #[arg(short, long)]
        username: String,
    },
}

fn print_event(event: &Event) {
    println!(
        "#{} {} [{}] YES {} / NO {}",
        event.id,
        event.description,
        event.status,
        format_points(event.yes_pool),
        format_points(event.no_pool)
    );
}
fn print_listing(listing: &Listing) {
    println!(
        "#{} {} sells {} for {} ({})",
        listing.id,
        listing.seller,
        format_points(listing.points),
        format_price(listing.price),
        format_price_per_point(listing.price, listing.points)
    );
}
fn print_positions(title: &str, positions: &[StakePosition]) {
    println!("{} ({})", title, positions.len());
    for position in positions {
        println!(
            "  #{} {}: {} on {}",
            position.stake.event,
            position.description,
            format_points(position.stake.amount),
            position.stake.side
        );
    }
}
fn print_payout(payout: &Payout) {
    println!("Stake:  {}", format_points(payout.stake));
    println!("Reward: {}", format_reward(payout.reward));
    println!("Profit: {}", format_profit(payout.profit));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Args::parse();
    let client = Client::new(cli.url);

    match cli.command {
        Commands::GetEvents { open, resolved } => {
            let filter = match (open, resolved) {
                (true, false) => EventFilter::Open,
                (false, true) => EventFilter::Resolved,
                _ => EventFilter::All,
            };
            for event in client.get_events(EventsRequest { filter }).await? {
                print_event(&event);
            }
        }
        Commands::GetOdds { event } => {
            let odds = client.get_odds(EventRequest { event }).await?;
            println!(
                "YES {} ({})",
                format_percent(odds.yes_percent),
                format_roi(odds.yes_roi)
            );
            println!(
                "NO  {} ({})",
                format_percent(odds.no_percent),
                format_roi(odds.no_roi)
            );
        }
        Commands::GetListings => {
            for listing in client.get_listings().await? {
                print_listing(&listing);
            }
        }
        Commands::GetAccount => {
            let account = client.get_account().await?;
            println!(
                "{}: {} ({} earned)",
                account.username.as_deref().unwrap_or("UNREGISTERED"),
                format_points(account.points),
                format_points(account.earned_points)
            );
            if let Some(stats) = account.stats {
                println!(
                    "{} predictions, {} won, {} lost, win rate {}",
                    stats.total_predictions,
                    stats.wins,
                    stats.losses,
                    format_win_rate(stats.win_rate_bps)
                );
            }
        }
        Commands::GetPortfolio => {
            let portfolio = client.get_portfolio().await?;
            println!(
                "{} ({} earned)",
                format_points(portfolio.points),
                format_points(portfolio.earned_points)
            );
            if !portfolio.can_sell {
                println!("Selling is locked");
            }
            print_positions("Open", &portfolio.open);
            print_positions("Won", &portfolio.won);
            print_positions("Lost", &portfolio.lost);
            println!("Listings ({})", portfolio.listings.len());
            for listing in &portfolio.listings {
                print_listing(listing);
            }
        }
        Commands::QuoteStake {
            event,
            side,
            amount,
        } => {
            let request = QuoteStakeRequest {
                event,
                side,
                amount,
            };
            print_payout(&client.quote_stake(request).await?);
        }
        Commands::QuoteClaim { event } => {
            print_payout(&client.quote_claim(EventRequest { event }).await?);
        }
        Commands::QuoteBuy { listing, points } => {
            let quote = client.quote_buy(QuoteBuyRequest { listing, points }).await?;
            println!("Points:       {}", format_points(quote.points));
            println!("Cost:         {}", format_currency(quote.cost, 2));
            println!("Protocol fee: {}", format_currency(quote.protocol_fee, 4));
            println!("Seller gets:  {}", format_currency(quote.seller_amount, 2));
            println!("Total:        {}", format_currency(quote.total_cost, 2));
        }
        Commands::QuoteListing { points, price } => {
            let quote = client
                .quote_listing(QuoteListingRequest { points, price })
                .await?;
            println!(
                "Price per point: {}",
                format_price_per_point(quote.price, quote.points)
            );
            println!("Listing fee:     {}", format_price(quote.listing_fee));
            println!(
                "Fee on sale:     {}",
                format_currency(quote.protocol_fee_on_sale, 4)
            );
            println!("Due now:         {}", format_price(quote.total_cost));
        }
        Commands::Stake {
            event,
            side,
            amount,
        } => {
            let request = StakeRequest {
                event,
                side,
                amount,
            };
            client.stake(request).await?;
            println!("Stake submitted");
        }
        Commands::Claim { event } => {
            client.claim(EventRequest { event }).await?;
            println!("Claim submitted");
        }
        Commands::Buy { listing, points } => {
            client.buy(BuyRequest { listing, points }).await?;
            println!("Purchase submitted");
        }
        Commands::CreateListing { points, price } => {
            client
                .create_listing(CreateListingRequest { points, price })
                .await?;
            println!("Listing created");
        }
        Commands::CancelListing { listing } => {
            client.cancel_listing(ListingRequest { listing }).await?;
            println!("Listing {} cancelled", listing);
        }
        Commands::Register { username } => {
            client.register(RegisterRequest { username }).await?;
            println!("Registered");
        }
    }
    Ok(())
}

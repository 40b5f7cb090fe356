use crate::api::*;
use crate::calculator;
use crate::host::Host;
use crate::settings::MarketRules;
use anyhow::Result;
use log::debug;

pub const CLAIM_AVAILABLE: &str = "CLAIM AVAILABLE";
pub const YOU_LOST: &str = "YOU LOST";
pub const NO_STAKE: &str = "NO STAKE";

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum StakeOutcome {
    Open,
    Won,
    Lost,
}

pub fn filter_events(events: &[Event], filter: EventFilter) -> Vec<Event> {
    events
        .iter()
        .filter(|event| match filter {
            EventFilter::All => true,
            EventFilter::Open => event.status.is_open(),
            EventFilter::Resolved => !event.status.is_open(),
        })
        .cloned()
        .collect()
}

pub fn active_listings(listings: &[Listing]) -> Vec<Listing> {
    listings.iter().filter(|l| l.active).cloned().collect()
}

pub fn stake_for(stakes: &[Stake], event: RowId) -> Option<&Stake> {
    stakes.iter().find(|s| s.event == event)
}

/// Stakes joined with their events. Stakes on unknown events are skipped.
pub fn positions(events: &[Event], stakes: &[Stake]) -> Vec<StakePosition> {
    stakes
        .iter()
        .filter_map(|stake| {
            let event = events.iter().find(|e| e.id == stake.event);
            if event.is_none() {
                debug!("Skipping stake on unknown event {}", stake.event);
            }
            event.map(|event| StakePosition::new(stake.clone(), event))
        })
        .collect()
}

pub fn outcome(position: &StakePosition) -> StakeOutcome {
    match position.status.winner() {
        None => StakeOutcome::Open,
        Some(winner) if winner == position.stake.side => StakeOutcome::Won,
        Some(_) => StakeOutcome::Lost,
    }
}

/// Status line under a resolved event. `None` while the event is open.
pub fn resolution_label(event: &Event, stake: Option<&Stake>) -> Option<&'static str> {
    if event.status.is_open() {
        return None;
    }
    Some(match stake {
        Some(stake) if calculator::is_winning_stake(event, stake) => CLAIM_AVAILABLE,
        Some(_) => YOU_LOST,
        None => NO_STAKE,
    })
}

pub fn portfolio(
    account: &UserAccount,
    events: &[Event],
    stakes: &[Stake],
    listings: &[Listing],
    rules: &MarketRules,
) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        points: account.points,
        earned_points: account.earned_points,
        can_sell: calculator::can_sell(account.earned_points, rules),
        stats: account.stats.clone(),
        ..Default::default()
    };
    for position in positions(events, stakes) {
        match outcome(&position) {
            StakeOutcome::Open => summary.open.push(position),
            StakeOutcome::Won => summary.won.push(position),
            StakeOutcome::Lost => summary.lost.push(position),
        }
    }
    summary.listings = listings
        .iter()
        .filter(|l| account.username.as_ref() == Some(&l.seller))
        .cloned()
        .collect();
    summary
}

/// Fetches every snapshot the portfolio needs at once.
pub async fn load_portfolio<H: Host + Sync + ?Sized>(
    host: &H,
    rules: &MarketRules,
) -> Result<PortfolioSummary> {
    let (account, events, stakes, listings) = tokio::try_join!(
        host.account(),
        host.events(),
        host.stakes(),
        host.listings()
    )?;
    Ok(portfolio(&account, &events, &stakes, &listings, rules))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::host::MockHost;
    use crate::settings::Settings;
    use std::time::Duration;

    fn host() -> MockHost {
        MockHost::new(&Settings::default()).with_load_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn filters_by_status() {
        let events = host().events().await.unwrap();
        assert_eq!(filter_events(&events, EventFilter::All).len(), 3);
        let open = filter_events(&events, EventFilter::Open);
        assert_eq!(open.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 3]);
        let resolved = filter_events(&events, EventFilter::Resolved);
        assert_eq!(resolved.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn labels_resolved_events() {
        let host = host();
        let events = host.events().await.unwrap();
        let stakes = host.stakes().await.unwrap();
        assert_eq!(resolution_label(&events[0], stake_for(&stakes, 1)), None);
        assert_eq!(
            resolution_label(&events[1], stake_for(&stakes, 2)),
            Some(CLAIM_AVAILABLE)
        );
        let lost = Stake {
            event: 2,
            side: Side::Yes,
            amount: 1,
        };
        assert_eq!(resolution_label(&events[1], Some(&lost)), Some(YOU_LOST));
        assert_eq!(resolution_label(&events[1], None), Some(NO_STAKE));
    }

    #[tokio::test]
    async fn portfolio_sorts_positions() {
        let host = host();
        host.create_listing(1000, 1_000_000).await.unwrap();
        let summary = load_portfolio(&host, &MarketRules::default())
            .await
            .unwrap();
        assert_eq!(summary.points, 14000);
        assert!(summary.can_sell);
        assert_eq!(summary.open.len(), 1);
        assert_eq!(summary.won.len(), 1);
        assert_eq!(summary.won[0].stake.amount, 300);
        assert!(summary.lost.is_empty());
        assert_eq!(summary.listings.len(), 1);
        assert_eq!(summary.stats.unwrap().win_rate_bps, 6000);
    }

    #[test]
    fn unknown_events_are_skipped() {
        let stakes = vec![Stake {
            event: 9,
            side: Side::No,
            amount: 1,
        }];
        assert!(positions(&[], &stakes).is_empty());
    }

    #[test]
    fn inactive_listings_are_hidden() {
        let listings = vec![
            Listing {
                id: 1,
                seller: "A".to_string(),
                points: 1,
                price: 1,
                active: true,
            },
            Listing {
                id: 2,
                seller: "B".to_string(),
                points: 0,
                price: 1,
                active: false,
            },
        ];
        assert_eq!(active_listings(&listings).len(), 1);
    }
}

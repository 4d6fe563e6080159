use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use xend_market_sdk::{
    ExternalLinks, MarketDataPoller, MarketSnapshot, PollerConfig, SiteController, TickerState,
};

fn print_state(state: &TickerState, config: &PollerConfig) {
    println!("\n{:-<50}", "");
    println!("{:<20} {}", "Price", state.headline_price);

    let Some(stats) = state.snapshot.stats() else {
        println!("Waiting for market data...");
        return;
    };

    println!("{:<20} {}", "24h Change", stats.price_change_display());
    println!("{:<20} {}", "Market Cap", stats.market_cap);
    println!("{:<20} {}", "24h Volume", stats.volume_24h);
    println!("{:<20} {}", "Circulating Supply", stats.circulating_supply);
    println!(
        "{:<20} {} ({})",
        "All-Time High",
        stats.ath,
        stats.ath_change_display()
    );
    println!(
        "{:<20} {} ({})",
        "All-Time Low",
        stats.atl,
        stats.atl_change_display(config.atl_sign_policy)
    );
    if let MarketSnapshot::PartialPriceOnly(_) = state.snapshot {
        println!("(supply and all-time figures may be out of date)");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PollerConfig::from_env()?;
    let poller = Arc::new(MarketDataPoller::new(config.clone())?);
    let site = SiteController::new(poller.clone(), ExternalLinks::token()?);

    println!("JUST XEND IT! ({})", site.links().jupiter_swap);
    let mut updates = poller.subscribe();
    site.enter().await?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print_state(&state, &config);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    site.leave().await?;
    let metrics = poller.get_metrics().await;
    println!(
        "\nticks: full={} partial={} placeholder={} (primary p50={:.0}ms)",
        metrics.ticks.full,
        metrics.ticks.partial,
        metrics.ticks.placeholder,
        metrics.primary.latency_p50_ms
    );

    Ok(())
}

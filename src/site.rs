//! Site controller
//!
//! Owns the current page, the selected tab and the poller. The only coupling
//! between navigation and polling is that reaching `Home` starts the poller
//! and leaving it stops the poller.

use crate::{
    error::NavigationError,
    links::ExternalLinks,
    navigation::{NavEvent, Page, Tab},
    poller::MarketDataPoller,
    types::TickerState,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::sleep;

/// Page state plus the poller it drives, shared with the transition task
struct Navigator {
    page: RwLock<Page>,
    poller: Arc<MarketDataPoller>,
}

impl Navigator {
    async fn dispatch(&self, event: NavEvent) -> Result<Page, NavigationError> {
        let mut page = self.page.write().await;
        let from = *page;
        let to = from.next(event)?;

        if to.shows_market_data() && !from.shows_market_data() {
            self.poller.start(self.poller.config().poll_interval).await;
        } else if from.shows_market_data() && !to.shows_market_data() {
            self.poller.stop().await;
        }

        *page = to;
        tracing::debug!(from = ?from, to = ?to, "Page changed");
        Ok(to)
    }
}

/// Site controller
///
/// Holds the page machine, the selected tab, the poller and the outbound
/// links for one visitor.
pub struct SiteController {
    nav: Arc<Navigator>,
    tab: RwLock<Tab>,
    links: ExternalLinks,
}

impl SiteController {
    /// Creates a controller on the splash page
    pub fn new(poller: Arc<MarketDataPoller>, links: ExternalLinks) -> Self {
        Self {
            nav: Arc::new(Navigator {
                page: RwLock::new(Page::Splash),
                poller,
            }),
            tab: RwLock::new(Tab::default()),
            links,
        }
    }

    /// Applies one navigation event, starting or stopping the poller when
    /// `Home` is entered or left
    pub async fn dispatch(&self, event: NavEvent) -> Result<Page, NavigationError> {
        self.nav.dispatch(event).await
    }

    /// Splash click: plays the transition, then lands on `Home`
    ///
    /// The delayed move to `Home` runs on its own task, so it still happens
    /// if the returned future is dropped before the transition ends.
    pub async fn enter(&self) -> Result<Page, NavigationError> {
        self.nav.dispatch(NavEvent::Enter).await?;

        let nav = self.nav.clone();
        let delay = nav.poller.config().transition_duration;
        let transition = tokio::spawn(async move {
            sleep(delay).await;
            nav.dispatch(NavEvent::TransitionElapsed).await
        });

        transition.await.map_err(|e| {
            tracing::error!(error = %e, "Page transition task failed");
            NavigationError::TransitionAborted
        })?
    }

    /// Leaves `Home` for the splash page
    pub async fn leave(&self) -> Result<Page, NavigationError> {
        self.nav.dispatch(NavEvent::Leave).await
    }

    /// Current page
    pub async fn page(&self) -> Page {
        *self.nav.page.read().await
    }

    /// Switches the home page tab; never touches the poller
    pub async fn select_tab(&self, tab: Tab) {
        *self.tab.write().await = tab;
    }

    /// Selected tab
    pub async fn tab(&self) -> Tab {
        *self.tab.read().await
    }

    /// Latest published market data
    pub async fn ticker(&self) -> TickerState {
        self.nav.poller.state().await
    }

    /// The poller driven by this controller
    pub fn poller(&self) -> &Arc<MarketDataPoller> {
        &self.nav.poller
    }

    /// Swap, chart and social links
    pub fn links(&self) -> &ExternalLinks {
        &self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollerConfig;
    use crate::provider::mock::MockSource;
    use crate::types::CoinMarket;
    use std::time::Duration;

    fn controller(source: &MockSource) -> SiteController {
        let poller = MarketDataPoller::with_source(PollerConfig::default(), Arc::new(source.clone()));
        SiteController::new(Arc::new(poller), ExternalLinks::token().unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_starts_poller_after_transition() {
        let source = MockSource::new();
        source.set_market(CoinMarket {
            current_price: Some(0.00004),
            ..Default::default()
        });
        let site = controller(&source);
        let site = Arc::new(site);

        let entering = {
            let site = site.clone();
            tokio::spawn(async move { site.enter().await })
        };

        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(site.page().await, Page::Transitioning);
        assert!(!site.poller().is_running().await);
        assert_eq!(source.market_calls(), 0);

        assert_eq!(entering.await.unwrap().unwrap(), Page::Home);
        assert!(site.poller().is_running().await);

        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.market_calls(), 1);
        assert_eq!(site.ticker().await.headline_price, "0.00004000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_stops_poller() {
        let source = MockSource::new();
        source.set_market(CoinMarket::default());
        let site = controller(&source);

        site.enter().await.unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(site.leave().await.unwrap(), Page::Splash);
        assert!(!site.poller().is_running().await);

        let calls = source.market_calls();
        sleep(Duration::from_secs(120)).await;
        assert_eq!(source.market_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_completes_when_enter_is_cancelled() {
        let source = MockSource::new();
        source.set_market(CoinMarket::default());
        let site = controller(&source);

        let cancelled = tokio::time::timeout(Duration::from_millis(500), site.enter()).await;
        assert!(cancelled.is_err());
        assert_eq!(site.page().await, Page::Transitioning);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(site.page().await, Page::Home);
        assert!(site.poller().is_running().await);
        assert_eq!(source.market_calls(), 1);

        assert_eq!(site.leave().await.unwrap(), Page::Splash);
        assert!(!site.poller().is_running().await);
    }

    #[tokio::test]
    async fn test_invalid_event_leaves_state_untouched() {
        let source = MockSource::new();
        let site = controller(&source);

        assert!(site.leave().await.is_err());
        assert_eq!(site.page().await, Page::Splash);
        assert!(!site.poller().is_running().await);
    }

    #[tokio::test]
    async fn test_tab_selection_is_independent() {
        let source = MockSource::new();
        let site = controller(&source);

        site.select_tab(Tab::Buy).await;
        assert_eq!(site.tab().await, Tab::Buy);
        assert_eq!(site.page().await, Page::Splash);
        assert!(!site.poller().is_running().await);
    }
}

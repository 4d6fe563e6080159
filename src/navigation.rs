//! Page and tab state

use crate::error::NavigationError;
use serde::{Deserialize, Serialize};

/// Top-level page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Splash,
    Transitioning,
    Home,
}

/// Events that move between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavEvent {
    /// The user clicked the splash button
    Enter,
    /// The transition animation finished
    TransitionElapsed,
    /// The user left the home page
    Leave,
}

impl Page {
    /// Applies an event
    ///
    /// ```text
    /// Splash --Enter--> Transitioning --TransitionElapsed--> Home --Leave--> Splash
    /// ```
    pub fn next(self, event: NavEvent) -> Result<Page, NavigationError> {
        match (self, event) {
            (Page::Splash, NavEvent::Enter) => Ok(Page::Transitioning),
            (Page::Transitioning, NavEvent::TransitionElapsed) => Ok(Page::Home),
            (Page::Home, NavEvent::Leave) => Ok(Page::Splash),
            (from, event) => Err(NavigationError::InvalidTransition { from, event }),
        }
    }

    /// True on the page that shows market data
    pub fn shows_market_data(&self) -> bool {
        matches!(self, Page::Home)
    }
}

/// Content tab on the home page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    About,
    Buy,
    Social,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::About, Tab::Buy, Tab::Social]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::About => "about",
            Tab::Buy => "buy",
            Tab::Social => "social",
        }
    }
}

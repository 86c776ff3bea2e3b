use serde::{Deserialize, Serialize};

use crate::db::Preferences;

/// Whole preferences document, used both as response and as replacement body.
/// Absent fields read as empty, so an update always replaces everything.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PreferencesBody {
    #[serde(default)]
    pub preferred_markets: Vec<String>,
    #[serde(default)]
    pub watchlist: Vec<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

impl From<Preferences> for PreferencesBody {
    fn from(p: Preferences) -> Self {
        Self {
            preferred_markets: p.preferred_markets,
            watchlist: p.watchlist,
            onboarding_completed: p.onboarding_completed,
        }
    }
}

impl From<PreferencesBody> for Preferences {
    fn from(b: PreferencesBody) -> Self {
        Self {
            preferred_markets: b.preferred_markets,
            watchlist: b.watchlist,
            onboarding_completed: b.onboarding_completed,
        }
    }
}

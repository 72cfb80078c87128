//! Market intelligence: newly listed and upcoming tokens.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIntelligence {
    pub generated_at: String,
    pub new_listings: Vec<NewToken>,
    pub upcoming_projects: Vec<NewToken>,
}

impl MarketIntelligence {
    /// Empty result stamped with `generated_at`
    pub fn empty(generated_at: String) -> Self {
        Self {
            generated_at,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_listings.is_empty() && self.upcoming_projects.is_empty()
    }
}

/// Token summary shown in the market radar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewToken {
    pub name: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<String>,
    pub platform: String,
    pub description: String,
    /// "Up", "Down" or "New" as written by the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::CampaignMetrics;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub name: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
    pub budget: f64,
    pub share_token: String,
    #[serde(default)]
    pub sharing_settings: SharingSettings,
    // snapshot only, recomputed from the influencer rows after every change
    #[serde(default)]
    pub metrics: CampaignMetrics,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

/// Controls which sections and columns a client sees through the share token.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SharingSettings {
    pub include_dashboard: bool,
    pub include_metrics: bool,
    pub include_costs: bool,
    pub include_budget: bool,
    pub include_influencer_details: bool,
    pub include_engagement_metrics: bool,
    pub client_name: Option<String>,
    pub custom_message: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub access_count: u64,
}

impl SharingSettings {
    /// Everything visible; what the campaign owner sees.
    pub fn everything() -> SharingSettings {
        SharingSettings {
            include_dashboard: true,
            include_metrics: true,
            include_costs: true,
            include_budget: true,
            include_influencer_details: true,
            include_engagement_metrics: true,
            ..SharingSettings::default()
        }
    }

    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        matches!(self.expiry_date, Some(expiry) if expiry < today)
    }
}

impl Default for SharingSettings {
    fn default() -> SharingSettings {
        SharingSettings {
            include_dashboard: true,
            include_metrics: true,
            include_costs: false,
            include_budget: false,
            include_influencer_details: true,
            include_engagement_metrics: true,
            client_name: None,
            custom_message: None,
            expiry_date: None,
            access_count: 0,
        }
    }
}

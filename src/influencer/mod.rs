use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::error::Error;
use crate::metrics;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod import;
pub mod manager;
pub use endpoints::*;

pub type InfluencerId = TypedId<Influencer>;

pub const DEFAULT_PLATFORM: &str = "Instagram";
pub const DEFAULT_POST_TYPE: &str = "Post";

/// Largest count the store can hold as a bson int64.
pub const MAX_COUNT: u64 = i64::MAX as u64;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Influencer {
    #[serde(rename = "_id")]
    pub id: InfluencerId,
    pub campaign_id: CampaignId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
    pub name: String,
    pub platform: String,
    pub post_type: String,
    pub views: u64,
    pub cost: f64,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
    pub post_url: Option<String>,
}

impl Influencer {
    pub fn engagements(&self) -> u64 {
        self.likes
            .saturating_add(self.shares)
            .saturating_add(self.comments)
    }

    pub fn efficiency(&self) -> f64 {
        metrics::efficiency(self.views, self.cost)
    }

    pub fn cost_per_engagement(&self) -> f64 {
        metrics::cost_per_engagement(self.cost, self.engagements())
    }

    pub fn apply(&mut self, draft: InfluencerDraft) {
        self.name = draft.name;
        self.platform = draft.platform;
        self.post_type = draft.post_type;
        self.views = draft.views;
        self.cost = draft.cost;
        self.likes = draft.likes;
        self.shares = draft.shares;
        self.comments = draft.comments;
        self.post_url = draft.post_url;
    }
}

impl TypedIdMarker for Influencer {
    fn tag() -> &'static str {
        "INF"
    }
}

/// The user-editable fields of an influencer record, as submitted in a json
/// body or a csv row.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct InfluencerDraft {
    pub name: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub post_url: Option<String>,
}

impl InfluencerDraft {
    pub fn validated(mut self) -> Result<InfluencerDraft, Error> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(Error::InfluencerNameRequired);
        }

        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(Error::InvalidInfluencerValue {
                field: "cost",
                value: self.cost,
            });
        }

        for (field, count) in [
            ("views", self.views),
            ("likes", self.likes),
            ("shares", self.shares),
            ("comments", self.comments),
        ] {
            if count > MAX_COUNT {
                return Err(Error::InvalidInfluencerValue {
                    field,
                    value: count as f64,
                });
            }
        }

        self.platform = non_empty_or(self.platform, DEFAULT_PLATFORM);
        self.post_type = non_empty_or(self.post_type, DEFAULT_POST_TYPE);
        self.post_url = self
            .post_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(self)
    }
}

impl Default for InfluencerDraft {
    fn default() -> InfluencerDraft {
        InfluencerDraft {
            name: String::new(),
            platform: default_platform(),
            post_type: default_post_type(),
            views: 0,
            cost: 0.0,
            likes: 0,
            shares: 0,
            comments: 0,
            post_url: None,
        }
    }
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn default_post_type() -> String {
    DEFAULT_POST_TYPE.to_string()
}

fn non_empty_or(value: String, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

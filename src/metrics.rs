//! Campaign aggregates, always recomputed from the full influencer list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::campaign::SharingSettings;
use crate::influencer::{Influencer, InfluencerId};

const TOP_PERFORMERS: usize = 10;

/// Views per currency unit. The denominator is floored at 1 so free posts
/// score their raw view count instead of dividing by zero.
pub fn efficiency(views: u64, cost: f64) -> f64 {
    views as f64 / cost.max(1.0)
}

/// Cost per like, share or comment, with the engagement count floored at 1.
pub fn cost_per_engagement(cost: f64, engagements: u64) -> f64 {
    cost / engagements.max(1) as f64
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CampaignMetrics {
    pub total_views: u64,
    pub total_cost: f64,
    pub total_likes: u64,
    pub total_shares: u64,
    pub total_comments: u64,
}

impl CampaignMetrics {
    pub fn from_influencers<'a, I>(influencers: I) -> CampaignMetrics
    where
        I: IntoIterator<Item = &'a Influencer>,
    {
        let mut metrics = CampaignMetrics::default();
        for influencer in influencers {
            metrics.total_views = metrics.total_views.saturating_add(influencer.views);
            metrics.total_cost += influencer.cost;
            metrics.total_likes = metrics.total_likes.saturating_add(influencer.likes);
            metrics.total_shares = metrics.total_shares.saturating_add(influencer.shares);
            metrics.total_comments = metrics
                .total_comments
                .saturating_add(influencer.comments);
        }

        metrics
    }

    pub fn total_engagements(&self) -> u64 {
        self.total_likes
            .saturating_add(self.total_shares)
            .saturating_add(self.total_comments)
    }

    pub fn efficiency(&self) -> f64 {
        efficiency(self.total_views, self.total_cost)
    }

    pub fn cost_per_engagement(&self) -> f64 {
        cost_per_engagement(self.total_cost, self.total_engagements())
    }

    pub fn cost_per_view(&self) -> Option<f64> {
        if self.total_views > 0 {
            Some(self.total_cost / self.total_views as f64)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlatformBreakdown {
    pub platform: String,
    pub influencer_count: usize,
    pub metrics: CampaignMetrics,
    pub average_efficiency: f64,
    pub cost_per_engagement: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostTypeCount {
    pub post_type: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopPerformer {
    pub influencer_id: InfluencerId,
    pub name: String,
    pub platform: String,
    pub efficiency: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CampaignAggregates {
    pub influencer_count: usize,
    pub totals: CampaignMetrics,
    pub efficiency: f64,
    pub cost_per_engagement: f64,
    pub cost_per_view: Option<f64>,
    pub budget: f64,
    pub budget_efficiency: Option<f64>,
    pub platforms: Vec<PlatformBreakdown>,
    pub post_types: Vec<PostTypeCount>,
    pub top_performers: Vec<TopPerformer>,
}

pub fn aggregate(influencers: &[Influencer], budget: f64) -> CampaignAggregates {
    let totals = CampaignMetrics::from_influencers(influencers);

    let budget_efficiency = if budget > 0.0 {
        Some(totals.total_views as f64 / budget)
    } else {
        None
    };

    let mut ranked: Vec<&Influencer> = influencers.iter().collect();
    ranked.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency()));
    let top_performers = ranked
        .into_iter()
        .take(TOP_PERFORMERS)
        .map(|influencer| TopPerformer {
            influencer_id: influencer.id,
            name: influencer.name.clone(),
            platform: influencer.platform.clone(),
            efficiency: influencer.efficiency(),
        })
        .collect();

    CampaignAggregates {
        influencer_count: influencers.len(),
        efficiency: totals.efficiency(),
        cost_per_engagement: totals.cost_per_engagement(),
        cost_per_view: totals.cost_per_view(),
        totals,
        budget,
        budget_efficiency,
        platforms: platform_breakdown(influencers),
        post_types: post_type_counts(influencers),
        top_performers,
    }
}

/// Per-platform sums, ordered by platform name.
pub fn platform_breakdown(influencers: &[Influencer]) -> Vec<PlatformBreakdown> {
    let mut groups: BTreeMap<&str, Vec<&Influencer>> = BTreeMap::new();
    for influencer in influencers {
        groups
            .entry(influencer.platform.as_str())
            .or_default()
            .push(influencer);
    }

    groups
        .into_iter()
        .map(|(platform, members)| {
            let metrics = CampaignMetrics::from_influencers(members.iter().copied());
            let efficiency_sum: f64 = members.iter().map(|i| i.efficiency()).sum();
            PlatformBreakdown {
                platform: platform.to_string(),
                influencer_count: members.len(),
                average_efficiency: efficiency_sum / members.len() as f64,
                cost_per_engagement: metrics.cost_per_engagement(),
                metrics,
            }
        })
        .collect()
}

/// Post type counts, most frequent first; ties keep first-seen order.
pub fn post_type_counts(influencers: &[Influencer]) -> Vec<PostTypeCount> {
    let mut counts: Vec<PostTypeCount> = vec![];
    for influencer in influencers {
        match counts
            .iter_mut()
            .find(|entry| entry.post_type == influencer.post_type)
        {
            Some(entry) => entry.count += 1,
            None => counts.push(PostTypeCount {
                post_type: influencer.post_type.clone(),
                count: 1,
            }),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Views,
    Cost,
    Likes,
    Shares,
    Comments,
    Efficiency,
}

impl SortKey {
    pub fn is_visible(&self, settings: &SharingSettings) -> bool {
        match self {
            SortKey::Name | SortKey::Views => true,
            SortKey::Likes | SortKey::Shares | SortKey::Comments => {
                settings.include_engagement_metrics
            }
            SortKey::Cost | SortKey::Efficiency => settings.include_costs,
        }
    }
}

/// Stable sort: names ascending, every numeric key descending.
pub fn sort_influencers(influencers: &mut [&Influencer], key: SortKey) {
    match key {
        SortKey::Name => influencers.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Views => influencers.sort_by(|a, b| b.views.cmp(&a.views)),
        SortKey::Cost => influencers.sort_by(|a, b| b.cost.total_cmp(&a.cost)),
        SortKey::Likes => influencers.sort_by(|a, b| b.likes.cmp(&a.likes)),
        SortKey::Shares => influencers.sort_by(|a, b| b.shares.cmp(&a.shares)),
        SortKey::Comments => influencers.sort_by(|a, b| b.comments.cmp(&a.comments)),
        SortKey::Efficiency => {
            influencers.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency()))
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct InfluencerFilter {
    pub search: Option<String>,
    pub platform: Option<String>,
    pub post_type: Option<String>,
}

impl InfluencerFilter {
    pub fn matches(&self, influencer: &Influencer) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty()
                && !influencer
                    .name
                    .to_lowercase()
                    .contains(&search.to_lowercase())
            {
                return false;
            }
        }

        if let Some(platform) = &self.platform {
            if influencer.platform != *platform {
                return false;
            }
        }

        if let Some(post_type) = &self.post_type {
            if influencer.post_type != *post_type {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, influencers: &'a [Influencer]) -> Vec<&'a Influencer> {
        influencers.iter().filter(|i| self.matches(i)).collect()
    }
}

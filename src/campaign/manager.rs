use chrono::Utc;

use crate::database::Database;
use crate::error::Error;
use crate::influencer::Influencer;
use crate::metrics::CampaignMetrics;
use crate::share::manager::unique_share_token;

use super::{Campaign, CampaignId, SharingSettings};

fn validate_budget(budget: f64) -> Result<f64, Error> {
    if budget.is_finite() && budget >= 0.0 {
        Ok(budget)
    } else {
        Err(Error::InvalidBudget { budget })
    }
}

#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: &dyn Database,
    name: Option<String>,
    budget: f64,
) -> Result<Campaign, Error> {
    let budget = validate_budget(budget)?;
    let name = match name.map(|name| name.trim().to_string()) {
        Some(name) if !name.is_empty() => name,
        _ => {
            let existing = db.campaigns().fetch_campaigns().await?;
            format!("Campaign {}", existing.len() + 1)
        }
    };

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        name,
        created_at: now,
        modified_at: now,
        budget,
        share_token: unique_share_token(db).await?,
        sharing_settings: SharingSettings::default(),
        metrics: CampaignMetrics::default(),
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_with_influencers(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<(Campaign, Vec<Influencer>), Error> {
    let campaign = get_campaign_by_id(db, campaign_id).await?;
    let influencers = db
        .influencers()
        .fetch_influencers_by_campaign(campaign_id)
        .await?;

    Ok((campaign, influencers))
}

#[tracing::instrument(skip(db))]
pub async fn update_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    name: Option<String>,
    budget: Option<f64>,
) -> Result<Campaign, Error> {
    let mut campaign = get_campaign_by_id(db, campaign_id).await?;

    if let Some(name) = name.map(|name| name.trim().to_string()) {
        if !name.is_empty() {
            campaign.name = name;
        }
    }
    if let Some(budget) = budget {
        campaign.budget = validate_budget(budget)?;
    }
    campaign.modified_at = Utc::now();

    db.campaigns().upsert_campaign(&campaign).await?;

    Ok(campaign)
}

/// The visit counter is owned by the share link and is kept as is.
#[tracing::instrument(skip(db))]
pub async fn update_sharing_settings(
    db: &dyn Database,
    campaign_id: CampaignId,
    mut settings: SharingSettings,
) -> Result<Campaign, Error> {
    let mut campaign = get_campaign_by_id(db, campaign_id).await?;

    settings.access_count = campaign.sharing_settings.access_count;
    settings.client_name = non_blank(settings.client_name);
    settings.custom_message = non_blank(settings.custom_message);
    campaign.sharing_settings = settings;
    campaign.modified_at = Utc::now();

    db.campaigns().upsert_campaign(&campaign).await?;

    Ok(campaign)
}

/// Removes the influencers first, then the campaign row.
#[tracing::instrument(skip(db))]
pub async fn delete_campaign(db: &dyn Database, campaign_id: CampaignId) -> Result<(), Error> {
    get_campaign_by_id(db, campaign_id).await?;

    let removed = db
        .influencers()
        .delete_influencers_by_campaign(campaign_id)
        .await?;
    tracing::debug!(removed, "removed campaign influencers");

    if !db.campaigns().delete_campaign(campaign_id).await? {
        return Err(Error::CampaignNotFound { campaign_id });
    }

    Ok(())
}

/// Rewrites the metrics snapshot from the stored influencer rows.
#[tracing::instrument(skip(db))]
pub async fn refresh_metrics(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let (mut campaign, influencers) = get_campaign_with_influencers(db, campaign_id).await?;

    campaign.metrics = CampaignMetrics::from_influencers(&influencers);
    campaign.modified_at = Utc::now();
    db.campaigns().upsert_campaign(&campaign).await?;

    Ok(campaign)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::database::test::MockDatabase;
    use crate::database::InMemoryDatabase;
    use crate::influencer::manager::add_influencer;
    use crate::influencer::InfluencerDraft;

    #[tokio::test]
    async fn can_create_campaign() {
        let mut db = MockDatabase::new();
        let called_insert = Arc::new(Mutex::new(false));
        let called_insert_clone = Arc::clone(&called_insert);
        db.campaigns.on_fetch_campaign_by_share_token = Box::new(|_| Ok(None));
        db.campaigns.on_insert_campaign = Box::new(move |campaign| {
            *called_insert_clone.lock().unwrap() = true;
            assert_eq!(campaign.name, "Diwali Launch".to_string());
            assert_eq!(campaign.created_at, campaign.modified_at);
            assert_eq!(campaign.budget, 50000.0);
            Ok(())
        });

        let campaign = create_campaign(&db, Some(" Diwali Launch ".into()), 50000.0)
            .await
            .unwrap();

        assert_eq!(campaign.name, "Diwali Launch".to_string());
        assert_eq!(campaign.metrics, CampaignMetrics::default());
        assert_eq!(campaign.sharing_settings, SharingSettings::default());
        assert!(
            *called_insert.lock().unwrap(),
            "db.insert_campaign was not called"
        );
    }

    #[tokio::test]
    async fn unnamed_campaigns_are_numbered() {
        let db = InMemoryDatabase::new();

        let first = create_campaign(&db, None, 0.0).await.unwrap();
        let second = create_campaign(&db, Some("   ".into()), 0.0).await.unwrap();

        assert_eq!(first.name, "Campaign 1");
        assert_eq!(second.name, "Campaign 2");
        assert!(first.id < second.id);
        assert_ne!(first.share_token, second.share_token);
    }

    #[tokio::test]
    async fn create_campaign_rejects_negative_budget() {
        let db = MockDatabase::new();

        let result = create_campaign(&db, Some("Launch".into()), -5.0).await;

        assert!(matches!(result, Err(Error::InvalidBudget { .. })));
    }

    #[tokio::test]
    async fn get_campaign_by_id_returns_error_if_doesnt_exist() {
        let mut db = MockDatabase::new();
        let test_campaign_id = CampaignId::new();
        let called_get_by_id = Arc::new(Mutex::new(false));
        let called_get_by_id_clone = Arc::clone(&called_get_by_id);
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |campaign_id| {
            *called_get_by_id_clone.lock().unwrap() = true;
            assert_eq!(campaign_id, test_campaign_id);
            Ok(None)
        });

        let campaign_result = get_campaign_by_id(&db, test_campaign_id).await;

        assert_eq!(
            campaign_result.unwrap_err(),
            Error::CampaignNotFound {
                campaign_id: test_campaign_id
            }
        );
        assert!(
            *called_get_by_id.lock().unwrap(),
            "db.fetch_campaign_by_id was not called"
        );
    }

    #[tokio::test]
    async fn update_campaign_keeps_blank_name() {
        let db = InMemoryDatabase::new();
        let created = create_campaign(&db, Some("Launch".into()), 100.0)
            .await
            .unwrap();

        let updated = update_campaign(&db, created.id, Some(" ".into()), Some(250.0))
            .await
            .unwrap();

        assert_eq!(updated.name, "Launch");
        assert_eq!(updated.budget, 250.0);
        assert_eq!(get_campaign_by_id(&db, created.id).await.unwrap().budget, 250.0);
    }

    #[tokio::test]
    async fn sharing_update_preserves_access_count() {
        let db = InMemoryDatabase::new();
        let created = create_campaign(&db, None, 0.0).await.unwrap();
        db.campaigns()
            .increment_share_access_count(created.id)
            .await
            .unwrap();

        let updated = update_sharing_settings(
            &db,
            created.id,
            SharingSettings {
                include_costs: true,
                client_name: Some("  ".into()),
                access_count: 0,
                ..SharingSettings::default()
            },
        )
        .await
        .unwrap();

        assert!(updated.sharing_settings.include_costs);
        assert_eq!(updated.sharing_settings.client_name, None);
        assert_eq!(updated.sharing_settings.access_count, 1);
    }

    #[tokio::test]
    async fn delete_campaign_cascades() {
        let db = InMemoryDatabase::new();
        let doomed = create_campaign(&db, Some("Doomed".into()), 0.0)
            .await
            .unwrap();
        let kept = create_campaign(&db, Some("Kept".into()), 0.0)
            .await
            .unwrap();
        for campaign_id in [doomed.id, kept.id] {
            add_influencer(
                &db,
                campaign_id,
                InfluencerDraft {
                    name: "Ana".into(),
                    views: 10,
                    ..InfluencerDraft::default()
                },
            )
            .await
            .unwrap();
        }

        delete_campaign(&db, doomed.id).await.unwrap();

        assert_eq!(
            get_campaign_by_id(&db, doomed.id).await.unwrap_err(),
            Error::CampaignNotFound {
                campaign_id: doomed.id
            }
        );
        assert!(db
            .influencers()
            .fetch_influencers_by_campaign(doomed.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            db.influencers()
                .fetch_influencers_by_campaign(kept.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn refresh_metrics_matches_rows() {
        let db = InMemoryDatabase::new();
        let created = create_campaign(&db, None, 50000.0).await.unwrap();
        add_influencer(
            &db,
            created.id,
            InfluencerDraft {
                name: "Influencer1".into(),
                views: 15000,
                cost: 500.0,
                likes: 1200,
                shares: 45,
                comments: 78,
                ..InfluencerDraft::default()
            },
        )
        .await
        .unwrap();

        let campaign = refresh_metrics(&db, created.id).await.unwrap();

        assert_eq!(campaign.metrics.total_views, 15000);
        assert_eq!(campaign.metrics.total_likes, 1200);
        assert_eq!(campaign.metrics.efficiency(), 30.0);
    }
}

use chrono::Utc;

use crate::campaign::manager::{get_campaign_by_id, refresh_metrics};
use crate::campaign::CampaignId;
use crate::database::Database;
use crate::error::Error;
use crate::metrics::{sort_influencers, InfluencerFilter, SortKey};

use super::{import, Influencer, InfluencerDraft, InfluencerId};

#[tracing::instrument(skip(db))]
pub async fn add_influencer(
    db: &dyn Database,
    campaign_id: CampaignId,
    draft: InfluencerDraft,
) -> Result<Influencer, Error> {
    let draft = draft.validated()?;
    get_campaign_by_id(db, campaign_id).await?;

    let influencer = new_influencer(campaign_id, draft);
    db.influencers().insert_influencer(&influencer).await?;
    refresh_metrics(db, campaign_id).await?;

    Ok(influencer)
}

#[tracing::instrument(skip(db))]
pub async fn get_influencers(
    db: &dyn Database,
    campaign_id: CampaignId,
    filter: &InfluencerFilter,
    sort: Option<SortKey>,
) -> Result<Vec<Influencer>, Error> {
    get_campaign_by_id(db, campaign_id).await?;
    let influencers = db
        .influencers()
        .fetch_influencers_by_campaign(campaign_id)
        .await?;

    let mut rows = filter.apply(&influencers);
    if let Some(sort) = sort {
        sort_influencers(&mut rows, sort);
    }

    Ok(rows.into_iter().cloned().collect())
}

#[tracing::instrument(skip(db))]
pub async fn get_influencer_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
    influencer_id: InfluencerId,
) -> Result<Influencer, Error> {
    let influencer = db
        .influencers()
        .fetch_influencer_by_campaign_and_id(campaign_id, influencer_id)
        .await?
        .ok_or(Error::InfluencerNotFoundInCampaign {
            campaign_id,
            influencer_id,
        })?;

    Ok(influencer)
}

#[tracing::instrument(skip(db))]
pub async fn update_influencer(
    db: &dyn Database,
    campaign_id: CampaignId,
    influencer_id: InfluencerId,
    draft: InfluencerDraft,
) -> Result<Influencer, Error> {
    let draft = draft.validated()?;
    let mut influencer = get_influencer_by_id(db, campaign_id, influencer_id).await?;

    influencer.apply(draft);
    influencer.modified_at = Utc::now();
    db.influencers().upsert_influencer(&influencer).await?;
    refresh_metrics(db, campaign_id).await?;

    Ok(influencer)
}

#[tracing::instrument(skip(db))]
pub async fn delete_influencer(
    db: &dyn Database,
    campaign_id: CampaignId,
    influencer_id: InfluencerId,
) -> Result<(), Error> {
    let deleted = db
        .influencers()
        .delete_influencer(campaign_id, influencer_id)
        .await?;
    if !deleted {
        return Err(Error::InfluencerNotFoundInCampaign {
            campaign_id,
            influencer_id,
        });
    }

    refresh_metrics(db, campaign_id).await?;

    Ok(())
}

/// Every row is validated before the first insert. A failed insert part way
/// through leaves the earlier rows in place.
#[tracing::instrument(skip(db, csv))]
pub async fn import_influencers(
    db: &dyn Database,
    campaign_id: CampaignId,
    csv: &str,
) -> Result<Vec<Influencer>, Error> {
    let drafts = import::parse_csv(csv)?;
    get_campaign_by_id(db, campaign_id).await?;

    let mut imported = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let influencer = new_influencer(campaign_id, draft);
        db.influencers().insert_influencer(&influencer).await?;
        imported.push(influencer);
    }
    tracing::info!(count = imported.len(), "imported influencers");

    refresh_metrics(db, campaign_id).await?;

    Ok(imported)
}

#[tracing::instrument(skip(db))]
pub async fn export_influencers(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Vec<u8>, Error> {
    get_campaign_by_id(db, campaign_id).await?;
    let influencers = db
        .influencers()
        .fetch_influencers_by_campaign(campaign_id)
        .await?;

    import::write_export(&influencers)
}

fn new_influencer(campaign_id: CampaignId, draft: InfluencerDraft) -> Influencer {
    let now = Utc::now();
    Influencer {
        id: InfluencerId::new(),
        campaign_id,
        created_at: now,
        modified_at: now,
        name: draft.name,
        platform: draft.platform,
        post_type: draft.post_type,
        views: draft.views,
        cost: draft.cost,
        likes: draft.likes,
        shares: draft.shares,
        comments: draft.comments,
        post_url: draft.post_url,
    }
}

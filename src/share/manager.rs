use chrono::{NaiveDate, Utc};

use crate::campaign::{Campaign, CampaignId};
use crate::database::Database;
use crate::error::Error;
use crate::influencer::Influencer;

use super::generate_share_token;

const TOKEN_ATTEMPTS: usize = 8;

#[derive(Clone, Debug)]
pub struct ClientView {
    pub campaign: Campaign,
    pub influencers: Vec<Influencer>,
}

/// A token no campaign currently holds.
#[tracing::instrument(skip(db))]
pub async fn unique_share_token(db: &dyn Database) -> Result<String, Error> {
    for _ in 0..TOKEN_ATTEMPTS {
        let token = generate_share_token();
        if db
            .campaigns()
            .fetch_campaign_by_share_token(&token)
            .await?
            .is_none()
        {
            return Ok(token);
        }
    }

    Err(Error::ExistentialState(
        "could not generate an unused share token".into(),
    ))
}

/// Resolves a token without counting it as a visit.
#[tracing::instrument(skip(db))]
pub async fn resolve_share_token(
    db: &dyn Database,
    token: &str,
    today: NaiveDate,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_share_token(token)
        .await?
        .ok_or(Error::ShareTokenNotFound)?;

    if let Some(expired_on) = campaign.sharing_settings.expiry_date {
        if campaign.sharing_settings.is_expired_on(today) {
            return Err(Error::ShareTokenExpired { expired_on });
        }
    }

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_client_view(
    db: &dyn Database,
    token: &str,
    today: NaiveDate,
) -> Result<ClientView, Error> {
    let mut campaign = resolve_share_token(db, token, today).await?;

    db.campaigns()
        .increment_share_access_count(campaign.id)
        .await?;
    campaign.sharing_settings.access_count += 1;

    let influencers = db
        .influencers()
        .fetch_influencers_by_campaign(campaign.id)
        .await?;

    Ok(ClientView {
        campaign,
        influencers,
    })
}

/// Replaces the token; the old one stops resolving at once.
#[tracing::instrument(skip(db))]
pub async fn regenerate_share_token(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let mut campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    campaign.share_token = unique_share_token(db).await?;
    campaign.modified_at = Utc::now();
    db.campaigns().upsert_campaign(&campaign).await?;

    Ok(campaign)
}

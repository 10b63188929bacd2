use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::{FindOptions, ReplaceOptions};

use crate::database::{MemoryCampaignStore, MongoCampaignStore};
use crate::error::Error;

use super::{Campaign, CampaignId};

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaign_by_id(&self, campaign_id: CampaignId)
        -> Result<Option<Campaign>, Error>;

    async fn fetch_campaign_by_share_token(&self, token: &str) -> Result<Option<Campaign>, Error>;

    async fn upsert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error>;

    async fn increment_share_access_count(&self, campaign_id: CampaignId) -> Result<(), Error>;
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder().sort(bson::doc! { "_id": 1 }).build();
        let campaigns: Vec<Campaign> = self
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_share_token(&self, token: &str) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .find_one(bson::doc! { "share_token": token }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn upsert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.replace_one(bson::doc! { "_id": campaign.id }, campaign, options)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error> {
        let result = self
            .delete_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(result.deleted_count > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_share_access_count(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.update_one(
            bson::doc! { "_id": campaign_id },
            bson::doc! { "$inc": { "sharing_settings.access_count": 1_i64 } },
            None,
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.write()?.push(campaign.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        Ok(self.read()?.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign = self.read()?.iter().find(|c| c.id == campaign_id).cloned();

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_share_token(&self, token: &str) -> Result<Option<Campaign>, Error> {
        let campaign = self
            .read()?
            .iter()
            .find(|c| c.share_token == token)
            .cloned();

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn upsert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        let mut campaigns = self.write()?;
        match campaigns.iter_mut().find(|c| c.id == campaign.id) {
            Some(existing) => *existing = campaign.clone(),
            None => campaigns.push(campaign.clone()),
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error> {
        let mut campaigns = self.write()?;
        let before = campaigns.len();
        campaigns.retain(|c| c.id != campaign_id);

        Ok(campaigns.len() != before)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_share_access_count(&self, campaign_id: CampaignId) -> Result<(), Error> {
        if let Some(campaign) = self.write()?.iter_mut().find(|c| c.id == campaign_id) {
            campaign.sharing_settings.access_count += 1;
        }

        Ok(())
    }
}

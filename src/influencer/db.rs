use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::{FindOptions, ReplaceOptions};

use crate::campaign::CampaignId;
use crate::database::{MemoryInfluencerStore, MongoInfluencerStore};
use crate::error::Error;

use super::{Influencer, InfluencerId};

#[async_trait]
pub trait InfluencerStore: Send + Sync {
    async fn insert_influencer(&self, influencer: &Influencer) -> Result<(), Error>;

    /// In insertion order.
    async fn fetch_influencers_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Influencer>, Error>;

    async fn fetch_influencer_by_campaign_and_id(
        &self,
        campaign_id: CampaignId,
        influencer_id: InfluencerId,
    ) -> Result<Option<Influencer>, Error>;

    async fn upsert_influencer(&self, influencer: &Influencer) -> Result<(), Error>;

    async fn delete_influencer(
        &self,
        campaign_id: CampaignId,
        influencer_id: InfluencerId,
    ) -> Result<bool, Error>;

    async fn delete_influencers_by_campaign(&self, campaign_id: CampaignId) -> Result<u64, Error>;
}

#[async_trait]
impl InfluencerStore for MongoInfluencerStore {
    #[tracing::instrument(skip(self))]
    async fn insert_influencer(&self, influencer: &Influencer) -> Result<(), Error> {
        self.insert_one(influencer, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_influencers_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Influencer>, Error> {
        let options = FindOptions::builder().sort(bson::doc! { "_id": 1 }).build();
        let influencers: Vec<Influencer> = self
            .find(bson::doc! { "campaign_id": campaign_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(influencers)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_influencer_by_campaign_and_id(
        &self,
        campaign_id: CampaignId,
        influencer_id: InfluencerId,
    ) -> Result<Option<Influencer>, Error> {
        let influencer: Option<Influencer> = self
            .find_one(
                bson::doc! { "_id": influencer_id, "campaign_id": campaign_id },
                None,
            )
            .await?;

        Ok(influencer)
    }

    #[tracing::instrument(skip(self))]
    async fn upsert_influencer(&self, influencer: &Influencer) -> Result<(), Error> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.replace_one(bson::doc! { "_id": influencer.id }, influencer, options)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_influencer(
        &self,
        campaign_id: CampaignId,
        influencer_id: InfluencerId,
    ) -> Result<bool, Error> {
        let result = self
            .delete_one(
                bson::doc! { "_id": influencer_id, "campaign_id": campaign_id },
                None,
            )
            .await?;

        Ok(result.deleted_count > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_influencers_by_campaign(&self, campaign_id: CampaignId) -> Result<u64, Error> {
        let result = self
            .delete_many(bson::doc! { "campaign_id": campaign_id }, None)
            .await?;

        Ok(result.deleted_count)
    }
}

#[async_trait]
impl InfluencerStore for MemoryInfluencerStore {
    #[tracing::instrument(skip(self))]
    async fn insert_influencer(&self, influencer: &Influencer) -> Result<(), Error> {
        self.write()?.push(influencer.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_influencers_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Influencer>, Error> {
        let influencers = self
            .read()?
            .iter()
            .filter(|i| i.campaign_id == campaign_id)
            .cloned()
            .collect();

        Ok(influencers)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_influencer_by_campaign_and_id(
        &self,
        campaign_id: CampaignId,
        influencer_id: InfluencerId,
    ) -> Result<Option<Influencer>, Error> {
        let influencer = self
            .read()?
            .iter()
            .find(|i| i.id == influencer_id && i.campaign_id == campaign_id)
            .cloned();

        Ok(influencer)
    }

    #[tracing::instrument(skip(self))]
    async fn upsert_influencer(&self, influencer: &Influencer) -> Result<(), Error> {
        let mut influencers = self.write()?;
        match influencers.iter_mut().find(|i| i.id == influencer.id) {
            Some(existing) => *existing = influencer.clone(),
            None => influencers.push(influencer.clone()),
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_influencer(
        &self,
        campaign_id: CampaignId,
        influencer_id: InfluencerId,
    ) -> Result<bool, Error> {
        let mut influencers = self.write()?;
        let before = influencers.len();
        influencers.retain(|i| !(i.id == influencer_id && i.campaign_id == campaign_id));

        Ok(influencers.len() != before)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_influencers_by_campaign(&self, campaign_id: CampaignId) -> Result<u64, Error> {
        let mut influencers = self.write()?;
        let before = influencers.len();
        influencers.retain(|i| i.campaign_id != campaign_id);

        Ok((before - influencers.len()) as u64)
    }
}

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use mongodb::bson;
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::error::Error;
use crate::influencer::db::InfluencerStore;
use crate::influencer::Influencer;

pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoInfluencerStore = Collection<Influencer>;

pub type MemoryCampaignStore = MemoryCollection<Campaign>;
pub type MemoryInfluencerStore = MemoryCollection<Influencer>;

pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;
    fn influencers(&self) -> &dyn InfluencerStore;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    campaigns: MongoCampaignStore,
    influencers: MongoInfluencerStore,
}

impl MongoDatabase {
    #[tracing::instrument(skip(db))]
    pub async fn initialize(db: mongodb::Database) -> Result<MongoDatabase, Error> {
        let campaigns: MongoCampaignStore = db.collection("campaigns");
        let influencers: MongoInfluencerStore = db.collection("influencers");

        campaigns
            .create_index(
                IndexModel::builder()
                    .keys(bson::doc! { "share_token": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await?;
        influencers
            .create_index(
                IndexModel::builder()
                    .keys(bson::doc! { "campaign_id": 1 })
                    .build(),
                None,
            )
            .await?;

        Ok(MongoDatabase {
            campaigns,
            influencers,
        })
    }
}

impl Database for MongoDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn influencers(&self) -> &dyn InfluencerStore {
        &self.influencers
    }
}

/// Rows kept in insertion order behind a lock.
#[derive(Debug)]
pub struct MemoryCollection<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> MemoryCollection<T> {
    pub fn new() -> MemoryCollection<T> {
        MemoryCollection {
            rows: RwLock::new(vec![]),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Vec<T>>, Error> {
        self.rows
            .read()
            .map_err(|_| Error::ExistentialState("in-memory store lock poisoned".into()))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<T>>, Error> {
        self.rows
            .write()
            .map_err(|_| Error::ExistentialState("in-memory store lock poisoned".into()))
    }
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> MemoryCollection<T> {
        MemoryCollection::new()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    campaigns: MemoryCampaignStore,
    influencers: MemoryInfluencerStore,
}

impl InMemoryDatabase {
    pub fn new() -> InMemoryDatabase {
        InMemoryDatabase::default()
    }
}

impl Database for InMemoryDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn influencers(&self) -> &dyn InfluencerStore {
        &self.influencers
    }
}

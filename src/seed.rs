use tracing::info;

use crate::campaign::manager::create_campaign;
use crate::database::Database;
use crate::error::Error;
use crate::influencer::{import, manager};

/// Inserts a demo campaign built from the import template, unless campaigns
/// already exist.
#[tracing::instrument(skip(db))]
pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    if !db.campaigns().fetch_campaigns().await?.is_empty() {
        info!("store already has campaigns, skipping seed");
        return Ok(());
    }

    let campaign = create_campaign(db, Some("Demo Campaign".into()), 50000.0).await?;
    let influencers = manager::import_influencers(db, campaign.id, import::template()).await?;
    info!(
        campaign_id = %campaign.id,
        influencers = influencers.len(),
        "seeded demo campaign"
    );

    Ok(())
}

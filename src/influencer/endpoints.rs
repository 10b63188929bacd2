use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::manager::get_campaign_by_id;
use crate::campaign::CampaignId;
use crate::database::Database;
use crate::error::Error;
use crate::report::export::{attachment, CSV_CONTENT_TYPE};
use crate::report::ReportQuery;

use super::{import, manager, Influencer, InfluencerDraft, InfluencerId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InfluencerBody {
    pub id: InfluencerId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub platform: String,
    pub post_type: String,
    pub views: u64,
    pub cost: f64,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
    pub post_url: Option<String>,
    pub efficiency: f64,
    pub cost_per_engagement: f64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl InfluencerBody {
    pub fn render(influencer: Influencer) -> InfluencerBody {
        InfluencerBody {
            efficiency: influencer.efficiency(),
            cost_per_engagement: influencer.cost_per_engagement(),
            id: influencer.id,
            campaign_id: influencer.campaign_id,
            name: influencer.name,
            platform: influencer.platform,
            post_type: influencer.post_type,
            views: influencer.views,
            cost: influencer.cost,
            likes: influencer.likes,
            shares: influencer.shares,
            comments: influencer.comments,
            post_url: influencer.post_url,
            created_at: influencer.created_at,
            modified_at: influencer.modified_at,
        }
    }
}

#[post("/campaigns/{campaign_id}/influencers")]
#[tracing::instrument(skip(db))]
pub async fn create_influencer_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<InfluencerDraft>,
) -> Result<Json<InfluencerBody>, Error> {
    let campaign_id = params.into_inner();

    let influencer = manager::add_influencer(&***db, campaign_id, body.into_inner()).await?;

    Ok(Json(InfluencerBody::render(influencer)))
}

#[get("/campaigns/{campaign_id}/influencers")]
#[tracing::instrument(skip(db))]
pub async fn get_influencers_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    query: Query<ReportQuery>,
) -> Result<Json<Vec<InfluencerBody>>, Error> {
    let campaign_id = params.into_inner();
    let query = query.into_inner();

    let influencers =
        manager::get_influencers(&***db, campaign_id, &query.filter, query.sort).await?;

    Ok(Json(
        influencers.into_iter().map(InfluencerBody::render).collect(),
    ))
}

#[post("/campaigns/{campaign_id}/influencers/import")]
#[tracing::instrument(skip(db, body))]
pub async fn import_influencers_into_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: String,
) -> Result<Json<Vec<InfluencerBody>>, Error> {
    let campaign_id = params.into_inner();

    let imported = manager::import_influencers(&***db, campaign_id, &body).await?;

    Ok(Json(
        imported.into_iter().map(InfluencerBody::render).collect(),
    ))
}

#[get("/campaigns/{campaign_id}/influencers/export.csv")]
#[tracing::instrument(skip(db))]
pub async fn export_influencers_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();

    let campaign = get_campaign_by_id(&***db, campaign_id).await?;
    let bytes = manager::export_influencers(&***db, campaign_id).await?;

    Ok(attachment(CSV_CONTENT_TYPE, &campaign.name, "influencers.csv", bytes))
}

#[get("/influencers/template.csv")]
#[tracing::instrument]
pub async fn get_influencer_template() -> HttpResponse {
    attachment(
        CSV_CONTENT_TYPE,
        "influencer",
        "template.csv",
        import::template().as_bytes().to_vec(),
    )
}

#[get("/campaigns/{campaign_id}/influencers/{influencer_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_influencer_in_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<(CampaignId, InfluencerId)>,
) -> Result<Json<InfluencerBody>, Error> {
    let (campaign_id, influencer_id) = params.into_inner();

    let influencer = manager::get_influencer_by_id(&***db, campaign_id, influencer_id).await?;

    Ok(Json(InfluencerBody::render(influencer)))
}

#[put("/campaigns/{campaign_id}/influencers/{influencer_id}")]
#[tracing::instrument(skip(db))]
pub async fn update_influencer_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<(CampaignId, InfluencerId)>,
    body: Json<InfluencerDraft>,
) -> Result<Json<InfluencerBody>, Error> {
    let (campaign_id, influencer_id) = params.into_inner();

    let influencer =
        manager::update_influencer(&***db, campaign_id, influencer_id, body.into_inner()).await?;

    Ok(Json(InfluencerBody::render(influencer)))
}

#[delete("/campaigns/{campaign_id}/influencers/{influencer_id}")]
#[tracing::instrument(skip(db))]
pub async fn delete_influencer_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<(CampaignId, InfluencerId)>,
) -> Result<HttpResponse, Error> {
    let (campaign_id, influencer_id) = params.into_inner();

    manager::delete_influencer(&***db, campaign_id, influencer_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

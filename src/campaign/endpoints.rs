use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PdfConfig;
use crate::database::Database;
use crate::error::Error;
use crate::influencer::{Influencer, InfluencerBody};
use crate::metrics::{self, CampaignAggregates, CampaignMetrics};
use crate::report::export::{attachment, write_csv, CSV_CONTENT_TYPE, PDF_CONTENT_TYPE};
use crate::report::{self, pdf, Report, ReportQuery};
use crate::share;

use super::{manager, Campaign, CampaignId, SharingSettings};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateCampaignBody {
    pub name: Option<String>,
    #[serde(default)]
    pub budget: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateCampaignBody {
    pub name: Option<String>,
    pub budget: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub name: String,
    pub budget: f64,
    pub share_token: String,
    pub sharing_settings: SharingSettings,
    pub metrics: CampaignMetrics,
    pub influencers: Vec<InfluencerBody>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign, influencers: Vec<Influencer>) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            name: campaign.name,
            budget: campaign.budget,
            share_token: campaign.share_token,
            sharing_settings: campaign.sharing_settings,
            metrics: CampaignMetrics::from_influencers(&influencers),
            influencers: influencers.into_iter().map(InfluencerBody::render).collect(),
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        }
    }

    pub async fn fetch(db: &dyn Database, campaign: Campaign) -> Result<CampaignBody, Error> {
        let influencers = db
            .influencers()
            .fetch_influencers_by_campaign(campaign.id)
            .await?;

        Ok(CampaignBody::render(campaign, influencers))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DashboardBody {
    pub campaign_id: CampaignId,
    pub name: String,
    pub aggregates: CampaignAggregates,
}

#[post("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    body: Json<CreateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let body = body.into_inner();

    let campaign = manager::create_campaign(&***db, body.name, body.budget).await?;

    Ok(Json(CampaignBody::render(campaign, vec![])))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: Data<Box<dyn Database>>,
) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_campaigns(&***db).await?;

    let mut body = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        body.push(CampaignBody::fetch(&***db, campaign).await?);
    }

    Ok(Json(body))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let (campaign, influencers) =
        manager::get_campaign_with_influencers(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::render(campaign, influencers)))
}

#[put("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn update_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<UpdateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let body = body.into_inner();

    let campaign = manager::update_campaign(&***db, campaign_id, body.name, body.budget).await?;

    Ok(Json(CampaignBody::fetch(&***db, campaign).await?))
}

#[delete("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn delete_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();

    manager::delete_campaign(&***db, campaign_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[get("/campaigns/{campaign_id}/dashboard")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_dashboard(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<DashboardBody>, Error> {
    let campaign_id = params.into_inner();

    let (campaign, influencers) =
        manager::get_campaign_with_influencers(&***db, campaign_id).await?;

    Ok(Json(DashboardBody {
        campaign_id: campaign.id,
        aggregates: metrics::aggregate(&influencers, campaign.budget),
        name: campaign.name,
    }))
}

async fn owner_report(
    db: &dyn Database,
    campaign_id: CampaignId,
    query: &ReportQuery,
    settings: Option<SharingSettings>,
) -> Result<Report, Error> {
    let (campaign, influencers) = manager::get_campaign_with_influencers(db, campaign_id).await?;
    let settings = settings.unwrap_or_else(|| campaign.sharing_settings.clone());

    report::build_report(
        &campaign,
        &influencers,
        &settings,
        query,
        Utc::now().date_naive(),
    )
}

#[get("/campaigns/{campaign_id}/report")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_report(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    query: Query<ReportQuery>,
) -> Result<Json<Report>, Error> {
    let campaign_id = params.into_inner();

    let everything = Some(SharingSettings::everything());
    let report = owner_report(&***db, campaign_id, &query, everything).await?;

    Ok(Json(report))
}

#[get("/campaigns/{campaign_id}/report.csv")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_report_csv(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    query: Query<ReportQuery>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();

    let everything = Some(SharingSettings::everything());
    let report = owner_report(&***db, campaign_id, &query, everything).await?;
    let bytes = write_csv(&report.influencers)?;

    Ok(attachment(CSV_CONTENT_TYPE, &report.campaign_name, "report.csv", bytes))
}

#[get("/campaigns/{campaign_id}/report.pdf")]
#[tracing::instrument(skip(db, pdf_config))]
pub async fn get_campaign_report_pdf(
    db: Data<Box<dyn Database>>,
    pdf_config: Data<PdfConfig>,
    params: Path<CampaignId>,
    query: Query<ReportQuery>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();

    let everything = Some(SharingSettings::everything());
    let report = owner_report(&***db, campaign_id, &query, everything).await?;
    let bytes = pdf::render_pdf(&report, &pdf_config)?;

    Ok(attachment(PDF_CONTENT_TYPE, &report.campaign_name, "report.pdf", bytes))
}

/// What a client holding the share token would see.
#[get("/campaigns/{campaign_id}/client-preview")]
#[tracing::instrument(skip(db))]
pub async fn get_client_preview(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    query: Query<ReportQuery>,
) -> Result<Json<Report>, Error> {
    let campaign_id = params.into_inner();

    let report = owner_report(&***db, campaign_id, &query, None).await?;

    Ok(Json(report))
}

#[put("/campaigns/{campaign_id}/sharing")]
#[tracing::instrument(skip(db))]
pub async fn update_sharing_settings(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<SharingSettings>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign =
        manager::update_sharing_settings(&***db, campaign_id, body.into_inner()).await?;

    Ok(Json(CampaignBody::fetch(&***db, campaign).await?))
}

#[post("/campaigns/{campaign_id}/share-token")]
#[tracing::instrument(skip(db))]
pub async fn regenerate_share_token(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = share::manager::regenerate_share_token(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::fetch(&***db, campaign).await?))
}

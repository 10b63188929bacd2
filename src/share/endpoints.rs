use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, HttpResponse};
use chrono::Utc;

use crate::config::PdfConfig;
use crate::database::Database;
use crate::error::Error;
use crate::report::export::{attachment, write_csv, CSV_CONTENT_TYPE, PDF_CONTENT_TYPE};
use crate::report::{self, pdf, Report, ReportQuery};

use super::manager;

async fn shared_report(
    db: &dyn Database,
    token: &str,
    query: &ReportQuery,
) -> Result<Report, Error> {
    let today = Utc::now().date_naive();
    let campaign = manager::resolve_share_token(db, token, today).await?;
    let influencers = db
        .influencers()
        .fetch_influencers_by_campaign(campaign.id)
        .await?;

    report::build_report(
        &campaign,
        &influencers,
        &campaign.sharing_settings,
        query,
        today,
    )
}

/// The client view. Each fetch counts as a visit.
#[get("/share/{token}")]
#[tracing::instrument(skip(db))]
pub async fn get_shared_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<String>,
    query: Query<ReportQuery>,
) -> Result<Json<Report>, Error> {
    let token = params.into_inner();
    let today = Utc::now().date_naive();

    let view = manager::get_client_view(&***db, &token, today).await?;
    let report = report::build_report(
        &view.campaign,
        &view.influencers,
        &view.campaign.sharing_settings,
        &query,
        today,
    )?;

    Ok(Json(report))
}

#[get("/share/{token}/report.csv")]
#[tracing::instrument(skip(db))]
pub async fn get_shared_report_csv(
    db: Data<Box<dyn Database>>,
    params: Path<String>,
    query: Query<ReportQuery>,
) -> Result<HttpResponse, Error> {
    let token = params.into_inner();

    let report = shared_report(&***db, &token, &query).await?;
    let bytes = write_csv(&report.influencers)?;

    Ok(attachment(CSV_CONTENT_TYPE, &report.campaign_name, "report.csv", bytes))
}

#[get("/share/{token}/report.pdf")]
#[tracing::instrument(skip(db, pdf_config))]
pub async fn get_shared_report_pdf(
    db: Data<Box<dyn Database>>,
    pdf_config: Data<PdfConfig>,
    params: Path<String>,
    query: Query<ReportQuery>,
) -> Result<HttpResponse, Error> {
    let token = params.into_inner();

    let report = shared_report(&***db, &token, &query).await?;
    let bytes = pdf::render_pdf(&report, &pdf_config)?;

    Ok(attachment(PDF_CONTENT_TYPE, &report.campaign_name, "report.pdf", bytes))
}

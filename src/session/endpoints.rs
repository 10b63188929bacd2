use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::campaign::CampaignId;
use crate::database::Database;
use crate::error::Error;

use super::{manager, SessionContext, SessionStore};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignSelectionBody {
    pub campaign_id: CampaignId,
}

#[post("/sessions")]
#[tracing::instrument(skip(sessions))]
pub async fn create_session(sessions: Data<SessionStore>) -> Result<Json<SessionContext>, Error> {
    Ok(Json(sessions.create()?))
}

#[get("/sessions/{session_id}")]
#[tracing::instrument(skip(sessions))]
pub async fn get_session(
    sessions: Data<SessionStore>,
    params: Path<Uuid>,
) -> Result<Json<SessionContext>, Error> {
    Ok(Json(sessions.get(params.into_inner())?))
}

#[delete("/sessions/{session_id}")]
#[tracing::instrument(skip(sessions))]
pub async fn delete_session(
    sessions: Data<SessionStore>,
    params: Path<Uuid>,
) -> Result<HttpResponse, Error> {
    sessions.remove(params.into_inner())?;

    Ok(HttpResponse::NoContent().finish())
}

#[put("/sessions/{session_id}/selection")]
#[tracing::instrument(skip(db, sessions))]
pub async fn select_campaign(
    db: Data<Box<dyn Database>>,
    sessions: Data<SessionStore>,
    params: Path<Uuid>,
    body: Json<CampaignSelectionBody>,
) -> Result<Json<SessionContext>, Error> {
    let session_id = params.into_inner();
    let campaign_id = body.into_inner().campaign_id;

    let session = manager::select_campaign(&***db, &sessions, session_id, campaign_id).await?;

    Ok(Json(session))
}

#[delete("/sessions/{session_id}/selection")]
#[tracing::instrument(skip(sessions))]
pub async fn clear_selection(
    sessions: Data<SessionStore>,
    params: Path<Uuid>,
) -> Result<Json<SessionContext>, Error> {
    Ok(Json(manager::clear_selection(&sessions, params.into_inner())?))
}

#[post("/sessions/{session_id}/deletion")]
#[tracing::instrument(skip(db, sessions))]
pub async fn request_deletion(
    db: Data<Box<dyn Database>>,
    sessions: Data<SessionStore>,
    params: Path<Uuid>,
    body: Json<CampaignSelectionBody>,
) -> Result<Json<SessionContext>, Error> {
    let session_id = params.into_inner();
    let campaign_id = body.into_inner().campaign_id;

    let session = manager::request_deletion(&***db, &sessions, session_id, campaign_id).await?;

    Ok(Json(session))
}

#[delete("/sessions/{session_id}/deletion")]
#[tracing::instrument(skip(sessions))]
pub async fn cancel_deletion(
    sessions: Data<SessionStore>,
    params: Path<Uuid>,
) -> Result<Json<SessionContext>, Error> {
    Ok(Json(manager::cancel_deletion(&sessions, params.into_inner())?))
}

#[post("/sessions/{session_id}/deletion/confirm")]
#[tracing::instrument(skip(db, sessions))]
pub async fn confirm_deletion(
    db: Data<Box<dyn Database>>,
    sessions: Data<SessionStore>,
    params: Path<Uuid>,
    body: Json<CampaignSelectionBody>,
) -> Result<Json<SessionContext>, Error> {
    let session_id = params.into_inner();
    let campaign_id = body.into_inner().campaign_id;

    let session = manager::confirm_deletion(&***db, &sessions, session_id, campaign_id).await?;

    Ok(Json(session))
}

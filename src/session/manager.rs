use uuid::Uuid;

use crate::campaign::{manager as campaigns, CampaignId};
use crate::database::Database;
use crate::error::Error;

use super::{SessionContext, SessionStore};

#[tracing::instrument(skip(db, sessions))]
pub async fn select_campaign(
    db: &dyn Database,
    sessions: &SessionStore,
    session_id: Uuid,
    campaign_id: CampaignId,
) -> Result<SessionContext, Error> {
    sessions.get(session_id)?;
    campaigns::get_campaign_by_id(db, campaign_id).await?;

    sessions.update(session_id, |session| {
        session.selected_campaign = Some(campaign_id);
        Ok(())
    })
}

#[tracing::instrument(skip(sessions))]
pub fn clear_selection(sessions: &SessionStore, session_id: Uuid) -> Result<SessionContext, Error> {
    sessions.update(session_id, |session| {
        session.selected_campaign = None;
        Ok(())
    })
}

/// First step of the two-step delete.
#[tracing::instrument(skip(db, sessions))]
pub async fn request_deletion(
    db: &dyn Database,
    sessions: &SessionStore,
    session_id: Uuid,
    campaign_id: CampaignId,
) -> Result<SessionContext, Error> {
    sessions.get(session_id)?;
    campaigns::get_campaign_by_id(db, campaign_id).await?;

    sessions.update(session_id, |session| {
        session.pending_deletion = Some(campaign_id);
        Ok(())
    })
}

#[tracing::instrument(skip(sessions))]
pub fn cancel_deletion(sessions: &SessionStore, session_id: Uuid) -> Result<SessionContext, Error> {
    sessions.update(session_id, |session| {
        session.pending_deletion = None;
        Ok(())
    })
}

/// Deletes the campaign only if this session asked for exactly that one.
#[tracing::instrument(skip(db, sessions))]
pub async fn confirm_deletion(
    db: &dyn Database,
    sessions: &SessionStore,
    session_id: Uuid,
    campaign_id: CampaignId,
) -> Result<SessionContext, Error> {
    let session = sessions.get(session_id)?;
    if session.pending_deletion != Some(campaign_id) {
        return Err(Error::DeletionNotRequested {
            session_id,
            campaign_id,
        });
    }

    campaigns::delete_campaign(db, campaign_id).await?;

    sessions.update(session_id, |session| {
        session.pending_deletion = None;
        if session.selected_campaign == Some(campaign_id) {
            session.selected_campaign = None;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::manager::create_campaign;
    use crate::database::test::MockDatabase;
    use crate::database::InMemoryDatabase;

    #[tokio::test]
    async fn confirm_without_request_conflicts() {
        let db = MockDatabase::new();
        let sessions = SessionStore::new();
        let session = sessions.create().unwrap();
        let campaign_id = CampaignId::from_raw(5);

        let result = confirm_deletion(&db, &sessions, session.id, campaign_id).await;

        assert_eq!(
            result.unwrap_err(),
            Error::DeletionNotRequested {
                session_id: session.id,
                campaign_id
            }
        );
    }

    #[tokio::test]
    async fn confirm_must_match_the_request() {
        let db = InMemoryDatabase::new();
        let sessions = SessionStore::new();
        let session = sessions.create().unwrap();
        let requested = create_campaign(&db, None, 0.0).await.unwrap();
        let other = create_campaign(&db, None, 0.0).await.unwrap();

        request_deletion(&db, &sessions, session.id, requested.id)
            .await
            .unwrap();
        let result = confirm_deletion(&db, &sessions, session.id, other.id).await;

        assert!(matches!(result, Err(Error::DeletionNotRequested { .. })));
        assert!(campaigns::get_campaign_by_id(&db, other.id).await.is_ok());
    }

    #[tokio::test]
    async fn confirmed_deletion_clears_the_selection() {
        let db = InMemoryDatabase::new();
        let sessions = SessionStore::new();
        let session = sessions.create().unwrap();
        let campaign = create_campaign(&db, None, 0.0).await.unwrap();

        select_campaign(&db, &sessions, session.id, campaign.id)
            .await
            .unwrap();
        request_deletion(&db, &sessions, session.id, campaign.id)
            .await
            .unwrap();
        let session = confirm_deletion(&db, &sessions, session.id, campaign.id)
            .await
            .unwrap();

        assert_eq!(session.selected_campaign, None);
        assert_eq!(session.pending_deletion, None);
        assert!(campaigns::get_campaign_by_id(&db, campaign.id)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn cancel_drops_the_pending_request() {
        let db = InMemoryDatabase::new();
        let sessions = SessionStore::new();
        let session = sessions.create().unwrap();
        let campaign = create_campaign(&db, None, 0.0).await.unwrap();

        request_deletion(&db, &sessions, session.id, campaign.id)
            .await
            .unwrap();
        cancel_deletion(&sessions, session.id).unwrap();
        let result = confirm_deletion(&db, &sessions, session.id, campaign.id).await;

        assert!(matches!(result, Err(Error::DeletionNotRequested { .. })));
    }

    #[tokio::test]
    async fn selecting_a_missing_campaign_fails() {
        let db = InMemoryDatabase::new();
        let sessions = SessionStore::new();
        let session = sessions.create().unwrap();
        let campaign_id = CampaignId::from_raw(42);

        let result = select_campaign(&db, &sessions, session.id, campaign_id).await;

        assert_eq!(
            result.unwrap_err(),
            Error::CampaignNotFound { campaign_id }
        );
        assert_eq!(sessions.get(session.id).unwrap().selected_campaign, None);
    }
}

use actix_web::web::{self, Data, JsonConfig, PathConfig, QueryConfig};
use actix_web::{App, HttpResponse, HttpServer, ResponseError};
use mongodb::{bson, Client};
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod config;
pub mod database;
pub mod error;
pub mod influencer;
pub mod metrics;
pub mod report;
pub mod seed;
pub mod session;
pub mod share;
pub mod typedid;

use config::{Config, StoreKind};
use database::{Database, InMemoryDatabase, MongoDatabase};
use error::Error;
use session::SessionStore;

/// Extractor error formats and every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .app_data(QueryConfig::default().error_handler(|err, _req| {
        // format query errors with custom format
        Error::InvalidQuery(err).into()
    }))
    .service(campaign::endpoints::create_campaign)
    .service(campaign::endpoints::get_campaigns)
    .service(campaign::endpoints::get_campaign_by_id)
    .service(campaign::endpoints::update_campaign)
    .service(campaign::endpoints::delete_campaign)
    .service(campaign::endpoints::get_campaign_dashboard)
    .service(campaign::endpoints::get_campaign_report)
    .service(campaign::endpoints::get_campaign_report_csv)
    .service(campaign::endpoints::get_campaign_report_pdf)
    .service(campaign::endpoints::get_client_preview)
    .service(campaign::endpoints::update_sharing_settings)
    .service(campaign::endpoints::regenerate_share_token)
    // the fixed paths must be registered ahead of `{influencer_id}`
    .service(influencer::endpoints::get_influencer_template)
    .service(influencer::endpoints::export_influencers_in_campaign)
    .service(influencer::endpoints::import_influencers_into_campaign)
    .service(influencer::endpoints::create_influencer_in_campaign)
    .service(influencer::endpoints::get_influencers_in_campaign)
    .service(influencer::endpoints::get_influencer_in_campaign_by_id)
    .service(influencer::endpoints::update_influencer_in_campaign)
    .service(influencer::endpoints::delete_influencer_in_campaign)
    .service(share::endpoints::get_shared_campaign)
    .service(share::endpoints::get_shared_report_csv)
    .service(share::endpoints::get_shared_report_pdf)
    .service(session::endpoints::create_session)
    .service(session::endpoints::get_session)
    .service(session::endpoints::delete_session)
    .service(session::endpoints::select_campaign)
    .service(session::endpoints::clear_selection)
    .service(session::endpoints::request_deletion)
    .service(session::endpoints::cancel_deletion)
    .service(session::endpoints::confirm_deletion);
}

pub async fn not_found() -> HttpResponse {
    Error::PathNotFound.error_response()
}

#[tracing::instrument(skip(config), fields(store = ?config.store))]
pub async fn connect(config: &Config) -> Result<Box<dyn Database>, Error> {
    match config.store {
        StoreKind::Mongo => {
            info!("connecting to db: {}", config.mongo_uri);
            let db = Client::with_uri_str(&config.mongo_uri)
                .await?
                .database(&config.database_name);

            // ping the database to ensure connection is established
            db.run_command(bson::doc! { "ping": 1 }, None).await?;

            Ok(Box::new(MongoDatabase::initialize(db).await?))
        }
        StoreKind::Memory => {
            info!("using the in-memory store, nothing will be persisted");
            Ok(Box::new(InMemoryDatabase::new()))
        }
    }
}

pub async fn run(config: Config) -> Result<(), Error> {
    let db = connect(&config).await?;
    if config.seed {
        seed::seed(&*db).await?;
    }

    let db: Data<Box<dyn Database>> = Data::new(db);
    let sessions = Data::new(SessionStore::with_ttl(config.session_ttl));
    let pdf_config = Data::new(config.pdf.clone());

    info!("listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(sessions.clone())
            .app_data(pdf_config.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
            .default_service(web::to(not_found))
    })
    .bind(&config.bind_address)?
    .run()
    .await?;

    Ok(())
}

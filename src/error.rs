use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::NaiveDate;
use csv::Error as CsvError;
use derivative::Derivative;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::campaign::CampaignId;
use crate::influencer::InfluencerId;
use crate::metrics::SortKey;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    InfluencerNameRequired,
    InvalidInfluencerValue {
        field: &'static str,
        #[derivative(PartialEq = "ignore")]
        value: f64,
    },
    InvalidBudget {
        #[derivative(PartialEq = "ignore")]
        budget: f64,
    },
    MissingCsvColumns {
        columns: Vec<String>,
    },
    InvalidCsvRow {
        row: usize,
        message: String,
    },
    #[serde(serialize_with = "display")]
    InvalidCsv(#[derivative(PartialEq = "ignore")] CsvError),
    SortKeyNotAvailable {
        sort: SortKey,
    },

    // 404
    PathNotFound,
    CampaignNotFound {
        campaign_id: CampaignId,
    },
    InfluencerNotFoundInCampaign {
        campaign_id: CampaignId,
        influencer_id: InfluencerId,
    },
    ShareTokenNotFound,
    SessionNotFound {
        session_id: Uuid,
    },

    // 409
    DeletionNotRequested {
        session_id: Uuid,
        campaign_id: CampaignId,
    },

    // 410
    ShareTokenExpired {
        expired_on: NaiveDate,
    },

    // 500
    ExistentialState(String),
    InvalidConfiguration {
        name: &'static str,
        value: String,
    },
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    FailedToWriteCsv(#[derivative(PartialEq = "ignore")] CsvError),
    FailedToRenderPdf(String),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidQuery(_) => "E4001003",
            Error::InfluencerNameRequired => "E4001004",
            Error::InvalidInfluencerValue { .. } => "E4001005",
            Error::InvalidBudget { .. } => "E4001006",
            Error::MissingCsvColumns { .. } => "E4001007",
            Error::InvalidCsvRow { .. } => "E4001008",
            Error::InvalidCsv(_) => "E4001009",
            Error::SortKeyNotAvailable { .. } => "E4001010",
            Error::PathNotFound => "E4041000",
            Error::CampaignNotFound { .. } => "E4041001",
            Error::InfluencerNotFoundInCampaign { .. } => "E4041002",
            Error::ShareTokenNotFound => "E4041003",
            Error::SessionNotFound { .. } => "E4041004",
            Error::DeletionNotRequested { .. } => "E4091000",
            Error::ShareTokenExpired { .. } => "E4101000",
            Error::ExistentialState(_) => "E5001000",
            Error::InvalidConfiguration { .. } => "E5001001",
            Error::FailedDatabaseCall(_) => "E5001002",
            Error::FailedToSerializeToBson(_) => "E5001003",
            Error::FailedToWriteCsv(_) => "E5001004",
            Error::FailedToRenderPdf(_) => "E5001005",
            Error::IoError(_) => "E5001006",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::InfluencerNameRequired => "Influencer name is required",
            Error::InvalidInfluencerValue { .. } => {
                "The given influencer value is negative or out of range"
            }
            Error::InvalidBudget { .. } => "The campaign budget must be a non-negative number",
            Error::MissingCsvColumns { .. } => "The given csv is missing required columns",
            Error::InvalidCsvRow { .. } => "The given csv contains an invalid row",
            Error::InvalidCsv(_) => "The given csv could not be parsed",
            Error::SortKeyNotAvailable { .. } => {
                "The requested sort column is not visible in this report"
            }
            Error::PathNotFound => "The requested path was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::InfluencerNotFoundInCampaign { .. } => {
                "The requested influencer was not found in the campaign"
            }
            Error::ShareTokenNotFound => "Invalid or expired share token",
            Error::SessionNotFound { .. } => "The requested session was not found",
            Error::DeletionNotRequested { .. } => {
                "The campaign deletion must be requested before it is confirmed"
            }
            Error::ShareTokenExpired { .. } => "Invalid or expired share token",
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::InvalidConfiguration { .. } => "The server configuration is invalid",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::FailedToWriteCsv(_) => "An error occurred when writing csv",
            Error::FailedToRenderPdf(_) => "An error occurred when rendering the pdf report",
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::InfluencerNameRequired => StatusCode::BAD_REQUEST,
            Error::InvalidInfluencerValue { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidBudget { .. } => StatusCode::BAD_REQUEST,
            Error::MissingCsvColumns { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidCsvRow { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidCsv(_) => StatusCode::BAD_REQUEST,
            Error::SortKeyNotAvailable { .. } => StatusCode::BAD_REQUEST,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::InfluencerNotFoundInCampaign { .. } => StatusCode::NOT_FOUND,
            Error::ShareTokenNotFound => StatusCode::NOT_FOUND,
            Error::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            Error::DeletionNotRequested { .. } => StatusCode::CONFLICT,
            Error::ShareTokenExpired { .. } => StatusCode::GONE,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidConfiguration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToWriteCsv(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToRenderPdf(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<CsvError> for Error {
    fn from(error: CsvError) -> Error {
        Error::FailedToWriteCsv(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::InvalidCsv(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::FailedToWriteCsv(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_line_up_with_status() {
        let errors = vec![
            Error::InfluencerNameRequired,
            Error::PathNotFound,
            Error::ShareTokenNotFound,
            Error::ShareTokenExpired {
                expired_on: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            },
            Error::ExistentialState("no".into()),
        ];

        for error in errors {
            let status = error.status_code().as_u16().to_string();
            assert_eq!(&error.error_code()[1..4], status, "{:?}", error);
        }
    }

    #[test]
    fn meta_serializes_fields() {
        let error = Error::MissingCsvColumns {
            columns: vec!["views".into(), "cost".into()],
        };

        let meta = serde_json::to_value(&error).unwrap();

        assert_eq!(meta, serde_json::json!({ "columns": ["views", "cost"] }));
    }
}

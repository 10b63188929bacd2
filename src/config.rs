use std::path::PathBuf;

use chrono::Duration;

use crate::error::Error;
use crate::session::DEFAULT_SESSION_TTL_MINUTES;

const BIND: &str = "CAMPAIGN_TRACKER_BIND";
const STORE: &str = "CAMPAIGN_TRACKER_STORE";
const MONGO_URI: &str = "CAMPAIGN_TRACKER_MONGO_URI";
const DATABASE: &str = "CAMPAIGN_TRACKER_DATABASE";
const LOG: &str = "CAMPAIGN_TRACKER_LOG";
const SEED: &str = "CAMPAIGN_TRACKER_SEED";
const FONT_DIR: &str = "CAMPAIGN_TRACKER_FONT_DIR";
const FONT_FAMILY: &str = "CAMPAIGN_TRACKER_FONT_FAMILY";
const SESSION_TTL: &str = "CAMPAIGN_TRACKER_SESSION_TTL_MINUTES";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

/// Where the PDF renderer finds its fonts; `genpdf` loads the
/// `{family}-Regular.ttf`, `-Bold`, `-Italic` and `-BoldItalic` files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfConfig {
    pub font_dir: PathBuf,
    pub font_family: String,
}

impl Default for PdfConfig {
    fn default() -> PdfConfig {
        PdfConfig {
            font_dir: PathBuf::from("./fonts"),
            font_family: "LiberationSans".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub bind_address: String,
    pub store: StoreKind,
    pub mongo_uri: String,
    pub database_name: String,
    pub log_filter: String,
    pub seed: bool,
    pub session_ttl: Duration,
    pub pdf: PdfConfig,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Config, Error> {
        dotenvy::dotenv().ok();
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let store = match get(STORE, "mongo").to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => StoreKind::Mongo,
            "memory" => StoreKind::Memory,
            other => {
                return Err(Error::InvalidConfiguration {
                    name: STORE,
                    value: other.to_string(),
                })
            }
        };

        let seed = match get(SEED, "false").to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            other => {
                return Err(Error::InvalidConfiguration {
                    name: SEED,
                    value: other.to_string(),
                })
            }
        };

        let ttl_minutes = get(SESSION_TTL, &DEFAULT_SESSION_TTL_MINUTES.to_string());
        let session_ttl = match ttl_minutes.parse::<i64>() {
            Ok(minutes) if minutes > 0 => Duration::minutes(minutes),
            _ => {
                return Err(Error::InvalidConfiguration {
                    name: SESSION_TTL,
                    value: ttl_minutes,
                })
            }
        };

        let bind_address = get(BIND, "127.0.0.1:8080");
        if !bind_address.contains(':') {
            return Err(Error::InvalidConfiguration {
                name: BIND,
                value: bind_address,
            });
        }

        Ok(Config {
            bind_address,
            store,
            mongo_uri: get(MONGO_URI, "mongodb://localhost:27017"),
            database_name: get(DATABASE, "campaign_tracker"),
            log_filter: get(LOG, "campaign_tracker=debug,info"),
            seed,
            session_ttl,
            pdf: PdfConfig {
                font_dir: PathBuf::from(get(FONT_DIR, "./fonts")),
                font_family: get(FONT_FAMILY, "LiberationSans"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.store, StoreKind::Mongo);
        assert_eq!(config.mongo_uri, "mongodb://localhost:27017");
        assert_eq!(config.database_name, "campaign_tracker");
        assert!(!config.seed);
        assert_eq!(config.session_ttl, Duration::hours(12));
        assert_eq!(config.pdf, PdfConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (STORE, "Memory"),
            (SEED, "yes"),
            (BIND, "0.0.0.0:9000"),
            (FONT_FAMILY, "DejaVuSans"),
        ]))
        .unwrap();

        assert_eq!(config.store, StoreKind::Memory);
        assert!(config.seed);
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.pdf.font_family, "DejaVuSans");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[(DATABASE, "   ")])).unwrap();

        assert_eq!(config.database_name, "campaign_tracker");
    }

    #[test]
    fn rejects_unknown_store() {
        let result = Config::from_lookup(lookup_from(&[(STORE, "postgres")]));

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidConfiguration {
                name: STORE,
                value: "postgres".to_string(),
            }
        );
    }

    #[test]
    fn reads_session_ttl_in_minutes() {
        let config = Config::from_lookup(lookup_from(&[(SESSION_TTL, "45")])).unwrap();

        assert_eq!(config.session_ttl, Duration::minutes(45));
    }

    #[test]
    fn rejects_non_positive_session_ttl() {
        for value in ["0", "-5", "soon"] {
            let result = Config::from_lookup(lookup_from(&[(SESSION_TTL, value)]));

            assert_eq!(
                result.unwrap_err(),
                Error::InvalidConfiguration {
                    name: SESSION_TTL,
                    value: value.to_string(),
                }
            );
        }
    }

    #[test]
    fn rejects_unparseable_seed_flag() {
        let result = Config::from_lookup(lookup_from(&[(SEED, "sometimes")]));

        assert!(matches!(
            result,
            Err(Error::InvalidConfiguration { name: SEED, .. })
        ));
    }
}

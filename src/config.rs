use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "CareFlow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_EXTRACTION_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_SUMMARY_MODEL: &str = "deepseek-r1-distill-llama-70b";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PLAN_START_DATE: &str = "2025-04-26";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,careflow_lib=debug,tower_http=info"
}

/// Get the application data directory
/// ~/CareFlow/ unless overridden by `CAREFLOW_DATA_DIR`.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Cannot determine home directory; set CAREFLOW_DATA_DIR")]
    NoDataDir,
}

/// Which event/call-log/document store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Postgrest,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgrest => "postgrest",
            Self::Memory => "memory",
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgrest" | "supabase" => Ok(Self::Postgrest),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid {
                key: "CAREFLOW_STORE_BACKEND",
                value: s.into(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub service_key: String,
    /// Per-request timeout for PostgREST calls. Independent of the LLM timeout.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    /// Absent key is allowed at startup; calls then fail as `LlmError`.
    pub api_key: Option<String>,
    pub extraction_model: String,
    pub summary_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Process settings, built once at startup and injected everywhere else.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub database_path: PathBuf,
    pub store_backend: StoreBackend,
    pub supabase: Option<SupabaseSettings>,
    pub llm: LlmSettings,
    pub plan_start_date: NaiveDate,
    pub max_upload_bytes: usize,
    pub webhook_secret: Option<String>,
}

impl Settings {
    /// Read settings from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or(&get, "CAREFLOW_BIND_ADDR", DEFAULT_BIND_ADDR)?;

        let data_dir = match get("CAREFLOW_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => app_data_dir().ok_or(ConfigError::NoDataDir)?,
        };
        let upload_dir = get("CAREFLOW_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("uploaded_pdfs"));
        let database_path = get("CAREFLOW_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("careflow.db"));

        let store_backend: StoreBackend = parse_or(&get, "CAREFLOW_STORE_BACKEND", "sqlite")?;
        let store_timeout_secs: u64 = parse_or(
            &get,
            "CAREFLOW_STORE_TIMEOUT_SECS",
            &DEFAULT_STORE_TIMEOUT_SECS.to_string(),
        )?;
        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_KEY")) {
            (Some(url), Some(service_key)) => Some(SupabaseSettings {
                url,
                service_key,
                timeout_secs: store_timeout_secs,
            }),
            _ => None,
        };
        if store_backend == StoreBackend::Postgrest && supabase.is_none() {
            return Err(ConfigError::Missing("SUPABASE_URL and SUPABASE_SERVICE_KEY"));
        }

        let llm = LlmSettings {
            base_url: get("CAREFLOW_LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.into()),
            api_key: get("GROQ_API_KEY"),
            extraction_model: get("CAREFLOW_EXTRACTION_MODEL")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.into()),
            summary_model: get("CAREFLOW_SUMMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.into()),
            temperature: parse_or(
                &get,
                "CAREFLOW_LLM_TEMPERATURE",
                &DEFAULT_LLM_TEMPERATURE.to_string(),
            )?,
            timeout_secs: parse_or(
                &get,
                "CAREFLOW_LLM_TIMEOUT_SECS",
                &DEFAULT_LLM_TIMEOUT_SECS.to_string(),
            )?,
        };
        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::Invalid {
                key: "CAREFLOW_LLM_TEMPERATURE",
                value: llm.temperature.to_string(),
            });
        }

        let plan_start_date = match get("CAREFLOW_PLAN_START_DATE") {
            Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                ConfigError::Invalid {
                    key: "CAREFLOW_PLAN_START_DATE",
                    value,
                }
            })?,
            None => NaiveDate::parse_from_str(DEFAULT_PLAN_START_DATE, "%Y-%m-%d").map_err(
                |_| ConfigError::Invalid {
                    key: "CAREFLOW_PLAN_START_DATE",
                    value: DEFAULT_PLAN_START_DATE.into(),
                },
            )?,
        };

        let max_upload_bytes = parse_or(
            &get,
            "CAREFLOW_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )?;

        Ok(Self {
            bind_addr,
            data_dir,
            upload_dir,
            database_path,
            store_backend,
            supabase,
            llm,
            plan_start_date,
            max_upload_bytes,
            webhook_secret: get("ELEVENLABS_WEBHOOK_SECRET"),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    let value = get(key).unwrap_or_else(|| default.to_string());
    value.trim().parse().map_err(|_| ConfigError::Invalid { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::from_lookup(lookup(&[("CAREFLOW_DATA_DIR", "/tmp/careflow")])).unwrap();
        assert_eq!(settings.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.upload_dir, PathBuf::from("/tmp/careflow/uploaded_pdfs"));
        assert_eq!(settings.database_path, PathBuf::from("/tmp/careflow/careflow.db"));
        assert_eq!(settings.store_backend, StoreBackend::Sqlite);
        assert_eq!(settings.llm.extraction_model, DEFAULT_EXTRACTION_MODEL);
        assert_eq!(settings.llm.summary_model, DEFAULT_SUMMARY_MODEL);
        assert_eq!(settings.llm.timeout_secs, 120);
        assert_eq!(
            settings.plan_start_date,
            NaiveDate::from_ymd_opt(2025, 4, 26).unwrap()
        );
        assert_eq!(settings.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(settings.webhook_secret.is_none());
        assert!(settings.llm.api_key.is_none());
    }

    #[test]
    fn postgrest_requires_supabase_credentials() {
        let result = Settings::from_lookup(lookup(&[
            ("CAREFLOW_DATA_DIR", "/tmp/careflow"),
            ("CAREFLOW_STORE_BACKEND", "postgrest"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
        ]));
        assert!(matches!(result, Err(ConfigError::Missing(_))));

        let settings = Settings::from_lookup(lookup(&[
            ("CAREFLOW_DATA_DIR", "/tmp/careflow"),
            ("CAREFLOW_STORE_BACKEND", "supabase"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service-key"),
        ]))
        .unwrap();
        assert_eq!(settings.store_backend, StoreBackend::Postgrest);
        assert_eq!(
            settings.supabase.as_ref().unwrap().timeout_secs,
            DEFAULT_STORE_TIMEOUT_SECS
        );
    }

    #[test]
    fn store_timeout_is_separate_from_llm_timeout() {
        let settings = Settings::from_lookup(lookup(&[
            ("CAREFLOW_DATA_DIR", "/tmp/careflow"),
            ("CAREFLOW_STORE_BACKEND", "postgrest"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service-key"),
            ("CAREFLOW_LLM_TIMEOUT_SECS", "300"),
            ("CAREFLOW_STORE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(settings.llm.timeout_secs, 300);
        assert_eq!(settings.supabase.unwrap().timeout_secs, 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            ("CAREFLOW_BIND_ADDR", "not-an-addr"),
            ("CAREFLOW_STORE_BACKEND", "redis"),
            ("CAREFLOW_LLM_TEMPERATURE", "hot"),
            ("CAREFLOW_LLM_TEMPERATURE", "5.0"),
            ("CAREFLOW_LLM_TIMEOUT_SECS", "-1"),
            ("CAREFLOW_STORE_TIMEOUT_SECS", "soon"),
            ("CAREFLOW_PLAN_START_DATE", "26/04/2025"),
        ] {
            let result =
                Settings::from_lookup(lookup(&[("CAREFLOW_DATA_DIR", "/tmp/careflow"), (key, value)]));
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn blank_values_count_as_unset() {
        let settings = Settings::from_lookup(lookup(&[
            ("CAREFLOW_DATA_DIR", "/tmp/careflow"),
            ("GROQ_API_KEY", "  "),
            ("ELEVENLABS_WEBHOOK_SECRET", ""),
        ]))
        .unwrap();
        assert!(settings.llm.api_key.is_none());
        assert!(settings.webhook_secret.is_none());
    }

    #[test]
    fn app_name_is_careflow() {
        assert_eq!(APP_NAME, "CareFlow");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}

use crate::comparatif::EnergyType;
use crate::services::chart::ChartPolicy;
use crate::services::page_filter::PageFilter;
use crate::utils::DateZone;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// How generated PDFs are named on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameScheme {
    /// `Comparatif_{uuid}.pdf`
    Uuid,
    /// `{society}_{energyType}_{date}.pdf`, written through a temp file and renamed
    Deterministic,
}

impl FromStr for FilenameScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(FilenameScheme::Uuid),
            "deterministic" => Ok(FilenameScheme::Deterministic),
            other => Err(format!("Invalid FILENAME_SCHEME '{}': expected uuid or deterministic", other)),
        }
    }
}

pub const DEFAULT_LOG_FILTER: &str = "info,comparatif_server=debug";

#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: String,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_level: String,

    // Storage
    pub media_root: PathBuf,
    pub media_url: String,
    pub static_url: String,
    pub staging_host: String,
    pub staging_media_url: String,
    pub production_host: String,
    pub production_media_url: String,
    pub public_scheme: String,
    pub filename_scheme: FilenameScheme,

    // Rendering
    pub date_zone: DateZone,
    pub chart_policy_gas: ChartPolicy,
    pub chart_policy_electricity: ChartPolicy,
    pub page_filter: PageFilter,
    pub pdf_zoom: f64,

    // Browser
    pub chrome_path: Option<String>,
    pub headless: bool,
    pub render_timeout_ms: u64,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(name, default);
    raw.parse::<T>()
        .map_err(|e| format!("{}: {}", name, e).into())
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        Ok(Config {
            http_addr: var_or("HTTP_ADDR", "0.0.0.0:8000"),
            log_level: var_or("LOG_LEVEL", DEFAULT_LOG_FILTER),

            media_root: PathBuf::from(var_or("MEDIA_ROOT", "./media")),
            media_url: var_or("MEDIA_URL", "/media/"),
            static_url: var_or("STATIC_URL", "/static/"),
            staging_host: var_or("STAGING_HOST", "volt-crm.caansoft.com"),
            staging_media_url: var_or("STAGING_MEDIA_URL", "/staging-media/"),
            production_host: var_or("PRODUCTION_HOST", "crm.volt-consulting.com"),
            production_media_url: var_or("PRODUCTION_MEDIA_URL", "/production-media/"),
            public_scheme: var_or("PUBLIC_SCHEME", "http"),
            filename_scheme: parse_var("FILENAME_SCHEME", "uuid")?,

            date_zone: parse_var("DATE_TIMEZONE", "UTC")?,
            chart_policy_gas: parse_var("CHART_POLICY_GAS", "strict")?,
            chart_policy_electricity: parse_var("CHART_POLICY_ELECTRICITY", "lenient")?,
            page_filter: parse_var("PAGE_FILTER", "blank")?,
            pdf_zoom: parse_var("PDF_ZOOM", "0.8")?,

            chrome_path: env::var("CHROME_PATH").ok().filter(|s| !s.is_empty()),
            headless: var_or("HEADLESS", "true").parse().unwrap_or(true),
            render_timeout_ms: var_or("RENDER_TIMEOUT_MS", "60000").parse().unwrap_or(60000),
        })
    }

    /// Chart policy of a product variant. An undeclared energy type is
    /// lenient so the normalizer gets to report the real problem.
    pub fn chart_policy(&self, energy_type: Option<EnergyType>) -> ChartPolicy {
        match energy_type {
            Some(EnergyType::Gas) => self.chart_policy_gas,
            Some(EnergyType::Electricity) => self.chart_policy_electricity,
            None => ChartPolicy::Lenient,
        }
    }

    /// Media URL prefix for the requesting host (port ignored).
    pub fn media_url_for_host(&self, host: &str) -> &str {
        let host = host.split(':').next().unwrap_or_default();
        if host.eq_ignore_ascii_case(&self.staging_host) {
            &self.staging_media_url
        } else if host.eq_ignore_ascii_case(&self.production_host) {
            &self.production_media_url
        } else {
            &self.media_url
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            http_addr: "0.0.0.0:8000".to_string(),
            log_level: DEFAULT_LOG_FILTER.to_string(),
            media_root: PathBuf::from("./media"),
            media_url: "/media/".to_string(),
            static_url: "/static/".to_string(),
            staging_host: "volt-crm.caansoft.com".to_string(),
            staging_media_url: "/staging-media/".to_string(),
            production_host: "crm.volt-consulting.com".to_string(),
            production_media_url: "/production-media/".to_string(),
            public_scheme: "http".to_string(),
            filename_scheme: FilenameScheme::Uuid,
            date_zone: DateZone::Utc,
            chart_policy_gas: ChartPolicy::Strict,
            chart_policy_electricity: ChartPolicy::Lenient,
            page_filter: PageFilter::Blank,
            pdf_zoom: 0.8,
            chrome_path: None,
            headless: true,
            render_timeout_ms: 60000,
        }
    }
}

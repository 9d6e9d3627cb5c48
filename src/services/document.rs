//! Request pipeline from parsed payload to a stored PDF.

use crate::comparatif::{normalize, CanonicalComparatif, EnergyType, NormalizeOptions, RawComparatifInput};
use crate::config::{Config, FilenameScheme};
use crate::http::ApiError;
use crate::services::chart::{prepare_price_chart, prepare_stacked_bars, to_data_uri, ChartPolicy, ChartRenderer};
use crate::services::page_filter;
use crate::services::pdf::{PageSpec, PdfRenderer};
use crate::services::presentation::{build_presentation, AssetContext, ChartImages};
use crate::services::template::{TemplateRenderer, COMPARATIF_TEMPLATE};
use crate::utils::json_text;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const PDF_MIME_TYPE: &str = "application/pdf";
const OUTPUT_DIR: &str = "comparatif";
const COMPARATIF_KEY: &str = "comparatifClientHistoryPdfDto";

/// Where the request came from; drives media prefix and absolute URLs.
#[derive(Debug, Clone)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

/// A PDF written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub url: String,
    pub filename: String,
    pub path: PathBuf,
}

pub struct DocumentProducer {
    config: Arc<Config>,
    charts: Arc<dyn ChartRenderer>,
    templates: TemplateRenderer,
    pdf: Arc<dyn PdfRenderer>,
}

impl DocumentProducer {
    pub fn new(
        config: Arc<Config>,
        charts: Arc<dyn ChartRenderer>,
        pdf: Arc<dyn PdfRenderer>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            config,
            charts,
            templates: TemplateRenderer::new()?,
            pdf,
        })
    }

    pub async fn produce(&self, data: &RawComparatifInput, origin: &RequestOrigin) -> Result<StoredDocument, ApiError> {
        let started = Instant::now();
        let raw = comparatif_payload(data)?;
        let energy_hint = raw
            .get("energyType")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<EnergyType>().ok());
        let policy = self.config.chart_policy(energy_hint);

        let price_chart = self.price_chart(data, energy_hint, policy)?;

        let comparatif = normalize(
            &raw,
            &NormalizeOptions {
                title: json_text(data.get("contexte_title")).unwrap_or_else(|| NormalizeOptions::default().title),
                zone: self.config.date_zone,
            },
        )?;

        let consumption_chart = self.consumption_chart(data, &comparatif, policy)?;

        let assets = AssetContext::new(&origin.scheme, &origin.host, &self.config.static_url);
        let presentation = build_presentation(
            data,
            &comparatif,
            ChartImages {
                price: price_chart,
                consumption: consumption_chart,
            },
            &assets,
        );
        let html = self.templates.render(COMPARATIF_TEMPLATE, &presentation)?;
        tracing::debug!(bytes = html.len(), pages = presentation.rate_pages.len(), "HTML rendered");

        let pdf = self.render_pdf(&html).await?;
        let pdf = page_filter::apply(&self.config.page_filter, pdf)?;

        let stored = self.store(data, &comparatif, origin, &pdf).await?;
        tracing::info!(
            file = %stored.filename,
            bytes = pdf.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Presentation generated"
        );
        Ok(stored)
    }

    fn price_chart(
        &self,
        data: &RawComparatifInput,
        energy_type: Option<EnergyType>,
        policy: ChartPolicy,
    ) -> Result<Option<String>, ApiError> {
        let rendered = policy.apply(
            prepare_price_chart(data.get("chartDataDto"), energy_type)
                .and_then(|spec| self.charts.render_line_chart(&spec)),
        )?;
        Ok(rendered.map(|bytes| to_data_uri(&bytes, self.charts.mime_type())))
    }

    fn consumption_chart(
        &self,
        data: &RawComparatifInput,
        comparatif: &CanonicalComparatif,
        policy: ChartPolicy,
    ) -> Result<Option<String>, ApiError> {
        let Some(spec) = prepare_stacked_bars(data.get("consumptionChartDto"), comparatif.columns()) else {
            return Ok(None);
        };
        let rendered = policy.apply(self.charts.render_stacked_bar_chart(&spec))?;
        Ok(rendered.map(|bytes| to_data_uri(&bytes, self.charts.mime_type())))
    }

    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, ApiError> {
        let spec = PageSpec::a1_landscape(self.config.pdf_zoom);
        let limit = Duration::from_millis(self.config.render_timeout_ms);
        match tokio::time::timeout(limit, self.pdf.render(html, spec)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Render(format!(
                "PDF conversion timed out after {} ms",
                self.config.render_timeout_ms
            ))),
        }
    }

    async fn store(
        &self,
        data: &RawComparatifInput,
        comparatif: &CanonicalComparatif,
        origin: &RequestOrigin,
        pdf: &[u8],
    ) -> Result<StoredDocument, ApiError> {
        let media_prefix = self.config.media_url_for_host(&origin.host);
        let relative = output_dir(data, comparatif);
        let filename = match self.config.filename_scheme {
            FilenameScheme::Uuid => uuid_filename(),
            FilenameScheme::Deterministic => deterministic_filename(data, comparatif),
        };

        let dir = self
            .config
            .media_root
            .join(media_prefix.trim_matches('/'))
            .join(&relative);
        let path = dir.join(&filename);
        write_atomic(&dir, &path, pdf).await?;

        let mut segments: Vec<String> = Vec::new();
        let prefix = media_prefix.trim_matches('/');
        if !prefix.is_empty() {
            segments.push(prefix.to_string());
        }
        segments.extend(relative.iter().map(|s| s.to_string_lossy().into_owned()));
        segments.push(filename.clone());
        let url = format!("{}://{}/{}", origin.scheme, origin.host, segments.join("/"));

        Ok(StoredDocument { url, filename, path })
    }
}

fn comparatif_payload(data: &RawComparatifInput) -> Result<RawComparatifInput, ApiError> {
    match data.get(COMPARATIF_KEY) {
        None | Some(Value::Null) => Ok(RawComparatifInput::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ApiError::validation(COMPARATIF_KEY, "must be an object")),
    }
}

/// Path segment from caller input; never empty, never a traversal.
fn path_segment(value: Option<&Value>) -> Option<String> {
    let text = json_text(value)?;
    Some(slug::slugify(text)).filter(|s| !s.is_empty())
}

/// `comparatif[/<clientId>/<comparatifId>]`
pub fn output_dir(data: &RawComparatifInput, comparatif: &CanonicalComparatif) -> PathBuf {
    let mut dir = PathBuf::from(OUTPUT_DIR);
    let client = path_segment(data.get("clientId"));
    let id = comparatif.id.as_deref().map(slug::slugify).filter(|s| !s.is_empty());
    if let (Some(client), Some(id)) = (client, id) {
        dir.push(client);
        dir.push(id);
    }
    dir
}

pub fn uuid_filename() -> String {
    format!("Comparatif_{}.pdf", Uuid::new_v4().simple())
}

/// `{society}_{energyType}_{date}.pdf`
pub fn deterministic_filename(data: &RawComparatifInput, comparatif: &CanonicalComparatif) -> String {
    let society = path_segment(data.get("clientSociety")).unwrap_or_else(|| "client".to_string());
    format!(
        "{}_{}_{}.pdf",
        society,
        comparatif.energy_type,
        comparatif.created_on.replace('/', "-")
    )
}

/// Writes next to the target then renames, so readers never see a partial file
/// and concurrent writers of the same name leave one complete document.
pub async fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), ApiError> {
    tokio::fs::create_dir_all(dir).await?;
    let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4().simple()));
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

use crate::services::document::{StoredDocument, PDF_MIME_TYPE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "PDF generated successfully";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Body of a successful generation. Field names are part of the public contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationResponse {
    pub status: String,
    pub path: String,
    pub name: String,
    pub title: String,
    pub mime_type: String,
    pub message: String,
}

impl From<StoredDocument> for PresentationResponse {
    fn from(doc: StoredDocument) -> Self {
        Self {
            status: "success".to_string(),
            path: doc.url,
            title: doc.filename.clone(),
            name: doc.filename,
            mime_type: PDF_MIME_TYPE.to_string(),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

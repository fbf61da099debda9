//! Packet assembly: template, documents, numbering, bytes

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PacketConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::model::{DocumentRequest, ProjectData};
use crate::pdf::merge::{merge_document, MergeOutcome};
use crate::pdf::numbering::number_pages;
use crate::template::{load_template, TemplateSource};

/// A packet request as received from the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketRequest {
    #[serde(default)]
    pub project_data: ProjectData,
    /// Merge order
    #[serde(default)]
    pub documents: Vec<DocumentRequest>,
}

impl PacketRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidRequest(e.to_string()))
    }
}

/// The finished packet
#[derive(Debug, Clone)]
pub struct Packet {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub template: TemplateSource,
    /// One entry per requested document, in request order
    pub outcomes: Vec<MergeOutcome>,
}

/// Build the packet for `request`
///
/// Unavailable documents and pages become error pages inside the packet; the
/// only errors returned are packet-level ones.
pub async fn generate_packet(request: &PacketRequest, fetcher: &dyn Fetcher, config: &PacketConfig) -> Result<Packet> {
    let project = &request.project_data;
    info!(
        "Building packet for '{}' with {} documents",
        project.project_name,
        request.documents.len()
    );

    let (mut packet, template) = load_template(fetcher, config, project).await?;

    let mut outcomes = Vec::with_capacity(request.documents.len());
    for document in &request.documents {
        let starting_page = packet.page_count() + 1;
        outcomes.push(merge_document(&mut packet, fetcher, config, document, starting_page).await?);
    }

    let page_count = number_pages(&mut packet)?;
    let bytes = packet.to_bytes()?;
    info!("Packet complete: {} pages, {} bytes", page_count, bytes.len());

    Ok(Packet {
        filename: packet_filename(&project.project_name),
        bytes,
        page_count,
        template,
        outcomes,
    })
}

/// Download name for a project: alphanumerics only, plus `_Packet.pdf`
pub fn packet_filename(project_name: &str) -> String {
    let stem: String = project_name.chars().filter(char::is_ascii_alphanumeric).collect();
    format!("{}_Packet.pdf", stem)
}

/// Structured failure payload returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketFailure {
    pub error: String,
    pub message: String,
}

impl PacketFailure {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", self.error))
    }
}

impl From<&Error> for PacketFailure {
    fn from(error: &Error) -> Self {
        let kind = match error {
            Error::InvalidRequest(_) | Error::Json(_) => "invalid_request",
            Error::Serialization(_) => "serialization_failed",
            _ => "packet_failed",
        };
        Self {
            error: kind.to_string(),
            message: error.to_string(),
        }
    }
}

//! Loading the packet's first pages: the filled template, or a generated cover

use lopdf::Document;
use tracing::{info, warn};

use crate::config::PacketConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::model::ProjectData;
use crate::pdf::brand::load_logo;
use crate::pdf::cover::render_cover_page;
use crate::pdf::document::{LogoVariant, PacketDocument};
use crate::pdf::form::{fill_form, AcroForm};

/// How the first pages of the packet were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    /// The remote template, filled and flattened
    Template { fields: usize, matched: usize },
    /// The template was unavailable; a cover page was drawn instead
    GeneratedCover,
}

/// Start a packet from the remote template, falling back to a generated cover
///
/// Fetch or parse failures of the template are logged and never returned; the
/// only error is a failure to draw the fallback cover itself.
pub async fn load_template(
    fetcher: &dyn Fetcher,
    config: &PacketConfig,
    project: &ProjectData,
) -> Result<(PacketDocument, TemplateSource)> {
    match open_template(fetcher, config).await {
        Some(mut packet) => {
            let source = fill_template(&mut packet, project);
            Ok((packet, source))
        }
        None => {
            let mut packet = PacketDocument::new();
            let logo = load_logo(&mut packet, fetcher, config, LogoVariant::Light).await;
            render_cover_page(&mut packet, project, logo, &config.brand)?;
            info!("Using generated cover page");
            Ok((packet, TemplateSource::GeneratedCover))
        }
    }
}

async fn open_template(fetcher: &dyn Fetcher, config: &PacketConfig) -> Option<PacketDocument> {
    let bytes = match fetcher.fetch(&config.template_url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Template unavailable: {}", e);
            return None;
        }
    };

    let packet = Document::load_mem(&bytes)
        .map_err(Error::from)
        .and_then(PacketDocument::from_document);
    match packet {
        Ok(packet) if packet.page_count() > 0 => Some(packet),
        Ok(_) => {
            warn!("Template has no pages");
            None
        }
        Err(e) => {
            warn!("Template could not be opened: {}", e);
            None
        }
    }
}

/// Fill the template's form; failures leave the template as it is
fn fill_template(packet: &mut PacketDocument, project: &ProjectData) -> TemplateSource {
    let Some(form) = AcroForm::open(packet.document()) else {
        warn!("Template has no form fields");
        return TemplateSource::Template { fields: 0, matched: 0 };
    };
    info!("Template form has {} fields", form.len());

    match fill_form(packet, &form, project) {
        Ok(report) => TemplateSource::Template {
            fields: report.fields_found,
            matched: report.matched.len(),
        },
        Err(e) => {
            warn!("Form filling failed, keeping template as is: {}", e);
            TemplateSource::Template {
                fields: form.len(),
                matched: 0,
            }
        }
    }
}

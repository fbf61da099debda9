//! Packet configuration: remote locations and branding

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

const DEFAULT_TEMPLATE_URL: &str =
    "https://storage.googleapis.com/submittal-assets/templates/submittal-cover-form.pdf";
const DEFAULT_DOCUMENT_BASE_URL: &str = "https://storage.googleapis.com/submittal-assets/documents";
const DEFAULT_LOGO_LIGHT_URL: &str =
    "https://storage.googleapis.com/submittal-assets/branding/logo-light.png";
const DEFAULT_LOGO_DARK_URL: &str =
    "https://storage.googleapis.com/submittal-assets/branding/logo-dark.png";

/// Where the builder fetches from, and what it prints on generated pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketConfig {
    /// Interactive cover form
    pub template_url: String,
    /// Root that relative document paths are resolved against
    pub document_base_url: String,
    /// Logo for light backgrounds (cover page)
    pub logo_light_url: Option<String>,
    /// Logo for dark backgrounds (divider header band)
    pub logo_dark_url: Option<String>,
    pub brand: BrandConfig,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            template_url: DEFAULT_TEMPLATE_URL.to_string(),
            document_base_url: DEFAULT_DOCUMENT_BASE_URL.to_string(),
            logo_light_url: Some(DEFAULT_LOGO_LIGHT_URL.to_string()),
            logo_dark_url: Some(DEFAULT_LOGO_DARK_URL.to_string()),
            brand: BrandConfig::default(),
        }
    }
}

impl PacketConfig {
    /// Load from a TOML file, or use the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Company details printed on the cover, divider and error pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    /// Text used when a logo image cannot be fetched
    pub company_name: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    /// Printed on error pages
    pub support_contact: String,
    pub copyright_holder: String,
    /// Version stamp in the cover footer
    pub version: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            company_name: "Submittal Services".to_string(),
            address: "100 Commerce Way, Suite 200".to_string(),
            phone: "(800) 555-0142".to_string(),
            website: "www.submittal-services.com".to_string(),
            support_contact: "support@submittal-services.com".to_string(),
            copyright_holder: "Submittal Services".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl BrandConfig {
    pub fn copyright_line(&self) -> String {
        let year = chrono::Local::now().format("%Y");
        format!("© {} {}. All rights reserved.", year, self.copyright_holder)
    }
}

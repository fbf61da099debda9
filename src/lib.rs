//! Submittal Packet Builder Library
//!
//! Assembles a construction submittal packet into a single PDF:
//! - Fill and flatten the remote cover form, or draw a cover page when it is unavailable
//! - Fetch the requested source documents and copy them in page by page
//! - Insert a divider page before each document and error pages for anything missing
//! - Stamp page numbers across the whole packet
//!
//! # Example
//!
//! ```no_run
//! use packet_builder::{generate_packet, HttpFetcher, PacketConfig, PacketRequest};
//!
//! # async fn run() -> packet_builder::Result<()> {
//! let request = PacketRequest::from_json(&std::fs::read_to_string("request.json")?)?;
//! let packet = generate_packet(&request, &HttpFetcher::new(), &PacketConfig::default()).await?;
//! std::fs::write(&packet.filename, &packet.bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod date;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod model;
pub mod packet;
pub mod pdf;
pub mod template;

#[cfg(test)]
mod test_support;

// Re-export commonly used items
pub use catalog::DocumentCatalog;
pub use config::{BrandConfig, PacketConfig};
pub use error::{Error, Result};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use model::{DocumentRequest, DocumentType, ProjectData};
pub use packet::{generate_packet, packet_filename, Packet, PacketFailure, PacketRequest};
pub use template::{load_template, TemplateSource};

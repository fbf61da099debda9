//! PDF manipulation module

pub mod brand;
pub mod content;
pub mod cover;
pub mod divider;
pub mod document;
pub mod draw;
pub mod form;
pub mod merge;
pub mod metadata;
pub mod numbering;

// Re-export commonly used items
pub use cover::render_cover_page;
pub use divider::{render_divider_page, render_error_page, FailureKind};
pub use document::{ImageMark, LogoVariant, PacketDocument};
pub use form::{fill_form, field_mappings, AcroForm, FieldMapping, FillReport};
pub use merge::{merge_document, DocumentStatus, MergeOutcome};
pub use metadata::{count_pages, extract_metadata, read_metadata, PdfMetadata};
pub use numbering::number_pages;

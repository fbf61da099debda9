//! Request data: project metadata, document references and document categories

use serde::{Deserialize, Serialize};

use crate::layout::Rgb;

/// Project metadata supplied with a packet request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectData {
    pub project_name: String,
    pub submitted_to: String,
    pub prepared_by: String,
    pub date: String,
    pub project_number: Option<String>,
    pub email: String,
    pub phone: String,
    pub product: String,
    pub status: SubmittalStatus,
    pub submittal_type: SubmittalType,
}

impl ProjectData {
    /// Phone and email as shown on the cover: `"<phone> / <email>"`, skipping blanks
    pub fn contact_line(&self) -> String {
        [self.phone.trim(), self.email.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    pub fn project_number_or_blank(&self) -> &str {
        self.project_number.as_deref().unwrap_or("")
    }
}

/// The four independent status flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmittalStatus {
    pub for_review: bool,
    pub for_approval: bool,
    pub for_record: bool,
    pub information_only: bool,
}

/// Which document categories this submittal contains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmittalType {
    pub product_data: bool,
    pub shop_drawings: bool,
    pub samples: bool,
    pub specifications: bool,
    pub installation_instructions: bool,
    pub warranty: bool,
    pub test_reports: bool,
    pub certifications: bool,
    pub maintenance_data: bool,
    pub safety_data_sheets: bool,
    pub sustainability: bool,
    pub color_charts: bool,
    pub calculations: bool,
    pub other: bool,
    /// Free text printed after the "Other" row
    pub other_text: String,
}

impl SubmittalType {
    /// Whether the checklist row for `doc_type` is marked
    pub fn is_checked(&self, doc_type: DocumentType) -> bool {
        match doc_type {
            DocumentType::ProductData => self.product_data,
            DocumentType::ShopDrawings => self.shop_drawings,
            DocumentType::Samples => self.samples,
            DocumentType::Specifications => self.specifications,
            DocumentType::InstallationInstructions => self.installation_instructions,
            DocumentType::Warranty => self.warranty,
            DocumentType::TestReports => self.test_reports,
            DocumentType::Certifications => self.certifications,
            DocumentType::MaintenanceData => self.maintenance_data,
            DocumentType::SafetyDataSheets => self.safety_data_sheets,
            DocumentType::Sustainability => self.sustainability,
            DocumentType::ColorCharts => self.color_charts,
            DocumentType::Calculations => self.calculations,
            DocumentType::Other => self.other,
        }
    }
}

/// Reference to one source document, in merge order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub doc_type: DocumentType,
    /// Absolute URL, or a path relative to the document base URL
    pub url: String,
}

/// Closed set of document categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ProductData,
    ShopDrawings,
    Samples,
    Specifications,
    InstallationInstructions,
    Warranty,
    TestReports,
    Certifications,
    MaintenanceData,
    SafetyDataSheets,
    Sustainability,
    ColorCharts,
    Calculations,
    #[default]
    #[serde(other)]
    Other,
}

/// Display attributes for a document category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentTypeConfig {
    pub label: &'static str,
    pub color: Rgb,
    /// Icon glyph name understood by the catalog UI
    pub icon: &'static str,
    /// Lower sorts first in catalog listings
    pub priority: u8,
}

impl DocumentType {
    /// Every category, in checklist order
    pub const ALL: [DocumentType; 14] = [
        DocumentType::ProductData,
        DocumentType::ShopDrawings,
        DocumentType::Samples,
        DocumentType::Specifications,
        DocumentType::InstallationInstructions,
        DocumentType::Warranty,
        DocumentType::TestReports,
        DocumentType::Certifications,
        DocumentType::MaintenanceData,
        DocumentType::SafetyDataSheets,
        DocumentType::Sustainability,
        DocumentType::ColorCharts,
        DocumentType::Calculations,
        DocumentType::Other,
    ];

    pub fn label(self) -> &'static str {
        self.config().label
    }

    pub fn config(self) -> DocumentTypeConfig {
        let (label, color, icon, priority) = match self {
            DocumentType::ProductData => ("Product Data", (37, 99, 235), "file-text", 1),
            DocumentType::ShopDrawings => ("Shop Drawings", (124, 58, 237), "ruler", 2),
            DocumentType::Samples => ("Samples", (219, 39, 119), "swatch", 3),
            DocumentType::Specifications => ("Specifications", (14, 116, 144), "list", 4),
            DocumentType::InstallationInstructions => {
                ("Installation Instructions", (5, 150, 105), "wrench", 5)
            }
            DocumentType::Warranty => ("Warranty", (202, 138, 4), "shield", 6),
            DocumentType::TestReports => ("Test Reports", (220, 38, 38), "beaker", 7),
            DocumentType::Certifications => ("Certifications", (22, 163, 74), "award", 8),
            DocumentType::MaintenanceData => ("O&M Data", (234, 88, 12), "tool", 9),
            DocumentType::SafetyDataSheets => ("Safety Data Sheets", (185, 28, 28), "alert", 10),
            DocumentType::Sustainability => ("Sustainability / LEED", (101, 163, 13), "leaf", 11),
            DocumentType::ColorCharts => ("Color Charts", (192, 38, 211), "palette", 12),
            DocumentType::Calculations => ("Calculations", (71, 85, 105), "calculator", 13),
            DocumentType::Other => ("Other", (107, 114, 128), "file", 99),
        };
        DocumentTypeConfig {
            label,
            color: Rgb::from_u8(color.0, color.1, color.2),
            icon,
            priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_line_joins_non_empty_parts() {
        let mut project = ProjectData {
            phone: "555-0100".to_string(),
            email: "pm@example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(project.contact_line(), "555-0100 / pm@example.com");

        project.phone.clear();
        assert_eq!(project.contact_line(), "pm@example.com");

        project.email = "  ".to_string();
        assert_eq!(project.contact_line(), "");
    }

    #[test]
    fn test_project_data_from_partial_json() {
        let json = r#"{
            "projectName": "Oak St. Bldg #2",
            "status": { "forApproval": true },
            "submittalType": { "productData": true, "other": true, "otherText": "Mockup" }
        }"#;
        let project: ProjectData = serde_json::from_str(json).unwrap();
        assert_eq!(project.project_name, "Oak St. Bldg #2");
        assert!(project.status.for_approval);
        assert!(!project.status.for_review);
        assert!(project.submittal_type.is_checked(DocumentType::ProductData));
        assert!(project.submittal_type.is_checked(DocumentType::Other));
        assert!(!project.submittal_type.is_checked(DocumentType::Warranty));
        assert_eq!(project.submittal_type.other_text, "Mockup");
        assert_eq!(project.project_number, None);
    }

    #[test]
    fn test_document_request_type_tags() {
        let json = r#"[
            {"id": "1", "name": "Data", "type": "product_data", "url": "a.pdf"},
            {"id": "2", "name": "Misc", "type": "brochure", "url": "b.pdf"},
            {"id": "3", "name": "Untyped", "url": "c.pdf"}
        ]"#;
        let docs: Vec<DocumentRequest> = serde_json::from_str(json).unwrap();
        assert_eq!(docs[0].doc_type, DocumentType::ProductData);
        assert_eq!(docs[1].doc_type, DocumentType::Other);
        assert_eq!(docs[2].doc_type, DocumentType::Other);
    }

    #[test]
    fn test_category_priorities_are_unique() {
        let mut priorities: Vec<u8> = DocumentType::ALL.iter().map(|t| t.config().priority).collect();
        priorities.sort_unstable();
        priorities.dedup();
        assert_eq!(priorities.len(), DocumentType::ALL.len());
        assert_eq!(DocumentType::Other.config().priority, 99);
    }
}

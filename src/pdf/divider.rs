//! Section divider and error notice pages

use lopdf::ObjectId;

use crate::config::BrandConfig;
use crate::error::Result;
use crate::layout::{palette, PageSize, Rect, MARGIN};
use crate::pdf::brand::draw_brand_mark;
use crate::pdf::document::{ImageMark, PacketDocument};
use crate::pdf::draw::{Align, Canvas, Font};

const HEADER_HEIGHT: f32 = 110.0;
const ACCENT_HEIGHT: f32 = 8.0;
const FOOTER_HEIGHT: f32 = 36.0;

/// Why a document, or one of its pages, is missing from the packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Fetch failed or returned a non-2xx status
    DocumentLoad,
    /// Bytes arrived but the document could not be processed
    DocumentProcessing,
    /// One page (zero-based index) could not be copied
    Page(usize),
}

impl FailureKind {
    /// One-line message printed on the error page
    pub fn message(&self) -> String {
        match self {
            FailureKind::DocumentLoad => "Document could not be loaded".to_string(),
            FailureKind::DocumentProcessing => "Document processing failed".to_string(),
            FailureKind::Page(index) => format!("Page {} could not be processed", index + 1),
        }
    }
}

/// Full-page divider announcing the next document
///
/// `page_number` is the packet page the divider lands on; the final numbering pass
/// stamps the authoritative number.
pub fn render_divider_page(
    packet: &mut PacketDocument,
    document_name: &str,
    page_number: usize,
    logo: Option<ImageMark>,
    brand: &BrandConfig,
) -> Result<ObjectId> {
    let size = PageSize::letter();
    let (w, h) = (size.width, size.height);
    let mut canvas = Canvas::new();
    let copyright = brand.copyright_line();

    // header band with brand mark
    canvas.fill_rect(Rect::new(0.0, h - HEADER_HEIGHT, w, HEADER_HEIGHT), palette::NAVY);
    draw_brand_mark(
        &mut canvas,
        logo,
        Rect::new(MARGIN, h - HEADER_HEIGHT + 25.0, 220.0, 60.0),
        &brand.company_name,
        palette::WHITE,
    );
    canvas.fill_rect(
        Rect::new(0.0, h - HEADER_HEIGHT - ACCENT_HEIGHT, w, ACCENT_HEIGHT),
        palette::ACCENT,
    );

    // content area
    let center = w / 2.0;
    canvas.text(center, h * 0.62, Font::Regular, 14.0, palette::GRAY, Align::Center, "Section Divider");
    canvas.line(
        (center - 60.0, h * 0.62 - 12.0),
        (center + 60.0, h * 0.62 - 12.0),
        palette::ACCENT,
        2.0,
    );
    let lines = canvas.paragraph(
        center,
        h * 0.62 - 50.0,
        w - 2.0 * MARGIN - 40.0,
        Font::Bold,
        30.0,
        palette::NAVY,
        Align::Center,
        document_name,
    );
    let below_name = h * 0.62 - 50.0 - lines as f32 * 36.0 - 10.0;
    canvas.text(
        center,
        below_name,
        Font::Regular,
        12.0,
        palette::GRAY,
        Align::Center,
        &format!("Page {}", page_number),
    );

    // copyright in the white area, then again in the footer band
    canvas.text(center, FOOTER_HEIGHT + 24.0, Font::Regular, 8.0, palette::GRAY, Align::Center, &copyright);
    canvas.fill_rect(Rect::new(0.0, 0.0, w, FOOTER_HEIGHT), palette::NAVY);
    canvas.text(center, 14.0, Font::Regular, 8.0, palette::WHITE, Align::Center, &copyright);

    packet.append_page(size, canvas)
}

/// Full-page notice standing in for a document or page that could not be merged
pub fn render_error_page(
    packet: &mut PacketDocument,
    document_name: &str,
    failure: FailureKind,
    brand: &BrandConfig,
) -> Result<ObjectId> {
    let size = PageSize::letter();
    let (w, h) = (size.width, size.height);
    let mut canvas = Canvas::new();
    let center = w / 2.0;

    canvas.fill_rect(Rect::new(0.0, h - 120.0, w, 120.0), palette::ERROR_RED);
    canvas.text(center, h - 75.0, Font::Bold, 40.0, palette::WHITE, Align::Center, "ERROR");

    let panel = Rect::new(MARGIN, h * 0.38, w - 2.0 * MARGIN, h * 0.3);
    canvas.fill_rect(panel, palette::PANEL);
    canvas.stroke_rect(panel, palette::ERROR_RED, 1.5);

    canvas.text(panel.x + 20.0, panel.top() - 30.0, Font::Bold, 11.0, palette::GRAY, Align::Left, "DOCUMENT");
    let name_lines = canvas.paragraph(
        panel.x + 20.0,
        panel.top() - 52.0,
        panel.width - 40.0,
        Font::Bold,
        18.0,
        palette::NAVY,
        Align::Left,
        document_name,
    );
    let message_y = panel.top() - 52.0 - name_lines as f32 * 21.6 - 20.0;
    canvas.text(panel.x + 20.0, message_y, Font::Regular, 13.0, palette::ERROR_RED, Align::Left, &failure.message());

    canvas.paragraph(
        center,
        panel.y - 40.0,
        w - 2.0 * MARGIN,
        Font::Regular,
        11.0,
        palette::GRAY,
        Align::Center,
        &format!(
            "Please contact {} and include the document name above so it can be re-sent.",
            brand.support_contact
        ),
    );

    packet.append_page(size, canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_text(packet: &PacketDocument, page_id: ObjectId) -> String {
        String::from_utf8(packet.document().get_page_content(page_id).unwrap()).unwrap()
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(FailureKind::DocumentLoad.message(), "Document could not be loaded");
        assert_eq!(FailureKind::DocumentProcessing.message(), "Document processing failed");
        assert_eq!(FailureKind::Page(1).message(), "Page 2 could not be processed");
    }

    #[test]
    fn test_divider_page_content() {
        let mut packet = PacketDocument::new();
        let brand = BrandConfig::default();
        let id = render_divider_page(&mut packet, "Roof Membrane Data", 7, None, &brand).unwrap();

        let text = page_text(&packet, id);
        assert!(text.contains("(Section Divider) Tj"));
        assert!(text.contains("(Roof Membrane Data) Tj"));
        assert!(text.contains("(Page 7) Tj"));
        assert!(text.contains("(SUBMITTAL SERVICES) Tj"));
        assert_eq!(text.matches("All rights reserved").count(), 2);
        assert_eq!(packet.page_count(), 1);
    }

    #[test]
    fn test_error_page_content() {
        let mut packet = PacketDocument::new();
        let brand = BrandConfig::default();
        let id = render_error_page(&mut packet, "Warranty", FailureKind::Page(0), &brand).unwrap();

        let text = page_text(&packet, id);
        assert!(text.contains("(ERROR) Tj"));
        assert!(text.contains("(Warranty) Tj"));
        assert!(text.contains("(Page 1 could not be processed) Tj"));
        assert!(text.contains(&brand.support_contact));
    }
}

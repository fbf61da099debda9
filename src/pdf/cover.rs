//! Procedurally drawn cover page, used when the template form is unavailable
//!
//! The layout mirrors the template: brand mark, section badge, title, six metadata
//! rows, status checkboxes, submittal-type checklist, product line and footer.

use lopdf::ObjectId;

use crate::config::BrandConfig;
use crate::date::display_date;
use crate::error::Result;
use crate::layout::{palette, PageSize, Rect, MARGIN};
use crate::model::{DocumentType, ProjectData};
use crate::pdf::brand::draw_brand_mark;
use crate::pdf::document::{ImageMark, PacketDocument};
use crate::pdf::draw::{fit_font_size, text_width, truncate_to_width, Align, Canvas, Font};

const ROW_HEIGHT: f32 = 24.0;
const ROW_GAP: f32 = 6.0;
const LABEL_WIDTH: f32 = 120.0;
const CHECK_SIZE: f32 = 10.0;
const VALUE_SIZE: f32 = 11.0;
const MIN_VALUE_SIZE: f32 = 7.0;
const VALUE_PADDING: f32 = 8.0;

/// Draw the cover page as the next page of `packet`
pub fn render_cover_page(
    packet: &mut PacketDocument,
    project: &ProjectData,
    logo: Option<ImageMark>,
    brand: &BrandConfig,
) -> Result<ObjectId> {
    let size = PageSize::letter();
    let (w, h) = (size.width, size.height);
    let content_width = w - 2.0 * MARGIN;
    let mut canvas = Canvas::new();

    // header: brand mark left, section badge right
    draw_brand_mark(
        &mut canvas,
        logo,
        Rect::new(MARGIN, h - MARGIN - 50.0, 200.0, 50.0),
        &brand.company_name,
        palette::NAVY,
    );
    let badge_text = "SUBMITTAL";
    let badge_width = text_width(badge_text, Font::Bold, 11.0) + 24.0;
    let badge = Rect::new(w - MARGIN - badge_width, h - MARGIN - 36.0, badge_width, 22.0);
    canvas.fill_rect(badge, palette::ACCENT);
    canvas.text(badge.center_x(), badge.y + 7.0, Font::Bold, 11.0, palette::WHITE, Align::Center, badge_text);
    canvas.line((MARGIN, h - 102.0), (w - MARGIN, h - 102.0), palette::NAVY, 2.0);

    // two-line title
    canvas.text(MARGIN, h - 136.0, Font::Bold, 26.0, palette::NAVY, Align::Left, "PRODUCT SUBMITTAL");
    canvas.text(MARGIN, h - 158.0, Font::Regular, 14.0, palette::GRAY, Align::Left, "Documentation Package");

    // metadata rows
    let date = display_date(&project.date);
    let contact = project.contact_line();
    let rows: [(&str, &str); 6] = [
        ("SUBMITTED TO", project.submitted_to.as_str()),
        ("PROJECT NAME", project.project_name.as_str()),
        ("PROJECT NUMBER", project.project_number_or_blank()),
        ("PREPARED BY", project.prepared_by.as_str()),
        ("PHONE / EMAIL", contact.as_str()),
        ("DATE", date.as_str()),
    ];
    let mut y = h - 200.0;
    for (label, value) in rows {
        let row = Rect::new(MARGIN, y, content_width, ROW_HEIGHT);
        canvas.text(row.x, row.y + 8.0, Font::Bold, 9.0, palette::GRAY, Align::Left, label);
        let value_box = Rect::new(row.x + LABEL_WIDTH, row.y, row.width - LABEL_WIDTH, row.height);
        canvas.stroke_rect(value_box, palette::LIGHT_GRAY, 1.0);
        let (value_size, value) = fit_value(value, value_box.width - 2.0 * VALUE_PADDING);
        canvas.text(
            value_box.x + VALUE_PADDING,
            value_box.y + 8.0,
            Font::Regular,
            value_size,
            palette::BLACK,
            Align::Left,
            &value,
        );
        y -= ROW_HEIGHT + ROW_GAP;
    }

    // status: 2x2 grid
    y -= 14.0;
    section_heading(&mut canvas, y, content_width, "SUBMITTAL STATUS");
    let status = [
        ("For Review", project.status.for_review),
        ("For Approval", project.status.for_approval),
        ("For Record", project.status.for_record),
        ("Information Only", project.status.information_only),
    ];
    let column_width = content_width / 2.0;
    for (i, (label, checked)) in status.iter().enumerate() {
        let x = MARGIN + (i % 2) as f32 * column_width;
        let row_y = y - 24.0 - (i / 2) as f32 * 18.0;
        checklist_item(&mut canvas, x, row_y, label, *checked);
    }
    y -= 24.0 + 18.0 + 24.0;

    // submittal type: 14 rows in two columns of seven
    section_heading(&mut canvas, y, content_width, "SUBMITTAL TYPE");
    for (i, doc_type) in DocumentType::ALL.iter().enumerate() {
        let x = MARGIN + (i / 7) as f32 * column_width;
        let row_y = y - 24.0 - (i % 7) as f32 * 17.0;
        let label = match doc_type {
            DocumentType::Other if !project.submittal_type.other_text.trim().is_empty() => {
                format!("Other: {}", project.submittal_type.other_text.trim())
            }
            _ => doc_type.label().to_string(),
        };
        checklist_item(&mut canvas, x, row_y, &label, project.submittal_type.is_checked(*doc_type));
    }
    y -= 24.0 + 6.0 * 17.0 + 30.0;

    // product line
    canvas.text(MARGIN, y, Font::Bold, 11.0, palette::NAVY, Align::Left, "PRODUCT:");
    let (product_size, product) = fit_value(&project.product, content_width - 64.0);
    canvas.text(MARGIN + 64.0, y, Font::Regular, product_size, palette::BLACK, Align::Left, &product);

    // footer: company block left, version stamp right
    canvas.line((MARGIN, 82.0), (w - MARGIN, 82.0), palette::LIGHT_GRAY, 1.0);
    canvas.text(MARGIN, 66.0, Font::Bold, 10.0, palette::NAVY, Align::Left, &brand.company_name);
    canvas.text(MARGIN, 54.0, Font::Regular, 8.0, palette::GRAY, Align::Left, &brand.address);
    canvas.text(
        MARGIN,
        43.0,
        Font::Regular,
        8.0,
        palette::GRAY,
        Align::Left,
        &format!("{}  |  {}", brand.phone, brand.website),
    );
    canvas.text(
        w - MARGIN,
        43.0,
        Font::Regular,
        8.0,
        palette::GRAY,
        Align::Right,
        &format!("Packet v{}", brand.version),
    );

    packet.append_page(size, canvas)
}

fn section_heading(canvas: &mut Canvas, y: f32, width: f32, title: &str) {
    canvas.fill_rect(Rect::new(MARGIN, y - 4.0, width, 16.0), palette::PANEL);
    canvas.text(MARGIN + 6.0, y, Font::Bold, 10.0, palette::NAVY, Align::Left, title);
}

fn checklist_item(canvas: &mut Canvas, x: f32, y: f32, label: &str, checked: bool) {
    canvas.checkbox(x + 6.0, y - 1.0, CHECK_SIZE, checked, palette::NAVY);
    canvas.text(x + 6.0 + CHECK_SIZE + 6.0, y, Font::Regular, 10.0, palette::BLACK, Align::Left, label);
}

/// Value text shrunk toward the minimum size, then cut short, to fit `width`
fn fit_value(value: &str, width: f32) -> (f32, String) {
    let size = fit_font_size(value, Font::Regular, VALUE_SIZE, MIN_VALUE_SIZE, width);
    (size, truncate_to_width(value, Font::Regular, size, width))
}

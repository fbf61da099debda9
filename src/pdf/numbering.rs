//! Final page numbering pass

use tracing::debug;

use crate::error::Result;
use crate::layout::palette;
use crate::pdf::content::{add_page_resource, append_stamp, isolate_page_content};
use crate::pdf::document::{page_rotation, page_visible_box, PacketDocument};
use crate::pdf::draw::{num, pdf_string, text_width, Font};

/// Resource name of the numbering font; unlikely to clash with source documents
const NUMBER_FONT: &str = "PktNum";
const NUMBER_SIZE: f32 = 9.0;
/// Distance of the number's right edge and baseline from the visible corner
const INSET_X: f32 = 36.0;
const INSET_Y: f32 = 20.0;

/// Stamp `1..=N` at the visual bottom right of every page, in physical order
///
/// The corner is taken from the visible area (MediaBox clipped to CropBox) as the
/// page is displayed, so `/Rotate` pages get an upright number in the same corner.
/// Returns the number of pages stamped.
pub fn number_pages(packet: &mut PacketDocument) -> Result<usize> {
    let font_id = packet.font_id(Font::Regular);
    let page_ids = packet.page_ids();
    let doc = packet.document_mut();

    for (index, page_id) in page_ids.iter().enumerate() {
        let label = (index + 1).to_string();
        let width = text_width(&label, Font::Regular, NUMBER_SIZE);
        let matrix = number_matrix(page_visible_box(doc, *page_id), page_rotation(doc, *page_id), width);
        let color = palette::GRAY;
        let stamp = format!(
            "q\nBT\n{} {} {} rg\n/{} {} Tf\n{} Tm\n{} Tj\nET\nQ\n",
            num(color.0),
            num(color.1),
            num(color.2),
            NUMBER_FONT,
            num(NUMBER_SIZE),
            matrix.map(num).join(" "),
            pdf_string(&label),
        );

        isolate_page_content(doc, *page_id)?;
        add_page_resource(doc, *page_id, "Font", NUMBER_FONT, font_id)?;
        append_stamp(doc, *page_id, stamp.into_bytes())?;
    }

    debug!("Numbered {} pages", page_ids.len());
    Ok(page_ids.len())
}

/// Text matrix placing a label of `width` at the displayed bottom right of `area`
///
/// The text axes are turned with the page so the label reads upright once the
/// viewer applies `rotation` (clockwise degrees).
fn number_matrix(area: [f32; 4], rotation: u16, width: f32) -> [f32; 6] {
    let [x0, y0, x1, y1] = area;
    match rotation {
        90 => [0.0, 1.0, -1.0, 0.0, x1 - INSET_Y, y1 - INSET_X - width],
        180 => [-1.0, 0.0, 0.0, -1.0, x0 + INSET_X + width, y1 - INSET_Y],
        270 => [0.0, -1.0, 1.0, 0.0, x0 + INSET_Y, y0 + INSET_X + width],
        _ => [1.0, 0.0, 0.0, 1.0, x1 - INSET_X - width, y0 + INSET_Y],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageSize;
    use crate::pdf::draw::Canvas;
    use crate::test_support::page_text;
    use lopdf::{Document, Object};

    #[test]
    fn test_numbers_every_page_in_order() {
        let mut packet = PacketDocument::new();
        for _ in 0..3 {
            packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        }

        assert_eq!(number_pages(&mut packet).unwrap(), 3);

        let doc = packet.document();
        for (i, page_id) in packet.page_ids().iter().enumerate() {
            let text = page_text(doc, *page_id);
            assert!(text.contains(&format!("({}) Tj", i + 1)));
            assert!(text.contains("/PktNum 9 Tf"));
            assert!(text.starts_with("q\n"));
        }
    }

    #[test]
    fn test_number_follows_media_box() {
        let mut packet = PacketDocument::new();
        let page_id = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        packet.document_mut().get_dictionary_mut(page_id).unwrap().set(
            "MediaBox",
            Object::Array(vec![0.into(), 0.into(), 842.into(), 595.into()]),
        );

        number_pages(&mut packet).unwrap();

        let text = page_text(packet.document(), page_id);
        // right edge at 842 - 36, less the width of "1" at 9pt
        assert!(text.contains("1 0 0 1 800.996 20 Tm"));
    }

    fn numbered_text(set: &[(&str, Object)]) -> String {
        let mut packet = PacketDocument::new();
        let page_id = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        let page = packet.document_mut().get_dictionary_mut(page_id).unwrap();
        for (key, value) in set {
            page.set(*key, value.clone());
        }
        number_pages(&mut packet).unwrap();
        page_text(packet.document(), page_id)
    }

    fn boxed(values: [i64; 4]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    #[test]
    fn test_number_stays_inside_crop_box() {
        let text = numbered_text(&[("CropBox", boxed([50, 50, 562, 742]))]);
        assert!(text.contains("1 0 0 1 520.996 70 Tm"));
    }

    #[test]
    fn test_number_is_upright_on_rotated_pages() {
        // letter page; "1" at 9pt is 5.004 wide
        let cases = [
            (90, "0 1 -1 0 592 750.996 Tm"),
            (180, "-1 0 0 -1 41.004 772 Tm"),
            (270, "0 -1 1 0 20 41.004 Tm"),
            (-90, "0 -1 1 0 20 41.004 Tm"),
            (450, "0 1 -1 0 592 750.996 Tm"),
        ];
        for (rotate, expected) in cases {
            let text = numbered_text(&[("Rotate", Object::Integer(rotate))]);
            assert!(text.contains(expected), "Rotate {}: {}", rotate, text);
        }
    }

    #[test]
    fn test_rotation_inherited_from_page_tree() {
        let mut packet = PacketDocument::new();
        let page_id = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        let pages_id = packet.pages_id();
        packet
            .document_mut()
            .get_dictionary_mut(pages_id)
            .unwrap()
            .set("Rotate", Object::Integer(90));

        number_pages(&mut packet).unwrap();
        assert!(page_text(packet.document(), page_id).contains("0 1 -1 0 592 750.996 Tm"));
    }

    #[test]
    fn test_numbering_font_is_registered() {
        let mut packet = PacketDocument::new();
        let page_id = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        number_pages(&mut packet).unwrap();

        let bytes = packet.to_bytes().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = match page.get(b"Resources").unwrap() {
            Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
            Object::Dictionary(dict) => dict,
            other => panic!("unexpected Resources {:?}", other),
        };
        let fonts = match resources.get(b"Font").unwrap() {
            Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
            Object::Dictionary(dict) => dict,
            other => panic!("unexpected Font {:?}", other),
        };
        assert!(fonts.has(b"PktNum"));
    }

    #[test]
    fn test_empty_packet() {
        let mut packet = PacketDocument::new();
        assert_eq!(number_pages(&mut packet).unwrap(), 0);
    }
}

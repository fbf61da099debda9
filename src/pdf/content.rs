//! Stamping onto existing pages
//!
//! Existing page content may leave the graphics state transformed, so before we
//! draw on top of a page its original content is wrapped in `q`/`Q`. Stamps go in
//! their own content streams appended after the original ones, and the resources
//! they use are merged into a page-local copy of the page's Resources.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::Result;
use crate::pdf::document::{inherited_attribute, resolve_dict};

/// Wrap everything already drawn on the page in a saved graphics state
pub fn isolate_page_content(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let has_content = doc
        .get_dictionary(page_id)?
        .get(b"Contents")
        .is_ok_and(|contents| !matches!(contents, Object::Array(items) if items.is_empty()));
    if !has_content {
        return Ok(());
    }

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    prepend_content_to_page(doc, page_id, save_id)?;
    append_content_to_page(doc, page_id, restore_id)?;
    Ok(())
}

/// Append `content` as a new content stream drawn after the existing ones
pub fn append_stamp(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> Result<ObjectId> {
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), content));
    append_content_to_page(doc, page_id, stream_id)?;
    Ok(stream_id)
}

/// The page's content streams as a flat list of entries
///
/// `/Contents` may be a stream, an array of streams, or a reference to either. An
/// indirect array is spliced in, since arrays cannot nest inside `/Contents`.
fn content_entries(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let entries = match doc.get_dictionary(page_id)?.get(b"Contents").ok() {
        Some(Object::Array(items)) => items.clone(),
        Some(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    };
    Ok(entries)
}

/// Prepend a content stream to a page's Contents
fn prepend_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut contents = content_entries(doc, page_id)?;
    contents.insert(0, Object::Reference(new_content_id));
    doc.get_dictionary_mut(page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

/// Append a content stream to a page's Contents
///
/// Appended content is drawn on top of the original so page backgrounds can't
/// cover it.
fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut contents = content_entries(doc, page_id)?;
    contents.push(Object::Reference(new_content_id));
    doc.get_dictionary_mut(page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

/// Register `resource_id` as `/<category>/<name>` in the page's own Resources
///
/// Shared or inherited Resources are copied onto the page first so the addition
/// never leaks into other pages.
pub fn add_page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    resource_id: ObjectId,
) -> Result<()> {
    let mut resources = inherited_attribute(doc, page_id, b"Resources")
        .and_then(|res| resolve_dict(doc, res))
        .cloned()
        .unwrap_or_default();

    let mut entries = resources
        .get(category.as_bytes())
        .ok()
        .and_then(|entry| resolve_dict(doc, entry))
        .cloned()
        .unwrap_or_default();

    entries.set(name, Object::Reference(resource_id));
    resources.set(category, Object::Dictionary(entries));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Create a Form XObject from `content` with the given bounding box and resources
pub fn add_form_xobject(doc: &mut Document, content: Vec<u8>, bbox: [f32; 4], resources: Dictionary) -> ObjectId {
    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set("BBox", Object::Array(bbox.iter().map(|v| Object::Real(*v)).collect()));
    xobject_dict.set("Resources", Object::Dictionary(resources));

    doc.add_object(Stream::new(xobject_dict, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageSize;
    use crate::pdf::draw::Canvas;
    use crate::pdf::document::PacketDocument;

    fn contents_of(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
        match doc.get_dictionary(page_id).unwrap().get(b"Contents").unwrap() {
            Object::Array(items) => items.iter().map(|o| o.as_reference().unwrap()).collect(),
            Object::Reference(id) => vec![*id],
            other => panic!("unexpected Contents {:?}", other),
        }
    }

    fn stream_text(doc: &Document, id: ObjectId) -> String {
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        String::from_utf8_lossy(&stream.content).into_owned()
    }

    #[test]
    fn test_isolate_wraps_existing_content() {
        let mut packet = PacketDocument::new();
        let page_id = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        let doc = packet.document_mut();
        let original = contents_of(doc, page_id);

        isolate_page_content(doc, page_id).unwrap();
        append_stamp(doc, page_id, b"BT ET".to_vec()).unwrap();

        let contents = contents_of(doc, page_id);
        assert_eq!(contents.len(), 4);
        assert_eq!(stream_text(doc, contents[0]), "q\n");
        assert_eq!(contents[1], original[0]);
        assert_eq!(stream_text(doc, contents[2]), "\nQ\n");
        assert_eq!(stream_text(doc, contents[3]), "BT ET");
    }

    #[test]
    fn test_indirect_contents_array_is_spliced() {
        let mut packet = PacketDocument::new();
        let page_id = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        let doc = packet.document_mut();
        let first = doc.add_object(Stream::new(Dictionary::new(), b"BT (Hello) Tj".to_vec()));
        let second = doc.add_object(Stream::new(Dictionary::new(), b" (world) Tj ET".to_vec()));
        let array_id = doc.add_object(Object::Array(vec![first.into(), second.into()]));
        doc.get_dictionary_mut(page_id).unwrap().set("Contents", array_id);

        isolate_page_content(doc, page_id).unwrap();
        append_stamp(doc, page_id, b"BT ET".to_vec()).unwrap();

        let contents = contents_of(doc, page_id);
        assert_eq!(contents.len(), 5);
        assert_eq!(&contents[1..3], &[first, second]);
        for id in &contents {
            assert!(doc.get_object(*id).unwrap().as_stream().is_ok());
        }
        let text = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
        assert!(text.contains("(Hello) Tj"));
        assert!(text.contains("(world) Tj"));
    }

    #[test]
    fn test_isolate_skips_empty_page() {
        let mut packet = PacketDocument::new();
        let page_id = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        let doc = packet.document_mut();
        doc.get_dictionary_mut(page_id).unwrap().remove(b"Contents");

        isolate_page_content(doc, page_id).unwrap();
        assert!(doc.get_dictionary(page_id).unwrap().get(b"Contents").is_err());
    }

    #[test]
    fn test_add_page_resource_copies_shared_resources() {
        let mut packet = PacketDocument::new();
        let first = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        let second = packet.append_page(PageSize::letter(), Canvas::new()).unwrap();
        let font_id = packet.font_id(crate::pdf::draw::Font::Regular);
        let doc = packet.document_mut();

        // make both pages share one Resources object
        let shared = doc.get_dictionary(first).unwrap().get(b"Resources").unwrap().clone();
        let shared_id = doc.add_object(shared);
        for page in [first, second] {
            doc.get_dictionary_mut(page).unwrap().set("Resources", Object::Reference(shared_id));
        }

        add_page_resource(doc, first, "Font", "Stamp", font_id).unwrap();

        let first_fonts = doc
            .get_dictionary(first).unwrap()
            .get(b"Resources").unwrap().as_dict().unwrap()
            .get(b"Font").unwrap().as_dict().unwrap();
        assert!(first_fonts.has(b"Stamp"));
        assert!(first_fonts.has(b"F1"));

        let shared_fonts = doc.get_dictionary(shared_id).unwrap().get(b"Font").unwrap().as_dict().unwrap();
        assert!(!shared_fonts.has(b"Stamp"));
    }
}

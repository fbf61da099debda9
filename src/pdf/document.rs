//! The packet under construction
//!
//! [`PacketDocument`] owns the output `lopdf::Document` for one request. Pages are
//! only ever appended to the root of its page tree, so the physical page order is
//! the order in which the pipeline produced them.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::layout::PageSize;
use crate::pdf::draw::{Canvas, Font};

/// Which logo variant a generated page wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoVariant {
    /// For white backgrounds
    Light,
    /// For the dark divider header band
    Dark,
}

/// An embedded image and its pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMark {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

impl ImageMark {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Output document plus the bookkeeping needed to append pages to it
#[derive(Debug)]
pub struct PacketDocument {
    doc: Document,
    pages_id: ObjectId,
    fonts: [(Font, ObjectId); 3],
    logos: HashMap<LogoVariant, Option<ImageMark>>,
}

impl PacketDocument {
    /// Empty document with a catalog and an empty page tree
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(0));
        pages.set("Kids", Object::Array(vec![]));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Self::assemble(doc, pages_id)
    }

    /// Adopt an existing document (the template); new pages go after its pages
    pub fn from_document(doc: Document) -> Result<Self> {
        let pages_id = doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|e| Error::PageTree(format!("catalog has no page tree: {}", e)))?;

        match doc.get_object(pages_id) {
            Ok(Object::Dictionary(dict)) if matches!(dict.get(b"Kids"), Ok(Object::Array(_))) => {}
            _ => return Err(Error::PageTree("page tree root has no Kids array".to_string())),
        }

        Ok(Self::assemble(doc, pages_id))
    }

    fn assemble(mut doc: Document, pages_id: ObjectId) -> Self {
        let fonts = [Font::Regular, Font::Bold, Font::Symbol].map(|font| {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"Font".to_vec()));
            dict.set("Subtype", Object::Name(b"Type1".to_vec()));
            dict.set("BaseFont", Object::Name(font.base_font().as_bytes().to_vec()));
            if font != Font::Symbol {
                dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            }
            (font, doc.add_object(Object::Dictionary(dict)))
        });

        Self {
            doc,
            pages_id,
            fonts,
            logos: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn pages_id(&self) -> ObjectId {
        self.pages_id
    }

    pub fn font_id(&self, font: Font) -> ObjectId {
        self.fonts
            .iter()
            .find(|(f, _)| *f == font)
            .map(|(_, id)| *id)
            .unwrap_or(self.fonts[0].1)
    }

    /// /Font resource dictionary naming every standard font
    pub fn font_resources(&self) -> Dictionary {
        let mut fonts = Dictionary::new();
        for (font, id) in &self.fonts {
            fonts.set(font.resource_name(), Object::Reference(*id));
        }
        fonts
    }

    /// Page ids in physical order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Make sure new object ids start above `max_id`
    pub fn reserve_ids(&mut self, max_id: u32) {
        self.doc.max_id = self.doc.max_id.max(max_id);
    }

    pub fn next_object_id(&self) -> u32 {
        self.doc.max_id + 1
    }

    /// Add a generated page drawn by `canvas` at the end of the packet
    pub fn append_page(&mut self, size: PageSize, canvas: Canvas) -> Result<ObjectId> {
        let (content, images) = canvas.finish();
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(self.font_resources()));
        if !images.is_empty() {
            let mut xobjects = Dictionary::new();
            for (name, id) in images {
                xobjects.set(name, Object::Reference(id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(size.width),
                Object::Real(size.height),
            ]),
        );
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources));

        let page_id = self.doc.add_object(Object::Dictionary(page));
        self.attach_page(page_id)?;
        Ok(page_id)
    }

    /// Insert a fully prepared page dictionary under `page_id` and append it
    pub fn insert_page(&mut self, page_id: ObjectId, page: Dictionary) -> Result<()> {
        self.doc.objects.insert(page_id, Object::Dictionary(page));
        self.reserve_ids(page_id.0);
        self.attach_page(page_id)
    }

    /// Link an existing page object as the last kid of the page tree root
    fn attach_page(&mut self, page_id: ObjectId) -> Result<()> {
        let pages_id = self.pages_id;
        if let Ok(Object::Dictionary(page)) = self.doc.get_object_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }

        let pages = self.doc.get_dictionary_mut(pages_id)?;
        match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
            _ => return Err(Error::PageTree("page tree root has no Kids array".to_string())),
        }
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages.set("Count", Object::Integer(count + 1));
        Ok(())
    }

    /// Logo lookup result cached for this request (`None` = not fetched yet)
    pub fn cached_logo(&self, variant: LogoVariant) -> Option<Option<ImageMark>> {
        self.logos.get(&variant).copied()
    }

    pub fn cache_logo(&mut self, variant: LogoVariant, logo: Option<ImageMark>) {
        self.logos.insert(variant, logo);
    }

    /// Compress and serialize the finished packet
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        self.doc.compress();
        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(bytes)
    }
}

impl Default for PacketDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Follow a reference to the object it names; direct objects are returned as-is
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Dictionary behind a direct dictionary or a reference to one
pub(crate) fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, object)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Numeric value of an Integer or Real
pub(crate) fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Four-number array such as a MediaBox or Rect
pub(crate) fn number_array(doc: &Document, object: &Object) -> Option<[f32; 4]> {
    let Object::Array(items) = resolve(doc, object)? else {
        return None;
    };
    if items.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = number(resolve(doc, item)?)?;
    }
    Some(out)
}

/// Look up a page attribute, walking up the page tree for inherited values
pub(crate) fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    // Guard against cyclic Parent links in damaged files
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Page MediaBox, defaulting to US Letter
pub(crate) fn page_media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| number_array(doc, obj))
        .unwrap_or([0.0, 0.0, 612.0, 792.0])
}

/// The area a viewer shows: MediaBox clipped to the CropBox, corners normalized
pub(crate) fn page_visible_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let normalize = |[x0, y0, x1, y1]: [f32; 4]| [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)];
    let media = normalize(page_media_box(doc, page_id));
    let Some(crop) = inherited_attribute(doc, page_id, b"CropBox")
        .and_then(|obj| number_array(doc, obj))
        .map(normalize)
    else {
        return media;
    };

    let clipped = [
        media[0].max(crop[0]),
        media[1].max(crop[1]),
        media[2].min(crop[2]),
        media[3].min(crop[3]),
    ];
    if clipped[0] < clipped[2] && clipped[1] < clipped[3] {
        clipped
    } else {
        media
    }
}

/// Page /Rotate as one of 0, 90, 180 or 270
pub(crate) fn page_rotation(doc: &Document, page_id: ObjectId) -> u16 {
    let degrees = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);
    match degrees.rem_euclid(360) {
        90 => 90,
        180 => 180,
        270 => 270,
        _ => 0,
    }
}

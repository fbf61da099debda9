//! Shared fixtures for unit tests: in-memory PDFs and a map-backed fetcher

use std::collections::HashMap;

use async_trait::async_trait;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::fetch::{FetchError, FetchResult, Fetcher};

/// Serves fixed bodies by URL; anything else is a 404
#[derive(Debug, Default)]
pub struct MapFetcher {
    responses: HashMap<String, Vec<u8>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), body);
        self
    }
}

#[async_trait]
impl Fetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.responses.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn add_catalog(doc: &mut Document, pages_id: ObjectId, extra: Dictionary) {
    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    for (key, value) in extra.iter() {
        catalog.set(key.clone(), value.clone());
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
}

fn text_field(doc: &mut Document, page_id: ObjectId, name: &str, rect: [i64; 4]) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal(name),
        "Rect" => rect.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
        "DA" => Object::string_literal("/Helv 10 Tf 0 g"),
        "P" => page_id,
    })
}

/// `pages` pages that each show "Source page N"
///
/// Resources and MediaBox live on the page tree root, so copies must resolve them
/// through inheritance. Page indexes in `dangling` get a Contents reference to an
/// object that does not exist.
pub fn source_pdf(pages: usize, dangling: &[usize]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::new();
    for i in 0..pages {
        let contents = if dangling.contains(&i) {
            Object::Reference((9000, 0))
        } else {
            let text = format!("BT /F1 24 Tf 72 700 Td (Source page {}) Tj ET", i + 1);
            Object::Reference(doc.add_object(Stream::new(Dictionary::new(), text.into_bytes())))
        };
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => contents,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }),
    );
    add_catalog(&mut doc, pages_id, Dictionary::new());
    save(doc)
}

/// A one-page interactive form shaped like the packet template
///
/// Fields: "Project Name" and "Date" (text, the latter nested as `Info.Date`),
/// "ForApproval" and "Warranty" (checkboxes with an `On` state) and a pushbutton
/// named "Print".
pub fn form_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();
    let helv_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut fields = Vec::new();
    let mut annots = Vec::new();

    let project_name = text_field(&mut doc, page_id, "Project Name", [150, 650, 450, 670]);
    fields.push(Object::Reference(project_name));
    annots.push(Object::Reference(project_name));

    // Info.Date: non-terminal parent with one widget kid
    let info_id = doc.new_object_id();
    let date_id = text_field(&mut doc, page_id, "Date", [150, 620, 300, 640]);
    doc.get_dictionary_mut(date_id).unwrap().set("Parent", info_id);
    doc.objects.insert(
        info_id,
        Object::Dictionary(dictionary! {
            "T" => Object::string_literal("Info"),
            "Kids" => vec![Object::Reference(date_id)],
        }),
    );
    fields.push(Object::Reference(info_id));
    annots.push(Object::Reference(date_id));

    for (name, y) in [("ForApproval", 580), ("Warranty", 550)] {
        let on = doc.add_object(Stream::new(Dictionary::new(), b"0 g 2 2 8 8 re f".to_vec()));
        let off = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Btn",
            "T" => Object::string_literal(name),
            "Rect" => vec![150.into(), y.into(), 162.into(), (y + 12).into()],
            "V" => "Off",
            "AS" => "Off",
            "AP" => dictionary! { "N" => dictionary! { "On" => on, "Off" => off } },
            "P" => page_id,
        });
        fields.push(Object::Reference(id));
        annots.push(Object::Reference(id));
    }

    let print_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "Ff" => 1i64 << 16,
        "T" => Object::string_literal("Print"),
        "Rect" => vec![400.into(), 40.into(), 500.into(), 60.into()],
        "P" => page_id,
    });
    fields.push(Object::Reference(print_id));
    annots.push(Object::Reference(print_id));

    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        b"BT /Helv 18 Tf 72 720 Td (SUBMITTAL TEMPLATE) Tj ET".to_vec(),
    ));
    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "Helv" => helv_id } },
            "Annots" => annots,
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let acroform = dictionary! {
        "Fields" => fields,
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "DR" => dictionary! { "Font" => dictionary! { "Helv" => helv_id } },
    };
    add_catalog(&mut doc, pages_id, dictionary! { "AcroForm" => acroform });
    save(doc)
}

/// Decoded text of every content stream on the page
pub fn page_text(doc: &Document, page_id: ObjectId) -> String {
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

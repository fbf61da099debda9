//! Appending fetched source documents to the packet, one page at a time
//!
//! Each source document is opened on its own and renumbered above the packet's
//! object ids. Pages are then copied individually: the page dictionary and every
//! object reachable from it are staged, and only committed to the packet once the
//! whole closure resolved. A page that cannot be copied is replaced by an error
//! page and the remaining pages still go in.

use std::collections::{BTreeMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{BrandConfig, PacketConfig};
use crate::error::{Error, Result};
use crate::fetch::{resolve_document_url, Fetcher};
use crate::model::DocumentRequest;
use crate::pdf::brand::load_logo;
use crate::pdf::divider::{render_divider_page, render_error_page, FailureKind};
use crate::pdf::document::{inherited_attribute, LogoVariant, PacketDocument};

/// Page attributes that may be inherited from the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Keys pointing back up a tree; following them would drag in whole structures
const BACK_LINKS: [&[u8]; 2] = [b"Parent", b"P"];

/// How one document request ended up in the packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Every page copied
    Merged { pages: usize },
    /// Some pages copied; `failed` holds zero-based indexes replaced by error pages
    Partial { copied: usize, failed: Vec<usize> },
    /// Fetch failed; one error page stands in for the document
    FetchFailed,
    /// Bytes arrived but could not be processed; one error page stands in
    ProcessingFailed,
}

impl DocumentStatus {
    pub fn is_merged(&self) -> bool {
        matches!(self, DocumentStatus::Merged { .. })
    }
}

/// Result of merging one document request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub document_id: String,
    pub name: String,
    /// Pages added to the packet, divider and error pages included
    pub pages_appended: usize,
    pub status: DocumentStatus,
}

/// Why a single page could not be copied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    #[error("page index {0} is not in the source page tree")]
    MissingPage(usize),

    #[error("object {0:?} is referenced but missing")]
    MissingObject(ObjectId),

    #[error("page object {0:?} is not a dictionary")]
    NotADictionary(ObjectId),
}

/// A page and the objects it needs, ready to be committed
#[derive(Debug)]
struct StagedPage {
    page_id: ObjectId,
    page: Dictionary,
    objects: BTreeMap<ObjectId, Object>,
}

/// An opened source document whose object ids live above the packet's
#[derive(Debug)]
struct SourceDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
    copied: HashSet<ObjectId>,
}

impl SourceDocument {
    fn open(bytes: &[u8], packet: &mut PacketDocument) -> Result<Self> {
        let mut doc = Document::load_mem(bytes)?;
        doc.renumber_objects_with(packet.next_object_id());
        packet.reserve_ids(doc.max_id);

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(Error::EmptyPdf);
        }

        Ok(Self {
            doc,
            page_ids,
            copied: HashSet::new(),
        })
    }

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Collect page `index` and its object closure without touching the packet
    fn stage_page(&self, index: usize) -> std::result::Result<StagedPage, CopyError> {
        let page_id = *self.page_ids.get(index).ok_or(CopyError::MissingPage(index))?;
        let mut page = match self.doc.get_object(page_id) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(_) => return Err(CopyError::NotADictionary(page_id)),
            Err(_) => return Err(CopyError::MissingObject(page_id)),
        };

        for key in INHERITABLE {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(&self.doc, page_id, key) {
                    page.set(key, value.clone());
                }
            }
        }
        if !page.has(b"MediaBox") {
            page.set(
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            );
        }
        page.remove(b"Parent");

        let mut objects = BTreeMap::new();
        let mut pending = Vec::new();
        collect_references(&Object::Dictionary(page.clone()), &mut pending);

        while let Some(id) = pending.pop() {
            if id == page_id || self.copied.contains(&id) || objects.contains_key(&id) {
                continue;
            }
            let mut object = self
                .doc
                .get_object(id)
                .map_err(|_| CopyError::MissingObject(id))?
                .clone();
            strip_back_links(&mut object);
            collect_references(&object, &mut pending);
            objects.insert(id, object);
        }

        Ok(StagedPage { page_id, page, objects })
    }

    /// Move a staged page and its objects into the packet
    fn commit(&mut self, packet: &mut PacketDocument, staged: StagedPage) -> Result<ObjectId> {
        let StagedPage { page_id, page, objects } = staged;
        let doc = packet.document_mut();
        for (id, object) in objects {
            doc.objects.insert(id, object);
            self.copied.insert(id);
        }
        packet.insert_page(page_id, page)?;
        self.copied.insert(page_id);
        Ok(page_id)
    }
}

/// Queue every reference inside `object`, skipping back links
fn collect_references(object: &Object, pending: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => pending.push(*id),
        Object::Array(items) => items.iter().for_each(|item| collect_references(item, pending)),
        Object::Dictionary(dict) => collect_dictionary_references(dict, pending),
        Object::Stream(stream) => collect_dictionary_references(&stream.dict, pending),
        _ => {}
    }
}

fn collect_dictionary_references(dict: &Dictionary, pending: &mut Vec<ObjectId>) {
    for (key, value) in dict.iter() {
        if !BACK_LINKS.contains(&key.as_slice()) {
            collect_references(value, pending);
        }
    }
}

fn strip_back_links(object: &mut Object) {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &mut stream.dict,
        _ => return,
    };
    for key in BACK_LINKS {
        dict.remove(key);
    }
}

#[derive(Debug, Default)]
struct Tally {
    copied: usize,
    failed: Vec<usize>,
}

/// Copy every page of `bytes` into the packet, substituting error pages for
/// pages that fail
fn copy_pages(
    packet: &mut PacketDocument,
    bytes: &[u8],
    request: &DocumentRequest,
    brand: &BrandConfig,
) -> Result<DocumentStatus> {
    let mut source = SourceDocument::open(bytes, packet)?;
    debug!("{}: {} source pages", request.name, source.page_count());

    let tally = (0..source.page_count()).try_fold(Tally::default(), |mut tally, index| -> Result<Tally> {
        match source.stage_page(index) {
            Ok(staged) => {
                source.commit(packet, staged)?;
                tally.copied += 1;
            }
            Err(e) => {
                warn!("{}: page {} could not be copied: {}", request.name, index + 1, e);
                render_error_page(packet, &request.name, FailureKind::Page(index), brand)?;
                tally.failed.push(index);
            }
        }
        Ok(tally)
    })?;

    Ok(if tally.failed.is_empty() {
        DocumentStatus::Merged { pages: tally.copied }
    } else {
        DocumentStatus::Partial {
            copied: tally.copied,
            failed: tally.failed,
        }
    })
}

/// Append one document request to the packet: divider first, then its pages or
/// an error page
///
/// `starting_page` is the packet page number the divider will carry. Fetch and
/// document failures never escape; only a broken packet page tree does.
pub async fn merge_document(
    packet: &mut PacketDocument,
    fetcher: &dyn Fetcher,
    config: &PacketConfig,
    request: &DocumentRequest,
    starting_page: usize,
) -> Result<MergeOutcome> {
    let before = packet.page_count();
    let brand = &config.brand;

    let logo = load_logo(packet, fetcher, config, LogoVariant::Dark).await;
    render_divider_page(packet, &request.name, starting_page, logo, brand)?;

    let url = resolve_document_url(&config.document_base_url, &request.url);
    let status = match fetcher.fetch(&url).await {
        Err(e) => {
            warn!("{}: {}", request.name, e);
            render_error_page(packet, &request.name, FailureKind::DocumentLoad, brand)?;
            DocumentStatus::FetchFailed
        }
        Ok(bytes) => match copy_pages(packet, &bytes, request, brand) {
            Ok(status) => status,
            Err(e) => {
                warn!("{}: document processing failed: {}", request.name, e);
                render_error_page(packet, &request.name, FailureKind::DocumentProcessing, brand)?;
                DocumentStatus::ProcessingFailed
            }
        },
    };

    let pages_appended = packet.page_count() - before;
    info!("{}: {:?}, {} pages appended", request.name, status, pages_appended);

    Ok(MergeOutcome {
        document_id: request.id.clone(),
        name: request.name.clone(),
        pages_appended,
        status,
    })
}

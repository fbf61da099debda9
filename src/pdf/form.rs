//! Filling and flattening the template's interactive form
//!
//! Templates come from different authors, so field names vary. Each piece of
//! project metadata carries an ordered list of candidate names; the first candidate
//! that names a field of the right kind receives the value. After filling, every
//! widget's appearance is drawn into its page as a Form XObject and the form itself
//! is removed, leaving plain page content.

use std::collections::{BTreeMap, HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use tracing::{debug, info};

use crate::date::display_date;
use crate::error::{Error, Result};
use crate::layout::{palette, Rect};
use crate::model::{DocumentType, ProjectData};
use crate::pdf::content::{add_form_xobject, add_page_resource, append_stamp, isolate_page_content};
use crate::pdf::document::{inherited_attribute, number_array, resolve, resolve_dict, PacketDocument};
use crate::pdf::draw::{fit_font_size, num, Align, Canvas, Font};

const FLAG_MULTILINE: i64 = 1 << 12;
const FLAG_RADIO: i64 = 1 << 15;
const FLAG_PUSHBUTTON: i64 = 1 << 16;
const ANNOT_HIDDEN: i64 = 1 << 1;
const TEXT_PADDING: f32 = 2.0;
const MAX_DEPTH: usize = 32;

/// Field kinds distinguished by the filler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox,
    Radio,
    PushButton,
    Choice,
    Signature,
    Unknown,
}

impl FieldKind {
    fn from_type(field_type: Option<&[u8]>, flags: i64) -> Self {
        match field_type {
            Some(b"Tx") => FieldKind::Text,
            Some(b"Btn") if flags & FLAG_PUSHBUTTON != 0 => FieldKind::PushButton,
            Some(b"Btn") if flags & FLAG_RADIO != 0 => FieldKind::Radio,
            Some(b"Btn") => FieldKind::Checkbox,
            Some(b"Ch") => FieldKind::Choice,
            Some(b"Sig") => FieldKind::Signature,
            _ => FieldKind::Unknown,
        }
    }
}

/// A terminal form field and the widgets that display it
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Fully qualified name, partial names joined with `.`
    pub name: String,
    /// Terminal partial name (`/T` of the field itself)
    pub partial_name: String,
    pub kind: FieldKind,
    pub id: ObjectId,
    pub widgets: Vec<ObjectId>,
    flags: i64,
    default_appearance: Option<String>,
    quadding: i64,
}

/// The fields of a document's AcroForm
#[derive(Debug, Clone, Default)]
pub struct AcroForm {
    fields: Vec<FormField>,
}

/// Values a field inherits from its ancestors
#[derive(Debug, Clone, Default)]
struct Inherited {
    name: String,
    field_type: Option<Vec<u8>>,
    flags: i64,
    default_appearance: Option<String>,
    quadding: i64,
}

impl AcroForm {
    /// Read the form from the catalog; `None` when the document has no form
    pub fn open(doc: &Document) -> Option<Self> {
        let catalog = doc.catalog().ok()?;
        let acroform = resolve_dict(doc, catalog.get(b"AcroForm").ok()?)?;
        let Some(Object::Array(roots)) = acroform.get(b"Fields").ok().and_then(|f| resolve(doc, f)) else {
            return None;
        };

        let inherited = Inherited {
            default_appearance: text_entry(doc, acroform, b"DA"),
            quadding: acroform.get(b"Q").and_then(Object::as_i64).unwrap_or(0),
            ..Inherited::default()
        };

        let mut fields = Vec::new();
        let mut visited = HashSet::new();
        for root in roots {
            if let Ok(id) = root.as_reference() {
                collect_field(doc, id, &inherited, &mut fields, &mut visited, 0);
            }
        }
        Some(Self { fields })
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Find a field by exact qualified name, then terminal name, then a
    /// case and punctuation insensitive comparison
    pub fn lookup(&self, name: &str) -> Option<&FormField> {
        if let Some(field) = self.fields.iter().find(|f| f.name == name) {
            return Some(field);
        }
        if let Some(field) = self.fields.iter().find(|f| f.partial_name == name) {
            return Some(field);
        }
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        self.fields
            .iter()
            .find(|f| normalize_name(&f.name) == key || normalize_name(&f.partial_name) == key)
    }

    /// First candidate naming a field of `kind`
    pub fn find(&self, candidates: &[String], kind: FieldKind) -> Option<&FormField> {
        candidates
            .iter()
            .filter_map(|candidate| self.lookup(candidate))
            .find(|field| field.kind == kind)
    }
}

fn collect_field(
    doc: &Document,
    id: ObjectId,
    parent: &Inherited,
    fields: &mut Vec<FormField>,
    visited: &mut HashSet<ObjectId>,
    depth: usize,
) {
    if depth > MAX_DEPTH || !visited.insert(id) {
        return;
    }
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    let partial_name = text_entry(doc, dict, b"T");
    let mut inherited = parent.clone();
    if let Some(partial) = &partial_name {
        inherited.name = if parent.name.is_empty() {
            partial.clone()
        } else {
            format!("{}.{}", parent.name, partial)
        };
    }
    if let Ok(field_type) = dict.get(b"FT").and_then(Object::as_name) {
        inherited.field_type = Some(field_type.to_vec());
    }
    if let Ok(flags) = dict.get(b"Ff").and_then(Object::as_i64) {
        inherited.flags = flags;
    }
    if let Some(da) = text_entry(doc, dict, b"DA") {
        inherited.default_appearance = Some(da);
    }
    if let Ok(q) = dict.get(b"Q").and_then(Object::as_i64) {
        inherited.quadding = q;
    }

    let kids: Vec<ObjectId> = match dict.get(b"Kids").ok().and_then(|k| resolve(doc, k)) {
        Some(Object::Array(items)) => items.iter().filter_map(|k| k.as_reference().ok()).collect(),
        _ => Vec::new(),
    };

    // kids with a /T are child fields, the rest are this field's widgets
    let (children, widgets): (Vec<ObjectId>, Vec<ObjectId>) = kids
        .into_iter()
        .partition(|kid| doc.get_dictionary(*kid).is_ok_and(|k| k.has(b"T")));

    for child in &children {
        collect_field(doc, *child, &inherited, fields, visited, depth + 1);
    }

    if children.is_empty() || !widgets.is_empty() {
        let widgets = if widgets.is_empty() { vec![id] } else { widgets };
        fields.push(FormField {
            name: inherited.name.clone(),
            partial_name: partial_name.unwrap_or_default(),
            kind: FieldKind::from_type(inherited.field_type.as_deref(), inherited.flags),
            id,
            widgets,
            flags: inherited.flags,
            default_appearance: inherited.default_appearance,
            quadding: inherited.quadding,
        });
    }
}

/// Lowercased alphanumerics only: "Phone / E-mail" and "phone_email" compare equal
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match resolve(doc, dict.get(key).ok()?)? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        _ => None,
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, else single-byte)
fn decode_text(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn encode_text(value: &str) -> Object {
    if value.is_ascii() {
        Object::string_literal(value)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// The four status checkboxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    ForReview,
    ForApproval,
    ForRecord,
    InformationOnly,
}

/// What a mapping fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticField {
    ProjectName,
    SubmittedTo,
    PreparedBy,
    Date,
    ProjectNumber,
    Contact,
    Product,
    Status(StatusFlag),
    SubmittalType(DocumentType),
    OtherText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

impl FieldValue {
    fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Checked(_) => FieldKind::Checkbox,
        }
    }
}

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub field: SemanticField,
    pub candidates: Vec<String>,
    pub value: FieldValue,
}

fn names(candidates: &[&str]) -> Vec<String> {
    candidates.iter().map(|c| c.to_string()).collect()
}

/// Mapping table for one request, in fill order
pub fn field_mappings(project: &ProjectData) -> Vec<FieldMapping> {
    let text = |field, candidates: &[&str], value: &str| FieldMapping {
        field,
        candidates: names(candidates),
        value: FieldValue::Text(value.to_string()),
    };
    let check = |field, candidates: Vec<String>, checked| FieldMapping {
        field,
        candidates,
        value: FieldValue::Checked(checked),
    };

    let status = project.status;
    let mut table = vec![
        text(
            SemanticField::ProjectName,
            &["Project Name", "ProjectName", "Project", "Job Name"],
            &project.project_name,
        ),
        text(
            SemanticField::SubmittedTo,
            &["Submitted To", "SubmittedTo", "To", "Architect"],
            &project.submitted_to,
        ),
        text(
            SemanticField::PreparedBy,
            &["Prepared By", "PreparedBy", "From", "Contractor"],
            &project.prepared_by,
        ),
        text(
            SemanticField::Date,
            &["Date", "Submittal Date", "Date Submitted"],
            &display_date(&project.date),
        ),
        text(
            SemanticField::ProjectNumber,
            &["Project Number", "ProjectNumber", "Project No", "Job Number"],
            project.project_number_or_blank(),
        ),
        text(
            SemanticField::Contact,
            &["Phone / Email", "Phone Email", "Contact", "Contact Info", "Phone"],
            &project.contact_line(),
        ),
        text(SemanticField::Product, &["Product", "Product Name", "Manufacturer Product"], &project.product),
        check(
            SemanticField::Status(StatusFlag::ForReview),
            names(&["For Review", "Review"]),
            status.for_review,
        ),
        check(
            SemanticField::Status(StatusFlag::ForApproval),
            names(&["For Approval", "Approval"]),
            status.for_approval,
        ),
        check(
            SemanticField::Status(StatusFlag::ForRecord),
            names(&["For Record", "Record"]),
            status.for_record,
        ),
        check(
            SemanticField::Status(StatusFlag::InformationOnly),
            names(&["Information Only", "For Information Only", "Info Only"]),
            status.information_only,
        ),
    ];

    for doc_type in DocumentType::ALL {
        let label = doc_type.label();
        table.push(check(
            SemanticField::SubmittalType(doc_type),
            vec![label.to_string(), format!("{} Checkbox", label), format!("Check {}", label)],
            project.submittal_type.is_checked(doc_type),
        ));
    }

    table.push(text(
        SemanticField::OtherText,
        &["Other Text", "Other Description", "Other Specify", "Other Type"],
        &project.submittal_type.other_text,
    ));
    table
}

/// What filling did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    pub fields_found: usize,
    /// Semantic fields and the form field that received each
    pub matched: Vec<(SemanticField, String)>,
    pub widgets_flattened: usize,
}

/// Fill the form from `project`, then flatten it into page content
pub fn fill_form(packet: &mut PacketDocument, form: &AcroForm, project: &ProjectData) -> Result<FillReport> {
    let mut report = FillReport {
        fields_found: form.len(),
        ..FillReport::default()
    };

    for mapping in field_mappings(project) {
        let Some(field) = form.find(&mapping.candidates, mapping.value.kind()) else {
            continue;
        };
        match &mapping.value {
            FieldValue::Text(value) => set_text(packet.document_mut(), field, value)?,
            FieldValue::Checked(checked) => set_checkbox(packet.document_mut(), field, *checked)?,
        }
        debug!("{:?} -> {}", mapping.field, field.name);
        report.matched.push((mapping.field, field.name.clone()));
    }
    info!("Filled {} of {} form fields", report.matched.len(), report.fields_found);

    report.widgets_flattened = flatten(packet, form)?;
    Ok(report)
}

fn set_text(doc: &mut Document, field: &FormField, value: &str) -> Result<()> {
    doc.get_dictionary_mut(field.id)?.set("V", encode_text(value));
    Ok(())
}

fn set_checkbox(doc: &mut Document, field: &FormField, checked: bool) -> Result<()> {
    let mut field_state = b"Off".to_vec();
    for widget_id in &field.widgets {
        let state = if checked {
            on_state(doc, *widget_id)
        } else {
            b"Off".to_vec()
        };
        if checked {
            field_state = state.clone();
        }
        doc.get_dictionary_mut(*widget_id)?.set("AS", Object::Name(state));
    }
    doc.get_dictionary_mut(field.id)?.set("V", Object::Name(field_state));
    Ok(())
}

/// The widget's "on" appearance state name, `Yes` when it declares none
fn on_state(doc: &Document, widget_id: ObjectId) -> Vec<u8> {
    normal_appearance(doc, widget_id)
        .and_then(|normal| match normal {
            Object::Dictionary(states) => states
                .iter()
                .map(|(name, _)| name)
                .find(|name| name.as_slice() != b"Off")
                .cloned(),
            _ => None,
        })
        .unwrap_or_else(|| b"Yes".to_vec())
}

/// The widget's `/AP /N` entry, resolved one level
fn normal_appearance(doc: &Document, widget_id: ObjectId) -> Option<&Object> {
    let widget = doc.get_dictionary(widget_id).ok()?;
    let ap = resolve_dict(doc, widget.get(b"AP").ok()?)?;
    resolve(doc, ap.get(b"N").ok()?)
}

/// Where a widget's appearance comes from
enum Appearance {
    /// An appearance stream already in the document
    Existing(ObjectId),
    /// Content we generate, in a `[0 0 w h]` box
    Generated(Vec<u8>),
}

/// Draws collected for one page
#[derive(Default)]
struct PageStamp {
    content: String,
    xobjects: Vec<(String, ObjectId)>,
    /// XObject names the page already uses, plus the ones handed out
    taken: HashSet<Vec<u8>>,
    next: usize,
}

impl PageStamp {
    fn for_page(doc: &Document, page_id: ObjectId) -> Self {
        Self {
            taken: page_xobject_names(doc, page_id),
            ..Self::default()
        }
    }

    /// Next `Fx{n}` name not already on the page
    fn fresh_name(&mut self) -> String {
        loop {
            self.next += 1;
            let name = format!("Fx{}", self.next);
            if self.taken.insert(name.clone().into_bytes()) {
                return name;
            }
        }
    }
}

fn page_xobject_names(doc: &Document, page_id: ObjectId) -> HashSet<Vec<u8>> {
    inherited_attribute(doc, page_id, b"Resources")
        .and_then(|res| resolve_dict(doc, res))
        .and_then(|res| res.get(b"XObject").ok())
        .and_then(|xobjects| resolve_dict(doc, xobjects))
        .map(|xobjects| xobjects.iter().map(|(name, _)| name.clone()).collect())
        .unwrap_or_default()
}

/// Draw every visible widget into its page, then remove widgets and the form
///
/// Returns the number of widgets drawn.
pub fn flatten(packet: &mut PacketDocument, form: &AcroForm) -> Result<usize> {
    let widget_pages = widget_pages(packet.document());
    let font_resources = packet.font_resources();
    let mut stamps: BTreeMap<ObjectId, PageStamp> = BTreeMap::new();
    let mut drawn = 0;

    for field in form.fields() {
        for widget_id in &field.widgets {
            let doc = packet.document();
            let Some(page_id) = widget_pages.get(widget_id).copied().or_else(|| widget_parent_page(doc, *widget_id))
            else {
                continue;
            };
            let Some(rect) = widget_rect(doc, *widget_id) else {
                continue;
            };
            let Some(appearance) = widget_appearance(doc, field, *widget_id, rect) else {
                continue;
            };

            let doc = packet.document_mut();
            let (xobject_id, bbox) = match appearance {
                Appearance::Existing(id) => (id, prepare_existing(doc, id, rect)?),
                Appearance::Generated(content) => {
                    let mut resources = Dictionary::new();
                    resources.set("Font", Object::Dictionary(font_resources.clone()));
                    let bbox = [0.0, 0.0, rect.width, rect.height];
                    (add_form_xobject(doc, content, bbox, resources), bbox)
                }
            };

            let stamp = stamps
                .entry(page_id)
                .or_insert_with(|| PageStamp::for_page(doc, page_id));
            let name = stamp.fresh_name();
            stamp.content.push_str(&place_xobject(&name, bbox, rect));
            stamp.xobjects.push((name, xobject_id));
            drawn += 1;
        }
    }

    let doc = packet.document_mut();
    for (page_id, stamp) in stamps {
        isolate_page_content(doc, page_id)?;
        for (name, id) in &stamp.xobjects {
            add_page_resource(doc, page_id, "XObject", name, *id)?;
        }
        append_stamp(doc, page_id, stamp.content.into_bytes())?;
    }

    remove_widgets(doc, form)?;
    let root = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| Error::PageTree("trailer has no catalog".to_string()))?;
    doc.get_dictionary_mut(root)?.remove(b"AcroForm");

    debug!("Flattened {} widgets", drawn);
    Ok(drawn)
}

/// Map each annotation id to the page listing it
fn widget_pages(doc: &Document) -> HashMap<ObjectId, ObjectId> {
    let mut pages = HashMap::new();
    for page_id in doc.get_pages().into_values() {
        for annot in page_annotations(doc, page_id) {
            pages.insert(annot, page_id);
        }
    }
    pages
}

fn page_annotations(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let annots = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Annots").ok())
        .and_then(|annots| resolve(doc, annots));
    match annots {
        Some(Object::Array(items)) => items.iter().filter_map(|item| item.as_reference().ok()).collect(),
        _ => Vec::new(),
    }
}

fn widget_parent_page(doc: &Document, widget_id: ObjectId) -> Option<ObjectId> {
    doc.get_dictionary(widget_id).ok()?.get(b"P").ok()?.as_reference().ok()
}

fn widget_rect(doc: &Document, widget_id: ObjectId) -> Option<Rect> {
    let widget = doc.get_dictionary(widget_id).ok()?;
    let rect = Rect::from_corners(number_array(doc, widget.get(b"Rect").ok()?)?);
    (rect.width > 0.0 && rect.height > 0.0).then_some(rect)
}

fn widget_appearance(doc: &Document, field: &FormField, widget_id: ObjectId, rect: Rect) -> Option<Appearance> {
    let widget = doc.get_dictionary(widget_id).ok()?;
    let annot_flags = widget.get(b"F").and_then(Object::as_i64).unwrap_or(0);
    if annot_flags & ANNOT_HIDDEN != 0 {
        return None;
    }

    match field.kind {
        FieldKind::Text => {
            let value = text_entry(doc, doc.get_dictionary(field.id).ok()?, b"V")?;
            (!value.is_empty()).then(|| Appearance::Generated(text_appearance(field, &value, rect)))
        }
        FieldKind::Checkbox => {
            let state = widget.get(b"AS").and_then(Object::as_name).unwrap_or(b"Off");
            let existing = state_appearance(doc, widget_id, state);
            match existing {
                Some(id) => Some(Appearance::Existing(id)),
                None if state != b"Off" => Some(Appearance::Generated(check_mark(rect))),
                None => None,
            }
        }
        _ => {
            let state = widget.get(b"AS").and_then(Object::as_name).ok();
            match widget.get(b"AP").ok().and_then(|ap| resolve_dict(doc, ap))?.get(b"N").ok()? {
                Object::Reference(id) if matches!(doc.get_object(*id), Ok(Object::Stream(_))) => {
                    Some(Appearance::Existing(*id))
                }
                _ => state.and_then(|s| state_appearance(doc, widget_id, s)).map(Appearance::Existing),
            }
        }
    }
}

/// Appearance stream for one named state in `/AP /N`
fn state_appearance(doc: &Document, widget_id: ObjectId, state: &[u8]) -> Option<ObjectId> {
    let Object::Dictionary(states) = normal_appearance(doc, widget_id)? else {
        return None;
    };
    let id = states.get(state).ok()?.as_reference().ok()?;
    matches!(doc.get_object(id), Ok(Object::Stream(_))).then_some(id)
}

/// Font size from a `/DA` string such as `/Helv 10 Tf 0 g`; 0 means auto
fn da_font_size(default_appearance: &str) -> f32 {
    let tokens: Vec<&str> = default_appearance.split_whitespace().collect();
    tokens
        .windows(2)
        .find(|pair| pair[1] == "Tf")
        .and_then(|pair| pair[0].parse::<f32>().ok())
        .unwrap_or(0.0)
}

fn text_appearance(field: &FormField, value: &str, rect: Rect) -> Vec<u8> {
    let inner_width = (rect.width - 2.0 * TEXT_PADDING).max(1.0);
    let multiline = field.flags & FLAG_MULTILINE != 0;

    let mut size = field.default_appearance.as_deref().map(da_font_size).unwrap_or(0.0);
    if size <= 0.0 {
        size = ((rect.height - 2.0 * TEXT_PADDING) * 0.7).clamp(4.0, 12.0);
        if !multiline {
            size = fit_font_size(value, Font::Regular, size, 4.0, inner_width);
        }
    }

    let (x, align) = match field.quadding {
        1 => (rect.width / 2.0, Align::Center),
        2 => (rect.width - TEXT_PADDING, Align::Right),
        _ => (TEXT_PADDING, Align::Left),
    };

    let mut canvas = Canvas::new();
    if multiline {
        let top = rect.height - TEXT_PADDING - size;
        canvas.paragraph(x, top, inner_width, Font::Regular, size, palette::BLACK, align, value);
    } else {
        let baseline = (rect.height - size) / 2.0 + size * 0.22;
        canvas.text(x, baseline, Font::Regular, size, palette::BLACK, align, value);
    }
    let (content, _) = canvas.finish();

    let mut out = b"/Tx BMC\nq\n".to_vec();
    out.extend_from_slice(&content);
    out.extend_from_slice(b"Q\nEMC\n");
    out
}

fn check_mark(rect: Rect) -> Vec<u8> {
    let size = rect.width.min(rect.height) * 0.8;
    let x = (rect.width - size * 0.75) / 2.0;
    let y = (rect.height - size) / 2.0 + size * 0.15;
    format!(
        "q BT 0 g /{} {} Tf 1 0 0 1 {} {} Tm (4) Tj ET Q\n",
        Font::Symbol.resource_name(),
        num(size),
        num(x),
        num(y)
    )
    .into_bytes()
}

/// Make an existing appearance stream usable as a Form XObject; returns its BBox
fn prepare_existing(doc: &mut Document, id: ObjectId, rect: Rect) -> Result<[f32; 4]> {
    let bbox = match doc.get_object(id)? {
        Object::Stream(stream) => stream.dict.get(b"BBox").ok().and_then(|b| number_array(doc, b)),
        _ => None,
    };
    let bbox = bbox.unwrap_or([0.0, 0.0, rect.width, rect.height]);

    if let Object::Stream(stream) = doc.get_object_mut(id)? {
        stream.dict.set("Type", Object::Name(b"XObject".to_vec()));
        stream.dict.set("Subtype", Object::Name(b"Form".to_vec()));
        if !stream.dict.has(b"BBox") {
            stream
                .dict
                .set("BBox", Object::Array(bbox.iter().map(|v| Object::Real(*v)).collect()));
        }
    }
    Ok(bbox)
}

/// Operators that paint XObject `name` with its `bbox` mapped onto `rect`
fn place_xobject(name: &str, bbox: [f32; 4], rect: Rect) -> String {
    let box_width = (bbox[2] - bbox[0]).abs().max(f32::EPSILON);
    let box_height = (bbox[3] - bbox[1]).abs().max(f32::EPSILON);
    let sx = rect.width / box_width;
    let sy = rect.height / box_height;
    let tx = rect.x - bbox[0].min(bbox[2]) * sx;
    let ty = rect.y - bbox[1].min(bbox[3]) * sy;
    format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        num(sx),
        num(sy),
        num(tx),
        num(ty),
        name
    )
}

/// Drop widget annotations from every page and delete the field objects
fn remove_widgets(doc: &mut Document, form: &AcroForm) -> Result<()> {
    let widgets: HashSet<ObjectId> = form.fields().iter().flat_map(|f| f.widgets.iter().copied()).collect();

    for page_id in doc.get_pages().into_values() {
        let annots = page_annotations(doc, page_id);
        if annots.is_empty() || !annots.iter().any(|id| widgets.contains(id)) {
            continue;
        }
        let remaining: Vec<Object> = annots
            .into_iter()
            .filter(|id| !widgets.contains(id))
            .map(Object::Reference)
            .collect();
        let page = doc.get_dictionary_mut(page_id)?;
        if remaining.is_empty() {
            page.remove(b"Annots");
        } else {
            page.set("Annots", Object::Array(remaining));
        }
    }

    for field in form.fields() {
        doc.objects.remove(&field.id);
        for widget in &field.widgets {
            doc.objects.remove(widget);
        }
    }
    Ok(())
}

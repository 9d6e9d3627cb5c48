//! Post-processing of printed PDFs: drops pages that came out blank.
//!
//! Chrome sometimes emits an empty page after a forced page break. Each page is
//! inspected (extracted text, content-stream operators, image XObjects, box
//! height) and a predicate decides whether it stays. When every page would go,
//! the document is returned untouched.

use crate::http::ApiError;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Content streams shorter than this carry no visible drawing.
pub const BLANK_CONTENT_BYTES: usize = 128;
/// A full-page background fill is `re` + `f`.
pub const BACKGROUND_PAINT_OPS: usize = 2;
/// Pages shorter than this (points) are degenerate.
pub const MIN_PAGE_HEIGHT: f32 = 1.0;

const PAINT_OPERATORS: &[&str] = &[
    "m", "l", "c", "v", "y", "h", "re", "S", "s", "f", "F", "f*", "B", "B*", "b", "b*", "sh", "BI",
];
const TEXT_OPERATORS: &[&str] = &["Tj", "TJ", "'", "\""];
const MAX_PARENT_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageFilter {
    None,
    #[default]
    Blank,
    /// Zero-based page indices to drop unconditionally.
    DropIndices(BTreeSet<usize>),
}

impl FromStr for PageFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => return Ok(PageFilter::None),
            "blank" | "" => return Ok(PageFilter::Blank),
            _ => {}
        }

        let Some(list) = s.strip_prefix("indices:") else {
            return Err(format!("Invalid PAGE_FILTER '{}': expected blank, none or indices:<n,...>", s));
        };
        let indices = list
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| format!("Invalid page index '{}' in PAGE_FILTER", part))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(PageFilter::DropIndices(indices))
    }
}

impl fmt::Display for PageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageFilter::None => write!(f, "none"),
            PageFilter::Blank => write!(f, "blank"),
            PageFilter::DropIndices(indices) => {
                let list: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                write!(f, "indices:{}", list.join(","))
            }
        }
    }
}

/// What the blank-page predicate gets to look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageInspection {
    /// Zero-based.
    pub index: usize,
    /// Trimmed character count; `None` when extraction failed.
    pub text_len: Option<usize>,
    pub text_ops: usize,
    pub paint_ops: usize,
    pub has_xobjects: bool,
    /// Decoded content-stream size; `None` when the stream could not be read.
    pub content_len: Option<usize>,
    pub height: Option<f32>,
}

impl PageInspection {
    pub fn is_blank(&self) -> bool {
        if matches!(self.height, Some(h) if h < MIN_PAGE_HEIGHT) {
            return true;
        }
        if self.text_len.unwrap_or(0) > 0 || self.text_ops > 0 || self.has_xobjects {
            return false;
        }
        // Unreadable content is kept.
        let Some(content_len) = self.content_len else {
            return false;
        };
        content_len < BLANK_CONTENT_BYTES || self.paint_ops <= BACKGROUND_PAINT_OPS
    }
}

/// Keeps every page that is not blank.
pub fn keep_non_blank(page: &PageInspection) -> bool {
    !page.is_blank()
}

pub fn apply(filter: &PageFilter, pdf: Vec<u8>) -> Result<Vec<u8>, ApiError> {
    match filter {
        PageFilter::None => Ok(pdf),
        PageFilter::Blank => filter_pages(&pdf, keep_non_blank),
        PageFilter::DropIndices(indices) => filter_pages(&pdf, |page| !indices.contains(&page.index)),
    }
}

/// Removes the pages for which `keep` returns false.
pub fn filter_pages<F>(pdf: &[u8], keep: F) -> Result<Vec<u8>, ApiError>
where
    F: Fn(&PageInspection) -> bool,
{
    let mut doc = Document::load_mem(pdf)?;
    let pages = doc.get_pages();
    let total = pages.len();

    let mut dropped = Vec::new();
    for (index, (&number, &page_id)) in pages.iter().enumerate() {
        let inspection = inspect_page(&doc, index, number, page_id);
        if !keep(&inspection) {
            tracing::debug!(?inspection, "Dropping page {}", number);
            dropped.push(number);
        }
    }

    if dropped.is_empty() {
        return Ok(pdf.to_vec());
    }
    if dropped.len() == total {
        tracing::warn!("Every page matched the filter, keeping the document as printed");
        return Ok(pdf.to_vec());
    }

    doc.delete_pages(&dropped);
    doc.prune_objects();

    let mut out = Vec::with_capacity(pdf.len());
    doc.save_to(&mut out)?;
    tracing::info!(kept = total - dropped.len(), dropped = dropped.len(), "Filtered PDF pages");
    Ok(out)
}

pub fn inspect_page(doc: &Document, index: usize, number: u32, page_id: ObjectId) -> PageInspection {
    let mut inspection = PageInspection {
        index,
        text_len: doc
            .extract_text(&[number])
            .ok()
            .map(|text| text.trim().chars().count()),
        ..Default::default()
    };

    let content = read_page_content(doc, page_id)
        .and_then(|bytes| Content::decode(&bytes).ok().map(|content| (bytes.len(), content)));
    if let Some((len, content)) = content {
        inspection.content_len = Some(len);
        for op in &content.operations {
            let operator = op.operator.as_str();
            if TEXT_OPERATORS.contains(&operator) {
                inspection.text_ops += 1;
            } else if PAINT_OPERATORS.contains(&operator) {
                inspection.paint_ops += 1;
            } else if operator == "Do" {
                inspection.has_xobjects = true;
            }
        }
    }

    if let Ok(page) = doc.get_dictionary(page_id) {
        inspection.has_xobjects |= has_xobjects(doc, page);
        inspection.height = media_box_height(doc, page);
    }

    inspection
}

/// Concatenated content streams of a page, or `None` when any of them fails
/// to load or decompress.
fn read_page_content(doc: &Document, page_id: ObjectId) -> Option<Vec<u8>> {
    let mut bytes = Vec::new();
    for id in doc.get_page_contents(page_id) {
        let stream = doc.get_object(id).and_then(Object::as_stream).ok()?;
        if stream.dict.has(b"Filter") {
            bytes.extend(stream.decompressed_content().ok()?);
        } else {
            bytes.extend_from_slice(&stream.content);
        }
    }
    Some(bytes)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Looks `key` up on the page, then up the Pages tree.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(value) = current.get(key) {
            return resolve(doc, value);
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn has_xobjects(doc: &Document, page: &Dictionary) -> bool {
    inherited(doc, page, b"Resources")
        .and_then(|res| res.as_dict().ok())
        .and_then(|res| res.get(b"XObject").ok())
        .and_then(|xobj| resolve(doc, xobj))
        .and_then(|xobj| xobj.as_dict().ok())
        .is_some_and(|xobj| !xobj.is_empty())
}

fn media_box_height(doc: &Document, page: &Dictionary) -> Option<f32> {
    let media_box = inherited(doc, page, b"MediaBox")?.as_array().ok()?;
    if media_box.len() != 4 {
        return None;
    }
    let y0 = resolve(doc, &media_box[1])?.as_float().ok()?;
    let y1 = resolve(doc, &media_box[3])?.as_float().ok()?;
    Some((y1 - y0).abs())
}

#[cfg(test)]
pub(crate) mod test_pdf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// One page per entry; `Some(text)` draws the text, `None` leaves the page empty.
    pub fn build(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    pub fn page_count(pdf: &[u8]) -> usize {
        Document::load_mem(pdf).unwrap().get_pages().len()
    }
}

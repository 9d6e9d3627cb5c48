#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use comparatif_server::comparatif::RawComparatifInput;
use comparatif_server::config::Config;
use comparatif_server::http::{create_router, ApiError, AppState};
use comparatif_server::services::{DocumentProducer, PageSpec, PdfRenderer, SvgChartRenderer};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub fn fixture(name: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {:?}: {}", path, e));
    serde_json::from_str(&text).unwrap()
}

pub fn fixture_object(name: &str) -> RawComparatifInput {
    fixture(name).as_object().cloned().unwrap()
}

/// Minimal PDF; `None` entries are empty pages.
pub fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
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
            "MediaBox" => vec![0.into(), 0.into(), 2384.into(), 1684.into()],
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

/// Records the HTML it was given and prints a fixed three-page PDF with a
/// blank page in the middle.
#[derive(Default)]
pub struct FakePdfRenderer {
    pub last_html: Mutex<Option<String>>,
    pub last_page: Mutex<Option<PageSpec>>,
}

#[async_trait]
impl PdfRenderer for FakePdfRenderer {
    async fn render(&self, html: &str, page: PageSpec) -> Result<Vec<u8>, ApiError> {
        *self.last_html.lock().unwrap() = Some(html.to_string());
        *self.last_page.lock().unwrap() = Some(page);
        Ok(build_pdf(&[Some("Presentation"), None, Some("Tarifs")]))
    }
}

pub struct TestApp {
    pub router: Router,
    pub pdf: Arc<FakePdfRenderer>,
    pub media: tempfile::TempDir,
}

pub fn test_app(configure: impl FnOnce(&mut Config)) -> TestApp {
    let media = tempfile::tempdir().unwrap();
    let mut config = Config {
        media_root: media.path().to_path_buf(),
        ..Config::default()
    };
    configure(&mut config);
    let config = Arc::new(config);

    let pdf = Arc::new(FakePdfRenderer::default());
    let producer = DocumentProducer::new(config.clone(), Arc::new(SvgChartRenderer::default()), pdf.clone()).unwrap();
    let router = create_router(AppState::new(config, producer));

    TestApp { router, pdf, media }
}

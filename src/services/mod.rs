pub mod chart;
pub mod document;
pub mod page_filter;
pub mod pdf;
pub mod presentation;
pub mod template;

pub use chart::{ChartPolicy, ChartRenderer, SvgChartRenderer};
pub use document::{DocumentProducer, RequestOrigin, StoredDocument};
pub use page_filter::PageFilter;
pub use pdf::{ChromePdfRenderer, PageSpec, PdfRenderer};
pub use presentation::build_presentation;
pub use template::TemplateRenderer;

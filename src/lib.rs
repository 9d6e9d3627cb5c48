//! Energy comparatif presentation server: turns a CRM comparatif payload into
//! a charted A1 PDF deck stored under the media root.

pub mod browser;
pub mod comparatif;
pub mod config;
pub mod http;
pub mod services;
pub mod utils;

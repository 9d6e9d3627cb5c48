pub mod cdp;

pub use cdp::{create_cdp_browser, wait_for_assets};

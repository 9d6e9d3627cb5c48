pub mod dates;
pub mod mask;
pub mod parser;

pub use dates::{format_epoch_millis, parse_axis_date, DateZone};
pub use mask::mask_identifier;
pub use parser::{is_blank, json_decimal, json_f64, json_text, parse_euro_amount};

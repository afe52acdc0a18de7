/// Formats resolution results as plain text or JSON.
pub mod formatter;

pub use formatter::{
    format_match, format_no_sheets, format_not_found, format_result_as_json,
    format_result_as_text, format_sheet_list, NO_NAME,
};

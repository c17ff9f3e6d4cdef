//! CSV record framing for the combined output stream
//!
//! Single authority for how an in-memory row becomes an output line: fields
//! joined by commas, RFC4180-style quoting, one line feed per record.

use std::io::Write;

/// Escape a single field for CSV output.
///
/// The value is wrapped in double quotes if it contains a comma, a double
/// quote, a carriage return, or a line feed; interior quotes are doubled.
pub fn escape(value: &str) -> String {
    let needs_quotes = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write one CSV record: escaped fields joined by commas, LF-terminated
pub fn write_record<W: Write>(writer: &mut W, values: &[String]) -> std::io::Result<()> {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        writer.write_all(escape(value).as_bytes())?;
    }
    writer.write_all(b"\n")
}

//! Response parsing helpers.
//!
//! Only the status line can fail to parse. Header parsing is deliberately
//! lenient: any line without a colon is skipped.

use crate::error::InvalidResponse;

/// Locate `delim` in `buf`, returning the index of its first byte.
pub fn find_delimiter(buf: &[u8], delim: &[u8]) -> Option<usize> {
    buf.windows(delim.len()).position(|w| w == delim)
}

/// Parse a status line of the form `HTTP/1.1 <code> <text>`.
///
/// The version token must be exactly `HTTP/1.1` and the code must be an
/// unsigned integer. The status text may be empty and may contain spaces.
///
/// ```
/// use courier::http::parser::parse_status_line;
///
/// let (code, message) = parse_status_line(b"HTTP/1.1 404 Not Found").unwrap();
/// assert_eq!(code, 404);
/// assert_eq!(message, "Not Found");
/// ```
pub fn parse_status_line(line: &[u8]) -> Result<(u16, String), InvalidResponse> {
    let line = String::from_utf8_lossy(line);
    let mut parts = line.splitn(3, ' ');

    let version = parts.next().unwrap_or("");
    if version != "HTTP/1.1" {
        return Err(InvalidResponse::UnsupportedVersion);
    }

    let code = parts
        .next()
        .unwrap_or("")
        .parse::<u16>()
        .map_err(|_| InvalidResponse::MalformedStatusCode)?;

    let message = parts.next().unwrap_or("").trim().to_string();

    Ok((code, message))
}

/// Parse a header block terminated by an empty line.
///
/// Each line is split at the first `:`, with surrounding whitespace trimmed
/// from both the name and the value. Pairs come back in wire order, so
/// duplicate keys resolve last-write-wins once inserted into a map.
pub fn parse_header_block(block: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(block);
    let mut headers = Vec::new();

    for line in text.split("\r\n") {
        if line.is_empty() {
            // Blank line ends the header block.
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
        // Lines without a separator are skipped.
    }

    headers
}

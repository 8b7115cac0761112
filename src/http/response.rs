//! HTTP response record.

use std::collections::HashMap;

/// A received HTTP response.
///
/// Populated field by field as the owning request works through the reply:
/// the status line first, then the headers, then body bytes as they arrive.
/// All mutators are crate-private, so outside this crate a `Response` is
/// read-only. When a request fails partway, the record holds exactly what
/// had been parsed up to that point; after the completion callback has run,
/// nothing touches it again.
#[derive(Debug)]
pub struct Response {
    status: u16,
    status_message: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Response {
    pub(crate) fn new() -> Self {
        Response {
            status: 0,
            status_message: String::new(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Numeric status code, or 0 if the status line was never parsed.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status text from the status line (`"OK"` for a plain 200 response).
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// All received headers. Keys are case-sensitive, exactly as received;
    /// a key sent twice keeps the last value.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Raw body bytes, exactly as read from the socket. No decoding of any
    /// kind is applied.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn set_status(&mut self, code: u16, message: String) {
        self.status = code;
        self.status_message = message;
    }

    pub(crate) fn add_header(&mut self, name: String, value: String) {
        self.headers.insert(name, value);
    }

    pub(crate) fn append_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }
}

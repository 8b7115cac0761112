//! HTTP/1.1 GET over plain TCP.
//!
//! # Architecture
//!
//! The HTTP layer is organized into three submodules:
//!
//! - **`request`**: The request state machine driving one GET from resolve
//!   to completion callback
//! - **`response`**: The response record populated while the reply is parsed
//! - **`parser`**: Status line and header block parsing
//!
//! # Request State Machine
//!
//! Each request advances through a fixed chain of steps, with exactly one
//! asynchronous operation in flight at a time:
//!
//! ```text
//!   Resolving → Connecting → Sending → ReadingStatusLine
//!                                            │
//!       Finished ← ReadingBody ← ReadingHeaders
//! ```
//!
//! The cancellation flag is checked on entry to every step, and a step
//! already in flight is woken and aborted when `cancel()` is called, so the
//! chain always reaches Finished and the completion callback always fires
//! exactly once. The body is read until EOF; the server closing the
//! connection is the success path, since every exchange uses a fresh
//! connection (no keep-alive).
//!
//! # Example
//!
//! ```ignore
//! use courier::client::Client;
//!
//! let client = Client::new()?;
//! let request = client.create_request(1);
//! request.set_host("example.com");
//! request.set_path("/");
//! request.set_callback(|req, resp, err| match err {
//!     None => println!("#{}: HTTP {}", req.id(), resp.status()),
//!     Some(e) => println!("#{}: {}", req.id(), e),
//! });
//! request.execute();
//! ```

pub mod parser;
pub mod request;
pub mod response;

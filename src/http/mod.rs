//! HTTP/1.x protocol handling.
//!
//! - **`request`**: parsed request, version and path-match captures
//! - **`parser`**: request line and header parsing from a byte buffer
//! - **`body`**: fixed-length body reads that reuse already-buffered bytes
//! - **`response`**: the response sink handlers write into
//! - **`writer`**: serializes and flushes responses
//! - **`connection`**: the per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │  ReadingHeaders  │ ← Wait for a complete request head
//!        └──────┬───────────┘
//!               │ Content-Length declared?
//!               ├─ yes ─▶ ReadingBody ─┐
//!               ▼                      │
//!        ┌──────────────────┐          │
//!        │   Dispatching    │ ◀────────┘ Resolve route, run handler
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │     Writing      │ ← Send response to client
//!        └──────┬───────────┘
//!               ├─ Keep-Alive → ReadingHeaders (same connection)
//!               └─ Close → Closed
//! ```
//!
//! Malformed heads, short bodies, read timeouts and I/O errors all go
//! straight to `Closed` without a response.

pub mod body;
pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

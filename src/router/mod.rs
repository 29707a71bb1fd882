//! Route tables
//!
//! Routes are registered into two tables, `resources` for application routes
//! and `default_resources` for fallbacks, then frozen into one ordered,
//! read-only [`RouteTable`] before the listener starts accepting. The frozen
//! table is shared by every connection without locking; nothing can be
//! registered once it exists.

pub mod table;

use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::Response;

pub use table::{Resolution, RouteEntry, RouteTable, RouteTableBuilder};

/// A route handler: fills in the response for one request.
pub type Handler = Arc<dyn Fn(&mut Response, &Request) + Send + Sync>;

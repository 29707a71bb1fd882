//! Listening and worker pool.

pub mod listener;
#[allow(clippy::module_inception)]
pub mod server;

pub use listener::{TcpTransport, Transport};
pub use server::Server;

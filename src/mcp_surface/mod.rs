//! Static MCP tool catalog and host install-stanza generator. Publishes
//! tool name/schema metadata only; the transport and JSON-RPC surface
//! that would actually serve these tools is out of scope.

mod catalog;
mod install;

pub use catalog::{catalog, ToolDescriptor};
pub use install::install_stanza;

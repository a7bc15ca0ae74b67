//! Request Tracker: write-once-append lifecycle records for every
//! generation request, persisted to the shared `ultra-mcp.db`.

mod error;
mod handle;
mod store;
mod types;

pub use error::TrackerError;
pub use handle::TrackingHandle;
pub use store::RequestTracker;
pub use types::{RequestRecord, RequestStatus, TrackerStats};

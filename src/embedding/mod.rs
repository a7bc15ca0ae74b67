//! Embedding Subservice: a narrower interface than chat generation
//! (`embed_one`/`embed_many`), reusing chat-provider credentials rather
//! than holding its own.

mod error;
mod service;
mod wire;

pub use error::EmbeddingError;
pub use service::EmbeddingService;

//! Episode metadata retrieval.
//!
//! The workflow publishes a small JSON document alongside the finished
//! media with the title, description and tags chosen during script
//! generation. Fetch failures degrade to placeholder metadata instead
//! of blocking ingest; the item can be fixed up on the media host later.

mod fetcher;
mod types;

pub use fetcher::HttpMetadataFetcher;
pub use types::{EpisodeMetadata, MetadataError, MetadataFetcher};

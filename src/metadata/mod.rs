//! Copyright and usage-restriction metadata.
//!
//! Protection tags are written into the encoded output through an ordered
//! strategy chain (merge into the source EXIF, fresh EXIF, PNG text). When
//! the stage is disabled the source container is carried over unchanged.

pub mod container;
pub mod error;
pub mod protector;
pub mod snapshot;
pub mod strategy;
pub mod tags;

pub use container::{SourceMetadata, TextEntry};
pub use error::MetadataError;
pub use protector::{preserve, protect, MetadataProtector, TaggedImage};
pub use snapshot::{extract_metadata, ExifEntry, MetadataSnapshot};
pub use strategy::{default_chain, CanonicalExif, InjectionStrategy, MergedExif, PngText};
pub use tags::{MetadataSpec, MetadataTag, TagKey};

//! sitebot-vector
//!
//! Memory-resident vector store. A `MemoryVectorStore` owns named, append-only
//! collections; each collection answers k-nearest-neighbour queries by exact
//! cosine similarity over every stored vector.

pub mod collection;
pub mod similarity;
pub mod store;

pub use collection::{CollectionStats, MemoryCollection};
pub use store::{CollectionHandle, MemoryVectorStore};

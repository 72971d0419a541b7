pub mod context;

pub use context::{ChunkHit, HybridContext, HybridContextBuilder};

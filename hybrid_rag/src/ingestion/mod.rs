pub mod chunker;
pub mod file_reader;
pub mod markdown_chunker;
pub mod pipeline;

pub use chunker::{Chunker, ChunkerSet, TextChunker};
pub use markdown_chunker::MarkdownChunker;
pub use file_reader::{DiscoveredFiles, FileKind, FileReader};
pub use pipeline::IngestionPipeline;

use serde::{Deserialize, Serialize};

/// Summary of one ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    pub success: bool,
    pub files_processed: usize,
    pub nodes_created: usize,
    pub relationships_created: usize,
    pub chunks_embedded: usize,
}

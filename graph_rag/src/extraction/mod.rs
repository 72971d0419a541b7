pub mod extractor;

pub use extractor::{ExtractedGraph, GraphExtractor};

/// System instruction for per-chunk relationship extraction
pub const GRAPH_EXTRACTION_PROMPT: &str = r#"You are a precise graph relationship extractor. Extract all
relationships from the text and format them as a JSON object
with this exact structure:
{
    "graph": [
        {"node": "Person/Entity",
        "target_node": "Related Entity",
        "relationship": "Type of Relationship"},
        ...more relationships...
    ]
}
Include ALL relationships mentioned in the text, including
implicit ones. Be thorough and precise."#;

pub fn extraction_user_prompt(text: &str) -> String {
    format!("Extract nodes and relationships from the following text:\n{}", text)
}

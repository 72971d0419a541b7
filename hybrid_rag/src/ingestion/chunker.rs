use std::sync::Arc;

use crate::ingestion::file_reader::FileKind;
use crate::ingestion::markdown_chunker::MarkdownChunker;

/// Splits document text into bounded chunks
pub trait Chunker: Send + Sync {
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Chunker per parsed file kind
#[derive(Clone)]
pub struct ChunkerSet {
    text: Arc<dyn Chunker>,
    markdown: Arc<dyn Chunker>,
}

impl ChunkerSet {
    pub fn new(text: Arc<dyn Chunker>, markdown: Arc<dyn Chunker>) -> Self {
        Self { text, markdown }
    }

    /// `TextChunker` for text, `MarkdownChunker` for markdown, same limits
    pub fn with_limits(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self::new(
            Arc::new(TextChunker::new(chunk_size, chunk_overlap)),
            Arc::new(MarkdownChunker::new(chunk_size, chunk_overlap)),
        )
    }

    /// `None` for kinds that are not parsed
    pub fn for_kind(&self, kind: FileKind) -> Option<&dyn Chunker> {
        match kind {
            FileKind::Text => Some(self.text.as_ref()),
            FileKind::Markdown => Some(self.markdown.as_ref()),
            FileKind::Pdf | FileKind::Image => None,
        }
    }
}

/// Paragraph-first chunker with a sliding-window fallback for paragraphs
/// that don't fit. Sizes are measured in characters.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    fn paragraphs(content: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current = String::new();

        for line in content.lines() {
            // Empty line indicates paragraph break
            if line.trim().is_empty() {
                if !current.trim().is_empty() {
                    paragraphs.push(current.trim().to_string());
                }
                current.clear();
                continue;
            }
            current.push_str(line);
            current.push('\n');
        }

        if !current.trim().is_empty() {
            paragraphs.push(current.trim().to_string());
        }

        paragraphs
    }

    fn sliding_window(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());

            let chunk_end = if end < chars.len() {
                Self::find_break_point(&chars[start..end], self.chunk_size / 2)
                    .map(|p| start + p)
                    .unwrap_or(end)
            } else {
                end
            };

            let chunk: String = chars[start..chunk_end].iter().collect();
            if !chunk.trim().is_empty() {
                chunks.push(chunk.trim().to_string());
            }

            if chunk_end >= chars.len() {
                break;
            }
            start = chunk_end.saturating_sub(self.chunk_overlap).max(start + 1);
        }

        chunks
    }

    /// Last newline or sentence end in the window, ignoring breaks before `min`
    fn find_break_point(window: &[char], min: usize) -> Option<usize> {
        for i in (min..window.len()).rev() {
            if window[i] == '\n' {
                return Some(i + 1);
            }
            if matches!(window[i], '.' | '!' | '?') && window.get(i + 1) == Some(&' ') {
                return Some(i + 2);
            }
        }
        None
    }
}

impl Chunker for TextChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for paragraph in Self::paragraphs(text) {
            let len = paragraph.chars().count();

            if len > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                chunks.extend(self.sliding_window(&paragraph));
                continue;
            }

            if current.is_empty() {
                current = paragraph;
                current_len = len;
            } else if current_len + 2 + len <= self.chunk_size {
                current.push_str("\n\n");
                current.push_str(&paragraph);
                current_len += 2 + len;
            } else {
                chunks.push(std::mem::replace(&mut current, paragraph));
                current_len = len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

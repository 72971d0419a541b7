use pulldown_cmark::{Event, Parser, Tag};

use crate::ingestion::chunker::{Chunker, TextChunker};

/// Text under one heading. The preamble before the first heading has level 0.
#[derive(Debug, Default)]
struct Section {
    level: usize,
    heading: String,
    body: String,
}

impl Section {
    fn heading_line(&self) -> Option<String> {
        (self.level > 0).then(|| format!("{} {}", "#".repeat(self.level), self.heading.trim()))
    }

    fn render(&self) -> String {
        let body = self.body.trim();
        match self.heading_line() {
            Some(heading) if body.is_empty() => heading,
            Some(heading) => format!("{}\n\n{}", heading, body),
            None => body.to_string(),
        }
    }
}

/// Splits markdown on headings. Whole sections are packed into a chunk while
/// they fit; a section that is too large on its own is split as plain text
/// with its heading repeated on every piece. Documents without headings are
/// handed to the plain-text chunker.
#[derive(Debug, Clone)]
pub struct MarkdownChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    fallback: TextChunker,
}

impl MarkdownChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap,
            fallback: TextChunker::new(chunk_size, chunk_overlap),
        }
    }

    fn sections(content: &str) -> Vec<Section> {
        let mut sections = vec![Section::default()];
        let mut in_heading = false;

        for event in Parser::new(content) {
            if let Event::Start(Tag::Heading(level, _, _)) = &event {
                sections.push(Section {
                    level: *level as usize,
                    ..Default::default()
                });
                in_heading = true;
                continue;
            }

            let Some(current) = sections.last_mut() else {
                continue;
            };
            let target = if in_heading { &mut current.heading } else { &mut current.body };

            match event {
                Event::End(Tag::Heading(..)) => in_heading = false,
                Event::Text(text) | Event::Html(text) => target.push_str(&text),
                Event::Code(code) => {
                    target.push('`');
                    target.push_str(&code);
                    target.push('`');
                }
                Event::SoftBreak | Event::HardBreak => target.push('\n'),
                Event::Start(Tag::Item) => target.push_str("- "),
                Event::End(Tag::Item) => target.push('\n'),
                Event::End(Tag::Paragraph)
                | Event::End(Tag::CodeBlock(_))
                | Event::End(Tag::List(_))
                | Event::End(Tag::BlockQuote) => target.push_str("\n\n"),
                _ => {}
            }
        }

        sections
    }

    fn split_section(&self, section: &Section) -> Vec<String> {
        let Some(heading) = section.heading_line() else {
            return self.fallback.chunk(&section.body);
        };

        // Keep at least half the budget for body text under long headings
        let prefix_len = heading.chars().count() + 2;
        let budget = self
            .chunk_size
            .saturating_sub(prefix_len)
            .max(self.chunk_size / 2)
            .max(1);

        TextChunker::new(budget, self.chunk_overlap)
            .chunk(&section.body)
            .into_iter()
            .map(|piece| format!("{}\n\n{}", heading, piece))
            .collect()
    }
}

impl Chunker for MarkdownChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let sections = Self::sections(text);
        if sections.iter().all(|s| s.level == 0) {
            return self.fallback.chunk(text);
        }

        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for section in &sections {
            let rendered = section.render();
            if rendered.is_empty() {
                continue;
            }
            let len = rendered.chars().count();

            if len > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                chunks.extend(self.split_section(section));
                continue;
            }

            if current.is_empty() {
                current = rendered;
                current_len = len;
            } else if current_len + 2 + len <= self.chunk_size {
                current.push_str("\n\n");
                current.push_str(&rendered);
                current_len += 2 + len;
            } else {
                chunks.push(std::mem::replace(&mut current, rendered));
                current_len = len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

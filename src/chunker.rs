//! Recursive character text splitting.
//!
//! Splits raw text blocks into bounded, overlapping chunks for embedding.
//! The splitter prefers the largest natural boundary available (paragraph
//! break, then line break, then sentence-ending punctuation, then
//! whitespace) and only falls back to fixed-size character windows when a
//! fragment contains none of them.

/// A bounded span of source text, the unit of embedding and retrieval.
///
/// `position` is the zero-based ordinal of the chunk within its source
/// document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub position: usize,
}

/// Default separators, ordered from coarsest to finest boundary.
const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", ".", " "];

/// Splits text into chunks of at most `chunk_size` characters, with
/// consecutive chunks sharing up to `chunk_overlap` trailing characters.
///
/// Deterministic: the same input and configuration always produce the same
/// chunk sequence.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<&'static str>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

impl TextSplitter {
    /// Create a splitter. `chunk_overlap` must be smaller than `chunk_size`;
    /// callers validate this at configuration time.
    #[must_use]
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.to_vec(),
        }
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split a sequence of raw text blocks (e.g. PDF pages) into ordered
    /// chunks with document-wide positions.
    #[must_use]
    pub fn split_blocks(&self, blocks: &[String]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for block in blocks {
            for content in self.split_text(block) {
                let position = chunks.len();
                chunks.push(Chunk { content, position });
            }
        }
        chunks
    }

    /// Split a single text into chunk contents.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&'static str]) -> Vec<String> {
        if text.chars().count() <= self.chunk_size {
            let trimmed = text.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }

        // Pick the coarsest separator present in this fragment.
        let Some(idx) = separators.iter().position(|sep| text.contains(sep)) else {
            return self.hard_split(text);
        };
        let sep = separators[idx];
        let finer = &separators[idx + 1..];

        let mut out = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for part in text.split(sep).filter(|p| !p.is_empty()) {
            if part.chars().count() <= self.chunk_size {
                pending.push(part);
            } else {
                // Flush what fits, then recurse into the oversized part with
                // the finer separators.
                if !pending.is_empty() {
                    out.extend(self.merge_parts(&pending, sep));
                    pending.clear();
                }
                if finer.is_empty() {
                    out.extend(self.hard_split(part));
                } else {
                    out.extend(self.split_recursive(part, finer));
                }
            }
        }

        if !pending.is_empty() {
            out.extend(self.merge_parts(&pending, sep));
        }

        out
    }

    /// Greedily merge separator-delimited parts into chunks of at most
    /// `chunk_size` characters. When a chunk is emitted, a trailing run of
    /// parts totalling at most `chunk_overlap` characters is carried into
    /// the next chunk.
    fn merge_parts(&self, parts: &[&str], sep: &str) -> Vec<String> {
        let sep_len = sep.chars().count();
        let mut docs = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for part in parts {
            let part_len = part.chars().count();

            if total > 0 && total + sep_len + part_len > self.chunk_size {
                if let Some(doc) = join_parts(&window, sep) {
                    docs.push(doc);
                }
                // Shed leading parts until the remainder fits the overlap
                // budget and leaves room for the incoming part.
                while total > self.chunk_overlap
                    || (total > 0 && total + sep_len + part_len > self.chunk_size)
                {
                    let first_len = window[0].chars().count();
                    total -= first_len + if window.len() > 1 { sep_len } else { 0 };
                    window.remove(0);
                }
            }

            if !window.is_empty() {
                total += sep_len;
            }
            total += part_len;
            window.push(part);
        }

        if let Some(doc) = join_parts(&window, sep) {
            docs.push(doc);
        }

        docs
    }

    /// Fixed-size character windows for text with no usable separator.
    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);
        let mut out = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let piece: String = chars[start..end].iter().collect();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }

        out
    }
}

fn join_parts(window: &[&str], sep: &str) -> Option<String> {
    if window.is_empty() {
        return None;
    }
    let joined = window.join(sep);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A slice of page text stored for retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub content: String,
    pub chunk_index: usize,
}

/// Paragraph-first chunker for care-plan pages.
/// Paragraphs are packed up to `max_chunk_chars`; consecutive chunks share
/// `overlap_chars` of trailing context. Oversized paragraphs are split near
/// sentence boundaries.
pub struct CarePlanChunker {
    max_chunk_chars: usize,
    min_chunk_chars: usize,
    overlap_chars: usize,
}

impl CarePlanChunker {
    pub fn new() -> Self {
        Self {
            max_chunk_chars: 1000,
            min_chunk_chars: 20,
            overlap_chars: 100,
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let mut pieces: Vec<String> = Vec::new();
        let mut current = String::new();

        for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            if para.len() > self.max_chunk_chars {
                if !current.trim().is_empty() {
                    pieces.push(current.trim().to_string());
                }
                current.clear();
                pieces.extend(split_long_paragraph(
                    para,
                    self.max_chunk_chars,
                    self.overlap_chars,
                ));
                continue;
            }

            if current.len() + para.len() > self.max_chunk_chars && !current.is_empty() {
                let carried = tail(&current, self.overlap_chars).to_string();
                pieces.push(current.trim().to_string());
                current = carried;
            }
            current.push_str(para);
            current.push_str("\n\n");
        }

        if !current.trim().is_empty() {
            pieces.push(current.trim().to_string());
        }

        merge_tiny_pieces(&mut pieces, self.min_chunk_chars);
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| TextChunk {
                content,
                chunk_index,
            })
            .collect()
    }
}

impl Default for CarePlanChunker {
    fn default() -> Self {
        Self::new()
    }
}

fn floor_char_boundary(s: &str, idx: usize) -> usize {
    let mut idx = idx.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Last `n` bytes of `s`, widened to a char boundary.
fn tail(s: &str, n: usize) -> &str {
    if s.len() <= n {
        return "";
    }
    &s[floor_char_boundary(s, s.len() - n)..]
}

fn split_long_paragraph(para: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < para.len() {
        let end = floor_char_boundary(para, start + max_chars);

        // Prefer a sentence break in the last fifth of the window.
        let break_at = if end < para.len() {
            let search_start = floor_char_boundary(para, start + max_chars * 4 / 5);
            para[search_start..end]
                .rfind(". ")
                .map(|pos| search_start + pos + 2)
                .unwrap_or(end)
        } else {
            end
        };

        let piece = para[start..break_at].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        if break_at >= para.len() {
            break;
        }

        let next = floor_char_boundary(para, break_at.saturating_sub(overlap));
        start = if next > start { next } else { break_at };
    }

    pieces
}

fn merge_tiny_pieces(pieces: &mut Vec<String>, min_chars: usize) {
    let mut i = 0;
    while i < pieces.len() {
        if pieces[i].len() < min_chars && i + 1 < pieces.len() {
            let next = pieces.remove(i + 1);
            pieces[i].push_str("\n\n");
            pieces[i].push_str(&next);
        } else {
            i += 1;
        }
    }
}

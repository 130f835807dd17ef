use std::collections::HashSet;

use crate::models::DocumentChunk;

/// Chunks handed to the model per question.
pub const DEFAULT_TOP_K: usize = 4;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "what", "when", "where", "which", "who", "how",
    "can", "should", "would", "could", "does", "did", "have", "has", "had", "you", "your", "my",
    "mine", "our", "this", "that", "these", "those", "with", "from", "into", "about", "any",
    "not", "but", "all", "its", "his", "her", "they", "them", "there", "then", "than", "will",
    "may", "might", "must", "also", "just", "some", "get", "got", "take", "today",
];

/// Ranks chunks by how many distinct query terms they contain.
pub struct KeywordRetriever {
    top_k: usize,
}

impl KeywordRetriever {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Best `top_k` chunks, highest score first, ties in stored order.
    /// When no chunk shares a term with the query, the first `top_k` chunks
    /// are returned so general questions still see the plan.
    pub fn retrieve<'a>(&self, query: &str, chunks: &'a [DocumentChunk]) -> Vec<&'a DocumentChunk> {
        let terms = tokenize(query);

        let mut scored: Vec<(usize, usize)> = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let words = tokenize(&chunk.content);
                (i, terms.intersection(&words).count())
            })
            .filter(|(_, score)| *score > 0)
            .collect();

        if scored.is_empty() {
            return chunks.iter().take(self.top_k).collect();
        }

        // Stable sort keeps stored order among equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
            .into_iter()
            .take(self.top_k)
            .map(|(i, _)| &chunks[i])
            .collect()
    }
}

impl Default for KeywordRetriever {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

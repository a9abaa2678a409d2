//! Inverted word index over todo titles.
//!
//! # Invariants
//! - Every indexed id has exactly one entry in `doc_lengths` and one posting
//!   per distinct word of its title.
//! - `remove` followed by `insert` is how a retitled todo is reindexed.

use std::collections::{HashMap, HashSet};

use crate::types::TodoId;

/// Split text into lowercase alphanumeric words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[derive(Debug, Default)]
pub struct TextIndex {
    postings: HashMap<String, HashMap<TodoId, u32>>,
    doc_lengths: HashMap<TodoId, u32>,
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }

    pub fn insert(&mut self, id: TodoId, text: &str) {
        let words = tokenize(text);
        let length = u32::try_from(words.len()).unwrap_or(u32::MAX);
        for word in words {
            *self.postings.entry(word).or_default().entry(id).or_insert(0) += 1;
        }
        self.doc_lengths.insert(id, length);
    }

    pub fn remove(&mut self, id: TodoId, text: &str) {
        for word in tokenize(text) {
            if let Some(docs) = self.postings.get_mut(&word) {
                docs.remove(&id);
                if docs.is_empty() {
                    self.postings.remove(&word);
                }
            }
        }
        self.doc_lengths.remove(&id);
    }

    /// Score every document sharing at least one word with `query`.
    ///
    /// A document's score is the sum, over distinct query words it contains,
    /// of that word's occurrences divided by the document's word count.
    /// Output order is unspecified.
    pub fn search(&self, query: &str) -> Vec<(TodoId, f64)> {
        let terms: HashSet<String> = tokenize(query).into_iter().collect();
        let mut scores: HashMap<TodoId, f64> = HashMap::new();
        for term in &terms {
            let Some(docs) = self.postings.get(term) else {
                continue;
            };
            for (id, occurrences) in docs {
                let length = self.doc_lengths.get(id).copied().unwrap_or(1).max(1);
                *scores.entry(*id).or_insert(0.0) += f64::from(*occurrences) / f64::from(length);
            }
        }
        scores.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn id(n: u128) -> TodoId {
        TodoId::from(Uuid::from_u128(n))
    }

    #[test]
    fn tokenize_lowercases_and_drops_punctuation() {
        assert_eq!(tokenize("Buy MILK, eggs & bread!"), ["buy", "milk", "eggs", "bread"]);
        assert!(tokenize("  --  ").is_empty());
    }

    #[test]
    fn search_matches_any_shared_word() {
        let mut index = TextIndex::new();
        index.insert(id(1), "Walk the dog");
        index.insert(id(2), "Feed the cat");
        index.insert(id(3), "Pay rent");

        let mut hits: Vec<TodoId> = index.search("dog cat").into_iter().map(|(id, _)| id).collect();
        hits.sort();
        assert_eq!(hits, [id(1), id(2)]);
    }

    #[test]
    fn denser_match_scores_higher() {
        let mut index = TextIndex::new();
        index.insert(id(1), "groceries");
        index.insert(id(2), "groceries for the weekend party");

        let hits: HashMap<TodoId, f64> = index.search("groceries").into_iter().collect();
        assert!(hits[&id(1)] > hits[&id(2)]);
    }

    #[test]
    fn remove_clears_postings() {
        let mut index = TextIndex::new();
        index.insert(id(1), "Walk the dog");
        index.remove(id(1), "Walk the dog");

        assert!(index.search("dog").is_empty());
        assert!(index.is_empty());
        assert!(index.postings.is_empty());
    }

    #[test]
    fn query_without_words_matches_nothing() {
        let mut index = TextIndex::new();
        index.insert(id(1), "Walk the dog");
        assert!(index.search("!!!").is_empty());
    }
}

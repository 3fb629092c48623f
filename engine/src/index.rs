use crate::analyze::Analyzer;
use crate::doc_id::DocId;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Term -> sorted, duplicate-free document ids.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<DocId>>,
}

/// Term -> document -> ascending 0-based positions.
///
/// Positions are ordinals into the document's *filtered* term sequence, not
/// offsets into the raw text: a term that is the 5th raw token but 2nd
/// surviving token sits at position 1.
#[derive(Debug, Default)]
pub struct PositionalIndex {
    postings: HashMap<String, BTreeMap<DocId, Vec<u32>>>,
}

/// Accumulates processed documents, then freezes them into [`Indexes`].
///
/// Accumulation is the only mutable phase; once `build` runs, the indexes
/// are read-only for the life of the process, which is what makes query
/// evaluation safe to run in parallel without locks.
pub struct IndexBuilder<'a> {
    analyzer: &'a Analyzer,
    processed: BTreeMap<DocId, Vec<String>>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(analyzer: &'a Analyzer) -> Self {
        Self { analyzer, processed: BTreeMap::new() }
    }

    /// Analyze and stage one document. Re-adding an id replaces the earlier
    /// staging (last write wins); callers that care must keep ids unique.
    pub fn add_document(&mut self, id: DocId, text: &str) {
        self.processed.insert(id, self.analyzer.process(text));
    }

    /// Freeze the staged documents into immutable indexes.
    pub fn build(self) -> Indexes {
        let num_docs = self.processed.len();
        let mut inverted: HashMap<String, BTreeSet<DocId>> = HashMap::new();
        let mut positional: HashMap<String, BTreeMap<DocId, Vec<u32>>> = HashMap::new();

        for (id, terms) in &self.processed {
            for (pos, term) in terms.iter().enumerate() {
                inverted
                    .entry(term.clone())
                    .or_default()
                    .insert(id.clone());
                positional
                    .entry(term.clone())
                    .or_default()
                    .entry(id.clone())
                    .or_default()
                    // Positions arrive in ascending order from the single
                    // left-to-right scan.
                    .push(pos as u32);
            }
        }

        let postings = inverted
            .into_iter()
            .map(|(term, docs)| (term, docs.into_iter().collect::<Vec<_>>()))
            .collect();

        tracing::debug!(num_docs, "indexes frozen");
        Indexes {
            inverted: InvertedIndex { postings },
            positional: PositionalIndex { postings: positional },
            num_docs,
        }
    }
}

/// The frozen pair of indexes. All accessors are read-only; every term in
/// the inverted index has exactly the same document set in the positional
/// index.
pub struct Indexes {
    inverted: InvertedIndex,
    positional: PositionalIndex,
    num_docs: usize,
}

impl Indexes {
    /// Sorted posting list for a stemmed term; empty for unknown terms.
    pub fn postings(&self, term: &str) -> &[DocId] {
        self.inverted
            .postings
            .get(term)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Per-document position lists for a stemmed term.
    pub fn positions(&self, term: &str) -> Option<&BTreeMap<DocId, Vec<u32>>> {
        self.positional.postings.get(term)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.inverted.postings.keys().map(String::as_str)
    }

    pub fn num_terms(&self) -> usize {
        self.inverted.postings.len()
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }
}

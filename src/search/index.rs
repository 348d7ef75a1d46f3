//! TF-IDF inverted index with term positions.

use super::query::{Presence, Query, TermMatch};
use super::scoring::{inverse_document_frequency, term_frequency};
use super::tokenize::{Position, tokenize_and_stem};
use crate::error::QueryError;
use crate::sitemap::{Field, PageDocument};
use ahash::{AHashMap, AHashSet};
use rapidfuzz::distance::levenshtein;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Per-term, per-field match positions of one result: term → field → positions.
pub type MatchData = BTreeMap<String, BTreeMap<Field, Vec<Position>>>;

/// A ranked query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Link of the matching document.
    #[serde(rename = "ref")]
    pub reference: String,
    pub score: f32,
    #[serde(rename = "matchData")]
    pub match_data: MatchData,
}

impl SearchResult {
    /// Total number of match positions over all terms and fields.
    pub fn match_count(&self) -> usize {
        self.match_data
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

/// Occurrences of one term in one field of one document.
#[derive(Debug, Clone)]
struct Posting {
    doc: usize,
    field: Field,
    positions: Vec<Position>,
    score: f32,
}

/// A searchable term index over the title, description and content of every page.
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    /// Vocabulary in sorted order (for prefix scans) with postings sorted by (doc, field)
    terms: BTreeMap<String, Vec<Posting>>,
    /// Map from document index to its link
    refs: Vec<String>,
}

impl InvertedIndex {
    /// Builds an index over `documents`, using each document's link as its reference.
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a PageDocument>) -> Self {
        let mut builder = IndexBuilder::default();
        for document in documents {
            builder.add(document);
        }
        builder.finalize()
    }

    /// Get the number of unique terms in the index
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Get the number of documents in the index
    pub fn document_count(&self) -> usize {
        self.refs.len()
    }

    /// Parses and runs `query`. See [`Query`] for the grammar.
    ///
    /// The query is tokenized and stemmed just like indexed text, so "searching" matches
    /// pages containing "search" or "searches".
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, QueryError> {
        let stemmer = Stemmer::create(Algorithm::English);
        let query = Query::parse(query, &stemmer)?;
        Ok(self.execute(&query))
    }

    /// Runs a parsed query, returning results sorted by score descending.
    pub fn execute(&self, query: &Query) -> Vec<SearchResult> {
        let mut scores: AHashMap<usize, f32> = AHashMap::new();
        let mut match_data: AHashMap<usize, MatchData> = AHashMap::new();
        let mut required: Vec<AHashSet<usize>> = vec![];
        let mut prohibited: AHashSet<usize> = AHashSet::new();

        for clause in &query.clauses {
            let mut clause_docs = AHashSet::new();

            for (term, postings) in self.expand(&clause.term, clause.matching) {
                for posting in postings
                    .iter()
                    .filter(|p| clause.field.is_none_or(|field| field == p.field))
                {
                    clause_docs.insert(posting.doc);
                    if clause.presence == Presence::Prohibited {
                        continue;
                    }

                    *scores.entry(posting.doc).or_insert(0.0) += posting.score * clause.boost;
                    match_data
                        .entry(posting.doc)
                        .or_default()
                        .entry(term.clone())
                        .or_default()
                        .entry(posting.field)
                        .or_insert_with(|| posting.positions.clone());
                }
            }

            match clause.presence {
                Presence::Required => required.push(clause_docs),
                Presence::Prohibited => prohibited.extend(clause_docs),
                Presence::Optional => {}
            }
        }

        if query.is_only_prohibited() {
            for doc in 0..self.refs.len() {
                scores.entry(doc).or_insert(0.0);
            }
        }

        let mut results: Vec<(usize, f32)> = scores
            .into_iter()
            .filter(|(doc, _)| !prohibited.contains(doc))
            .filter(|(doc, _)| required.iter().all(|docs| docs.contains(doc)))
            .collect();

        // Sort by score descending, then by document order for determinism
        results.sort_by(|(doc_a, a), (doc_b, b)| b.total_cmp(a).then(doc_a.cmp(doc_b)));

        results
            .into_iter()
            .map(|(doc, score)| SearchResult {
                reference: self.refs[doc].clone(),
                score,
                match_data: match_data.remove(&doc).unwrap_or_default(),
            })
            .collect()
    }

    /// Vocabulary entries matched by a clause term.
    fn expand<'s>(&'s self, term: &str, matching: TermMatch) -> Vec<(&'s String, &'s Vec<Posting>)> {
        match matching {
            TermMatch::Exact => self.terms.get_key_value(term).into_iter().collect(),
            TermMatch::Prefix => self
                .terms
                .range::<str, _>((Bound::Included(term), Bound::Unbounded))
                .take_while(|(candidate, _)| candidate.starts_with(term))
                .collect(),
            TermMatch::Fuzzy(distance) => {
                let max = usize::from(distance);
                self.terms
                    .iter()
                    .filter(|(candidate, _)| {
                        levenshtein::distance(candidate.chars(), term.chars()) <= max
                    })
                    .collect()
            }
        }
    }
}

/// Builder for accumulating postings before TF-IDF finalization.
pub(crate) struct IndexBuilder {
    postings: BTreeMap<String, Vec<Posting>>,
    refs: Vec<String>,
    /// Per document, the number of terms in each field (for length normalization)
    field_lengths: Vec<[usize; 3]>,
    /// Reusable stemmer instance for English language stemming
    stemmer: Stemmer,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            postings: BTreeMap::new(),
            refs: Vec::new(),
            field_lengths: Vec::new(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl IndexBuilder {
    /// Tokenizes every field of `document` and records its postings.
    pub(crate) fn add(&mut self, document: &PageDocument) {
        let doc = self.refs.len();
        self.refs.push(document.link.clone());

        let mut lengths = [0; 3];
        for field in Field::ALL {
            let tokens = tokenize_and_stem(document.field(field), &self.stemmer);
            lengths[field.index()] = tokens.len();

            // Group positions by term using AHashMap for O(1) operations
            let mut grouped: AHashMap<String, Vec<Position>> = AHashMap::with_capacity(tokens.len());
            for token in tokens {
                grouped.entry(token.term).or_default().push(token.position);
            }

            for (term, positions) in grouped {
                self.postings.entry(term).or_default().push(Posting {
                    doc,
                    field,
                    positions,
                    score: 0.0,
                });
            }
        }
        self.field_lengths.push(lengths);
    }

    /// Calculates IDF scores and produces the final searchable index.
    /// Each posting scores `tf(count, field length) * idf(term)`.
    pub(crate) fn finalize(self) -> InvertedIndex {
        let start = std::time::Instant::now();
        let total_docs = self.refs.len();

        // Average length of each field for normalization
        let mut avg_lengths = [1.0f32; 3];
        if total_docs > 0 {
            for field in Field::ALL {
                let total: usize = self.field_lengths.iter().map(|l| l[field.index()]).sum();
                avg_lengths[field.index()] = total as f32 / total_docs as f32;
            }
        }

        let mut total_postings = 0;
        let mut terms = self.postings;
        for postings in terms.values_mut() {
            postings.sort_by_key(|p| (p.doc, p.field));
            total_postings += postings.len();

            let mut doc_freq = postings.iter().map(|p| p.doc).collect::<Vec<_>>();
            doc_freq.dedup();
            let idf = inverse_document_frequency(total_docs, doc_freq.len());

            for posting in postings.iter_mut() {
                let field_len = self.field_lengths[posting.doc][posting.field.index()];
                let tf = term_frequency(
                    posting.positions.len(),
                    field_len,
                    avg_lengths[posting.field.index()],
                    posting.field,
                );
                posting.score = tf * idf;
            }
        }

        let index = InvertedIndex {
            terms,
            refs: self.refs,
        };

        tracing::info!(
            "Built search index: {} unique terms, {} documents, {} postings in {:?}",
            index.term_count(),
            index.document_count(),
            total_postings,
            start.elapsed()
        );

        index
    }
}

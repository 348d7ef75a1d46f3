//! Query grammar.
//!
//! A query is a whitespace-separated list of clauses. Each clause is a term with optional
//! modifiers:
//!
//! | Syntax        | Meaning                                           |
//! |---------------|---------------------------------------------------|
//! | `+term`       | documents must match the term                     |
//! | `-term`       | documents must not match the term                 |
//! | `title:term`  | only match in the given field                     |
//! | `term*`       | prefix match (the term is not stemmed)            |
//! | `term~2`      | match terms within an edit distance of 2          |
//! | `term^10`     | multiply the clause's score contribution by 10    |
//!
//! Terms are normalized and stemmed like indexed text, so `searching` finds `search`.

use super::tokenize::{normalize_piece, tokenize_and_stem};
use crate::error::QueryError;
use crate::sitemap::Field;
use rust_stemmers::Stemmer;

/// Whether a clause must, may, or must not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Optional,
    Required,
    Prohibited,
}

/// How a clause's term is compared against the index vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermMatch {
    Exact,
    Prefix,
    Fuzzy(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub term: String,
    pub field: Option<Field>,
    pub presence: Presence,
    pub matching: TermMatch,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

impl Query {
    /// Parses query text. Pieces that normalize to nothing (punctuation, stop words) are
    /// dropped, so the result may have no clauses.
    pub fn parse(text: &str, stemmer: &Stemmer) -> Result<Self, QueryError> {
        let mut clauses = vec![];
        for piece in text.split_whitespace() {
            parse_clause(piece, stemmer, &mut clauses)?;
        }
        Ok(Self { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// True when every clause is prohibited; such a query matches all other documents.
    pub fn is_only_prohibited(&self) -> bool {
        !self.clauses.is_empty()
            && self
                .clauses
                .iter()
                .all(|clause| clause.presence == Presence::Prohibited)
    }
}

fn parse_clause(piece: &str, stemmer: &Stemmer, clauses: &mut Vec<Clause>) -> Result<(), QueryError> {
    let mut rest = piece;

    let presence = if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
        Presence::Required
    } else if let Some(stripped) = rest.strip_prefix('-') {
        rest = stripped;
        Presence::Prohibited
    } else {
        Presence::Optional
    };

    let mut field = None;
    if let Some((name, term)) = rest.split_once(':') {
        field = Some(Field::parse(name).ok_or_else(|| QueryError::UnknownField {
            field: name.to_string(),
            clause: piece.to_string(),
        })?);
        rest = term;
    }

    let mut boost = 1.0;
    if let Some((term, value)) = rest.rsplit_once('^') {
        boost = value
            .parse::<f32>()
            .ok()
            .filter(|b| b.is_finite() && *b >= 0.0)
            .ok_or_else(|| QueryError::InvalidBoost {
                clause: piece.to_string(),
            })?;
        rest = term;
    }

    let mut matching = TermMatch::Exact;
    if let Some((term, value)) = rest.rsplit_once('~') {
        let distance = value
            .parse::<u8>()
            .map_err(|_| QueryError::InvalidEditDistance {
                clause: piece.to_string(),
            })?;
        matching = TermMatch::Fuzzy(distance);
        rest = term;
    }

    if let Some(term) = rest.strip_suffix('*') {
        matching = TermMatch::Prefix;
        rest = term;
    }

    if rest.is_empty() {
        return Err(QueryError::MissingTerm {
            clause: piece.to_string(),
        });
    }

    let make = |term: String| Clause {
        term,
        field,
        presence,
        matching,
        boost,
    };

    match matching {
        // Prefixes are compared against stemmed vocabulary as typed; stemming "config"
        // would not yield a prefix of "configur".
        TermMatch::Prefix => clauses.extend(normalize_piece(rest).map(make)),
        TermMatch::Exact | TermMatch::Fuzzy(_) => clauses.extend(
            tokenize_and_stem(rest, stemmer)
                .into_iter()
                .map(|token| make(token.term)),
        ),
    }

    Ok(())
}

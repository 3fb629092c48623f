use crate::analyze::{word_tokens, Analyzer};
use crate::doc_id::DocId;
use crate::index::Indexes;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Document -> term -> positions that took part in a qualifying proximity
/// pair. Used by front ends for highlighting; empty for boolean queries.
pub type MatchedPositions = BTreeMap<DocId, BTreeMap<String, BTreeSet<u32>>>;

/// Malformed proximity queries. Boolean queries never fail to parse, and a
/// syntax error never touches index state; callers surface it as an empty
/// result plus the diagnostic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("proximity query needs two terms")]
    MissingTerms,
    #[error("invalid proximity distance: {0:?}")]
    BadDistance(String),
}

/// A routed query, ready for its evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuery {
    /// Raw word tokens, operator words included. The boolean evaluator
    /// inspects each token itself; nothing is pre-classified here.
    Boolean(Vec<String>),
    /// Two terms and a signed distance. Negative k is syntactically legal
    /// and simply never matches.
    Proximity { term1: String, term2: String, k: i64 },
}

/// Route and parse a raw query string: a `/` anywhere makes it a proximity
/// query, otherwise it is boolean.
pub fn parse(raw: &str) -> Result<ParsedQuery, QueryError> {
    if raw.contains('/') {
        parse_proximity(raw)
    } else {
        Ok(ParsedQuery::Boolean(word_tokens(raw)))
    }
}

/// Parse a proximity query in either surface form.
///
/// Slash form (`cat sat / 2`): the left side of the first `/` must hold at
/// least two words (extras ignored) and the right side, trimmed, must be a
/// signed integer. There is no fallback to boolean parsing on failure.
///
/// Space form (`cat sat 2`): at least three whitespace tokens, the third an
/// integer, extras ignored. [`parse`] never reaches this branch (its `/`
/// routing makes the slash branch take precedence), but it is kept for
/// callers that dispatch to the proximity evaluator themselves.
pub fn parse_proximity(raw: &str) -> Result<ParsedQuery, QueryError> {
    if let Some((left, right)) = raw.split_once('/') {
        let terms = word_tokens(left);
        if terms.len() < 2 {
            return Err(QueryError::MissingTerms);
        }
        let k = right
            .trim()
            .parse::<i64>()
            .map_err(|_| QueryError::BadDistance(right.trim().to_owned()))?;
        Ok(ParsedQuery::Proximity {
            term1: terms[0].clone(),
            term2: terms[1].clone(),
            k,
        })
    } else {
        let tokens = word_tokens(raw);
        if tokens.len() < 3 {
            return Err(QueryError::MissingTerms);
        }
        let k = tokens[2]
            .parse::<i64>()
            .map_err(|_| QueryError::BadDistance(tokens[2].clone()))?;
        Ok(ParsedQuery::Proximity {
            term1: tokens[0].clone(),
            term2: tokens[1].clone(),
            k,
        })
    }
}

#[derive(Clone, Copy)]
enum Op {
    And,
    Or,
    Not,
}

/// Fold a boolean token stream left to right against the inverted index.
///
/// One pending-operator slot, no precedence, no parentheses. `AND`, `OR`
/// and `NOT` (any casing) set the slot, overwriting an unconsumed operator,
/// and are never looked up as terms. The first term seeds the accumulator
/// and discards any pending operator, so a leading `NOT term` behaves like
/// plain `term`, not negation of the universe. Consecutive terms with no
/// operator between them default to `AND`.
pub fn evaluate_boolean(
    tokens: &[String],
    indexes: &Indexes,
    analyzer: &Analyzer,
) -> BTreeSet<DocId> {
    let mut acc: Option<BTreeSet<DocId>> = None;
    let mut pending: Option<Op> = None;

    for token in tokens {
        match token.to_uppercase().as_str() {
            "AND" => {
                pending = Some(Op::And);
                continue;
            }
            "OR" => {
                pending = Some(Op::Or);
                continue;
            }
            "NOT" => {
                pending = Some(Op::Not);
                continue;
            }
            _ => {}
        }

        let term = analyzer.stem_term(token);
        let posting: BTreeSet<DocId> = indexes.postings(&term).iter().cloned().collect();
        acc = Some(match acc {
            None => posting,
            Some(current) => match pending.unwrap_or(Op::And) {
                Op::And => current.intersection(&posting).cloned().collect(),
                Op::Or => current.union(&posting).cloned().collect(),
                Op::Not => current.difference(&posting).cloned().collect(),
            },
        });
        pending = None;
    }

    acc.unwrap_or_default()
}

/// Match two terms' position lists within distance `k`.
///
/// A pair of positions qualifies when `|p1 - p2| <= k` and `p1 != p2`, so
/// k <= 0 can never match. Every position that takes part in any qualifying
/// pair lands in the matched-position sets; that union is deliberately
/// over-inclusive (no minimal 1-to-1 pairing is computed).
pub fn evaluate_proximity(
    term1: &str,
    term2: &str,
    k: i64,
    indexes: &Indexes,
    analyzer: &Analyzer,
) -> (BTreeSet<DocId>, MatchedPositions) {
    let t1 = analyzer.stem_term(term1);
    let t2 = analyzer.stem_term(term2);

    let mut docs = BTreeSet::new();
    let mut matched = MatchedPositions::new();

    let (Some(map1), Some(map2)) = (indexes.positions(&t1), indexes.positions(&t2)) else {
        return (docs, matched);
    };

    for (doc, positions1) in map1 {
        let Some(positions2) = map2.get(doc) else {
            continue;
        };

        let mut hits1: BTreeSet<u32> = BTreeSet::new();
        let mut hits2: BTreeSet<u32> = BTreeSet::new();
        for &p1 in positions1 {
            for &p2 in positions2 {
                if p1 != p2 && (i64::from(p1) - i64::from(p2)).abs() <= k {
                    hits1.insert(p1);
                    hits2.insert(p2);
                }
            }
        }

        if !hits1.is_empty() {
            docs.insert(doc.clone());
            let by_term = matched.entry(doc.clone()).or_default();
            by_term.entry(t1.clone()).or_default().extend(hits1);
            by_term.entry(t2.clone()).or_default().extend(hits2);
        }
    }

    (docs, matched)
}

/// Result of one query: the matching documents, and for proximity queries
/// the positions that matched. Each query allocates a fresh result; nothing
/// persists between queries.
#[derive(Debug, PartialEq, Eq)]
pub struct QueryResult {
    pub docs: BTreeSet<DocId>,
    pub matched: MatchedPositions,
}

/// The single query entry point: route, parse, evaluate.
///
/// Pure function of (query, indexes, analyzer) with no shared mutable
/// state, so concurrent callers may dispatch against the same frozen
/// indexes freely.
pub fn process_query(
    raw: &str,
    indexes: &Indexes,
    analyzer: &Analyzer,
) -> Result<QueryResult, QueryError> {
    match parse(raw)? {
        ParsedQuery::Boolean(tokens) => Ok(QueryResult {
            docs: evaluate_boolean(&tokens, indexes, analyzer),
            matched: MatchedPositions::new(),
        }),
        ParsedQuery::Proximity { term1, term2, k } => {
            let (docs, matched) = evaluate_proximity(&term1, &term2, k, indexes, analyzer);
            Ok(QueryResult { docs, matched })
        }
    }
}

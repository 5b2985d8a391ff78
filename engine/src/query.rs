//! Tiered, phrase-biased query evaluation.
//!
//! Tiers run from the full query length down to single terms: a tier's
//! candidates are the union over every contiguous term window of that size
//! of the intersection of the windowed terms' document sets. Longer windows
//! approximate longer contiguous phrases, so their documents are ranked and
//! emitted first; evaluation stops as soon as K results are collected.

use crate::builder::tf_idf;
use crate::index::{DocRef, Index};
use crate::tokenizer::is_stopword;
use std::cmp::Ordering;
use std::collections::HashSet;

pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub score: f64,
    pub doc: DocRef,
}

/// Lowercase and whitespace-split a raw query, dropping stopwords and terms
/// the index has never seen. Order (and repeats) of the surviving terms are
/// preserved.
pub fn trim_terms(index: &Index, query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| !is_stopword(t))
        .filter(|t| index.contains_term(t))
        .collect()
}

/// Answer a raw query string with at most `k` scored documents, best first.
pub fn search(index: &Index, query: &str, k: usize) -> Vec<SearchHit> {
    let terms = trim_terms(index, query);
    search_terms(index, &terms, k)
}

/// Tier driver over an already-filtered term list. A query that filters down
/// to nothing returns an empty list; exhausting every tier with fewer than
/// `k` hits returns what was found.
pub fn search_terms(index: &Index, terms: &[String], k: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    if terms.is_empty() || k == 0 {
        return hits;
    }
    let mut seen: HashSet<DocRef> = HashSet::new();
    for window in (1..=terms.len()).rev() {
        let tier = tier_candidates(index, terms, window);
        if tier.is_empty() {
            continue;
        }
        tracing::debug!(window, candidates = tier.len(), "ranking tier");
        rank_tier(index, terms, &tier, k, &mut hits, &mut seen);
        if hits.len() == k {
            break;
        }
    }
    hits
}

/// Union of the per-window intersections at one window size.
fn tier_candidates(index: &Index, terms: &[String], window: usize) -> HashSet<DocRef> {
    let mut tier = HashSet::new();
    for term_window in terms.windows(window) {
        tier.extend(window_intersection(index, term_window));
    }
    tier
}

/// Documents containing every term of one contiguous window. Starts from the
/// smallest document set in the window to keep the intersection cheap.
fn window_intersection(index: &Index, term_window: &[String]) -> HashSet<DocRef> {
    let Some((min_term, mut candidates)) = min_set(index, term_window) else {
        return HashSet::new();
    };
    for term in term_window {
        if term.as_str() == min_term {
            continue;
        }
        match index.postings(term) {
            Some(list) => candidates.retain(|doc| list.contains(*doc)),
            None => return HashSet::new(),
        }
        if candidates.is_empty() {
            break;
        }
    }
    candidates
}

/// The window term with the smallest document frequency and its document
/// set. Ties go to the earliest such term in window order.
fn min_set<'a>(index: &Index, term_window: &'a [String]) -> Option<(&'a str, HashSet<DocRef>)> {
    let mut best: Option<(&'a str, usize)> = None;
    for term in term_window {
        let df = index.postings(term)?.document_frequency();
        // strict less-than keeps the first term on a tie
        if best.map_or(true, |(_, b)| df < b) {
            best = Some((term, df));
        }
    }
    let (term, _) = best?;
    Some((term, index.postings(term)?.document_set()))
}

/// Score one tier's candidates and append them to the running result list in
/// descending score order (ties broken by ascending `DocRef`), skipping
/// documents already emitted by a higher tier, until `k` hits exist.
fn rank_tier(
    index: &Index,
    terms: &[String],
    tier: &HashSet<DocRef>,
    k: usize,
    hits: &mut Vec<SearchHit>,
    seen: &mut HashSet<DocRef>,
) {
    let total_docs = index.document_count();
    let q_norm = query_norm(index, terms, total_docs);
    let mut ranked: Vec<SearchHit> = tier
        .iter()
        .map(|&doc| SearchHit {
            score: score_document(index, terms, doc, q_norm, total_docs),
            doc,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.doc.cmp(&b.doc))
    });
    for hit in ranked {
        if hits.len() == k {
            return;
        }
        if seen.insert(hit.doc) {
            hits.push(hit);
        }
    }
}

/// Norm of the query pseudo-document: every term occurs once in a document
/// whose length is the query length. Repeated query terms contribute once
/// per occurrence.
fn query_norm(index: &Index, terms: &[String], total_docs: usize) -> f64 {
    let query_len = terms.len() as u32;
    let mut sum = 0.0;
    for term in terms {
        if let Some(list) = index.postings(term) {
            let w = tf_idf(1, query_len, list.document_frequency(), total_docs);
            sum += w * w;
        }
    }
    sum.sqrt()
}

/// Restricted cosine similarity over the query-term dimensions only, plus a
/// flat bonus per query term that appears in the document under a "title"
/// tag. The document norm covers the distinct query terms the document
/// actually contains, not its full vocabulary.
fn score_document(
    index: &Index,
    terms: &[String],
    doc: DocRef,
    q_norm: f64,
    total_docs: usize,
) -> f64 {
    let Some(doc_terms) = index.document_terms(doc) else {
        return 0.0;
    };
    let query_len = terms.len() as u32;
    let mut dot = 0.0;
    let mut bonus = 0.0;
    for term in terms {
        let Some(list) = index.postings(term) else {
            continue;
        };
        if !doc_terms.contains(term.as_str()) {
            continue;
        }
        if let Some(posting) = list.get(doc) {
            let q_w = tf_idf(1, query_len, list.document_frequency(), total_docs);
            dot += q_w * posting.tf_idf;
            if posting.tags.contains("title") {
                bonus += 0.10;
            }
        }
    }

    let mut norm_sq = 0.0;
    let distinct: HashSet<&str> = terms.iter().map(String::as_str).collect();
    for term in distinct {
        if !doc_terms.contains(term) {
            continue;
        }
        if let Some(posting) = index.postings(term).and_then(|l| l.get(doc)) {
            norm_sq += posting.tf_idf * posting.tf_idf;
        }
    }

    let full_norm = q_norm * norm_sq.sqrt();
    let cosine = if full_norm == 0.0 { 0.0 } else { dot / full_norm };
    cosine + bonus
}

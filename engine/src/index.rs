use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// (partition, sequence) pair identifying one corpus document.
/// Ordered lexicographically, partition first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocRef {
    pub partition: u32,
    pub sequence: u32,
}

impl DocRef {
    pub fn new(partition: u32, sequence: u32) -> Self {
        Self { partition, sequence }
    }
}

impl fmt::Display for DocRef {
    /// The "partition/sequence" form used by the bookkeeping URL table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.sequence)
    }
}

/// One term's occurrence record within one document.
///
/// `tf_idf` stays 0 until the builder's finalize pass runs; the raw term
/// frequency and tag set grow during the corpus scan and are frozen after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc: DocRef,
    pub raw_tf: u32,
    pub tags: HashSet<String>,
    pub tf_idf: f64,
}

impl Posting {
    pub fn new(doc: DocRef, raw_tf: u32) -> Self {
        Self { doc, raw_tf, tags: HashSet::new(), tf_idf: 0.0 }
    }

    pub fn add_tag(&mut self, tag: &str) {
        if !self.tags.contains(tag) {
            self.tags.insert(tag.to_string());
        }
    }
}

/// All postings for one term, keyed by document. At most one posting per
/// (term, document) pair; repeat occurrences mutate the stored posting.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PostingsList {
    postings: HashMap<DocRef, Posting>,
}

impl PostingsList {
    /// Upsert by document: a second push for the same `DocRef` replaces the
    /// first. Builders mutate the stored posting in place instead.
    pub fn push(&mut self, posting: Posting) {
        self.postings.insert(posting.doc, posting);
    }

    pub fn document_frequency(&self) -> usize {
        self.postings.len()
    }

    pub fn document_set(&self) -> HashSet<DocRef> {
        self.postings.keys().copied().collect()
    }

    pub fn contains(&self, doc: DocRef) -> bool {
        self.postings.contains_key(&doc)
    }

    pub fn get(&self, doc: DocRef) -> Option<&Posting> {
        self.postings.get(&doc)
    }

    pub fn get_mut(&mut self, doc: DocRef) -> Option<&mut Posting> {
        self.postings.get_mut(&doc)
    }

    /// Postings in ascending `DocRef` order, independent of insertion order.
    /// Sorts a snapshot of the values on each call.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &Posting> {
        let mut snapshot: Vec<&Posting> = self.postings.values().collect();
        snapshot.sort_by_key(|p| p.doc);
        snapshot.into_iter()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Posting> {
        self.postings.values_mut()
    }
}

/// The inverted index: term postings plus per-document length and
/// term-membership tables. Built once per corpus scan, read-only afterwards.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Index {
    pub(crate) terms: HashMap<String, PostingsList>,
    pub(crate) doc_lengths: HashMap<DocRef, u32>,
    pub(crate) doc_terms: HashMap<DocRef, HashSet<String>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh posting for `(term, doc)` carrying its own tag set.
    /// The stored value never aliases a caller's working posting.
    pub fn add_posting(&mut self, term: &str, doc: DocRef, raw_tf: u32, tag: &str) {
        let mut posting = Posting::new(doc, raw_tf);
        posting.add_tag(tag);
        self.terms.entry(term.to_string()).or_default().push(posting);
    }

    pub fn record_document_term(&mut self, doc: DocRef, term: &str) {
        self.doc_terms.entry(doc).or_default().insert(term.to_string());
    }

    /// Set the indexable-token count for a document. Callers only invoke
    /// this for documents that produced at least one token.
    pub fn record_document_length(&mut self, doc: DocRef, length: u32) {
        debug_assert!(length > 0);
        self.doc_lengths.insert(doc, length);
    }

    pub fn document_count(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn postings(&self, term: &str) -> Option<&PostingsList> {
        self.terms.get(term)
    }

    pub(crate) fn posting_mut(&mut self, term: &str, doc: DocRef) -> Option<&mut Posting> {
        self.terms.get_mut(term)?.get_mut(doc)
    }

    pub fn document_terms(&self, doc: DocRef) -> Option<&HashSet<String>> {
        self.doc_terms.get(&doc)
    }

    pub fn document_length(&self, doc: DocRef) -> Option<u32> {
        self.doc_lengths.get(&doc).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(p: u32, s: u32) -> DocRef {
        DocRef::new(p, s)
    }

    #[test]
    fn doc_ref_orders_partition_first() {
        assert!(doc(1, 9) < doc(2, 0));
        assert!(doc(1, 1) < doc(1, 2));
        assert_eq!(doc(3, 4).to_string(), "3/4");
    }

    #[test]
    fn push_upserts_by_document() {
        let mut list = PostingsList::default();
        list.push(Posting::new(doc(0, 1), 1));
        list.push(Posting::new(doc(0, 1), 5));
        assert_eq!(list.document_frequency(), 1);
        assert_eq!(list.get(doc(0, 1)).unwrap().raw_tf, 5);
    }

    #[test]
    fn iter_sorted_ignores_insertion_order() {
        let mut list = PostingsList::default();
        for (p, s) in [(2, 1), (0, 7), (1, 0), (0, 2), (2, 0)] {
            list.push(Posting::new(doc(p, s), 1));
        }
        let order: Vec<DocRef> = list.iter_sorted().map(|p| p.doc).collect();
        assert_eq!(
            order,
            vec![doc(0, 2), doc(0, 7), doc(1, 0), doc(2, 0), doc(2, 1)]
        );
        // restartable: a second traversal sees the same sequence
        let again: Vec<DocRef> = list.iter_sorted().map(|p| p.doc).collect();
        assert_eq!(order, again);
    }

    #[test]
    fn document_frequency_matches_document_set() {
        let mut list = PostingsList::default();
        list.push(Posting::new(doc(0, 1), 1));
        list.push(Posting::new(doc(0, 2), 1));
        list.push(Posting::new(doc(0, 1), 3));
        assert_eq!(list.document_frequency(), list.document_set().len());
    }

    #[test]
    fn add_posting_copies_tags_per_location() {
        let mut index = Index::new();
        index.add_posting("cat", doc(0, 1), 1, "p");
        index.add_posting("cat", doc(0, 2), 1, "title");
        let list = index.postings("cat").unwrap();
        assert!(list.get(doc(0, 1)).unwrap().tags.contains("p"));
        assert!(!list.get(doc(0, 1)).unwrap().tags.contains("title"));
        assert!(list.get(doc(0, 2)).unwrap().tags.contains("title"));
    }

    #[test]
    fn counts_reflect_only_populated_maps() {
        let mut index = Index::new();
        assert_eq!(index.term_count(), 0);
        assert_eq!(index.document_count(), 0);
        index.add_posting("cat", doc(0, 1), 1, "p");
        index.record_document_term(doc(0, 1), "cat");
        index.record_document_length(doc(0, 1), 1);
        assert_eq!(index.term_count(), 1);
        assert_eq!(index.document_count(), 1);
        assert!(index.postings("dog").is_none());
    }
}

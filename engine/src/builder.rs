use crate::index::{DocRef, Index};

/// Streaming index construction.
///
/// Phase 1: the corpus scanner feeds `add_token` once per token occurrence
/// and closes each document with `finish_document`. Phase 2: `finalize`
/// consumes the builder and stamps every posting with its tf-idf weight,
/// which needs the corpus-wide document count and per-term document
/// frequencies and therefore cannot run until the scan is complete.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: Index,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `term` in `doc`, tagged with the structural
    /// context it appeared in. First occurrence creates the posting; repeats
    /// bump the raw frequency and grow the tag set in place.
    pub fn add_token(&mut self, doc: DocRef, term: &str, tag: &str) {
        self.index.record_document_term(doc, term);
        match self.index.posting_mut(term, doc) {
            Some(posting) => {
                posting.raw_tf += 1;
                posting.add_tag(tag);
            }
            None => self.index.add_posting(term, doc, 1, tag),
        }
    }

    /// Close out a document. Documents that yielded no tokens get no length
    /// entry and never participate in finalize or scoring.
    pub fn finish_document(&mut self, doc: DocRef, length: u32) {
        if length > 0 {
            self.index.record_document_length(doc, length);
        }
    }

    /// Phase 2: compute `tf * idf` for every posting and hand back the
    /// finished, read-only index.
    pub fn finalize(mut self) -> Index {
        let total_docs = self.index.document_count();
        let lengths = &self.index.doc_lengths;
        for list in self.index.terms.values_mut() {
            let df = list.document_frequency();
            for posting in list.values_mut() {
                // Zero-length documents never received postings, so the
                // length lookup cannot miss; skip defensively if it does.
                let Some(doc_len) = lengths.get(&posting.doc).copied().filter(|l| *l > 0)
                else {
                    continue;
                };
                posting.tf_idf = tf_idf(posting.raw_tf, doc_len, df, total_docs);
            }
        }
        tracing::info!(
            docs = total_docs,
            terms = self.index.term_count(),
            "computed tf-idf weights"
        );
        self.index
    }
}

pub fn tf(raw_tf: u32, doc_len: u32) -> f64 {
    1.0 + (raw_tf as f64 / doc_len as f64).log10()
}

/// `df + 1` keeps the ratio finite; with small corpora the result can be 0
/// (or slightly negative when df + 1 exceeds the document count).
pub fn idf(df: usize, total_docs: usize) -> f64 {
    (total_docs as f64 / (df as f64 + 1.0)).log10()
}

pub fn tf_idf(raw_tf: u32, doc_len: u32, df: usize, total_docs: usize) -> f64 {
    tf(raw_tf, doc_len) * idf(df, total_docs)
}

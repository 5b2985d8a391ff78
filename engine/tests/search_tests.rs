use engine::persist::{load_index, load_meta, save_index, SnapshotPaths};
use engine::{search, DocRef, IndexBuilder};
use std::collections::HashSet;
use tempfile::tempdir;

fn doc(p: u32, s: u32) -> DocRef {
    DocRef::new(p, s)
}

fn add_doc(builder: &mut IndexBuilder, doc: DocRef, terms: &[&str], tag: &str) {
    for term in terms {
        builder.add_token(doc, term, tag);
    }
    builder.finish_document(doc, terms.len() as u32);
}

/// The three-document corpus: (1,1)=[cat,dog] (1,2)=[cat] (2,1)=[dog,bird].
fn sample_index() -> engine::Index {
    let mut builder = IndexBuilder::new();
    add_doc(&mut builder, doc(1, 1), &["cat", "dog"], "p");
    add_doc(&mut builder, doc(1, 2), &["cat"], "p");
    add_doc(&mut builder, doc(2, 1), &["dog", "bird"], "p");
    builder.finalize()
}

#[test]
fn phrase_tier_ranks_before_single_terms() {
    let index = sample_index();
    let hits = search(&index, "cat dog", 10);

    // window=2 intersects to {(1,1)}; window=1 unions in the rest
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].doc, doc(1, 1));
    let docs: HashSet<DocRef> = hits.iter().map(|h| h.doc).collect();
    assert_eq!(docs, [doc(1, 1), doc(1, 2), doc(2, 1)].into_iter().collect());
}

#[test]
fn results_never_repeat_a_document() {
    let index = sample_index();
    let hits = search(&index, "cat dog", 10);
    let docs: HashSet<DocRef> = hits.iter().map(|h| h.doc).collect();
    assert_eq!(docs.len(), hits.len());
}

#[test]
fn evaluation_stops_once_k_is_reached() {
    let index = sample_index();
    let hits = search(&index, "cat dog", 1);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc, doc(1, 1));
}

#[test]
fn single_term_results_bounded_by_document_frequency() {
    let index = sample_index();
    // df(cat) = 2
    assert_eq!(search(&index, "cat", 10).len(), 2);
    assert_eq!(search(&index, "cat", 1).len(), 1);
    // df(bird) = 1
    assert_eq!(search(&index, "bird", 10).len(), 1);
}

#[test]
fn filtered_out_queries_return_empty() {
    let index = sample_index();
    assert!(search(&index, "", 10).is_empty());
    assert!(search(&index, "zebra", 10).is_empty());
    assert!(search(&index, "the and of", 10).is_empty());
    // unknown terms mixed with known ones are dropped, not fatal
    assert_eq!(search(&index, "zebra cat", 10).len(), 2);
}

#[test]
fn title_tagged_matches_outrank_body_matches() {
    // Same text, one document carries the term in its title.
    let mut builder = IndexBuilder::new();
    add_doc(&mut builder, doc(0, 1), &["cat"], "title");
    add_doc(&mut builder, doc(0, 2), &["cat"], "p");
    add_doc(&mut builder, doc(0, 3), &["dog"], "p");
    add_doc(&mut builder, doc(0, 4), &["bird"], "p");
    let index = builder.finalize();

    let hits = search(&index, "cat", 10);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].doc, doc(0, 1));
    assert_eq!(hits[1].doc, doc(0, 2));
    assert!((hits[0].score - hits[1].score - 0.10).abs() < 1e-9);
}

#[test]
fn snapshot_round_trip_preserves_results() {
    let index = sample_index();
    let before = search(&index, "cat dog", 10);

    let dir = tempdir().unwrap();
    let paths = SnapshotPaths::new(dir.path());
    save_index(&paths, &index).unwrap();

    let restored = load_index(&paths).unwrap();
    assert_eq!(restored.term_count(), index.term_count());
    assert_eq!(restored.document_count(), index.document_count());

    let after = search(&restored, "cat dog", 10);
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.doc, a.doc);
        assert!((b.score - a.score).abs() < 1e-12);
    }

    let meta = load_meta(&paths).unwrap();
    assert_eq!(meta.doc_count, 3);
    assert_eq!(meta.term_count, 3);
    assert_eq!(meta.version, engine::persist::SNAPSHOT_VERSION);
}

#[test]
fn posting_pairs_stay_unique_under_heavy_repetition() {
    let mut builder = IndexBuilder::new();
    for _ in 0..50 {
        builder.add_token(doc(7, 7), "echo", "p");
    }
    builder.finish_document(doc(7, 7), 50);
    let index = builder.finalize();
    let list = index.postings("echo").unwrap();
    assert_eq!(list.document_frequency(), 1);
    assert_eq!(list.get(doc(7, 7)).unwrap().raw_tf, 50);
    assert_eq!(list.document_frequency(), list.document_set().len());
}

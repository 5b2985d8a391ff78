//! Corpus traversal, HTML token extraction, and the bookkeeping URL table.

use anyhow::Result;
use engine::tokenizer::extract_terms;
use engine::{DocRef, Index, IndexBuilder};
use scraper::node::Node;
use scraper::Html;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use walkdir::WalkDir;

/// Load the bookkeeping TSV: one `partition/sequence <url>` pair per line.
pub fn load_bookkeeping(path: &Path) -> Result<HashMap<String, String>> {
    let f = File::open(path)?;
    let reader = BufReader::new(f);
    let mut urls = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace();
        if let (Some(key), Some(url)) = (fields.next(), fields.next()) {
            urls.insert(key.to_string(), url.to_string());
        }
    }
    Ok(urls)
}

/// Corpus files are laid out as `<partition>/<sequence>`, both decimal.
pub fn doc_ref_for_path(path: &Path) -> Option<DocRef> {
    let sequence = path.file_name()?.to_str()?.parse().ok()?;
    let partition = path.parent()?.file_name()?.to_str()?.parse().ok()?;
    Some(DocRef::new(partition, sequence))
}

/// Walk the corpus root, feed every readable document into a builder, and
/// finalize. Unreadable or oddly named files are logged and skipped; they
/// never abort the build.
pub fn build_index(corpus_root: &Path) -> Result<Index> {
    let mut builder = IndexBuilder::new();
    let mut processed = 0usize;
    for entry in WalkDir::new(corpus_root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if matches!(name, "bookkeeping.json" | "bookkeeping.tsv") {
            continue;
        }
        let Some(doc) = doc_ref_for_path(path) else {
            tracing::warn!(path = %path.display(), "path is not partition/sequence, skipping");
            continue;
        };
        match fs::read_to_string(path) {
            Ok(text) => {
                ingest_document(&mut builder, doc, &text);
                processed += 1;
                if processed % 5000 == 0 {
                    tracing::info!(processed, "corpus scan progress");
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not read document, skipping");
            }
        }
    }
    tracing::info!(processed, "corpus scan complete");
    Ok(builder.finalize())
}

/// Tokenize one HTML document. Each token carries the name of its enclosing
/// element as its provenance tag; text directly inside style, script, or
/// meta is invisible content and contributes nothing. Returns the token
/// count; documents with zero tokens get no length entry.
pub fn ingest_document(builder: &mut IndexBuilder, doc: DocRef, html: &str) -> u32 {
    let parsed = Html::parse_document(html);
    let mut count = 0u32;
    for node in parsed.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let Some(parent) = node.parent() else {
            continue;
        };
        let Node::Element(element) = parent.value() else {
            continue;
        };
        let tag = element.name();
        if matches!(tag, "style" | "script" | "meta") {
            continue;
        }
        for term in extract_terms(&text.text) {
            count += 1;
            builder.add_token(doc, &term, tag);
        }
    }
    if count > 0 {
        builder.finish_document(doc, count);
    }
    count
}

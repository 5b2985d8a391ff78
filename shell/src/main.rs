mod corpus;

use anyhow::Result;
use clap::Parser;
use engine::persist::{load_index, save_index, SnapshotPaths};
use engine::{search, Index};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "<--- Usage Information --->
    Commands:
    make_index - create index from scratch using raw webpage data on disk
    print_stats - print index unique term count and document count
    save_index - save index snapshot to disk
    load_index - load index from saved snapshot
    query - query against current index
    usage - print usage information
    quit - end program";

#[derive(Parser)]
#[command(name = "shell")]
#[command(about = "Interactive tiered TF-IDF search shell", long_about = None)]
struct Args {
    /// Corpus root directory of partition/sequence documents
    #[arg(long, default_value = "webpages/WEBPAGES_RAW")]
    corpus: String,
    /// Bookkeeping TSV mapping partition/sequence to source URL
    #[arg(long, default_value = "webpages/WEBPAGES_RAW/bookkeeping.tsv")]
    bookkeeping: String,
    /// Index snapshot directory
    #[arg(long, default_value = "saved_index")]
    snapshot: String,
    /// Number of results per query
    #[arg(long, default_value_t = engine::DEFAULT_TOP_K)]
    top_k: usize,
}

/// All shell state: the loaded index plus the URL table, created in main and
/// threaded through every command.
struct Session {
    args: Args,
    index: Option<Index>,
    urls: HashMap<String, String>,
}

impl Session {
    fn make_index(&mut self) {
        println!("Building index from {}...", self.args.corpus);
        match corpus::build_index(Path::new(&self.args.corpus)) {
            Ok(index) => {
                println!("Index construction complete!");
                self.index = Some(index);
            }
            Err(err) => println!("Index construction failed: {err}"),
        }
    }

    fn print_stats(&self) {
        match &self.index {
            Some(index) => {
                println!("Number of unique terms is {}", index.term_count());
                println!("Number of docs is {}", index.document_count());
            }
            None => println!("Cannot print stats... no index has been created/loaded..."),
        }
    }

    fn save_index(&self) {
        let Some(index) = &self.index else {
            println!("Cannot save... no index has been created/loaded...");
            return;
        };
        println!("Saving index...");
        match save_index(&SnapshotPaths::new(&self.args.snapshot), index) {
            Ok(()) => println!("Index save complete!"),
            Err(err) => println!("Index save failed: {err}"),
        }
    }

    fn load_index(&mut self) {
        let paths = SnapshotPaths::new(&self.args.snapshot);
        if !paths.exists() {
            println!("Cannot load index, no index has been previously saved...");
            return;
        }
        println!("Loading index...");
        match load_index(&paths) {
            Ok(index) => {
                self.index = Some(index);
                println!("Index load complete!");
            }
            Err(err) => println!("Index load failed: {err}"),
        }
    }

    fn query_loop(&self, input: &mut impl BufRead) -> Result<()> {
        let Some(index) = &self.index else {
            println!("Cannot query... no index has been created/loaded...");
            return Ok(());
        };
        println!("<--- QUERIES --->");
        loop {
            println!("Please input a query (enter \"?!back\" to return to shell):");
            let Some(line) = read_line(input)? else {
                return Ok(());
            };
            let query = line.trim().to_lowercase();
            if query == "?!back" {
                return Ok(());
            }
            self.run_query(index, &query);
        }
    }

    fn run_query(&self, index: &Index, query: &str) {
        let hits = search(index, query, self.args.top_k);
        println!("Top {} results:", self.args.top_k);
        for (rank, hit) in hits.iter().enumerate() {
            let key = hit.doc.to_string();
            match self.urls.get(&key) {
                Some(url) => println!("{}. [{:.4}] {} {}", rank + 1, hit.score, key, url),
                None => println!("{}. [{:.4}] {}", rank + 1, hit.score, key),
            }
        }
        if hits.is_empty() {
            println!("(no results)");
        }
    }
}

fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None); // EOF
    }
    Ok(Some(line))
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let urls = match corpus::load_bookkeeping(Path::new(&args.bookkeeping)) {
        Ok(urls) => urls,
        Err(err) => {
            tracing::warn!(%err, "bookkeeping unavailable; results will print without URLs");
            HashMap::new()
        }
    };

    let mut session = Session { args, index: None, urls };
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("{USAGE}");
    loop {
        let Some(line) = read_line(&mut input)? else {
            break;
        };
        match line.trim() {
            "make_index" => session.make_index(),
            "print_stats" => session.print_stats(),
            "save_index" => session.save_index(),
            "load_index" => session.load_index(),
            "query" => session.query_loop(&mut input)?,
            "usage" => println!("{USAGE}"),
            "quit" => break,
            "" => {}
            other => {
                println!("Command not recognized: {other}");
                println!("{USAGE}");
            }
        }
    }
    Ok(())
}

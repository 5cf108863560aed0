//! Search command implementation

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use concord_text_index::{CorpusManifest, IndexHandle, SearchOptions, SearchSession};

use crate::{
    LocatorArg, MergeArg,
    commands::{index_options, merge_strategy, normalize_key},
    display::HitPrinter,
    utils::validate_file_exists,
};

pub struct SearchArgs {
    pub manifest: String,
    pub window: u64,
    pub hits: usize,
    pub locator: LocatorArg,
    pub merge: MergeArg,
    pub interactive: bool,
    pub index_path: String,
    pub words: Vec<String>,
}

pub fn run(args: SearchArgs) -> Result<()> {
    validate_file_exists(&args.manifest)?;
    validate_file_exists(&args.index_path)?;

    let manifest_path = std::path::Path::new(&args.manifest);
    let documents = CorpusManifest::load(manifest_path)
        .and_then(|manifest| manifest.resolve(manifest_path))
        .with_context(|| format!("Failed to load corpus manifest {}", args.manifest))?;
    let printer = HitPrinter::new(documents);

    let handle = IndexHandle::open(&args.index_path, &index_options(args.locator))
        .with_context(|| format!("Failed to open index {}", args.index_path))?;
    let keys = args
        .words
        .iter()
        .map(|word| normalize_key(word))
        .collect::<Vec<_>>();
    let options = SearchOptions::new(args.window).with_strategy(merge_strategy(args.merge));
    let outcome = handle
        .search(&keys, &options, args.hits)
        .context("Search failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !outcome.missing.is_empty() {
        writeln!(out, "Words absent from index:  {}\n", outcome.missing.join(" "))?;
    }
    let Some(mut session) = outcome.session else {
        writeln!(out, "At least two indexed words are needed for a proximity search.")?;
        return Ok(());
    };
    printer.print_page(&mut out, &outcome.hits, args.window, session.is_exhausted())?;

    if args.interactive {
        let stdin = io::stdin();
        more_loop(&printer, &mut session, args.hits, &mut stdin.lock(), &mut out)?;
    }
    Ok(())
}

/// Serves further pages until the search is exhausted or the user quits.
///
/// An empty line asks for the default page size, a number for that many hits,
/// and `q` (or end of input) ends the session.
fn more_loop<R: BufRead, W: Write>(
    printer: &HitPrinter,
    session: &mut SearchSession,
    page_size: usize,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let mut line = String::new();
    while !session.is_exhausted() {
        write!(out, "more [{page_size}]> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            break;
        }
        let count = if answer.is_empty() {
            page_size
        } else {
            match answer.parse::<usize>() {
                Ok(count) => count,
                Err(_) => {
                    writeln!(out, "Enter a number of hits, or q to quit")?;
                    continue;
                }
            }
        };
        let page = session.more(count).context("Search failed")?;
        printer.print_page(out, &page, session.window(), session.is_exhausted())?;
    }
    Ok(())
}

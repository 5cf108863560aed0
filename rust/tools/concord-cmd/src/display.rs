//! Rendering of hits as corpus quotations.

use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use concord_io::LineCache;
use concord_text_index::{DocCode, Posting};

/// Width of the `DOC LINE` column.
const LABEL_WIDTH: usize = 16;

/// Prints hits together with the document lines they point at.
///
/// Each hit is shown as its `DOC LINE` label followed by the line itself,
/// then the next `window - 1` lines indented under it, then a blank line.
pub struct HitPrinter {
    documents: HashMap<DocCode, PathBuf>,
    lines: LineCache,
}

impl HitPrinter {
    pub fn new(documents: impl IntoIterator<Item = (DocCode, PathBuf)>) -> HitPrinter {
        HitPrinter {
            documents: documents.into_iter().collect(),
            lines: LineCache::new(),
        }
    }

    /// Prints one page of hits. `exhausted` adds the end-of-results rule.
    ///
    /// Cached line offsets are dropped afterwards, so a long interactive
    /// session does not accumulate them.
    pub fn print_page<W: Write>(
        &self,
        out: &mut W,
        hits: &[Posting],
        window: u64,
        exhausted: bool,
    ) -> Result<()> {
        let result = hits
            .iter()
            .try_for_each(|hit| self.print_hit(out, hit, window));
        self.lines.clear_cache();
        result?;
        if exhausted {
            writeln!(out, "{}", "-".repeat(LABEL_WIDTH))?;
        }
        Ok(())
    }

    fn print_hit<W: Write>(&self, out: &mut W, hit: &Posting, window: u64) -> Result<()> {
        let path = self
            .documents
            .get(&hit.doc)
            .with_context(|| format!("Document {} is not in the manifest", hit.doc))?;
        let label = format!("{} {}", hit.doc, hit.line);
        writeln!(
            out,
            "{label:<LABEL_WIDTH$}{}",
            self.line_text(path, hit.line)?
        )?;
        for offset in 1..window {
            writeln!(
                out,
                "{:LABEL_WIDTH$}{}",
                "",
                self.line_text(path, hit.line + offset)?
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// The trimmed text of a line, empty past the end of the document.
    fn line_text(&self, path: &Path, line: u64) -> Result<String> {
        let text = self
            .lines
            .get_line(path, line)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(text.map(|t| t.trim().to_string()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "  Alice sat\nin wonder  \nlast line\n").unwrap();
        let doc = DocCode::new("ALI").unwrap();
        let printer = HitPrinter::new([(doc, path)]);

        let mut out = Vec::new();
        printer
            .print_page(&mut out, &[Posting::new(doc, 2)], 3, true)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "ALI 2           in wonder\n                last line\n                \n\n----------------\n"
        );
    }

    #[test]
    fn test_unknown_document() {
        let printer = HitPrinter::new(std::iter::empty());
        let doc = DocCode::new("XYZ").unwrap();
        let mut out = Vec::new();
        assert!(
            printer
                .print_page(&mut out, &[Posting::new(doc, 1)], 1, false)
                .is_err()
        );
    }
}

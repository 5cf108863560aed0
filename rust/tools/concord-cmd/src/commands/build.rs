//! Build command implementation

use anyhow::{Context, Result};
use concord_text_index::{Corpus, IndexBuilder, IndexBuilderParams};

use crate::utils::validate_file_exists;

pub fn run(
    manifest: String,
    params: Option<String>,
    budget: Option<usize>,
    sequential: bool,
    index_path: String,
) -> Result<()> {
    validate_file_exists(&manifest)?;
    let mut params = match params {
        Some(path) => {
            validate_file_exists(&path)?;
            IndexBuilderParams::from_json_file(&path)
                .with_context(|| format!("Failed to load builder parameters from {path}"))?
        }
        None => IndexBuilderParams::default(),
    };
    if let Some(budget) = budget {
        params.memory_budget_bytes = budget;
    }
    if sequential {
        params.parallel_merge = false;
    }

    let corpus = Corpus::from_manifest(&manifest, params.budget())
        .with_context(|| format!("Failed to load corpus from {manifest}"))?;
    let summary = IndexBuilder::new(params)
        .build(&corpus, &index_path)
        .with_context(|| format!("Failed to build index {index_path}"))?;

    println!(
        "{} documents, {} occurrences, {} keys",
        corpus.len(),
        summary.occurrence_count,
        summary.key_count
    );
    if summary.out_of_order_keys > 0 {
        log::warn!(
            "{} keys were written out of order; the index may be unreliable",
            summary.out_of_order_keys
        );
    }
    Ok(())
}

//! Lookup command implementation

use anyhow::{Context, Result};
use concord_text_index::IndexHandle;

use crate::{
    LocatorArg,
    commands::{index_options, normalize_key},
    utils::validate_file_exists,
};

pub fn run(locator: LocatorArg, index_path: String, keys: Vec<String>) -> Result<()> {
    validate_file_exists(&index_path)?;
    let handle = IndexHandle::open(&index_path, &index_options(locator))
        .with_context(|| format!("Failed to open index {index_path}"))?;

    for key in keys {
        let key = normalize_key(&key);
        match handle
            .lookup(&key)
            .with_context(|| format!("Lookup of '{key}' failed"))?
        {
            Some(postings) => println!("{key}:{postings}"),
            None => println!("{key}: not in index"),
        }
    }
    Ok(())
}

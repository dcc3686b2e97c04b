//! On-disk article store
//!
//! Files are named `{slug}-{YYYY-MM-DD}.{md|txt}`. The dispatcher sends the
//! `.txt` renditions of the most recent date, national article first.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use shared::{extract_date, is_national_file, slugify, DocumentScope, RenderedDocument};

use crate::error::AppResult;
use crate::services::writer::ArticleText;

const TEXT_EXT: &str = "txt";
const MARKDOWN_EXT: &str = "md";

/// Write both renditions of one scope, returning the written paths
pub fn write_article(
    dir: &Path,
    scope: &DocumentScope,
    date: NaiveDate,
    article: &ArticleText,
) -> AppResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let md_path = dir.join(scope.file_name(date, MARKDOWN_EXT));
    fs::write(&md_path, &article.markdown)?;

    let txt_path = dir.join(scope.file_name(date, TEXT_EXT));
    fs::write(&txt_path, &article.plain)?;

    Ok(vec![md_path, txt_path])
}

fn text_file_names(dir: &Path) -> AppResult<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(&format!(".{}", TEXT_EXT)) {
            names.push(name);
        }
    }
    Ok(names)
}

/// Most recent date found in `.txt` file names
pub fn latest_date(dir: &Path) -> AppResult<Option<NaiveDate>> {
    Ok(text_file_names(dir)?
        .iter()
        .filter_map(|name| extract_date(name))
        .max())
}

/// Documents of the latest date in delivery order.
///
/// The national file comes first when present, then county files sorted by
/// name. `only` is a comma-separated list of names; county files are kept
/// when their name contains one of the slugified entries.
pub fn collect_documents(dir: &Path, only: Option<&str>) -> AppResult<Vec<RenderedDocument>> {
    let Some(latest) = latest_date(dir)? else {
        return Ok(Vec::new());
    };
    let date_suffix = format!("-{}.{}", latest.format("%Y-%m-%d"), TEXT_EXT);

    let mut names: Vec<String> = text_file_names(dir)?
        .into_iter()
        .filter(|name| name.ends_with(&date_suffix))
        .collect();
    names.sort();

    let (national, mut counties): (Vec<String>, Vec<String>) =
        names.into_iter().partition(|name| is_national_file(name));

    if let Some(filter) = only {
        let wanted: Vec<String> = filter
            .split(',')
            .map(|w| slugify(w.trim()))
            .filter(|w| !w.is_empty())
            .collect();
        if !wanted.is_empty() {
            counties.retain(|name| {
                let lowered = name.to_lowercase();
                wanted.iter().any(|w| lowered.contains(w.as_str()))
            });
        }
    }

    national
        .into_iter()
        .chain(counties)
        .map(|name| {
            let body = fs::read_to_string(dir.join(&name))?;
            let label = if is_national_file(&name) {
                DocumentScope::National.label().to_string()
            } else {
                name.trim_end_matches(&date_suffix).to_string()
            };
            Ok(RenderedDocument::new(label, body, latest))
        })
        .collect()
}

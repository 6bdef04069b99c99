//! Row classifier: read a CSV, annotate each row, write it back with extra columns.

use crate::nlp::llm::{Annotation, Annotator};
use crate::nlp::posted_by::{classify_posted_by, roster_size, MEMBER};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Preferred text columns, in order.
pub const TEXT_COLUMNS: &[&str] = &["Full text (EN)", "Combined Text (EN)", "FullText"];
pub const COMBINED_TEXT_COLUMN: &str = "Combined Text (EN)";

const BODY_HINTS: &[&str] = &["full text", "snippet", "content", "body"];
const AUTHOR_KEYS: &[&str] = &["author", "username", "authorname"];
const REPLIES_KEYS: &[&str] = &["repliescount", "replycount", "commentcount", "comments", "replies"];

pub const APPENDED_COLUMNS: [&str; 8] = [
    "SS Product",
    "Product Category",
    "Sentiment",
    "Topic",
    "Subtopic",
    "Brand Terms",
    "Posted By",
    "Replied (Y/N)",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn push_column(&mut self, name: &str, values: Vec<String>) {
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }
}

pub fn read_table(path: &Path) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let mut row: Vec<String> = record.iter().map(String::from).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    Ok(Table { headers, rows })
}

pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

/// Lowercase and drop whitespace and underscores: `Author_Name` → `authorname`.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

fn find_normalized(headers: &[String], keys: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| keys.contains(&normalize_header(h).as_str()))
}

pub fn find_author_column(headers: &[String]) -> Option<usize> {
    find_normalized(headers, AUTHOR_KEYS)
}

pub fn find_replies_column(headers: &[String]) -> Option<usize> {
    find_normalized(headers, REPLIES_KEYS)
}

/// Index of the text column, building `Combined Text (EN)` from a title-like
/// and a body-like column when none of `TEXT_COLUMNS` exists.
pub fn ensure_text_column(table: &mut Table) -> usize {
    if let Some(idx) = TEXT_COLUMNS.iter().find_map(|c| table.column(c)) {
        return idx;
    }

    let title_col = table
        .headers
        .iter()
        .position(|h| h.to_lowercase().contains("title"));
    let body_col = table.headers.iter().position(|h| {
        let low = h.to_lowercase();
        BODY_HINTS.iter().any(|k| low.contains(k))
    });

    let combined: Vec<String> = (0..table.rows.len())
        .map(|r| {
            [title_col, body_col]
                .iter()
                .flatten()
                .map(|&c| table.cell(r, c).trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    table.push_column(COMBINED_TEXT_COLUMN, combined);
    table.headers.len() - 1
}

/// `N` for zero or anything non-numeric, `Y` otherwise.
/// `Y` for a finite non-zero count. Blank, `NaN` and other unparsable cells
/// are `N`: a missing count is not a reply.
pub fn replied_flag(value: &str) -> &'static str {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v != 0.0 => "Y",
        _ => "N",
    }
}

/// Annotate `texts` in batches. A failed batch degrades to defaults.
pub async fn annotate_all(
    annotator: &dyn Annotator,
    texts: &[String],
    batch_size: usize,
    pause: Duration,
) -> (Vec<Annotation>, usize) {
    let batch_size = batch_size.max(1);
    let total_batches = texts.len().div_ceil(batch_size);
    let mut out = Vec::with_capacity(texts.len());
    let mut failed = 0;

    for (n, batch) in texts.chunks(batch_size).enumerate() {
        let started = Instant::now();
        match annotator.annotate(batch).await {
            Ok(mut annotations) => {
                annotations.resize_with(batch.len(), Annotation::default);
                info!(
                    "   batch {}/{} ({} rows) done in {:.1}s",
                    n + 1,
                    total_batches,
                    batch.len(),
                    started.elapsed().as_secs_f64()
                );
                out.extend(annotations);
            }
            Err(e) => {
                warn!("   batch {}/{} failed, using defaults: {:#}", n + 1, total_batches, e);
                failed += 1;
                out.extend(std::iter::repeat_with(Annotation::default).take(batch.len()));
            }
        }
        if !pause.is_zero() && n + 1 < total_batches {
            tokio::time::sleep(pause).await;
        }
    }

    (out, failed)
}

#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub batch_size: usize,
    pub pause: Duration,
}

impl ClassifyOptions {
    /// `<stem>_classified_ai.csv` beside the input unless an output is given.
    pub fn output_path(&self) -> PathBuf {
        if let Some(out) = &self.output {
            return out.clone();
        }
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        self.input
            .with_file_name(format!("{}_classified_ai.csv", stem))
    }
}

#[derive(Debug, Clone)]
pub struct ClassifySummary {
    pub output: PathBuf,
    pub rows: usize,
    pub batches_failed: usize,
    pub author_column: Option<String>,
    pub replies_column: Option<String>,
}

/// Append annotation, Posted By and Replied columns to every row.
pub async fn classify_table(
    table: &mut Table,
    annotator: &dyn Annotator,
    batch_size: usize,
    pause: Duration,
) -> (usize, Option<String>, Option<String>) {
    let text_col = ensure_text_column(table);
    let texts: Vec<String> = (0..table.rows.len())
        .map(|r| table.cell(r, text_col).to_string())
        .collect();

    info!(
        "   classifying {} rows from '{}' via {}",
        texts.len(),
        table.headers[text_col],
        annotator.model_name()
    );
    let (annotations, failed) = annotate_all(annotator, &texts, batch_size, pause).await;

    let author_col = find_author_column(&table.headers);
    let replies_col = find_replies_column(&table.headers);
    let author_name = author_col.map(|c| table.headers[c].clone());
    let replies_name = replies_col.map(|c| table.headers[c].clone());
    info!(
        "   Posted By from: {}",
        author_name.as_deref().unwrap_or("(none -> Member)")
    );
    match &replies_name {
        Some(name) => info!("   Replied (Y/N) from '{}'", name),
        None => info!("   Replied (Y/N): replies column not found -> default N"),
    }

    let posted_by: Vec<String> = (0..table.rows.len())
        .map(|r| match author_col {
            Some(c) => classify_posted_by(table.cell(r, c)).to_string(),
            None => MEMBER.to_string(),
        })
        .collect();
    let replied: Vec<String> = (0..table.rows.len())
        .map(|r| match replies_col {
            Some(c) => replied_flag(table.cell(r, c)).to_string(),
            None => "N".to_string(),
        })
        .collect();

    let mut columns: [Vec<String>; 6] = Default::default();
    for a in annotations {
        columns[0].push(a.ss_product);
        columns[1].push(a.product_category);
        columns[2].push(a.sentiment);
        columns[3].push(a.topic);
        columns[4].push(a.subtopic);
        columns[5].push(a.brand_terms.join("; "));
    }
    for (name, values) in APPENDED_COLUMNS.iter().zip(columns) {
        table.push_column(name, values);
    }
    table.push_column(APPENDED_COLUMNS[6], posted_by);
    table.push_column(APPENDED_COLUMNS[7], replied);

    (failed, author_name, replies_name)
}

pub async fn classify_file(
    options: &ClassifyOptions,
    annotator: &dyn Annotator,
) -> Result<ClassifySummary> {
    if !options.input.exists() {
        bail!("Input file not found: {}", options.input.display());
    }
    let started = Instant::now();
    info!("📘 Input file: {}", options.input.display());
    info!("⭐ Samsung Stars loaded: {}", roster_size());

    let mut table = read_table(&options.input)?;
    let (batches_failed, author_column, replies_column) =
        classify_table(&mut table, annotator, options.batch_size, options.pause).await;

    let output = options.output_path();
    write_table(&table, &output)?;
    info!(
        "💾 wrote {} rows to {} in {:.1}s",
        table.rows.len(),
        output.display(),
        started.elapsed().as_secs_f64()
    );

    Ok(ClassifySummary {
        output,
        rows: table.rows.len(),
        batches_failed,
        author_column,
        replies_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn preferred_text_column_wins() {
        let mut t = table(&["Title", "FullText", "Full text (EN)"], &[&["a", "b", "c"]]);
        assert_eq!(ensure_text_column(&mut t), 2);
        assert_eq!(t.headers.len(), 3);
    }

    #[test]
    fn combined_text_is_built_from_title_and_body() {
        let mut t = table(
            &["Post Title", "Snippet", "Views"],
            &[&["Screen flicker", " After update ", "9"], &["", "body only", "1"]],
        );
        let idx = ensure_text_column(&mut t);
        assert_eq!(t.headers[idx], COMBINED_TEXT_COLUMN);
        assert_eq!(t.cell(0, idx), "Screen flicker After update");
        assert_eq!(t.cell(1, idx), "body only");
    }

    #[test]
    fn header_detection_is_normalized() {
        let headers: Vec<String> = ["Title", "Author_Name", "Replies Count"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(find_author_column(&headers), Some(1));
        assert_eq!(find_replies_column(&headers), Some(2));
        assert_eq!(find_author_column(&headers[..1]), None);
    }

    #[test]
    fn replied_flags() {
        assert_eq!(replied_flag("0"), "N");
        assert_eq!(replied_flag("0.0"), "N");
        assert_eq!(replied_flag("3"), "Y");
        assert_eq!(replied_flag(""), "N");
        assert_eq!(replied_flag("n/a"), "N");
    }

    #[test]
    fn missing_reply_counts_are_not_replies() {
        for cell in ["", "   ", "NaN", "nan", "inf"] {
            assert_eq!(replied_flag(cell), "N", "{:?}", cell);
        }
        assert_eq!(replied_flag(" 1 "), "Y");
        assert_eq!(replied_flag("-2"), "Y");
    }

    struct Silent;

    #[async_trait::async_trait]
    impl Annotator for Silent {
        async fn annotate(&self, _texts: &[String]) -> Result<Vec<Annotation>> {
            Ok(Vec::new())
        }

        fn model_name(&self) -> &str {
            "silent"
        }
    }

    #[test]
    fn short_replies_are_padded_with_defaults() {
        let texts: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let (out, failed) =
            tokio_test::block_on(annotate_all(&Silent, &texts, 2, Duration::ZERO));
        assert_eq!(out, vec![Annotation::default(); 3]);
        assert_eq!(failed, 0);
    }

    #[test]
    fn default_output_path() {
        let opts = ClassifyOptions {
            input: PathBuf::from("/data/sg_posts.csv"),
            output: None,
            batch_size: 10,
            pause: Duration::ZERO,
        };
        assert_eq!(
            opts.output_path(),
            PathBuf::from("/data/sg_posts_classified_ai.csv")
        );
    }
}

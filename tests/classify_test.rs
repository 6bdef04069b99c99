use anyhow::Result;
use async_trait::async_trait;
use forum_harvest::nlp::classify::{classify_file, read_table, ClassifyOptions, APPENDED_COLUMNS};
use forum_harvest::nlp::llm::{Annotation, Annotator};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Labels every text containing "S24" as a Galaxy S24 battery complaint;
/// the second call fails outright.
struct ScriptedAnnotator {
    calls: AtomicUsize,
}

#[async_trait]
impl Annotator for ScriptedAnnotator {
    async fn annotate(&self, texts: &[String]) -> Result<Vec<Annotation>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 1 {
            anyhow::bail!("503 upstream");
        }
        Ok(texts
            .iter()
            .map(|t| {
                if t.contains("S24") {
                    Annotation {
                        ss_product: "Galaxy S24".into(),
                        product_category: "Galaxy S".into(),
                        sentiment: "Negative".into(),
                        topic: "Product (Support)".into(),
                        subtopic: "Battery / Charging".into(),
                        brand_terms: vec!["Galaxy S24".into(), "One UI".into()],
                    }
                } else {
                    Annotation::default()
                }
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn write_input(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("sg_posts.csv");
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    wtr.write_record(["Title", "URL", "AuthorName", "FullText", "RepliesCount"])
        .unwrap();
    wtr.write_record(["Battery", "u1", "duggle", "My S24 drains fast", "3"]).unwrap();
    wtr.write_record(["Hello", "u2", "Global_Contents_SG", "Welcome all", "0"]).unwrap();
    wtr.write_record(["Q", "u3", "", "S24 case?", ""]).unwrap();
    wtr.flush().unwrap();
    path
}

#[tokio::test]
async fn rows_gain_annotation_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let options = ClassifyOptions {
        input: input.clone(),
        output: None,
        batch_size: 2,
        pause: Duration::ZERO,
    };
    let annotator = ScriptedAnnotator {
        calls: AtomicUsize::new(0),
    };

    let summary = classify_file(&options, &annotator).await.unwrap();
    assert_eq!(summary.output, dir.path().join("sg_posts_classified_ai.csv"));
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.batches_failed, 1);
    assert_eq!(summary.author_column.as_deref(), Some("AuthorName"));
    assert_eq!(summary.replies_column.as_deref(), Some("RepliesCount"));

    let table = read_table(&summary.output).unwrap();
    assert_eq!(table.headers.len(), 5 + APPENDED_COLUMNS.len());
    let col = |name: &str| table.column(name).unwrap();

    assert_eq!(table.cell(0, col("SS Product")), "Galaxy S24");
    assert_eq!(table.cell(0, col("Brand Terms")), "Galaxy S24; One UI");
    assert_eq!(table.cell(0, col("Posted By")), "Samsung Star");
    assert_eq!(table.cell(0, col("Replied (Y/N)")), "Y");

    assert_eq!(table.cell(1, col("Posted By")), "Moderator");
    assert_eq!(table.cell(1, col("Replied (Y/N)")), "N");

    // Third row sat in the failed batch.
    assert_eq!(table.cell(2, col("SS Product")), "No specific product");
    assert_eq!(table.cell(2, col("Sentiment")), "Neutral");
    assert_eq!(table.cell(2, col("Posted By")), "Member");
    assert_eq!(table.cell(2, col("Replied (Y/N)")), "N");
}

#[tokio::test]
async fn missing_input_fails_fast() {
    let options = ClassifyOptions {
        input: PathBuf::from("/definitely/not/here.csv"),
        output: None,
        batch_size: 5,
        pause: Duration::ZERO,
    };
    let annotator = ScriptedAnnotator {
        calls: AtomicUsize::new(0),
    };
    assert!(classify_file(&options, &annotator).await.is_err());
    assert_eq!(annotator.calls.load(Ordering::SeqCst), 0);
}

//! Label maintenance
//!
//! `import` reads a TOML file of `[[label]]` tables and commits them as one
//! batch: either every label lands or none does.
//!
//! ```toml
//! [[label]]
//! short_name = "ANX"
//! report_name = "Anxiety"
//! stubs = [1, 4]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use therapy_server::db::{LabelQuery, LabelRepository, PgLabelRepo, UnitOfWork};
use therapy_server::models::{LabelWithStubs, NewLabel};

#[derive(Parser, Debug)]
pub struct LabelsArgs {
    #[command(subcommand)]
    pub command: LabelsCommands,
}

#[derive(Subcommand, Debug)]
pub enum LabelsCommands {
    /// Add every label from a TOML file in a single transaction
    Import(ImportArgs),
    /// List labels whose short or report name starts with a prefix
    Search(SearchArgs),
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// TOML file with [[label]] entries
    pub file: PathBuf,

    /// Validate the file without touching the database
    #[arg(long)]
    pub dry_run: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Name prefix (empty lists every label)
    #[arg(default_value = "")]
    pub prefix: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelFile {
    #[serde(default, rename = "label")]
    labels: Vec<LabelEntry>,
}

#[derive(Debug, Deserialize)]
struct LabelEntry {
    short_name: String,
    report_name: String,
    #[serde(default)]
    stubs: Vec<i64>,
}

pub async fn run_labels(args: LabelsArgs, config_path: &Path) -> Result<()> {
    match args.command {
        LabelsCommands::Import(args) => run_import(args, config_path).await,
        LabelsCommands::Search(args) => run_search(args, config_path).await,
    }
}

/// Parse and validate a label file into a pending batch.
fn read_label_file(path: &Path) -> Result<UnitOfWork> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file: LabelFile =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut work = UnitOfWork::new();
    for (i, entry) in file.labels.into_iter().enumerate() {
        let label = NewLabel::new(&entry.short_name, &entry.report_name, entry.stubs)
            .with_context(|| format!("Invalid label #{}", i + 1))?;
        work.add(label);
    }
    Ok(work)
}

async fn run_import(args: ImportArgs, config_path: &Path) -> Result<()> {
    let work = read_label_file(&args.file)?;
    if work.is_empty() {
        println!("No labels in {}", args.file.display());
        return Ok(());
    }

    if args.dry_run {
        println!("{} labels valid, nothing written (dry run)", work.len());
        return Ok(());
    }

    let config = super::load_config(config_path)?;
    let url = super::database_url(args.database_url, &config)?;
    let repo = PgLabelRepo::new(super::connect(&url, &config).await?);

    let pending = work.len();
    let outcome = work.commit(&repo).await.context("Import rolled back")?;
    tracing::info!(pending, added = outcome.added.len(), "label import committed");

    for label in &outcome.added {
        println!("{}\t{}\t{}", label.id, label.short_name, label.report_name);
    }
    println!("Imported {} labels", outcome.added.len());
    Ok(())
}

async fn run_search(args: SearchArgs, config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path)?;
    let url = super::database_url(args.database_url, &config)?;
    let repo = PgLabelRepo::new(super::connect(&url, &config).await?);

    let labels = repo
        .find_labels_by_request(&LabelQuery::by_name_prefix(&args.prefix))
        .await
        .context("Label search failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&labels)?);
    } else {
        print!("{}", render_table(&labels));
    }
    Ok(())
}

fn render_table(labels: &[LabelWithStubs]) -> String {
    let mut out = String::new();
    for entry in labels {
        out.push_str(&format!(
            "{}\t{}\t{}\t({} stubs)\n",
            entry.label.id,
            entry.label.short_name,
            entry.label.report_name,
            entry.stubs.len()
        ));
        for stub in &entry.stubs {
            out.push_str(&format!("    {}\t{}\n", stub.id, stub.name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use therapy_server::db::{LabelChange, MemoryStore, StubRepository};
    use therapy_server::models::StubData;

    fn write(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("labels.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
            [[label]]
            short_name = "ANX"
            report_name = "Anxiety"
            stubs = [2, 1, 2]

            [[label]]
            short_name = "DEP"
            report_name = "Depression"
            "#,
        );

        let work = read_label_file(&path).unwrap();
        assert_eq!(work.len(), 2);
        match &work.pending()[0] {
            LabelChange::Add(label) => {
                assert_eq!(label.short_name.as_str(), "ANX");
                assert_eq!(label.stub_ids, vec![1, 2]);
            }
            other => panic!("unexpected change {other:?}"),
        }
    }

    #[test]
    fn names_the_bad_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
            [[label]]
            short_name = "OK"
            report_name = "Fine"

            [[label]]
            short_name = ""
            report_name = "Broken"
            "#,
        );

        let err = read_label_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid label #2"));
    }

    #[tokio::test]
    async fn imported_batch_commits_together() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
            [[label]]
            short_name = "ANX"
            report_name = "Anxiety"
            stubs = [1]
            "#,
        );

        let store = MemoryStore::new();
        StubRepository::create(&store, StubData::new("Worry", "", "", "").unwrap())
            .await
            .unwrap();

        let outcome = read_label_file(&path).unwrap().commit(&store).await.unwrap();
        assert_eq!(outcome.added.len(), 1);

        let found = store
            .find_labels_by_request(&LabelQuery::by_name_prefix("AN"))
            .await
            .unwrap();
        let table = render_table(&found);
        assert!(table.starts_with("1\tANX\tAnxiety\t(1 stubs)"));
        assert!(table.contains("    1\tWorry"));
    }
}

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use regref_core::{ReferenceRecord, RulesNormalizer, detect_candidates, run_hybrid};
use regref_llm::{ChatClient, LlmConfig, LlmNormalizer, extract_oneshot, load_config};
use regref_pdf_mupdf::MupdfBackend;

mod output;

/// Regulatory Cross-Reference Extractor - Extract structured citations from regulatory PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract cross-references from a regulatory PDF
    Extract {
        /// Path to the PDF to process
        pdf_path: PathBuf,

        /// Extraction strategy
        #[arg(long, value_enum, default_value_t = Strategy::Hybrid)]
        strategy: Strategy,

        /// Write the structured record list as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the flattened tabular form as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Model name, overriding the config file
        #[arg(long)]
        model: Option<String>,

        /// Base URL of an OpenAI-compatible API, overriding the config file
        #[arg(long)]
        api_base: Option<String>,

        /// Candidates per normalizer call
        #[arg(long)]
        batch_size: Option<usize>,

        /// Print detected candidates without normalizing them
        #[arg(long)]
        dry_run: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// Deterministic detection with LLM normalization of candidates
    Hybrid,
    /// Deterministic detection with the fixed-lookup fallback, no external calls
    Rules,
    /// Delegate the whole document to the LLM in one call
    Oneshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract {
            pdf_path,
            strategy,
            json,
            csv,
            model,
            api_base,
            batch_size,
            dry_run,
            no_color,
        } => {
            if dry_run {
                return dry_run_extract(&pdf_path, no_color);
            }
            let records = run_strategy(&pdf_path, strategy, model, api_base, batch_size).await?;
            write_artifacts(&records, json.as_deref(), csv.as_deref())?;
            print_summary(&records, no_color);
            Ok(())
        }
    }
}

async fn run_strategy(
    pdf_path: &std::path::Path,
    strategy: Strategy,
    model: Option<String>,
    api_base: Option<String>,
    batch_size: Option<usize>,
) -> anyhow::Result<Vec<ReferenceRecord>> {
    let backend = MupdfBackend::new();
    let file_config = load_config().llm.unwrap_or_default();
    let batch_size = batch_size
        .or(file_config.batch_size)
        .unwrap_or(regref_core::DEFAULT_BATCH_SIZE);

    match strategy {
        Strategy::Rules => {
            let records = run_hybrid(pdf_path, &backend, &RulesNormalizer, batch_size).await?;
            Ok(records)
        }
        Strategy::Hybrid => {
            let client = chat_client(&file_config, model, api_base);
            let normalizer = LlmNormalizer::new(client);
            let records = run_hybrid(pdf_path, &backend, &normalizer, batch_size).await?;
            Ok(records)
        }
        Strategy::Oneshot => {
            let client = chat_client(&file_config, model, api_base);
            let records = extract_oneshot(pdf_path, &client).await?;
            Ok(records)
        }
    }
}

fn chat_client(
    file_config: &regref_llm::LlmFileConfig,
    model: Option<String>,
    api_base: Option<String>,
) -> ChatClient {
    let defaults = LlmConfig::default();
    let key_env = file_config
        .api_key_env
        .clone()
        .unwrap_or_else(|| "OPENAI_API_KEY".to_string());
    ChatClient::new(LlmConfig {
        api_base: api_base
            .or_else(|| file_config.api_base.clone())
            .unwrap_or(defaults.api_base),
        model: model
            .or_else(|| file_config.model.clone())
            .unwrap_or(defaults.model),
        api_key: std::env::var(&key_env).ok(),
        temperature: file_config.temperature.unwrap_or(defaults.temperature),
    })
}

/// Extract and print candidates without normalization, for inspecting
/// what the pattern table finds in a document.
fn dry_run_extract(pdf_path: &std::path::Path, no_color: bool) -> anyhow::Result<()> {
    use regref_core::PdfBackend;

    let backend = MupdfBackend::new();
    let pages = backend.extract_pages(pdf_path)?;
    let candidates = detect_candidates(&pages);

    println!("{} candidates on {} pages", candidates.len(), pages.len());
    for c in &candidates {
        let kind = c.kind.as_str();
        if no_color {
            println!("  p{:<4} {:<16} {}", c.page, kind, c.matched);
        } else {
            println!("  p{:<4} {:<16} {}", c.page, kind.cyan(), c.matched.bold());
        }
    }
    Ok(())
}

fn write_artifacts(
    records: &[ReferenceRecord],
    json: Option<&std::path::Path>,
    csv: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    if let Some(path) = json {
        std::fs::write(path, output::records_to_json(records)?)?;
        tracing::info!(path = %path.display(), "wrote JSON artifact");
    }
    if let Some(path) = csv {
        std::fs::write(path, output::records_to_csv(records))?;
        tracing::info!(path = %path.display(), "wrote CSV artifact");
    }
    // With no artifact paths, the record list goes to stdout
    if json.is_none() && csv.is_none() {
        println!("{}", output::records_to_json(records)?);
    }
    Ok(())
}

fn print_summary(records: &[ReferenceRecord], no_color: bool) {
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *by_type.entry(r.ref_type.as_str()).or_default() += 1;
    }
    let total = records.len();
    if no_color {
        eprintln!("{} references extracted", total);
    } else {
        eprintln!("{} references extracted", total.green().bold());
    }
    for (type_name, count) in by_type {
        eprintln!("  {:<26} {}", type_name, count);
    }
}

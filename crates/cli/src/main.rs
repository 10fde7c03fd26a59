use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use context_assembly::{
    AggregationConfig, AggregationInput, ContextAggregator, ContextItem, DocumentRef, SourceId,
};
use context_retrieval::{
    retrieve_all, CancellationToken, ContextRetriever, FsDocumentAccessor, RetrievalRequest,
    SimilarityRetriever, StaticRetriever,
};
use context_similarity::MatcherConfig;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "context")]
#[command(about = "Lexical snippet matching and completion context assembly", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for results)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank regions of a candidate file by similarity to a target file
    Match(MatchArgs),

    /// Find snippets in other files resembling the lines around a cursor
    Similar(SimilarArgs),

    /// Assemble completion context from a JSON request
    Assemble(AssembleArgs),
}

#[derive(Args)]
struct MatchArgs {
    /// File whose text is searched for
    target: PathBuf,

    /// File searched through
    candidate: PathBuf,

    /// Lines per window
    #[arg(long)]
    window: Option<usize>,

    /// Maximum number of matches
    #[arg(long)]
    max: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct SimilarArgs {
    /// File being edited
    #[arg(long)]
    target: PathBuf,

    /// Cursor line in the target file (1-indexed)
    #[arg(long)]
    line: usize,

    /// Lines around the cursor used as the search text
    #[arg(long, default_value_t = 5)]
    radius: usize,

    /// Lines per window
    #[arg(long)]
    window: Option<usize>,

    /// Maximum snippets returned across all files
    #[arg(long, default_value_t = 5)]
    max_items: usize,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Files to search
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Args)]
struct AssembleArgs {
    /// Request JSON with `items` and optional `cursor` ("-" reads stdin)
    request: PathBuf,

    /// Aggregation config (JSON or TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Files searched for snippets similar to the cursor's code to rewrite
    #[arg(long = "similar", value_name = "FILE")]
    similar: Vec<PathBuf>,

    /// Emit JSON with the section and selection report instead of raw text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // match and similar always print JSON
    let json_output = match &cli.command {
        Commands::Match(_) | Commands::Similar(_) => true,
        Commands::Assemble(args) => args.json,
    };
    if json_output && !cli.verbose {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Match(args) => run_match(args).await?,
        Commands::Similar(args) => run_similar(args).await?,
        Commands::Assemble(args) => run_assemble(args).await?,
    }

    Ok(())
}

/// Score every window of the candidate against the target
async fn run_match(args: MatchArgs) -> Result<()> {
    let target = read_text(&args.target).await?;
    let candidate = read_text(&args.candidate).await?;
    let defaults = MatcherConfig::default();
    let matcher = MatcherConfig {
        window_size: args.window.unwrap_or(defaults.window_size),
        max_matches: args.max.unwrap_or(defaults.max_matches),
    };

    let matches = matcher
        .best_matches(&target, &candidate)
        .context("Matching failed")?;
    log::debug!(
        "{} match(es) for {} in {}",
        matches.len(),
        args.target.display(),
        args.candidate.display()
    );

    print_json(&matches, args.pretty)
}

/// Run the similarity retriever for the lines around a cursor
async fn run_similar(args: SimilarArgs) -> Result<()> {
    if args.line == 0 {
        anyhow::bail!("--line is 1-indexed and must be at least 1");
    }
    let text = read_text(&args.target).await?;
    let document = document_for(&args.target);
    let request = RetrievalRequest::around_line(document, &text, args.line - 1, args.radius);

    let mut matcher = MatcherConfig::default();
    if let Some(window) = args.window {
        matcher.window_size = window;
    }
    let candidates = args.files.iter().map(|path| document_for(path)).collect();
    let retriever = SimilarityRetriever::new(FsDocumentAccessor::new("."), candidates)
        .with_matcher(matcher)?
        .with_max_items(args.max_items);

    let retrievers: Vec<Arc<dyn ContextRetriever>> = vec![Arc::new(retriever)];
    let items = retrieve_cancellable(&retrievers, request).await?;
    print_json(&items, args.pretty)
}

/// Aggregate a request into completion context
async fn run_assemble(args: AssembleArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => AggregationConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AggregationConfig::default(),
    };
    let aggregator = ContextAggregator::new(config)?;

    let raw = read_request(&args.request)?;
    let input: AggregationInput =
        serde_json::from_str(&raw).context("Failed to parse assemble request")?;

    let mut retrievers: Vec<Arc<dyn ContextRetriever>> = SourceId::ALL
        .into_iter()
        .map(|source| {
            Arc::new(StaticRetriever::new(source, input.items.clone())) as Arc<dyn ContextRetriever>
        })
        .collect();

    let request = match &input.cursor {
        Some(cursor) => RetrievalRequest::new(
            document_for(Path::new(&cursor.display_path)),
            cursor.code_to_rewrite.clone(),
        ),
        None => RetrievalRequest::new(DocumentRef::from_path(""), ""),
    };
    if !args.similar.is_empty() {
        if input.cursor.is_some() {
            let candidates = args.similar.iter().map(|path| document_for(path)).collect();
            retrievers.push(Arc::new(SimilarityRetriever::new(
                FsDocumentAccessor::new("."),
                candidates,
            )));
        } else {
            log::warn!("--similar needs a cursor in the request; skipping similarity search");
        }
    }

    let items = retrieve_cancellable(&retrievers, request).await?;
    let prompt = aggregator.aggregate(AggregationInput {
        items,
        cursor: input.cursor,
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
    } else {
        println!("{}", prompt.text);
    }
    Ok(())
}

/// Fan out retrievers; Ctrl-C cancels the request
async fn retrieve_cancellable(
    retrievers: &[Arc<dyn ContextRetriever>],
    request: RetrievalRequest,
) -> Result<Vec<ContextItem>> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; cancelling retrieval");
            on_interrupt.cancel();
        }
    });

    let result = retrieve_all(retrievers, Arc::new(request), &cancel).await;
    watcher.abort();
    result.context("Retrieval failed")
}

/// Canonical path as identity, the path as typed for display
fn document_for(path: &Path) -> DocumentRef {
    let display = path.display().to_string();
    match std::fs::canonicalize(path) {
        Ok(canonical) => DocumentRef::new(canonical.display().to_string(), display),
        Err(_) => DocumentRef::from_path(display),
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn read_request(path: &Path) -> Result<String> {
    if path.as_os_str() != "-" {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read request from stdin")?;
    if buffer.trim().is_empty() {
        anyhow::bail!("Assemble request is empty. Provide a file or pipe JSON via stdin.");
    }
    Ok(buffer)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

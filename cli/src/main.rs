mod report;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use newsdex_core::{load_corpus_file, EngineOptions, Normalization, OrNotSemantics, SearchEngine};
use report::{Mode, QueryReport};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "newsdex")]
#[command(about = "Boolean and ranked retrieval over a scraped news corpus", long_about = None)]
struct Cli {
    /// Corpus file of delimited article records
    #[arg(long)]
    corpus: PathBuf,
    /// Retrieval model to answer queries with
    #[arg(long, value_enum, default_value_t = ModeArg::Ranked)]
    mode: ModeArg,
    /// Run a single query instead of reading them one per line
    #[arg(long, conflicts_with = "queries")]
    query: Option<String>,
    /// File with one query per line (default: stdin)
    #[arg(long)]
    queries: Option<PathBuf>,
    /// Write results to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Maximum ranked results per query, 0 for all
    #[arg(long, default_value_t = 0)]
    limit: usize,
    /// Meaning of `or not <term>` in boolean queries
    #[arg(long, value_enum, default_value_t = OrNotArg::Complement)]
    or_not: OrNotArg,
    /// Document magnitude used for cosine similarity
    #[arg(long, value_enum, default_value_t = NormalizationArg::Overlap)]
    normalization: NormalizationArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Boolean,
    Ranked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrNotArg {
    Complement,
    OtherTerms,
}

#[derive(Clone, Copy, ValueEnum)]
enum NormalizationArg {
    Overlap,
    Full,
}

#[derive(Debug, PartialEq)]
enum QuerySource {
    Stdin,
    File(PathBuf),
    Inline(String),
}

#[derive(Debug, PartialEq)]
enum OutputSink {
    Stdout,
    File(PathBuf),
}

#[derive(Debug)]
struct Config {
    corpus: PathBuf,
    queries: QuerySource,
    output: OutputSink,
    mode: Mode,
    format: Format,
    limit: usize,
    options: EngineOptions,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let queries = match (cli.query, cli.queries) {
            (Some(q), _) => QuerySource::Inline(q),
            (None, Some(path)) => QuerySource::File(path),
            (None, None) => QuerySource::Stdin,
        };
        let options = EngineOptions {
            or_not: match cli.or_not {
                OrNotArg::Complement => OrNotSemantics::Complement,
                OrNotArg::OtherTerms => OrNotSemantics::OtherTerms,
            },
            normalization: match cli.normalization {
                NormalizationArg::Overlap => Normalization::QueryOverlap,
                NormalizationArg::Full => Normalization::FullDocument,
            },
        };
        Config {
            corpus: cli.corpus,
            queries,
            output: cli.output.map(OutputSink::File).unwrap_or(OutputSink::Stdout),
            mode: match cli.mode {
                ModeArg::Boolean => Mode::Boolean,
                ModeArg::Ranked => Mode::Ranked,
            },
            format: cli.format,
            limit: cli.limit,
            options,
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let config = Config::from(Cli::parse());
    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let start = Instant::now();
    let docs = load_corpus_file(&config.corpus)
        .with_context(|| format!("loading corpus {}", config.corpus.display()))?;
    let engine = SearchEngine::from_documents(docs, config.options)?;
    tracing::info!(
        num_docs = engine.num_docs(),
        num_terms = engine.num_terms(),
        took_s = start.elapsed().as_secs_f64(),
        "pre-processing complete"
    );

    let mut out: Box<dyn Write> = match &config.output {
        OutputSink::Stdout => Box::new(BufWriter::new(io::stdout().lock())),
        OutputSink::File(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating output {}", path.display()))?,
        )),
    };

    match &config.queries {
        QuerySource::Inline(q) => answer(&engine, config, q, &mut out)?,
        QuerySource::File(path) => {
            let f = File::open(path).with_context(|| format!("opening queries {}", path.display()))?;
            answer_all(&engine, config, BufReader::new(f), &mut out)?;
        }
        QuerySource::Stdin => answer_all(&engine, config, io::stdin().lock(), &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn answer_all<R: BufRead>(engine: &SearchEngine, config: &Config, reader: R, out: &mut dyn Write) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() { continue; }
        answer(engine, config, query, out)?;
        // interactive sessions see each answer as soon as it is ready
        out.flush()?;
    }
    Ok(())
}

fn answer(engine: &SearchEngine, config: &Config, query: &str, out: &mut dyn Write) -> Result<()> {
    let report = QueryReport::run(engine, config.mode, query, config.limit);
    match config.format {
        Format::Text => report.write_text(out)?,
        Format::Json => report.write_json(out)?,
    }
    Ok(())
}

use anyhow::Result;
use axum::Router;
use clap::{Parser, ValueEnum};
use newsdex_core::{EngineOptions, Normalization, OrNotSemantics};
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Corpus file of delimited article records
    #[arg(long, default_value = "./data/database.txt")]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Meaning of `or not <term>` in boolean queries
    #[arg(long, value_enum, default_value_t = OrNotArg::Complement)]
    or_not: OrNotArg,
    /// Document magnitude used for cosine similarity
    #[arg(long, value_enum, default_value_t = NormalizationArg::Overlap)]
    normalization: NormalizationArg,
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

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig {
        corpus: args.corpus,
        options: EngineOptions {
            or_not: match args.or_not {
                OrNotArg::Complement => OrNotSemantics::Complement,
                OrNotArg::OtherTerms => OrNotSemantics::OtherTerms,
            },
            normalization: match args.normalization {
                NormalizationArg::Overlap => Normalization::QueryOverlap,
                NormalizationArg::Full => Normalization::FullDocument,
            },
        },
    };
    let app: Router = build_app(&config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

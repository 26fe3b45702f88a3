use anyhow::Context;
use catalog::slug::slug;
use clap::{Parser, Subcommand};
use resolver::{ContentKind, Resolver, config::Config};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt};

/// Resolve site content the way the gateway does and print it as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Site API origin, overrides PHEZULU_API_URL
    #[arg(long, global = true)]
    api: Option<String>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolved content of one kind: pillars, insights, partners, photos or employees
    Show { kind: ContentKind },

    /// Live system status, or the catalog default
    Status,

    /// Slug a label the way content is matched
    Slug { label: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.api {
        Some(api) => Config {
            api_base: Config::with_api_base(api.as_str()).api_base,
            ..Config::load()
        },
        None => Config::load(),
    };
    let resolver = Resolver::new(config);

    let output = match args.command {
        Command::Show { kind } => show(&resolver, kind).await?,
        Command::Status => serde_json::to_value(resolver.status().await)?,
        Command::Slug { label } => Value::String(slug(&label)),
    };

    let rendered = if args.compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    }
    .context("Failed to render output")?;

    println!("{rendered}");

    Ok(())
}

async fn show(resolver: &Resolver, kind: ContentKind) -> anyhow::Result<Value> {
    let value = match kind {
        ContentKind::Pillars => serde_json::to_value(resolver.pillars().await)?,
        ContentKind::Insights => serde_json::to_value(resolver.insights().await)?,
        ContentKind::Partners => serde_json::to_value(resolver.partners().await)?,
        ContentKind::Photos => serde_json::to_value(resolver.photos().await)?,
        ContentKind::Employees => serde_json::to_value(resolver.employees().await)?,
    };

    Ok(value)
}

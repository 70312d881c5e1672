mod config;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use search_engine::{
    scraping_client, CanonicalResult, GoogleSearchClient, QueryType, SearchCoordinator, SearchQuery,
    SearchResponse, SourceRegistry, SqliteCache,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Search jobs, housing and services listings")]
struct Cli {
    /// What to search for
    #[arg(required = true)]
    keywords: Vec<String>,

    /// City and state, e.g. "Los Angeles, CA"
    #[arg(long, short, default_value = "")]
    location: String,

    #[arg(long = "type", short = 't', value_enum, default_value_t = TypeArg::Jobs)]
    query_type: TypeArg,

    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 10)]
    per_page: u32,

    /// Only keep listings that score as suitable
    #[arg(long)]
    domain_only: bool,

    /// Ignore cached results
    #[arg(long)]
    refresh: bool,

    /// Print the response envelope as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Jobs,
    Housing,
    Services,
    General,
}

impl From<TypeArg> for QueryType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Jobs => QueryType::Jobs,
            TypeArg::Housing => QueryType::Housing,
            TypeArg::Services => QueryType::Services,
            TypeArg::General => QueryType::General,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,search_engine=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    for (name, present) in config.summary() {
        if present {
            tracing::debug!("  {}: set", name);
        } else {
            tracing::warn!("  {}: NOT SET", name);
        }
    }

    let coordinator = build_coordinator(&config).await?;

    let removed = coordinator.purge_expired().await;
    if removed > 0 {
        tracing::info!(removed, "Removed expired cache entries");
    }

    let query = SearchQuery::builder(cli.keywords.join(" "), cli.query_type.into())
        .location(cli.location)
        .page(cli.page)
        .per_page(cli.per_page)
        .domain_filter_only(cli.domain_only)
        .force_refresh(cli.refresh)
        .build();

    let response = coordinator.search(&query).await;

    if cli.json {
        let body = serde_json::to_string_pretty(&response).context("Failed to serialize response")?;
        println!("{}", body);
    } else {
        print_response(&response);
    }

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

async fn build_coordinator(config: &Config) -> Result<SearchCoordinator> {
    let engine = config.engine_config();
    engine.validate().context("Invalid engine configuration")?;

    let cache = SqliteCache::new(&config.cache_url)
        .await
        .with_context(|| format!("Failed to open result cache at {}", config.cache_url))?;

    let client = scraping_client(engine.per_source_timeout()).context("Failed to build HTTP client")?;
    let registry = SourceRegistry::with_defaults(client, config.source_keys());

    let upstream =
        GoogleSearchClient::new(engine.upstream_call_timeout()).context("Failed to build upstream client")?;

    Ok(SearchCoordinator::builder()
        .cache(Arc::new(cache))
        .registry(registry)
        .upstream(Arc::new(upstream))
        .credentials(config.upstream.clone())
        .config(engine)
        .build())
}

fn print_response(response: &SearchResponse) {
    let page = &response.pagination;

    if let Some(error) = &response.error {
        println!("{} {}", "✗".bright_red().bold(), error.red());
        println!("  source: {}", response.source.dimmed());
        return;
    }

    let total = if page.total_is_estimate {
        format!("about {}", page.total_results)
    } else {
        page.total_results.to_string()
    };
    println!(
        "{} {} results, page {} of {} ({})",
        "✓".bright_green().bold(),
        total,
        page.current_page,
        page.total_pages,
        response.source.dimmed()
    );

    if response.results.is_empty() {
        println!("{}", "  No results".yellow());
        return;
    }

    println!();
    for (offset, result) in response.results.iter().enumerate() {
        print_result(page.start_index as usize + offset, result);
    }

    if page.has_next_page {
        println!("{}", format!("  More results: --page {}", page.current_page + 1).dimmed());
    }
}

fn print_result(index: usize, result: &CanonicalResult) {
    let suitability = match result.domain_score {
        70.. => result.domain_score.to_string().bright_green(),
        50..=69 => result.domain_score.to_string().yellow(),
        _ => result.domain_score.to_string().red(),
    };

    println!("{:>4}. {}", index, result.title.bold());
    println!("      {} · {}", result.provider.cyan(), result.location);
    println!(
        "      {} · suitability {} · {}",
        result.compensation_text,
        suitability,
        result.source_name.dimmed()
    );
    println!("      {}", result.source_url.dimmed());
    println!();
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use closest_places::config::{ProviderKind, ResolverConfig};
use closest_places::geo::Unit;
use closest_places::pipeline::{
    find_closest, parse_place_list, FailurePolicy, PipelineOptions, DEFAULT_PLACES,
};
use closest_places::report::Report;
use closest_places::resolver::providers::DEFAULT_USER_AGENT;
use closest_places::resolver::PlaceCache;
use closest_places::TracingObserver;
use tracing_subscriber::EnvFilter;

/// Find the two places that are closest to each other, as the crow flies.
///
/// Examples:
///   closest
///   closest Boston "New York" Washington
///   closest --places "['Santa Clara', 'San Jose', 'San Diego']"
///   closest --provider google --api-key KEY London Paris Berlin
///   closest --provider builtin --miles --json
///   closest --serve --port 8080
#[derive(Parser)]
#[command(name = "closest", version, about, long_about = None)]
struct Cli {
    /// Place names. Defaults to a built-in list of 16 cities.
    places: Vec<String>,

    /// Place list as "A, B, C" or "['A', 'B', 'C']".
    #[arg(long = "places", short = 'c', visible_alias = "cities")]
    places_list: Option<String>,

    /// Geocoding backend.
    #[arg(long, value_enum, default_value_t = ProviderKind::Nominatim)]
    provider: ProviderKind,

    /// Google Geocoding API key.
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the geocoder endpoint URL.
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Resolve places concurrently.
    #[arg(long)]
    parallel: bool,

    /// Drop places that cannot be resolved instead of failing.
    #[arg(long)]
    skip_unresolved: bool,

    /// Do not read or write the resolution cache.
    #[arg(long)]
    no_cache: bool,

    /// Cache file location.
    #[arg(long)]
    cache_path: Option<PathBuf>,

    /// Report distance in miles.
    #[arg(long)]
    miles: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Run the HTTP API instead of a one-off query.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 3000)]
    port: u16,
}

impl Cli {
    fn place_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .places
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if let Some(ref list) = self.places_list {
            names.extend(parse_place_list(list));
        }
        if names.is_empty() {
            names = DEFAULT_PLACES.iter().map(|s| s.to_string()).collect();
        }
        names
    }

    fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            provider: self.provider,
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoint: self.endpoint.clone(),
            cache_path: if self.no_cache {
                None
            } else {
                Some(self.cache_path.clone().unwrap_or_else(PlaceCache::default_path))
            },
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,closest_places={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let resolver = cli.resolver_config().build()?;

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
        return runtime
            .block_on(closest_places::server::start(&cli.host, cli.port, resolver))
            .with_context(|| format!("serving on {}:{}", cli.host, cli.port));
    }

    let names = cli.place_names();
    let opts = PipelineOptions {
        on_failure: if cli.skip_unresolved { FailurePolicy::Skip } else { FailurePolicy::Abort },
        parallel: cli.parallel,
    };

    eprintln!("Finding the 2 places closest to each other...");
    eprintln!("Input: {}", names.join(", "));

    let result = find_closest(&names, &*resolver, &TracingObserver, opts)?;
    let unit = if cli.miles { Unit::Mi } else { Unit::Km };
    let report = Report::new(&result, unit);

    for skipped in &report.skipped {
        eprintln!("  skipped {}: {}", skipped.name, skipped.reason);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary_line());
    }
    Ok(())
}

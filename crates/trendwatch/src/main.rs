//! trendwatch: surface trending tickers from finance-forum chatter.
//!
//! One invocation fetches two adjacent windows of submissions, scores ticker
//! mentions and rocket emojis, merges the windows, enriches the survivors
//! with market data, and writes a ranked table.
//!
//! Usage:
//!   cargo run -p trendwatch
//!   cargo run -p trendwatch -- --interval 12 --sub wallstreetbets --min 25
//!   cargo run -p trendwatch -- --sort 4 --csv --filename movers

use std::sync::Arc;
use std::time::Instant;

use reddit_client::RedditClient;
use ticker_scanner::{aggregate_window, filter_and_rank, score_table, Concurrency};
use trend_core::{SortKey, SymbolUniverse, TrendError};
use yahoo_client::{apply_max_price, enrich_rows, YahooClient};

const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, PartialEq)]
struct Options {
    interval: i64,
    subreddit: Option<String>,
    min_score: i64,
    max_price: f64,
    advanced: bool,
    sort: SortKey,
    csv: bool,
    filename: String,
    proxy_file: Option<String>,
    symbols_file: Option<String>,
    parallel: bool,
    concurrency: usize,
    stdout: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: 24,
            subreddit: None,
            min_score: 10,
            max_price: 9_999_999.0,
            advanced: false,
            sort: SortKey::Total,
            csv: false,
            filename: "table_records".to_string(),
            proxy_file: None,
            symbols_file: None,
            parallel: true,
            concurrency: DEFAULT_CONCURRENCY,
            stdout: false,
        }
    }
}

const VALUE_FLAGS: &[&str] = &[
    "--interval",
    "--sub",
    "--min",
    "--maxprice",
    "--sort",
    "--filename",
    "--proxy-file",
    "--symbols-file",
    "--concurrency",
];
const SWITCH_FLAGS: &[&str] = &["--advanced", "--csv", "--no-parallel", "--stdout", "--help"];

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut opts = Options::default();

        for (i, arg) in args.iter().enumerate() {
            if arg.starts_with("--")
                && !VALUE_FLAGS.contains(&arg.as_str())
                && !SWITCH_FLAGS.contains(&arg.as_str())
            {
                return Err(format!("Unknown flag: {}", arg));
            }
            if arg == "--help" {
                return Err(String::new());
            }
            if VALUE_FLAGS.contains(&arg.as_str()) && i + 1 >= args.len() {
                return Err(format!("{} requires a value", arg));
            }
        }

        opts.interval = parse_num(args, "--interval", opts.interval)?;
        if opts.interval <= 0 {
            return Err("--interval must be positive".to_string());
        }
        opts.min_score = parse_num(args, "--min", opts.min_score)?;
        opts.max_price = parse_num(args, "--maxprice", 9_999_999)? as f64;
        opts.concurrency = parse_num(args, "--concurrency", opts.concurrency as i64)?.max(1) as usize;

        let sort_idx = parse_num(args, "--sort", 1)?;
        opts.sort = u8::try_from(sort_idx)
            .ok()
            .and_then(SortKey::from_index)
            .ok_or_else(|| format!("--sort expects 1..=5, got {}", sort_idx))?;

        opts.subreddit = value_of(args, "--sub").filter(|s| !s.is_empty()).cloned();
        if let Some(name) = value_of(args, "--filename") {
            opts.filename = name.clone();
        }
        opts.proxy_file = value_of(args, "--proxy-file").cloned();
        opts.symbols_file = value_of(args, "--symbols-file").cloned();

        opts.advanced = args.iter().any(|a| a == "--advanced");
        opts.csv = args.iter().any(|a| a == "--csv");
        opts.parallel = !args.iter().any(|a| a == "--no-parallel");
        opts.stdout = args.iter().any(|a| a == "--stdout");

        Ok(opts)
    }
}

fn value_of<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1))
}

fn parse_num(args: &[String], flag: &str, default: i64) -> Result<i64, String> {
    match value_of(args, flag) {
        Some(v) => v
            .parse()
            .map_err(|_| format!("{} expects a number, got {:?}", flag, v)),
        None => Ok(default),
    }
}

fn print_usage() {
    eprintln!("Usage: trendwatch [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --interval N       Window size in hours (default: 24)");
    eprintln!("  --sub NAME         Restrict the search to one subreddit");
    eprintln!("  --min N            Drop tickers with recent score below N (default: 10)");
    eprintln!("  --maxprice N       Drop tickers priced above N (default: 9999999)");
    eprintln!("  --sort N           1=Total 2=Recent 3=Prev 4=Change 5=Rockets (default: 1)");
    eprintln!("  --advanced         Fetch extended market stats per ticker");
    eprintln!("  --csv              Write <filename>.csv instead of <filename>.txt");
    eprintln!("  --filename NAME    Output file stem (default: table_records)");
    eprintln!("  --stdout           Print the table instead of writing a file");
    eprintln!("  --proxy-file PATH  Rotate page requests across proxies from PATH");
    eprintln!("  --symbols-file PATH  Load the ticker allow-list from PATH");
    eprintln!("  --no-parallel      Aggregate windows sequentially");
    eprintln!("  --concurrency N    Max parallel quote fetches (default: {})", DEFAULT_CONCURRENCY);
}

fn format_elapsed(start: Instant) -> String {
    let secs = start.elapsed().as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendwatch=info,reddit_client=info,yahoo_client=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = match Options::parse(&args) {
        Ok(opts) => opts,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("{}", msg);
                eprintln!();
            }
            print_usage();
            std::process::exit(1);
        }
    };

    let start = Instant::now();

    let universe = match &opts.symbols_file {
        Some(path) => SymbolUniverse::from_file(path)?,
        None => SymbolUniverse::default_universe(),
    };
    tracing::info!("Symbol universe: {} tickers", universe.len());

    let reddit = match &opts.proxy_file {
        Some(path) => RedditClient::with_proxy_file(path)?,
        None => RedditClient::new(),
    };

    tracing::info!(
        "Getting submissions ({}h windows{})...",
        opts.interval,
        opts.subreddit
            .as_deref()
            .map(|s| format!(", r/{}", s))
            .unwrap_or_default()
    );
    let (recent_posts, prev_posts) = reddit
        .fetch_recent_and_previous(opts.interval, opts.subreddit.as_deref())
        .await?;
    tracing::info!(
        "Fetched {} recent / {} previous submissions",
        recent_posts.len(),
        prev_posts.len()
    );

    tracing::info!("Searching for tickers...");
    let mode = if opts.parallel {
        Concurrency::Parallel
    } else {
        Concurrency::Sequential
    };
    // CPU-bound scan off the async runtime; a panic in a worker partition
    // surfaces here as a failed run rather than an undercounted table.
    let scan_universe = universe.clone();
    let (current, previous) = tokio::task::spawn_blocking(move || {
        (
            aggregate_window(&recent_posts, &scan_universe, mode),
            aggregate_window(&prev_posts, &scan_universe, mode),
        )
    })
    .await
    .map_err(|e| TrendError::TaskFailed(e.to_string()))?;

    tracing::info!("Populating results...");
    let rows = score_table(&current, &previous);
    let rows = filter_and_rank(rows, opts.min_score, opts.sort);
    tracing::info!(
        "{} tickers above the score threshold, sorted by {}",
        rows.len(),
        opts.sort.label()
    );

    tracing::info!("Getting financial stats...");
    let provider = Arc::new(YahooClient::new());
    let enriched = enrich_rows(provider, rows, opts.concurrency, opts.advanced).await?;
    let enriched = apply_max_price(enriched, opts.max_price);

    if opts.stdout {
        print!("{}", trend_report::render_text(&enriched, opts.advanced));
    } else if opts.csv {
        trend_report::write_csv_file(&enriched, opts.advanced, &opts.filename)?;
    } else {
        trend_report::write_text_file(&enriched, opts.advanced, &opts.filename)?;
    }

    tracing::info!("trendwatch took {} (H:MM:SS)", format_elapsed(start));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, String> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Options::parse(&args)
    }

    #[test]
    fn test_defaults() {
        let opts = parse(&[]).unwrap();
        assert_eq!(opts, Options::default());
        assert_eq!(opts.interval, 24);
        assert_eq!(opts.min_score, 10);
        assert_eq!(opts.sort, SortKey::Total);
        assert!(opts.parallel);
    }

    #[test]
    fn test_full_flag_set() {
        let opts = parse(&[
            "--interval", "12", "--sub", "wallstreetbets", "--min", "25", "--sort", "4",
            "--csv", "--filename", "movers", "--advanced", "--no-parallel",
        ])
        .unwrap();
        assert_eq!(opts.interval, 12);
        assert_eq!(opts.subreddit.as_deref(), Some("wallstreetbets"));
        assert_eq!(opts.min_score, 25);
        assert_eq!(opts.sort, SortKey::Change);
        assert!(opts.csv);
        assert_eq!(opts.filename, "movers");
        assert!(opts.advanced);
        assert!(!opts.parallel);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn test_sort_out_of_range_rejected() {
        assert!(parse(&["--sort", "6"]).is_err());
        assert!(parse(&["--sort", "0"]).is_err());
    }

    #[test]
    fn test_value_flag_without_value_rejected() {
        assert!(parse(&["--interval"]).is_err());
    }

    #[test]
    fn test_nonpositive_interval_rejected() {
        assert!(parse(&["--interval", "0"]).is_err());
        assert!(parse(&["--interval", "-4"]).is_err());
    }
}

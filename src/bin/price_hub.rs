use price_hub::config::Config;
use price_hub::errors::{ErrorBody, PriceHubError};
use price_hub::fetchers::http::HttpSampleFetcher;
use price_hub::services::price_service::PriceService;

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

fn ticker_arg(required: bool, multiple: bool) -> Arg<'static> {
    Arg::with_name("ticker")
        .short('t')
        .long("ticker")
        .value_name("TICKER")
        .help(if multiple {
            "Ticker symbol (case-insensitive), repeat for several"
        } else {
            "Ticker symbol (case-insensitive)"
        })
        .takes_value(true)
        .multiple_occurrences(multiple)
        .required(required)
}

fn minutes_arg() -> Arg<'static> {
    Arg::with_name("minutes")
        .short('m')
        .long("minutes")
        .value_name("MINUTES")
        .help("Lookback window in minutes")
        .takes_value(true)
        .required(true)
}

fn build_cli() -> App<'static> {
    App::new("price-hub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stock price averages and pairwise correlation from upstream price history")
        .arg(
            Arg::with_name("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Upstream price-history API base URL (overrides PRICE_HUB_BASE_URL)")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("legacy-errors")
                .long("legacy-errors")
                .help("Report insufficient overlap with the same status as invalid parameters")
                .takes_value(false)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("average")
                .about("Average price of one ticker over the window")
                .arg(ticker_arg(true, false))
                .arg(minutes_arg()),
        )
        .subcommand(
            SubCommand::with_name("correlation")
                .about("Pearson correlation between exactly two tickers")
                .arg(ticker_arg(true, true))
                .arg(minutes_arg()),
        )
        .subcommand(
            SubCommand::with_name("matrix")
                .about("Pairwise correlations across tickers (all listed tickers when none given)")
                .arg(ticker_arg(false, true))
                .arg(minutes_arg()),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let matches = build_cli().get_matches();

    let mut config = Config::from_env().context("reading configuration from environment")?;
    if let Some(url) = matches.value_of("base-url") {
        config = config.with_base_url(url);
    }
    config = config.with_collapse_overlap_errors(matches.is_present("legacy-errors"));

    let fetcher = HttpSampleFetcher::new(&config).context("creating upstream fetcher")?;
    let service = PriceService::new(config, Arc::new(fetcher));

    let outcome = match matches.subcommand() {
        Some(("average", sub)) => {
            let ticker = sub.value_of("ticker").unwrap_or_default();
            match parse_minutes(sub) {
                Ok(minutes) => render(service.average(ticker, minutes).await),
                Err(e) => Err(e),
            }
        }
        Some(("correlation", sub)) => match parse_minutes(sub) {
            Ok(minutes) => render(service.correlation(&tickers_of(sub), minutes).await),
            Err(e) => Err(e),
        },
        Some(("matrix", sub)) => match parse_minutes(sub) {
            Ok(minutes) => render(service.correlation_matrix(&tickers_of(sub), minutes).await),
            Err(e) => Err(e),
        },
        _ => {
            info!("No command specified. Use --help for usage information.");
            return Ok(());
        }
    };

    if let Err(e) = outcome {
        error!("{}", e);
        let status = e.status_code(service.config().collapse_overlap_errors);
        eprintln!("{}", serde_json::to_string(&ErrorBody::from(&e))?);
        info!("Request failed with status {}", status);
        std::process::exit(exit_code(&e));
    }

    Ok(())
}

fn tickers_of(matches: &ArgMatches) -> Vec<String> {
    matches
        .values_of("ticker")
        .map(|values| values.map(str::to_string).collect())
        .unwrap_or_default()
}

fn parse_minutes(matches: &ArgMatches) -> Result<i64, PriceHubError> {
    let raw = matches.value_of("minutes").unwrap_or_default();
    raw.trim().parse::<i64>().map_err(|_| {
        PriceHubError::InvalidParameter("Valid minutes parameter is required".to_string())
    })
}

fn render<T: Serialize>(result: Result<T, PriceHubError>) -> Result<(), PriceHubError> {
    let json = to_json(&result?)?;
    println!("{}", json);
    Ok(())
}

fn to_json<T: Serialize>(report: &T) -> Result<String, PriceHubError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn exit_code(err: &PriceHubError) -> i32 {
    match err {
        PriceHubError::InvalidParameter(_) => 2,
        PriceHubError::InsufficientOverlap { .. } => 3,
        PriceHubError::Upstream { .. } => 4,
        PriceHubError::Config(_) | PriceHubError::Serialization(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn average_takes_a_single_ticker() {
        let cli = build_cli();
        assert!(cli
            .clone()
            .try_get_matches_from(["price-hub", "average", "-t", "nvda", "-t", "pypl", "-m", "5"])
            .is_err());

        let matches = cli
            .try_get_matches_from(["price-hub", "average", "-t", "nvda", "-m", "5"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.value_of("ticker"), Some("nvda"));
        assert_eq!(parse_minutes(sub).unwrap(), 5);
    }

    #[test]
    fn correlation_collects_repeated_tickers() {
        let matches = build_cli()
            .try_get_matches_from(["price-hub", "correlation", "-t", "nvda", "-t", "pypl", "-m", "60"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "correlation");
        assert_eq!(tickers_of(sub), vec!["nvda", "pypl"]);
    }

    #[test]
    fn unparsable_minutes_is_invalid_parameter() {
        let matches = build_cli()
            .try_get_matches_from(["price-hub", "matrix", "-m", "ten"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let err = parse_minutes(sub).unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn serialization_failure_is_reported_as_error() {
        // JSON 对象的键必须是字符串
        let mut report = HashMap::new();
        report.insert((1u8, 2u8), 3u8);

        let err = render(Ok(report)).unwrap_err();
        assert!(matches!(err, PriceHubError::Serialization(_)));
        assert_eq!(exit_code(&err), 1);
    }
}

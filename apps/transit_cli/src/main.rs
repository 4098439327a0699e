mod report;

use anyhow::Context;
use aspect_config::AspectSettings;
use aspect_engine::ephemeris::{chart_positions, Ayanamsha, Body, FrameConfig, PositionProvider};
use aspect_engine::transit::{Horizon, PeriodTarget};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (default: configs/aspects.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the sidereal zodiac with this ayanamsha (e.g. lahiri).
    #[arg(long, global = true)]
    sidereal: Option<String>,

    /// Swiss Ephemeris data directory; analytic positions are used otherwise.
    #[cfg(feature = "swisseph")]
    #[arg(long, global = true)]
    ephe_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Positions, aspects and traits of one chart.
    Natal {
        /// Chart instant (RFC 3339).
        #[arg(long)]
        at: DateTime<Utc>,

        /// Comma-separated bodies (default: Sun through Pluto).
        #[arg(long, value_delimiter = ',')]
        bodies: Vec<Body>,
    },
    /// Cross-chart aspects and compatibility scores.
    Synastry {
        #[arg(long)]
        first: DateTime<Utc>,

        #[arg(long)]
        second: DateTime<Utc>,
    },
    /// Transit windows against a natal chart.
    Transits {
        /// Natal chart instant (RFC 3339).
        #[arg(long)]
        natal: DateTime<Utc>,

        #[arg(long)]
        start: DateTime<Utc>,

        /// Range end; defaults to start plus the horizon span.
        #[arg(long)]
        end: Option<DateTime<Utc>>,

        /// 1D, 1W, 1M, 6M or 1Y. Sets step and excluded bodies.
        #[arg(long)]
        horizon: Option<Horizon>,

        /// Override the sampling step.
        #[arg(long)]
        step_hours: Option<f64>,

        /// Comma-separated transiting bodies (default: Sun through Pluto).
        #[arg(long, value_delimiter = ',')]
        bodies: Vec<Body>,

        /// Scan body pairs on the blocking thread pool.
        #[arg(long)]
        concurrent: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();

    let mut settings = aspect_config::load_settings(args.config.as_deref())?;
    if let Some(name) = &args.sidereal {
        let ayanamsha: Ayanamsha = name.parse()?;
        settings.frame = FrameConfig::sidereal(ayanamsha);
    }

    #[cfg(feature = "swisseph")]
    let provider = aspect_engine::ephemeris::SwissEphemerisAdapter::new(args.ephe_path.clone())
        .context("Failed to initialise Swiss Ephemeris")?;
    #[cfg(not(feature = "swisseph"))]
    let provider = aspect_engine::ephemeris::MeanOrbitProvider::new();

    run(provider, &settings, args.command).await
}

async fn run<P>(provider: P, settings: &AspectSettings, command: Command) -> anyhow::Result<()>
where
    P: PositionProvider + Send + Sync + 'static,
{
    let frame = settings.frame;
    let output = match command {
        Command::Natal { at, bodies } => {
            let bodies = or_planets(bodies);
            let points = chart_positions(&provider, &bodies, at, &frame)
                .with_context(|| format!("Failed to compute chart at {at}"))?;
            serde_json::to_value(report::natal(at, frame, points, &settings.natal_catalog)?)?
        }
        Command::Synastry { first, second } => {
            let a = chart_positions(&provider, &Body::PLANETS, first, &frame)?;
            let b = chart_positions(&provider, &Body::PLANETS, second, &frame)?;
            let scorer = aspect_engine::synastry::SynastryScorer::new(settings.natal_catalog.clone());
            serde_json::to_value(scorer.compare(&a, &b)?)?
        }
        Command::Transits {
            natal,
            start,
            end,
            horizon,
            step_hours,
            bodies,
            concurrent,
        } => {
            let natal_points = chart_positions(&provider, &Body::PLANETS, natal, &frame)
                .with_context(|| format!("Failed to compute natal chart at {natal}"))?;
            let targets = PeriodTarget::natal_chart(&natal_points, &settings.transit_catalog);
            let horizon = match (horizon, end) {
                (None, None) => Some(Horizon::Month),
                (h, _) => h,
            };
            let mut request =
                settings.scan_request(or_planets(bodies), targets, start, end, horizon)?;
            if let Some(hours) = step_hours {
                request.step = aspect_config::hours(hours).context("Invalid --step-hours")?;
            }

            log::info!(
                "Scanning {} bodies from {} to {} every {}m",
                request.bodies.len(),
                request.start,
                request.end,
                request.step.num_minutes()
            );
            let periods = if concurrent {
                aspect_engine::transit::find_aspect_periods_concurrent(Arc::new(provider), &request)
                    .await?
            } else {
                aspect_engine::transit::find_aspect_periods(&provider, &request)?
            };
            serde_json::to_value(report::timeline(natal, &request, periods))?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn or_planets(bodies: Vec<Body>) -> Vec<Body> {
    if bodies.is_empty() {
        Body::PLANETS.to_vec()
    } else {
        bodies
    }
}

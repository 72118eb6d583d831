use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressStyle};
use smartroute_optimizer::{
    editing::set_extra_fee,
    error::PlanError,
    json::types::{JsonPlanningInput, JsonPlanningOutput},
    pipeline::{
        geocode_stage::GeocodeSettings,
        planner::{PlanOutcome, PlanProgress, Planner, PlannerParams},
    },
    problem::{coordinate::Coordinate, route_config::RouteConfig},
};
use smartroute_providers::{
    geocoding::Geocoder,
    track_asia_api::{TrackAsiaClient, TrackAsiaClientParams},
};
use tracing::{info, warn};

use crate::{geocoder::build_geocoder, parsers};

#[derive(Args)]
pub struct OptimizeArgs {
    /// Orders file, see `generate json-schema`
    #[arg(short, long)]
    input: PathBuf,

    /// Warehouse as `lat,lng`
    #[arg(long, value_parser = parsers::parse_coordinate, conflicts_with = "origin_address")]
    origin: Option<Coordinate>,

    /// Warehouse address, geocoded before planning
    #[arg(long)]
    origin_address: Option<String>,

    /// Route configuration file, replaces the one in the input file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_orders: Option<usize>,

    #[arg(long)]
    cost_per_km: Option<f64>,

    #[arg(long)]
    cost_per_point: Option<f64>,

    #[arg(long)]
    force_single_vehicle: bool,

    /// Flat fee paid to each shipper on top of the estimated cost
    #[arg(long)]
    extra_fee: Option<f64>,

    /// Makes clustering reproducible
    #[arg(long)]
    seed: Option<u64>,

    /// Delay between geocoding requests (e.g., "100ms", "1s")
    #[arg(long, value_parser = parsers::parse_duration, default_value = "100ms")]
    geocode_delay: jiff::SignedDuration,

    /// Routes JSON output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sequence clusters locally without calling the solver
    #[arg(long)]
    no_solver: bool,
}

impl OptimizeArgs {
    fn route_config(&self, input: &JsonPlanningInput) -> Result<RouteConfig, anyhow::Error> {
        let mut config = match &self.config {
            Some(path) => read_json::<RouteConfig>(path)?,
            None => input.config.clone().unwrap_or_default(),
        };

        if let Some(max_orders) = self.max_orders {
            config.max_orders_per_shipper = max_orders;
        }
        if let Some(cost_per_km) = self.cost_per_km {
            config.cost_per_km = cost_per_km;
        }
        if let Some(cost_per_point) = self.cost_per_point {
            config.cost_per_point = cost_per_point;
        }
        if self.force_single_vehicle {
            config.force_single_vehicle = true;
        }

        config.validate()?;

        Ok(config)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, anyhow::Error> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(value)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), anyhow::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;

    Ok(())
}

async fn resolve_origin<G: Geocoder>(
    args: &OptimizeArgs,
    input: &JsonPlanningInput,
    geocoder: &G,
) -> Result<Coordinate, anyhow::Error> {
    if let Some(origin) = args.origin.or(input.origin) {
        return Ok(origin);
    }

    let Some(address) = args
        .origin_address
        .as_deref()
        .or(input.origin_address.as_deref())
    else {
        bail!("An origin is required, pass --origin or --origin-address");
    };

    match geocoder.geocode(address).await? {
        Some(point) => {
            let origin = Coordinate::from(point);
            info!("Origin {:?} geocoded to {}, {}", address, origin.lat, origin.lng);
            Ok(origin)
        }
        None => bail!("Origin address {:?} not found", address),
    }
}

fn progress_bar() -> Result<ProgressBar, anyhow::Error> {
    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::default_bar().template("{msg:>12} [{bar:40}] {pos}/{len}")?);

    Ok(bar)
}

fn print_summary(outcome: &PlanOutcome) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Route", "Stops", "Distance", "Fee", "COD", "Net"]);

    for route in &outcome.routes {
        let net = if route.is_unassigned() {
            String::from("-")
        } else {
            format!("{:.0}", route.net_collection())
        };

        table.add_row(vec![
            route.name.clone(),
            route.len().to_string(),
            route.total_distance_km.to_string(),
            format!("{:.0}", route.shipping_fee()),
            format!("{:.0}", route.total_cod()),
            net,
        ]);
    }

    let summary = outcome.summary();
    let stops: usize = outcome
        .routes
        .iter()
        .filter(|route| !route.is_unassigned())
        .map(|route| route.len())
        .sum();
    table.add_row(vec![
        format!("{} routes", summary.route_count),
        stops.to_string(),
        summary.total_distance_km.to_string(),
        format!("{:.0}", summary.total_cost + summary.total_extra_fee),
        format!("{:.0}", summary.total_cod),
        format!("{:.0}", summary.net_collection),
    ]);

    println!("{table}");

    let report = &outcome.report;
    if !report.excluded.is_empty() {
        warn!(
            "{} of {} orders could not be planned",
            report.excluded.len(),
            report.requested
        );
        for exclusion in &report.excluded {
            warn!("  {} ({:?})", exclusion.order_id, exclusion.reason);
        }
    }

    for fallback in &report.fallbacks {
        warn!(
            "Cluster {} was sequenced locally: {}",
            fallback.cluster_index, fallback.reason
        );
    }
}

pub async fn run(args: OptimizeArgs) -> Result<(), anyhow::Error> {
    let mut input = read_json::<JsonPlanningInput>(&args.input)?;
    let config = args.route_config(&input)?;

    if let Some(fee) = args.extra_fee
        && (!fee.is_finite() || fee < 0.0)
    {
        bail!("--extra-fee must be a non-negative amount");
    }

    let client = TrackAsiaClient::new(TrackAsiaClientParams::from_env()?);
    let geocoder = build_geocoder(client.clone());
    let origin = resolve_origin(&args, &input, &geocoder).await?;

    info!(
        "Planning {} orders from {}, {}",
        input.orders.len(),
        origin.lat,
        origin.lng
    );

    let bar = progress_bar()?;
    let progress = bar.clone();

    let params = PlannerParams {
        config,
        geocode: GeocodeSettings {
            request_delay: args.geocode_delay,
            ..GeocodeSettings::default()
        },
        seed: args.seed,
        skip_solver: args.no_solver,
        ..PlannerParams::default()
    };

    let planner = Planner::new(geocoder, client, params).with_progress(move |event| match event {
        PlanProgress::Geocoding { done, total } => {
            progress.set_message("Geocoding");
            progress.set_length(total as u64);
            progress.set_position(done as u64);
        }
        PlanProgress::Clustering { k } => {
            progress.set_message(format!("Clustering ({k})"));
        }
        PlanProgress::Solving { done, total } => {
            progress.set_message("Solving");
            progress.set_length(total as u64);
            progress.set_position(done as u64);
        }
    });

    let cancel = planner.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancelling, press Ctrl-C again to abort");
            cancel.cancel();

            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        }
    });

    let result = planner.plan(&mut input.orders, origin).await;
    bar.finish_and_clear();

    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(error @ PlanError::Cancelled { .. }) => {
            // Keep the coordinates found so far so a retry doesn't geocode them again
            let located = input.orders.iter().filter(|order| order.is_located()).count();
            if let Some(output) = &args.output {
                let partial = output.with_extension("partial.json");
                write_json(&partial, &input)?;
                info!(
                    "Wrote {} located orders to {}",
                    located,
                    partial.display()
                );
            }

            return Err(error.into());
        }
        Err(error) => return Err(error.into()),
    };

    if let Some(fee) = args.extra_fee {
        let driven = outcome
            .routes
            .iter()
            .filter(|route| !route.is_unassigned())
            .map(|route| route.id.clone())
            .collect::<Vec<_>>();

        for route_id in driven {
            set_extra_fee(&mut outcome.routes, &route_id, fee)?;
        }
    }

    if outcome.is_empty() {
        info!("Nothing to plan");
    } else {
        print_summary(&outcome);
    }

    if let Some(output) = &args.output {
        write_json(output, &JsonPlanningOutput::new(origin, outcome))?;
        info!("Routes written to {}", output.display());
    }

    Ok(())
}

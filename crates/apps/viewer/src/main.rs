mod config;
mod events;

use std::io::Write;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use engine::{Collaborators, FixedGeolocator, RefreshOutcome, ViewportController};
use foundation::{LatLon, ViewportError};
use layers::{MarkerCategory, RecordingSurface};
use runtime::NoticeLevel;
use streaming::{FetchError, HttpBackend, HttpClientConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_RADIUS_M, DEFAULT_TIMEOUT_S, ViewerConfig, parse_lat_lon,
};
use crate::events::WatchEvent;

#[derive(Parser, Debug)]
#[command(author, version, about = "Wheelchair accessibility map viewer")]
struct Args {
    /// API root serving /amenities and /reports
    #[arg(long, env = "ACCESS_MAP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Amenity query radius in meters
    #[arg(
        long,
        env = "ACCESS_MAP_RADIUS_M",
        default_value_t = DEFAULT_RADIUS_M,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    radius: u32,

    /// Request timeout in seconds
    #[arg(long, env = "ACCESS_MAP_TIMEOUT_S", default_value_t = DEFAULT_TIMEOUT_S)]
    timeout: u64,

    /// Position answered by `locate`: <lat>,<lon>. Without it location is denied.
    #[arg(long, value_parser = parse_lat_lon)]
    home: Option<LatLon>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the map from stdin events (move, zoom, locate, report, show, quit)
    Watch {
        /// Initial map center: <lat>,<lon>
        #[arg(long, value_parser = parse_lat_lon)]
        center: Option<LatLon>,
    },

    /// Query one viewport and print its amenity markers
    Once {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

impl Args {
    fn config(&self) -> ViewerConfig {
        let defaults = ViewerConfig::default();
        ViewerConfig {
            http: HttpClientConfig {
                base_url: self.base_url.clone(),
                timeout: Duration::from_secs(self.timeout),
            },
            radius_m: self.radius,
            home: self.home,
            ..defaults
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid center: {0}")]
    Center(#[from] ViewportError),
    #[error("amenity query failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("stdio: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match LocalSet::new().block_on(&runtime, run(args.command, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, mut config: ViewerConfig) -> Result<(), AppError> {
    match &command {
        Command::Once { lat, lon } => config.camera.center = LatLon::checked(*lat, *lon)?,
        Command::Watch { center: Some(center) } => config.camera.center = *center,
        Command::Watch { center: None } => {}
    }

    let backend = Rc::new(HttpBackend::new(&config.http)?);
    info!(base_url = backend.base_url(), "using backend");
    let collaborators = Collaborators {
        amenities: backend.clone(),
        reports: backend,
        geolocator: Rc::new(FixedGeolocator::new(config.home)),
    };
    let controller = ViewportController::new(
        RecordingSurface::new(),
        collaborators,
        config.camera,
        config.radius_m,
    );

    match command {
        Command::Once { .. } => once(&controller).await,
        Command::Watch { .. } => watch(&controller).await,
    }
}

async fn once(controller: &ViewportController<RecordingSurface>) -> Result<(), AppError> {
    if let Some(refresh) = controller.coordinator().begin_refresh(controller.viewport()) {
        let outcome = refresh.await;
        info!(generation = %outcome.generation(), applied = outcome.is_applied(), "refresh finished");
        if let RefreshOutcome::Failed { error, .. } = outcome {
            return Err(error.into());
        }
    }
    print_category(controller, MarkerCategory::Amenity)?;
    Ok(())
}

async fn watch(controller: &ViewportController<RecordingSurface>) -> Result<(), AppError> {
    let (_initial, loaded) = controller.start().await;
    if let Err(err) = loaded {
        warn!("reports unavailable: {err}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match WatchEvent::parse(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match event {
            WatchEvent::Move(center) => {
                if controller.on_viewport_settled(center, None).is_none() {
                    eprintln!("ignored invalid center {center}");
                }
            }
            WatchEvent::Zoom(zoom) => {
                controller.on_zoom_settled(zoom);
            }
            WatchEvent::Locate => {
                // The denial is surfaced as a notice below.
                let _ = controller.locate().await;
            }
            WatchEvent::Report {
                issue_type,
                description,
            } => {
                let draft = controller.report_draft(issue_type, description);
                let _ = controller.submit_report(draft).await;
            }
            WatchEvent::Show => {
                for category in MarkerCategory::ALL {
                    print_category(controller, category)?;
                }
            }
            WatchEvent::Quit => break,
        }

        for notice in controller.drain_notices() {
            match notice.level {
                NoticeLevel::Info => println!("{}", notice.message),
                NoticeLevel::Error => eprintln!("{}", notice.message),
            }
        }
    }

    controller.shutdown();
    Ok(())
}

fn print_category(
    controller: &ViewportController<RecordingSurface>,
    category: MarkerCategory,
) -> std::io::Result<()> {
    let registry = controller.registry().borrow();
    let mut out = std::io::stdout().lock();
    writeln!(out, "{category} ({})", registry.len(category))?;
    for marker in registry.descriptors(category) {
        let position = marker.position();
        writeln!(
            out,
            "  {:.5},{:.5}  {}",
            position.lat,
            position.lon,
            marker.popup().join(" | ")
        )?;
    }
    Ok(())
}

mod config;
mod controller;
mod geo;
mod heat;
mod host;
mod sampler;
mod store;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::config::Config;
use crate::controller::{AutoState, Controller, ControllerEvent};
use crate::geo::ViewportSource;
use crate::heat::{projection_from, HeatLayer, SvgSurface};
use crate::host::MapView;
use crate::sampler::{DeviceSampler, ReplayPositioning};
use crate::store::{FileStore, StoreError};

type AppController = Controller<FileStore, DeviceSampler<ReplayPositioning>>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to write overlay {path}: {source}")]
    Overlay {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Parser)]
#[command(name = "location-heatmap")]
#[command(about = "Record device locations and render them as a heat map")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture one point now
    Add,
    /// Capture points periodically until interrupted
    Record {
        /// Stop after this many saved points
        #[arg(long)]
        count: Option<usize>,
    },
    /// Write the heat overlay as an SVG file
    Render {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the point count and last capture time
    Status,
    /// Show the most recently captured point
    Last,
    /// Delete every recorded point
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let result = match cli.command {
        Commands::Add => add(&config).await,
        Commands::Record { count } => record(&config, count).await,
        Commands::Render { output } => render(&config, output).await,
        Commands::Status => status(&config).await,
        Commands::Last => last(&config).await,
        Commands::Clear => clear(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Opens the map at the configured center; the overlay surface is measured
/// once the map is laid out.
fn map_view(config: &Config) -> Arc<MapView> {
    let map = MapView::new(config.map.center, config.map.span_deg, 0.0, 0.0);
    map.resize(config.map.width, config.map.height);
    Arc::new(map)
}

async fn open(
    config: &Config,
    map: Arc<MapView>,
    redraw: Option<mpsc::UnboundedSender<()>>,
) -> Result<AppController, StoreError> {
    let store = FileStore::new(config.store.path.clone());

    let fixes = config
        .sampler
        .track
        .iter()
        .map(|c| (c.latitude(), c.longitude()));
    let mut backend = ReplayPositioning::new(fixes, config.sampler.cycle);
    if config.sampler.deny_permission {
        backend = backend.denying_permission();
    }
    let sampler = DeviceSampler::new(backend, config.sampler_timeouts());

    let mut layer = HeatLayer::new();
    layer.set_projection(projection_from(map));
    if let Some(tx) = redraw {
        layer.set_invalidate(move || {
            let _ = tx.send(());
        });
    }

    Controller::new(
        store,
        sampler,
        Arc::new(Mutex::new(layer)),
        config.controller_settings(),
    )
    .await
}

/// Renders the current heat layer into `path`, returning the number of blobs.
fn write_overlay(
    controller: &AppController,
    map: &MapView,
    path: &Path,
) -> std::io::Result<usize> {
    let (width, height) = map
        .viewport()
        .map(|v| (v.surface_width_px, v.surface_height_px))
        .unwrap_or((0.0, 0.0));
    let mut surface = SvgSurface::new(width, height);

    let layer = controller.heat_layer();
    let drawn = layer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .render(&mut surface);

    std::fs::write(path, surface.finish())?;
    Ok(drawn)
}

/// Redraw during recording; a failed write is logged and the next redraw retries.
fn redraw(controller: &AppController, map: &MapView, path: &Path) {
    if let Err(e) = write_overlay(controller, map, path) {
        log::error!("Failed to write overlay {}: {}", path.display(), e);
    }
}

async fn add(config: &Config) -> Result<(), CliError> {
    let controller = open(config, map_view(config), None).await?;

    match controller.add_now().await? {
        Some(sample) => println!("Saved point #{} at {}", sample.id, sample.coordinate),
        None => println!("No fix available"),
    }
    print_state(&controller);
    Ok(())
}

async fn record(config: &Config, count: Option<usize>) -> Result<(), CliError> {
    let map = map_view(config);
    let (redraw_tx, mut redraw_rx) = mpsc::unbounded_channel();
    let controller = open(config, map.clone(), Some(redraw_tx)).await?;
    let mut events = controller.subscribe();

    if let Some(last) = controller.last_point().await? {
        map.recenter(last);
    }

    if controller.toggle_auto() == AutoState::AutoCapturing {
        println!(
            "Recording every {:?} into {} (Ctrl-C to stop)",
            config.capture.period,
            config.store.path.display()
        );
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut saved = 0;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            Some(()) = redraw_rx.recv() => {
                redraw(&controller, &map, &config.render.output);
            }
            event = events.recv() => match event {
                Ok(ControllerEvent::PointSaved(coordinate)) => {
                    map.recenter(coordinate);
                    redraw(&controller, &map, &config.render.output);
                    saved += 1;
                    if count.is_some_and(|n| saved >= n) {
                        break;
                    }
                }
                Ok(ControllerEvent::StateChanged(state)) => {
                    log::debug!(
                        "{} | {} | {}",
                        state.count_label(),
                        state.timestamp_label(),
                        state.auto_toggle_text()
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Missed {} controller events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    controller.shutdown().await;
    redraw(&controller, &map, &config.render.output);
    print_state(&controller);
    Ok(())
}

async fn render(config: &Config, output: Option<PathBuf>) -> Result<(), CliError> {
    let map = map_view(config);
    let controller = open(config, map.clone(), None).await?;

    if let Some(last) = controller.last_point().await? {
        map.recenter(last);
    }

    let path = output.unwrap_or_else(|| config.render.output.clone());
    let drawn = write_overlay(&controller, &map, &path).map_err(|source| CliError::Overlay {
        path: path.clone(),
        source,
    })?;
    let total = controller
        .heat_layer()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .len();
    println!(
        "Wrote {} ({} of {} points visible)",
        path.display(),
        drawn,
        total
    );
    Ok(())
}

async fn status(config: &Config) -> Result<(), CliError> {
    let controller = open(config, map_view(config), None).await?;
    print_state(&controller);
    Ok(())
}

async fn last(config: &Config) -> Result<(), CliError> {
    let controller = open(config, map_view(config), None).await?;
    match controller.last_point().await? {
        Some(point) => println!("Last point: {}", point),
        None => println!("No points yet."),
    }
    Ok(())
}

async fn clear(config: &Config) -> Result<(), CliError> {
    let controller = open(config, map_view(config), None).await?;
    controller.clear_all().await?;
    print_state(&controller);
    Ok(())
}

fn print_state(controller: &AppController) {
    let state = controller.display_state();
    println!("{}  {}", state.count_label(), state.timestamp_label());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.store.path = dir.join("locations.jsonl");
        config
    }

    #[tokio::test]
    async fn render_writes_svg_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let output = dir.path().join("heat.svg");

        render(&config, Some(output.clone())).await.unwrap();
        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.starts_with("<svg") && svg.ends_with("</svg>"));
    }

    #[tokio::test]
    async fn render_fails_when_overlay_cannot_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let output = dir.path().join("missing").join("heat.svg");

        let err = render(&config, Some(output.clone())).await.unwrap_err();
        assert!(matches!(err, CliError::Overlay { ref path, .. } if *path == output), "{err}");
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn write_overlay_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let map = map_view(&config);
        let controller = open(&config, map.clone(), None).await.unwrap();

        let ok = dir.path().join("heat.svg");
        assert_eq!(write_overlay(&controller, &map, &ok).unwrap(), 0);

        let bad = dir.path().join("missing").join("heat.svg");
        assert!(write_overlay(&controller, &map, &bad).is_err());
    }
}

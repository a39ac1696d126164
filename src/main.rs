//! HMC Dashboard entry point: windowed viewer, or a one-shot headless fetch.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use eframe::egui;
use hmc_dashboard::charts::{FigureCapture, StaticChartRenderer};
use hmc_dashboard::client::HttpPlotSource;
use hmc_dashboard::config::DashboardConfig;
use hmc_dashboard::client::PlotRequest;
use hmc_dashboard::controller::{Page, RefreshOutcome, Selection, ViewController};
use hmc_dashboard::data::{slug_for, UserDirectory};
use hmc_dashboard::gui::DashboardApp;
use hmc_dashboard::logging;
use std::path::Path;
use std::process::ExitCode;

const EXPORT_SIZE: (u32, u32) = (1400, 700);

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let mut config =
        DashboardConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    args.apply_overrides(&mut config);
    let server_url = config.validate()?;

    let source = HttpPlotSource::new(&server_url, config.connect_timeout(), config.read_timeout());
    tracing::info!(server = %source.base(), "Using dashboard server");
    let selection = Selection::new(config.default_user.clone(), config.default_view.clone());

    if args.headless {
        let page = args.page.map(Page::from).unwrap_or_default();
        let other_user = args.other_user.as_deref().unwrap_or(selection.user.as_str());
        let caption = match page {
            Page::Overview => format!("{} {}", slug_for(&selection.user), selection.view),
            Page::CompareUsers => format!(
                "{} vs {} {}",
                slug_for(&selection.user),
                slug_for(other_user),
                selection.view
            ),
            paired => format!("{} {}", slug_for(&selection.user), paired.title()),
        };
        let request = page
            .request(&selection, other_user)
            .ok_or_else(|| anyhow::anyhow!("page `{page}` has no chart"))?;
        return run_headless(source, request, &caption, args.export.as_deref());
    }

    let directory = load_directory(&config);
    let views = config.view_catalog();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("HMC Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "HMC Dashboard",
        options,
        Box::new(move |cc| {
            Ok(Box::new(DashboardApp::new(
                cc, source, selection, directory, views,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to run window: {err}"))?;

    Ok(ExitCode::SUCCESS)
}

/// Fetch one chart, print the status line and optionally export it.
fn run_headless(
    source: HttpPlotSource,
    request: PlotRequest,
    caption: &str,
    export: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let mut controller = ViewController::new(source);
    let mut capture = FigureCapture::default();

    controller.refresh(request);
    controller.wait_until_idle(&mut capture, None);
    println!("{}", controller.view_model().status());

    if !matches!(
        controller.view_model().last_outcome(),
        Some(RefreshOutcome::Loaded(_))
    ) {
        return Ok(ExitCode::FAILURE);
    }

    if let (Some(path), Some(figure)) = (export, capture.figure()) {
        let (width, height) = EXPORT_SIZE;
        StaticChartRenderer::render_png(figure, caption, path, width, height)
            .with_context(|| format!("failed to export chart to {}", path.display()))?;
        println!("Saved {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Users for the selector; falls back to the default user alone when the
/// metadata file is missing or unreadable.
fn load_directory(config: &DashboardConfig) -> UserDirectory {
    match UserDirectory::load_csv(&config.metadata_file) {
        Ok(directory) if !directory.is_empty() => directory,
        Ok(_) => {
            tracing::warn!(path = %config.metadata_file.display(), "User metadata is empty");
            UserDirectory::fallback(&config.default_user)
        }
        Err(err) => {
            tracing::warn!(path = %config.metadata_file.display(), error = %err, "User metadata unavailable");
            UserDirectory::fallback(&config.default_user)
        }
    }
}

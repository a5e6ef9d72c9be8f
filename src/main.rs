//! quakemap - Interactive web map of recent earthquakes.
//!
//! Fetches a USGS GeoJSON summary feed, colors each event by depth, sizes it
//! by magnitude, and renders a Leaflet map with popups and a depth legend.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

mod classify;
mod cli;
mod client;
mod errors;
mod legend;
mod map;
mod models;
mod output;
mod server;
mod style;

use cli::{Cli, Command};
use client::UsgsClient;
use map::{LayerSource, MapContext, MapOptions};
use models::{Feature, FeatureCollection};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Render(args) => cmd_render(args),
        Command::Serve(args) => cmd_serve(args),
        Command::Events(args) => cmd_events(args),
        Command::Legend(args) => cmd_legend(&args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Build the map context for a fetched feed with the layer embedded.
fn inline_map(feed: &FeatureCollection, options: MapOptions) -> MapContext {
    let ctx = MapContext::new(options, LayerSource::Inline(style::style_collection(feed)));
    match feed.title() {
        Some(title) => ctx.with_title(title),
        None => ctx,
    }
}

/// Write the page to a file, or stdout when no path is given.
fn write_page(output: Option<&Path>, page: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, page).with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote map to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(page.as_bytes())?;
            handle.flush()?;
        }
    }
    Ok(())
}

/// Execute the `render` command - one-shot fetch into a static page.
fn cmd_render(args: cli::RenderArgs) -> Result<()> {
    let client = UsgsClient::new().context("failed to create USGS client")?;

    let feed = client
        .fetch_feed(args.view.feed)
        .context("failed to fetch earthquake feed")?;

    info!("mapping {} events from {}", feed.features.len(), args.view.feed);

    let page = inline_map(&feed, args.view.map_options())
        .render_page()
        .context("failed to render map page")?;

    write_page(args.output.as_deref(), &page)
}

/// Execute the `serve` command - start the web server.
fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        feed: args.view.feed,
        map: args.view.map_options(),
        ..Default::default()
    };

    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌍 quakemap\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Feed:    {}", args.view.feed);
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))
}

/// Execute the `events` command - list events with their encoding.
fn cmd_events(args: cli::EventsArgs) -> Result<()> {
    let client = UsgsClient::new().context("failed to create USGS client")?;

    let feed = client
        .fetch_feed(args.feed)
        .context("failed to fetch earthquake feed")?;

    let events = most_recent(feed.features, args.limit);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &events, args.format)?;

    Ok(())
}

/// Sort by time descending and keep at most `limit` events.
fn most_recent(mut events: Vec<Feature>, limit: usize) -> Vec<Feature> {
    events.sort_by(|a, b| b.properties.time.cmp(&a.properties.time));
    events.truncate(limit);
    events
}

/// Execute the `legend` command.
fn cmd_legend(args: &cli::LegendArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_legend(&mut handle, &legend::depth_legend(), args.format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_feed() -> FeatureCollection {
        serde_json::from_str(models::tests::SAMPLE_FEED).unwrap()
    }

    #[test]
    fn test_inline_map_uses_feed_title() {
        let ctx = inline_map(&sample_feed(), MapOptions::default());
        assert_eq!(ctx.title, "USGS All Earthquakes, Past Week");

        let page = ctx.render_page().unwrap();
        assert!(page.contains("<title>USGS All Earthquakes, Past Week</title>"));
        assert!(page.contains("Magnitude: 4.5"));
    }

    #[test]
    fn test_write_page_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");
        let page = inline_map(&sample_feed(), MapOptions::default())
            .render_page()
            .unwrap();

        write_page(Some(&path), &page).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, page);
    }

    #[test]
    fn test_write_page_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("map.html");

        assert!(write_page(Some(&path), "<html></html>").is_err());
    }

    #[test]
    fn test_most_recent() {
        let events = most_recent(sample_feed().features, 2);
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["nc75012345", "us7000abcd"]);
    }
}

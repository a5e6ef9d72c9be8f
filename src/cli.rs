//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::client::Feed;
use crate::map::{Center, MapOptions};
use crate::output::Format;

/// Interactive web map of recent earthquakes.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the feed once and write a self-contained map page
    Render(RenderArgs),

    /// Serve the map page, fetching the feed per request
    Serve(ServeArgs),

    /// Print events with their marker color and radius
    Events(EventsArgs),

    /// Print the depth legend
    Legend(LegendArgs),
}

/// Map view arguments shared by `render` and `serve`.
#[derive(Parser, Debug)]
pub struct ViewArgs {
    /// Feed to map
    #[arg(long, default_value = "all_week", value_parser = parse_feed)]
    pub feed: Feed,

    /// Initial map center: lat,lon
    #[arg(long, default_value = "37.7749,-122.4194", value_parser = parse_center, allow_hyphen_values = true)]
    pub center: Center,

    /// Initial zoom level
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(0..=19))]
    pub zoom: u8,
}

impl ViewArgs {
    /// Map options for these arguments.
    #[must_use]
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            center: self.center,
            zoom: self.zoom,
        }
    }
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output file (defaults to stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `events` command.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Feed to fetch
    #[arg(long, default_value = "all_week", value_parser = parse_feed)]
    pub feed: Feed,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `legend` command.
#[derive(Parser, Debug)]
pub struct LegendArgs {
    /// Output format (ndjson writes one entry per line)
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse a feed name from string.
fn parse_feed(s: &str) -> Result<Feed, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a map center from string.
fn parse_center(s: &str) -> Result<Center, String> {
    s.parse()
}

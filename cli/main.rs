//! This module contains the main entrypoint to the rhetoric cli.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rhetoric_charts::{ChartController, ChartOptions, SvgRenderer, ValuesResponse, CHART_CONFIG};
use std::{convert::TryFrom, path::PathBuf};
use url::Url;

#[derive(Parser)]
#[command(
	about = "Guess who gave a radio address, and see which words gave it away.",
	disable_help_subcommand = true
)]
enum Options {
	#[command(name = "app")]
	App(Box<AppOptions>),
	#[command(name = "render")]
	Render(Box<RenderOptions>),
}

#[derive(Parser, Debug)]
#[command(about = "run the game server")]
struct AppOptions {
	#[arg(long, env = "DATABASE_URL", default_value = "sqlite:data.db")]
	database_url: Url,
	#[arg(long, env = "DATABASE_POOL_SIZE")]
	database_max_connections: Option<u32>,
	#[arg(long, default_value = "0.0.0.0")]
	host: std::net::IpAddr,
	#[arg(long, env = "PORT", default_value = "8080")]
	port: u16,
	#[arg(long = "assets", env = "ASSETS_DIR", default_value = "build/assets")]
	assets_dir: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "render a values response to svg")]
#[command(long_about = "render the chart of a /values json response and print it as svg")]
struct RenderOptions {
	#[arg(long, help = "the path to a .json values response")]
	input: PathBuf,
	#[arg(long, default_value = "Feature", help = "the category axis title")]
	label: String,
}

fn main() {
	let options = Options::parse();
	let result = match options {
		Options::App(options) => cli_app(*options),
		Options::Render(options) => cli_render(*options),
	};
	if let Err(error) = result {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn cli_app(options: AppOptions) -> Result<()> {
	let env = env_logger::Env::default().default_filter_or("rhetoric_app=info,rhetoric_util=info");
	env_logger::Builder::from_env(env)
		.format_level(false)
		.format_module_path(false)
		.format_timestamp(None)
		.init();
	rhetoric_app::run(rhetoric_app::Options {
		database_url: options.database_url.to_string(),
		database_max_connections: options.database_max_connections,
		host: options.host,
		port: options.port,
		assets_dir: options.assets_dir,
	})
}

fn cli_render(options: RenderOptions) -> Result<()> {
	let input = std::fs::read(&options.input)
		.with_context(|| format!("failed to read {}", options.input.display()))?;
	let response: ValuesResponse = serde_json::from_slice(&input)
		.with_context(|| format!("{} is not a values response", options.input.display()))?;
	println!("{}", render_svg(response, options.label)?);
	Ok(())
}

/// Draw every item of `response` with the chart's default geometry.
fn render_svg(response: ValuesResponse, label: String) -> Result<String> {
	let max_upper_bound = u32::try_from(response.values.len().max(1)).unwrap_or(u32::MAX);
	let options = ChartOptions {
		category_axis_label: label,
		max_upper_bound,
		series_id: None,
		table: String::new(),
	};
	let mut controller = ChartController::configure(options, SvgRenderer::new(CHART_CONFIG))?;
	let pending = controller.request_update(1, i64::from(max_upper_bound), "", "all", "descMag");
	controller.receive(pending.sequence, response)?;
	Ok(controller.renderer().to_svg())
}

#[test]
fn test_render_svg() {
	let response = ValuesResponse {
		feature_names: vec!["Word: \"tax\"".to_owned(), "Word: \"war\"".to_owned()],
		values: vec![0.5, -1.0],
		mag: 1.0,
	};
	let svg = render_svg(response, "Coefficient".to_owned()).unwrap();
	assert!(svg.starts_with("<svg"));
	assert!(svg.contains(">Coefficient</text>"));
	assert!(svg.contains(r#"class="blue-bar""#));
	assert!(svg.contains(r#"class="red-bar""#));
}

#[test]
fn test_render_svg_rejects_mismatched_response() {
	let response = ValuesResponse {
		feature_names: vec!["a".to_owned()],
		values: vec![],
		mag: 1.0,
	};
	assert!(render_svg(response, "Feature".to_owned()).is_err());
}

#[test]
fn test_parse_options() {
	let options =
		Options::try_parse_from(&["rhetoric", "render", "--input", "values.json"]).unwrap();
	match options {
		Options::Render(options) => {
			assert_eq!(options.input, PathBuf::from("values.json"));
			assert_eq!(options.label, "Feature");
		}
		Options::App(_) => panic!("expected the render command"),
	}
}

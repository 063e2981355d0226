use crate::api::values::{query_values, ValuesQuery};
use anyhow::Result;
use html::{component, html, raw};
use rhetoric_charts::{ChartController, ChartOptions, Range, SvgRenderer, CHART_CONFIG};
use sqlx::sqlite::SqlitePool;
use std::{collections::BTreeMap, convert::TryFrom};

/// The window a chart shows before the client takes over.
pub const INITIAL_LOWER: i64 = 1;
pub const INITIAL_UPPER: i64 = 20;
pub const INITIAL_ORDER: &str = "descMag";
pub const INITIAL_FEATURE_TYPE: &str = "all";

const ORDERS: [(&str, &str); 4] = [
	("descMag", "Largest magnitude"),
	("ascMag", "Smallest magnitude"),
	("descVal", "Largest value"),
	("ascVal", "Smallest value"),
];

const FEATURE_TYPES: [(&str, &str); 3] = [
	("all", "All features"),
	("word", "Words"),
	("pos", "Part of speech pairs"),
];

/// Clamp a table's row count to a usable maximum upper bound.
pub fn max_upper_bound(row_count: i64) -> u32 {
	u32::try_from(row_count.max(1)).unwrap_or(u32::MAX)
}

/// Everything the chart section shows, computed ahead of rendering.
#[derive(Clone)]
pub struct ChartSectionProps {
	pub options_json: String,
	pub max_upper_bound: u32,
	pub range: Range,
	/// Set when the initial window already asks for more items than the table has.
	pub upper_class: Option<&'static str>,
	pub svg: String,
}

/// Select the initial window exactly as the endpoint would answer the client's first request and draw it on the server.
pub async fn chart_section_props(
	pool: &SqlitePool,
	options: ChartOptions,
) -> Result<ChartSectionProps> {
	let mut controller = ChartController::configure(options, SvgRenderer::new(CHART_CONFIG))?;
	let pending = controller.request_update(
		INITIAL_LOWER,
		INITIAL_UPPER,
		"",
		INITIAL_FEATURE_TYPE,
		INITIAL_ORDER,
	);
	let search_params: BTreeMap<String, String> =
		url::form_urlencoded::parse(pending.request.query().as_bytes())
			.into_owned()
			.collect();
	let query = ValuesQuery::parse(Some(&search_params))?;
	let response = query_values(pool, &query).await?;
	controller.receive(pending.sequence, response)?;
	let upper_class = if controller.renderer().exhausted() {
		Some(controller.config().exhausted_class)
	} else {
		None
	};
	Ok(ChartSectionProps {
		options_json: serde_json::to_string(controller.options())?,
		max_upper_bound: controller.options().max_upper_bound,
		range: pending.request.range,
		upper_class,
		svg: controller.renderer().to_svg(),
	})
}

/// The chart controls and a `.graph` container holding the chart drawn on the server. The client takes the container over at boot.
#[component]
pub fn ChartSection(props: ChartSectionProps) {
	let max = props.max_upper_bound.to_string();
	html!(
		<>
			<div class="controls">
				<select id="order">{select_options(&ORDERS, INITIAL_ORDER)}</select>
				<select id="type">{select_options(&FEATURE_TYPES, INITIAL_FEATURE_TYPE)}</select>
				<input id="text" type="text" placeholder="Search features" />
				<input
					id="lower"
					type="number"
					min="1"
					max={max.clone()}
					value={props.range.lower.to_string()}
				/>
				<input
					id="upper"
					type="number"
					min="1"
					max={max}
					value={props.range.upper.to_string()}
					class={props.upper_class}
				/>
			</div>
			<div class="graph" data-options={props.options_json}>
				{raw!(props.svg)}
			</div>
		</>
	)
}

fn select_options(choices: &[(&'static str, &'static str)], selected: &str) -> Vec<html::Node> {
	choices
		.iter()
		.map(|(value, text)| {
			html!(
				<option value={*value} selected={*value == selected}>{*text}</option>
			)
		})
		.collect()
}

#[test]
fn test_max_upper_bound() {
	assert_eq!(max_upper_bound(0), 1);
	assert_eq!(max_upper_bound(-3), 1);
	assert_eq!(max_upper_bound(42), 42);
	assert_eq!(max_upper_bound(i64::MAX), u32::MAX);
}

#[test]
fn test_select_options() {
	let html = html::Node::from(select_options(&FEATURE_TYPES, "word")).render_to_string();
	insta::assert_snapshot!(html, @r###"<option value="all">All features</option><option value="word" selected>Words</option><option value="pos">Part of speech pairs</option>"###);
}

#[tokio::test]
async fn test_chart_section_prerenders_initial_window() {
	let pool = crate::store::test_pool().await;
	let options = ChartOptions {
		category_axis_label: "Contribution".to_owned(),
		max_upper_bound: 50,
		series_id: Some("7".to_owned()),
		table: "contribs".to_owned(),
	};
	let props = chart_section_props(&pool, options).await.unwrap();
	assert_eq!(props.range, Range { lower: 1, upper: 20 });
	let html = html!(<ChartSection props={props} />).render_to_string();
	// The window 1..20 is wider than the three contributions speech 7 has.
	assert!(html.contains(
		r#"<input id="upper" type="number" min="1" max="50" value="20" class="fadded" />"#
	));
	assert!(html.contains(r#"data-key="Word: &quot;terror&quot;""#));
	assert!(html.contains(r#"data-key="FIXED INTERCEPT""#));
	assert!(html.contains("&quot;table&quot;:&quot;contribs&quot;"));
	assert!(html.contains("<svg"));
}

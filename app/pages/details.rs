use crate::{
	layouts::{
		chart_section::{chart_section_props, max_upper_bound, ChartSection, ChartSectionProps},
		document::Document,
	},
	store::{self, Table},
	Context,
};
use anyhow::Result;
use html::{component, html};
use hyper::{Body, Request, Response};
use rhetoric_charts::ChartOptions;

const TITLE: &str = "How the model decides";

pub async fn get(context: &Context, _request: Request<Body>) -> Result<Response<Body>> {
	let num_coefs = store::row_count(&context.pool, Table::Coefs).await?;
	let options = ChartOptions {
		category_axis_label: "Coefficient".to_owned(),
		max_upper_bound: max_upper_bound(num_coefs),
		series_id: None,
		table: "coefs".to_owned(),
	};
	let chart = chart_section_props(&context.pool, options).await?;
	super::html_response(render(chart))
}

fn render(chart: ChartSectionProps) -> String {
	html!(<Page chart={chart} />).render_to_string()
}

#[component]
fn Page(chart: ChartSectionProps) {
	html!(
		<Document title={TITLE.to_owned()}>
			<main>
				<h1>{TITLE}</h1>
				<p>
					{"Every word and part of speech pair the model uses has a coefficient. "}
					{"Positive coefficients push a speech towards Obama and negative ones towards Bush."}
				</p>
				<ChartSection props={chart} />
				<p><a href="/">{"Back to the game"}</a></p>
			</main>
		</Document>
	)
}

#[tokio::test]
async fn test_render_coefficients() {
	let pool = store::test_pool().await;
	let options = ChartOptions {
		category_axis_label: "Coefficient".to_owned(),
		max_upper_bound: max_upper_bound(store::row_count(&pool, Table::Coefs).await.unwrap()),
		series_id: None,
		table: "coefs".to_owned(),
	};
	let chart = chart_section_props(&pool, options).await.unwrap();
	let html = render(chart);
	assert!(html.contains("<h1>How the model decides</h1>"));
	assert!(html.contains(r#"max="4""#));
	assert!(html.contains(r#"data-key="Word: &quot;freedom&quot;""#));
}

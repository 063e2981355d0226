use crate::{
	error::Error,
	layouts::{
		chart_section::{chart_section_props, max_upper_bound, ChartSection, ChartSectionProps},
		document::Document,
	},
	store::{self, Speech, Table},
	Context,
};
use anyhow::Result;
use html::{component, html, raw};
use hyper::{Body, Request, Response};
use rand::seq::SliceRandom;
use rhetoric_charts::ChartOptions;

const TITLE: &str = "Obama or Bush?";

#[derive(Clone)]
struct Props {
	speech: Speech,
	num_correct: u64,
	num_total: u64,
	num_contributors: i64,
	chart: ChartSectionProps,
}

pub async fn get(context: &Context, _request: Request<Body>) -> Result<Response<Body>> {
	let speech_id = {
		let mut rng = rand::thread_rng();
		context.speech_ids.choose(&mut rng).copied()
	};
	let speech_id = speech_id.ok_or(Error::ServiceUnavailable)?;
	let speech = store::speech(&context.pool, speech_id)
		.await?
		.ok_or(Error::NotFound)?;
	let (num_correct, num_total) = context
		.score
		.record(speech.predicted == speech.observed);
	let num_contributors =
		store::row_count(&context.pool, Table::Contribs { speech_id }).await?;
	let options = ChartOptions {
		category_axis_label: "Contribution".to_owned(),
		max_upper_bound: max_upper_bound(num_contributors),
		series_id: Some(speech_id.to_string()),
		table: "contribs".to_owned(),
	};
	let chart = chart_section_props(&context.pool, options).await?;
	super::html_response(render(Props {
		speech,
		num_correct,
		num_total,
		num_contributors,
		chart,
	}))
}

fn render(props: Props) -> String {
	html!(<Page props={props} />).render_to_string()
}

#[component]
fn Page(props: Props) {
	let outcome = if props.speech.predicted == props.speech.observed {
		"right"
	} else {
		"wrong"
	};
	// Paragraphs carry highlight spans and are inserted as stored.
	let paragraphs = props
		.speech
		.paragraphs
		.into_iter()
		.map(|paragraph| html!(<p>{raw!(paragraph)}</p>))
		.collect::<Vec<_>>();
	html!(
		<Document title={TITLE.to_owned()}>
			<main>
				<h1>{TITLE}</h1>
				<section class="speech">{paragraphs}</section>
				<section class="reveal">
					<p>
						{"The model guessed "}
						<strong>{props.speech.predicted}</strong>
						{". The speech was given by "}
						<strong>{props.speech.observed}</strong>
						{format!(", so the model was {}.", outcome)}
					</p>
					<p>
						{format!(
							"So far the model has been right {} out of {} times.",
							props.num_correct, props.num_total
						)}
					</p>
					<p>
						{format!(
							"{} features contributed to this prediction.",
							props.num_contributors
						)}
					</p>
					<p>
						<a href="/">{"Next speech"}</a>
						{" "}
						<a href="/details/">{"How the model decides"}</a>
					</p>
				</section>
				<ChartSection props={props.chart} />
			</main>
		</Document>
	)
}

#[test]
fn test_render() {
	let speech = Speech {
		id: 7,
		paragraphs: vec![
			"First paragraph.".to_owned(),
			r#"Second <span class="highlight">tax</span> paragraph."#.to_owned(),
		],
		predicted: "Obama".to_owned(),
		observed: "Bush & co".to_owned(),
	};
	let html = render(Props {
		speech,
		num_correct: 3,
		num_total: 5,
		num_contributors: 12,
		chart: ChartSectionProps {
			options_json: "{}".to_owned(),
			max_upper_bound: 12,
			range: rhetoric_charts::Range {
				lower: 1,
				upper: 12,
			},
			upper_class: None,
			svg: "<svg></svg>".to_owned(),
		},
	});
	assert!(html.contains("<p>First paragraph.</p>"));
	assert!(html.contains(r#"<p>Second <span class="highlight">tax</span> paragraph.</p>"#));
	assert!(html.contains("so the model was wrong"));
	assert!(html.contains("right 3 out of 5 times"));
	assert!(html.contains("12 features contributed"));
	assert!(html.contains("<strong>Bush &amp; co</strong>"));
	assert!(html.contains(r#"<div class="graph" data-options="{}"><svg></svg></div>"#));
	assert!(html.contains(r#"<input id="upper" type="number" min="1" max="12" value="12" />"#));
}

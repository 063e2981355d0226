use html::{component, html, raw};

#[component]
fn Greeting(name: String) {
	html!(
		<p class="greeting">{"Hello "}{name}{children}</p>
	)
}

#[test]
fn test_component() {
	let html = html!(
		<Greeting name={"Bush & Obama".to_owned()}>
			<strong>{"!"}</strong>
		</Greeting>
	)
	.render_to_string();
	assert_eq!(
		html,
		r#"<p class="greeting">Hello Bush &amp; Obama<strong>!</strong></p>"#
	);
}

#[test]
fn test_attributes() {
	let options = r#"{"table":"coefs"}"#.to_owned();
	let class: Option<&'static str> = None;
	let html = html!(
		<div class="graph" data-options={options}>
			<input id="upper" type="number" class={class} />
			<option value="all" selected={true}>{"All"}</option>
		</div>
	)
	.render_to_string();
	assert_eq!(
		html,
		concat!(
			r#"<div class="graph" data-options="{&quot;table&quot;:&quot;coefs&quot;}">"#,
			r#"<input id="upper" type="number" />"#,
			r#"<option value="all" selected>All</option>"#,
			"</div>",
		)
	);
}

#[test]
fn test_raw_and_fragments() {
	let paragraphs = vec!["<span class=\"highlight\">tax</span>", "plain"];
	let html = html!(
		<>
			{raw!("<!doctype html>")}
			{paragraphs.into_iter().map(|paragraph| html!(<p>{raw!(paragraph)}</p>)).collect::<Vec<_>>()}
			{None::<String>}
		</>
	)
	.render_to_string();
	assert_eq!(
		html,
		r#"<!doctype html><p><span class="highlight">tax</span></p><p>plain</p>"#
	);
}

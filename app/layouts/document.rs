use html::{component, html, raw};

/// The page shell. It loads the stylesheet and boots the chart client after `children`.
#[component]
pub fn Document(title: String) {
	html!(
		<>
			{raw!("<!doctype html>")}
			<html lang="en">
				<head>
					<meta charset="utf-8" />
					<meta content="width=device-width, initial-scale=1" name="viewport" />
					<title>{title}</title>
					<link href="/style.css" rel="stylesheet" />
				</head>
				<body>
					{children}
					<script type="module">
						{raw!(r#"import init from "/js/client.js"; init()"#)}
					</script>
				</body>
			</html>
		</>
	)
}

#[test]
fn test_document() {
	let html = html!(
		<Document title={"Bush & Obama".to_owned()}>
			<main>{"<b>"}</main>
		</Document>
	)
	.render_to_string();
	assert!(html.starts_with("<!doctype html><html lang=\"en\">"));
	assert!(html.contains("<title>Bush &amp; Obama</title>"));
	assert!(html.contains("<main>&lt;b&gt;</main>"));
	assert!(html.contains(r#"<script type="module">import init from "/js/client.js"; init()</script>"#));
}

use crate::{
	bar_chart::{Bar, BarSign, Tooltip, XAxis, YAxis},
	chart::{Annotation, ChartRenderer},
	common::Rect,
	config::ChartConfig,
	transition::Transition,
};
use std::fmt;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A detached SVG node. Both the string renderer and the DOM renderer build their nodes from these.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
	pub name: &'static str,
	pub attributes: Vec<(&'static str, String)>,
	pub text: Option<String>,
	pub children: Vec<Element>,
}

impl Element {
	pub fn new(name: &'static str) -> Element {
		Element {
			name,
			attributes: Vec::new(),
			text: None,
			children: Vec::new(),
		}
	}

	pub fn attribute(mut self, name: &'static str, value: impl ToString) -> Element {
		self.attributes.push((name, value.to_string()));
		self
	}

	pub fn text(mut self, text: impl Into<String>) -> Element {
		self.text = Some(text.into());
		self
	}

	pub fn child(mut self, child: Element) -> Element {
		self.children.push(child);
		self
	}

	pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Element {
		self.children.extend(children);
		self
	}
}

impl From<Element> for html::Node {
	fn from(element: Element) -> html::Node {
		let self_closing = element.text.is_none() && element.children.is_empty();
		let attributes: Vec<(html::AttributeKey, html::AttributeValue)> = element
			.attributes
			.into_iter()
			.map(|(name, value)| (name, value.into()))
			.collect();
		let text = element
			.text
			.map(|text| html::Node::EscapedText(html::EscapedTextNode(text.into())));
		let children: Vec<html::Node> = text
			.into_iter()
			.chain(element.children.into_iter().map(html::Node::from))
			.collect();
		html::Node::Host(html::HostNode {
			name: element.name,
			attributes,
			children,
			self_closing,
		})
	}
}

impl fmt::Display for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", html::Node::from(self.clone()))
	}
}

/// Round to two decimal places and drop trailing zeros.
pub fn format_coordinate(value: f64) -> String {
	let formatted = format!("{:.2}", value);
	let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
	match trimmed {
		"-0" | "" => "0".to_owned(),
		trimmed => trimmed.to_owned(),
	}
}

pub fn annotation_element(config: &ChartConfig, annotation: &Annotation) -> Element {
	let mut element = Element::new("text").attribute("class", config.annotation_class);
	if annotation.rotation != 0.0 {
		element = element.attribute(
			"transform",
			format!("rotate({})", format_coordinate(annotation.rotation)),
		);
	}
	element
		.attribute("x", format_coordinate(annotation.position.x))
		.attribute("y", format_coordinate(annotation.position.y))
		.attribute("dy", ".71em")
		.attribute("style", "text-anchor: middle")
		.text(annotation.text.clone())
}

pub fn bar_element(config: &ChartConfig, key: &str, sign: BarSign, rect: Rect) -> Element {
	Element::new("rect")
		.attribute("class", sign.class(config))
		.attribute("data-key", key)
		.attribute("x", format_coordinate(rect.x))
		.attribute("y", format_coordinate(rect.y))
		.attribute("width", format_coordinate(rect.w))
		.attribute("height", format_coordinate(rect.h))
}

pub fn x_axis_element(config: &ChartConfig, x_axis: &XAxis) -> Element {
	let tick_size = format_coordinate(config.axis_tick_size);
	Element::new("g")
		.attribute("class", "x axis")
		.attribute(
			"transform",
			format!("translate(0,{})", format_coordinate(x_axis.y)),
		)
		.child(Element::new("path").attribute("class", "domain").attribute(
			"d",
			format!(
				"M0,{}V0H{}V{}",
				tick_size,
				format_coordinate(x_axis.width),
				tick_size
			),
		))
}

pub fn y_axis_element(config: &ChartConfig, y_axis: &YAxis) -> Element {
	let tick_size = format_coordinate(config.axis_tick_size);
	let label_offset = format_coordinate(config.axis_tick_size + config.axis_tick_padding);
	let ticks = y_axis.ticks.iter().map(|tick| {
		Element::new("g")
			.attribute("class", "tick")
			.attribute("transform", format!("translate(0,{})", format_coordinate(tick.y)))
			.child(
				Element::new("line")
					.attribute("x2", format!("-{}", tick_size))
					.attribute("y2", "0"),
			)
			.child(
				Element::new("text")
					.attribute("x", format!("-{}", label_offset))
					.attribute("y", "0")
					.attribute("dy", ".32em")
					.attribute("style", "text-anchor: end")
					.text(tick.label.clone()),
			)
	});
	Element::new("g")
		.attribute("class", "y axis")
		.children(ticks)
		.child(Element::new("path").attribute("class", "domain").attribute(
			"d",
			format!(
				"M-{},0H0V{}H-{}",
				tick_size,
				format_coordinate(y_axis.height),
				tick_size
			),
		))
}

#[derive(Clone, Debug, PartialEq)]
struct SvgBar {
	key: String,
	sign: BarSign,
	rect: Rect,
	tooltip: Tooltip,
}

/// Keeps the chart as a scene and writes it out as a standalone SVG document. Transitions jump to their end.
#[derive(Clone, Debug)]
pub struct SvgRenderer {
	config: ChartConfig,
	annotations: Vec<Annotation>,
	bars: Vec<SvgBar>,
	axes: Option<(XAxis, YAxis)>,
	exhausted: bool,
}

impl SvgRenderer {
	pub fn new(config: ChartConfig) -> SvgRenderer {
		SvgRenderer {
			config,
			annotations: Vec::new(),
			bars: Vec::new(),
			axes: None,
			exhausted: false,
		}
	}

	pub fn exhausted(&self) -> bool {
		self.exhausted
	}

	pub fn bar_rects(&self) -> Vec<(&str, Rect)> {
		self.bars
			.iter()
			.map(|bar| (bar.key.as_str(), bar.rect))
			.collect()
	}

	pub fn document(&self) -> Element {
		let config = &self.config;
		let annotations = self
			.annotations
			.iter()
			.map(|annotation| annotation_element(config, annotation));
		let bars = self.bars.iter().map(|bar| {
			bar_element(config, &bar.key, bar.sign, bar.rect).child(
				Element::new("title").text(format!("{}: {}", bar.tooltip.label, bar.tooltip.value)),
			)
		});
		let mut plot = Element::new("g")
			.attribute(
				"transform",
				format!(
					"translate({},{})",
					format_coordinate(config.margin.left),
					format_coordinate(config.margin.top)
				),
			)
			.children(annotations)
			.children(bars);
		if let Some((x_axis, y_axis)) = &self.axes {
			plot = plot
				.child(x_axis_element(config, x_axis))
				.child(y_axis_element(config, y_axis));
		}
		Element::new("svg")
			.attribute("xmlns", SVG_NAMESPACE)
			.attribute("width", format_coordinate(config.width))
			.attribute("height", format_coordinate(config.height))
			.child(plot)
	}

	pub fn to_svg(&self) -> String {
		self.document().to_string()
	}
}

impl ChartRenderer for SvgRenderer {
	fn draw_annotations(&mut self, annotations: &[Annotation]) {
		self.annotations = annotations.to_vec();
	}

	fn remove_bar(&mut self, key: &str) {
		self.bars.retain(|bar| bar.key != key);
	}

	fn insert_bar(&mut self, bar: &Bar, initial: Rect) {
		self.bars.push(SvgBar {
			key: bar.key.clone(),
			sign: bar.sign,
			rect: initial,
			tooltip: bar.tooltip.clone(),
		});
	}

	fn update_bar(&mut self, bar: &Bar) {
		if let Some(svg_bar) = self.bars.iter_mut().find(|svg_bar| svg_bar.key == bar.key) {
			svg_bar.sign = bar.sign;
			svg_bar.tooltip = bar.tooltip.clone();
		}
	}

	fn transition_bars(&mut self, transition: Transition) {
		for (key, rect) in transition.settle() {
			if let Some(svg_bar) = self.bars.iter_mut().find(|svg_bar| svg_bar.key == key) {
				svg_bar.rect = rect;
			}
		}
	}

	fn drawn_rect(&self, key: &str) -> Option<Rect> {
		self.bars
			.iter()
			.find(|svg_bar| svg_bar.key == key)
			.map(|svg_bar| svg_bar.rect)
	}

	fn draw_axes(&mut self, x_axis: &XAxis, y_axis: &YAxis) {
		self.axes = Some((x_axis.clone(), y_axis.clone()));
	}

	fn set_exhausted(&mut self, exhausted: bool) {
		self.exhausted = exhausted;
	}
}

#[test]
fn test_format_coordinate() {
	assert_eq!(format_coordinate(210.9375), "210.94");
	assert_eq!(format_coordinate(88.00000000000001), "88");
	assert_eq!(format_coordinate(-0.0001), "0");
	assert_eq!(format_coordinate(0.5), "0.5");
	assert_eq!(format_coordinate(-25.0), "-25");
}

#[test]
fn test_element_display() {
	let element = Element::new("g")
		.attribute("class", "x axis")
		.child(Element::new("path").attribute("d", "M0,6V0H675V6"))
		.child(Element::new("text").text("a < b"))
		.child(Element::new("rect").attribute("data-key", r#"Word: "tax""#));
	assert_eq!(
		element.to_string(),
		concat!(
			r#"<g class="x axis"><path d="M0,6V0H675V6" /><text>a &lt; b</text>"#,
			r#"<rect data-key="Word: &quot;tax&quot;" /></g>"#,
		)
	);
}

#[test]
fn test_axis_elements() {
	let config = ChartConfig::default();
	let x_axis = x_axis_element(
		&config,
		&XAxis {
			y: 220.0,
			width: 675.0,
		},
	);
	assert_eq!(
		x_axis.to_string(),
		r#"<g class="x axis" transform="translate(0,220)"><path class="domain" d="M0,6V0H675V6" /></g>"#
	);
	let y_axis = y_axis_element(
		&config,
		&YAxis {
			height: 440.0,
			ticks: vec![crate::bar_chart::YAxisTick {
				y: 220.0,
				label: "0".to_owned(),
			}],
		},
	);
	assert_eq!(
		y_axis.to_string(),
		concat!(
			r#"<g class="y axis">"#,
			r#"<g class="tick" transform="translate(0,220)"><line x2="-6" y2="0" />"#,
			r#"<text x="-9" y="0" dy=".32em" style="text-anchor: end">0</text></g>"#,
			r#"<path class="domain" d="M-6,0H0V440H-6" /></g>"#,
		)
	);
}

#[test]
fn test_svg_renderer_is_idempotent() {
	use crate::{
		chart::{ChartController, ChartOptions},
		series::{Magnitude, Series},
	};
	let options = ChartOptions {
		category_axis_label: "Feature".to_owned(),
		max_upper_bound: 50,
		series_id: None,
		table: "coefs".to_owned(),
	};
	let series = Series::new(
		vec!["tax".to_owned(), "war".to_owned(), "jobs".to_owned()],
		vec![3.0, -2.0, 5.0],
	)
	.unwrap();
	let mut controller =
		ChartController::configure(options, SvgRenderer::new(ChartConfig::default())).unwrap();
	controller.render(series.clone(), Magnitude::new(5.0));
	let first = controller.renderer().to_svg();
	let first_frame = controller.frame().clone();
	controller.render(series, Magnitude::new(5.0));
	assert_eq!(controller.renderer().to_svg(), first);
	assert_eq!(controller.frame(), &first_frame);
	assert!(first.contains(r#"<rect class="red-bar" data-key="war""#));
	assert!(first.contains("<title>war: -2</title>"));
	assert!(first.contains(r#"transform="rotate(-90)""#));
	let heights: Vec<f64> = controller
		.renderer()
		.bar_rects()
		.iter()
		.map(|(_, rect)| rect.h)
		.collect();
	assert_eq!(heights.len(), 3);
	assert!((heights[0] - 132.0).abs() < 1e-9);
	assert!((heights[1] - 88.0).abs() < 1e-9);
	assert!((heights[2] - 220.0).abs() < 1e-9);
}

use crate::{
	bar_chart::{
		compute_bar_chart_frame, join_bars, tooltip_origin, Bar, BarChartFrame, Tooltip, XAxis,
		YAxis,
	},
	common::{Point, Rect},
	config::{ChartConfig, CHART_CONFIG},
	range::Range,
	request::ValuesRequest,
	series::{Magnitude, Series, SeriesError, ValuesResponse},
	transition::{BarTransition, Transition},
};
use std::fmt::Display;
use thiserror::Error;

/// The seam between the chart logic and whatever draws it.
pub trait ChartRenderer {
	fn draw_annotations(&mut self, annotations: &[Annotation]);
	fn remove_bar(&mut self, key: &str);
	/// Add a bar drawn at `initial`. A transition moving it into place follows.
	fn insert_bar(&mut self, bar: &Bar, initial: Rect);
	/// Refresh the class and tooltip of a bar that stays on screen. Its geometry is left to the transition.
	fn update_bar(&mut self, bar: &Bar);
	/// Start moving bars. A transition replaces the one still running.
	fn transition_bars(&mut self, transition: Transition);
	/// Where a bar is drawn right now. While a transition runs this is somewhere between its start and its end.
	fn drawn_rect(&self, key: &str) -> Option<Rect>;
	/// Replace both axes.
	fn draw_axes(&mut self, x_axis: &XAxis, y_axis: &YAxis);
	fn set_exhausted(&mut self, exhausted: bool);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
	pub text: String,
	pub position: Point,
	/// Degrees, clockwise.
	pub rotation: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ChartOptions {
	pub category_axis_label: String,
	pub max_upper_bound: u32,
	pub series_id: Option<String>,
	pub table: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigureError {
	#[error("the maximum upper bound must be at least 1")]
	MaxUpperBound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartState {
	Idle,
	Loading,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PendingUpdate {
	pub sequence: u64,
	pub request: ValuesRequest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
	Rendered,
	/// A newer request was issued after this one, so its response was dropped.
	Stale,
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
	sequence: u64,
	range: Range,
}

pub struct ChartController<R> {
	config: ChartConfig,
	options: ChartOptions,
	renderer: R,
	next_sequence: u64,
	in_flight: Option<InFlight>,
	series: Option<Series>,
	frame: BarChartFrame,
}

impl<R> ChartController<R>
where
	R: ChartRenderer,
{
	pub fn configure(options: ChartOptions, renderer: R) -> Result<Self, ConfigureError> {
		ChartController::with_config(CHART_CONFIG, options, renderer)
	}

	pub fn with_config(
		config: ChartConfig,
		options: ChartOptions,
		mut renderer: R,
	) -> Result<Self, ConfigureError> {
		if options.max_upper_bound < 1 {
			return Err(ConfigureError::MaxUpperBound);
		}
		renderer.draw_annotations(&annotations(&config, &options.category_axis_label));
		let frame = BarChartFrame::empty(&config);
		Ok(ChartController {
			config,
			options,
			renderer,
			next_sequence: 0,
			in_flight: None,
			series: None,
			frame,
		})
	}

	/// Clamp the bounds and start a request. The caller fetches `request.url()` and hands the result to `receive` or `fail`.
	pub fn request_update(
		&mut self,
		lower: i64,
		upper: i64,
		search: &str,
		feature_type: &str,
		order: &str,
	) -> PendingUpdate {
		let range = Range::clamp(lower, upper, self.options.max_upper_bound);
		self.next_sequence += 1;
		let sequence = self.next_sequence;
		self.in_flight = Some(InFlight { sequence, range });
		let request = ValuesRequest {
			table: self.options.table.clone(),
			speech_id: self.options.series_id.clone(),
			feature_type: feature_type.to_owned(),
			search: search.to_owned(),
			order: order.to_owned(),
			range,
		};
		log::debug!("requesting {} ({})", request.url(), sequence);
		PendingUpdate { sequence, request }
	}

	pub fn receive(
		&mut self,
		sequence: u64,
		response: ValuesResponse,
	) -> Result<UpdateOutcome, SeriesError> {
		let in_flight = match self.in_flight {
			Some(in_flight) if in_flight.sequence == sequence => in_flight,
			_ => {
				log::debug!("dropping stale response ({})", sequence);
				return Ok(UpdateOutcome::Stale);
			}
		};
		self.in_flight = None;
		let (series, magnitude) = response.into_series()?;
		self.renderer
			.set_exhausted(in_flight.range.is_exhausted(series.len()));
		self.render(series, magnitude);
		Ok(UpdateOutcome::Rendered)
	}

	/// The request failed. The chart keeps what it is showing.
	pub fn fail(&mut self, sequence: u64, error: &dyn Display) {
		match self.in_flight {
			Some(in_flight) if in_flight.sequence == sequence => {
				self.in_flight = None;
				log::error!("failed to load values: {}", error);
			}
			_ => log::debug!("ignoring failure of stale request ({}): {}", sequence, error),
		}
	}

	/// Draw `series`. Rendering the same series twice leaves the chart unchanged.
	pub fn render(&mut self, series: Series, magnitude: Magnitude) {
		let frame = compute_bar_chart_frame(&self.config, &series, magnitude);
		let join = join_bars(&self.frame.bars, &frame.bars);
		for bar in join.exit.iter() {
			self.renderer.remove_bar(&bar.key);
		}
		let zero = frame.x_axis.y;
		let mut bars = Vec::with_capacity(frame.bars.len());
		for bar in join.enter.iter() {
			let initial = Rect {
				x: bar.rect.x,
				y: zero,
				w: bar.rect.w,
				h: 0.0,
			};
			self.renderer.insert_bar(bar, initial);
			bars.push(BarTransition {
				key: bar.key.clone(),
				sign: bar.sign,
				from: initial,
				to: bar.rect,
			});
		}
		for (previous, next) in join.update.iter() {
			self.renderer.update_bar(next);
			// Pick up an interrupted transition where the bar is drawn, not where it was headed.
			let from = self
				.renderer
				.drawn_rect(&next.key)
				.unwrap_or(previous.rect);
			bars.push(BarTransition {
				key: next.key.clone(),
				sign: next.sign,
				from,
				to: next.rect,
			});
		}
		self.renderer.transition_bars(Transition {
			duration: self.config.transition_duration,
			bars,
		});
		self.renderer.draw_axes(&frame.x_axis, &frame.y_axis);
		self.frame = frame;
		self.series = Some(series);
	}

	/// The tooltip of the bar drawn under a point in plot coordinates.
	pub fn hover(&self, point: Point) -> Option<Tooltip> {
		let (bar, rect) = self.frame.hit_test(point, |bar| {
			self.renderer.drawn_rect(&bar.key).unwrap_or(bar.rect)
		})?;
		Some(Tooltip {
			origin: tooltip_origin(&self.config, bar.sign, rect),
			..bar.tooltip.clone()
		})
	}
}

impl<R> ChartController<R> {
	pub fn state(&self) -> ChartState {
		if self.in_flight.is_some() {
			ChartState::Loading
		} else {
			ChartState::Idle
		}
	}

	pub fn config(&self) -> &ChartConfig {
		&self.config
	}

	pub fn options(&self) -> &ChartOptions {
		&self.options
	}

	pub fn frame(&self) -> &BarChartFrame {
		&self.frame
	}

	pub fn series(&self) -> Option<&Series> {
		self.series.as_ref()
	}

	pub fn renderer(&self) -> &R {
		&self.renderer
	}
}

/// The two speaker labels at either end of the value axis and the rotated category axis title.
pub fn annotations(config: &ChartConfig, category_axis_label: &str) -> Vec<Annotation> {
	let height = config.plot_height();
	vec![
		Annotation {
			text: config.top_annotation.to_owned(),
			position: Point { x: 0.0, y: -25.0 },
			rotation: 0.0,
		},
		Annotation {
			text: config.bottom_annotation.to_owned(),
			position: Point {
				x: 0.0,
				y: height + 10.0,
			},
			rotation: 0.0,
		},
		Annotation {
			text: category_axis_label.to_owned(),
			position: Point {
				x: -height / 2.0,
				y: -config.margin.left,
			},
			rotation: -90.0,
		},
	]
}

#[cfg(test)]
#[derive(Debug, Default)]
struct RecordingRenderer {
	calls: Vec<String>,
	exhausted: Option<bool>,
	/// How far each transition runs before the next render. `None` lets it finish.
	interrupt_after: Option<std::time::Duration>,
	drawn: std::collections::HashMap<String, Rect>,
	transitions: Vec<Transition>,
}

#[cfg(test)]
impl ChartRenderer for RecordingRenderer {
	fn draw_annotations(&mut self, annotations: &[Annotation]) {
		self.calls.push(format!("annotations {}", annotations.len()));
	}
	fn remove_bar(&mut self, key: &str) {
		self.drawn.remove(key);
		self.calls.push(format!("remove {}", key));
	}
	fn insert_bar(&mut self, bar: &Bar, initial: Rect) {
		assert_eq!(initial.h, 0.0);
		self.drawn.insert(bar.key.clone(), initial);
		self.calls.push(format!("insert {}", bar.key));
	}
	fn update_bar(&mut self, bar: &Bar) {
		self.calls.push(format!("update {}", bar.key));
	}
	fn transition_bars(&mut self, transition: Transition) {
		self.calls.push(format!("transition {}", transition.bars.len()));
		let drawn: Vec<(String, Rect)> = match self.interrupt_after {
			Some(elapsed) => transition
				.sample(elapsed)
				.map(|(key, rect)| (key.to_owned(), rect))
				.collect(),
			None => transition
				.settle()
				.map(|(key, rect)| (key.to_owned(), rect))
				.collect(),
		};
		self.drawn.extend(drawn);
		self.transitions.push(transition);
	}
	fn drawn_rect(&self, key: &str) -> Option<Rect> {
		self.drawn.get(key).copied()
	}
	fn draw_axes(&mut self, _x_axis: &XAxis, _y_axis: &YAxis) {
		self.calls.push("axes".to_owned());
	}
	fn set_exhausted(&mut self, exhausted: bool) {
		self.exhausted = Some(exhausted);
	}
}

#[cfg(test)]
fn test_options() -> ChartOptions {
	ChartOptions {
		category_axis_label: "Feature".to_owned(),
		max_upper_bound: 50,
		series_id: None,
		table: "coefs".to_owned(),
	}
}

#[cfg(test)]
fn response(labels: &[&str], values: &[f64], mag: f64) -> ValuesResponse {
	ValuesResponse {
		feature_names: labels.iter().map(|label| label.to_string()).collect(),
		values: values.to_vec(),
		mag,
	}
}

#[test]
fn test_configure_rejects_zero_upper_bound() {
	let options = ChartOptions {
		max_upper_bound: 0,
		..test_options()
	};
	let result = ChartController::configure(options, RecordingRenderer::default());
	assert_eq!(result.err(), Some(ConfigureError::MaxUpperBound));
}

#[test]
fn test_configure_draws_annotations() {
	let controller = ChartController::configure(test_options(), RecordingRenderer::default()).unwrap();
	assert_eq!(controller.renderer().calls, vec!["annotations 3"]);
	assert_eq!(controller.state(), ChartState::Idle);
}

#[test]
fn test_request_update_clamps() {
	let mut controller =
		ChartController::configure(test_options(), RecordingRenderer::default()).unwrap();
	let pending = controller.request_update(10, 5, "tax", "word", "descMag");
	assert_eq!(pending.request.range, Range { lower: 5, upper: 10 });
	assert_eq!(
		pending.request.url(),
		"/values?table=coefs&speech_id=&type=word&search=tax&order=descMag&from=5&to=10"
	);
	assert_eq!(controller.state(), ChartState::Loading);
}

#[test]
fn test_receive_renders_and_flags_exhausted() {
	let mut controller =
		ChartController::configure(test_options(), RecordingRenderer::default()).unwrap();
	let pending = controller.request_update(1, 20, "", "all", "descMag");
	let outcome = controller
		.receive(pending.sequence, response(&["a", "b"], &[1.0, -1.0], 1.0))
		.unwrap();
	assert_eq!(outcome, UpdateOutcome::Rendered);
	assert_eq!(controller.state(), ChartState::Idle);
	assert_eq!(controller.renderer().exhausted, Some(true));
	assert_eq!(
		controller.renderer().calls,
		vec!["annotations 3", "insert a", "insert b", "transition 2", "axes"]
	);
	let pending = controller.request_update(1, 2, "", "all", "descMag");
	controller
		.receive(pending.sequence, response(&["b", "c"], &[1.0, 0.5], 1.0))
		.unwrap();
	assert_eq!(controller.renderer().exhausted, Some(false));
	assert_eq!(
		&controller.renderer().calls[5..],
		&["remove a", "insert c", "update b", "transition 2", "axes"]
	);
}

#[test]
fn test_stale_response_is_dropped() {
	let mut controller =
		ChartController::configure(test_options(), RecordingRenderer::default()).unwrap();
	let first = controller.request_update(1, 20, "", "all", "descMag");
	let second = controller.request_update(1, 20, "tax", "all", "descMag");
	let outcome = controller
		.receive(second.sequence, response(&["tax"], &[0.5], 0.5))
		.unwrap();
	assert_eq!(outcome, UpdateOutcome::Rendered);
	let outcome = controller
		.receive(first.sequence, response(&["a", "b"], &[1.0, -1.0], 1.0))
		.unwrap();
	assert_eq!(outcome, UpdateOutcome::Stale);
	let labels: Vec<&str> = controller.series().unwrap().labels().collect();
	assert_eq!(labels, vec!["tax"]);
}

#[test]
fn test_failure_returns_to_idle() {
	let mut controller =
		ChartController::configure(test_options(), RecordingRenderer::default()).unwrap();
	let pending = controller.request_update(1, 20, "", "all", "descMag");
	controller.fail(pending.sequence, &"connection refused");
	assert_eq!(controller.state(), ChartState::Idle);
	assert!(controller.series().is_none());
}

#[test]
fn test_mismatched_response_is_an_error() {
	let mut controller =
		ChartController::configure(test_options(), RecordingRenderer::default()).unwrap();
	let pending = controller.request_update(1, 20, "", "all", "descMag");
	let result = controller.receive(pending.sequence, response(&["a"], &[1.0, 2.0], 2.0));
	assert_eq!(
		result,
		Err(SeriesError::LengthMismatch {
			labels: 1,
			values: 2
		})
	);
	assert_eq!(controller.state(), ChartState::Idle);
}

#[test]
fn test_hover() {
	let mut controller =
		ChartController::configure(test_options(), RecordingRenderer::default()).unwrap();
	let series = Series::new(vec!["war".to_owned()], vec![-2.0]).unwrap();
	controller.render(series, Magnitude::new(5.0));
	let rect = controller.frame().bars[0].rect;
	let tooltip = controller
		.hover(Point {
			x: rect.center_x(),
			y: rect.y + rect.h / 2.0,
		})
		.unwrap();
	assert_eq!(tooltip.label, "war");
	assert_eq!(tooltip.value, "-2");
	assert_eq!(tooltip, controller.frame().bars[0].tooltip);
	assert!(controller.hover(Point { x: -10.0, y: 0.0 }).is_none());
}

#[test]
fn test_interrupted_transition_starts_where_bars_are_drawn() {
	let renderer = RecordingRenderer {
		interrupt_after: Some(std::time::Duration::from_millis(375)),
		..RecordingRenderer::default()
	};
	let mut controller = ChartController::configure(test_options(), renderer).unwrap();
	let series = Series::new(vec!["tax".to_owned()], vec![1.0]).unwrap();
	controller.render(series, Magnitude::new(2.0));
	// Halfway up from the zero line to its full height of 110.
	let midway = controller.renderer().drawn_rect("tax").unwrap();
	assert_eq!((midway.y, midway.h), (165.0, 55.0));
	// The tooltip follows the bar as drawn, not its destination.
	assert!(controller
		.hover(Point {
			x: midway.center_x(),
			y: 120.0,
		})
		.is_none());
	let tooltip = controller
		.hover(Point {
			x: midway.center_x(),
			y: 200.0,
		})
		.unwrap();
	assert_eq!(tooltip.origin.y, 155.0);
	let series = Series::new(vec!["tax".to_owned()], vec![2.0]).unwrap();
	controller.render(series, Magnitude::new(2.0));
	let transition = controller.renderer().transitions.last().unwrap();
	assert_eq!(transition.bars[0].from, midway);
	assert_eq!((transition.bars[0].to.y, transition.bars[0].to.h), (0.0, 220.0));
}

#[test]
fn test_annotations() {
	insta::assert_debug_snapshot!(annotations(&CHART_CONFIG, "Feature"), @r###"
 [
     Annotation {
         text: "Obama",
         position: Point {
             x: 0.0,
             y: -25.0,
         },
         rotation: 0.0,
     },
     Annotation {
         text: "Bush",
         position: Point {
             x: 0.0,
             y: 450.0,
         },
         rotation: 0.0,
     },
     Annotation {
         text: "Feature",
         position: Point {
             x: -220.0,
             y: -75.0,
         },
         rotation: -90.0,
     },
 ]
 "###);
}

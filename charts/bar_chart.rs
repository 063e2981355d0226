use crate::{
	common::{compute_grid_line_interval, compute_ticks, Point, Rect},
	config::ChartConfig,
	scale::{BandScale, LinearScale},
	series::{Magnitude, Series},
};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarSign {
	Positive,
	Negative,
}

impl BarSign {
	/// Zero counts as positive.
	pub fn of(value: f64) -> BarSign {
		if value >= 0.0 {
			BarSign::Positive
		} else {
			BarSign::Negative
		}
	}

	pub fn class(self, config: &ChartConfig) -> &'static str {
		match self {
			BarSign::Positive => config.positive_bar_class,
			BarSign::Negative => config.negative_bar_class,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipPlacement {
	Above,
	Below,
}

impl TooltipPlacement {
	/// Tooltips sit on the side of a bar away from the zero line.
	pub fn of(sign: BarSign) -> TooltipPlacement {
		match sign {
			BarSign::Positive => TooltipPlacement::Above,
			BarSign::Negative => TooltipPlacement::Below,
		}
	}

	pub fn class(self) -> &'static str {
		match self {
			TooltipPlacement::Above => "d3-tip-bot",
			TooltipPlacement::Below => "d3-tip-top",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub label: String,
	pub value: String,
	/// Where the tooltip's pointer touches, in plot coordinates.
	pub origin: Point,
	pub placement: TooltipPlacement,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
	pub key: String,
	pub label: String,
	pub value: f64,
	pub sign: BarSign,
	pub rect: Rect,
	pub tooltip: Tooltip,
}

#[derive(Clone, Debug, PartialEq)]
pub struct XAxis {
	/// The vertical position of the zero line.
	pub y: f64,
	pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct YAxisTick {
	pub y: f64,
	pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct YAxis {
	pub height: f64,
	pub ticks: Vec<YAxisTick>,
}

/// Everything drawn for one series, in plot coordinates (origin at the top left corner inside the margins).
#[derive(Clone, Debug, PartialEq)]
pub struct BarChartFrame {
	pub bars: Vec<Bar>,
	pub x_axis: XAxis,
	pub y_axis: YAxis,
}

pub fn compute_bar_chart_frame(
	config: &ChartConfig,
	series: &Series,
	magnitude: Magnitude,
) -> BarChartFrame {
	let width = config.plot_width();
	let height = config.plot_height();
	let x = BandScale::new(series.len(), 0.0, width, config.band_padding);
	let y = LinearScale::new(magnitude.domain(), (height, 0.0));
	let zero = y.scale(0.0);
	let bandwidth = x.bandwidth();
	let keys = bar_keys(series);
	let bars = series
		.iter()
		.zip(keys)
		.enumerate()
		.map(|(index, (entry, key))| {
			let value_y = y.scale(entry.value);
			let rect = Rect {
				x: x.position(index),
				y: zero.min(value_y),
				w: bandwidth,
				h: (zero - value_y).abs(),
			};
			let sign = BarSign::of(entry.value);
			let tooltip = Tooltip {
				label: entry.label.clone(),
				value: entry.value.to_string(),
				origin: tooltip_origin(config, sign, rect),
				placement: TooltipPlacement::of(sign),
			};
			Bar {
				key,
				label: entry.label.clone(),
				value: entry.value,
				sign,
				rect,
				tooltip,
			}
		})
		.collect();
	let (y_min, y_max) = magnitude.domain();
	let interval = compute_grid_line_interval(y_min, y_max, config.y_axis_tick_count);
	let ticks = compute_ticks(y_min, y_max, interval)
		.into_iter()
		.map(|tick| YAxisTick {
			y: y.scale(tick.value),
			label: tick.label,
		})
		.collect();
	BarChartFrame {
		bars,
		x_axis: XAxis { y: zero, width },
		y_axis: YAxis { height, ticks },
	}
}

/// Where the pointer of a bar's tooltip touches: the middle of the bar's outer edge, pushed out by the tooltip gap.
pub fn tooltip_origin(config: &ChartConfig, sign: BarSign, rect: Rect) -> Point {
	let y = match sign {
		BarSign::Positive => rect.y - config.tooltip_gap,
		BarSign::Negative => rect.bottom() + config.tooltip_gap,
	};
	Point {
		x: rect.center_x(),
		y,
	}
}

/// Bars are joined across updates by label. Repeated labels get an occurrence suffix so keys stay unique.
fn bar_keys(series: &Series) -> Vec<String> {
	let mut seen: HashMap<&str, usize> = HashMap::new();
	series
		.labels()
		.map(|label| {
			let count = seen.entry(label).or_insert(0);
			*count += 1;
			if *count == 1 {
				label.to_owned()
			} else {
				format!("{}#{}", label, count)
			}
		})
		.collect()
}

impl BarChartFrame {
	pub fn empty(config: &ChartConfig) -> BarChartFrame {
		compute_bar_chart_frame(config, &Series::default(), Magnitude::new(1.0))
	}

	/// Find the bar under a point in plot coordinates. `drawn` gives the rect a bar occupies on screen, which lags behind `bar.rect` while a transition runs.
	pub fn hit_test(&self, point: Point, drawn: impl Fn(&Bar) -> Rect) -> Option<(&Bar, Rect)> {
		self.bars.iter().find_map(|bar| {
			let rect = drawn(bar);
			if rect.contains(point) {
				Some((bar, rect))
			} else {
				None
			}
		})
	}
}

/// The result of joining the bars on screen with the bars of a new frame.
#[derive(Debug, PartialEq)]
pub struct BarJoin<'a> {
	pub enter: Vec<&'a Bar>,
	pub update: Vec<(&'a Bar, &'a Bar)>,
	pub exit: Vec<&'a Bar>,
}

pub fn join_bars<'a>(previous: &'a [Bar], next: &'a [Bar]) -> BarJoin<'a> {
	let previous_by_key: HashMap<&str, &Bar> =
		previous.iter().map(|bar| (bar.key.as_str(), bar)).collect();
	let next_keys: HashSet<&str> = next.iter().map(|bar| bar.key.as_str()).collect();
	let mut enter = Vec::new();
	let mut update = Vec::new();
	for bar in next.iter() {
		match previous_by_key.get(bar.key.as_str()) {
			Some(previous_bar) => update.push((*previous_bar, bar)),
			None => enter.push(bar),
		}
	}
	let exit = previous
		.iter()
		.filter(|bar| !next_keys.contains(bar.key.as_str()))
		.collect();
	BarJoin {
		enter,
		update,
		exit,
	}
}

#[cfg(test)]
fn series(labels: &[&str], values: &[f64]) -> Series {
	Series::new(
		labels.iter().map(|label| label.to_string()).collect(),
		values.to_vec(),
	)
	.unwrap()
}

#[cfg(test)]
fn assert_close(a: f64, b: f64) {
	assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
}

#[test]
fn test_bar_geometry() {
	let config = ChartConfig::default();
	let frame = compute_bar_chart_frame(
		&config,
		&series(&["tax", "war", "jobs"], &[3.0, -2.0, 5.0]),
		Magnitude::new(5.0),
	);
	// The value axis spans 10 units over 440 pixels.
	let unit = 440.0 / 10.0;
	let heights: Vec<f64> = frame.bars.iter().map(|bar| bar.rect.h).collect();
	assert_close(heights[0], 3.0 * unit);
	assert_close(heights[1], 2.0 * unit);
	assert_close(heights[2], 5.0 * unit);
	// Positive bars end at the zero line, negative bars start there.
	assert_close(frame.x_axis.y, 220.0);
	assert_close(frame.bars[0].rect.bottom(), 220.0);
	assert_close(frame.bars[1].rect.y, 220.0);
	assert_close(frame.bars[2].rect.y, 0.0);
	assert_eq!(frame.bars[0].sign.class(&config), "blue-bar");
	assert_eq!(frame.bars[1].sign.class(&config), "red-bar");
	assert_eq!(frame.bars[2].sign.class(&config), "blue-bar");
	// Bars are laid out left to right in series order.
	assert!(frame.bars[0].rect.x < frame.bars[1].rect.x);
	assert!(frame.bars[1].rect.x < frame.bars[2].rect.x);
	assert_eq!(frame.y_axis.ticks.len(), 11);
}

#[test]
fn test_zero_is_positive() {
	let frame = compute_bar_chart_frame(
		&ChartConfig::default(),
		&series(&["intercept"], &[0.0]),
		Magnitude::new(1.0),
	);
	assert_eq!(frame.bars[0].sign, BarSign::Positive);
	assert_close(frame.bars[0].rect.h, 0.0);
}

#[test]
fn test_tooltip_avoids_bar() {
	let frame = compute_bar_chart_frame(
		&ChartConfig::default(),
		&series(&["tax", "war"], &[3.0, -2.0]),
		Magnitude::new(5.0),
	);
	let positive = &frame.bars[0];
	assert_eq!(positive.tooltip.placement, TooltipPlacement::Above);
	assert_close(positive.tooltip.origin.y, positive.rect.y - 10.0);
	assert_close(positive.tooltip.origin.x, positive.rect.center_x());
	assert_eq!(positive.tooltip.value, "3");
	let negative = &frame.bars[1];
	assert_eq!(negative.tooltip.placement, TooltipPlacement::Below);
	assert_close(negative.tooltip.origin.y, negative.rect.bottom() + 10.0);
	assert_eq!(negative.tooltip.value, "-2");
}

#[test]
fn test_frame_is_deterministic() {
	let config = ChartConfig::default();
	let s = series(&["a", "b", "c", "d"], &[0.5, -0.25, 0.125, 1.0]);
	let first = compute_bar_chart_frame(&config, &s, Magnitude::new(1.0));
	let second = compute_bar_chart_frame(&config, &s, Magnitude::new(1.0));
	assert_eq!(first, second);
}

#[test]
fn test_hit_test() {
	let frame = compute_bar_chart_frame(
		&ChartConfig::default(),
		&series(&["tax", "war"], &[3.0, -2.0]),
		Magnitude::new(5.0),
	);
	let war = &frame.bars[1];
	let inside = Point {
		x: war.rect.center_x(),
		y: war.rect.y + 1.0,
	};
	let (bar, rect) = frame.hit_test(inside, |bar| bar.rect).unwrap();
	assert_eq!(bar.label, "war");
	assert_eq!(rect, war.rect);
	let above_war = Point {
		x: war.rect.center_x(),
		y: 100.0,
	};
	assert!(frame.hit_test(above_war, |bar| bar.rect).is_none());
	// A bar still growing from the zero line only answers where it is drawn.
	let growing = |bar: &Bar| Rect { h: 1.0, ..bar.rect };
	assert!(frame.hit_test(inside, growing).is_some());
	let deep_inside_war = Point {
		x: war.rect.center_x(),
		y: war.rect.y + 10.0,
	};
	assert!(frame.hit_test(deep_inside_war, |bar| bar.rect).is_some());
	assert!(frame.hit_test(deep_inside_war, growing).is_none());
}

#[test]
fn test_repeated_labels_get_unique_keys() {
	let frame = compute_bar_chart_frame(
		&ChartConfig::default(),
		&series(&["a", "b", "a"], &[1.0, 1.0, 1.0]),
		Magnitude::new(1.0),
	);
	let keys: Vec<&str> = frame.bars.iter().map(|bar| bar.key.as_str()).collect();
	assert_eq!(keys, vec!["a", "b", "a#2"]);
}

#[test]
fn test_join_bars() {
	let config = ChartConfig::default();
	let before = compute_bar_chart_frame(
		&config,
		&series(&["a", "b", "c"], &[1.0, 2.0, 3.0]),
		Magnitude::new(3.0),
	);
	let after = compute_bar_chart_frame(
		&config,
		&series(&["c", "d", "a"], &[-1.0, 2.0, 3.0]),
		Magnitude::new(3.0),
	);
	let join = join_bars(&before.bars, &after.bars);
	let enter: Vec<&str> = join.enter.iter().map(|bar| bar.key.as_str()).collect();
	let update: Vec<&str> = join
		.update
		.iter()
		.map(|(_, next)| next.key.as_str())
		.collect();
	let exit: Vec<&str> = join.exit.iter().map(|bar| bar.key.as_str()).collect();
	assert_eq!(enter, vec!["d"]);
	assert_eq!(update, vec!["c", "a"]);
	assert_eq!(exit, vec!["b"]);
	let (previous_c, next_c) = join.update[0];
	assert_eq!(previous_c.sign, BarSign::Positive);
	assert_eq!(next_c.sign, BarSign::Negative);
}

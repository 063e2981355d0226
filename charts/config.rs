use crate::common::Margin;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ChartConfig {
	pub width: f64,
	pub height: f64,
	pub margin: Margin,
	/// Fraction of each band left empty between bars, also used for the outer padding.
	pub band_padding: f64,
	pub y_axis_tick_count: usize,
	pub axis_tick_size: f64,
	pub axis_tick_padding: f64,
	pub tooltip_gap: f64,
	pub transition_duration: Duration,
	pub positive_bar_class: &'static str,
	pub negative_bar_class: &'static str,
	pub exhausted_class: &'static str,
	pub annotation_class: &'static str,
	pub top_annotation: &'static str,
	pub bottom_annotation: &'static str,
}

pub const CHART_CONFIG: ChartConfig = ChartConfig {
	width: 800.0,
	height: 500.0,
	margin: Margin {
		top: 30.0,
		right: 50.0,
		bottom: 30.0,
		left: 75.0,
	},
	band_padding: 0.2,
	y_axis_tick_count: 10,
	axis_tick_size: 6.0,
	axis_tick_padding: 3.0,
	tooltip_gap: 10.0,
	transition_duration: Duration::from_millis(750),
	positive_bar_class: "blue-bar",
	negative_bar_class: "red-bar",
	exhausted_class: "fadded",
	annotation_class: "text-sm",
	top_annotation: "Obama",
	bottom_annotation: "Bush",
};

impl ChartConfig {
	/// The width of the plot area, inside the margins.
	pub fn plot_width(&self) -> f64 {
		self.width - self.margin.left - self.margin.right
	}

	/// The height of the plot area, inside the margins.
	pub fn plot_height(&self) -> f64 {
		self.height - self.margin.top - self.margin.bottom
	}
}

impl Default for ChartConfig {
	fn default() -> ChartConfig {
		CHART_CONFIG
	}
}

#[test]
fn test_plot_size() {
	assert_eq!(CHART_CONFIG.plot_width(), 675.0);
	assert_eq!(CHART_CONFIG.plot_height(), 440.0);
}

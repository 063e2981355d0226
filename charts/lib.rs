/*!
Word-feature bar charts: a controller that turns ranked feature values into bars, a renderer seam, and an SVG renderer.
*/

pub mod bar_chart;
pub mod chart;
pub mod common;
pub mod config;
pub mod range;
pub mod request;
pub mod scale;
pub mod series;
pub mod svg;
pub mod transition;

pub use self::{
	chart::{
		ChartController, ChartOptions, ChartRenderer, ChartState, ConfigureError, PendingUpdate,
		UpdateOutcome,
	},
	config::{ChartConfig, CHART_CONFIG},
	range::Range,
	request::ValuesRequest,
	series::{Magnitude, Series, SeriesError, ValuesResponse},
	svg::SvgRenderer,
};

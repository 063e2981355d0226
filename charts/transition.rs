use crate::{bar_chart::BarSign, common::Rect};
use std::time::Duration;

pub fn ease_cubic_in_out(t: f64) -> f64 {
	if t <= 0.0 {
		0.0
	} else if t >= 1.0 {
		1.0
	} else if t < 0.5 {
		4.0 * t * t * t
	} else {
		let u = -2.0 * t + 2.0;
		1.0 - u * u * u / 2.0
	}
}

pub fn interpolate_rect(from: Rect, to: Rect, t: f64) -> Rect {
	let lerp = |a: f64, b: f64| a + (b - a) * t;
	Rect {
		x: lerp(from.x, to.x),
		y: lerp(from.y, to.y),
		w: lerp(from.w, to.w),
		h: lerp(from.h, to.h),
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarTransition {
	pub key: String,
	pub sign: BarSign,
	pub from: Rect,
	pub to: Rect,
}

/// Moves every bar from where it is drawn to where the latest frame puts it.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
	pub duration: Duration,
	pub bars: Vec<BarTransition>,
}

impl Transition {
	pub fn progress(&self, elapsed: Duration) -> f64 {
		if self.duration.as_secs_f64() <= 0.0 {
			return 1.0;
		}
		let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
		ease_cubic_in_out(t.min(1.0))
	}

	pub fn is_finished(&self, elapsed: Duration) -> bool {
		elapsed >= self.duration
	}

	pub fn sample(&self, elapsed: Duration) -> impl Iterator<Item = (&str, Rect)> + '_ {
		let t = self.progress(elapsed);
		self.bars
			.iter()
			.map(move |bar| (bar.key.as_str(), interpolate_rect(bar.from, bar.to, t)))
	}

	/// The rect of every bar once the transition is over.
	pub fn settle(&self) -> impl Iterator<Item = (&str, Rect)> + '_ {
		self.bars.iter().map(|bar| (bar.key.as_str(), bar.to))
	}
}

#[test]
fn test_ease_cubic_in_out() {
	assert_eq!(ease_cubic_in_out(-1.0), 0.0);
	assert_eq!(ease_cubic_in_out(0.0), 0.0);
	assert_eq!(ease_cubic_in_out(0.5), 0.5);
	assert_eq!(ease_cubic_in_out(1.0), 1.0);
	assert_eq!(ease_cubic_in_out(2.0), 1.0);
	assert_eq!(ease_cubic_in_out(0.25), 0.0625);
	assert_eq!(ease_cubic_in_out(0.75), 0.9375);
}

#[test]
fn test_sample() {
	let transition = Transition {
		duration: Duration::from_millis(750),
		bars: vec![BarTransition {
			key: "tax".to_owned(),
			sign: BarSign::Positive,
			from: Rect {
				x: 0.0,
				y: 220.0,
				w: 80.0,
				h: 0.0,
			},
			to: Rect {
				x: 0.0,
				y: 100.0,
				w: 80.0,
				h: 120.0,
			},
		}],
	};
	let (_, start) = transition.sample(Duration::from_millis(0)).next().unwrap();
	assert_eq!(start.h, 0.0);
	let (_, middle) = transition.sample(Duration::from_millis(375)).next().unwrap();
	assert_eq!(middle.h, 60.0);
	assert_eq!(middle.y, 160.0);
	let (_, end) = transition.sample(Duration::from_secs(2)).next().unwrap();
	assert_eq!(end.y, 100.0);
	assert!(!transition.is_finished(Duration::from_millis(749)));
	assert!(transition.is_finished(Duration::from_millis(750)));
}

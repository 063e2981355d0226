#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub w: f64,
	pub h: f64,
}

impl Rect {
	pub fn contains(&self, point: Point) -> bool {
		point.x >= self.x
			&& point.x <= self.x + self.w
			&& point.y >= self.y
			&& point.y <= self.y + self.h
	}

	pub fn center_x(&self) -> f64 {
		self.x + self.w / 2.0
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.h
	}
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Margin {
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
	pub left: f64,
}

// The interval is k * 10 ** p. k will always be 1, 2, or 5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GridLineInterval {
	pub k: i64,
	pub p: i32,
}

impl GridLineInterval {
	pub fn value(&self) -> f64 {
		self.multiple(1)
	}

	/// Computes `index * k * 10 ** p` without accumulating error for negative powers.
	pub fn multiple(&self, index: i64) -> f64 {
		let n = (index * self.k) as f64;
		if self.p >= 0 {
			n * 10f64.powi(self.p)
		} else {
			n / 10f64.powi(-self.p)
		}
	}

	/// The number of decimal places needed to print every multiple of this interval.
	pub fn precision(&self) -> usize {
		if self.p < 0 {
			(-self.p) as usize
		} else {
			0
		}
	}
}

/// Choose an interval that divides `[min, max]` into roughly `count` pieces.
pub fn compute_grid_line_interval(min: f64, max: f64, count: usize) -> GridLineInterval {
	let span = max - min;
	if !span.is_finite() || span <= 0.0 || count == 0 {
		return GridLineInterval { k: 1, p: 0 };
	}
	let raw_interval = span / count as f64;
	let p = raw_interval.log10().floor() as i32;
	let base = GridLineInterval { k: 1, p };
	let error = base.value() / raw_interval;
	if error <= 0.15 {
		GridLineInterval { k: 1, p: p + 1 }
	} else if error <= 0.35 {
		GridLineInterval { k: 5, p }
	} else if error <= 0.75 {
		GridLineInterval { k: 2, p }
	} else {
		base
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
	pub value: f64,
	pub label: String,
}

/// Every multiple of `interval` that lies within `[min, max]`.
pub fn compute_ticks(min: f64, max: f64, interval: GridLineInterval) -> Vec<Tick> {
	let step = interval.value();
	if !min.is_finite() || !max.is_finite() || max < min {
		return Vec::new();
	}
	let start = (min / step - 1e-9).ceil() as i64;
	let end = (max / step + 1e-9).floor() as i64;
	let precision = interval.precision();
	(start..=end)
		.map(|index| {
			let value = interval.multiple(index);
			Tick {
				value,
				label: format_number(value, precision),
			}
		})
		.collect()
}

pub fn format_number(value: f64, precision: usize) -> String {
	format!("{:.*}", precision, value)
}

#[test]
fn test_grid_line_interval() {
	assert_eq!(
		compute_grid_line_interval(-5.0, 5.0, 10),
		GridLineInterval { k: 1, p: 0 }
	);
	assert_eq!(
		compute_grid_line_interval(-3.0, 3.0, 10),
		GridLineInterval { k: 5, p: -1 }
	);
	assert_eq!(
		compute_grid_line_interval(-50.0, 50.0, 10),
		GridLineInterval { k: 1, p: 1 }
	);
	assert_eq!(
		compute_grid_line_interval(1.0, 1.0, 10),
		GridLineInterval { k: 1, p: 0 }
	);
}

#[test]
fn test_ticks() {
	let ticks = compute_ticks(-5.0, 5.0, GridLineInterval { k: 1, p: 0 });
	let labels: Vec<&str> = ticks.iter().map(|tick| tick.label.as_str()).collect();
	assert_eq!(
		labels,
		vec!["-5", "-4", "-3", "-2", "-1", "0", "1", "2", "3", "4", "5"]
	);
	let ticks = compute_ticks(-3.0, 3.0, GridLineInterval { k: 5, p: -1 });
	assert_eq!(ticks.len(), 13);
	assert_eq!(ticks[0].label, "-3.0");
	assert_eq!(ticks[1].label, "-2.5");
	assert_eq!(ticks[6].label, "0.0");
	assert_eq!(ticks[12].value, 3.0);
}

#[test]
fn test_rect_contains() {
	let rect = Rect {
		x: 10.0,
		y: 20.0,
		w: 5.0,
		h: 10.0,
	};
	assert!(rect.contains(Point { x: 10.0, y: 20.0 }));
	assert!(rect.contains(Point { x: 15.0, y: 30.0 }));
	assert!(!rect.contains(Point { x: 16.0, y: 25.0 }));
	assert!(!rect.contains(Point { x: 12.0, y: 19.0 }));
	assert_eq!(rect.center_x(), 12.5);
	assert_eq!(rect.bottom(), 30.0);
}

/// Maps the index of a category to the left edge of its band.
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
	len: usize,
	start: f64,
	end: f64,
	padding: f64,
}

impl BandScale {
	/// `padding` is used both between bands and before the first and after the last band.
	pub fn new(len: usize, start: f64, end: f64, padding: f64) -> BandScale {
		BandScale {
			len,
			start,
			end,
			padding,
		}
	}

	pub fn step(&self) -> f64 {
		if self.len == 0 {
			return 0.0;
		}
		(self.end - self.start) / (self.len as f64 + self.padding)
	}

	pub fn bandwidth(&self) -> f64 {
		self.step() * (1.0 - self.padding)
	}

	pub fn position(&self, index: usize) -> f64 {
		let step = self.step();
		self.start + step * self.padding + step * index as f64
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	domain: (f64, f64),
	range: (f64, f64),
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> LinearScale {
		LinearScale { domain, range }
	}

	pub fn scale(&self, value: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		if (d1 - d0).abs() < f64::EPSILON {
			return (r0 + r1) / 2.0;
		}
		r0 + (value - d0) / (d1 - d0) * (r1 - r0)
	}
}

#[test]
fn test_band_scale() {
	let scale = BandScale::new(4, 0.0, 420.0, 0.2);
	assert!((scale.step() - 100.0).abs() < 1e-9);
	assert!((scale.bandwidth() - 80.0).abs() < 1e-9);
	assert!((scale.position(0) - 20.0).abs() < 1e-9);
	assert!((scale.position(3) - 320.0).abs() < 1e-9);
	// The last band ends one outer padding away from the end of the range.
	assert!((scale.position(3) + scale.bandwidth() + 20.0 - 420.0).abs() < 1e-9);
	assert_eq!(BandScale::new(0, 0.0, 420.0, 0.2).step(), 0.0);
}

#[test]
fn test_linear_scale() {
	let scale = LinearScale::new((-5.0, 5.0), (440.0, 0.0));
	assert_eq!(scale.scale(0.0), 220.0);
	assert_eq!(scale.scale(5.0), 0.0);
	assert_eq!(scale.scale(-5.0), 440.0);
	assert!((scale.scale(3.0) - 88.0).abs() < 1e-9);
	let flat = LinearScale::new((1.0, 1.0), (440.0, 0.0));
	assert_eq!(flat.scale(1.0), 220.0);
}

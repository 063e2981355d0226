/// A window of ranked items, 1-based and inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Range {
	pub lower: u32,
	pub upper: u32,
}

impl Range {
	/// Clamp raw bounds into `[1, max_upper]`, swapping them if they are inverted. `max_upper` must be at least 1.
	pub fn clamp(lower: i64, upper: i64, max_upper: u32) -> Range {
		let max_upper = i64::from(max_upper.max(1));
		let clamped_upper = lower.max(upper).max(1).min(max_upper);
		let clamped_lower = lower.min(upper).min(max_upper).max(1);
		Range {
			lower: clamped_lower as u32,
			upper: clamped_upper as u32,
		}
	}

	pub fn width(&self) -> u32 {
		self.upper - self.lower
	}

	/// The source ran out of items when it returned fewer than the window asked for.
	pub fn is_exhausted(&self, received: usize) -> bool {
		self.width() as usize >= received
	}
}

/// Parse the text of a bound input the way a number input reads it. Fractions are truncated towards zero and anything that is not a finite number falls back.
pub fn parse_bound(text: &str, fallback: i64) -> i64 {
	match text.trim().parse::<f64>() {
		// Out of range values saturate.
		Ok(value) if value.is_finite() => value.trunc() as i64,
		_ => fallback,
	}
}

#[test]
fn test_clamp_swaps_inverted_bounds() {
	assert_eq!(Range::clamp(10, 5, 50), Range { lower: 5, upper: 10 });
}

#[test]
fn test_clamp_limits() {
	assert_eq!(Range::clamp(-3, 0, 50), Range { lower: 1, upper: 1 });
	assert_eq!(Range::clamp(40, 90, 50), Range { lower: 40, upper: 50 });
	assert_eq!(Range::clamp(70, 90, 50), Range { lower: 50, upper: 50 });
	assert_eq!(Range::clamp(0, 20, 50), Range { lower: 1, upper: 20 });
	assert_eq!(Range::clamp(i64::MIN, i64::MAX, 50), Range { lower: 1, upper: 50 });
}

#[test]
fn test_clamp_invariant() {
	let inputs = [-100, -1, 0, 1, 2, 7, 49, 50, 51, 1000];
	for max_upper in &[1, 2, 50] {
		for lower in inputs.iter() {
			for upper in inputs.iter() {
				let range = Range::clamp(*lower, *upper, *max_upper);
				assert!(1 <= range.lower);
				assert!(range.lower <= range.upper);
				assert!(range.upper <= *max_upper);
			}
		}
	}
}

#[test]
fn test_is_exhausted() {
	let range = Range { lower: 1, upper: 20 };
	assert!(range.is_exhausted(19));
	assert!(range.is_exhausted(5));
	assert!(!range.is_exhausted(20));
}

#[test]
fn test_parse_bound() {
	assert_eq!(parse_bound(" 12 ", 1), 12);
	assert_eq!(parse_bound("-4", 1), -4);
	assert_eq!(parse_bound("twelve", 1), 1);
	assert_eq!(parse_bound("", 50), 50);
	assert_eq!(parse_bound("2.5", 50), 2);
	assert_eq!(parse_bound("-0.5", 50), 0);
	assert_eq!(parse_bound("1e2", 50), 100);
	assert_eq!(parse_bound("NaN", 50), 50);
	assert_eq!(parse_bound("inf", 50), 50);
	assert_eq!(parse_bound("1e300", 50), i64::MAX);
}

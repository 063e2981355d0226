use thiserror::Error;

/// The labelled values displayed along the category axis, in display order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
	entries: Vec<SeriesEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesEntry {
	pub label: String,
	pub value: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
	#[error("received {labels} labels but {values} values")]
	LengthMismatch { labels: usize, values: usize },
	#[error("the value at index {index} is not finite")]
	NotFinite { index: usize },
}

impl Series {
	pub fn new(labels: Vec<String>, values: Vec<f64>) -> Result<Series, SeriesError> {
		if labels.len() != values.len() {
			return Err(SeriesError::LengthMismatch {
				labels: labels.len(),
				values: values.len(),
			});
		}
		if let Some(index) = values.iter().position(|value| !value.is_finite()) {
			return Err(SeriesError::NotFinite { index });
		}
		let entries = labels
			.into_iter()
			.zip(values)
			.map(|(label, value)| SeriesEntry { label, value })
			.collect();
		Ok(Series { entries })
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn iter(&self) -> std::slice::Iter<SeriesEntry> {
		self.entries.iter()
	}

	pub fn labels(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|entry| entry.label.as_str())
	}
}

/// The symmetric bound of the value axis. The axis spans `[-magnitude, magnitude]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Magnitude(f64);

impl Magnitude {
	/// Magnitudes that are not finite or not positive would collapse the axis, so they become 1.
	pub fn new(value: f64) -> Magnitude {
		if value.is_finite() && value > 0.0 {
			Magnitude(value)
		} else {
			Magnitude(1.0)
		}
	}

	pub fn get(self) -> f64 {
		self.0
	}

	pub fn domain(self) -> (f64, f64) {
		(-self.0, self.0)
	}
}

/// The body of a `/values` response.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ValuesResponse {
	pub feature_names: Vec<String>,
	pub values: Vec<f64>,
	pub mag: f64,
}

impl ValuesResponse {
	pub fn into_series(self) -> Result<(Series, Magnitude), SeriesError> {
		let series = Series::new(self.feature_names, self.values)?;
		Ok((series, Magnitude::new(self.mag)))
	}
}

#[test]
fn test_series_length_mismatch() {
	let result = Series::new(vec!["a".to_owned(), "b".to_owned()], vec![1.0]);
	assert_eq!(
		result,
		Err(SeriesError::LengthMismatch {
			labels: 2,
			values: 1
		})
	);
}

#[test]
fn test_series_keeps_order() {
	let series = Series::new(
		vec!["tax".to_owned(), "war".to_owned(), "jobs".to_owned()],
		vec![3.0, -2.0, 5.0],
	)
	.unwrap();
	assert_eq!(series.len(), 3);
	assert_eq!(series.labels().collect::<Vec<_>>(), vec!["tax", "war", "jobs"]);
}

#[test]
fn test_magnitude() {
	assert_eq!(Magnitude::new(5.0).domain(), (-5.0, 5.0));
	assert_eq!(Magnitude::new(0.0).get(), 1.0);
	assert_eq!(Magnitude::new(-2.0).get(), 1.0);
	assert_eq!(Magnitude::new(f64::NAN).get(), 1.0);
}

#[test]
fn test_values_response() {
	let response: ValuesResponse = serde_json::from_str(
		r#"{"feature_names": ["Word: \"tax\"", "POS Pair: (noun, verb)"], "values": [0.25, -0.5], "mag": 0.5}"#,
	)
	.unwrap();
	let (series, magnitude) = response.into_series().unwrap();
	assert_eq!(series.len(), 2);
	assert_eq!(magnitude.get(), 0.5);
}

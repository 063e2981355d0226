use crate::{
	error::Error,
	store::{self, FeatureValue, Table},
	Context,
};
use anyhow::Result;
use hyper::{header, Body, Request, Response, StatusCode};
use regex::{Regex, RegexBuilder};
use rhetoric_charts::ValuesResponse;
use sqlx::sqlite::SqlitePool;
use std::{collections::BTreeMap, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeatureType {
	All,
	Word,
	Pos,
}

impl FeatureType {
	/// The three `feature_type` column values this selection matches. Unused slots are empty.
	pub fn column_values(self) -> [&'static str; 3] {
		match self {
			FeatureType::All => ["word", "pos", "intercept"],
			FeatureType::Word => ["word", "", ""],
			FeatureType::Pos => ["pos", "", ""],
		}
	}
}

impl FromStr for FeatureType {
	type Err = Error;
	fn from_str(value: &str) -> Result<FeatureType, Error> {
		match value {
			"all" => Ok(FeatureType::All),
			"word" => Ok(FeatureType::Word),
			"pos" => Ok(FeatureType::Pos),
			_ => Err(Error::BadRequest),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
	DescMag,
	AscMag,
	DescVal,
	AscVal,
}

impl FromStr for SortOrder {
	type Err = Error;
	fn from_str(value: &str) -> Result<SortOrder, Error> {
		match value {
			"descMag" => Ok(SortOrder::DescMag),
			"ascMag" => Ok(SortOrder::AscMag),
			"descVal" => Ok(SortOrder::DescVal),
			"ascVal" => Ok(SortOrder::AscVal),
			_ => Err(Error::BadRequest),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValuesQuery {
	pub table: Table,
	pub feature_type: FeatureType,
	pub search: String,
	pub order: SortOrder,
	pub from: i64,
	pub to: i64,
}

impl ValuesQuery {
	pub fn parse(search_params: Option<&BTreeMap<String, String>>) -> Result<ValuesQuery, Error> {
		let param = |name: &str| {
			search_params
				.and_then(|search_params| search_params.get(name))
				.map(|value| value.as_str())
		};
		let table = match param("table") {
			Some("contribs") => {
				let speech_id = match param("speech_id") {
					None | Some("") => 0,
					Some(speech_id) => speech_id.parse().map_err(|_| Error::BadRequest)?,
				};
				Table::Contribs { speech_id }
			}
			_ => Table::Coefs,
		};
		let feature_type = param("type").unwrap_or("all").parse()?;
		let search = param("search").unwrap_or("").to_owned();
		let order = param("order").unwrap_or("descMag").parse()?;
		let bound = |name: &str, default: i64| match param(name) {
			None => Ok(default),
			Some(value) => value.parse::<i64>().map_err(|_| Error::BadRequest),
		};
		let from = bound("from", 1)?;
		let to = bound("to", 50)?;
		Ok(ValuesQuery {
			table,
			feature_type,
			search,
			order,
			from,
			to,
		})
	}
}

/// Compile `search` as a case insensitive pattern, matching it literally if it is not a valid regular expression.
fn search_pattern(search: &str) -> Result<Regex, regex::Error> {
	RegexBuilder::new(search)
		.case_insensitive(true)
		.build()
		.or_else(|_| {
			RegexBuilder::new(&regex::escape(search))
				.case_insensitive(true)
				.build()
		})
}

fn round(value: f64) -> f64 {
	(value * 1e7).round() / 1e7
}

/// Filter, sort and window `features` into the response the chart consumes.
pub fn select_values(
	mut features: Vec<FeatureValue>,
	search: &str,
	order: SortOrder,
	from: i64,
	to: i64,
) -> Result<ValuesResponse, regex::Error> {
	let pattern = search_pattern(search)?;
	features.retain(|feature| {
		let name = feature.long_name.rsplit(':').next().unwrap_or("");
		pattern.is_match(name)
	});
	match order {
		SortOrder::DescMag => features.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs())),
		SortOrder::AscMag => features.sort_by(|a, b| a.value.abs().total_cmp(&b.value.abs())),
		SortOrder::DescVal => features.sort_by(|a, b| b.value.total_cmp(&a.value)),
		SortOrder::AscVal => features.sort_by(|a, b| a.value.total_cmp(&b.value)),
	}
	let len = features.len() as i64;
	let start = from.saturating_sub(1).max(0).min(len) as usize;
	let end = to.max(0).min(len) as usize;
	let window: &[FeatureValue] = if start < end {
		&features[start..end]
	} else {
		&[]
	};
	let feature_names = window
		.iter()
		.map(|feature| feature.long_name.clone())
		.collect::<Vec<_>>();
	let values = window
		.iter()
		.map(|feature| round(feature.value))
		.collect::<Vec<_>>();
	let mag = values
		.iter()
		.map(|value| value.abs())
		.fold(None, |max: Option<f64>, value| {
			Some(max.map_or(value, |max| max.max(value)))
		})
		.unwrap_or(1.0);
	Ok(ValuesResponse {
		feature_names,
		values,
		mag,
	})
}

pub async fn query_values(pool: &SqlitePool, query: &ValuesQuery) -> Result<ValuesResponse> {
	let features =
		store::feature_values(pool, query.table, query.feature_type.column_values()).await?;
	let response = select_values(features, &query.search, query.order, query.from, query.to)?;
	Ok(response)
}

pub async fn get(
	context: &Context,
	_request: Request<Body>,
	search_params: Option<BTreeMap<String, String>>,
) -> Result<Response<Body>> {
	let query = ValuesQuery::parse(search_params.as_ref())?;
	let response = query_values(&context.pool, &query).await?;
	let body = serde_json::to_vec(&response)?;
	let response = Response::builder()
		.status(StatusCode::OK)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body))?;
	Ok(response)
}

#[cfg(test)]
fn features(values: &[(&str, f64)]) -> Vec<FeatureValue> {
	values
		.iter()
		.map(|(long_name, value)| FeatureValue {
			long_name: long_name.to_string(),
			value: *value,
		})
		.collect()
}

#[cfg(test)]
fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
	pairs
		.iter()
		.map(|(name, value)| (name.to_string(), value.to_string()))
		.collect()
}

#[test]
fn test_parse_defaults() {
	let query = ValuesQuery::parse(None).unwrap();
	assert_eq!(
		query,
		ValuesQuery {
			table: Table::Coefs,
			feature_type: FeatureType::All,
			search: String::new(),
			order: SortOrder::DescMag,
			from: 1,
			to: 50,
		}
	);
}

#[test]
fn test_parse_contribs() {
	let search_params = params(&[
		("table", "contribs"),
		("speech_id", "7"),
		("type", "pos"),
		("search", "noun"),
		("order", "ascVal"),
		("from", "3"),
		("to", "9"),
	]);
	let query = ValuesQuery::parse(Some(&search_params)).unwrap();
	assert_eq!(query.table, Table::Contribs { speech_id: 7 });
	assert_eq!(query.feature_type, FeatureType::Pos);
	assert_eq!(query.search, "noun");
	assert_eq!(query.order, SortOrder::AscVal);
	assert_eq!((query.from, query.to), (3, 9));
}

#[test]
fn test_parse_speech_id_ignored_for_coefs() {
	let search_params = params(&[("table", "word_freq"), ("speech_id", "")]);
	let query = ValuesQuery::parse(Some(&search_params)).unwrap();
	assert_eq!(query.table, Table::Coefs);
}

#[test]
fn test_parse_rejects_bad_values() {
	for pairs in [
		[("type", "tf")],
		[("order", "asc")],
		[("from", "one")],
		[("to", "2.5")],
	]
	.iter()
	{
		let search_params = params(pairs);
		assert!(ValuesQuery::parse(Some(&search_params)).is_err());
	}
	let search_params = params(&[("table", "contribs"), ("speech_id", "abc")]);
	assert!(ValuesQuery::parse(Some(&search_params)).is_err());
}

#[test]
fn test_feature_type_column_values() {
	assert_eq!(
		FeatureType::All.column_values(),
		["word", "pos", "intercept"]
	);
	assert_eq!(FeatureType::Word.column_values(), ["word", "", ""]);
}

#[test]
fn test_select_values_orders() {
	let input = features(&[("a", 0.5), ("b", -2.0), ("c", 1.0), ("d", -0.25)]);
	let names = |order| {
		select_values(input.clone(), "", order, 1, 50)
			.unwrap()
			.feature_names
	};
	assert_eq!(names(SortOrder::DescMag), vec!["b", "c", "a", "d"]);
	assert_eq!(names(SortOrder::AscMag), vec!["d", "a", "c", "b"]);
	assert_eq!(names(SortOrder::DescVal), vec!["c", "a", "d", "b"]);
	assert_eq!(names(SortOrder::AscVal), vec!["b", "d", "a", "c"]);
}

#[test]
fn test_select_values_sort_is_stable() {
	let input = features(&[("first", 1.0), ("second", -1.0), ("third", 1.0)]);
	let response = select_values(input, "", SortOrder::DescMag, 1, 50).unwrap();
	assert_eq!(response.feature_names, vec!["first", "second", "third"]);
}

#[test]
fn test_select_values_window() {
	let input = features(&[("a", 5.0), ("b", 4.0), ("c", 3.0), ("d", 2.0), ("e", 1.0)]);
	let response = select_values(input.clone(), "", SortOrder::DescVal, 2, 3).unwrap();
	assert_eq!(response.feature_names, vec!["b", "c"]);
	assert_eq!(response.values, vec![4.0, 3.0]);
	assert_eq!(response.mag, 4.0);
	let response = select_values(input.clone(), "", SortOrder::DescVal, 4, 50).unwrap();
	assert_eq!(response.feature_names, vec!["d", "e"]);
	let response = select_values(input, "", SortOrder::DescVal, 9, 12).unwrap();
	assert!(response.feature_names.is_empty());
	assert_eq!(response.mag, 1.0);
}

#[test]
fn test_select_values_extreme_bounds() {
	let input = features(&[("a", 5.0), ("b", 4.0), ("c", 3.0)]);
	let response = select_values(input.clone(), "", SortOrder::DescVal, i64::MIN, 2).unwrap();
	assert_eq!(response.feature_names, vec!["a", "b"]);
	let response = select_values(input.clone(), "", SortOrder::DescVal, i64::MIN, i64::MIN).unwrap();
	assert!(response.feature_names.is_empty());
	let response = select_values(input, "", SortOrder::DescVal, i64::MAX, i64::MAX).unwrap();
	assert!(response.feature_names.is_empty());
}

#[test]
fn test_select_values_search() {
	let input = features(&[
		("Word: \"tax\"", 1.0),
		("Word: \"taxes\"", 2.0),
		("POS Pair: (singular noun, base verb)", 3.0),
		("FIXED INTERCEPT", 4.0),
	]);
	let response = select_values(input.clone(), "TAX", SortOrder::AscVal, 1, 50).unwrap();
	assert_eq!(
		response.feature_names,
		vec!["Word: \"tax\"", "Word: \"taxes\""]
	);
	let response = select_values(input.clone(), "^ \"tax\"$", SortOrder::AscVal, 1, 50).unwrap();
	assert_eq!(response.feature_names, vec!["Word: \"tax\""]);
	// Only the text after the last colon is searched.
	let response = select_values(input.clone(), "word", SortOrder::AscVal, 1, 50).unwrap();
	assert!(response.feature_names.is_empty());
	// An invalid pattern is matched literally.
	let response = select_values(input, "(singular", SortOrder::AscVal, 1, 50).unwrap();
	assert_eq!(
		response.feature_names,
		vec!["POS Pair: (singular noun, base verb)"]
	);
}

#[test]
fn test_select_values_rounding() {
	let input = features(&[("a", 0.123456789), ("b", -0.000000004)]);
	let response = select_values(input, "", SortOrder::DescMag, 1, 50).unwrap();
	assert_eq!(response.values, vec![0.1234568, 0.0]);
	assert_eq!(response.mag, 0.1234568);
}

#[tokio::test]
async fn test_query_values() {
	let pool = store::test_pool().await;
	let search_params = params(&[("table", "contribs"), ("speech_id", "7"), ("type", "word")]);
	let query = ValuesQuery::parse(Some(&search_params)).unwrap();
	let response = query_values(&pool, &query).await.unwrap();
	insta::assert_debug_snapshot!(response, @r###"
 ValuesResponse {
     feature_names: [
         "Word: \"terror\"",
         "Word: \"tax\"",
     ],
     values: [
         -0.9,
         0.3,
     ],
     mag: 0.9,
 }
 "###);
}

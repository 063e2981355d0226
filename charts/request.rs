use crate::range::Range;

pub const VALUES_PATH: &str = "/values";

/// Everything the `/values` endpoint needs to select a window of ranked features.
#[derive(Clone, Debug, PartialEq)]
pub struct ValuesRequest {
	pub table: String,
	pub speech_id: Option<String>,
	pub feature_type: String,
	pub search: String,
	pub order: String,
	pub range: Range,
}

impl ValuesRequest {
	pub fn query(&self) -> String {
		url::form_urlencoded::Serializer::new(String::new())
			.append_pair("table", &self.table)
			.append_pair("speech_id", self.speech_id.as_deref().unwrap_or(""))
			.append_pair("type", &self.feature_type)
			.append_pair("search", &self.search)
			.append_pair("order", &self.order)
			.append_pair("from", &self.range.lower.to_string())
			.append_pair("to", &self.range.upper.to_string())
			.finish()
	}

	pub fn url(&self) -> String {
		format!("{}?{}", VALUES_PATH, self.query())
	}
}

#[test]
fn test_url() {
	let request = ValuesRequest {
		table: "word_freq".to_owned(),
		speech_id: None,
		feature_type: "tf".to_owned(),
		search: "".to_owned(),
		order: "asc".to_owned(),
		range: Range { lower: 1, upper: 20 },
	};
	assert_eq!(
		request.url(),
		"/values?table=word_freq&speech_id=&type=tf&search=&order=asc&from=1&to=20"
	);
}

#[test]
fn test_url_encodes_search() {
	let request = ValuesRequest {
		table: "contribs".to_owned(),
		speech_id: Some("17".to_owned()),
		feature_type: "all".to_owned(),
		search: "tax & spend".to_owned(),
		order: "descMag".to_owned(),
		range: Range { lower: 3, upper: 9 },
	};
	assert_eq!(
		request.url(),
		"/values?table=contribs&speech_id=17&type=all&search=tax+%26+spend&order=descMag&from=3&to=9"
	);
}

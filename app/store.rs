use anyhow::Result;
use sqlx::{sqlite::SqlitePool, Row};

/// The table a chart reads its feature values from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
	/// Per-speech feature contributions.
	Contribs { speech_id: i64 },
	/// Model coefficients.
	Coefs,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureValue {
	pub long_name: String,
	pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Speech {
	pub id: i64,
	/// Paragraph markup in reading order.
	pub paragraphs: Vec<String>,
	pub predicted: String,
	pub observed: String,
}

pub async fn speech_ids(pool: &SqlitePool) -> Result<Vec<i64>> {
	let rows = sqlx::query(
		"
			select distinct speech_id
			from paragraphs
			order by speech_id
		",
	)
	.fetch_all(pool)
	.await?;
	let speech_ids = rows
		.iter()
		.map(|row| row.try_get(0))
		.collect::<Result<Vec<i64>, _>>()?;
	Ok(speech_ids)
}

pub async fn speech(pool: &SqlitePool, speech_id: i64) -> Result<Option<Speech>> {
	let rows = sqlx::query(
		"
			select par, predicted, observed
			from paragraphs
			where speech_id = ?1
			order by par_id
		",
	)
	.bind(speech_id)
	.fetch_all(pool)
	.await?;
	let first = match rows.first() {
		Some(first) => first,
		None => return Ok(None),
	};
	let predicted: String = first.try_get(1)?;
	let observed: String = first.try_get(2)?;
	let paragraphs = rows
		.iter()
		.map(|row| row.try_get(0))
		.collect::<Result<Vec<String>, _>>()?;
	Ok(Some(Speech {
		id: speech_id,
		paragraphs,
		predicted,
		observed,
	}))
}

/// The number of rows `table` holds, which bounds the rank window a chart may request.
pub async fn row_count(pool: &SqlitePool, table: Table) -> Result<i64> {
	let row = match table {
		Table::Contribs { speech_id } => {
			sqlx::query("select count(*) from contribs where speech_id = ?1")
				.bind(speech_id)
				.fetch_one(pool)
				.await?
		}
		Table::Coefs => {
			sqlx::query("select count(*) from coefs")
				.fetch_one(pool)
				.await?
		}
	};
	let count: i64 = row.try_get(0)?;
	Ok(count)
}

/// Feature values of `table` whose feature type is one of `feature_types`. Empty strings in `feature_types` match nothing.
pub async fn feature_values(
	pool: &SqlitePool,
	table: Table,
	feature_types: [&str; 3],
) -> Result<Vec<FeatureValue>> {
	let rows = match table {
		Table::Contribs { speech_id } => {
			sqlx::query(
				"
					select long_name, value
					from contribs
					where speech_id = ?1 and feature_type in (?2, ?3, ?4)
				",
			)
			.bind(speech_id)
			.bind(feature_types[0])
			.bind(feature_types[1])
			.bind(feature_types[2])
			.fetch_all(pool)
			.await?
		}
		Table::Coefs => {
			sqlx::query(
				"
					select long_name, value
					from coefs
					where feature_type in (?1, ?2, ?3)
				",
			)
			.bind(feature_types[0])
			.bind(feature_types[1])
			.bind(feature_types[2])
			.fetch_all(pool)
			.await?
		}
	};
	rows.iter()
		.map(|row| {
			Ok(FeatureValue {
				long_name: row.try_get(0)?,
				value: row.try_get(1)?,
			})
		})
		.collect()
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
	use sqlx::sqlite::SqlitePoolOptions;
	// A single connection, since every connection to sqlite::memory: opens its own database.
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect("sqlite::memory:")
		.await
		.unwrap();
	sqlx::raw_sql(
		r#"
			create table coefs (short_name text, long_name text, value real, feature_type text);
			create table contribs (speech_id integer, short_name text, long_name text, value real, feature_type text);
			create table paragraphs (par text, speech_id integer, par_id integer, predicted text, observed text);
			insert into coefs values
				('tax', 'Word: "tax"', 0.75, 'word'),
				('freedom', 'Word: "freedom"', -1.25, 'word'),
				('NN VB', 'POS Pair: (singular noun, base verb)', 0.5, 'pos'),
				('FIXED INTERCEPT', 'FIXED INTERCEPT', -0.125, 'intercept');
			insert into contribs values
				(7, 'tax', 'Word: "tax"', 0.3, 'word'),
				(7, 'terror', 'Word: "terror"', -0.9, 'word'),
				(7, 'FIXED INTERCEPT', 'FIXED INTERCEPT', -0.125, 'intercept'),
				(9, 'jobs', 'Word: "jobs"', 0.4, 'word');
			insert into paragraphs values
				('Second <span class="highlight">tax</span> paragraph.', 7, 1, 'Obama', 'Bush'),
				('First paragraph.', 7, 0, 'Obama', 'Bush'),
				('Only paragraph.', 9, 0, 'Obama', 'Obama');
		"#,
	)
	.execute(&pool)
	.await
	.unwrap();
	pool
}

#[tokio::test]
async fn test_speech_ids() {
	let pool = test_pool().await;
	assert_eq!(speech_ids(&pool).await.unwrap(), vec![7, 9]);
}

#[tokio::test]
async fn test_speech_paragraphs_in_order() {
	let pool = test_pool().await;
	let speech = speech(&pool, 7).await.unwrap().unwrap();
	assert_eq!(
		speech.paragraphs,
		vec![
			"First paragraph.".to_owned(),
			"Second <span class=\"highlight\">tax</span> paragraph.".to_owned(),
		]
	);
	assert_eq!(speech.predicted, "Obama");
	assert_eq!(speech.observed, "Bush");
	assert!(self::speech(&pool, 1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_row_count() {
	let pool = test_pool().await;
	assert_eq!(
		row_count(&pool, Table::Contribs { speech_id: 7 })
			.await
			.unwrap(),
		3
	);
	assert_eq!(row_count(&pool, Table::Coefs).await.unwrap(), 4);
}

#[tokio::test]
async fn test_feature_values_by_type() {
	let pool = test_pool().await;
	let words = feature_values(&pool, Table::Coefs, ["word", "", ""])
		.await
		.unwrap();
	assert_eq!(words.len(), 2);
	let all = feature_values(
		&pool,
		Table::Contribs { speech_id: 7 },
		["word", "pos", "intercept"],
	)
	.await
	.unwrap();
	assert_eq!(all.len(), 3);
	assert!(all.iter().any(|feature| feature.long_name == "FIXED INTERCEPT"));
}

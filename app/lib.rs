use self::{context::Context, error::Error, score::Score};
use anyhow::Result;
use hyper::{Body, Method, Request, Response, StatusCode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{borrow::Cow, collections::BTreeMap, path::PathBuf, str::FromStr};

mod api;
mod assets;
mod error;
mod layouts;
mod pages;
mod score;
mod store;

pub struct Options {
	pub database_url: String,
	pub database_max_connections: Option<u32>,
	pub host: std::net::IpAddr,
	pub port: u16,
	pub assets_dir: PathBuf,
}

mod context {
	pub struct Context {
		pub options: super::Options,
		pub pool: sqlx::sqlite::SqlitePool,
		/// Every speech the game can pick from, loaded once at startup.
		pub speech_ids: Vec<i64>,
		pub score: super::Score,
	}
}

async fn handle(context: std::sync::Arc<Context>, request: Request<Body>) -> Response<Body> {
	let method = request.method().clone();
	let uri = request.uri().clone();
	let path = uri.path();
	let path_components: Vec<_> = path.split('/').skip(1).collect();
	let search_params: Option<BTreeMap<String, String>> = uri.query().map(|search_params| {
		url::form_urlencoded::parse(search_params.as_bytes())
			.into_owned()
			.collect()
	});
	let result = match (&method, path_components.as_slice()) {
		(&Method::GET, &["health"]) => self::api::health::get(&context, request).await,
		(&Method::GET, &["values"]) | (&Method::GET, &["values", ""]) => {
			self::api::values::get(&context, request, search_params).await
		}
		(&Method::GET, &[""]) => self::pages::index::get(&context, request).await,
		(&Method::GET, &["details"]) | (&Method::GET, &["details", ""]) => {
			self::pages::details::get(&context, request).await
		}
		(&Method::GET, &["js", "client.js"])
		| (&Method::GET, &["js", "client_bg.wasm"])
		| (&Method::GET, &["style.css"]) => self::assets::get(&context, request).await,
		_ => Err(Error::NotFound.into()),
	};
	let response = match result {
		Ok(response) => response,
		Err(error) => error_response(error),
	};
	log::info!("{} {} {}", method, path, response.status().as_u16());
	response
}

fn error_response(error: anyhow::Error) -> Response<Body> {
	let (status, body): (StatusCode, Cow<str>) = match error.downcast_ref::<Error>() {
		Some(Error::BadRequest) => (StatusCode::BAD_REQUEST, "bad request".into()),
		Some(Error::NotFound) => (StatusCode::NOT_FOUND, "not found".into()),
		Some(Error::ServiceUnavailable) => (
			StatusCode::SERVICE_UNAVAILABLE,
			"service unavailable".into(),
		),
		None => {
			log::error!("{:#}", error);
			let body = if cfg!(debug_assertions) {
				format!("{:#}", error).into()
			} else {
				"internal server error".into()
			};
			(StatusCode::INTERNAL_SERVER_ERROR, body)
		}
	};
	let mut response = Response::new(Body::from(body.into_owned()));
	*response.status_mut() = status;
	response
}

pub fn run(options: Options) -> Result<()> {
	tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.build()?
		.block_on(run_impl(options))
}

async fn run_impl(options: Options) -> Result<()> {
	// Configure the database pool. The database is only ever read.
	let pool_options = SqliteConnectOptions::from_str(&options.database_url)?.read_only(true);
	let pool = SqlitePoolOptions::new()
		.max_connections(options.database_max_connections.unwrap_or(4))
		.connect_with(pool_options)
		.await?;
	let speech_ids = store::speech_ids(&pool).await?;
	log::info!("loaded {} speeches", speech_ids.len());
	let addr = std::net::SocketAddr::new(options.host, options.port);
	let context = Context {
		options,
		pool,
		speech_ids,
		score: Score::default(),
	};
	rhetoric_util::serve::serve(addr, context, handle).await?;
	Ok(())
}

#[test]
fn test_error_response_status() {
	assert_eq!(
		error_response(Error::BadRequest.into()).status(),
		StatusCode::BAD_REQUEST
	);
	assert_eq!(
		error_response(Error::NotFound.into()).status(),
		StatusCode::NOT_FOUND
	);
	assert_eq!(
		error_response(Error::ServiceUnavailable.into()).status(),
		StatusCode::SERVICE_UNAVAILABLE
	);
	assert_eq!(
		error_response(anyhow::anyhow!("disk on fire")).status(),
		StatusCode::INTERNAL_SERVER_ERROR
	);
}

#[tokio::test]
async fn test_handle_routes() {
	let pool = store::test_pool().await;
	let speech_ids = store::speech_ids(&pool).await.unwrap();
	let context = std::sync::Arc::new(Context {
		options: Options {
			database_url: "sqlite::memory:".to_owned(),
			database_max_connections: None,
			host: std::net::Ipv4Addr::LOCALHOST.into(),
			port: 8080,
			assets_dir: PathBuf::from("build/assets"),
		},
		pool,
		speech_ids,
		score: Score::default(),
	});
	let status = |response: Response<Body>| response.status();
	let request = |uri: &str| Request::get(uri).body(Body::empty()).unwrap();
	assert_eq!(
		status(handle(context.clone(), request("/health")).await),
		StatusCode::OK
	);
	assert_eq!(
		status(handle(context.clone(), request("/")).await),
		StatusCode::OK
	);
	assert_eq!(
		status(handle(context.clone(), request("/details/")).await),
		StatusCode::OK
	);
	assert_eq!(
		status(handle(context.clone(), request("/values/?order=sideways")).await),
		StatusCode::BAD_REQUEST
	);
	assert_eq!(
		status(
			handle(
				context.clone(),
				request("/values?from=-9223372036854775808&to=-9223372036854775808"),
			)
			.await
		),
		StatusCode::OK
	);
	assert_eq!(
		status(handle(context.clone(), request("/nowhere")).await),
		StatusCode::NOT_FOUND
	);
	let response = handle(
		context.clone(),
		request("/values?table=coefs&type=word&order=descVal&from=1&to=1"),
	)
	.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
	let values: rhetoric_charts::ValuesResponse = serde_json::from_slice(&body).unwrap();
	assert_eq!(values.feature_names, vec!["Word: \"tax\"".to_owned()]);
	assert_eq!(values.mag, 0.75);
}

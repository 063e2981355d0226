use crate::{error::Error, Context};
use anyhow::Result;
use hyper::{header, Body, Request, Response, StatusCode};
use std::path::{Component, Path, PathBuf};

pub fn content_type(path: &str) -> Option<&'static str> {
	if path.ends_with(".css") {
		Some("text/css")
	} else if path.ends_with(".js") {
		Some("text/javascript")
	} else if path.ends_with(".svg") {
		Some("image/svg+xml")
	} else if path.ends_with(".wasm") {
		Some("application/wasm")
	} else {
		None
	}
}

/// Map a request path onto a file below `assets_dir`. Paths that try to leave the directory map to nothing.
fn asset_path(assets_dir: &Path, path: &str) -> Option<PathBuf> {
	let relative = Path::new(path.trim_start_matches('/'));
	if relative.as_os_str().is_empty()
		|| relative
			.components()
			.any(|component| !matches!(component, Component::Normal(_)))
	{
		return None;
	}
	Some(assets_dir.join(relative))
}

pub async fn get(context: &Context, request: Request<Body>) -> Result<Response<Body>> {
	let path = request.uri().path();
	let file_path = asset_path(&context.options.assets_dir, path).ok_or(Error::NotFound)?;
	let data = match tokio::fs::read(&file_path).await {
		Ok(data) => data,
		Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
			return Err(Error::NotFound.into())
		}
		Err(error) => return Err(error.into()),
	};
	let mut response = Response::builder().status(StatusCode::OK);
	if let Some(content_type) = content_type(path) {
		response = response.header(header::CONTENT_TYPE, content_type);
	}
	Ok(response.body(Body::from(data))?)
}

#[test]
fn test_content_type() {
	assert_eq!(content_type("/js/client.js"), Some("text/javascript"));
	assert_eq!(content_type("/js/client_bg.wasm"), Some("application/wasm"));
	assert_eq!(content_type("/style.css"), Some("text/css"));
	assert_eq!(content_type("/favicon.ico"), None);
}

#[test]
fn test_asset_path() {
	let assets_dir = Path::new("build/assets");
	assert_eq!(
		asset_path(assets_dir, "/js/client.js"),
		Some(PathBuf::from("build/assets/js/client.js"))
	);
	assert_eq!(asset_path(assets_dir, "/js/../../secret"), None);
	assert_eq!(asset_path(assets_dir, "/"), None);
}

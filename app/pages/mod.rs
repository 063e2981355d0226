use anyhow::Result;
use hyper::{header, Body, Response, StatusCode};

pub mod details;
pub mod index;

fn html_response(html: String) -> Result<Response<Body>> {
	let response = Response::builder()
		.status(StatusCode::OK)
		.header(header::CONTENT_TYPE, "text/html; charset=utf-8")
		.body(Body::from(html))?;
	Ok(response)
}

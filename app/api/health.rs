use crate::{error::Error, Context};
use anyhow::Result;
use hyper::{Body, Request, Response, StatusCode};

pub async fn get(context: &Context, _request: Request<Body>) -> Result<Response<Body>> {
	match context.pool.acquire().await {
		Ok(_) => Ok(Response::builder()
			.status(StatusCode::OK)
			.body(Body::empty())?),
		Err(error) => {
			log::warn!("health check failed to acquire a connection: {}", error);
			Err(Error::ServiceUnavailable.into())
		}
	}
}

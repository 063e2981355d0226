use backtrace::Backtrace;
use futures::FutureExt;
use hyper::{
	service::{make_service_fn, service_fn},
	Body, Request, Response, Server, StatusCode,
};
use std::{
	cell::RefCell, convert::Infallible, future::Future, net::SocketAddr, panic::AssertUnwindSafe,
	sync::Arc,
};

/// Serve `request_handler` on `addr`. A panic in the handler becomes a 500 response instead of taking the connection down.
pub async fn serve<C, H, F>(
	addr: SocketAddr,
	request_handler_context: C,
	request_handler: H,
) -> hyper::Result<()>
where
	C: Send + Sync + 'static,
	H: Fn(Arc<C>, Request<Body>) -> F + Send + Sync + 'static,
	F: Future<Output = Response<Body>> + Send + 'static,
{
	// Create a task local that will store the panic message and backtrace if a panic occurs.
	tokio::task_local! {
		static PANIC_MESSAGE_AND_BACKTRACE: RefCell<Option<(String, Backtrace)>>;
	}
	async fn service<C, H, F>(
		request_handler: Arc<H>,
		request_handler_context: Arc<C>,
		request: Request<Body>,
	) -> Result<Response<Body>, Infallible>
	where
		C: Send + Sync + 'static,
		H: Fn(Arc<C>, Request<Body>) -> F + Send + Sync + 'static,
		F: Future<Output = Response<Body>> + Send + 'static,
	{
		let method = request.method().clone();
		let path = request.uri().path().to_owned();
		let result = AssertUnwindSafe(request_handler(request_handler_context, request))
			.catch_unwind()
			.await;
		let response = result.unwrap_or_else(|_| {
			let message = PANIC_MESSAGE_AND_BACKTRACE
				.try_with(|panic_message_and_backtrace| {
					panic_message_and_backtrace
						.borrow()
						.as_ref()
						.map(|(message, backtrace)| format!("{}\n{:?}", message, backtrace))
				})
				.ok()
				.flatten()
				.unwrap_or_else(|| "unknown panic".to_owned());
			log::error!("{} {} 500\n{}", method, path, message);
			let body = if cfg!(debug_assertions) {
				message
			} else {
				"internal server error".to_owned()
			};
			let mut response = Response::new(Body::from(body));
			*response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
			response
		});
		Ok(response)
	}
	// Install a panic hook that will record the panic message and backtrace if a panic occurs.
	let hook = std::panic::take_hook();
	std::panic::set_hook(Box::new(|panic_info| {
		let value = (panic_info.to_string(), Backtrace::new());
		let _ = PANIC_MESSAGE_AND_BACKTRACE.try_with(move |panic_message_and_backtrace| {
			panic_message_and_backtrace.borrow_mut().replace(value);
		});
	}));
	// Wrap the request handler and context with Arc to allow sharing a reference to it with each task.
	let request_handler = Arc::new(request_handler);
	let request_handler_context = Arc::new(request_handler_context);
	let service = make_service_fn(|_| {
		let request_handler = request_handler.clone();
		let request_handler_context = request_handler_context.clone();
		async move {
			Ok::<_, Infallible>(service_fn(move |request| {
				let request_handler = request_handler.clone();
				let request_handler_context = request_handler_context.clone();
				PANIC_MESSAGE_AND_BACKTRACE.scope(RefCell::new(None), async move {
					service(request_handler, request_handler_context, request).await
				})
			}))
		}
	});
	let server = Server::try_bind(&addr)?;
	log::info!("serving on port {}", addr.port());
	let result = server.serve(service).await;
	std::panic::set_hook(hook);
	result
}

use gloo_net::http::Request;
use rhetoric_charts::{
	bar_chart::{Bar, Tooltip, TooltipPlacement, XAxis, YAxis},
	chart::{Annotation, ChartController, ChartOptions, ChartRenderer},
	common::{Point, Rect},
	config::{ChartConfig, CHART_CONFIG},
	range::parse_bound,
	svg::{self, format_coordinate},
	transition::Transition,
	ValuesResponse,
};
use std::{cell::RefCell, collections::BTreeMap, rc::Rc, time::Duration};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::spawn_local;

type Controller = ChartController<DomRenderer>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[wasm_bindgen(start)]
pub fn start() {
	console_error_panic_hook::set_once();
	init_log();
	if let Err(error) = boot() {
		log::error!("failed to start the chart: {:?}", error);
	}
}

fn init_log() {
	let level = if cfg!(debug_assertions) {
		log::LevelFilter::Debug
	} else {
		log::LevelFilter::Warn
	};
	let _ = fern::Dispatch::new()
		.level(log::LevelFilter::Warn)
		.level_for(env!("CARGO_CRATE_NAME"), level)
		.level_for("rhetoric_charts", level)
		.chain(fern::Output::call(|record| {
			let message = record.args().to_string();
			match record.level() {
				log::Level::Error => web_sys::console::error_1(&message.into()),
				log::Level::Warn => web_sys::console::warn_1(&message.into()),
				log::Level::Info => web_sys::console::info_1(&message.into()),
				log::Level::Debug | log::Level::Trace => web_sys::console::log_1(&message.into()),
			}
		}))
		.apply();
}

fn report(result: Result<(), JsValue>) {
	if let Err(error) = result {
		log::error!("{:?}", error);
	}
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
	JsValue::from_str(&message.to_string())
}

fn element_by_id<T: JsCast>(document: &web_sys::Document, id: &str) -> Result<T, JsValue> {
	document
		.get_element_by_id(id)
		.ok_or_else(|| js_error(format!("missing element #{}", id)))?
		.dyn_into::<T>()
		.map_err(|_| js_error(format!("element #{} has an unexpected type", id)))
}

/// The form controls that select what the chart shows.
#[derive(Clone)]
struct Controls {
	order: web_sys::HtmlSelectElement,
	feature_type: web_sys::HtmlSelectElement,
	text: web_sys::HtmlInputElement,
	lower: web_sys::HtmlInputElement,
	upper: web_sys::HtmlInputElement,
}

impl Controls {
	fn find(document: &web_sys::Document) -> Result<Controls, JsValue> {
		Ok(Controls {
			order: element_by_id(document, "order")?,
			feature_type: element_by_id(document, "type")?,
			text: element_by_id(document, "text")?,
			lower: element_by_id(document, "lower")?,
			upper: element_by_id(document, "upper")?,
		})
	}
}

/// Create a live SVG node from a detached element.
fn build(document: &web_sys::Document, element: &svg::Element) -> Result<web_sys::Element, JsValue> {
	let node = document.create_element_ns(Some(svg::SVG_NAMESPACE), element.name)?;
	for (name, value) in element.attributes.iter() {
		node.set_attribute(name, value)?;
	}
	if let Some(text) = &element.text {
		node.set_text_content(Some(text));
	}
	for child in element.children.iter() {
		let child: web_sys::Element = build(document, child)?;
		node.append_child(&child)?;
	}
	Ok(node)
}

fn set_rect(element: &web_sys::Element, rect: Rect) -> Result<(), JsValue> {
	element.set_attribute("x", &format_coordinate(rect.x))?;
	element.set_attribute("y", &format_coordinate(rect.y))?;
	element.set_attribute("width", &format_coordinate(rect.w))?;
	element.set_attribute("height", &format_coordinate(rect.h))?;
	Ok(())
}

struct Animation {
	/// The timestamp of the first frame, in milliseconds.
	start: Option<f64>,
	transition: Transition,
}

struct SceneBar {
	element: web_sys::Element,
	/// The geometry last written to `element`.
	drawn: Rect,
}

/// State shared between the renderer and the animation frame loop.
#[derive(Default)]
struct Scene {
	bars: BTreeMap<String, SceneBar>,
	animation: Option<Animation>,
	animating: bool,
}

/// Advance the running animation to `timestamp`. Returns whether another frame is needed.
fn frame(scene: &mut Scene, timestamp: f64) -> Result<bool, JsValue> {
	let animation = match scene.animation.as_mut() {
		Some(animation) => animation,
		None => return Ok(false),
	};
	let start = *animation.start.get_or_insert(timestamp);
	let elapsed = Duration::from_secs_f64(((timestamp - start) / 1000.0).max(0.0));
	for (key, rect) in animation.transition.sample(elapsed) {
		if let Some(bar) = scene.bars.get_mut(key) {
			set_rect(&bar.element, rect)?;
			bar.drawn = rect;
		}
	}
	let finished = animation.transition.is_finished(elapsed);
	if finished {
		scene.animation = None;
	}
	Ok(!finished)
}

fn request_frame(callback: &FrameCallback) -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
	if let Some(callback) = callback.borrow().as_ref() {
		window.request_animation_frame(callback.as_ref().unchecked_ref())?;
	}
	Ok(())
}

/// Draws the chart into the page's `.graph` container.
struct DomRenderer {
	config: ChartConfig,
	document: web_sys::Document,
	svg: web_sys::Element,
	annotations: web_sys::Element,
	bars: web_sys::Element,
	axes: web_sys::Element,
	tooltip: web_sys::HtmlElement,
	upper: web_sys::HtmlInputElement,
	scene: Rc<RefCell<Scene>>,
	frame_callback: FrameCallback,
}

impl DomRenderer {
	fn new(
		config: ChartConfig,
		document: web_sys::Document,
		container: &web_sys::Element,
		upper: web_sys::HtmlInputElement,
	) -> Result<DomRenderer, JsValue> {
		// Replace the chart drawn on the server with a live one.
		container.set_inner_html("");
		let svg = build(
			&document,
			&svg::Element::new("svg")
				.attribute("width", format_coordinate(config.width))
				.attribute("height", format_coordinate(config.height)),
		)?;
		let plot = build(
			&document,
			&svg::Element::new("g").attribute(
				"transform",
				format!(
					"translate({},{})",
					format_coordinate(config.margin.left),
					format_coordinate(config.margin.top)
				),
			),
		)?;
		let annotations = build(&document, &svg::Element::new("g"))?;
		let bars = build(&document, &svg::Element::new("g"))?;
		let axes = build(&document, &svg::Element::new("g"))?;
		plot.append_child(&annotations)?;
		plot.append_child(&bars)?;
		plot.append_child(&axes)?;
		svg.append_child(&plot)?;
		container.append_child(&svg)?;
		let tooltip = document
			.create_element("div")?
			.dyn_into::<web_sys::HtmlElement>()?;
		tooltip.set_class_name("d3-tip");
		tooltip.style().set_property("position", "absolute")?;
		tooltip.style().set_property("pointer-events", "none")?;
		tooltip.style().set_property("display", "none")?;
		document
			.body()
			.ok_or_else(|| js_error("no body"))?
			.append_child(&tooltip)?;
		let scene = Rc::new(RefCell::new(Scene::default()));
		let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
		let callback = frame_callback.clone();
		let loop_scene = scene.clone();
		*frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
			let result = frame(&mut loop_scene.borrow_mut(), timestamp);
			let next = result.and_then(|needed| {
				if needed {
					request_frame(&callback).map(|_| true)
				} else {
					Ok(false)
				}
			});
			match next {
				Ok(true) => {}
				Ok(false) => loop_scene.borrow_mut().animating = false,
				Err(error) => {
					log::error!("animation stopped: {:?}", error);
					loop_scene.borrow_mut().animating = false;
				}
			}
		}) as Box<dyn FnMut(f64)>));
		Ok(DomRenderer {
			config,
			document,
			svg,
			annotations,
			bars,
			axes,
			tooltip,
			upper,
			scene,
			frame_callback,
		})
	}

	/// Convert a pointer position to plot coordinates.
	fn plot_point(&self, event: &web_sys::MouseEvent) -> Point {
		let rect = self.svg.get_bounding_client_rect();
		Point {
			x: f64::from(event.client_x()) - rect.left() - self.config.margin.left,
			y: f64::from(event.client_y()) - rect.top() - self.config.margin.top,
		}
	}

	fn show_tooltip(&self, tooltip: &Tooltip) -> Result<(), JsValue> {
		let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
		let rect = self.svg.get_bounding_client_rect();
		let left = rect.left() + window.scroll_x()? + self.config.margin.left + tooltip.origin.x;
		let top = rect.top() + window.scroll_y()? + self.config.margin.top + tooltip.origin.y;
		let transform = match tooltip.placement {
			TooltipPlacement::Above => "translate(-50%, -100%)",
			TooltipPlacement::Below => "translate(-50%, 0)",
		};
		self.tooltip
			.set_text_content(Some(&format!("{}: {}", tooltip.label, tooltip.value)));
		self.tooltip
			.set_class_name(&format!("d3-tip {}", tooltip.placement.class()));
		let style = self.tooltip.style();
		style.set_property("left", &format!("{}px", left))?;
		style.set_property("top", &format!("{}px", top))?;
		style.set_property("transform", transform)?;
		style.set_property("display", "block")?;
		Ok(())
	}

	fn hide_tooltip(&self) -> Result<(), JsValue> {
		self.tooltip.style().set_property("display", "none")
	}

	fn replace_children(
		&self,
		parent: &web_sys::Element,
		children: &[svg::Element],
	) -> Result<(), JsValue> {
		parent.set_inner_html("");
		for child in children {
			let child: web_sys::Element = build(&self.document, child)?;
			parent.append_child(&child)?;
		}
		Ok(())
	}

	fn try_insert_bar(&mut self, bar: &Bar, initial: Rect) -> Result<(), JsValue> {
		let element = build(
			&self.document,
			&svg::bar_element(&self.config, &bar.key, bar.sign, initial),
		)?;
		self.bars.append_child(&element)?;
		self.scene.borrow_mut().bars.insert(
			bar.key.clone(),
			SceneBar {
				element,
				drawn: initial,
			},
		);
		Ok(())
	}
}

impl ChartRenderer for DomRenderer {
	fn draw_annotations(&mut self, annotations: &[Annotation]) {
		let elements = annotations
			.iter()
			.map(|annotation| svg::annotation_element(&self.config, annotation))
			.collect::<Vec<_>>();
		report(self.replace_children(&self.annotations, &elements));
	}

	fn remove_bar(&mut self, key: &str) {
		if let Some(bar) = self.scene.borrow_mut().bars.remove(key) {
			bar.element.remove();
		}
	}

	fn insert_bar(&mut self, bar: &Bar, initial: Rect) {
		report(self.try_insert_bar(bar, initial));
	}

	fn update_bar(&mut self, bar: &Bar) {
		if let Some(scene_bar) = self.scene.borrow().bars.get(&bar.key) {
			report(
				scene_bar
					.element
					.set_attribute("class", bar.sign.class(&self.config)),
			);
		}
	}

	fn transition_bars(&mut self, transition: Transition) {
		let mut scene = self.scene.borrow_mut();
		scene.animation = Some(Animation {
			start: None,
			transition,
		});
		if !scene.animating {
			scene.animating = true;
			drop(scene);
			report(request_frame(&self.frame_callback));
		}
	}

	fn drawn_rect(&self, key: &str) -> Option<Rect> {
		self.scene.borrow().bars.get(key).map(|bar| bar.drawn)
	}

	fn draw_axes(&mut self, x_axis: &XAxis, y_axis: &YAxis) {
		let elements = [
			svg::x_axis_element(&self.config, x_axis),
			svg::y_axis_element(&self.config, y_axis),
		];
		report(self.replace_children(&self.axes, &elements));
	}

	fn set_exhausted(&mut self, exhausted: bool) {
		report(
			self.upper
				.class_list()
				.toggle_with_force(self.config.exhausted_class, exhausted)
				.map(|_| ()),
		);
	}
}

async fn fetch_values(url: &str) -> Result<ValuesResponse, gloo_net::Error> {
	let response = Request::get(url).send().await?;
	if !response.ok() {
		return Err(gloo_net::Error::GlooError(format!(
			"GET {} returned {}",
			url,
			response.status()
		)));
	}
	response.json().await
}

/// Clamp the bounds, write them back into the inputs and fetch the matching values.
fn update(controller: &Rc<RefCell<Controller>>, controls: &Controls) {
	let max_upper = i64::from(controller.borrow().options().max_upper_bound);
	let lower = parse_bound(&controls.lower.value(), 1);
	let upper = parse_bound(&controls.upper.value(), max_upper);
	let pending = controller.borrow_mut().request_update(
		lower,
		upper,
		&controls.text.value(),
		&controls.feature_type.value(),
		&controls.order.value(),
	);
	let range = pending.request.range;
	controls.lower.set_value(&range.lower.to_string());
	controls.upper.set_value(&range.upper.to_string());
	let url = pending.request.url();
	let sequence = pending.sequence;
	let controller = controller.clone();
	spawn_local(async move {
		match fetch_values(&url).await {
			Ok(response) => {
				let result = controller.borrow_mut().receive(sequence, response);
				if let Err(error) = result {
					log::error!("failed to draw values from {}: {}", url, error);
				}
			}
			Err(error) => controller.borrow_mut().fail(sequence, &error),
		}
	});
}

fn bind_control(
	target: &web_sys::EventTarget,
	event_name: &str,
	controller: &Rc<RefCell<Controller>>,
	controls: &Controls,
) -> Result<(), JsValue> {
	let controller = controller.clone();
	let controls = controls.clone();
	let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
		move |_event: web_sys::Event| update(&controller, &controls),
	));
	target.add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())?;
	callback.forget();
	Ok(())
}

fn boot() -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
	let document = window.document().ok_or_else(|| js_error("no document"))?;
	let container = match document.query_selector(".graph")? {
		Some(container) => container.dyn_into::<web_sys::HtmlElement>()?,
		None => return Ok(()),
	};
	let options = container
		.dataset()
		.get("options")
		.ok_or_else(|| js_error("the chart container has no options"))?;
	let options: ChartOptions = serde_json::from_str(&options).map_err(js_error)?;
	let controls = Controls::find(&document)?;
	let renderer = DomRenderer::new(
		CHART_CONFIG,
		document,
		&container,
		controls.upper.clone(),
	)?;
	let svg = renderer.svg.clone();
	let controller = ChartController::configure(options, renderer).map_err(js_error)?;
	let controller = Rc::new(RefCell::new(controller));
	bind_control(&controls.order, "change", &controller, &controls)?;
	bind_control(&controls.feature_type, "change", &controller, &controls)?;
	bind_control(&controls.lower, "change", &controller, &controls)?;
	bind_control(&controls.upper, "change", &controller, &controls)?;
	bind_control(&controls.text, "keyup", &controller, &controls)?;
	let hover_controller = controller.clone();
	let on_mouse_move = Closure::<dyn FnMut(web_sys::MouseEvent)>::wrap(Box::new(
		move |event: web_sys::MouseEvent| {
			let controller = hover_controller.borrow();
			let renderer = controller.renderer();
			let point = renderer.plot_point(&event);
			match controller.hover(point) {
				Some(tooltip) => report(renderer.show_tooltip(&tooltip)),
				None => report(renderer.hide_tooltip()),
			}
		},
	));
	svg.add_event_listener_with_callback("mousemove", on_mouse_move.as_ref().unchecked_ref())?;
	on_mouse_move.forget();
	let leave_controller = controller.clone();
	let on_mouse_leave = Closure::<dyn FnMut(web_sys::MouseEvent)>::wrap(Box::new(
		move |_event: web_sys::MouseEvent| {
			report(leave_controller.borrow().renderer().hide_tooltip());
		},
	));
	svg.add_event_listener_with_callback("mouseleave", on_mouse_leave.as_ref().unchecked_ref())?;
	on_mouse_leave.forget();
	update(&controller, &controls);
	Ok(())
}

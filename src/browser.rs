use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::{
    Closure,
    WasmClosure,
    WasmClosureFnOnce,
};

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    HtmlCanvasElement,
    HtmlImageElement,
    Response,
};

// ==================== Logging ====================
// console on wasm32, stderr everywhere else so native unit tests can run
// through the same code paths
macro_rules! log {
    ($($t:tt)*) => {
        $crate::browser::console_log(&format!($($t)*))
    }
}

macro_rules! error {
    ($($t:tt)*) => {
        $crate::browser::console_error(&format!($($t)*))
    }
}

pub fn console_log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{}", message);
}

pub fn console_error(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("ERROR: {}", message);
}

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CANVAS_ID: &str = "canvas";
    pub const CONTEXT_2D: &str = "2d";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn create_html_image_element() -> Result<HtmlImageElement> {
    HtmlImageElement::new().map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

/// Look up an element by id and cast it to the web-sys type we expect.
/// Two ways to fail: the id is not in the page, or it names another kind of
/// element (a `<div id="canvas">` is not a canvas).
fn element_by_id<T: JsCast>(id: &str) -> Result<T> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No element with id '{}' in the page", id))?
        .dyn_into::<T>()
        .map_err(|element| anyhow!("Element '{}' has the wrong type : {:#?}", id, element))
}

/// The board canvas, sized by the game once the config is known
pub fn canvas() -> Result<HtmlCanvasElement> {
    element_by_id::<HtmlCanvasElement>(html::CANVAS_ID)
}

pub fn context() -> Result<CanvasRenderingContext2d> {
    // get_context gives Result<Option<Object>, JsValue>
    // - Err  : the browser refused, e.g. the canvas already has a webgl context
    // - None : the context type is unknown to this browser
    // - Some : a plain js Object that still needs the cast below
    canvas()?
        .get_context(html::CONTEXT_2D)
        .map_err(|js_value| anyhow!("Canvas refused a 2d context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("Browser has no 2d canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|object| anyhow!("{:#?} is not a CanvasRenderingContext2d", object))
}

// None only outside a page, e.g. inside a web worker
pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("No window, not running in a page"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("Window has no document"))
}

/// Milliseconds since page load, from `performance.now()`
pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}

/// Js callback that may run at most once, used for image onload/onerror.
/// Calling it a second time throws on the js side instead of running `f`.
pub fn closure_once<F, A, R>(f: F) ->
    Closure<F::FnMut>
where
    F: 'static + WasmClosureFnOnce<A, R>,
{
    Closure::once(f)
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f) as Box<dyn FnMut(f64)>)
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// GET `json_path` and deserialize the body into `T`.
/// A 404 still resolves the fetch promise, so the status is checked by hand.
pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = fetch_response(json_path).await?;
    if !response.ok() {
        return Err(anyhow!("{} answered with status {}", json_path, response.status()));
    }

    // json() hands back a Promise, JsFuture turns it into a Rust future
    let body = response
        .json()
        .map_err(|err| anyhow!("{} has no readable body : {:#?}", json_path, err))?;
    let json_value = JsFuture::from(body)
        .await
        .map_err(|err| anyhow!("{} is not valid json : {:#?}", json_path, err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("{} does not match the expected shape : {}", json_path, err))
}

async fn fetch_response(resource: &str) -> Result<Response> {
    // rejected only on network errors, never on http error codes
    JsFuture::from(window()?.fetch_with_str(resource))
        .await
        .map_err(|err| anyhow!("Could not fetch {} : {:#?}", resource, err))?
        .dyn_into::<Response>()
        .map_err(|value| anyhow!("fetch of {} gave no Response : {:#?}", resource, value))
}

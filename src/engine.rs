use crate::browser;
use anyhow::{anyhow, Result};
// wasm is single threaded, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::{channel, Sender};
use futures::future::join_all;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref casts the closure to a js Function, we created the
    // closure ourselves so the type is known
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use self::input::KeyState;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// `dt` is the measured wall clock time since the previous frame, in seconds
    fn update(&mut self, dt: f32, keystate: &KeyState);
    fn draw(&self, renderer: &Renderer);
}

// only a stalled or backgrounded tab is clamped, slow devices keep real time
pub const MAX_FRAME_DT: f32 = 0.25;

pub struct GameLoop {
    last_frame: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut keyevent_receiver = input::prepare_input()?;
        // one shot readiness gate: nothing ticks until every asset is loaded
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
        };
        let mut keystate = KeyState::new();
        let renderer = Renderer {
            context: browser::context()?,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut keystate, &mut keyevent_receiver);
            let dt = game_loop.frame_delta(perf);
            game.update(dt, &keystate);
            keystate.end_frame();
            game.draw(&renderer);
            if let Some(next) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next) {
                    error!("GameLoop: {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }

    /// Seconds elapsed since the last frame, clamped to `[0, MAX_FRAME_DT]`
    fn frame_delta(&mut self, now: f64) -> f32 {
        let dt = ((now - self.last_frame) / 1000.0) as f32;
        self.last_frame = now;
        dt.clamp(0.0, MAX_FRAME_DT)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis aligned overlap, touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.stroke_rect(self, "#ff0000");
    }
}

pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// How an image is placed on the canvas
/// - `position` : top left corner in pixels
/// - `translate` : extra offset applied after positioning (hop animation)
pub struct Placement {
    pub position: Point,
    pub translate: Point,
    pub scale: f32,
    pub opacity: f32,
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn draw_image(&self, image: &HtmlImageElement, position: &Point) {
        self.context
            .draw_image_with_html_image_element(image, position.x.into(), position.y.into())
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }

    pub fn draw_placed_image(&self, image: &HtmlImageElement, placement: &Placement) {
        self.context.save();
        self.context.set_global_alpha(placement.opacity.clamp(0.0, 1.0).into());
        self.context
            .translate(
                (placement.position.x + placement.translate.x).into(),
                (placement.position.y + placement.translate.y).into(),
            )
            .expect("Canvas translate failed");
        self.context
            .scale(placement.scale.into(), placement.scale.into())
            .expect("Canvas scale failed");
        self.draw_image(image, &Point::default());
        self.context.restore();
    }

    pub fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.fill_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn stroke_rect(&self, rect: &Rect, color: &str) {
        self.context.set_stroke_style_str(color);
        self.context.stroke_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    /// Filled text with a dark outline, the way every overlay in the game
    /// is drawn
    pub fn draw_text(&self, text: &str, position: &Point, font: &str, align: TextAlign) {
        self.context.save();
        self.context.set_font(font);
        self.context.set_text_align(align.as_str());
        self.context.set_line_width(6.0);
        self.context.set_stroke_style_str("#333");
        self.context
            .stroke_text(text, position.x.into(), position.y.into())
            .expect("Drawing is throwing exceptions! Unrecoverable error");
        self.context.set_fill_style_str("#eee");
        self.context
            .fill_text(text, position.x.into(), position.y.into())
            .expect("Drawing is throwing exceptions! Unrecoverable error");
        self.context.restore();
    }
}

/// Image cache keyed by url
/// - `load()` waits until every requested url has settled, loaded or not
/// - `is_ready()` holds once nothing requested is missing, the game only
///   starts then
/// - `get()` returns `None` for urls that failed or were never requested
#[derive(Default)]
pub struct Assets {
    images: HashMap<String, HtmlImageElement>,
    missing: Vec<String>,
}

impl Assets {
    pub async fn load(sources: &[&str]) -> Assets {
        let mut unique: Vec<&str> = Vec::with_capacity(sources.len());
        for source in sources {
            if !unique.contains(source) {
                unique.push(*source);
            }
        }
        // join_all rather than try_join_all, one broken url must not hide
        // the others from the report
        let results = join_all(unique.iter().map(|source| load_image(source))).await;

        let mut assets = Assets::default();
        for (source, result) in unique.into_iter().zip(results) {
            match result {
                Ok(image) => {
                    assets.images.insert(source.to_string(), image);
                }
                Err(err) => {
                    error!("{:#}", err);
                    assets.missing.push(source.to_string());
                }
            }
        }
        assets
    }

    pub fn get(&self, source: &str) -> Option<&HtmlImageElement> {
        self.images.get(source)
    }

    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    /// Requested urls that failed to load, in request order
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

// The image answers through one of two js callbacks. Whichever fires first
// takes the sender out of the Option, the other one then finds None.
type LoadSender = Rc<RefCell<Option<Sender<Result<()>>>>>;

fn settle(sender: &LoadSender, result: Result<()>) {
    if let Some(tx) = sender.borrow_mut().take() {
        // Err only when the receiver is gone, nobody is waiting anymore
        let _ = tx.send(result);
    }
}

/// Load one image: resolves on `onload`, fails on `onerror`
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::create_html_image_element()?;
    let (tx, rx) = channel::<Result<()>>();
    let sender: LoadSender = Rc::new(RefCell::new(Some(tx)));

    let on_load = {
        let sender = sender.clone();
        browser::closure_once(move || settle(&sender, Ok(())))
    };
    let url = source.to_string();
    let on_error = browser::closure_once(move |err: JsValue| {
        settle(&sender, Err(anyhow!("Image {} did not load : {:#?}", url, err)))
    });

    image.set_onload(Some(on_load.as_ref().unchecked_ref()));
    image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    // src goes last, a cached image can fire onload as soon as it is set
    image.set_src(source);

    // Rust would drop both closures when this function returns, long before
    // the browser calls them. forget() hands them over to js.
    on_load.forget();
    on_error.forget();

    // rx yields Result<Result<()>, Canceled>
    // - outer : the sender was dropped without an answer
    // - inner : onerror fired
    rx.await
        .map_err(|_| anyhow!("Image {} was dropped before it settled", source))??;
    Ok(image)
}

pub mod input {
    use crate::browser;
    use anyhow::{anyhow, Result};
    use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use web_sys::KeyboardEvent;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum KeyPress {
        KeyUp(String),
        KeyDown(String),
    }

    /// Keys currently held, plus the keys that went down during this frame
    #[derive(Debug, Default)]
    pub struct KeyState {
        pressed: HashSet<String>,
        tapped: HashSet<String>,
    }

    impl KeyState {
        pub fn new() -> Self {
            KeyState::default()
        }

        pub fn is_pressed(&self, code: &str) -> bool {
            self.pressed.contains(code)
        }

        /// true only on the frame the key went down, auto repeat is ignored
        pub fn was_tapped(&self, code: &str) -> bool {
            self.tapped.contains(code)
        }

        pub fn set_pressed(&mut self, code: &str) {
            if self.pressed.insert(code.to_string()) {
                self.tapped.insert(code.to_string());
            }
        }

        pub fn set_released(&mut self, code: &str) {
            self.pressed.remove(code);
        }

        pub fn end_frame(&mut self) {
            self.tapped.clear();
        }
    }

    // keys the page itself would react to (scrolling)
    const CAPTURED_KEYS: [&str; 5] = ["ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown", "Escape"];

    pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
        let (keydown_sender, keyevent_receiver) = unbounded();
        let keydown_sender = Rc::new(RefCell::new(keydown_sender));
        let keyup_sender = Rc::clone(&keydown_sender);

        let onkeydown = browser::closure_wrap(Box::new(move |keycode: KeyboardEvent| {
            forward(&keydown_sender, &keycode, KeyPress::KeyDown(keycode.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let onkeyup = browser::closure_wrap(Box::new(move |keycode: KeyboardEvent| {
            forward(&keyup_sender, &keycode, KeyPress::KeyUp(keycode.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let window = browser::window().map_err(|err| anyhow!("Cannot bind keys : {:#?}", err))?;
        window.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
        window.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
        // handlers live for the whole page
        onkeydown.forget();
        onkeyup.forget();

        Ok(keyevent_receiver)
    }

    fn forward(sender: &Rc<RefCell<UnboundedSender<KeyPress>>>, event: &KeyboardEvent, press: KeyPress) {
        if CAPTURED_KEYS.contains(&event.code().as_str()) {
            event.prevent_default();
        }
        let _ = sender.borrow_mut().unbounded_send(press);
    }

    /// Drain every pending key event into `state`, never blocks
    pub fn process_input(state: &mut KeyState, keyevent_receiver: &mut UnboundedReceiver<KeyPress>) {
        // Err -> nothing pending, or every sender is gone
        while let Ok(evt) = keyevent_receiver.try_recv() {
            match evt {
                KeyPress::KeyUp(code) => state.set_released(&code),
                KeyPress::KeyDown(code) => state.set_pressed(&code),
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rect_overlap_is_symmetric() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 5.0, 10.0, 10.0),
            Rect::new(10.0, 0.0, 10.0, 10.0),
            Rect::new(-3.0, 8.0, 4.0, 1.0),
            Rect::new(100.0, 100.0, 1.0, 1.0),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(a.intersects(b), b.intersects(a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let left = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!left.intersects(&right));
        assert!(left.intersects(&Rect::new(9.5, 9.5, 1.0, 1.0)));
    }

    #[test]
    fn assets_are_ready_only_without_missing_images() {
        let assets = Assets::default();
        assert!(assets.is_ready());

        let assets = Assets {
            images: HashMap::new(),
            missing: vec!["images/Heart.png".to_string()],
        };
        assert!(!assets.is_ready());
        assert_eq!(assets.missing(), ["images/Heart.png".to_string()]);
        assert!(assets.get("images/Heart.png").is_none());
    }

    #[test]
    fn frame_delta_is_seconds_and_clamped() {
        let mut game_loop = GameLoop { last_frame: 1000.0 };
        assert_relative_eq!(game_loop.frame_delta(1016.0), 0.016);
        // a 20 fps frame is still wall clock time
        assert_relative_eq!(game_loop.frame_delta(1066.0), 0.05, epsilon = 1e-6);
        // long stall
        assert_relative_eq!(game_loop.frame_delta(5066.0), MAX_FRAME_DT);
        // clock going backwards never yields negative time
        assert_relative_eq!(game_loop.frame_delta(4000.0), 0.0);
        assert_relative_eq!(game_loop.frame_delta(4200.0), 0.2, epsilon = 1e-6);
    }
}

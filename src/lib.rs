// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
pub mod browser;
pub mod collision;
pub mod config;
pub mod engine;
pub mod game;
pub mod grid;
pub mod hud;
pub mod level;
pub mod sprite;
pub mod world;

use engine::GameLoop;
use game::GoForWater;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - loads config and sprites
/// - sizes the canvas to the board
/// - starts the frame loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(GoForWater::new()).await {
            error!("Could not start Go For Water: {:#?}", err);
        }
    });

    Ok(())
}

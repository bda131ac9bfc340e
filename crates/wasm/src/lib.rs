mod dom;
pub mod markup;

use infiniscroll_core::{CarouselEngine, EngineConfig};
use infiniscroll_protocol::HostEvent;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::markup::{CarouselConfig, Preset};

/// Bind the built-in presets once the document has been parsed.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if document.ready_state() == "loading" {
        let on_ready = Closure::<dyn FnMut()>::new(bind_presets);
        document.add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
        )?;
        on_ready.forget();
    } else {
        bind_presets();
    }
    Ok(())
}

fn bind_presets() {
    for preset in Preset::ALL {
        if let Err(err) = dom::bind_all(&CarouselConfig::for_preset(preset)) {
            web_sys::console::warn_1(&err);
        }
    }
}

/// Bind every carousel described by a JSON `CarouselConfig`. Containers that
/// are already bound are skipped. Returns the number of newly bound carousels.
#[wasm_bindgen]
pub fn bind_carousels(config_json: &str) -> Result<usize, JsError> {
    let config =
        CarouselConfig::from_json(config_json).map_err(|e| JsError::new(&e.to_string()))?;
    dom::bind_all(&config).map_err(|e| JsError::new(&format!("{e:?}")))
}

/// Bind one of the built-in presets (`"column"` or `"cards"`).
#[wasm_bindgen]
pub fn bind_preset(name: &str) -> Result<usize, JsError> {
    let preset =
        Preset::from_name(name).ok_or_else(|| JsError::new(&format!("unknown preset: {name}")))?;
    dom::bind_all(&CarouselConfig::for_preset(preset))
        .map_err(|e| JsError::new(&format!("{e:?}")))
}

/// An engine with no document attached. Events go in as JSON and the
/// resulting commands come back as a JSON array, for hosts that render the
/// track themselves.
#[wasm_bindgen]
pub struct HeadlessCarousel {
    engine: CarouselEngine,
}

#[wasm_bindgen]
impl HeadlessCarousel {
    #[wasm_bindgen(constructor)]
    pub fn new() -> HeadlessCarousel {
        Self {
            engine: CarouselEngine::new(EngineConfig::default()),
        }
    }

    /// Build from a JSON `EngineConfig`; missing fields take their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<HeadlessCarousel, JsError> {
        let config =
            EngineConfig::from_json(config_json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            engine: CarouselEngine::new(config),
        })
    }

    pub fn dispatch(&mut self, event_json: &str) -> Result<String, JsError> {
        dispatch_json(&mut self.engine, event_json).map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn offset(&self) -> f64 {
        self.engine.offset()
    }

    pub fn phase(&self) -> String {
        self.engine.phase().name().to_string()
    }

    #[wasm_bindgen(js_name = logicalIndex)]
    pub fn logical_index(&self) -> Option<usize> {
        self.engine.logical_index()
    }
}

impl Default for HeadlessCarousel {
    fn default() -> Self {
        Self::new()
    }
}

fn dispatch_json(
    engine: &mut CarouselEngine,
    event_json: &str,
) -> Result<String, serde_json::Error> {
    let event: HostEvent = serde_json::from_str(event_json)?;
    let commands = engine.handle(event);
    serde_json::to_string(&commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> CarouselEngine {
        let mut engine = CarouselEngine::new(EngineConfig::default());
        let json = dispatch_json(
            &mut engine,
            r#"{"Attach":{"items":[{"width":80.0,"role":"Original"},{"width":80.0,"role":"Original"}],"viewport_width":390.0}}"#,
        )
        .unwrap();
        assert!(json.contains("BuildTrack"), "{json}");
        engine
    }

    #[test]
    fn headless_attach_parks_on_originals() {
        let engine = attached();
        assert_eq!(engine.offset(), 200.0);
        assert_eq!(engine.logical_index(), Some(0));
    }

    #[test]
    fn headless_drag_returns_command_array() {
        let mut engine = attached();
        dispatch_json(&mut engine, r#"{"PointerDown":{"x":100.0,"time_ms":0.0}}"#).unwrap();
        let json = dispatch_json(&mut engine, r#"{"PointerMove":{"x":90.0,"time_ms":20.0}}"#)
            .unwrap();
        let commands: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(commands[0], "SuppressDefault");
        assert_eq!(commands[1]["SetOffset"]["offset"], 212.0);
        assert_eq!(engine.phase().name(), "dragging");
    }

    #[test]
    fn headless_rejects_malformed_events() {
        let mut engine = attached();
        assert!(dispatch_json(&mut engine, r#"{"Teleport":{}}"#).is_err());
        assert_eq!(engine.offset(), 200.0);
    }
}

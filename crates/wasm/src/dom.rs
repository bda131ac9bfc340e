//! Document binding: finds carousels, builds their tracks and wires browser
//! events, frames and timers to one engine per carousel.
//!
//! Each carousel's state lives in an `Rc<RefCell<Binding>>` captured by its
//! own listeners. Nothing is shared between carousels.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use infiniscroll_core::CarouselEngine;
use infiniscroll_protocol::{FrameToken, HostCommand, HostEvent, ItemMeasure, TimerKind, TimerToken};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, MouseEvent, Node,
    TouchEvent, Window,
};

use crate::markup::{CarouselConfig, Markup};

/// Set on containers that already have listeners attached.
const BOUND_ATTR: &str = "data-infiniscroll-bound";

type Shared = Rc<RefCell<Binding>>;

struct Binding {
    engine: CarouselEngine,
    window: Window,
    document: Document,
    track: HtmlElement,
    markup: Markup,
    /// Pending animation frame: engine token and browser handle.
    frame: Option<(FrameToken, i32)>,
    /// Pending timers by `TimerKind::slot`.
    timers: [Option<(TimerToken, i32)>; TimerKind::ALL.len()],
    callbacks: Option<Callbacks>,
}

/// One long-lived callback per frame/timer slot. The callback looks up the
/// pending token when it runs, so rescheduling never allocates and a
/// callback is never dropped while it is executing.
struct Callbacks {
    frame: Closure<dyn FnMut()>,
    timers: Vec<Closure<dyn FnMut()>>,
}

impl Callbacks {
    fn new(shared: &Shared) -> Self {
        let weak = Rc::downgrade(shared);
        let frame = Closure::<dyn FnMut()>::new(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let pending = shared.borrow_mut().frame.take();
            if let Some((token, _)) = pending {
                dispatch(&shared, HostEvent::Frame { token }, None);
            }
        });
        let timers = TimerKind::ALL
            .into_iter()
            .map(|kind| timer_callback(Rc::downgrade(shared), kind))
            .collect();
        Self { frame, timers }
    }
}

fn timer_callback(weak: Weak<RefCell<Binding>>, kind: TimerKind) -> Closure<dyn FnMut()> {
    Closure::<dyn FnMut()>::new(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let pending = shared.borrow_mut().timers[kind.slot()].take();
        if let Some((token, _)) = pending {
            dispatch(&shared, HostEvent::Timer { token }, None);
        }
    })
}

#[derive(Debug, Clone, Copy)]
enum PointerSource {
    Mouse,
    Touch,
}

/// Bind every container matching `config.markup.container`. Returns how
/// many carousels were activated.
pub fn bind_all(config: &CarouselConfig) -> Result<usize, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let containers = document.query_selector_all(&config.markup.container)?;

    let mut bound = 0;
    for i in 0..containers.length() {
        let Some(container) = containers
            .item(i)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        if bind(&window, &document, &container, config)? {
            bound += 1;
        }
    }
    Ok(bound)
}

/// Activate one container. Missing markup, an empty track or a wide
/// viewport leave the container untouched.
fn bind(
    window: &Window,
    document: &Document,
    container: &Element,
    config: &CarouselConfig,
) -> Result<bool, JsValue> {
    if container.has_attribute(BOUND_ATTR) {
        return Ok(false);
    }
    let Some(track) = container
        .query_selector(&config.markup.track)?
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(false);
    };

    let items = measure_items(&track, &config.markup)?;
    let viewport_width = viewport_width(window);
    let mut engine = CarouselEngine::new(config.engine.clone());
    let Ok(commands) = engine.attach(&items, viewport_width) else {
        return Ok(false);
    };

    let shared = Rc::new(RefCell::new(Binding {
        engine,
        window: window.clone(),
        document: document.clone(),
        track,
        markup: config.markup.clone(),
        frame: None,
        timers: [None; TimerKind::ALL.len()],
        callbacks: None,
    }));
    let callbacks = Callbacks::new(&shared);
    shared.borrow_mut().callbacks = Some(callbacks);

    execute(&shared, commands, None);
    listen_all(&shared)?;
    container.set_attribute(BOUND_ATTR, "")?;
    Ok(true)
}

fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|width| width.as_f64())
        .unwrap_or(0.0)
}

fn measure_items(track: &HtmlElement, markup: &Markup) -> Result<Vec<ItemMeasure>, JsValue> {
    let nodes = track.query_selector_all(&markup.item)?;
    let mut items = Vec::with_capacity(nodes.length() as usize);
    for i in 0..nodes.length() {
        let Some(element) = nodes
            .item(i)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        let width = f64::from(element.offset_width());
        items.push(if element.class_list().contains(&markup.duplicate_class) {
            ItemMeasure::duplicate(width)
        } else {
            ItemMeasure::original(width)
        });
    }
    Ok(items)
}

fn dispatch(shared: &Shared, event: HostEvent, source: Option<&Event>) {
    let commands = shared.borrow_mut().engine.handle(event);
    execute(shared, commands, source);
}

/// Run engine commands in order. `Measure` is answered inline, so its
/// follow-up commands run in the same pass.
fn execute(shared: &Shared, commands: Vec<HostCommand>, source: Option<&Event>) {
    let mut queue = VecDeque::from(commands);
    while let Some(command) = queue.pop_front() {
        let result = match command {
            HostCommand::Measure => {
                let item_width = shared.borrow().first_item_width();
                let more = shared
                    .borrow_mut()
                    .engine
                    .handle(HostEvent::Measured { item_width });
                queue.extend(more);
                Ok(())
            }
            HostCommand::SuppressDefault => {
                if let Some(event) = source {
                    event.prevent_default();
                }
                Ok(())
            }
            other => shared.borrow_mut().apply(other),
        };
        if let Err(err) = result {
            web_sys::console::warn_1(&err);
        }
    }
}

impl Binding {
    fn apply(&mut self, command: HostCommand) -> Result<(), JsValue> {
        match command {
            HostCommand::BuildTrack { leading, trailing } => self.build_track(&leading, &trailing),
            HostCommand::SetOffset { offset, behavior } => {
                self.track
                    .style()
                    .set_property("scroll-behavior", behavior.as_css())?;
                self.track.set_scroll_left(offset.round() as i32);
                Ok(())
            }
            HostCommand::RequestFrame { token } => {
                let callbacks = self.callbacks()?;
                let handle = self
                    .window
                    .request_animation_frame(callbacks.frame.as_ref().unchecked_ref())?;
                self.frame = Some((token, handle));
                Ok(())
            }
            HostCommand::CancelFrame { token } => {
                if let Some((pending, handle)) = self.frame
                    && pending == token
                {
                    self.window.cancel_animation_frame(handle)?;
                    self.frame = None;
                }
                Ok(())
            }
            HostCommand::ScheduleTimer {
                kind,
                token,
                delay_ms,
            } => {
                let slot = kind.slot();
                if let Some((_, stale)) = self.timers[slot].take() {
                    self.window.clear_timeout_with_handle(stale);
                }
                let callbacks = self.callbacks()?;
                let handle = self
                    .window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callbacks.timers[slot].as_ref().unchecked_ref(),
                        delay_ms.round() as i32,
                    )?;
                self.timers[slot] = Some((token, handle));
                Ok(())
            }
            HostCommand::CancelTimer { kind, token } => {
                let slot = kind.slot();
                if let Some((pending, handle)) = self.timers[slot]
                    && pending == token
                {
                    self.window.clear_timeout_with_handle(handle);
                    self.timers[slot] = None;
                }
                Ok(())
            }
            HostCommand::SuppressDefault | HostCommand::Measure => Ok(()),
        }
    }

    fn callbacks(&self) -> Result<&Callbacks, JsValue> {
        self.callbacks
            .as_ref()
            .ok_or_else(|| JsValue::from_str("carousel callbacks not installed"))
    }

    /// Purge copies from an earlier build, then insert fresh ones around the
    /// originals.
    fn build_track(&self, leading: &[usize], trailing: &[usize]) -> Result<(), JsValue> {
        let stale = self
            .track
            .query_selector_all(&self.markup.duplicate_selector())?;
        for i in 0..stale.length() {
            if let Some(element) = stale
                .item(i)
                .and_then(|node| node.dyn_into::<Element>().ok())
            {
                element.remove();
            }
        }

        let originals = self
            .track
            .query_selector_all(&self.markup.original_selector())?;
        let before = self.document.create_document_fragment();
        for &source in leading {
            if let Some(node) = originals.item(source as u32) {
                before.append_child(&self.duplicate(&node)?)?;
            }
        }
        let after = self.document.create_document_fragment();
        for &source in trailing {
            if let Some(node) = originals.item(source as u32) {
                after.append_child(&self.duplicate(&node)?)?;
            }
        }

        self.track
            .insert_before(&before, self.track.first_child().as_ref())?;
        self.track.append_child(&after)?;
        Ok(())
    }

    fn duplicate(&self, original: &Node) -> Result<Node, JsValue> {
        let copy = original.clone_node_with_deep(true)?;
        if let Some(element) = copy.dyn_ref::<Element>() {
            element.class_list().add_1(&self.markup.duplicate_class)?;
            element.set_attribute("aria-hidden", "true")?;
        }
        Ok(copy)
    }

    fn first_item_width(&self) -> f64 {
        self.track
            .query_selector(&self.markup.item)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .map_or(0.0, |element| f64::from(element.offset_width()))
    }

    /// Pointer position relative to the track's left edge.
    fn pointer_x(&self, event: &Event, source: PointerSource) -> Option<f64> {
        let page_x = match source {
            PointerSource::Mouse => event.dyn_ref::<MouseEvent>()?.page_x(),
            PointerSource::Touch => event.dyn_ref::<TouchEvent>()?.touches().get(0)?.page_x(),
        };
        Some(f64::from(page_x - self.track.offset_left()))
    }
}

fn listen(
    target: &EventTarget,
    name: &str,
    passive: Option<bool>,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    match passive {
        Some(passive) => {
            let options = AddEventListenerOptions::new();
            options.set_passive(passive);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
        }
        None => {
            target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        }
    }
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn on_pointer_down(shared: &Shared, source: PointerSource) -> impl FnMut(Event) + 'static {
    let shared = Rc::clone(shared);
    move |event: Event| {
        let x = shared.borrow().pointer_x(&event, source);
        if let Some(x) = x {
            let time_ms = js_sys::Date::now();
            dispatch(&shared, HostEvent::PointerDown { x, time_ms }, Some(&event));
        }
    }
}

fn on_pointer_move(shared: &Shared, source: PointerSource) -> impl FnMut(Event) + 'static {
    let shared = Rc::clone(shared);
    move |event: Event| {
        let x = shared.borrow().pointer_x(&event, source);
        if let Some(x) = x {
            let time_ms = js_sys::Date::now();
            dispatch(&shared, HostEvent::PointerMove { x, time_ms }, Some(&event));
        }
    }
}

fn on_pointer_end(shared: &Shared, leave: bool) -> impl FnMut(Event) + 'static {
    let shared = Rc::clone(shared);
    move |event: Event| {
        let host_event = if leave {
            HostEvent::PointerLeave
        } else {
            HostEvent::PointerUp
        };
        dispatch(&shared, host_event, Some(&event));
    }
}

fn listen_all(shared: &Shared) -> Result<(), JsValue> {
    let (track, window) = {
        let binding = shared.borrow();
        (binding.track.clone(), binding.window.clone())
    };
    let target: &EventTarget = track.as_ref();

    listen(target, "mousedown", None, on_pointer_down(shared, PointerSource::Mouse))?;
    listen(target, "mousemove", None, on_pointer_move(shared, PointerSource::Mouse))?;
    listen(target, "mouseup", None, on_pointer_end(shared, false))?;
    listen(target, "mouseleave", None, on_pointer_end(shared, true))?;

    // Non-passive so a drag can cancel page panning.
    listen(
        target,
        "touchstart",
        Some(false),
        on_pointer_down(shared, PointerSource::Touch),
    )?;
    listen(
        target,
        "touchmove",
        Some(false),
        on_pointer_move(shared, PointerSource::Touch),
    )?;
    listen(target, "touchend", None, on_pointer_end(shared, false))?;
    listen(target, "touchcancel", None, on_pointer_end(shared, true))?;

    listen(target, "dragstart", None, |event: Event| event.prevent_default())?;

    let scroll_shared = Rc::clone(shared);
    listen(target, "scroll", None, move |_event: Event| {
        let offset = f64::from(scroll_shared.borrow().track.scroll_left());
        dispatch(&scroll_shared, HostEvent::Scroll { offset }, None);
    })?;

    let resize_shared = Rc::clone(shared);
    let resize_window = window.clone();
    listen(window.as_ref(), "resize", None, move |_event: Event| {
        let viewport_width = viewport_width(&resize_window);
        dispatch(&resize_shared, HostEvent::Resize { viewport_width }, None);
    })?;

    Ok(())
}

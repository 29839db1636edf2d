//! Browser binding for the track-change watcher.
//!
//! The native host injects the generated JS glue into the player page and
//! calls [`attach`]. Notifications go to `window.googleMusicApp.notifySong`.

mod console;

use js_sys::{Array, Function, Object, Reflect};
use songwatch_core::dom::{Document, Node};
use songwatch_core::{
    AttachOutcome, MutationRecord, NotifyHost, SelectorTable, SongwatchError, TrackSnapshot,
    TrackWatcher,
};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Window property marking that a previous execution already attached.
const GUARD_PROPERTY: &str = "MusicAPI";
/// Window property holding the host's bridge object.
const BRIDGE_OBJECT: &str = "googleMusicApp";
const BRIDGE_METHOD: &str = "notifySong";

struct PageDocument(web_sys::Document);

struct PageNode(web_sys::Node);

impl Document for PageDocument {
    type Node = PageNode;

    fn query_selector(&self, selector: &str) -> Option<PageNode> {
        self.0
            .query_selector(selector)
            .ok()
            .flatten()
            .map(|el| PageNode(el.into()))
    }
}

impl Node for PageNode {
    fn id(&self) -> Option<String> {
        self.0.dyn_ref::<web_sys::Element>().map(|el| el.id())
    }

    fn class_name(&self) -> Option<String> {
        self.0.dyn_ref::<web_sys::Element>().map(|el| el.class_name())
    }

    fn text(&self) -> String {
        match self.0.dyn_ref::<web_sys::HtmlElement>() {
            Some(el) => el.inner_text(),
            None => self.0.text_content().unwrap_or_default(),
        }
    }

    fn src(&self) -> Option<String> {
        self.0
            .dyn_ref::<web_sys::HtmlImageElement>()
            .map(|img| img.src())
    }
}

/// Calls the host's `notifySong(title, artist, album, artUrl, duration)`.
struct BridgeHost;

impl NotifyHost for BridgeHost {
    fn notify_song(&mut self, track: &TrackSnapshot) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let bridge = match Reflect::get(&window, &BRIDGE_OBJECT.into()) {
            Ok(bridge) if !bridge.is_undefined() && !bridge.is_null() => bridge,
            _ => {
                warn!(title = %track.title, "Host bridge missing, dropping notification");
                return;
            }
        };
        let Some(method) = Reflect::get(&bridge, &BRIDGE_METHOD.into())
            .ok()
            .and_then(|m| m.dyn_into::<Function>().ok())
        else {
            warn!("Host bridge has no {BRIDGE_METHOD} function");
            return;
        };

        let args = Array::new();
        args.push(&JsValue::from_str(&track.title));
        args.push(&JsValue::from_str(&track.artist));
        args.push(&JsValue::from_str(&track.album));
        args.push(
            &track
                .art_url
                .as_deref()
                .map(JsValue::from_str)
                .unwrap_or(JsValue::NULL),
        );
        args.push(&JsValue::from_str(&track.duration));

        if let Err(e) = method.apply(&bridge, &args) {
            warn!("Host bridge call failed: {e:?}");
        }
    }
}

/// Attach with the built-in selector table.
///
/// Returns `true` when a new observer was registered and `false` when an
/// earlier execution in this page already attached one.
#[wasm_bindgen]
pub fn attach() -> Result<bool, JsValue> {
    attach_with(SelectorTable::embedded())
}

/// Attach with a complete selector table given as TOML.
#[wasm_bindgen]
pub fn attach_with_selectors(toml: &str) -> Result<bool, JsValue> {
    let selectors = SelectorTable::from_toml(toml).map_err(to_js)?;
    attach_with(selectors)
}

/// The built-in selector table as TOML.
#[wasm_bindgen]
pub fn default_selectors() -> String {
    SelectorTable::embedded_source().to_string()
}

fn attach_with(selectors: SelectorTable) -> Result<bool, JsValue> {
    console::init();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    if !Reflect::get(&window, &GUARD_PROPERTY.into())?.is_undefined() {
        return Ok(false);
    }

    let document = PageDocument(
        window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?,
    );
    let mut watcher = TrackWatcher::new(selectors, BridgeHost);
    let container = match watcher.attach(&document).map_err(to_js)? {
        AttachOutcome::Attached(container) => container,
        AttachOutcome::AlreadyAttached => return Ok(false),
    };

    // The callback owns the watcher and the document handle; batches are
    // delivered one at a time on the page's event loop.
    let callback = Closure::wrap(Box::new(move |records: Array, _: web_sys::MutationObserver| {
        let batch: Vec<MutationRecord<PageNode>> = records
            .iter()
            .filter_map(|r| r.dyn_into::<web_sys::MutationRecord>().ok())
            .map(|r| {
                let added = r.added_nodes();
                MutationRecord::new((0..added.length()).filter_map(|i| added.item(i)).map(PageNode).collect())
            })
            .collect();
        watcher.handle_batch(&document, &batch);
    }) as Box<dyn FnMut(Array, web_sys::MutationObserver)>);

    let observer = web_sys::MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let options = web_sys::MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&container.0, &options)?;

    // Lives as long as the page.
    callback.forget();
    Reflect::set(&window, &GUARD_PROPERTY.into(), &Object::new())?;
    Ok(true)
}

fn to_js(e: SongwatchError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wall_picker::{
    EventLog, ListStore, PickerConfig, PickerError, StoreError, Timer, WallEvent, WallPicker,
    WallRenderer,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn to_js(error: PickerError) -> JsValue {
    JsValue::from_str(&error.message())
}

/// Saved list slot backed by `window.localStorage`
struct LocalStorageStore;

fn local_storage() -> Result<web_sys::Storage, StoreError> {
    web_sys::window()
        .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?
        .local_storage()
        .map_err(|e| StoreError::Unavailable(describe(&e)))?
        .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".to_string()))
}

#[async_trait(?Send)]
impl ListStore for LocalStorageStore {
    async fn get(&self, slot: &str) -> Result<Option<String>, StoreError> {
        local_storage()?
            .get_item(slot)
            .map_err(|e| StoreError::Unavailable(describe(&e)))
    }

    async fn set(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        local_storage()?
            .set_item(slot, value)
            .map_err(|e| StoreError::Unavailable(describe(&e)))
    }
}

/// Timer built on `setTimeout` and `performance.now()`
struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| match web_sys::window() {
            Some(window) => {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
            }
            None => {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        let _ = JsFuture::from(promise).await;
    }

    fn now(&self) -> Duration {
        let ms = web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now);
        Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }
}

/// Forwards wall events to a JS callback as plain objects
struct JsRenderer(js_sys::Function);

impl WallRenderer for JsRenderer {
    fn render(&mut self, event: &WallEvent) {
        match serde_wasm_bindgen::to_value(event) {
            Ok(value) => {
                if let Err(e) = self.0.call1(&JsValue::NULL, &value) {
                    tracing::warn!(error = %describe(&e), "wall event callback failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not convert wall event"),
        }
    }
}

type SharedPicker = Rc<RefCell<WallPicker>>;
type NoticeListener = Rc<RefCell<Option<js_sys::Function>>>;

/// A name picker wall for the browser.
///
/// Commands take an `onEvent` callback that receives each wall event
/// (`{kind: "rendered", items, columns}`, `{kind: "highlight", step, index}`, ...).
/// Callbacks run once the picker is released, so they may call back into the
/// handle. Notices go to the listener set with `setNoticeListener`, which is called
/// with the notice object when it appears and with `null` when it expires.
#[wasm_bindgen]
pub struct WallPickerHandle {
    inner: SharedPicker,
    notice_listener: NoticeListener,
}

#[wasm_bindgen]
impl WallPickerHandle {
    /// Create a picker; `config` may be `undefined` or a partial config object.
    ///
    /// The saved list is loaded right after the calling script yields, with
    /// its wall events sent to `onEvent`. A notice listener set straight after
    /// construction still receives the load notice.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        on_event: Option<js_sys::Function>,
    ) -> Result<WallPickerHandle, String> {
        let config: PickerConfig = if config.is_undefined() || config.is_null() {
            PickerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| format!("{}", e))?
        };
        let handle = WallPickerHandle {
            inner: Rc::new(RefCell::new(WallPicker::new(config))),
            notice_listener: Rc::new(RefCell::new(None)),
        };

        let inner = Rc::clone(&handle.inner);
        let listener = Rc::clone(&handle.notice_listener);
        let on_event = on_event.unwrap_or_else(|| js_sys::Function::new_no_args(""));
        spawn_local(async move {
            if let Err(e) = load_saved(inner, listener, on_event).await {
                tracing::debug!(error = %describe(&e), "no list loaded at startup");
            }
        });
        Ok(handle)
    }

    #[wasm_bindgen(js_name = setNoticeListener)]
    pub fn set_notice_listener(&self, listener: Option<js_sys::Function>) {
        *self.notice_listener.borrow_mut() = listener;
    }

    /// Build the wall from `text`; returns `{count, columns, malformed}`
    pub fn generate(&self, text: &str, on_event: js_sys::Function) -> Result<JsValue, JsValue> {
        let mut log = EventLog::new();
        let result = self.inner.borrow_mut().generate(text, &mut log);
        log.replay(&mut JsRenderer(on_event));
        let generated = result.map_err(to_js)?;
        serde_wasm_bindgen::to_value(&generated).map_err(JsValue::from)
    }

    /// Use an uploaded file's text as the input and build the wall
    pub fn import(&self, file_text: &str, on_event: js_sys::Function) -> Result<JsValue, JsValue> {
        let mut log = EventLog::new();
        let result = self.inner.borrow_mut().import(file_text, &mut log);
        log.replay(&mut JsRenderer(on_event));
        let generated = result.map_err(to_js)?;
        serde_wasm_bindgen::to_value(&generated).map_err(JsValue::from)
    }

    /// Run the pick animation; resolves to `{index, item}`
    pub fn pick(&self, on_event: js_sys::Function) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let mut renderer = JsRenderer(on_event);

            // The pick guard keeps other commands out while the animation runs,
            // so the wall is not borrowed across the timer awaits
            let mut log = EventLog::new();
            let started = {
                let mut picker = inner.borrow_mut();
                picker
                    .begin_pick(&mut log)
                    .map(|_| (picker.items().to_vec(), picker.animator()))
            };
            log.replay(&mut renderer);
            let (items, animator) = started.map_err(to_js)?;

            let mut rng = StdRng::from_entropy();
            let outcome = animator
                .pick(&items, &mut rng, &mut renderer, &BrowserTimer)
                .await;

            let selection = inner.borrow_mut().finish_pick(outcome).map_err(to_js)?;
            serde_wasm_bindgen::to_value(&selection).map_err(JsValue::from)
        })
    }

    #[wasm_bindgen(js_name = removeSelected)]
    pub fn remove_selected(&self, on_event: js_sys::Function) -> Result<JsValue, JsValue> {
        let mut log = EventLog::new();
        let result = self.inner.borrow_mut().remove_selected(&mut log);
        log.replay(&mut JsRenderer(on_event));
        let removal = result.map_err(to_js)?;
        serde_wasm_bindgen::to_value(&removal).map_err(JsValue::from)
    }

    /// Save the input text to localStorage
    pub fn save(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let listener = Rc::clone(&self.notice_listener);
        future_to_promise(async move {
            // localStorage is synchronous, so this await never yields
            #[allow(clippy::await_holding_refcell_ref)]
            let result = {
                let mut picker = inner.borrow_mut();
                let saved = picker.save(&LocalStorageStore, &BrowserTimer).await;
                saved
            };
            publish_notice(&inner, &listener);
            result.map(|()| JsValue::TRUE).map_err(to_js)
        })
    }

    /// Load the saved list from localStorage and build the wall from it
    pub fn load(&self, on_event: js_sys::Function) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let listener = Rc::clone(&self.notice_listener);
        future_to_promise(load_saved(inner, listener, on_event))
    }

    /// The current items as `{file_name, contents}` for a download link
    pub fn export(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.borrow().export()).map_err(JsValue::from)
    }

    pub fn input(&self) -> String {
        self.inner.borrow().input().to_string()
    }

    /// The result line, e.g. `Selected: Alice`
    pub fn status(&self) -> Option<String> {
        self.inner.borrow().status().map(str::to_string)
    }

    pub fn count(&self) -> usize {
        self.inner.borrow().wall().current_count()
    }

    pub fn columns(&self) -> usize {
        self.inner.borrow().wall().columns()
    }

    pub fn selected(&self) -> Option<usize> {
        self.inner.borrow().wall().selected()
    }

    #[wasm_bindgen(js_name = isPicking)]
    pub fn is_picking(&self) -> bool {
        self.inner.borrow().wall().is_picking()
    }
}

/// Load the saved list, then forward its wall events and notice
async fn load_saved(
    inner: SharedPicker,
    listener: NoticeListener,
    on_event: js_sys::Function,
) -> Result<JsValue, JsValue> {
    let mut log = EventLog::new();
    // localStorage is synchronous, so this await never yields
    #[allow(clippy::await_holding_refcell_ref)]
    let result = {
        let mut picker = inner.borrow_mut();
        let loaded = picker.load(&LocalStorageStore, &mut log, &BrowserTimer).await;
        loaded
    };
    log.replay(&mut JsRenderer(on_event));
    publish_notice(&inner, &listener);
    let generated = result.map_err(to_js)?;
    serde_wasm_bindgen::to_value(&generated).map_err(JsValue::from)
}

/// Tell the listener about the current notice and schedule its expiry
fn publish_notice(inner: &SharedPicker, listener: &NoticeListener) {
    let (notice, ttl) = {
        let mut picker = inner.borrow_mut();
        let ttl = picker.config().notice_ttl_ms;
        match picker.notice(BrowserTimer.now()) {
            Some(notice) => (notice.clone(), ttl),
            None => return,
        }
    };

    let callback = listener.borrow().clone();
    if let Some(callback) = callback {
        if let Ok(value) = serde_wasm_bindgen::to_value(&notice) {
            let _ = callback.call1(&JsValue::NULL, &value);
        }
    }

    let inner = Rc::clone(inner);
    let listener = Rc::clone(listener);
    let hide = Closure::once_into_js(move || {
        // A newer notice keeps its own timer; only hide this one if still shown
        if inner.borrow_mut().dismiss_notice(notice.id) {
            let callback = listener.borrow().clone();
            if let Some(callback) = callback {
                let _ = callback.call1(&JsValue::NULL, &JsValue::NULL);
            }
        }
    });

    if let Some(window) = web_sys::window() {
        let ms = ttl.min(i32::MAX as u64) as i32;
        let _ = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(hide.unchecked_ref(), ms);
    }
}

/// Parse input text into wall items without building a wall
#[wasm_bindgen(js_name = parseItems)]
pub fn parse_items(text: &str) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(&wall_picker::parse_report(text)).map_err(|e| format!("{}", e))
}

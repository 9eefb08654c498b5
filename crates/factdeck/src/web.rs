//! Browser entry point: the same viewer, drawn into a canvas by eframe's web
//! runner, with facts fetched from the page's own origin.

use anyhow::{Result, anyhow};
use std::sync::mpsc::{self, Receiver};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::app::FactDeckApp;
use crate::deck::Deck;
use crate::facts;
use crate::theme::Theme;

const CANVAS_ID: &str = "factdeck_canvas";
const LOADING_ID: &str = "loading";
const FACTS_URL: &str = "facts.txt";

pub fn start() {
    console_error_panic_hook::set_once();
    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = run().await {
            web_sys::console::error_1(&format!("factdeck failed to start: {e:#}").into());
        }
    });
}

async fn run() -> Result<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow!("No document"))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow!("Missing #{CANVAS_ID}"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| anyhow!("#{CANVAS_ID} is not a canvas"))?;

    let facts = facts::facts_or_placeholder(FACTS_URL, fetch_text(FACTS_URL).await);
    let deck = Deck::new(facts);
    tracing::debug!(facts = deck.fact_count(), "deck ready");

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|_cc| {
                Ok(Box::new(FactDeckApp::new(
                    deck,
                    Theme::dark(),
                    Box::new(spawn_clipboard_write),
                )))
            }),
        )
        .await
        .map_err(js_error)?;

    if let Some(loading) = document.get_element_by_id(LOADING_ID) {
        loading.remove();
    }
    Ok(())
}

async fn fetch_text(url: &str) -> Result<String> {
    let window = web_sys::window().ok_or_else(|| anyhow!("No window"))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    if !response.ok() {
        anyhow::bail!("GET {url} returned {}", response.status());
    }
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    text.as_string()
        .ok_or_else(|| anyhow!("Response body from {url} is not text"))
}

fn spawn_clipboard_write(text: String) -> Receiver<Result<()>> {
    let (tx, rx) = mpsc::channel();
    wasm_bindgen_futures::spawn_local(async move {
        let _ = tx.send(write_clipboard(&text).await);
    });
    rx
}

/// `navigator.clipboard.writeText`, looked up dynamically since some
/// embedded webviews don't expose it.
async fn write_clipboard(text: &str) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("No window"))?;
    let clipboard = js_sys::Reflect::get(&window.navigator(), &"clipboard".into())
        .map_err(js_error)?;
    if clipboard.is_undefined() {
        anyhow::bail!("Clipboard API unavailable");
    }
    let write_text: js_sys::Function = js_sys::Reflect::get(&clipboard, &"writeText".into())
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    let promise: js_sys::Promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    JsFuture::from(promise).await.map_err(js_error)?;
    Ok(())
}

fn js_error(value: JsValue) -> anyhow::Error {
    anyhow!("{}", value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

use super::super::{Model, Msg};
use gloo_file::{Blob, ObjectUrl};
use gloo_timers::callback::Timeout;
use shared::CancelToken;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlAnchorElement;
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

/// Debounced button callback that sends `msg()` to the component.
pub fn debounced_send<F>(ctx: &Context<Model>, make_msg: F) -> Callback<MouseEvent>
where
    F: Fn() -> Msg + Clone + 'static,
{
    let link = ctx.link().clone();
    debounce(300, move || link.send_message(make_msg()))
}

/// Runs `future` and delivers its message, unless the view was torn down meanwhile.
pub fn send_future<F>(ctx: &Context<Model>, cancel: &CancelToken, future: F)
where
    F: Future<Output = Msg> + 'static,
{
    let link = ctx.link().clone();
    let cancel = cancel.clone();
    spawn_local(async move {
        let msg = future.await;
        if cancel.is_cancelled() {
            log::debug!("view gone, dropping result");
            return;
        }
        link.send_message(msg);
    });
}

pub fn download_text(file_name: &str, mime: &str, content: &str) -> Result<(), String> {
    let blob = Blob::new_with_options(content, Some(mime));
    let url = ObjectUrl::from(blob);

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "no document".to_string())?;
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("{:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("{:?}", e))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    // the object URL has to outlive the click
    Timeout::new(1_000, move || drop(url)).forget();
    Ok(())
}

pub fn render_error_message(message: Option<&str>) -> Html {
    if let Some(error_msg) = message {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

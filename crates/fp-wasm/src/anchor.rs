//! Async wait for a widget's drag surface.

use fp_core::EngineError;
use fp_editor::{AnchorPoll, PollStep};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// Resolve once `element` sits inside a connected parent, polling on the
/// budget carried by `poll`.
pub async fn wait_for_parent(
    element: &HtmlElement,
    mut poll: AnchorPoll,
) -> Result<HtmlElement, EngineError> {
    loop {
        let parent = element
            .parent_element()
            .filter(|p| p.is_connected())
            .and_then(|p| p.dyn_into::<HtmlElement>().ok());
        match poll.step(parent.is_some()) {
            PollStep::Found => {
                return parent.ok_or_else(|| EngineError::MissingContainer(element.id()));
            }
            PollStep::Retry { after_ms } => TimeoutFuture::new(after_ms).await,
            PollStep::TimedOut { waited_ms } => {
                log::warn!("no drag surface for #{} after {waited_ms} ms", element.id());
                return Err(poll.timeout_error(&element.id()));
            }
        }
    }
}

//! Document visibility listener.
//!
//! Fires a callback each time the tab becomes visible again. The listener is
//! removed when the returned [`VisibilityListener`] is dropped, so the owner
//! decides its lifetime (the auth provider parks it in a local `StoredValue`
//! that is disposed with the component).

#[cfg(feature = "hydrate")]
use wasm_bindgen::{JsCast, closure::Closure};

/// Registration handle for a `visibilitychange` listener.
pub struct VisibilityListener {
    #[cfg(feature = "hydrate")]
    document: web_sys::Document,
    #[cfg(feature = "hydrate")]
    closure: Closure<dyn FnMut()>,
}

impl VisibilityListener {
    /// Call `on_visible` whenever the document's visibility state turns to
    /// `visible`. Returns `None` when there is no document to listen on.
    pub fn install(on_visible: impl Fn() + 'static) -> Option<Self> {
        #[cfg(feature = "hydrate")]
        {
            let document = web_sys::window()?.document()?;
            let watched = document.clone();
            let closure = Closure::wrap(Box::new(move || {
                if watched.visibility_state() == web_sys::VisibilityState::Visible {
                    on_visible();
                }
            }) as Box<dyn FnMut()>);
            document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())
                .ok()?;
            Some(Self { document, closure })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = on_visible;
            None
        }
    }
}

impl Drop for VisibilityListener {
    fn drop(&mut self) {
        #[cfg(feature = "hydrate")]
        {
            let _ = self
                .document
                .remove_event_listener_with_callback("visibilitychange", self.closure.as_ref().unchecked_ref());
        }
    }
}

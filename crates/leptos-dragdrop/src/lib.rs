//! Leptos DragDrop Utilities
//!
//! Pointer-driven drag-and-drop for Leptos using mouse events. A press only
//! becomes a drag after the pointer travels more than
//! [`DRAG_THRESHOLD_PX`], so plain clicks still reach the element.
//!
//! Generic over the dragged key `K` and the drop target `T`. Targets
//! report hover through [`make_on_target_mousemove`]; the innermost target
//! wins because the handler stops propagation.

use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Pointer travel (in px) before a press turns into a drag
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// How long `just_ended` stays set so the trailing click can be ignored
const CLICK_SUPPRESS_MS: i32 = 100;

/// DnD state signals
pub struct DndSignals<K, T> {
    /// Key of the item being dragged, once past the threshold
    pub dragging: RwSignal<Option<K>>,
    /// Innermost target under the pointer while dragging
    pub hover: RwSignal<Option<T>>,
    /// Pressed but not yet moved far enough
    pub pending: RwSignal<Option<K>>,
    pub start: RwSignal<(i32, i32)>,
    /// Last pointer position, for the drag overlay
    pub pointer: RwSignal<(i32, i32)>,
    pub just_ended: RwSignal<bool>,
}

impl<K: 'static, T: 'static> Clone for DndSignals<K, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: 'static, T: 'static> Copy for DndSignals<K, T> {}

impl<K, T> DndSignals<K, T>
where
    K: Copy + PartialEq + Send + Sync + 'static,
    T: Copy + PartialEq + Send + Sync + 'static,
{
    pub fn is_dragging(&self, key: K) -> bool {
        self.dragging.get() == Some(key)
    }

    pub fn is_hovered(&self, target: T) -> bool {
        self.hover.get() == Some(target)
    }
}

pub fn create_dnd_signals<K, T>() -> DndSignals<K, T>
where
    K: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    DndSignals {
        dragging: RwSignal::new(None),
        hover: RwSignal::new(None),
        pending: RwSignal::new(None),
        start: RwSignal::new((0, 0)),
        pointer: RwSignal::new((0, 0)),
        just_ended: RwSignal::new(false),
    }
}

/// True once the pointer has moved strictly further than the threshold
pub fn exceeds_threshold(start: (i32, i32), now: (i32, i32)) -> bool {
    let dx = i64::from(now.0 - start.0);
    let dy = i64::from(now.1 - start.1);
    let limit = i64::from(DRAG_THRESHOLD_PX);
    dx * dx + dy * dy > limit * limit
}

/// Callbacks fired by the global listeners
pub struct DndCallbacks<K, T> {
    pub on_start: Box<dyn Fn(K)>,
    /// Target is `None` when released outside every target or cancelled
    pub on_end: Box<dyn Fn(K, Option<T>)>,
}

/// Clear all drag state; `just_ended` stays set briefly
pub fn end_drag<K, T>(dnd: &DndSignals<K, T>)
where
    K: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    dnd.dragging.set(None);
    dnd.hover.set(None);
    dnd.pending.set(None);
    dnd.just_ended.set(true);

    if let Some(win) = web_sys::window() {
        let flag = dnd.just_ended;
        let cb = Closure::<dyn FnMut()>::new(move || {
            let _ = flag.try_set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            CLICK_SUPPRESS_MS,
        );
        cb.forget();
    }
}

fn is_form_control(ev: &web_sys::MouseEvent) -> bool {
    ev.target().is_some_and(|target| {
        target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
            || target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
            || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
    })
}

/// Mousedown on a draggable item records a pending drag
pub fn make_on_mousedown<K, T>(dnd: DndSignals<K, T>, key: K) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    K: Copy + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 || is_form_control(&ev) {
            return;
        }
        let at = (ev.client_x(), ev.client_y());
        dnd.pending.set(Some(key));
        dnd.start.set(at);
        dnd.pointer.set(at);
    }
}

/// Mousemove on a drop target. Stops propagation so an inner target
/// (a task) shadows its container (the card).
pub fn make_on_target_mousemove<K, T>(dnd: DndSignals<K, T>, target: T) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    K: Send + Sync + 'static,
    T: Copy + PartialEq + Send + Sync + 'static,
{
    move |ev: web_sys::MouseEvent| {
        if dnd.dragging.with_untracked(Option::is_none) {
            return;
        }
        ev.stop_propagation();
        if dnd.hover.get_untracked() != Some(target) {
            dnd.hover.set(Some(target));
        }
    }
}

/// Mouseleave on a drop target clears the hover it set
pub fn make_on_target_mouseleave<K, T>(dnd: DndSignals<K, T>, target: T) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    K: Send + Sync + 'static,
    T: Copy + PartialEq + Send + Sync + 'static,
{
    move |_ev: web_sys::MouseEvent| {
        if dnd.hover.get_untracked() == Some(target) {
            dnd.hover.set(None);
        }
    }
}

/// Handles for the listeners installed by [`bind_global_listeners`]
pub struct GlobalListeners {
    handles: Vec<WindowListenerHandle>,
}

impl GlobalListeners {
    /// Detach every listener; call from `on_cleanup`
    pub fn remove(self) {
        for handle in self.handles {
            handle.remove();
        }
    }
}

/// Bind window-level mousemove, mouseup and Escape handling.
///
/// Detach the returned handles when the owning component unmounts;
/// until then a listener whose signals were disposed stays inert.
pub fn bind_global_listeners<K, T>(dnd: DndSignals<K, T>, callbacks: DndCallbacks<K, T>) -> GlobalListeners
where
    K: Copy + PartialEq + Send + Sync + 'static,
    T: Copy + PartialEq + Send + Sync + 'static,
{
    let callbacks = std::rc::Rc::new(callbacks);

    let on_start = callbacks.clone();
    let on_mousemove = window_event_listener(ev::mousemove, move |ev| {
        let Some(pending) = dnd.pending.try_get_untracked().flatten() else {
            return;
        };
        let at = (ev.client_x(), ev.client_y());
        dnd.pointer.set(at);
        if dnd.dragging.get_untracked().is_none() && exceeds_threshold(dnd.start.get_untracked(), at) {
            dnd.dragging.set(Some(pending));
            (on_start.on_start)(pending);
        }
    });

    let on_end = callbacks.clone();
    let on_mouseup = window_event_listener(ev::mouseup, move |_| {
        let Some(dragging) = dnd.dragging.try_get_untracked() else {
            return;
        };
        let Some(key) = dragging else {
            // plain click; let it through
            dnd.pending.set(None);
            return;
        };
        let target = dnd.hover.get_untracked();
        end_drag(&dnd);
        (on_end.on_end)(key, target);
    });

    let on_cancel = callbacks;
    let on_keydown = window_event_listener(ev::keydown, move |ev| {
        if ev.key() != "Escape" {
            return;
        }
        let Some(Some(key)) = dnd.dragging.try_get_untracked() else {
            return;
        };
        end_drag(&dnd);
        (on_cancel.on_end)(key, None);
    });

    GlobalListeners {
        handles: vec![on_mousemove, on_mouseup, on_keydown],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        assert!(!exceeds_threshold((0, 0), (0, 0)));
        assert!(!exceeds_threshold((10, 10), (15, 10)));
        assert!(!exceeds_threshold((0, 0), (3, 4)));
        assert!(exceeds_threshold((0, 0), (4, 4)));
        assert!(exceeds_threshold((10, 10), (10, 3)));
    }
}

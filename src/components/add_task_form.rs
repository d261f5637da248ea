//! Add Task Form Component

use leptos::prelude::*;

use board_engine::CardId;

use crate::components::use_board_actions;

/// Footer form of a card column. Disabled while the card has no server id.
#[component]
pub fn AddTaskForm(card_id: CardId, #[prop(into)] disabled: Signal<bool>) -> impl IntoView {
    let actions = use_board_actions();
    let (open, set_open) = signal(false);
    let (new_name, set_new_name) = signal(String::new());

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get();
        if actions.add_task(card_id, &name) {
            set_new_name.set(String::new());
        }
    };

    view! {
        <Show
            when=move || open.get() && !disabled.get()
            fallback=move || view! {
                <button
                    class="add-task-btn"
                    disabled=move || disabled.get()
                    on:click=move |_| set_open.set(true)
                >
                    "+ Add a task"
                </button>
            }
        >
            <form class="new-item-form add-task-form" on:submit=create_task>
                <input
                    type="text"
                    placeholder="Task name..."
                    autofocus=true
                    prop:value=move || new_name.get()
                    on:input=move |ev| set_new_name.set(event_target_value(&ev))
                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                        if ev.key() == "Escape" {
                            set_new_name.set(String::new());
                            set_open.set(false);
                        }
                    }
                />
                <div class="new-item-row">
                    <button type="submit" disabled=move || new_name.with(|n| n.trim().is_empty())>
                        "Add"
                    </button>
                    <button type="button" class="cancel-btn" on:click=move |_| set_open.set(false)>
                        "Cancel"
                    </button>
                </div>
            </form>
        </Show>
    }
}

//! Add Card Form Component
//!
//! Trailing column on the board for creating a new card.

use leptos::prelude::*;

use crate::components::use_board_actions;

#[component]
pub fn AddCardForm() -> impl IntoView {
    let actions = use_board_actions();
    let (open, set_open) = signal(false);
    let (new_name, set_new_name) = signal(String::new());

    let create_card = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get();
        if actions.add_card(&name) {
            set_new_name.set(String::new());
            set_open.set(false);
        }
    };

    view! {
        <div class="add-card-column">
            <Show
                when=move || open.get()
                fallback=move || view! {
                    <button class="add-card-btn" on:click=move |_| set_open.set(true)>
                        "+ Add another card"
                    </button>
                }
            >
                <form class="new-item-form" on:submit=create_card>
                    <input
                        type="text"
                        placeholder="Card name..."
                        autofocus=true
                        prop:value=move || new_name.get()
                        on:input=move |ev| set_new_name.set(event_target_value(&ev))
                        on:keydown=move |ev: web_sys::KeyboardEvent| {
                            if ev.key() == "Escape" {
                                set_open.set(false);
                            }
                        }
                    />
                    <div class="new-item-row">
                        <button type="submit" disabled=move || new_name.with(|n| n.trim().is_empty())>
                            "Add card"
                        </button>
                        <button type="button" class="cancel-btn" on:click=move |_| set_open.set(false)>
                            "Cancel"
                        </button>
                    </div>
                </form>
            </Show>
        </div>
    }
}

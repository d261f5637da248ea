//! Card Column Component
//!
//! One card on the board. The column body is a drop target that appends
//! the dragged task to this card.

use leptos::prelude::*;

use board_engine::{CardId, DropTarget};
use leptos_dragdrop::{make_on_target_mouseleave, make_on_target_mousemove};

use crate::components::{use_board_actions, AddTaskForm, DeleteConfirmButton, TaskItem};

#[component]
pub fn CardColumn(card_id: CardId) -> impl IntoView {
    let actions = use_board_actions();
    let dnd = actions.dnd;
    let target = DropTarget::Card(card_id);

    let card = Memo::new(move |_| actions.controller.with(|c| c.board().card(card_id).cloned()));
    let is_temporary = Signal::derive(move || card.with(|c| c.as_ref().map_or(true, |c| c.is_temporary)));
    let task_ids = move || {
        card.with(|c| {
            c.as_ref()
                .map(|c| c.tasks.iter().map(|t| t.id).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };
    let is_empty = move || card.with(|c| c.as_ref().map_or(true, |c| c.tasks.is_empty()));

    let column_class = move || {
        let color = card.with(|c| c.as_ref().map(|c| c.color.clone()).unwrap_or_default());
        let mut class = format!("card-column {}", color);
        if dnd.is_hovered(target) {
            class.push_str(" drop-target");
        }
        if is_temporary.get() {
            class.push_str(" saving");
        }
        class
    };

    view! {
        <div
            class=column_class
            on:mousemove=make_on_target_mousemove(dnd, target)
            on:mouseleave=make_on_target_mouseleave(dnd, target)
        >
            <div class="card-header">
                <span class="card-name">{move || card.with(|c| c.as_ref().map(|c| c.name.clone()).unwrap_or_default())}</span>
                <span class="card-count">{move || card.with(|c| c.as_ref().map_or(0, |c| c.tasks.len()))}</span>
                <DeleteConfirmButton
                    button_class="delete-btn"
                    label="Delete card?"
                    disabled=is_temporary
                    on_confirm=Callback::new(move |_| {
                        actions.delete_card(card_id);
                    })
                />
            </div>

            <div class="card-tasks">
                <For
                    each=task_ids
                    key=|id| *id
                    children=move |task_id| view! { <TaskItem task_id=task_id /> }
                />
                <Show when=is_empty>
                    <div class="card-empty">"Drop tasks here"</div>
                </Show>
            </div>

            <AddTaskForm card_id=card_id disabled=is_temporary />
        </div>
    }
}

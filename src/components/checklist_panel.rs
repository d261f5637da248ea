//! Checklist Panel Component
//!
//! Checklists of the open task with progress bars, inline editing and
//! per-item completion toggles.

use leptos::prelude::*;

use board_engine::entity::is_temporary_id;
use board_engine::model::{Checklist, ChecklistItem};
use board_engine::{BusyKey, ChecklistId, ChecklistItemId, Refused};

use crate::components::DeleteConfirmButton;

/// What the panel asks the modal to do
#[derive(Debug, Clone, PartialEq)]
pub enum ChecklistIntent {
    Create(String),
    Rename(ChecklistId, String),
    Delete(ChecklistId),
    AddItem(ChecklistId, String),
    RenameItem(ChecklistId, ChecklistItemId, String),
    ToggleItem(ChecklistId, ChecklistItemId),
    RemoveItem(ChecklistId, ChecklistItemId),
}

#[component]
pub fn ChecklistPanel(
    #[prop(into)] checklists: Signal<Vec<Checklist>>,
    #[prop(into)] is_busy: Callback<BusyKey, bool>,
    #[prop(into)] on_intent: Callback<ChecklistIntent, Result<(), Refused>>,
) -> impl IntoView {
    let (new_title, set_new_title) = signal(String::new());
    let (hint, set_hint) = signal(None::<&'static str>);

    let create = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match on_intent.run(ChecklistIntent::Create(new_title.get())) {
            Ok(()) => {
                set_new_title.set(String::new());
                set_hint.set(None);
            }
            Err(refused) => set_hint.set(refused.message()),
        }
    };

    view! {
        <section class="detail-section checklist-panel">
            <h3>"Checklists"</h3>
            <For
                each=move || checklists.with(|cs| cs.iter().map(|c| c.id).collect::<Vec<_>>())
                key=|id| *id
                children=move |checklist_id| view! {
                    <ChecklistBlock
                        checklist_id=checklist_id
                        checklists=checklists
                        is_busy=is_busy
                        on_intent=on_intent
                    />
                }
            />
            <form class="new-item-form" on:submit=create>
                <input
                    type="text"
                    placeholder="New checklist title..."
                    prop:value=move || new_title.get()
                    on:input=move |ev| set_new_title.set(event_target_value(&ev))
                />
                <button type="submit">"Add checklist"</button>
            </form>
            {move || hint.get().map(|h| view! { <span class="form-hint">{h}</span> })}
        </section>
    }
}

#[component]
fn ChecklistBlock(
    checklist_id: ChecklistId,
    checklists: Signal<Vec<Checklist>>,
    is_busy: Callback<BusyKey, bool>,
    on_intent: Callback<ChecklistIntent, Result<(), Refused>>,
) -> impl IntoView {
    let saving = is_temporary_id(checklist_id);
    let checklist = Memo::new(move |_| {
        checklists.with(|cs| cs.iter().find(|c| c.id == checklist_id).cloned())
    });
    let items = Signal::derive(move || checklist.with(|c| c.as_ref().map(|c| c.items.clone()).unwrap_or_default()));
    let title = move || checklist.with(|c| c.as_ref().map(|c| c.title.clone()).unwrap_or_default());
    let busy = move || saving || is_busy.run(BusyKey::Checklist(checklist_id));

    let (editing, set_editing) = signal(false);
    let (title_draft, set_title_draft) = signal(String::new());
    let (new_item, set_new_item) = signal(String::new());

    let save_title = move || {
        if on_intent.run(ChecklistIntent::Rename(checklist_id, title_draft.get())).is_ok() {
            set_editing.set(false);
        }
    };
    let add_item = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if on_intent.run(ChecklistIntent::AddItem(checklist_id, new_item.get())).is_ok() {
            set_new_item.set(String::new());
        }
    };

    view! {
        <div class={if saving { "checklist saving" } else { "checklist" }}>
            <div class="checklist-header">
                <Show
                    when=move || editing.get()
                    fallback=move || view! {
                        <span
                            class="checklist-title"
                            on:click=move |_| {
                                if !saving {
                                    set_title_draft.set(title());
                                    set_editing.set(true);
                                }
                            }
                        >
                            {title}
                        </span>
                    }
                >
                    <input
                        type="text"
                        class="inline-edit"
                        prop:value=move || title_draft.get()
                        on:input=move |ev| set_title_draft.set(event_target_value(&ev))
                        on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                            "Enter" => save_title(),
                            "Escape" => {
                                ev.stop_propagation();
                                set_editing.set(false);
                            }
                            _ => {}
                        }
                        on:blur=move |_| set_editing.set(false)
                    />
                </Show>
                <span class="checklist-progress-text">
                    {move || checklist.with(|c| {
                        let (done, total) = c.as_ref().map_or((0, 0), Checklist::progress);
                        format!("{}/{}", done, total)
                    })}
                </span>
                <DeleteConfirmButton
                    button_class="delete-btn"
                    label="Delete checklist?"
                    disabled=Signal::derive(busy)
                    on_confirm=Callback::new(move |_| {
                        let _ = on_intent.run(ChecklistIntent::Delete(checklist_id));
                    })
                />
            </div>

            <div class="progress-bar">
                <div
                    class="progress-fill"
                    style=move || {
                        let percent = checklist.with(|c| c.as_ref().map_or(0, Checklist::percent_complete));
                        format!("width: {}%", percent)
                    }
                ></div>
            </div>

            <ul class="checklist-items">
                <For
                    each=move || items.with(|items| items.iter().map(|i| i.id).collect::<Vec<_>>())
                    key=|id| *id
                    children=move |item_id| view! {
                        <ChecklistItemRow
                            checklist_id=checklist_id
                            item_id=item_id
                            items=items
                            is_busy=is_busy
                            on_intent=on_intent
                        />
                    }
                />
            </ul>

            <form class="new-item-form" on:submit=add_item>
                <input
                    type="text"
                    placeholder="Add an item..."
                    disabled=busy
                    prop:value=move || new_item.get()
                    on:input=move |ev| set_new_item.set(event_target_value(&ev))
                />
                <button type="submit" disabled=busy>"Add"</button>
            </form>
        </div>
    }
}

#[component]
fn ChecklistItemRow(
    checklist_id: ChecklistId,
    item_id: ChecklistItemId,
    items: Signal<Vec<ChecklistItem>>,
    is_busy: Callback<BusyKey, bool>,
    on_intent: Callback<ChecklistIntent, Result<(), Refused>>,
) -> impl IntoView {
    let saving = is_temporary_id(item_id);
    let item = Memo::new(move |_| items.with(|items| items.iter().find(|i| i.id == item_id).cloned()));
    let completed = move || item.with(|i| i.as_ref().is_some_and(|i| i.completed));
    let content = move || item.with(|i| i.as_ref().map(|i| i.content.clone()).unwrap_or_default());
    let busy = move || saving || is_busy.run(BusyKey::Item(checklist_id, item_id));

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());

    let save = move || {
        if on_intent.run(ChecklistIntent::RenameItem(checklist_id, item_id, draft.get())).is_ok() {
            set_editing.set(false);
        }
    };

    view! {
        <li class=move || if busy() { "checklist-item busy" } else { "checklist-item" }>
            <input
                type="checkbox"
                prop:checked=completed
                disabled=busy
                on:change=move |_| {
                    let _ = on_intent.run(ChecklistIntent::ToggleItem(checklist_id, item_id));
                }
            />
            <Show
                when=move || editing.get()
                fallback=move || view! {
                    <span
                        class=move || if completed() { "item-content completed" } else { "item-content" }
                        on:click=move |_| {
                            if !saving {
                                set_draft.set(content());
                                set_editing.set(true);
                            }
                        }
                    >
                        {content}
                    </span>
                }
            >
                <input
                    type="text"
                    class="inline-edit"
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                    on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                        "Enter" => save(),
                        "Escape" => {
                            ev.stop_propagation();
                            set_editing.set(false);
                        }
                        _ => {}
                    }
                    on:blur=move |_| set_editing.set(false)
                />
            </Show>
            <DeleteConfirmButton
                button_class="delete-btn small"
                disabled=Signal::derive(busy)
                on_confirm=Callback::new(move |_| {
                    let _ = on_intent.run(ChecklistIntent::RemoveItem(checklist_id, item_id));
                })
            />
        </li>
    }
}

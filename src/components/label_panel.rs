//! Label Panel Component
//!
//! Chips for the task's labels plus a picker over the label catalog.
//! The picker edits a local selection that is saved in one call.

use leptos::prelude::*;

use board_engine::model::Label;
use board_engine::{LabelId, Refused};

#[derive(Debug, Clone, PartialEq)]
pub enum LabelIntent {
    Assign(Vec<LabelId>),
    Remove(LabelId),
}

#[component]
pub fn LabelPanel(
    #[prop(into)] assigned: Signal<Vec<Label>>,
    #[prop(into)] catalog: Signal<Vec<Label>>,
    #[prop(into)] busy: Signal<bool>,
    #[prop(into)] on_intent: Callback<LabelIntent, Result<(), Refused>>,
) -> impl IntoView {
    let (picking, set_picking) = signal(false);
    let (selection, set_selection) = signal(Vec::<LabelId>::new());

    let open_picker = move |_| {
        set_selection.set(assigned.with(|ls| ls.iter().map(|l| l.id).collect()));
        set_picking.set(true);
    };
    let save = move |_| match on_intent.run(LabelIntent::Assign(selection.get())) {
        Ok(()) | Err(Refused::Unchanged) => set_picking.set(false),
        Err(_) => {}
    };

    view! {
        <section class="detail-section label-panel">
            <h3>"Labels"</h3>
            <div class="label-chips">
                {move || assigned.get().into_iter().map(|label| {
                    let label_id = label.id;
                    view! {
                        <span class="label-chip" style={format!("background-color: {}", label.color)}>
                            {label.tag_value}
                            <button
                                class="chip-remove"
                                title="Remove label"
                                disabled=move || busy.get()
                                on:click=move |_| {
                                    let _ = on_intent.run(LabelIntent::Remove(label_id));
                                }
                            >
                                "×"
                            </button>
                        </span>
                    }
                }).collect_view()}
                <button class="link-btn" disabled=move || busy.get() on:click=open_picker>"Edit labels"</button>
            </div>

            <Show when=move || picking.get()>
                <div class="label-picker">
                    <Show
                        when=move || !catalog.with(Vec::is_empty)
                        fallback=|| view! { <span class="form-hint">"No labels defined"</span> }
                    >
                        {move || catalog.get().into_iter().map(|label| {
                            let label_id = label.id;
                            let checked = move || selection.with(|s| s.contains(&label_id));
                            view! {
                                <label class="label-option">
                                    <input
                                        type="checkbox"
                                        prop:checked=checked
                                        on:change=move |_| {
                                            set_selection.update(|s| {
                                                if let Some(pos) = s.iter().position(|id| *id == label_id) {
                                                    s.remove(pos);
                                                } else {
                                                    s.push(label_id);
                                                }
                                            });
                                        }
                                    />
                                    <span class="label-chip" style={format!("background-color: {}", label.color)}>
                                        {label.tag_value}
                                    </span>
                                    {label.category.map(|c| view! { <span class="label-category">{c}</span> })}
                                </label>
                            }
                        }).collect_view()}
                    </Show>
                    <div class="new-item-row">
                        <button disabled=move || busy.get() on:click=save>"Save"</button>
                        <button class="cancel-btn" on:click=move |_| set_picking.set(false)>"Cancel"</button>
                    </div>
                </div>
            </Show>
        </section>
    }
}

//! Comment Panel Component

use leptos::prelude::*;

use board_engine::entity::is_temporary_id;
use board_engine::model::Comment;
use board_engine::{BusyKey, CommentId, Refused};

use crate::components::DeleteConfirmButton;

#[derive(Debug, Clone, PartialEq)]
pub enum CommentIntent {
    Add(String),
    Edit(CommentId, String),
    Delete(CommentId),
}

/// Comments of the open task, oldest first, with an add box at the bottom
#[component]
pub fn CommentPanel(
    #[prop(into)] comments: Signal<Vec<Comment>>,
    #[prop(into)] is_busy: Callback<BusyKey, bool>,
    #[prop(into)] on_intent: Callback<CommentIntent, Result<(), Refused>>,
) -> impl IntoView {
    let (draft, set_draft) = signal(String::new());
    let (hint, set_hint) = signal(None::<&'static str>);

    let post = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match on_intent.run(CommentIntent::Add(draft.get())) {
            Ok(()) => {
                set_draft.set(String::new());
                set_hint.set(None);
            }
            Err(refused) => set_hint.set(refused.message()),
        }
    };

    view! {
        <section class="detail-section comment-panel">
            <h3>{move || format!("Comments ({})", comments.with(Vec::len))}</h3>
            <ul class="comment-list">
                <For
                    each=move || comments.with(|cs| cs.iter().map(|c| c.id).collect::<Vec<_>>())
                    key=|id| *id
                    children=move |comment_id| view! {
                        <CommentRow comment_id=comment_id comments=comments is_busy=is_busy on_intent=on_intent />
                    }
                />
            </ul>
            <form class="comment-form" on:submit=post>
                <textarea
                    placeholder="Write a comment..."
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                ></textarea>
                <button type="submit" disabled=move || draft.with(|d| d.trim().is_empty())>"Post"</button>
            </form>
            {move || hint.get().map(|h| view! { <span class="form-hint">{h}</span> })}
        </section>
    }
}

#[component]
fn CommentRow(
    comment_id: CommentId,
    comments: Signal<Vec<Comment>>,
    is_busy: Callback<BusyKey, bool>,
    on_intent: Callback<CommentIntent, Result<(), Refused>>,
) -> impl IntoView {
    let saving = is_temporary_id(comment_id);
    let comment = Memo::new(move |_| comments.with(|cs| cs.iter().find(|c| c.id == comment_id).cloned()));
    let content = move || comment.with(|c| c.as_ref().map(|c| c.content.clone()).unwrap_or_default());
    let posted_at = move || {
        comment.with(|c| {
            c.as_ref()
                .and_then(|c| c.created_at)
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "just now".to_string())
        })
    };
    let busy = move || saving || is_busy.run(BusyKey::Comment(comment_id));

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());

    let save = move |_| {
        if on_intent.run(CommentIntent::Edit(comment_id, draft.get())).is_ok() {
            set_editing.set(false);
        }
    };

    view! {
        <li class=move || if busy() { "comment busy" } else { "comment" }>
            <div class="comment-meta">
                <span class="comment-time">{posted_at}</span>
                <Show when=move || !editing.get()>
                    <button
                        class="link-btn"
                        disabled=busy
                        on:click=move |_| {
                            set_draft.set(content());
                            set_editing.set(true);
                        }
                    >
                        "Edit"
                    </button>
                    <DeleteConfirmButton
                        button_class="delete-btn small"
                        label="Delete comment?"
                        disabled=Signal::derive(busy)
                        on_confirm=Callback::new(move |_| {
                            let _ = on_intent.run(CommentIntent::Delete(comment_id));
                        })
                    />
                </Show>
            </div>
            <Show
                when=move || editing.get()
                fallback=move || view! { <p class="comment-content">{content}</p> }
            >
                <textarea
                    class="inline-edit"
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                        if ev.key() == "Escape" {
                            ev.stop_propagation();
                            set_editing.set(false);
                        }
                    }
                ></textarea>
                <div class="new-item-row">
                    <button on:click=save>"Save"</button>
                    <button class="cancel-btn" on:click=move |_| set_editing.set(false)>"Cancel"</button>
                </div>
            </Show>
        </li>
    }
}

//! Task Modal Component
//!
//! Detail view for one task. Holds its own `TaskDetail` and hands the
//! section panels data signals plus a callback for each kind of change.

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

use board_engine::{
    execute_detail, load_task_detail, BusyKey, DetailCommit, Refused, TaskApi, TaskDetail, TaskId,
};

use crate::components::{
    use_board_actions, BoardActions, ChecklistIntent, ChecklistPanel, CommentIntent, CommentPanel,
    DeleteConfirmButton, LabelIntent, LabelPanel,
};
use crate::context::{use_app_context, AppContext};

#[derive(Clone, Copy)]
struct DetailActions {
    task_id: TaskId,
    detail: RwSignal<Option<TaskDetail>>,
    board: BoardActions,
    ctx: AppContext,
}

impl DetailActions {
    /// Apply locally, then send. Refusals come back to the caller untouched.
    fn run(&self, begin: impl FnOnce(&mut TaskDetail) -> Result<DetailCommit, Refused>) -> Result<(), Refused> {
        let commit = self
            .detail
            .try_update(|d| d.as_mut().map(begin))
            .flatten()
            .unwrap_or(Err(Refused::Missing))?;
        let this = *self;
        spawn_local(async move {
            let result = execute_detail(&this.ctx.api(), this.task_id, &commit.op).await;
            let settled = this
                .detail
                .try_update(|d| d.as_mut().map(|d| d.settle(commit, result)))
                .flatten();
            let Some(settlement) = settled else {
                return;
            };
            if settlement.refetch {
                this.reload();
            }
            if settlement.board_stale {
                this.board.refetch();
            }
        });
        Ok(())
    }

    fn reload(&self) {
        let Some(ticket) = self.detail.with_untracked(|d| d.as_ref().map(TaskDetail::refetch_ticket)) else {
            return;
        };
        let this = *self;
        spawn_local(async move {
            match load_task_detail(&this.ctx.api(), this.task_id).await {
                Ok(state) => {
                    let _ = this.detail.try_update(|d| {
                        if let Some(d) = d {
                            d.reconcile(ticket, state);
                        }
                    });
                }
                Err(err) => log::warn!("[DETAIL] Reloading task {} failed: {}", this.task_id, err),
            }
        });
    }

    fn checklist(&self, intent: ChecklistIntent) -> Result<(), Refused> {
        self.run(move |d| match intent {
            ChecklistIntent::Create(title) => d.begin_create_checklist(&title),
            ChecklistIntent::Rename(id, title) => d.begin_rename_checklist(id, &title),
            ChecklistIntent::Delete(id) => d.begin_delete_checklist(id),
            ChecklistIntent::AddItem(id, content) => d.begin_add_item(id, &content),
            ChecklistIntent::RenameItem(id, item, content) => d.begin_rename_item(id, item, &content),
            ChecklistIntent::ToggleItem(id, item) => d.begin_toggle_item(id, item),
            ChecklistIntent::RemoveItem(id, item) => d.begin_remove_item(id, item),
        })
    }

    fn comment(&self, intent: CommentIntent) -> Result<(), Refused> {
        self.run(move |d| match intent {
            CommentIntent::Add(content) => d.begin_add_comment(&content),
            CommentIntent::Edit(id, content) => d.begin_edit_comment(id, &content),
            CommentIntent::Delete(id) => d.begin_delete_comment(id),
        })
    }

    fn label(&self, intent: LabelIntent) -> Result<(), Refused> {
        self.run(move |d| match intent {
            LabelIntent::Assign(ids) => d.begin_assign_labels(&ids),
            LabelIntent::Remove(id) => d.begin_remove_label(id),
        })
    }
}

#[component]
pub fn TaskModal(task_id: TaskId, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let ctx = use_app_context();
    let board = use_board_actions();
    let detail = RwSignal::new(None::<TaskDetail>);
    let (load_error, set_load_error) = signal(None::<String>);
    let actions = DetailActions { task_id, detail, board, ctx };

    spawn_local(async move {
        let api = ctx.api();
        match load_task_detail(&api, task_id).await {
            Ok(state) => {
                let _ = detail.try_set(Some(TaskDetail::new(state)));
            }
            Err(err) => {
                log::error!("[DETAIL] Loading task {} failed: {}", task_id, err);
                let _ = set_load_error.try_set(Some(err.user_message("Failed to load task details")));
                return;
            }
        }
        match api.all_labels().await {
            Ok(labels) => {
                let _ = detail.try_update(|d| {
                    if let Some(d) = d {
                        d.set_available_labels(labels);
                    }
                });
            }
            Err(err) => log::warn!("[DETAIL] Loading labels failed: {}", err),
        }
    });

    let handle = window_event_listener(ev::keydown, move |ev| {
        if ev.key() == "Escape" {
            on_close.run(());
        }
    });
    on_cleanup(move || handle.remove());

    // Board copy of the task carries the live name
    let task_name = move || {
        board
            .controller
            .with(|c| c.board().task(task_id).map(|t| t.name.clone()))
            .or_else(|| detail.with(|d| d.as_ref().map(|d| d.state().task.name.clone())))
            .unwrap_or_default()
    };
    let card_name = move || {
        board.controller.with(|c| {
            c.board()
                .locate(task_id)
                .and_then(|located| c.board().card(located.card_id))
                .map(|card| card.name.clone())
        })
    };

    let is_busy = Callback::new(move |key: BusyKey| detail.with(|d| d.as_ref().is_some_and(|d| d.is_busy(key))));
    let checklists = Signal::derive(move || {
        detail.with(|d| d.as_ref().map(|d| d.state().checklists.clone()).unwrap_or_default())
    });
    let comments = Signal::derive(move || {
        detail.with(|d| d.as_ref().map(|d| d.state().comments.clone()).unwrap_or_default())
    });
    let assigned = Signal::derive(move || {
        detail.with(|d| d.as_ref().map(|d| d.state().task.labels.clone()).unwrap_or_default())
    });
    let catalog = Signal::derive(move || {
        detail.with(|d| d.as_ref().map(|d| d.available_labels().to_vec()).unwrap_or_default())
    });
    let description = Signal::derive(move || {
        detail.with(|d| d.as_ref().and_then(|d| d.state().description().map(str::to_string)))
    });

    let (editing_title, set_editing_title) = signal(false);
    let (title_draft, set_title_draft) = signal(String::new());
    let save_title = move || {
        board.rename_task(task_id, &title_draft.get());
        set_editing_title.set(false);
    };

    view! {
        <div class="modal-backdrop" on:click=move |_| on_close.run(())>
            <div class="task-modal" on:click=|ev| ev.stop_propagation()>
                <header class="modal-header">
                    <Show
                        when=move || editing_title.get()
                        fallback=move || view! {
                            <h2
                                class="task-title"
                                on:click=move |_| {
                                    set_title_draft.set(task_name());
                                    set_editing_title.set(true);
                                }
                            >
                                {task_name}
                            </h2>
                        }
                    >
                        <input
                            type="text"
                            class="inline-edit title-edit"
                            prop:value=move || title_draft.get()
                            on:input=move |ev| set_title_draft.set(event_target_value(&ev))
                            on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                                "Enter" => save_title(),
                                "Escape" => {
                                    ev.stop_propagation();
                                    set_editing_title.set(false);
                                }
                                _ => {}
                            }
                            on:blur=move |_| set_editing_title.set(false)
                        />
                    </Show>
                    <button class="modal-close" title="Close" on:click=move |_| on_close.run(())>"×"</button>
                </header>
                {move || card_name().map(|name| view! { <p class="modal-subtitle">"in card " <strong>{name}</strong></p> })}

                {move || detail.with(|d| d.as_ref().and_then(|d| d.error().map(str::to_string))).map(|message| view! {
                    <div class="error-banner" role="alert">
                        <span>{message}</span>
                        <button
                            class="error-banner-close"
                            on:click=move |_| detail.update(|d| {
                                if let Some(d) = d {
                                    d.clear_error();
                                }
                            })
                        >
                            "×"
                        </button>
                    </div>
                })}

                {move || load_error.get().map(|message| view! { <div class="error-banner">{message}</div> })}

                <Show
                    when=move || detail.with(Option::is_some)
                    fallback=move || view! {
                        <Show when=move || load_error.with(Option::is_none)>
                            <div class="modal-loading">"Loading..."</div>
                        </Show>
                    }
                >
                    <div class="modal-body">
                        <LabelPanel
                            assigned=assigned
                            catalog=catalog
                            busy=Signal::derive(move || is_busy.run(BusyKey::Labels))
                            on_intent=Callback::new(move |intent| actions.label(intent))
                        />
                        <DescriptionSection
                            description=description
                            busy=Signal::derive(move || is_busy.run(BusyKey::Description))
                            on_save=Callback::new(move |text: String| actions.run(|d| d.begin_save_description(&text)))
                        />
                        <ChecklistPanel
                            checklists=checklists
                            is_busy=is_busy
                            on_intent=Callback::new(move |intent| actions.checklist(intent))
                        />
                        <CommentPanel
                            comments=comments
                            is_busy=is_busy
                            on_intent=Callback::new(move |intent| actions.comment(intent))
                        />
                    </div>
                </Show>

                <footer class="modal-footer">
                    <DeleteConfirmButton
                        button_class="delete-btn"
                        label="Delete task?"
                        on_confirm=Callback::new(move |_| {
                            if board.delete_task(task_id) {
                                on_close.run(());
                            }
                        })
                    />
                </footer>
            </div>
        </div>
    }
}

#[component]
fn DescriptionSection(
    description: Signal<Option<String>>,
    busy: Signal<bool>,
    on_save: Callback<String, Result<(), Refused>>,
) -> impl IntoView {
    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());
    let (hint, set_hint) = signal(None::<&'static str>);

    let start_editing = move |_| {
        set_draft.set(description.get_untracked().unwrap_or_default());
        set_hint.set(None);
        set_editing.set(true);
    };
    let save = move |_| match on_save.run(draft.get()) {
        Ok(()) | Err(Refused::Unchanged) => set_editing.set(false),
        Err(refused) => set_hint.set(refused.message()),
    };

    view! {
        <section class="detail-section description">
            <h3>"Description"</h3>
            <Show
                when=move || editing.get()
                fallback=move || view! {
                    <div class="description-text" on:click=start_editing>
                        {move || description.get().unwrap_or_else(|| "No description provided. Click to add one.".to_string())}
                    </div>
                }
            >
                <textarea
                    class="description-editor"
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
                    <button disabled=move || busy.get() on:click=save>"Save"</button>
                    <button class="cancel-btn" on:click=move |_| set_editing.set(false)>"Cancel"</button>
                </div>
                {move || hint.get().map(|h| view! { <span class="form-hint">{h}</span> })}
            </Show>
        </section>
    }
}

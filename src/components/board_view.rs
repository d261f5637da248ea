//! Board View
//!
//! One project's board: cards side by side, tasks dragged between them.
//! The `BoardController` lives in a signal; every mutation goes through
//! [`BoardActions`], which runs the remote call and settles the result.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;

use board_engine::model::{Background, ProjectDetails};
use board_engine::{execute, BoardApi, BoardCommit, BoardController, CardId, DropTarget, EntityId, Settlement, TaskId};
use leptos_dragdrop::{bind_global_listeners, create_dnd_signals, DndCallbacks, DndSignals};

use crate::components::{AddCardForm, CardColumn, TaskModal};
use crate::context::{use_app_context, AppContext};

/// Header data that is not part of the card/task tree
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectMeta {
    pub name: String,
    pub background: Background,
}

impl From<&ProjectDetails> for ProjectMeta {
    fn from(details: &ProjectDetails) -> Self {
        Self {
            name: details.display_name().to_string(),
            background: details.background(),
        }
    }
}

/// Board-scoped handles provided via context
#[derive(Clone, Copy)]
pub struct BoardActions {
    pub controller: RwSignal<BoardController>,
    pub dnd: DndSignals<TaskId, DropTarget>,
    pub meta: RwSignal<Option<ProjectMeta>>,
    /// Task whose detail modal is open
    pub open_task: RwSignal<Option<TaskId>>,
    ctx: AppContext,
}

pub fn use_board_actions() -> BoardActions {
    use_context::<BoardActions>().expect("BoardActions should be provided")
}

impl BoardActions {
    fn project_id(&self) -> EntityId {
        self.controller.with_untracked(|c| c.project_id())
    }

    /// Send a locally applied commit to the server and settle it
    pub fn commit(&self, commit: BoardCommit) {
        let this = *self;
        spawn_local(async move {
            let api = this.ctx.api();
            let result = execute(&api, this.project_id(), &commit.op).await;
            if let Some(settlement) = this.controller.try_update(|c| c.settle(commit, result)) {
                this.follow_up(settlement);
            }
        });
    }

    fn follow_up(&self, settlement: Settlement) {
        if let Some(banner_id) = settlement.banner {
            self.schedule_dismiss(banner_id);
        }
        if settlement.refetch {
            self.refetch();
        }
    }

    fn schedule_dismiss(&self, banner_id: u64) {
        let controller = self.controller;
        Timeout::new(self.ctx.banner_timeout_ms(), move || {
            let _ = controller.try_update(|c| c.dismiss_error(banner_id));
        })
        .forget();
    }

    /// Initial load, or a reconciling refetch once loaded
    pub fn refetch(&self) {
        let this = *self;
        let ticket = self.controller.with_untracked(|c| c.refetch_ticket());
        spawn_local(async move {
            let project_id = this.project_id();
            match this.ctx.api().project_details(project_id).await {
                Ok(details) => {
                    let _ = this.controller.try_update(|c| {
                        if c.is_loaded() {
                            c.reconcile(ticket, &details);
                        } else {
                            c.load(&details);
                        }
                    });
                    let _ = this.meta.try_set(Some(ProjectMeta::from(&details)));
                }
                Err(err) => {
                    log::error!("[BOARD] Loading project {} failed: {}", project_id, err);
                    let loaded = this.controller.with_untracked(|c| c.is_loaded());
                    if !loaded {
                        if let Some(banner_id) = this
                            .controller
                            .try_update(|c| c.raise_error(err.user_message("Failed to load project")))
                        {
                            this.schedule_dismiss(banner_id);
                        }
                    }
                }
            }
        });
    }

    fn start(&self, begin: impl FnOnce(&mut BoardController) -> Option<BoardCommit>) -> bool {
        match self.controller.try_update(begin).flatten() {
            Some(commit) => {
                self.commit(commit);
                true
            }
            None => false,
        }
    }

    pub fn add_card(&self, name: &str) -> bool {
        self.start(|c| c.begin_add_card(name))
    }

    pub fn delete_card(&self, card_id: CardId) -> bool {
        self.start(|c| c.begin_delete_card(card_id))
    }

    pub fn add_task(&self, card_id: CardId, name: &str) -> bool {
        self.start(|c| c.begin_add_task(card_id, name))
    }

    pub fn rename_task(&self, task_id: TaskId, name: &str) -> bool {
        self.start(|c| c.begin_rename_task(task_id, name))
    }

    pub fn delete_task(&self, task_id: TaskId) -> bool {
        self.start(|c| c.begin_delete_task(task_id))
    }
}

#[component]
pub fn BoardView(project_id: EntityId) -> impl IntoView {
    let ctx = use_app_context();
    let controller = RwSignal::new(BoardController::new(project_id));
    let dnd = create_dnd_signals::<TaskId, DropTarget>();
    let actions = BoardActions {
        controller,
        dnd,
        meta: RwSignal::new(None),
        open_task: RwSignal::new(None),
        ctx,
    };
    provide_context(actions);

    Effect::new(move |_| {
        let trigger = ctx.reload_trigger.get();
        log::debug!("[BOARD] Loading project {}, trigger={}", project_id, trigger);
        actions.refetch();
    });

    // Hover only highlights; order changes on drop
    Effect::new(move |_| {
        let hover = dnd.hover.get();
        let changed = controller.with_untracked(|c| c.hover_change(hover).is_some());
        if changed {
            let _ = controller.try_update(|c| c.drag_over(hover));
        }
    });

    let listeners = bind_global_listeners(
        dnd,
        DndCallbacks {
            on_start: Box::new(move |task_id| {
                let _ = controller.try_update(|c| c.drag_start(task_id));
            }),
            on_end: Box::new(move |_task_id, target| {
                let Some(target) = target else {
                    let _ = controller.try_update(|c| c.drag_cancel());
                    return;
                };
                if let Some(commit) = controller.try_update(|c| c.drag_end(Some(target))).flatten() {
                    actions.commit(commit);
                }
            }),
        },
    );
    on_cleanup(move || listeners.remove());

    let card_ids = move || {
        controller.with(|c| c.board().cards().iter().map(|card| card.id).collect::<Vec<_>>())
    };
    let board_style = move || {
        actions
            .meta
            .with(|m| m.as_ref().map(|m| m.background.to_css()))
            .unwrap_or_default()
    };

    view! {
        <section class="board" style=board_style>
            <header class="board-header">
                <h1>{move || actions.meta.with(|m| m.as_ref().map(|m| m.name.clone()).unwrap_or_default())}</h1>
                <span class="board-stats">
                    {move || controller.with(|c| format!("{} cards, {} tasks", c.board().cards().len(), c.board().task_count()))}
                </span>
            </header>

            {move || controller.with(|c| c.banner().cloned()).map(|banner| {
                let id = banner.id;
                view! {
                    <div class="error-banner" role="alert">
                        <span>{banner.message}</span>
                        <button
                            class="error-banner-close"
                            on:click=move |_| {
                                controller.update(|c| {
                                    c.dismiss_error(id);
                                });
                            }
                        >
                            "×"
                        </button>
                    </div>
                }
            })}

            <Show when=move || !controller.with(|c| c.is_loaded())>
                <div class="board-loading">"Loading board..."</div>
            </Show>

            <div class="board-columns">
                <For
                    each=card_ids
                    key=|id| *id
                    children=move |card_id| view! { <CardColumn card_id=card_id /> }
                />
                <AddCardForm />
            </div>

            // Drag overlay follows the pointer
            {move || controller.with(|c| c.phase().dragged_task().cloned()).map(|task| {
                view! {
                    <div
                        class="drag-overlay"
                        style=move || {
                            let (x, y) = dnd.pointer.get();
                            format!("left: {}px; top: {}px;", x + 8, y + 8)
                        }
                    >
                        <span class="task-name">{task.name}</span>
                    </div>
                }
            })}

            {move || actions.open_task.get().map(|task_id| view! {
                <TaskModal
                    task_id=task_id
                    on_close=Callback::new(move |_| actions.open_task.set(None))
                />
            })}
        </section>
    }
}

//! Task Item Component
//!
//! A draggable task inside a card column. Hovering another task while
//! dragging marks it as the insertion point.

use leptos::prelude::*;

use board_engine::entity::is_temporary_id;
use board_engine::model::{DueState, Task};
use board_engine::{DropTarget, TaskId};
use leptos_dragdrop::{make_on_mousedown, make_on_target_mouseleave, make_on_target_mousemove};

use crate::components::use_board_actions;

fn due_badge(task: &Task) -> Option<(&'static str, String)> {
    let now = chrono::Local::now().naive_local();
    let due = task.due_date?;
    let class = match task.due_state(now)? {
        DueState::Done => "due-badge done",
        DueState::Overdue => "due-badge overdue",
        DueState::DueSoon => "due-badge soon",
        DueState::Upcoming => "due-badge",
    };
    Some((class, due.format("%b %-d").to_string()))
}

#[component]
pub fn TaskItem(task_id: TaskId) -> impl IntoView {
    let actions = use_board_actions();
    let dnd = actions.dnd;
    let target = DropTarget::Task(task_id);
    let saving = is_temporary_id(task_id);

    let task = Memo::new(move |_| actions.controller.with(|c| c.board().task(task_id).cloned()));

    let item_class = move || {
        let mut class = String::from("task-item");
        if dnd.is_dragging(task_id) {
            class.push_str(" dragging");
        }
        if dnd.is_hovered(target) && !dnd.is_dragging(task_id) {
            class.push_str(" drop-target");
        }
        if task.with(|t| t.as_ref().is_some_and(Task::is_done)) {
            class.push_str(" done");
        }
        if saving {
            class.push_str(" saving");
        }
        class
    };

    let on_mousedown = make_on_mousedown(dnd, task_id);

    view! {
        <div
            class=item_class
            on:mousedown=move |ev| {
                if !saving {
                    on_mousedown(ev);
                }
            }
            on:mousemove=make_on_target_mousemove(dnd, target)
            on:mouseleave=make_on_target_mouseleave(dnd, target)
            on:click=move |_| {
                if dnd.just_ended.get_untracked() || saving {
                    return;
                }
                actions.open_task.set(Some(task_id));
            }
        >
            {move || task.get().map(|t| {
                let (checked, total) = t.checklist_totals();
                let comments = t.comments.len();
                view! {
                    {(!t.labels.is_empty()).then(|| view! {
                        <div class="task-labels">
                            {t.labels.iter().map(|l| view! {
                                <span class="label-chip" style={format!("background-color: {}", l.color)} title={l.tag_value.clone()}>
                                    {l.tag_value.clone()}
                                </span>
                            }).collect_view()}
                        </div>
                    })}
                    <span class="task-name">{t.name.clone()}</span>
                    <div class="task-badges">
                        {due_badge(&t).map(|(class, text)| view! { <span class=class>{text}</span> })}
                        {(total > 0).then(|| view! {
                            <span class={if checked == total { "checklist-badge complete" } else { "checklist-badge" }}>
                                {format!("☑ {}/{}", checked, total)}
                            </span>
                        })}
                        {(comments > 0).then(|| view! { <span class="comment-badge">{format!("💬 {}", comments)}</span> })}
                        {saving.then(|| view! { <span class="saving-badge">"Saving..."</span> })}
                    </div>
                }
            })}
        </div>
    }
}

//! Workspace Panel Component
//!
//! Members of the selected workspace, the invite form and the user's
//! pending invitations. Removals are optimistic: the row leaves the list
//! at once and comes back if the server refuses.

use leptos::prelude::*;
use leptos::task::spawn_local;

use board_engine::model::{Invitation, Member};
use board_engine::roster::{answer_invitation, invite_error_message, validate_email};
use board_engine::{EntityId, WorkspaceApi};

use crate::components::DeleteConfirmButton;
use crate::context::{use_app_context, AppContext};
use crate::store::{store_add_workspace, store_owns_current, use_app_store, AppStateStoreFields, AppStore};

/// Fetch the members of `workspace_id` into the roster. Dropped when the
/// roster changed meanwhile or another workspace got selected.
fn load_members(ctx: AppContext, store: AppStore, workspace_id: EntityId, set_notice: WriteSignal<Option<String>>) {
    let ticket = store.members().with_untracked(|r| r.ticket());
    spawn_local(async move {
        let result = ctx.api().members(workspace_id).await;
        if store.current_workspace_id().get_untracked() != Some(workspace_id) {
            log::debug!("[WORKSPACE] Dropping members of {}, no longer selected", workspace_id);
            return;
        }
        match result {
            Ok(rows) => {
                log::debug!("[WORKSPACE] Loaded {} members of {}", rows.len(), workspace_id);
                store.members().write().reconcile(ticket, rows);
            }
            Err(err) => {
                log::warn!("[WORKSPACE] Loading members of {} failed: {}", workspace_id, err);
                set_notice.set(Some(err.user_message("Failed to load members")));
            }
        }
    });
}

fn load_invitations(ctx: AppContext, store: AppStore) {
    let ticket = store.invitations().with_untracked(|r| r.ticket());
    spawn_local(async move {
        match ctx.api().pending_invitations().await {
            Ok(rows) => {
                store.invitations().write().reconcile(ticket, rows);
            }
            Err(err) => log::warn!("[WORKSPACE] Reloading invitations failed: {}", err),
        }
    });
}

#[component]
pub fn WorkspacePanel() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (notice, set_notice) = signal(None::<String>);

    // Load members when the workspace changes
    Effect::new(move |_| {
        let _ = ctx.reload_trigger.get();
        let Some(workspace_id) = store.current_workspace_id().get() else {
            return;
        };
        store.members().write().reset(Vec::new());
        load_members(ctx, store, workspace_id, set_notice);
    });

    let remove = move |member_id: EntityId| {
        let Some(workspace_id) = store.current_workspace_id().get_untracked() else {
            return;
        };
        let Some(removal) = store.members().write().begin_remove(member_id) else {
            return;
        };
        spawn_local(async move {
            let result = ctx.api().remove_member(workspace_id, member_id).await;
            let settlement = store.members().write().settle(removal, &result);
            if let Err(err) = result {
                set_notice.set(Some(err.user_message("Failed to remove member")));
            }
            if settlement.refetch && store.current_workspace_id().get_untracked() == Some(workspace_id) {
                load_members(ctx, store, workspace_id, set_notice);
            }
        });
    };

    let answer = move |invitation_id: EntityId, accept: bool| {
        let Some(removal) = store.invitations().write().begin_remove(invitation_id) else {
            return;
        };
        spawn_local(async move {
            let result = answer_invitation(&ctx.api(), invitation_id, accept).await;
            let settlement = store.invitations().write().settle(removal, &result);
            if settlement.refetch {
                load_invitations(ctx, store);
            }
            match result {
                Ok(Some(workspace)) => {
                    log::info!("[WORKSPACE] Joined {}", workspace.name);
                    store_add_workspace(&store, workspace);
                }
                Ok(None) => {}
                Err(err) => set_notice.set(Some(err.user_message("Failed to answer invitation"))),
            }
        });
    };

    view! {
        <aside class="workspace-panel">
            {move || notice.get().map(|message| view! {
                <div class="error-banner">
                    <span>{message}</span>
                    <button class="error-banner-close" on:click=move |_| set_notice.set(None)>"×"</button>
                </div>
            })}

            <section class="panel-section">
                <h3>"Members"</h3>
                <ul class="member-list">
                    {move || store.members().with(|r| r.rows().to_vec()).into_iter().map(|member| view! {
                        <MemberRow member=member on_remove=Callback::new(remove) />
                    }).collect_view()}
                </ul>
                <Show when=move || store_owns_current(&store)>
                    <InviteForm />
                </Show>
            </section>

            <Show when=move || !store.invitations().with(|r| r.rows().is_empty())>
                <section class="panel-section">
                    <h3>"Pending invitations"</h3>
                    <ul class="invitation-list">
                        {move || store.invitations().with(|r| r.rows().to_vec()).into_iter().map(|invitation| view! {
                            <InvitationRow
                                invitation=invitation
                                on_answer=Callback::new(move |(id, accept): (EntityId, bool)| answer(id, accept))
                            />
                        }).collect_view()}
                    </ul>
                </section>
            </Show>
        </aside>
    }
}

#[component]
fn MemberRow(member: Member, on_remove: Callback<EntityId>) -> impl IntoView {
    let store = use_app_store();
    let member_id = member.id;
    let name = member.full_name();
    view! {
        <li class="member-row">
            <span class="avatar">{member.initials()}</span>
            <span class="member-name">{if name.is_empty() { member.email.clone() } else { name }}</span>
            <span class="member-email">{member.email.clone()}</span>
            <Show when=move || store_owns_current(&store)>
                <DeleteConfirmButton
                    button_class="delete-btn small"
                    label="Remove?"
                    on_confirm=Callback::new(move |_| on_remove.run(member_id))
                />
            </Show>
        </li>
    }
}

#[component]
fn InvitationRow(invitation: Invitation, on_answer: Callback<(EntityId, bool)>) -> impl IntoView {
    let id = invitation.id;
    let expires = invitation
        .expires_at
        .map(|t| format!("expires {}", t.format("%Y-%m-%d")));
    view! {
        <li class="invitation-row">
            <span class="invitation-workspace">{invitation.workspace_name}</span>
            {expires.map(|e| view! { <span class="invitation-expiry">{e}</span> })}
            <button class="confirm-btn" on:click=move |_| on_answer.run((id, true))>"Accept"</button>
            <button class="cancel-btn" on:click=move |_| on_answer.run((id, false))>"Reject"</button>
        </li>
    }
}

#[component]
fn InviteForm() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (email, set_email) = signal(String::new());
    let (status, set_status) = signal(None::<(bool, String)>);
    let (sending, set_sending) = signal(false);

    let invite = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let address = match validate_email(&email.get()) {
            Ok(address) => address,
            Err(message) => {
                set_status.set(Some((false, message.to_string())));
                return;
            }
        };
        let Some(workspace_id) = store.current_workspace_id().get_untracked() else {
            return;
        };
        set_sending.set(true);
        spawn_local(async move {
            let result = ctx.api().invite(workspace_id, &address).await;
            set_sending.set(false);
            match result {
                Ok(()) => {
                    set_email.set(String::new());
                    set_status.set(Some((true, format!("Invitation sent to {}", address))));
                }
                Err(err) => set_status.set(Some((false, invite_error_message(&err)))),
            }
        });
    };

    view! {
        <form class="new-item-form invite-form" on:submit=invite>
            <input
                type="email"
                placeholder="Invite by email..."
                prop:value=move || email.get()
                on:input=move |ev| set_email.set(event_target_value(&ev))
            />
            <button type="submit" disabled=move || sending.get()>"Invite"</button>
            {move || status.get().map(|(ok, message)| view! {
                <span class={if ok { "form-hint success" } else { "form-hint" }}>{message}</span>
            })}
        </form>
    }
}

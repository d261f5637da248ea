//! Top Bar Component
//!
//! App title, workspace tabs, project picker, access token and theme.

use leptos::prelude::*;

use board_engine::settings::TOKEN_KEY;
use board_engine::{EntityId, SettingsStore};

use crate::components::WorkspaceTabBar;
use crate::context::use_app_context;
use crate::settings::LocalStorage;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn TopBar() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let (project_input, set_project_input) = signal(
        ctx.current_project
            .get_untracked()
            .map(|id| id.to_string())
            .unwrap_or_default(),
    );
    let (show_token, set_show_token) = signal(false);
    let (token_input, set_token_input) = signal(String::new());

    let open_project = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match project_input.get().trim().parse::<EntityId>() {
            Ok(id) if id > 0 => ctx.open_project(id),
            _ => log::warn!("[APP] Not a project id: {:?}", project_input.get()),
        }
    };

    let save_token = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let token = token_input.get();
        if token.trim().is_empty() {
            LocalStorage.remove(TOKEN_KEY);
        } else {
            LocalStorage.set(TOKEN_KEY, token.trim());
        }
        set_token_input.set(String::new());
        set_show_token.set(false);
        ctx.reload();
    };

    let toggle_theme = move |_| {
        let theme = store.theme().get_untracked().toggled();
        LocalStorage.set_theme(theme);
        store.theme().set(theme);
    };

    view! {
        <header class="top-bar">
            <span class="top-bar-title">"Kanban"</span>
            <WorkspaceTabBar />

            <form class="project-picker" on:submit=open_project>
                <input
                    type="number"
                    min="1"
                    placeholder="Project #"
                    prop:value=move || project_input.get()
                    on:input=move |ev| set_project_input.set(event_target_value(&ev))
                />
                <button type="submit">"Open"</button>
            </form>

            <div class="top-bar-controls">
                <button
                    class="top-bar-btn"
                    title="Access token"
                    on:click=move |_| set_show_token.update(|v| *v = !*v)
                >
                    "🔑"
                </button>
                <button
                    class="top-bar-btn"
                    title=move || format!("Theme: {}", store.theme().get())
                    on:click=toggle_theme
                >
                    {move || if store.theme().get() == board_engine::Theme::Dark { "☀" } else { "☾" }}
                </button>
                <button class="top-bar-btn" title="Reload" on:click=move |_| ctx.reload()>"⟳"</button>
            </div>

            <Show when=move || show_token.get()>
                <form class="token-form" on:submit=save_token>
                    <input
                        type="password"
                        placeholder="Paste access token (empty to sign out)"
                        prop:value=move || token_input.get()
                        on:input=move |ev| set_token_input.set(event_target_value(&ev))
                    />
                    <button type="submit">"Save"</button>
                </form>
            </Show>
        </header>
    }
}

//! REST Client
//!
//! `reqwest` implementation of the engine's API traits. Every request
//! carries the bearer token from settings when one is stored. Non-success
//! responses become `ApiError::Http` with the server's `message` if the
//! body has one.

pub mod routes;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use board_engine::model::{
    Checklist, Comment, DashboardData, Invitation, Label, Member, ProjectDetails, Task, Workspace,
};
use board_engine::{
    ApiError, ApiResult, BoardApi, CardId, ChecklistId, ChecklistItemId, CommentId, EntityId, LabelId, TaskApi,
    TaskId, WorkspaceApi,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return the raw body of a successful response
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<String> {
        log::debug!("[API] {} {}", method, path);
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if status.is_success() {
            Ok(text)
        } else {
            log::warn!("[API] {} {} -> {}", method, path, status.as_u16());
            Err(error_from_body(status.as_u16(), &text))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let text = self.send(Method::GET, path, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn call<B: Serialize>(&self, method: Method, path: &str, body: B) -> ApiResult<Value> {
        let body = serde_json::to_value(body)?;
        let text = self.send(method, path, Some(&body)).await?;
        Ok(parse_lenient(&text))
    }

    async fn call_empty(&self, method: Method, path: &str) -> ApiResult<Value> {
        let text = self.send(method, path, None).await?;
        Ok(parse_lenient(&text))
    }
}

/// Build the error for a non-success response body
pub fn error_from_body(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .or_else(|| {
            let text = body.trim();
            (!text.is_empty() && !text.starts_with('{') && !text.starts_with('<') && text.len() <= 200)
                .then(|| text.to_string())
        });
    ApiError::Http { status, message }
}

/// Empty or non-JSON bodies read as `null`
fn parse_lenient(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or(Value::Null)
}

/// Id of a freshly created entity: `{"id": n}`, `{"data": {"id": n}}` or a
/// bare number
pub fn created_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::Object(map) => map
            .get("id")
            .and_then(Value::as_i64)
            .or_else(|| map.get("data").and_then(created_id)),
        _ => None,
    }
}

// ========================
// Board
// ========================

#[async_trait(?Send)]
impl BoardApi for ApiClient {
    async fn project_details(&self, project_id: EntityId) -> ApiResult<ProjectDetails> {
        self.get(&routes::project_details(project_id)).await
    }

    async fn move_task(&self, task_id: TaskId, card_id: CardId) -> ApiResult<()> {
        self.call(Method::PUT, &routes::task_move(task_id), json!({ "cardId": card_id }))
            .await?;
        Ok(())
    }

    async fn add_card(&self, project_id: EntityId, name: &str) -> ApiResult<Option<CardId>> {
        let created = self
            .call(Method::POST, &routes::project_cards(project_id), json!({ "name": name }))
            .await?;
        Ok(created_id(&created))
    }

    async fn delete_card(&self, card_id: CardId) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &routes::card(card_id)).await?;
        Ok(())
    }

    async fn add_task(&self, card_id: CardId, name: &str) -> ApiResult<Option<TaskId>> {
        let created = self
            .call(Method::POST, &routes::card_tasks(card_id), json!({ "name": name }))
            .await?;
        Ok(created_id(&created))
    }

    async fn rename_task(&self, task_id: TaskId, name: &str) -> ApiResult<()> {
        self.call(Method::PATCH, &routes::task_name(task_id), json!({ "name": name }))
            .await?;
        Ok(())
    }

    async fn delete_task(&self, task_id: TaskId) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &routes::task(task_id)).await?;
        Ok(())
    }
}

// ========================
// Task detail
// ========================

#[async_trait(?Send)]
impl TaskApi for ApiClient {
    async fn task_info(&self, task_id: TaskId) -> ApiResult<Task> {
        self.get(&routes::task_info(task_id)).await
    }

    async fn checklists(&self, task_id: TaskId) -> ApiResult<Vec<Checklist>> {
        self.get(&routes::checklists(task_id)).await
    }

    async fn comments(&self, task_id: TaskId) -> ApiResult<Vec<Comment>> {
        self.get(&routes::comments(task_id)).await
    }

    async fn add_description(&self, task_id: TaskId, description: &str) -> ApiResult<()> {
        self.call(Method::POST, &routes::add_description(task_id), json!({ "description": description }))
            .await?;
        Ok(())
    }

    async fn update_description(&self, task_id: TaskId, description: &str) -> ApiResult<()> {
        self.call(Method::PATCH, &routes::update_description(task_id), json!({ "description": description }))
            .await?;
        Ok(())
    }

    async fn create_checklist(&self, task_id: TaskId, title: &str) -> ApiResult<Option<ChecklistId>> {
        let created = self
            .call(Method::POST, &routes::create_checklist(task_id), json!({ "title": title }))
            .await?;
        Ok(created_id(&created))
    }

    async fn rename_checklist(&self, task_id: TaskId, checklist_id: ChecklistId, title: &str) -> ApiResult<()> {
        self.call(Method::PUT, &routes::rename_checklist(task_id, checklist_id), json!({ "title": title }))
            .await?;
        Ok(())
    }

    async fn delete_checklist(&self, task_id: TaskId, checklist_id: ChecklistId) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &routes::delete_checklist(task_id, checklist_id))
            .await?;
        Ok(())
    }

    async fn add_checklist_item(
        &self,
        task_id: TaskId,
        checklist_id: ChecklistId,
        content: &str,
    ) -> ApiResult<Option<ChecklistItemId>> {
        let created = self
            .call(
                Method::POST,
                &routes::add_checklist_item(task_id, checklist_id),
                json!({ "content": content }),
            )
            .await?;
        Ok(created_id(&created))
    }

    async fn rename_checklist_item(
        &self,
        task_id: TaskId,
        checklist_id: ChecklistId,
        item_id: ChecklistItemId,
        content: &str,
    ) -> ApiResult<()> {
        self.call(
            Method::PUT,
            &routes::rename_checklist_item(task_id, checklist_id, item_id),
            json!({ "content": content }),
        )
        .await?;
        Ok(())
    }

    async fn set_checklist_item_completed(
        &self,
        task_id: TaskId,
        checklist_id: ChecklistId,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> ApiResult<()> {
        self.call(
            Method::PATCH,
            &routes::toggle_checklist_item(task_id, checklist_id, item_id),
            json!({ "isCompleted": completed }),
        )
        .await?;
        Ok(())
    }

    async fn remove_checklist_item(
        &self,
        task_id: TaskId,
        checklist_id: ChecklistId,
        item_id: ChecklistItemId,
    ) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &routes::remove_checklist_item(task_id, checklist_id, item_id))
            .await?;
        Ok(())
    }

    async fn all_labels(&self) -> ApiResult<Vec<Label>> {
        self.get(&routes::all_labels()).await
    }

    async fn assign_labels(&self, task_id: TaskId, label_ids: &[LabelId]) -> ApiResult<()> {
        self.call(Method::POST, &routes::assign_labels(task_id), json!({ "labelIds": label_ids }))
            .await?;
        Ok(())
    }

    async fn remove_label(&self, task_id: TaskId, label_id: LabelId) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &routes::remove_label(task_id, label_id))
            .await?;
        Ok(())
    }

    async fn add_comment(&self, task_id: TaskId, content: &str) -> ApiResult<Option<CommentId>> {
        let created = self
            .call(Method::POST, &routes::comments(task_id), json!({ "content": content }))
            .await?;
        Ok(created_id(&created))
    }

    async fn update_comment(&self, task_id: TaskId, comment_id: CommentId, content: &str) -> ApiResult<()> {
        self.call(Method::PUT, &routes::comment(task_id, comment_id), json!({ "content": content }))
            .await?;
        Ok(())
    }

    async fn delete_comment(&self, task_id: TaskId, comment_id: CommentId) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &routes::comment(task_id, comment_id))
            .await?;
        Ok(())
    }
}

// ========================
// Workspace
// ========================

#[async_trait(?Send)]
impl WorkspaceApi for ApiClient {
    async fn my_workspace(&self) -> ApiResult<Option<Workspace>> {
        match self.get::<DashboardData>(&routes::my_workspace()).await {
            Ok(dashboard) => Ok(dashboard.workspace),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn joined_workspaces(&self) -> ApiResult<Vec<Workspace>> {
        self.get(&routes::joined_workspaces()).await
    }

    async fn members(&self, workspace_id: EntityId) -> ApiResult<Vec<Member>> {
        self.get(&routes::members(workspace_id)).await
    }

    async fn remove_member(&self, workspace_id: EntityId, member_id: EntityId) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &routes::member(workspace_id, member_id))
            .await?;
        Ok(())
    }

    async fn invite(&self, workspace_id: EntityId, email: &str) -> ApiResult<()> {
        self.call(Method::POST, &routes::invite(workspace_id), json!({ "email": email }))
            .await?;
        Ok(())
    }

    async fn pending_invitations(&self) -> ApiResult<Vec<Invitation>> {
        self.get(&routes::pending_invitations()).await
    }

    async fn accept_invitation(&self, invitation_id: EntityId) -> ApiResult<Workspace> {
        let text = self
            .send(Method::POST, &routes::accept_invitation(invitation_id), Some(&json!({})))
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn reject_invitation(&self, invitation_id: EntityId) -> ApiResult<()> {
        self.call(Method::POST, &routes::reject_invitation(invitation_id), json!({}))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_message_is_surfaced() {
        let err = error_from_body(403, r#"{"message": "You are not a member of this project"}"#);
        assert_eq!(
            err,
            ApiError::Http {
                status: 403,
                message: Some("You are not a member of this project".into())
            }
        );
        assert_eq!(error_from_body(400, "Card name required").user_message("x"), "Card name required");
        assert_eq!(
            error_from_body(502, "<html>Bad gateway</html>"),
            ApiError::Http { status: 502, message: None }
        );
        assert_eq!(error_from_body(500, ""), ApiError::Http { status: 500, message: None });
    }

    #[test]
    fn test_created_id_shapes() {
        assert_eq!(created_id(&json!({"id": 12, "name": "Todo"})), Some(12));
        assert_eq!(created_id(&json!({"data": {"id": 5}})), Some(5));
        assert_eq!(created_id(&json!(42)), Some(42));
        assert_eq!(created_id(&json!({"message": "created"})), None);
        assert_eq!(created_id(&parse_lenient("")), None);
    }
}

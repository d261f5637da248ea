//! Workspace Roster
//!
//! Members and pending invitations. Removals are optimistic: the row
//! disappears at once and comes back if the server refuses.

use std::collections::HashSet;

use crate::api::WorkspaceApi;
use crate::entity::{self, Entity, EntityId};
use crate::error::{ApiError, ApiResult};
use crate::model::{Invitation, Workspace};
use crate::optimistic::{Optimistic, Pending, Reversion};

/// Ordered list of entities with optimistic removal
#[derive(Debug, Clone, PartialEq)]
pub struct Roster<T> {
    rows: Optimistic<Vec<T>>,
    removing: HashSet<EntityId>,
}

impl<T> Default for Roster<T>
where
    T: Entity,
{
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Removal<T> {
    pending: Pending<Vec<T>>,
    pub id: EntityId,
}

/// Outcome of a settled removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovalSettlement {
    /// The row is back in the list
    pub restored: bool,
    /// A newer change hid the failure; reload the list
    pub refetch: bool,
}

impl<T: Entity> Roster<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Optimistic::new(rows),
            removing: HashSet::new(),
        }
    }

    pub fn rows(&self) -> &[T] {
        self.rows.get()
    }

    pub fn is_removing(&self, id: EntityId) -> bool {
        self.removing.contains(&id)
    }

    pub fn ticket(&self) -> u64 {
        self.rows.generation()
    }

    pub fn reconcile(&mut self, ticket: u64, rows: Vec<T>) -> bool {
        self.rows.reconcile(ticket, rows)
    }

    /// Start over with `rows` (e.g. another workspace was selected).
    /// Tickets and removals issued before the reset go stale.
    pub fn reset(&mut self, rows: Vec<T>) {
        self.rows.replace(rows);
        self.removing.clear();
    }

    /// `None` when the row is unknown or already being removed
    pub fn begin_remove(&mut self, id: EntityId) -> Option<Removal<T>> {
        entity::find(self.rows(), id)?;
        if !self.removing.insert(id) {
            return None;
        }
        let (pending, ()) = self.rows.apply(|rows| rows.retain(|r| r.id() != id));
        Some(Removal { pending, id })
    }

    pub fn settle<R>(&mut self, removal: Removal<T>, result: &ApiResult<R>) -> RemovalSettlement {
        self.removing.remove(&removal.id);
        let mut settlement = RemovalSettlement::default();
        if let Err(err) = result {
            log::warn!("[WORKSPACE] Removing {} failed: {}", removal.id, err);
            match self.rows.revert(removal.pending) {
                Reversion::Restored => settlement.restored = true,
                Reversion::Superseded => settlement.refetch = true,
            }
        }
        settlement
    }
}

/// Everything the workspace panel shows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkspaceOverview {
    pub own: Option<Workspace>,
    pub joined: Vec<Workspace>,
    pub invitations: Vec<Invitation>,
}

impl WorkspaceOverview {
    /// Own workspace first, then joined ones not already listed
    pub fn all_workspaces(&self) -> Vec<&Workspace> {
        let mut seen = HashSet::new();
        self.own
            .iter()
            .chain(self.joined.iter())
            .filter(|w| seen.insert(w.id))
            .collect()
    }
}

pub async fn load_overview<A>(api: &A) -> ApiResult<WorkspaceOverview>
where
    A: WorkspaceApi + ?Sized,
{
    let (own, joined, invitations) = futures::try_join!(
        api.my_workspace(),
        api.joined_workspaces(),
        api.pending_invitations()
    )?;
    Ok(WorkspaceOverview { own, joined, invitations })
}

/// Loose shape check before sending an invite; the server validates for real
pub fn validate_email(email: &str) -> Result<String, &'static str> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Enter a valid email address");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Enter a valid email address");
    }
    Ok(email.to_lowercase())
}

/// Accept or reject a pending invitation. Accepting yields the joined
/// workspace.
pub async fn answer_invitation<A>(api: &A, invitation_id: EntityId, accept: bool) -> ApiResult<Option<Workspace>>
where
    A: WorkspaceApi + ?Sized,
{
    if accept {
        api.accept_invitation(invitation_id).await.map(Some)
    } else {
        api.reject_invitation(invitation_id).await.map(|()| None)
    }
}

pub fn invite_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Http { status: 409, message: None } => "That person is already a member".to_string(),
        _ => err.user_message("Failed to send invitation"),
    }
}

//! Optimistic State
//!
//! Snapshot, apply, then confirm or revert. Every local mutation bumps a
//! generation counter; a pending ticket remembers the generation it
//! produced. A revert only restores its snapshot when nothing has happened
//! since, so a late failure can never clobber a newer optimistic update or
//! a fresher server state.

use std::future::Future;

/// Ticket for one in-flight optimistic mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Pending<S> {
    generation: u64,
    snapshot: S,
}

impl<S> Pending<S> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// State as it was right before the mutation
    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// No mutation happened after this one
    Latest,
    /// Newer mutations exist; their own settlement will reconcile
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversion {
    /// Snapshot restored
    Restored,
    /// Snapshot discarded because newer state exists; refetch to reconcile
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Optimistic<S> {
    value: S,
    generation: u64,
}

impl<S: Clone> Optimistic<S> {
    pub fn new(value: S) -> Self {
        Self { value, generation: 0 }
    }

    pub fn get(&self) -> &S {
        &self.value
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot the current value, then mutate it in place.
    pub fn apply<R>(&mut self, mutate: impl FnOnce(&mut S) -> R) -> (Pending<S>, R) {
        let snapshot = self.value.clone();
        let out = mutate(&mut self.value);
        self.generation += 1;
        (
            Pending {
                generation: self.generation,
                snapshot,
            },
            out,
        )
    }

    pub fn confirm(&self, pending: &Pending<S>) -> Confirmation {
        if pending.generation == self.generation {
            Confirmation::Latest
        } else {
            Confirmation::Superseded
        }
    }

    /// Patch the current value after a successful call (e.g. swap a temp
    /// id). Does not bump the generation.
    pub fn amend(&mut self, patch: impl FnOnce(&mut S)) {
        patch(&mut self.value);
    }

    pub fn revert(&mut self, pending: Pending<S>) -> Reversion {
        if pending.generation == self.generation {
            self.value = pending.snapshot;
            self.generation += 1;
            Reversion::Restored
        } else {
            Reversion::Superseded
        }
    }

    /// Unconditionally take a new value (initial load, explicit reset)
    pub fn replace(&mut self, value: S) {
        self.value = value;
        self.generation += 1;
    }

    /// Accept server state fetched when the generation was `observed`.
    /// Discarded when local mutations happened after the fetch started.
    pub fn reconcile(&mut self, observed: u64, value: S) -> bool {
        if observed == self.generation {
            self.value = value;
            true
        } else {
            false
        }
    }

    /// One-shot form: apply, await the effect, then confirm or revert.
    pub async fn commit<T, E, Fut>(
        &mut self,
        mutate: impl FnOnce(&mut S),
        effect: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let (pending, ()) = self.apply(mutate);
        match effect.await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.revert(pending);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_restores_exact_snapshot() {
        let mut cell = Optimistic::new(vec![1, 2, 3]);
        let (pending, ()) = cell.apply(|v| {
            v.remove(0);
        });
        assert_eq!(cell.get(), &vec![2, 3]);
        assert_eq!(cell.revert(pending), Reversion::Restored);
        assert_eq!(cell.get(), &vec![1, 2, 3]);
    }

    #[test]
    fn test_stale_revert_keeps_newer_update() {
        let mut cell = Optimistic::new(vec![1]);
        let (first, ()) = cell.apply(|v| v.push(2));
        let (second, ()) = cell.apply(|v| v.push(3));
        assert_eq!(cell.confirm(&first), Confirmation::Superseded);
        assert_eq!(cell.revert(first), Reversion::Superseded);
        assert_eq!(cell.get(), &vec![1, 2, 3]);
        assert_eq!(cell.confirm(&second), Confirmation::Latest);
    }

    #[test]
    fn test_reconcile_discards_stale_fetch() {
        let mut cell = Optimistic::new(0);
        let observed = cell.generation();
        cell.apply(|v| *v = 5);
        assert!(!cell.reconcile(observed, 1));
        assert_eq!(*cell.get(), 5);
        let observed = cell.generation();
        assert!(cell.reconcile(observed, 7));
        assert_eq!(*cell.get(), 7);
    }

    #[test]
    fn test_revert_after_replace_is_superseded() {
        let mut cell = Optimistic::new(String::from("a"));
        let (pending, ()) = cell.apply(|s| s.push('b'));
        cell.replace(String::from("server"));
        assert_eq!(cell.revert(pending), Reversion::Superseded);
        assert_eq!(cell.get(), "server");
    }

    #[tokio::test]
    async fn test_commit_reverts_on_error() {
        let mut cell = Optimistic::new(10);
        let result: Result<(), &str> = cell.commit(|v| *v += 1, async { Err("offline") }).await;
        assert_eq!(result, Err("offline"));
        assert_eq!(*cell.get(), 10);

        let result: Result<u8, &str> = cell.commit(|v| *v += 1, async { Ok(1) }).await;
        assert_eq!(result, Ok(1));
        assert_eq!(*cell.get(), 11);
    }
}

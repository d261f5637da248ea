//! Move Resolution
//!
//! Turns a drag source and a drop target into a destination card and index.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::entity::{CardId, TaskId};

/// What the pointer was released over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropTarget {
    /// Another task: take its place, pushing it down
    Task(TaskId),
    /// A card body or an empty card: append
    Card(CardId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMove {
    pub task_id: TaskId,
    pub source_card_id: CardId,
    pub source_index: usize,
    pub destination_card_id: CardId,
    pub destination_index: usize,
}

/// Why a drop did nothing. None of these are shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The dragged task is no longer on the board
    StaleSource,
    /// The task or card under the pointer is no longer on the board
    StaleTarget,
    /// Dropped where it started
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Move(ResolvedMove),
    Abort(AbortReason),
}

impl Resolution {
    pub fn as_move(&self) -> Option<&ResolvedMove> {
        match self {
            Resolution::Move(m) => Some(m),
            Resolution::Abort(_) => None,
        }
    }
}

pub fn resolve_move(board: &Board, source: TaskId, target: DropTarget) -> Resolution {
    let Some(origin) = board.locate(source) else {
        return Resolution::Abort(AbortReason::StaleSource);
    };

    let destination = match target {
        DropTarget::Card(card_id) => board.card(card_id).map(|card| (card.id, card.tasks.len())),
        DropTarget::Task(task_id) => board.locate(task_id).map(|l| (l.card_id, l.index)),
    };
    let Some((destination_card_id, destination_index)) = destination else {
        return Resolution::Abort(AbortReason::StaleTarget);
    };

    if origin.card_id == destination_card_id && origin.index == destination_index {
        return Resolution::Abort(AbortReason::Unchanged);
    }

    Resolution::Move(ResolvedMove {
        task_id: source,
        source_card_id: origin.card_id,
        source_index: origin.index,
        destination_card_id,
        destination_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::{board, ids};

    #[test]
    fn test_drop_on_task_takes_its_index() {
        let b = board(&[(1, &[10, 11]), (2, &[20, 21, 22])]);
        let m = *resolve_move(&b, 10, DropTarget::Task(21)).as_move().unwrap();
        assert_eq!(m.destination_card_id, 2);
        assert_eq!(m.destination_index, 1);
        assert_eq!((m.source_card_id, m.source_index), (1, 0));
    }

    #[test]
    fn test_drop_on_empty_card_appends_at_zero() {
        let mut b = board(&[(1, &[10, 11]), (2, &[])]);
        let m = *resolve_move(&b, 11, DropTarget::Card(2)).as_move().unwrap();
        assert_eq!(m.destination_index, 0);
        assert!(b.move_task(m.task_id, m.destination_card_id, m.destination_index));
        assert_eq!(ids(&b, 2), vec![11]);
    }

    #[test]
    fn test_drop_on_card_appends_at_end() {
        let b = board(&[(1, &[10]), (2, &[20, 21])]);
        let m = *resolve_move(&b, 10, DropTarget::Card(2)).as_move().unwrap();
        assert_eq!(m.destination_index, 2);
    }

    #[test]
    fn test_drop_on_self_is_unchanged() {
        let b = board(&[(1, &[10, 11])]);
        assert_eq!(
            resolve_move(&b, 11, DropTarget::Task(11)),
            Resolution::Abort(AbortReason::Unchanged)
        );
    }

    #[test]
    fn test_drop_last_task_on_own_card_is_not_unchanged() {
        // appending to the own card targets len, one past the current index
        let b = board(&[(1, &[10, 11])]);
        let m = resolve_move(&b, 11, DropTarget::Card(1));
        assert!(m.as_move().is_some());
    }

    #[test]
    fn test_stale_ids_abort() {
        let b = board(&[(1, &[10])]);
        assert_eq!(
            resolve_move(&b, 99, DropTarget::Card(1)),
            Resolution::Abort(AbortReason::StaleSource)
        );
        assert_eq!(
            resolve_move(&b, 10, DropTarget::Card(5)),
            Resolution::Abort(AbortReason::StaleTarget)
        );
        assert_eq!(
            resolve_move(&b, 10, DropTarget::Task(77)),
            Resolution::Abort(AbortReason::StaleTarget)
        );
    }
}

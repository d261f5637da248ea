//! Board State
//!
//! The ordered card/task tree for one project. Cards keep their tasks as an
//! ordered sequence; every positional change goes through remove-at-index
//! and insert-at-index so a task is never in two cards at once.

use std::collections::HashSet;

use crate::entity::{self, CardId, Entity, TaskId};
use crate::model::{Card, ProjectDetails, Task};
use crate::palette::card_color;

/// Result of locating a task on the board
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located<'a> {
    pub task: &'a Task,
    pub card_id: CardId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Build the local board from a project-details payload.
    /// Colors come from the palette by card position.
    pub fn from_details(details: &ProjectDetails) -> Self {
        let cards = details
            .cards
            .iter()
            .enumerate()
            .map(|(index, card)| {
                let mut local = Card::new(card.id, card.name.clone(), card_color(index));
                local.tasks = card
                    .tasks
                    .iter()
                    .cloned()
                    .map(|mut task| {
                        task.card_id = card.id;
                        task
                    })
                    .collect();
                local
            })
            .collect();
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        entity::find(&self.cards, card_id)
    }

    fn card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        entity::find_mut(&mut self.cards, card_id)
    }

    pub fn task_count(&self) -> usize {
        self.cards.iter().map(|c| c.tasks.len()).sum()
    }

    /// Find a task's card and index. Task ids are unique across the board,
    /// so the first match is the only match.
    pub fn locate(&self, task_id: TaskId) -> Option<Located<'_>> {
        self.cards.iter().find_map(|card| {
            card.tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|index| Located {
                    task: &card.tasks[index],
                    card_id: card.id,
                    index,
                })
        })
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.locate(task_id).map(|l| l.task)
    }

    pub fn remove_task_at(&mut self, card_id: CardId, index: usize) -> Option<Task> {
        let card = self.card_mut(card_id)?;
        if index < card.tasks.len() {
            Some(card.tasks.remove(index))
        } else {
            None
        }
    }

    /// Insert at `index`, clamped to the card's length. Hands the task back
    /// when the card does not exist.
    pub fn insert_task_at(&mut self, card_id: CardId, index: usize, mut task: Task) -> Result<usize, Task> {
        match self.card_mut(card_id) {
            Some(card) => {
                let index = index.min(card.tasks.len());
                task.card_id = card_id;
                card.tasks.insert(index, task);
                Ok(index)
            }
            None => Err(task),
        }
    }

    /// Remove the task from wherever it is and insert it at
    /// `destination_index` in `destination_card`. The index is interpreted
    /// after the removal. Nothing changes when either end is missing.
    pub fn move_task(&mut self, task_id: TaskId, destination_card: CardId, destination_index: usize) -> bool {
        if self.card(destination_card).is_none() {
            return false;
        }
        let Some((source_card, source_index)) = self.locate(task_id).map(|l| (l.card_id, l.index)) else {
            return false;
        };
        let Some(task) = self.remove_task_at(source_card, source_index) else {
            return false;
        };
        match self.insert_task_at(destination_card, destination_index, task) {
            Ok(_) => true,
            Err(task) => {
                // destination vanished between the check and the insert; put it back
                let _ = self.insert_task_at(source_card, source_index, task);
                false
            }
        }
    }

    pub fn push_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn remove_card(&mut self, card_id: CardId) -> Option<Card> {
        let index = self.cards.iter().position(|c| c.id == card_id)?;
        Some(self.cards.remove(index))
    }

    pub fn append_task(&mut self, card_id: CardId, task: Task) -> bool {
        self.insert_task_at(card_id, usize::MAX, task).is_ok()
    }

    pub fn remove_task(&mut self, task_id: TaskId) -> Option<Task> {
        let (card_id, index) = self.locate(task_id).map(|l| (l.card_id, l.index))?;
        self.remove_task_at(card_id, index)
    }

    pub fn rename_task(&mut self, task_id: TaskId, name: &str) -> bool {
        self.cards
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task_id)
            .map(|t| t.name = name.to_string())
            .is_some()
    }

    /// Replace a temporary card id with the server's, re-pointing its tasks
    pub fn promote_card(&mut self, temp_id: CardId, server_id: CardId) -> bool {
        if !entity::promote(&mut self.cards, temp_id, server_id) {
            return false;
        }
        if let Some(card) = self.card_mut(server_id) {
            for task in &mut card.tasks {
                task.card_id = server_id;
            }
        }
        true
    }

    pub fn promote_task(&mut self, temp_id: TaskId, server_id: TaskId) -> bool {
        self.cards
            .iter_mut()
            .any(|card| entity::promote(&mut card.tasks, temp_id, server_id))
    }

    /// Every task id appears once and every back-reference points at the
    /// card that holds it.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        self.cards.iter().all(|card| {
            card.tasks
                .iter()
                .all(|task| task.card_id == card.id && seen.insert(task.id()))
        })
    }
}

//! Deferred one-shot actions keyed by the entity that owns them

use skirmish_scene::Entity;
use tracing::debug;

/// Handle to a scheduled task, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// What a task does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// End a hitbox's activation window
    DeactivateHitbox(Entity),
    /// Despawn an entity and its subtree
    DestroyEntity(Entity),
    /// Restore a hurtbox's tint after a damage flash
    EndFlash(Entity),
}

/// A task that came due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueTask {
    pub id: TaskId,
    pub owner: Entity,
    pub action: ScheduledAction,
}

#[derive(Debug, Clone)]
struct Task {
    id: TaskId,
    owner: Entity,
    due: f64,
    action: ScheduledAction,
}

/// Timer registry for fire-once actions.
///
/// Every task belongs to an owner entity so destroying the entity can cancel
/// whatever it still had pending.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` to fire once the clock reaches `due`
    pub fn schedule(&mut self, owner: Entity, due: f64, action: ScheduledAction) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        debug!(?id, %owner, due, ?action, "scheduled");
        self.tasks.push(Task {
            id,
            owner,
            due,
            action,
        });
        id
    }

    /// Cancel one task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }

    /// Cancel every task owned by `owner`, returning how many were dropped
    pub fn cancel_owned_by(&mut self, owner: Entity) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.owner != owner);
        before - self.tasks.len()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    /// Remove and return every task due at `now`, earliest first.
    /// Tasks due at the same instant fire in scheduling order.
    pub fn drain_due(&mut self, now: f64) -> Vec<DueTask> {
        let mut due = Vec::new();
        self.tasks.retain(|task| {
            if task.due <= now {
                due.push(task.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        due.into_iter()
            .map(|task| DueTask {
                id: task.id,
                owner: task.owner,
                action: task.action,
            })
            .collect()
    }

    /// Number of tasks still pending
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index, 0)
    }

    #[test]
    fn test_tasks_fire_once_in_due_order() {
        let mut scheduler = Scheduler::new();
        let a = entity(1);
        let b = entity(2);
        scheduler.schedule(a, 2.0, ScheduledAction::DestroyEntity(a));
        scheduler.schedule(b, 1.0, ScheduledAction::EndFlash(b));
        scheduler.schedule(a, 1.0, ScheduledAction::DeactivateHitbox(a));

        assert!(scheduler.drain_due(0.5).is_empty());

        let fired: Vec<_> = scheduler.drain_due(1.0).into_iter().map(|t| t.action).collect();
        assert_eq!(
            fired,
            vec![
                ScheduledAction::EndFlash(b),
                ScheduledAction::DeactivateHitbox(a)
            ]
        );
        assert!(scheduler.drain_due(1.5).is_empty());
        assert_eq!(scheduler.drain_due(10.0).len(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel_by_id() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(entity(1), 1.0, ScheduledAction::EndFlash(entity(1)));
        assert!(scheduler.is_pending(id));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.drain_due(5.0).is_empty());
    }

    #[test]
    fn test_cancel_owned_by_leaves_others() {
        let mut scheduler = Scheduler::new();
        let doomed = entity(1);
        let other = entity(2);
        scheduler.schedule(doomed, 1.0, ScheduledAction::EndFlash(doomed));
        scheduler.schedule(doomed, 2.0, ScheduledAction::DestroyEntity(doomed));
        let kept = scheduler.schedule(other, 1.0, ScheduledAction::EndFlash(other));

        assert_eq!(scheduler.cancel_owned_by(doomed), 2);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.is_pending(kept));
    }
}

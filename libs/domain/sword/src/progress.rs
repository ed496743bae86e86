// [libs/domain/sword/src/progress.rs]
//! Progress recomputation and the auto-completion rule (spec S4.9):
//! quest progress is the fraction of completed steps, goal progress is
//! the average of child quest progress, and a parent still `active` at
//! 100% emits `cascade_complete` rather than flipping its own status
//! here — the store runs that as a transition so it goes through the
//! same audit path as a user-initiated completion.

use novaos_models::{SideEffect, StepStatus, SwordEntityKind};
use uuid::Uuid;

pub fn recompute_quest_progress(step_statuses: &[StepStatus]) -> f32 {
    if step_statuses.is_empty() {
        return 0.0;
    }
    let completed = step_statuses.iter().filter(|status| **status == StepStatus::Completed).count();
    completed as f32 / step_statuses.len() as f32
}

pub fn recompute_goal_progress(quest_progresses: &[f32]) -> f32 {
    if quest_progresses.is_empty() {
        return 0.0;
    }
    quest_progresses.iter().sum::<f32>() / quest_progresses.len() as f32
}

/// `target`/`id` name the entity whose progress was just recomputed to
/// `progress` — not its parent. `is_active` is that same entity's
/// current status.
pub fn maybe_cascade_complete(target: SwordEntityKind, id: Uuid, is_active: bool, progress: f32) -> Option<SideEffect> {
    if is_active && progress >= 1.0 {
        Some(SideEffect::CascadeComplete { target, id })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quest_progress_is_fraction_of_completed_steps() {
        let statuses = vec![StepStatus::Completed, StepStatus::Completed, StepStatus::Pending, StepStatus::Missed];
        assert_eq!(recompute_quest_progress(&statuses), 0.5);
    }

    #[test]
    fn quest_with_no_steps_has_zero_progress() {
        assert_eq!(recompute_quest_progress(&[]), 0.0);
    }

    #[test]
    fn goal_progress_averages_quest_progress() {
        assert_eq!(recompute_goal_progress(&[1.0, 0.5, 0.0]), 0.5);
    }

    #[test]
    fn full_progress_on_active_entity_cascades() {
        let id = Uuid::new_v4();
        let effect = maybe_cascade_complete(SwordEntityKind::Quest, id, true, 1.0);
        assert_eq!(effect, Some(SideEffect::CascadeComplete { target: SwordEntityKind::Quest, id }));
    }

    #[test]
    fn full_progress_on_non_active_entity_does_not_cascade() {
        assert_eq!(maybe_cascade_complete(SwordEntityKind::Goal, Uuid::new_v4(), false, 1.0), None);
    }

    #[test]
    fn partial_progress_never_cascades() {
        assert_eq!(maybe_cascade_complete(SwordEntityKind::Quest, Uuid::new_v4(), true, 0.75), None);
    }
}

// tests/scheduler_properties.rs

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use assetflow::dag::{Scheduler, TaskId, TaskRegistry, TaskRunState};
use assetflow::engine::TaskOutcome;

proptest! {
    #[test]
    fn every_run_terminates_with_consistent_states(
        root_idx in 0..TaskId::ALL.len(),
        failing_idx in proptest::collection::vec(0..TaskId::ALL.len(), 0..4),
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..64),
    ) {
        let registry = TaskRegistry::standard().expect("standard registry");
        let plan = registry.plan(TaskId::ALL[root_idx]).expect("plan");
        let failing: HashSet<TaskId> = failing_idx.iter().map(|i| TaskId::ALL[*i]).collect();
        let mut scheduler = Scheduler::from_plan(plan.clone());

        let mut running: Vec<TaskId> = scheduler
            .start_full_run()
            .newly_scheduled
            .into_iter()
            .map(|t| t.id)
            .collect();
        let mut finished_ok: HashSet<TaskId> = HashSet::new();
        let mut started: BTreeSet<TaskId> = running.iter().copied().collect();
        let mut picks = picks.into_iter();
        let mut steps = 0;

        while !running.is_empty() {
            steps += 1;
            prop_assert!(steps <= plan.len(), "more completions than leaves");

            let idx = picks.next().map_or(0, |p| p.index(running.len()));
            let task = running.swap_remove(idx);
            let outcome = if failing.contains(&task) {
                TaskOutcome::Failed("boom".to_string())
            } else {
                finished_ok.insert(task);
                TaskOutcome::Success
            };

            for next in scheduler.step_completion(task, outcome).newly_scheduled {
                for dep in plan.dependencies_of(next.id) {
                    prop_assert!(finished_ok.contains(dep), "{} started before {}", next.id, dep);
                }
                prop_assert!(started.insert(next.id), "{} scheduled twice", next.id);
                running.push(next.id);
            }
        }

        prop_assert!(scheduler.is_idle());

        let summary = scheduler.summary();
        let accounted = summary.succeeded.len() + summary.failed.len() + summary.blocked.len();
        prop_assert_eq!(accounted, plan.len());

        for id in plan.tasks() {
            let state = scheduler.run_state_of(id);
            let expected = if !started.contains(&id) {
                TaskRunState::Blocked
            } else if failing.contains(&id) {
                TaskRunState::DoneFailed
            } else {
                TaskRunState::DoneSuccess
            };
            prop_assert_eq!(state, Some(expected), "state of {}", id);
        }

        prop_assert_eq!(summary.is_success(), plan.tasks().all(|t| !failing.contains(&t)));
    }
}

#[test]
fn completion_for_a_task_that_is_not_running_is_ignored() {
    let registry = TaskRegistry::standard().expect("standard registry");
    let mut scheduler = Scheduler::from_plan(registry.plan(TaskId::Js).expect("plan"));
    scheduler.start_full_run();

    let step = scheduler.step_completion(TaskId::JsBuild, TaskOutcome::Success);

    assert!(step.newly_scheduled.is_empty());
    assert_eq!(
        scheduler.run_state_of(TaskId::JsBuild),
        Some(TaskRunState::Pending)
    );
}

#[test]
fn history_survives_a_new_run() {
    let registry = TaskRegistry::standard().expect("standard registry");
    let mut scheduler = Scheduler::from_plan(registry.plan(TaskId::EsLint).expect("plan"));

    scheduler.start_full_run();
    let step = scheduler.step_completion(TaskId::EsLint, TaskOutcome::Failed("x".into()));
    assert!(step.run_just_finished);
    assert_eq!(scheduler.summary().failed_ids(), vec![TaskId::EsLint]);

    let second = scheduler.start_full_run();
    assert_eq!(second.newly_scheduled.len(), 1);
    assert_eq!(scheduler.current_run_id(), Some(2));
    scheduler.step_completion(TaskId::EsLint, TaskOutcome::Success);
    assert!(scheduler.summary().is_success());
}

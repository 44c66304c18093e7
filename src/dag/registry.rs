// src/dag/registry.rs

//! Static task definitions and their expansion into a [`Plan`].

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::assets::FontGroup;
use crate::dag::plan::Plan;
use crate::dag::task_id::{Action, TaskId};
use crate::errors::{AssetflowError, Result};
use crate::style::StyleEntry;

/// What a task does once its prerequisites are done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskBody {
    /// Leaf: run one action.
    Action(Action),
    /// Run sub-tasks with no ordering between them; done when all are done.
    Parallel(Vec<TaskId>),
    /// Run stages in order; each stage is a parallel group.
    Sequence(Vec<Vec<TaskId>>),
    /// Long-running source watcher.
    Watch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDef {
    /// Tasks that must complete before the body starts.
    pub prerequisites: Vec<TaskId>,
    pub body: TaskBody,
}

impl TaskDef {
    pub fn action(action: Action) -> Self {
        Self {
            prerequisites: Vec::new(),
            body: TaskBody::Action(action),
        }
    }

    pub fn parallel(tasks: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            prerequisites: Vec::new(),
            body: TaskBody::Parallel(tasks.into_iter().collect()),
        }
    }

    pub fn sequence(stages: Vec<Vec<TaskId>>) -> Self {
        Self {
            prerequisites: Vec::new(),
            body: TaskBody::Sequence(stages),
        }
    }

    pub fn after(mut self, prerequisites: impl IntoIterator<Item = TaskId>) -> Self {
        self.prerequisites.extend(prerequisites);
        self
    }

    /// Tasks this definition refers to.
    pub fn references(&self) -> Vec<TaskId> {
        let mut out = self.prerequisites.clone();
        match &self.body {
            TaskBody::Parallel(tasks) => out.extend(tasks.iter().copied()),
            TaskBody::Sequence(stages) => out.extend(stages.iter().flatten().copied()),
            TaskBody::Action(_) | TaskBody::Watch => {}
        }
        out
    }
}

/// The task graph of the theme build.
pub fn standard_defs() -> BTreeMap<TaskId, TaskDef> {
    use TaskId::*;

    BTreeMap::from([
        (Default, TaskDef::sequence(vec![vec![Components], vec![Css, Js]])),
        (
            Components,
            TaskDef::parallel([
                MoveFontAwesome,
                MoveFontSansSerif,
                MoveFontCondensed,
                MoveFontSlabSerif,
            ]),
        ),
        (
            MoveFontAwesome,
            TaskDef::action(Action::CopyFonts(FontGroup::FontAwesome)),
        ),
        (
            MoveFontSansSerif,
            TaskDef::action(Action::CopyFonts(FontGroup::SansSerif)),
        ),
        (
            MoveFontCondensed,
            TaskDef::action(Action::CopyFonts(FontGroup::Condensed)),
        ),
        (
            MoveFontSlabSerif,
            TaskDef::action(Action::CopyFonts(FontGroup::SlabSerif)),
        ),
        (Css, TaskDef::parallel([ScssLint, ScssBuild])),
        (ScssLint, TaskDef::action(Action::StyleLint)),
        (ScssBuild, TaskDef::parallel([ScssBuildThemeCss])),
        (
            ScssBuildThemeCss,
            TaskDef::action(Action::StyleBuild(StyleEntry::ThemeCss)),
        ),
        (Js, TaskDef::sequence(vec![vec![EsLint], vec![JsBuild]])),
        (EsLint, TaskDef::action(Action::ScriptLint)),
        (JsBuild, TaskDef::action(Action::ScriptBuild)),
        (
            Watch,
            TaskDef {
                prerequisites: Vec::new(),
                body: TaskBody::Watch,
            },
        ),
    ])
}

/// Validated set of task definitions.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    defs: BTreeMap<TaskId, TaskDef>,
}

/// Entry and exit leaves of an expanded task.
#[derive(Debug, Clone, Default)]
struct Expanded {
    entries: Vec<TaskId>,
    exits: Vec<TaskId>,
}

impl TaskRegistry {
    /// Validate `defs`: every referenced task must be defined and the
    /// reference graph must be acyclic.
    pub fn new(defs: BTreeMap<TaskId, TaskDef>) -> Result<Self> {
        // Edge direction: referenced task -> referencing task.
        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
        for id in defs.keys() {
            graph.add_node(*id);
        }

        for (id, def) in &defs {
            for reference in def.references() {
                if !defs.contains_key(&reference) {
                    return Err(AssetflowError::UnknownTask(format!(
                        "'{reference}' (referenced by '{id}')"
                    )));
                }
                if reference == *id {
                    return Err(AssetflowError::DagCycle(format!(
                        "task '{id}' refers to itself"
                    )));
                }
                graph.add_edge(reference, *id, ());
            }
        }

        toposort(&graph, None).map_err(|cycle| {
            AssetflowError::DagCycle(format!(
                "cycle in task graph involving task '{}'",
                cycle.node_id()
            ))
        })?;

        Ok(Self { defs })
    }

    /// The theme build's tasks.
    pub fn standard() -> Result<Self> {
        Self::new(standard_defs())
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskDef> {
        self.defs.get(&id)
    }

    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.defs.keys().copied()
    }

    /// Expand `root` into its leaf actions.
    ///
    /// Prerequisites precede the body; parallel children share the same
    /// predecessors; every leaf of a sequence stage waits for all exits of
    /// the previous stage.
    pub fn plan(&self, root: TaskId) -> Result<Plan> {
        let mut plan = Plan::new(root);
        let mut memo = HashMap::new();
        self.expand(root, &[], &mut plan, &mut memo)?;

        if !plan.is_acyclic() {
            return Err(AssetflowError::DagCycle(format!(
                "plan for '{root}' has a cycle"
            )));
        }

        debug!(task = %root, leaves = plan.len(), "expanded task plan");
        Ok(plan)
    }

    fn expand(
        &self,
        id: TaskId,
        after: &[TaskId],
        plan: &mut Plan,
        memo: &mut HashMap<TaskId, Expanded>,
    ) -> Result<Vec<TaskId>> {
        if let Some(done) = memo.get(&id) {
            // Already in the plan: later callers also gate its entries.
            let done = done.clone();
            for entry in &done.entries {
                if let Some(action) = plan.action_of(*entry) {
                    plan.add_node(*entry, action, after);
                }
            }
            return Ok(if done.exits.is_empty() {
                after.to_vec()
            } else {
                done.exits
            });
        }

        let def = self
            .defs
            .get(&id)
            .ok_or_else(|| AssetflowError::UnknownTask(id.to_string()))?;

        let mut entries = Vec::new();
        let mut gate = after.to_vec();
        if !def.prerequisites.is_empty() {
            let before = plan.tasks().collect::<Vec<_>>();
            let mut exits = Vec::new();
            for pre in &def.prerequisites {
                exits.extend(self.expand(*pre, after, plan, memo)?);
            }
            entries.extend(plan.tasks().filter(|t| !before.contains(t)));
            dedup(&mut exits);
            gate = exits;
        }

        let before_body = plan.tasks().collect::<Vec<_>>();
        let exits = match &def.body {
            TaskBody::Action(action) => {
                plan.add_node(id, *action, &gate);
                vec![id]
            }
            TaskBody::Parallel(children) => {
                let mut exits = Vec::new();
                for child in children {
                    exits.extend(self.expand(*child, &gate, plan, memo)?);
                }
                exits
            }
            TaskBody::Sequence(stages) => {
                let mut stage_gate = gate.clone();
                for stage in stages {
                    let mut exits = Vec::new();
                    for child in stage {
                        exits.extend(self.expand(*child, &stage_gate, plan, memo)?);
                    }
                    dedup(&mut exits);
                    if !exits.is_empty() {
                        stage_gate = exits;
                    }
                }
                stage_gate
            }
            TaskBody::Watch => {
                plan.set_watch();
                gate.clone()
            }
        };

        if def.prerequisites.is_empty() {
            entries.extend(plan.tasks().filter(|t| !before_body.contains(t)));
        }

        let mut exits = if exits.is_empty() { gate } else { exits };
        dedup(&mut exits);

        memo.insert(
            id,
            Expanded {
                entries,
                exits: exits.clone(),
            },
        );
        Ok(exits)
    }
}

fn dedup(ids: &mut Vec<TaskId>) {
    ids.sort();
    ids.dedup();
}

//! Plan model definition and flattening into trackable tasks.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// A generated action plan: a goal and its ordered stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// The goal the plan works toward
    pub goal: String,

    /// Ordered top-level stages
    pub stages: Vec<Stage>,
}

/// A top-level unit of a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    /// Short human-readable label, e.g. "Week 1"
    pub label: String,

    /// What has to be done during the stage
    pub description: String,

    /// Due date of the stage; only meaningful when it has no substages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Date>,

    /// Leaf sub-units of the stage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substages: Vec<Substage>,
}

/// A leaf sub-unit of a stage with its own due date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Substage {
    /// Short human-readable label
    pub label: String,

    /// What has to be done
    pub description: String,

    /// Due date of the substage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Date>,
}

/// One entry of the flattened task list: either a leaf stage or a substage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTask<'a> {
    /// Position in the flattened list
    pub index: usize,
    /// Zero-based index of the owning stage
    pub stage_index: usize,
    /// The owning stage
    pub stage: &'a Stage,
    /// The substage, when the stage is split into substages
    pub substage: Option<&'a Substage>,
}

impl<'a> FlatTask<'a> {
    /// Label of the leaf item.
    pub fn label(&self) -> &'a str {
        self.substage.map_or(&self.stage.label, |s| &s.label)
    }

    /// Description of the leaf item.
    pub fn description(&self) -> &'a str {
        self.substage
            .map_or(&self.stage.description, |s| &s.description)
    }

    /// Due date declared by the plan for the leaf item.
    pub fn due(&self) -> Option<Date> {
        match self.substage {
            Some(sub) => sub.due,
            None => self.stage.due,
        }
    }
}

impl Plan {
    /// Flattens the plan into its leaf tasks in declaration order.
    pub fn tasks(&self) -> Vec<FlatTask<'_>> {
        let mut tasks = Vec::with_capacity(self.task_count());
        for (stage_index, stage) in self.stages.iter().enumerate() {
            if stage.substages.is_empty() {
                tasks.push(FlatTask {
                    index: tasks.len(),
                    stage_index,
                    stage,
                    substage: None,
                });
            } else {
                for substage in &stage.substages {
                    tasks.push(FlatTask {
                        index: tasks.len(),
                        stage_index,
                        stage,
                        substage: Some(substage),
                    });
                }
            }
        }
        tasks
    }

    /// Number of leaf tasks in the plan.
    pub fn task_count(&self) -> usize {
        self.stages
            .iter()
            .map(|stage| stage.substages.len().max(1))
            .sum()
    }

    /// Returns the flattened task at `index`.
    pub fn task(&self, index: usize) -> Option<FlatTask<'_>> {
        self.tasks().into_iter().nth(index)
    }
}

use serde::{Deserialize, Serialize};

/// A phased plan drafted by the generative service. Never merged into a
/// project's task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// Human-readable, e.g. "30 days"
    pub duration: String,
    pub tasks: Vec<String>,
}

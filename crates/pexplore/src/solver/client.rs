//! Solver client trait and wire types

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::SolverError;

/// Treat an explicit `null` like an omitted field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One satisfying assignment, in three aligned encodings
///
/// All three encodings describe the same assignment under the variable
/// ordering that was current when the solution was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExampleSolution {
    /// Integer labels of the accepting path
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_int: Vec<i64>,
    /// Bit-string labels of the accepting path
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_bits: Vec<String>,
    /// Variables in the order used by this solution
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<String>,
    /// Per-variable bit-string value
    #[serde(default, deserialize_with = "null_as_default")]
    pub var_bits: BTreeMap<String, String>,
    /// Per-variable integer value
    #[serde(default, deserialize_with = "null_as_default")]
    pub var_ints: BTreeMap<String, i64>,
}

impl ExampleSolution {
    /// Render as `x = 3, y = 5` following the solution's own variable order
    pub fn assignment(&self) -> String {
        self.variables
            .iter()
            .map(|var| match self.var_ints.get(var) {
                Some(value) => format!("{} = {}", var, value),
                None => format!("{} = ?", var),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Request body for `POST /automaton/dot`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub formula: String,
    pub display_labels: bool,
    pub display_atomic_construction: bool,
}

/// Response body for `POST /automaton/dot`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildResponse {
    #[serde(default)]
    pub dot: String,
    #[serde(default)]
    pub mata: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub example_solutions: Vec<ExampleSolution>,
    #[serde(default)]
    pub num_states: usize,
    #[serde(default)]
    pub num_final_states: usize,
}

/// Request body for `POST /automaton/reorder`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub aut: String,
    pub k_solutions: usize,
    pub original_variable_order: Vec<String>,
    pub new_variable_order: Vec<String>,
    pub display_labels: bool,
    pub display_atomic_construction: bool,
    /// Only sent in atomic-construction mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

/// Response body for `POST /automaton/reorder`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorderResponse {
    /// `None` (null or omitted) leaves the current diagram untouched
    #[serde(default)]
    pub dot: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reordered_solutions: Vec<ExampleSolution>,
}

/// Request body for `POST /automaton/solutions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionsRequest {
    pub aut: String,
    /// Target total rank, not a delta
    pub k_solutions: usize,
    pub original_variable_order: Vec<String>,
    pub new_variable_order: Vec<String>,
    pub display_atomic_construction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

/// Response body for `POST /automaton/solutions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionsResponse {
    /// Only the solutions beyond what the client already holds
    #[serde(default, deserialize_with = "null_as_default")]
    pub example_solutions: Vec<ExampleSolution>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub solution_set_full: bool,
}

/// Trait for solver clients
///
/// The solver is stateless: every request carries the serialized automaton
/// and both variable orderings it needs.
#[async_trait]
pub trait SolverClient: Send + Sync {
    /// Build an automaton from formula text
    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse, SolverError>;

    /// Recompute diagram and solutions under a new variable order
    async fn reorder(&self, request: &ReorderRequest) -> Result<ReorderResponse, SolverError>;

    /// Fetch solutions up to a target total rank
    async fn solutions(&self, request: &SolutionsRequest)
        -> Result<SolutionsResponse, SolverError>;
}

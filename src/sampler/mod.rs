//! Sampler trait and the durable trial record.
//!
//! The crate only depends on a minimal contract with the search algorithm:
//! "suggest a value for this distribution" ([`Sampler::sample`]) and "here
//! is everything observed so far" (the history slice passed alongside).
//! Completed trials become visible to the sampler on the next trial;
//! failed trials appear in the history with no value, and informed samplers
//! are expected to filter on [`TrialState::Complete`].

pub mod random;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::param::ParamValue;
use crate::parameter::Parameter;
use crate::trial::AttrValue;
use crate::types::TrialState;

/// A finished trial as recorded in storage.
///
/// Parameters are stored in suggestion order, keyed by name, alongside the
/// distributions they were drawn from. A completed trial carries its score
/// in `value`; a failed trial carries `None` and the triggering error text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialRecord {
    /// The unique identifier for this trial.
    pub id: u64,
    /// The sampled parameter values, in suggestion order.
    pub params: Vec<(String, ParamValue)>,
    /// The parameter distributions used, keyed by parameter name.
    pub distributions: HashMap<String, Distribution>,
    /// The aggregated objective value, absent for failed trials.
    pub value: Option<f64>,
    /// Whether the trial completed or failed.
    pub state: TrialState,
    /// User-defined attributes stored during the trial.
    #[serde(default)]
    pub user_attrs: HashMap<String, AttrValue>,
    /// The error that failed the trial, if any.
    #[serde(default)]
    pub error: Option<String>,
}

impl TrialRecord {
    /// Creates a record for a completed trial.
    #[must_use]
    pub fn new(
        id: u64,
        params: Vec<(String, ParamValue)>,
        distributions: HashMap<String, Distribution>,
        value: f64,
    ) -> Self {
        Self {
            id,
            params,
            distributions,
            value: Some(value),
            state: TrialState::Complete,
            user_attrs: HashMap::new(),
            error: None,
        }
    }

    /// Returns the raw value recorded for the named parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns the typed value for the given parameter.
    ///
    /// Returns `None` if the parameter was not used in this trial.
    ///
    /// # Panics
    ///
    /// Panics if the stored value is incompatible with the parameter type
    /// (e.g., a `Float` value stored for an `IntParam`). This indicates
    /// a bug in the program, not a runtime error.
    pub fn get<P: Parameter>(&self, param: &P) -> Option<P::Value> {
        self.param(param.name()).map(|v| {
            param
                .cast_param_value(v)
                .expect("parameter type mismatch: stored value incompatible with parameter")
        })
    }

    /// Whether the trial completed with a score.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == TrialState::Complete
    }

    /// Gets a user attribute by key.
    #[must_use]
    pub fn user_attr(&self, key: &str) -> Option<&AttrValue> {
        self.user_attrs.get(key)
    }
}

/// Strategy for choosing the next value of a search dimension.
///
/// Implementations must be `Send + Sync`: the trial history they receive
/// is shared with the study's storage backend.
pub trait Sampler: Send + Sync {
    /// Samples a value from the given distribution.
    ///
    /// `history` holds every record of the study so far, in completion
    /// order; it is how observed scores flow back into the search.
    fn sample(
        &self,
        distribution: &Distribution,
        trial_id: u64,
        history: &[TrialRecord],
    ) -> ParamValue;
}

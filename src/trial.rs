//! Trial implementation for tracking sampled parameters and trial state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::parameter::Parameter;
use crate::sampler::{Sampler, TrialRecord};
use crate::types::TrialState;

/// A user-defined attribute value attached to a trial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// A boolean attribute.
    Bool(bool),
    /// An integer attribute.
    Int(i64),
    /// A floating-point attribute.
    Float(f64),
    /// A string attribute.
    Str(String),
}

/// A trial represents a single evaluation of the objective.
///
/// Each trial has a unique ID and stores the sampled parameters, keyed by
/// name, along with their distributions. Trials created through
/// [`Study::create_trial`](crate::Study::create_trial) receive the study's
/// sampler and access to the history of recorded trials for informed
/// sampling.
#[derive(Clone)]
pub struct Trial {
    id: u64,
    /// Sampled parameter values, in suggestion order.
    params: Vec<(String, ParamValue)>,
    /// Parameter distributions, keyed by name.
    distributions: HashMap<String, Distribution>,
    /// User-defined attributes.
    user_attrs: HashMap<String, AttrValue>,
    /// The sampler to use for generating parameter values.
    sampler: Option<Arc<dyn Sampler>>,
    /// Access to the history of recorded trials (shared with the study).
    history: Option<Arc<RwLock<Vec<TrialRecord>>>>,
}

impl core::fmt::Debug for Trial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Trial")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("distributions", &self.distributions)
            .field("user_attrs", &self.user_attrs)
            .field("has_sampler", &self.sampler.is_some())
            .field("has_history", &self.history.is_some())
            .finish()
    }
}

impl Trial {
    /// Creates a new trial with the given ID.
    ///
    /// This constructor creates a trial without a sampler; suggestions fall
    /// back to local random sampling. Trials that use the study's sampler
    /// are created through [`Study::create_trial`](crate::Study::create_trial).
    ///
    /// # Examples
    ///
    /// ```
    /// use tuner::Trial;
    ///
    /// let trial = Trial::new(0);
    /// assert_eq!(trial.id(), 0);
    /// ```
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            params: Vec::new(),
            distributions: HashMap::new(),
            user_attrs: HashMap::new(),
            sampler: None,
            history: None,
        }
    }

    /// Creates a new trial with a sampler and access to trial history.
    pub(crate) fn with_sampler(
        id: u64,
        sampler: Arc<dyn Sampler>,
        history: Arc<RwLock<Vec<TrialRecord>>>,
    ) -> Self {
        Self {
            id,
            params: Vec::new(),
            distributions: HashMap::new(),
            user_attrs: HashMap::new(),
            sampler: Some(sampler),
            history: Some(history),
        }
    }

    /// Samples a value from the given distribution using the sampler.
    fn sample_value(&self, distribution: &Distribution) -> ParamValue {
        if let (Some(sampler), Some(history)) = (&self.sampler, &self.history) {
            let history_guard = history.read();
            sampler.sample(distribution, self.id, &history_guard)
        } else {
            // Fallback to RandomSampler when no sampler is configured
            use crate::sampler::random::RandomSampler;
            let fallback = RandomSampler::new();
            fallback.sample(distribution, self.id, &[])
        }
    }

    /// Returns the unique ID of this trial.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the sampled parameters, in suggestion order.
    #[must_use]
    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    /// Returns the parameter distributions, keyed by name.
    #[must_use]
    pub fn distributions(&self) -> &HashMap<String, Distribution> {
        &self.distributions
    }

    /// Stores a user-defined attribute on this trial.
    ///
    /// Attributes are persisted with the trial record. The objective uses
    /// this to record values that are observed rather than sampled, such as
    /// a discovered learning rate.
    pub fn set_user_attr(&mut self, key: impl Into<String>, value: AttrValue) {
        self.user_attrs.insert(key.into(), value);
    }

    /// Suggests a parameter value using a [`Parameter`] definition.
    ///
    /// This is the primary entry point for sampling parameters. It handles
    /// validation, caching, conflict detection, sampling, and conversion.
    /// Suggesting the same name with the same distribution again returns
    /// the cached value.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parameter fails validation
    /// - The name was previously suggested with a different distribution
    /// - Sampling or conversion fails
    pub fn suggest_param<P: Parameter>(&mut self, param: &P) -> Result<P::Value> {
        param.validate()?;

        let name = param.name();
        let distribution = param.distribution();

        // Check if the name was already suggested
        if let Some(existing_dist) = self.distributions.get(name) {
            if *existing_dist == distribution {
                if let Some(value) = self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v) {
                    return param.cast_param_value(value);
                }
            }
            return Err(Error::ParameterConflict {
                name: name.to_string(),
                reason: "parameter was previously sampled with different configuration or type"
                    .to_string(),
            });
        }

        let value = self.sample_value(&distribution);
        let result = param.cast_param_value(&value)?;

        self.distributions.insert(name.to_string(), distribution);
        self.params.push((name.to_string(), value));

        Ok(result)
    }

    /// Consumes the trial into a durable record.
    pub(crate) fn into_record(
        self,
        value: Option<f64>,
        state: TrialState,
        error: Option<String>,
    ) -> TrialRecord {
        TrialRecord {
            id: self.id,
            params: self.params,
            distributions: self.distributions,
            value,
            state,
            user_attrs: self.user_attrs,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{FloatParam, IntParam};

    #[test]
    fn params_keep_suggestion_order() {
        let mut trial = Trial::new(0);
        let _ = IntParam::new("first", 1, 5).suggest(&mut trial).unwrap();
        let _ = FloatParam::new("second", 0.0, 1.0)
            .suggest(&mut trial)
            .unwrap();

        let names: Vec<&str> = trial.params().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn user_attrs_survive_into_record() {
        let mut trial = Trial::new(3);
        trial.set_user_attr("learning_rate", AttrValue::Float(0.01));

        let record = trial.into_record(Some(1.0), TrialState::Complete, None);
        assert_eq!(record.id, 3);
        assert_eq!(
            record.user_attr("learning_rate"),
            Some(&AttrValue::Float(0.01))
        );
    }

    #[test]
    fn failed_record_has_no_value() {
        let trial = Trial::new(1);
        let record = trial.into_record(None, TrialState::Failed, Some("boom".to_string()));
        assert_eq!(record.value, None);
        assert_eq!(record.state, TrialState::Failed);
        assert_eq!(record.error.as_deref(), Some("boom"));
    }
}

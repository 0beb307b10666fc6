#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]

//! Hyperparameter search orchestration for an external forecasting trainer.
//!
//! The trainer is a black box: a CLI that takes `--flag value` pairs and
//! prints a validation score as the last non-empty line of stdout. This
//! crate owns everything around it: running several independent trainings
//! per trial as concurrent processes, capturing each process's terminal
//! score, averaging them, tolerating diverged runs, and journaling the
//! study so it can be resumed after an interruption.
//!
//! # Getting Started
//!
//! ```no_run
//! use tuner::objective::{ModelClass, ObjectiveConfig, TrainerObjective};
//! use tuner::runner::ProcessRunner;
//! use tuner::sampler::random::RandomSampler;
//! use tuner::{Study, TrialExecutor};
//!
//! # async fn example() -> tuner::Result<()> {
//! let objective = TrainerObjective::new(
//!     ObjectiveConfig {
//!         program: "tpk".to_string(),
//!         model_class: ModelClass::TsMixer,
//!         data_path: "data/m5".into(),
//!         tests_per_trial: 3,
//!         use_lr_finder: true,
//!         use_one_cycle: true,
//!         batch_size: 64,
//!     },
//!     TrialExecutor::new(ProcessRunner::new()),
//! )?;
//!
//! let study = Study::open("studies", "m5_tsmixer", RandomSampler::new())?;
//! study.run(100, &objective).await?;
//! println!("best score: {}", study.best_value()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Study`] | Drive the sequential search loop, own the durable journal, decide which failures are recoverable. |
//! | [`TrainerObjective`](objective::TrainerObjective) | Map a sampler draw to trainer command lines, optionally discovering the learning rate first. |
//! | [`TrialExecutor`] | Run one trial's repetitions as concurrent processes and average their scores. |
//! | [`ProcessRunner`](runner::ProcessRunner) | Run one trainer process and extract its terminal score. |
//! | [`Sampler`](sampler::Sampler) | Strategy for choosing the next point to evaluate. |
//!
//! # Failure model
//!
//! A repetition that prints a non-numeric final line (or none at all) fails
//! its whole trial; partial averages are never reported. A failed trial is
//! journaled and skipped; the study carries on. Configuration errors, spawn
//! failures, and storage errors abort the study.

pub mod distribution;
mod error;
pub mod executor;
pub mod invocation;
pub mod objective;
pub mod param;
pub mod parameter;
mod rng_util;
pub mod runner;
pub mod sampler;
pub mod storage;
mod study;
mod trial;
mod types;

pub use error::{Error, Result};
pub use executor::TrialExecutor;
pub use invocation::Invocation;
pub use study::{Study, StudyBuilder};
pub use trial::{AttrValue, Trial};
pub use types::{Direction, StudyState, TrialState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use tuner::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::executor::TrialExecutor;
    pub use crate::invocation::Invocation;
    pub use crate::objective::{ModelClass, ObjectiveConfig, TrainerObjective};
    pub use crate::param::ParamValue;
    pub use crate::parameter::{BoolParam, CategoricalParam, FloatParam, IntParam, Parameter};
    pub use crate::runner::ProcessRunner;
    pub use crate::sampler::random::RandomSampler;
    pub use crate::sampler::{Sampler, TrialRecord};
    pub use crate::storage::{JournalStorage, MemoryStorage, Storage};
    pub use crate::study::{Study, StudyBuilder};
    pub use crate::trial::{AttrValue, Trial};
    pub use crate::types::{Direction, StudyState, TrialState};
}

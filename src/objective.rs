//! The trainer objective: search space, command rendering, and evaluation.
//!
//! Each trial draws one value per search dimension, renders the draw into a
//! trainer command line, and hands the command to the
//! [`TrialExecutor`](crate::TrialExecutor) for its repeated runs. With
//! learning-rate discovery enabled, a single-repetition `find-lr` run is
//! executed first and its result spliced into the training command.

use core::fmt;
use core::str::FromStr;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::executor::TrialExecutor;
use crate::invocation::Invocation;
use crate::parameter::{CategoricalParam, FloatParam, IntParam, Parameter};
use crate::trial::{AttrValue, Trial};

/// The model family the external trainer should fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelClass {
    /// An MLP-mixer style forecaster.
    TsMixer,
    /// An autoregressive RNN forecaster.
    DeepAr,
}

impl ModelClass {
    /// The selector string understood by the trainer's `--model-cls` flag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModelClass::TsMixer => "tsmixer",
            ModelClass::DeepAr => "deepar",
        }
    }
}

impl FromStr for ModelClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tsmixer" => Ok(ModelClass::TsMixer),
            "deepar" => Ok(ModelClass::DeepAr),
            other => Err(Error::UnknownModelClass(other.to_string())),
        }
    }
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to turn a parameter draw into trainer commands.
///
/// All knobs are explicit; nothing is read from process-wide defaults.
#[derive(Clone, Debug)]
pub struct ObjectiveConfig {
    /// The trainer executable.
    pub program: String,
    /// Which model family to train.
    pub model_class: ModelClass,
    /// Path handed to the trainer's dataset pipeline.
    pub data_path: PathBuf,
    /// How many independent trainings to average per trial.
    pub tests_per_trial: usize,
    /// Discover the learning rate with a `find-lr` sub-run instead of
    /// sampling it.
    pub use_lr_finder: bool,
    /// Whether the trainer should use one-cycle scheduling.
    pub use_one_cycle: bool,
    /// Training batch size, passed through unsampled.
    pub batch_size: u32,
}

/// One sampled hyperparameter assignment, fixed once drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialConfig {
    /// Input window length.
    pub context_length: i64,
    /// Number of mixer blocks.
    pub n_blocks: i64,
    /// Hidden layer width.
    pub hidden_size: i64,
    /// L2 regularisation strength.
    pub weight_decay: f64,
    /// Dropout probability.
    pub dropout_rate: f64,
    /// Training epoch budget.
    pub epochs: i64,
    /// Learning rate; `None` until sampled or discovered.
    pub learning_rate: Option<f64>,
}

/// Maps sampler draws to trainer invocations and evaluates them.
pub struct TrainerObjective {
    config: ObjectiveConfig,
    executor: TrialExecutor,
    context_length: CategoricalParam<i64>,
    n_blocks: IntParam,
    hidden_size: CategoricalParam<i64>,
    weight_decay: FloatParam,
    dropout_rate: FloatParam,
    epochs: IntParam,
    learning_rate: FloatParam,
}

impl TrainerObjective {
    /// Creates the objective, fixing the search dimensions for the study.
    ///
    /// The whole configuration is validated here, before any process
    /// spawns: an invalid search space or a zero repetition count never
    /// costs compute.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRepetitions`](Error::InvalidRepetitions) when
    /// `tests_per_trial` is zero, or a parameter validation error if a
    /// dimension is misconfigured.
    pub fn new(config: ObjectiveConfig, executor: TrialExecutor) -> Result<Self> {
        if config.tests_per_trial == 0 {
            return Err(Error::InvalidRepetitions);
        }

        let objective = Self {
            config,
            executor,
            context_length: CategoricalParam::new("context_length", vec![20, 35, 50]),
            n_blocks: IntParam::new("n_block", 1, 5),
            hidden_size: CategoricalParam::new("hidden_size", vec![64, 128, 256, 512]),
            weight_decay: FloatParam::new("weight_decay", 1e-4, 0.5).log_scale(),
            dropout_rate: FloatParam::new("dropout_rate", 1e-4, 0.5).log_scale(),
            epochs: IntParam::new("num_epochs", 5, 50),
            learning_rate: FloatParam::new("learning_rate", 1e-4, 0.5).log_scale(),
        };
        objective.validate()?;
        Ok(objective)
    }

    fn validate(&self) -> Result<()> {
        self.context_length.validate()?;
        self.n_blocks.validate()?;
        self.hidden_size.validate()?;
        self.weight_decay.validate()?;
        self.dropout_rate.validate()?;
        self.epochs.validate()?;
        self.learning_rate.validate()
    }

    /// The configured repetition count.
    #[must_use]
    pub fn tests_per_trial(&self) -> usize {
        self.config.tests_per_trial
    }

    /// Draws one value per dimension, leaving the learning rate open.
    fn suggest_config(&self, trial: &mut Trial) -> Result<TrialConfig> {
        Ok(TrialConfig {
            context_length: self.context_length.suggest(trial)?,
            n_blocks: self.n_blocks.suggest(trial)?,
            hidden_size: self.hidden_size.suggest(trial)?,
            weight_decay: self.weight_decay.suggest(trial)?,
            dropout_rate: self.dropout_rate.suggest(trial)?,
            epochs: self.epochs.suggest(trial)?,
            learning_rate: None,
        })
    }

    /// Renders the shared flag block behind a trainer subcommand.
    fn render(&self, command: &str, config: &TrialConfig) -> Invocation {
        let mut invocation = Invocation::new(&self.config.program)
            .arg(command)
            .flag("model-cls", self.config.model_class)
            .flag("data-path", self.config.data_path.display())
            .flag("context-length", config.context_length)
            .flag("n-block", config.n_blocks)
            .flag("hidden-size", config.hidden_size)
            .flag("weight-decay", config.weight_decay)
            .flag("dropout-rate", config.dropout_rate)
            .flag("batch-size", self.config.batch_size)
            .flag("epochs", config.epochs);
        if let Some(lr) = config.learning_rate {
            invocation = invocation.flag("lr", lr);
        }
        invocation
    }

    fn render_find_lr(&self, config: &TrialConfig) -> Invocation {
        self.render("find-lr", config)
    }

    fn render_train(&self, config: &TrialConfig) -> Invocation {
        let mut invocation = self.render("train-model", config);
        if !self.config.use_one_cycle {
            invocation = invocation.switch("no-use-one-cycle");
        }
        invocation
    }

    /// Evaluates one trial: draw, optionally discover the learning rate,
    /// then run the training command `tests_per_trial` times and average.
    ///
    /// # Errors
    ///
    /// Returns [`TrialFailed`](Error::TrialFailed) when any repetition of
    /// the training run (or the learning-rate discovery run) fails;
    /// configuration and spawn errors propagate unchanged.
    pub async fn evaluate(&self, trial: &mut Trial) -> Result<f64> {
        let mut config = self.suggest_config(trial)?;
        trial.set_user_attr("use_one_cycle", AttrValue::Bool(self.config.use_one_cycle));

        if self.config.use_lr_finder {
            let find_lr = self.render_find_lr(&config);
            tracing::info!(trial_id = trial.id(), "running learning-rate discovery: {find_lr}");
            let lr = self.executor.execute(&find_lr, 1).await?;
            trial.set_user_attr("learning_rate", AttrValue::Float(lr));
            config.learning_rate = Some(lr);
        } else {
            config.learning_rate = Some(self.learning_rate.suggest(trial)?);
        }

        let train = self.render_train(&config);
        tracing::info!(trial_id = trial.id(), "running trial: {train}");
        self.executor
            .execute(&train, self.config.tests_per_trial)
            .await
    }
}

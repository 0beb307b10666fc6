//! A rendered trainer command.

use core::fmt;

/// An executable path plus an ordered sequence of arguments.
///
/// Invocations are plain values derived deterministically from a trial
/// configuration; they share no state with the processes they describe.
/// Hyperparameters render as long-form `--name value` flags; negative
/// boolean switches render bare.
///
/// # Examples
///
/// ```
/// use tuner::Invocation;
///
/// let inv = Invocation::new("tpk")
///     .arg("train-model")
///     .flag("n-block", 3)
///     .switch("no-use-one-cycle");
/// assert_eq!(inv.args(), ["train-model", "--n-block", "3", "--no-use-one-cycle"]);
/// assert_eq!(inv.to_string(), "tpk train-model --n-block 3 --no-use-one-cycle");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation of the given executable with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a `--name value` flag pair.
    #[must_use]
    pub fn flag(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.args.push(format!("--{name}"));
        self.args.push(value.to_string());
        self
    }

    /// Appends a bare `--name` switch.
    #[must_use]
    pub fn switch(mut self, name: &str) -> Self {
        self.args.push(format!("--{name}"));
        self
    }

    /// The executable to run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The ordered argument list.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_renders_name_value_pair() {
        let inv = Invocation::new("trainer").flag("hidden-size", 256);
        assert_eq!(inv.args(), ["--hidden-size", "256"]);
    }

    #[test]
    fn switch_renders_bare_flag() {
        let inv = Invocation::new("trainer").switch("no-use-one-cycle");
        assert_eq!(inv.args(), ["--no-use-one-cycle"]);
    }

    #[test]
    fn float_flags_render_in_decimal() {
        let inv = Invocation::new("trainer").flag("weight-decay", 0.125);
        assert_eq!(inv.args(), ["--weight-decay", "0.125"]);
    }

    #[test]
    fn display_joins_program_and_args() {
        let inv = Invocation::new("echo").arg("1");
        assert_eq!(inv.to_string(), "echo 1");
    }
}

//! Runs a short study against a stub trainer script.
//!
//! The stub stands in for the real trainer CLI: it ignores its
//! hyperparameter flags and prints a fake validation score as its last
//! line, which is all the orchestrator requires of a trainer.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tuner::objective::{ModelClass, ObjectiveConfig, TrainerObjective};
use tuner::runner::ProcessRunner;
use tuner::sampler::random::RandomSampler;
use tuner::{Study, TrialExecutor};

fn write_stub_trainer(dir: &std::path::Path) -> std::io::Result<PathBuf> {
    let path = dir.join("stub-trainer.sh");
    std::fs::write(
        &path,
        "#!/bin/sh\necho \"epoch 1/1: fitting\"\necho \"0.$$\"\n",
    )?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

#[tokio::main]
async fn main() -> tuner::Result<()> {
    tracing_subscriber::fmt().init();

    let dir = std::env::temp_dir().join("tuner-demo");
    std::fs::create_dir_all(&dir)
        .map_err(|e| tuner::Error::Storage(format!("{}: {e}", dir.display())))?;
    let trainer = write_stub_trainer(&dir)
        .map_err(|e| tuner::Error::Storage(format!("{}: {e}", dir.display())))?;

    let objective = TrainerObjective::new(
        ObjectiveConfig {
            program: trainer.to_string_lossy().into_owned(),
            model_class: ModelClass::TsMixer,
            data_path: "data/m5".into(),
            tests_per_trial: 3,
            use_lr_finder: false,
            use_one_cycle: true,
            batch_size: 64,
        },
        TrialExecutor::new(ProcessRunner::new()),
    )?;

    let study = Study::open(&dir, "demo", RandomSampler::new())?;
    study.run(5, &objective).await?;

    let best = study.best_trial()?;
    println!(
        "best trial {} scored {:.4} (journal: {})",
        best.id,
        study.best_value()?,
        dir.join("demo.jsonl").display()
    );
    Ok(())
}

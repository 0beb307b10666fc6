//! End-to-end study runs against stub trainer scripts.

#![cfg(unix)]

use core::time::Duration;
use std::path::{Path, PathBuf};

use tuner::objective::{ModelClass, ObjectiveConfig, TrainerObjective};
use tuner::runner::ProcessRunner;
use tuner::sampler::random::RandomSampler;
use tuner::{AttrValue, Study, StudyState, TrialExecutor, TrialState};

fn temp_dir(tag: &str) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut path = std::env::temp_dir();
    path.push(format!(
        "tuner_study_test_{tag}_{}_{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&path).unwrap();
    path
}

fn write_script(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("trainer.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn objective(program: &Path, tests_per_trial: usize, use_lr_finder: bool) -> TrainerObjective {
    TrainerObjective::new(
        ObjectiveConfig {
            program: program.to_str().unwrap().to_string(),
            model_class: ModelClass::TsMixer,
            data_path: "data/m5".into(),
            tests_per_trial,
            use_lr_finder,
            use_one_cycle: true,
            batch_size: 64,
        },
        TrialExecutor::new(ProcessRunner::new()).with_stagger(Duration::from_millis(1)),
    )
    .unwrap()
}

#[tokio::test]
async fn single_trial_study_journals_its_score() {
    let dir = temp_dir("single");
    let script = write_script(&dir, "echo 1\n");
    let study = Study::open(&dir, "test_study", RandomSampler::with_seed(7)).unwrap();
    assert_eq!(study.state(), StudyState::Created);

    study.run(1, &objective(&script, 1, false)).await.unwrap();

    assert_eq!(study.state(), StudyState::Exhausted);
    assert!(dir.join("test_study.jsonl").exists());

    let trials = study.trials();
    assert_eq!(trials.len(), 1);
    assert_eq!(trials[0].value, Some(1.0));
    assert_eq!(trials[0].state, TrialState::Complete);
    // The sampled assignment is journaled alongside the score.
    assert!(trials[0].param("context_length").is_some());
    assert!(trials[0].param("learning_rate").is_some());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn failed_trial_is_recorded_and_study_continues() {
    let dir = temp_dir("skip");
    let counter = dir.join("count");
    // The second training run prints garbage, as a diverging model would.
    let script = write_script(
        &dir,
        &format!(
            "n=$(cat \"{counter}\" 2>/dev/null || echo 0)\n\
             n=$((n + 1))\n\
             echo \"$n\" > \"{counter}\"\n\
             if [ \"$n\" -eq 2 ]; then echo diverged; else echo 1.0; fi\n",
            counter = counter.display()
        ),
    );

    let study = Study::open(&dir, "flaky", RandomSampler::with_seed(3)).unwrap();
    study.run(3, &objective(&script, 1, false)).await.unwrap();

    assert_eq!(study.state(), StudyState::Exhausted);
    let trials = study.trials();
    assert_eq!(trials.len(), 3);
    assert_eq!(trials[0].state, TrialState::Complete);
    assert_eq!(trials[1].state, TrialState::Failed);
    assert_eq!(trials[1].value, None);
    assert!(trials[1].error.as_deref().unwrap().contains("diverged"));
    assert_eq!(trials[2].state, TrialState::Complete);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn study_resumes_from_its_journal() {
    let dir = temp_dir("resume");
    let script = write_script(&dir, "echo 2.5\n");

    {
        let study = Study::open(&dir, "resumable", RandomSampler::with_seed(1)).unwrap();
        study.run(2, &objective(&script, 1, false)).await.unwrap();
        assert_eq!(study.n_trials(), 2);
    }

    // A fresh open replays the journal and continues where it stopped.
    let study = Study::open(&dir, "resumable", RandomSampler::with_seed(2)).unwrap();
    assert_eq!(study.n_trials(), 2);
    let before: Vec<u64> = study.trials().iter().map(|t| t.id).collect();

    study.run(2, &objective(&script, 1, false)).await.unwrap();

    let trials = study.trials();
    assert_eq!(trials.len(), 4);
    let first_two: Vec<u64> = trials.iter().take(2).map(|t| t.id).collect();
    assert_eq!(first_two, before);
    let mut ids: Vec<u64> = trials.iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn discovered_learning_rate_reaches_the_training_command() {
    let dir = temp_dir("lr_finder");
    // `find-lr` reports a rate; the training run echoes back whatever
    // `--lr` it was given, so the score proves the splice happened.
    let script = write_script(
        &dir,
        "cmd=\"$1\"; shift\n\
         lr=\"\"\n\
         while [ $# -gt 0 ]; do\n\
         \tif [ \"$1\" = \"--lr\" ]; then lr=\"$2\"; fi\n\
         \tshift\n\
         done\n\
         if [ \"$cmd\" = \"find-lr\" ]; then echo 0.25; else echo \"$lr\"; fi\n",
    );

    let study = Study::open(&dir, "lr_study", RandomSampler::with_seed(11)).unwrap();
    study.run(1, &objective(&script, 1, true)).await.unwrap();

    let trials = study.trials();
    assert_eq!(trials.len(), 1);
    assert_eq!(trials[0].value, Some(0.25));
    assert_eq!(
        trials[0].user_attr("learning_rate"),
        Some(&AttrValue::Float(0.25))
    );
    // The learning rate was discovered, not sampled.
    assert!(trials[0].param("learning_rate").is_none());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn best_trial_respects_minimize_direction() {
    let dir = temp_dir("best");
    let counter = dir.join("count");
    let script = write_script(
        &dir,
        &format!(
            "n=$(cat \"{counter}\" 2>/dev/null || echo 0)\n\
             n=$((n + 1))\n\
             echo \"$n\" > \"{counter}\"\n\
             case \"$n\" in\n\
             \t1) echo 3.0 ;;\n\
             \t2) echo 1.0 ;;\n\
             \t*) echo 2.0 ;;\n\
             esac\n",
            counter = counter.display()
        ),
    );

    let study = Study::open(&dir, "ranking", RandomSampler::with_seed(5)).unwrap();
    study.run(3, &objective(&script, 1, false)).await.unwrap();

    assert_eq!(study.best_value().unwrap(), 1.0);
    assert_eq!(study.best_trial().unwrap().id, 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn missing_trainer_aborts_the_study() {
    let dir = temp_dir("abort");
    let study = Study::open(&dir, "doomed", RandomSampler::with_seed(9)).unwrap();

    let missing = dir.join("no-such-trainer");
    let result = study.run(2, &objective(&missing, 1, false)).await;

    assert!(result.is_err());
    assert!(!result.unwrap_err().is_trial_failure());
    assert_eq!(study.state(), StudyState::Aborted);
    // Nothing was journaled for the aborted trial.
    assert_eq!(study.n_trials(), 0);

    std::fs::remove_dir_all(&dir).ok();
}

mod common;

use common::{run_moodjournal, TestEnv};

#[test]
fn moodjournal_help_shows_usage() {
    let output = run_moodjournal(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--help should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
    assert!(
        !stderr.contains("No config file found"),
        "--help should not log config fallback noise\nstderr:\n{}",
        stderr
    );
}

#[test]
fn moodjournal_version_shows_version() {
    let output = run_moodjournal(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("moodjournal "));
}

#[test]
fn completions_bash_outputs_script() {
    let output = run_moodjournal(&["completions", "bash"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "completions bash should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(
        stdout.contains("moodjournal"),
        "expected completion output to reference command name\nstdout:\n{}",
        stdout
    );
}

#[test]
fn analyze_prints_dominant_emotion() {
    let output = run_moodjournal(&["analyze", "Je suis triste et en colère"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout:\n{}", stdout);
    assert!(stdout.contains("Dominant emotion:"));
    assert!(stdout.contains("tristesse"));
    assert!(stdout.contains("-3"));
}

#[test]
fn analyze_json_is_parseable() {
    let output = run_moodjournal(&["analyze", "--json", "Très heureux aujourd'hui"]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("analysis should be JSON");
    assert_eq!(value["dominant_emotion"], "joie");
    assert_eq!(value["overall_score"], 2);
}

#[test]
fn analyze_json_names_the_neutral_result() {
    let output = run_moodjournal(&["analyze", "--json", "Une journée ordinaire"]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("analysis should be JSON");
    assert_eq!(value["dominant_emotion"], "neutre");
    assert_eq!(value["overall_score"], 0);
}

#[test]
fn config_show_works() {
    let output = run_moodjournal(&["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "config show should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("[general]"));
    assert!(stdout.contains("[transcription]"));
    assert!(stdout.contains("max_poll_attempts = 30"));
}

#[test]
fn config_path_returns_valid_path() {
    let output = run_moodjournal(&["config", "path"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let env = TestEnv::new();

    let first = env.run(&["config", "init"]);
    assert!(first.status.success());
    assert!(env.config_path().exists());

    let second = env.run(&["config", "init"]);
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("--force"));

    let forced = env.run(&["config", "init", "--force"]);
    assert!(forced.status.success());
}

#[test]
fn entry_list_works_with_empty_database() {
    let output = run_moodjournal(&["entry", "list"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "entry list should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("No entries found"));
}

#[test]
fn entry_round_trip_through_the_binary() {
    let env = TestEnv::new();

    let saved = env.run(&[
        "entry", "save", "--date", "2024-03-15", "--mood", "8", "--note", "Très heureux",
    ]);
    assert!(
        saved.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&saved.stderr)
    );
    assert!(String::from_utf8_lossy(&saved.stdout).contains("joie"));

    let shown = env.run(&["entry", "show", "2024-03-15"]);
    let stdout = String::from_utf8_lossy(&shown.stdout);
    assert!(shown.status.success());
    assert!(stdout.contains("Mood: 8/10"));
    assert!(stdout.contains("Très heureux"));

    let dates = env.run(&["entry", "dates"]);
    assert_eq!(String::from_utf8_lossy(&dates.stdout).trim(), "2024-03-15");

    let deleted = env.run(&["entry", "delete", "2024-03-15"]);
    assert!(deleted.status.success());

    let missing = env.run(&["entry", "show", "2024-03-15"]);
    assert!(!missing.status.success());
}

#[test]
fn entry_save_rejects_out_of_range_mood() {
    let output = run_moodjournal(&["entry", "save", "--date", "2024-03-15", "--mood", "11"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("mood score 11"));
}

#[test]
fn stats_on_empty_journal() {
    let output = run_moodjournal(&["stats", "--period", "month"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout:\n{}", stdout);
    assert!(stdout.contains("Period: month"));
    assert!(stdout.contains("Entries: 0"));
}

#[test]
fn voice_without_api_key_fails_clearly() {
    let env = TestEnv::new();
    let output = env.run(&["voice", "memo.wav"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(
        stderr.contains("Transcription API key is missing"),
        "stderr:\n{}",
        stderr
    );
}

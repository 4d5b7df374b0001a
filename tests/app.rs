use openice::{App, AppConfig, RunOutcome, RunRequest};

fn app_in(dir: &std::path::Path) -> App {
    App::new(AppConfig {
        output_root: dir.join("reports"),
        case_prefix: "case".to_string(),
        ..AppConfig::default()
    })
}

fn request(input: std::path::PathBuf) -> RunRequest {
    RunRequest {
        input,
        non_interactive: true,
        auto_publish: false,
    }
}

#[tokio::test]
async fn empty_target_list_creates_no_case() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("targets.json");
    std::fs::write(&input, r#"{"targets": []}"#).unwrap();

    let outcome = app_in(dir.path())
        .run(&request(input), |_, _| panic!("no confirmation for an empty batch"))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::NoTargets));
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn missing_and_unsupported_inputs_fail() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    assert!(app.run(&request(dir.path().join("nope.csv")), |_, _| Ok(true)).await.is_err());

    let xml = dir.path().join("targets.xml");
    std::fs::write(&xml, "<targets/>").unwrap();
    assert!(app.run(&request(xml), |_, _| Ok(true)).await.is_err());

    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn successive_runs_get_increasing_case_ids() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("targets.csv");
    std::fs::write(&input, "target,platform,type,evidence_list,attachments,notes\n@a,telegram,account,clone,,\n").unwrap();

    let app = app_in(dir.path());
    let mut sequences = Vec::new();
    for _ in 0..3 {
        let RunOutcome::Completed(output) = app.run(&request(input.clone()), |_, _| Ok(true)).await.unwrap() else {
            panic!("run should complete");
        };
        assert!(output.case_dir.join("summary.json").is_file());
        assert_eq!(output.summary.targets[0].identifier(), "@a");
        sequences.push(output.summary.case_id.clone());
    }

    assert!(sequences[0].ends_with("_001"));
    assert!(sequences[1].ends_with("_002"));
    assert!(sequences[2].ends_with("_003"));
}

#[tokio::test]
async fn interactive_run_asks_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("targets.json");
    std::fs::write(&input, r#"[{"target": "@x", "evidence": ["nsfw"]}]"#).unwrap();

    let mut asked = false;
    let outcome = app_in(dir.path())
        .run(
            &RunRequest {
                input,
                non_interactive: false,
                auto_publish: true,
            },
            |case_id, targets| {
                asked = true;
                assert!(case_id.as_str().starts_with("case_"));
                assert_eq!(targets[0].target.as_deref(), Some("@x"));
                Ok(true)
            },
        )
        .await
        .unwrap();

    assert!(asked);
    // auto_publish without repo/token just skips publishing
    let RunOutcome::Completed(output) = outcome else {
        panic!("run should complete");
    };
    assert_eq!(output.summary.generated_count(), 1);
}

//! Pipeline behavior against a scripted fake backend

use serde_json::json;

use verbump::config::AnalyzerConfig;
use verbump::pipeline::{analyze, PipelineError};
use verbump_wire::testing::FakeBackend;
use verbump_wire::{Transport, VersionType, WireError};

fn summary_args(features: u64) -> String {
    json!({
        "summary": "adds a feature",
        "breaking_changes": 0,
        "fixes": 0,
        "features": features,
        "other_changes": 0,
        "reasoning": "new public function",
    })
    .to_string()
}

fn decision_args(version_type: &str, needs_review: bool) -> String {
    json!({
        "version_type": version_type,
        "needs_review": needs_review,
        "reasoning": "features without breaking changes",
    })
    .to_string()
}

/// A diff body large enough to split into three 8000-character chunks.
fn large_feature_diff() -> String {
    let mut diff = String::from(
        "diff --git a/libs/foo/src/lib.rs b/libs/foo/src/lib.rs\n\
         index 1234567..89abcde 100644\n\
         --- a/libs/foo/src/lib.rs\n\
         +++ b/libs/foo/src/lib.rs\n\
         @@ -1,3 +1,500 @@\n",
    );
    while diff.len() < 20000 {
        diff.push_str("+    // feat: add another public helper to libs/foo\n");
    }
    diff
}

fn small_feature_diff() -> String {
    "diff --git a/libs/foo/src/lib.rs b/libs/foo/src/lib.rs\n\
     index 1234567..89abcde 100644\n\
     --- a/libs/foo/src/lib.rs\n\
     +++ b/libs/foo/src/lib.rs\n\
     @@ -1,1 +1,2 @@\n\
     +pub fn added() {}\n"
        .to_string()
}

async fn no_connect() -> Result<Box<dyn Transport>, WireError> {
    panic!("the pipeline must not touch the network for this input");
}

#[tokio::test]
async fn tiny_diff_short_circuits_without_network() {
    for diff in ["", "short"] {
        let decision = analyze(&AnalyzerConfig::default(), diff, no_connect)
            .await
            .unwrap();
        assert_eq!(decision.version_type, VersionType::Unknown);
        assert!(decision.needs_review);
    }
}

#[tokio::test]
async fn fully_ignored_diff_short_circuits_without_network() {
    let diff = "\
diff --git a/README.md b/README.md
index 1234567..89abcde 100644
--- a/README.md
+++ b/README.md
@@ -1,1 +1,2 @@
+New docs line
";
    let decision = analyze(&AnalyzerConfig::default(), diff, no_connect)
        .await
        .unwrap();
    assert_eq!(decision.version_type, VersionType::Unknown);
    assert!(decision.needs_review);
}

#[tokio::test]
async fn three_chunks_mean_exactly_four_exchanges_in_order() {
    let diff = large_feature_diff();

    let backend = FakeBackend::new(vec![
        FakeBackend::function_call(&summary_args(1)),
        FakeBackend::function_call(&summary_args(0)),
        FakeBackend::function_call(&summary_args(2)),
        FakeBackend::function_call(&decision_args("minor", false)),
    ]);
    let log = backend.log();

    let decision = analyze(&AnalyzerConfig::default(), &diff, || async move {
        Ok(Box::new(backend) as Box<dyn Transport>)
    })
    .await
    .unwrap();

    assert_eq!(decision.version_type, VersionType::Minor);
    assert!(!decision.needs_review);

    let log = log.lock().unwrap();
    assert_eq!(log.requests.len(), 4, "3 summaries + 1 decision");
    assert!(log.requests[0].contains("part 1 of 3"));
    assert!(log.requests[1].contains("part 2 of 3"));
    assert!(log.requests[2].contains("part 3 of 3"));
    assert!(log.requests[3].contains("Decide the semantic version bump"));

    // Reconfigured once per phase, on the same connection.
    assert_eq!(log.configures.len(), 2);
    assert!(log.configures[0].contains("reviewing one piece"));
    assert!(log.configures[1].contains("deciding a semantic version bump"));
}

#[tokio::test]
async fn decision_prompt_embeds_all_summaries_in_order() {
    let diff = large_feature_diff();

    let backend = FakeBackend::new(vec![
        FakeBackend::function_call(&summary_args(1)),
        FakeBackend::function_call(&summary_args(2)),
        FakeBackend::function_call(&summary_args(3)),
        FakeBackend::function_call(&decision_args("minor", false)),
    ]);
    let log = backend.log();

    analyze(&AnalyzerConfig::default(), &diff, || async move {
        Ok(Box::new(backend) as Box<dyn Transport>)
    })
    .await
    .unwrap();

    let log = log.lock().unwrap();
    let final_prompt = &log.requests[3];
    let first = final_prompt.find("\"features\": 1").unwrap();
    let second = final_prompt.find("\"features\": 2").unwrap();
    let third = final_prompt.find("\"features\": 3").unwrap();
    assert!(first < second && second < third);
}

#[tokio::test]
async fn invalid_summary_is_retried_then_succeeds() {
    let diff = small_feature_diff();

    let backend = FakeBackend::new(vec![
        FakeBackend::function_call(r#"{"summary": "missing the counts"}"#),
        FakeBackend::function_call(&summary_args(1)),
        FakeBackend::function_call(&decision_args("minor", false)),
    ]);
    let log = backend.log();

    let decision = analyze(&AnalyzerConfig::default(), &diff, || async move {
        Ok(Box::new(backend) as Box<dyn Transport>)
    })
    .await
    .unwrap();

    assert_eq!(decision.version_type, VersionType::Minor);
    let log = log.lock().unwrap();
    assert_eq!(log.requests.len(), 3, "retry + success + decision");
}

#[tokio::test]
async fn exhausted_summary_retries_name_the_chunk() {
    let diff = small_feature_diff();
    let error_batch = || vec![json!({"type": "error", "error": {"message": "overloaded"}})];

    let backend = FakeBackend::new(vec![error_batch(), error_batch(), error_batch()]);
    let log = backend.log();

    let err = analyze(&AnalyzerConfig::default(), &diff, || async move {
        Ok(Box::new(backend) as Box<dyn Transport>)
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Summarize { index: 1, total: 1, .. }
    ));
    assert!(err.to_string().contains("summarizing chunk 1 of 1"));
    assert_eq!(log.lock().unwrap().requests.len(), 3, "one per attempt");
}

#[tokio::test]
async fn decide_phase_failure_is_labelled() {
    let diff = small_feature_diff();
    let error_batch = || vec![json!({"type": "error", "error": {"message": "overloaded"}})];

    let backend = FakeBackend::new(vec![
        FakeBackend::function_call(&summary_args(1)),
        error_batch(),
        error_batch(),
        error_batch(),
    ]);

    let err = analyze(&AnalyzerConfig::default(), &diff, || async move {
        Ok(Box::new(backend) as Box<dyn Transport>)
    })
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Decide { .. }));
    assert!(err.to_string().contains("deciding the version bump"));
}

#[tokio::test]
async fn backend_hangup_mid_run_fails_the_pipeline() {
    let diff = large_feature_diff();

    // Script covers only the first summary; the channel then reads closed.
    let backend = FakeBackend::new(vec![FakeBackend::function_call(&summary_args(1))]);

    let err = analyze(&AnalyzerConfig::default(), &diff, || async move {
        Ok(Box::new(backend) as Box<dyn Transport>)
    })
    .await
    .unwrap_err();

    match err {
        PipelineError::Summarize { index: 2, source, .. } => {
            assert!(matches!(source, WireError::ExhaustedRetries { .. }));
        }
        other => panic!("expected a summarize failure on chunk 2, got: {other}"),
    }
}

#[tokio::test]
async fn connect_failure_is_an_open_error() {
    let diff = small_feature_diff();
    let err = analyze(&AnalyzerConfig::default(), &diff, || async {
        Err(WireError::Connection("refused".into()))
    })
    .await
    .unwrap_err();
    assert!(matches!(err, PipelineError::Open(_)));
    assert!(err.to_string().contains("refused"));
}

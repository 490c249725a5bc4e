mod common;

use common::ScriptedCompleter;
use pretty_assertions::assert_eq;
use proofread::config::Config;
use proofread::error::Error;
use proofread::llm::LlmError;
use proofread::pipeline::Pipeline;
use proofread::scrutinize::PageOutcome;

fn pages(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

#[test]
fn report_blocks_only_for_pages_with_findings() {
    let model = common::typo_model();
    let pipeline = Pipeline::new(&Config::default(), &model);

    let report = pipeline
        .scrutinize(&pages(&["Teh cat sat.", "All cats like milk."]))
        .unwrap();

    assert_eq!(report.outcome(2), Some(&PageOutcome::Clean));
    assert_eq!(
        report.findings(1).unwrap(),
        &["\"Teh\" is a typo for \"The\"".to_string()]
    );
    assert_eq!(report.render(), "Page 1:\n- \"Teh\" is a typo for \"The\"");
    assert_eq!(model.prompts().len(), 2);
}

#[test]
fn each_prompt_names_its_page() {
    let model = common::typo_model();
    let pipeline = Pipeline::new(&Config::default(), &model);
    pipeline.scrutinize(&pages(&["one", "two", "three"])).unwrap();

    let prompts = model.prompts();
    for (i, p) in prompts.iter().enumerate() {
        assert!(p.contains(&format!("on page {}", i + 1)));
    }
}

#[test]
fn empty_response_is_failed_not_clean() {
    let model = ScriptedCompleter::new(|_| Ok("   ".into()));
    let pipeline = Pipeline::new(&Config::default(), &model);

    let report = pipeline.scrutinize(&pages(&["something"])).unwrap();
    assert!(matches!(report.outcome(1), Some(PageOutcome::Failed { .. })));
    assert_eq!(report.render(), "Page 1: not checked (empty completion)");
    assert_eq!(report.counts().failed, 1);
}

#[test]
fn transport_error_aborts_with_page_number() {
    let model = ScriptedCompleter::new(|prompt| {
        if prompt.contains("on page 2") {
            Err(LlmError::Status {
                status: 429,
                body: "quota".into(),
            })
        } else {
            Ok("NO ISSUES".into())
        }
    });
    let pipeline = Pipeline::new(&Config::default(), &model);

    let err = pipeline.scrutinize(&pages(&["a", "b", "c"])).unwrap_err();
    match err {
        Error::Completion { page, reason } => {
            assert_eq!(page, 2);
            assert!(reason.contains("429"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // sequential mode stops at the failing page
    assert_eq!(model.prompts().len(), 2);
}

#[test]
fn continue_on_error_records_failure() {
    let model = ScriptedCompleter::new(|prompt| {
        if prompt.contains("on page 1") {
            Err(LlmError::Transport("connection reset".into()))
        } else {
            Ok("- wordy".into())
        }
    });
    let mut cfg = Config::default();
    cfg.scrutiny.continue_on_error = true;
    let pipeline = Pipeline::new(&cfg, &model);

    let report = pipeline.scrutinize(&pages(&["a", "b"])).unwrap();
    assert!(matches!(report.outcome(1), Some(PageOutcome::Failed { .. })));
    assert_eq!(report.findings(2).unwrap(), &["wordy".to_string()]);
}

#[test]
fn parallel_scrutiny_matches_sequential() {
    let texts = pages(&["Teh a", "b", "Teh c", "d", "e"]);

    let seq_model = common::typo_model();
    let seq = Pipeline::new(&Config::default(), &seq_model)
        .scrutinize(&texts)
        .unwrap();

    let mut cfg = Config::default();
    cfg.concurrency.max_parallel_pages = 2;
    let par_model = common::typo_model();
    let par = Pipeline::new(&cfg, &par_model).scrutinize(&texts).unwrap();

    assert_eq!(seq, par);
    assert_eq!(par_model.prompts().len(), 5);
}

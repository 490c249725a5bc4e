use proofread::config::{Config, Credentials};
use proofread::error::Error;
use proofread::output::OutputFormat;

#[test]
fn parse_example_config() {
    let raw = include_str!("../proofread.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.llm.api_key_env, "OPENAI_API_KEY");
    assert_eq!(cfg.output.format, OutputFormat::Pdf);
    assert!(cfg.retry.max_attempts >= 1);
    assert!(!cfg.output.dir.is_empty());
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[output]\nformat = \"txt\"\n").unwrap();
    assert_eq!(cfg.output.format, OutputFormat::Txt);
    assert_eq!(cfg.output.dir, "corrected_pdfs");
    assert_eq!(cfg.concurrency.max_parallel_pages, 1);
    assert_eq!(cfg.scrutiny.clean_sentinel, "NO ISSUES");
}

#[test]
fn one_key_section_keeps_other_defaults() {
    let cfg: Config = toml::from_str("[llm]\nmodel = \"gpt-4o\"\n").unwrap();
    assert_eq!(cfg.llm.model, "gpt-4o");
    assert_eq!(cfg.llm.api_key_env, "OPENAI_API_KEY");
    assert_eq!(cfg.llm.max_tokens, 1024);
}

#[test]
fn missing_credential_is_a_configuration_error() {
    let cfg = Config::default();
    let err = Credentials::from_lookup(&cfg.llm, |_| None).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.to_string().contains("OPENAI_API_KEY"));

    let blank = Credentials::from_lookup(&cfg.llm, |_| Some("  ".into()));
    assert!(matches!(blank, Err(Error::Configuration(_))));
}

#[test]
fn credential_is_read_and_redacted() {
    let cfg = Config::default();
    let creds = Credentials::from_lookup(&cfg.llm, |name| {
        (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
    })
    .unwrap();
    assert_eq!(creds.api_key(), "sk-test");
    assert!(!format!("{creds:?}").contains("sk-test"));
}

//! Pipeline runs against the mock provider and in-memory collaborators

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use sorter_cli::commands::run::run_once;
use sorter_cli::{
    Alerter, Attachment, CliError, Filer, MailMessage, MailSource, Pipeline, Result, StateStore,
    TextExtractor,
};
use sorter_llm::MockProvider;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct FakeMail {
    messages: Vec<MailMessage>,
    fail: bool,
    requested: Arc<Mutex<Vec<NaiveDate>>>,
}

#[async_trait]
impl MailSource for FakeMail {
    async fn fetch(&self, since: NaiveDate) -> Result<Vec<MailMessage>> {
        self.requested.lock().unwrap().push(since);
        if self.fail {
            return Err(CliError::Mail("IMAP login failed".into()));
        }
        Ok(self.messages.clone())
    }
}

/// Treats attachment bytes as already-extracted text.
struct PlainText;

#[async_trait]
impl TextExtractor for PlainText {
    async fn extract(&self, content: &[u8]) -> Result<String> {
        let text = String::from_utf8_lossy(content).into_owned();
        if text.trim().is_empty() {
            return Err(CliError::TextExtraction("Document contains no text".into()));
        }
        Ok(text)
    }
}

#[derive(Clone, Default)]
struct RecordingAlerter {
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Alerter for RecordingAlerter {
    async fn alert(&self, message: &str) -> Result<()> {
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn message(id: &str, attachments: Vec<Attachment>) -> MailMessage {
    MailMessage {
        id: id.to_string(),
        attachments,
    }
}

fn pdf(name: &str, text: &str) -> Attachment {
    Attachment::new(name, text.as_bytes().to_vec())
}

#[tokio::test]
async fn test_files_pdfs_into_month_folders() {
    let root = tempfile::tempdir().unwrap();
    let provider = MockProvider::structured(json!({}));
    provider.push_structured(json!({"date": "2024-03-07"}));
    provider.push_structured(json!({"date": "2023-12-30"}));

    let mail = FakeMail {
        messages: vec![
            message("m1", vec![pdf("FV_7_2024.pdf", "Faktura 7/2024"), pdf("logo.png", "png")]),
            message("m2", vec![pdf("FV_99_2023.PDF", "Faktura 99/2023")]),
        ],
        ..Default::default()
    };
    let requested = mail.requested.clone();
    let alerter = RecordingAlerter::default();

    let pipeline = Pipeline::new(
        provider.clone(),
        mail,
        PlainText,
        alerter.clone(),
        Filer::new(root.path(), "dokumenty_"),
    );
    let report = pipeline.run(date(2024, 3, 10)).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.skipped, 1);
    assert_eq!(report.filed.len(), 2);
    assert_eq!(report.filed[0].invoice_date, date(2024, 3, 7));
    assert_eq!(report.filed[1].message_id, "m2");

    let march = root.path().join("2024").join("dokumenty_marzec").join("FV_7_2024.pdf");
    let december = root.path().join("2023").join("dokumenty_grudzień").join("FV_99_2023.PDF");
    assert_eq!(std::fs::read_to_string(march).unwrap(), "Faktura 7/2024");
    assert!(december.exists());

    assert_eq!(*requested.lock().unwrap(), vec![date(2024, 3, 9)]);
    assert_eq!(provider.call_count(), 2);
    let prompt = &provider.calls()[0].messages[1].content;
    assert!(prompt.contains("<invoice>\nFaktura 7/2024\n</invoice>"));
    assert!(alerter.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_run() {
    let root = tempfile::tempdir().unwrap();
    let provider = MockProvider::structured(json!({}));
    provider.push_http_error(529, "overloaded");
    provider.push_structured(json!({"date": "2024-02-01"}));

    let mail = FakeMail {
        messages: vec![
            message("m1", vec![pdf("blank.pdf", "   ")]),
            message("m2", vec![pdf("busy.pdf", "Faktura A")]),
            message("m3", vec![pdf("ok.pdf", "Faktura B")]),
        ],
        ..Default::default()
    };
    let alerter = RecordingAlerter::default();

    let pipeline = Pipeline::new(
        provider.clone(),
        mail,
        PlainText,
        alerter.clone(),
        Filer::new(root.path(), "dokumenty_"),
    );
    let report = pipeline.run(date(2024, 2, 5)).await.unwrap();

    assert_eq!(report.filed.len(), 1);
    assert_eq!(report.filed[0].filename, "ok.pdf");
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].filename, "blank.pdf");
    assert!(report.failures[1].error.contains("529"));

    // blank.pdf never reached the model
    assert_eq!(provider.call_count(), 2);

    let sent = alerter.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].starts_with("Could not file blank.pdf"));
    assert!(sent[1].starts_with("Could not file busy.pdf"));
}

#[tokio::test]
async fn test_unparseable_date_is_a_failure() {
    let root = tempfile::tempdir().unwrap();
    let provider = MockProvider::structured(json!({"date": "07.03.2024"}));
    let mail = FakeMail {
        messages: vec![message("m1", vec![pdf("a.pdf", "Faktura")])],
        ..Default::default()
    };

    let pipeline = Pipeline::new(
        provider,
        mail,
        PlainText,
        RecordingAlerter::default(),
        Filer::new(root.path(), ""),
    );
    let report = pipeline.run(date(2024, 3, 10)).await.unwrap();

    assert!(report.filed.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(!root.path().join("2024").exists());
}

#[tokio::test]
async fn test_clean_run_advances_state() {
    let root = tempfile::tempdir().unwrap();
    let store = StateStore::new(root.path().join("state.json"));
    store.save(date(2024, 3, 1)).unwrap();

    let mail = FakeMail {
        messages: vec![message("m1", vec![pdf("a.pdf", "Faktura")])],
        ..Default::default()
    };
    let requested = mail.requested.clone();
    let pipeline = Pipeline::new(
        MockProvider::structured(json!({"date": "2024-03-05"})),
        mail,
        PlainText,
        RecordingAlerter::default(),
        Filer::new(root.path().join("docs"), "dokumenty_"),
    );

    let report = run_once(&pipeline, &store, None, date(2024, 3, 10), false).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(*requested.lock().unwrap(), vec![date(2024, 2, 29)]);
    assert_eq!(store.load().unwrap().unwrap().last_run, date(2024, 3, 10));
}

#[tokio::test]
async fn test_failed_document_keeps_previous_state() {
    let root = tempfile::tempdir().unwrap();
    let store = StateStore::new(root.path().join("state.json"));
    store.save(date(2024, 3, 1)).unwrap();

    let mail = FakeMail {
        messages: vec![message("m1", vec![pdf("a.pdf", "Faktura")])],
        ..Default::default()
    };
    let provider = MockProvider::structured(json!({"date": "2024-03-05"}));
    provider.push_transport_error("connection reset");
    let pipeline = Pipeline::new(
        provider,
        mail,
        PlainText,
        RecordingAlerter::default(),
        Filer::new(root.path().join("docs"), "dokumenty_"),
    );

    let report = run_once(&pipeline, &store, None, date(2024, 3, 10), false).await.unwrap();

    assert!(!report.is_clean());
    assert_eq!(store.load().unwrap().unwrap().last_run, date(2024, 3, 1));
}

#[tokio::test]
async fn test_first_run_starts_today_and_dry_run_keeps_state() {
    let root = tempfile::tempdir().unwrap();
    let store = StateStore::new(root.path().join("state.json"));

    let mail = FakeMail {
        messages: vec![message("m1", vec![pdf("a.pdf", "Faktura")])],
        ..Default::default()
    };
    let requested = mail.requested.clone();
    let pipeline = Pipeline::new(
        MockProvider::structured(json!({"date": "2024-03-05"})),
        mail,
        PlainText,
        RecordingAlerter::default(),
        Filer::new(root.path().join("docs"), "dokumenty_").dry_run(true),
    );

    let report = run_once(&pipeline, &store, None, date(2024, 3, 10), true).await.unwrap();

    assert_eq!(report.filed.len(), 1);
    assert!(report.filed[0].path.ends_with("2024/dokumenty_marzec/a.pdf"));
    assert!(!root.path().join("docs").exists());
    assert_eq!(*requested.lock().unwrap(), vec![date(2024, 3, 9)]);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_explicit_since_overrides_state() {
    let root = tempfile::tempdir().unwrap();
    let store = StateStore::new(root.path().join("state.json"));
    store.save(date(2024, 3, 1)).unwrap();

    let mail = FakeMail::default();
    let requested = mail.requested.clone();
    let pipeline = Pipeline::new(
        MockProvider::default(),
        mail,
        PlainText,
        RecordingAlerter::default(),
        Filer::new(root.path(), "dokumenty_"),
    );

    run_once(&pipeline, &store, Some(date(2024, 1, 1)), date(2024, 3, 10), false)
        .await
        .unwrap();

    assert_eq!(*requested.lock().unwrap(), vec![date(2023, 12, 31)]);
}

#[tokio::test]
async fn test_fatal_failure_alerts_and_errors() {
    let root = tempfile::tempdir().unwrap();
    let store = StateStore::new(root.path().join("state.json"));
    let alerter = RecordingAlerter::default();
    let mail = FakeMail {
        fail: true,
        ..Default::default()
    };

    let pipeline = Pipeline::new(
        MockProvider::default(),
        mail,
        PlainText,
        alerter.clone(),
        Filer::new(root.path(), ""),
    );
    let result = run_once(&pipeline, &store, None, date(2024, 3, 10), false).await;

    assert!(matches!(result, Err(CliError::Mail(_))));
    let sent = alerter.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("IMAP login failed"));
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_state_alerts() {
    let root = tempfile::tempdir().unwrap();
    let path = root.path().join("state.json");
    std::fs::write(&path, "{").unwrap();
    let alerter = RecordingAlerter::default();

    let pipeline = Pipeline::new(
        MockProvider::default(),
        FakeMail::default(),
        PlainText,
        alerter.clone(),
        Filer::new(root.path(), ""),
    );
    let result = run_once(&pipeline, &StateStore::new(path), None, date(2024, 3, 10), false).await;

    assert!(matches!(result, Err(CliError::State(_))));
    assert_eq!(alerter.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unsaved_state_reports_filed_invoices() {
    let root = tempfile::tempdir().unwrap();
    // A directory where the state file should be makes the save fail
    let state_path = root.path().join("state.json");
    std::fs::create_dir(&state_path).unwrap();
    let alerter = RecordingAlerter::default();

    let mail = FakeMail {
        messages: vec![message("m1", vec![pdf("a.pdf", "Faktura"), pdf("b.pdf", "Faktura")])],
        ..Default::default()
    };
    let pipeline = Pipeline::new(
        MockProvider::structured(json!({"date": "2024-03-05"})),
        mail,
        PlainText,
        alerter.clone(),
        Filer::new(root.path().join("docs"), "dokumenty_"),
    );

    let store = StateStore::new(state_path.clone());
    let since = Some(date(2024, 3, 1));
    let result = run_once(&pipeline, &store, since, date(2024, 3, 10), false).await;

    match result {
        Err(CliError::State(msg)) => assert!(msg.starts_with("2 invoice(s) filed"), "{}", msg),
        other => panic!("expected a state error, got {:?}", other.map(|r| r.filed.len())),
    }
    assert!(root.path().join("docs/2024/dokumenty_marzec/b.pdf").exists());

    let sent = alerter.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("2 invoice(s) filed but run state not saved"));
}

use std::path::PathBuf;

use docqa_core::{
    update, AppState, Document, DocumentKind, Effect, FetchError, HealthStatus, Msg,
    ServiceHealth, UploadStatus,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn doc(name: &str, content_type: &str) -> Document {
    Document {
        id: Some(format!("id-{name}")),
        filename: name.to_string(),
        content_type: content_type.to_string(),
        upload_time: Some("2024-05-01T10:00:00".to_string()),
        chunk_count: Some(3),
    }
}

fn select(state: AppState, files: &[&str]) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::FilesSelected(files.iter().map(PathBuf::from).collect()),
    )
}

#[test]
fn batch_yields_one_upload_per_file() {
    init_logging();
    let (state, effects) = select(AppState::new(), &["/tmp/a.pdf", "/tmp/b.png", "/tmp/c.mp3"]);

    assert_eq!(
        effects,
        vec![
            Effect::UploadFile {
                upload_id: 1,
                path: PathBuf::from("/tmp/a.pdf"),
            },
            Effect::UploadFile {
                upload_id: 2,
                path: PathBuf::from("/tmp/b.png"),
            },
            Effect::UploadFile {
                upload_id: 3,
                path: PathBuf::from("/tmp/c.mp3"),
            },
        ]
    );
    let view = state.view();
    assert_eq!(view.uploads.len(), 3);
    assert!(view
        .uploads
        .iter()
        .all(|row| row.status == UploadStatus::InFlight));
}

#[test]
fn empty_batch_is_noop() {
    init_logging();
    let (mut state, effects) = select(AppState::new(), &[]);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn failed_upload_does_not_block_the_others() {
    init_logging();
    let (state, _) = select(AppState::new(), &["a.pdf", "b.pdf", "c.pdf"]);

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            upload_id: 2,
            result: Err("http status 500".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::NotifyUser {
            message: "Failed to upload b.pdf".to_string(),
        }]
    );

    // Completion order is free; each success asks for its own refresh.
    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            upload_id: 3,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::FetchDocuments]);
    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            upload_id: 1,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::FetchDocuments]);

    let statuses: Vec<_> = state.view().uploads.iter().map(|row| row.status).collect();
    assert_eq!(
        statuses,
        vec![
            UploadStatus::Succeeded,
            UploadStatus::Failed,
            UploadStatus::Succeeded
        ]
    );
    assert!(state.registry().is_empty());
}

#[test]
fn unknown_upload_completion_is_ignored() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::UploadFinished {
            upload_id: 42,
            result: Ok(()),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().uploads.is_empty());
}

#[test]
fn repeated_upload_completion_is_ignored() {
    init_logging();
    let (state, _) = select(AppState::new(), &["/home/me/report.pdf", "/home/me/scan.png"]);
    let done = |upload_id, result: Result<(), String>| Msg::UploadFinished { upload_id, result };

    let (mut state, effects) = update(state, done(1, Ok(())));
    assert_eq!(effects, vec![Effect::FetchDocuments]);
    state.consume_dirty();
    let (mut state, effects) = update(state, done(1, Ok(())));
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.upload(1).unwrap().status, UploadStatus::Succeeded);

    let (mut state, effects) = update(state, done(2, Err("boom".to_string())));
    assert_eq!(effects.len(), 1);
    state.consume_dirty();
    let (mut state, effects) = update(state, done(2, Ok(())));
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.upload(2).unwrap().status, UploadStatus::Failed);
}

#[test]
fn report_upload_then_refresh_lists_it() {
    init_logging();
    let (state, _) = select(AppState::new(), &["/home/me/report.pdf"]);
    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            upload_id: 1,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::FetchDocuments]);

    let (state, _) = update(
        state,
        Msg::DocumentsFetched(Ok(vec![doc("report.pdf", "application/pdf")])),
    );
    let view = state.view();
    assert_eq!(view.document_count, 1);
    assert_eq!(view.documents[0].filename, "report.pdf");
    assert_eq!(view.documents[0].kind, DocumentKind::Pdf);
}

#[test]
fn refresh_replaces_and_failure_keeps_previous_list() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsFetched(Ok(vec![
            doc("a.pdf", "application/pdf"),
            doc("b.png", "image/png"),
        ])),
    );
    let (state, _) = update(
        state,
        Msg::DocumentsFetched(Ok(vec![doc("c.wav", "audio/wav")])),
    );
    assert_eq!(state.registry().documents(), &[doc("c.wav", "audio/wav")]);

    let before = state.registry().clone();
    let (mut state, effects) = update(
        state,
        Msg::DocumentsFetched(Err(FetchError::new("connection refused"))),
    );
    assert!(effects.is_empty());
    assert_eq!(state.registry(), &before);
    assert!(state.consume_dirty());
    let (mut state, _) = update(
        state,
        Msg::DocumentsFetched(Err(FetchError::new("again"))),
    );
    assert!(!state.consume_dirty());
}

#[test]
fn delete_refreshes_on_success_and_notifies_on_failure() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::DeleteDocumentClicked {
            document_id: "doc-1".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::DeleteDocument {
            document_id: "doc-1".to_string(),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::DocumentDeleted {
            document_id: "doc-1".to_string(),
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::FetchDocuments]);

    let (_state, effects) = update(
        state,
        Msg::DocumentDeleted {
            document_id: "doc-2".to_string(),
            result: Err("http status 404".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::NotifyUser {
            message: "Failed to delete document doc-2".to_string(),
        }]
    );
}

#[test]
fn download_round_trip_notifies() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::DownloadSourceClicked {
            source_file: "policy.pdf".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::DownloadSource {
            source_file: "policy.pdf".to_string(),
        }]
    );

    let (_state, effects) = update(
        state,
        Msg::DownloadFinished {
            source_file: "policy.pdf".to_string(),
            result: Err("http status 404".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::NotifyUser {
            message: "Failed to download policy.pdf".to_string(),
        }]
    );
}

#[test]
fn health_result_is_reflected_in_view() {
    init_logging();
    assert_eq!(AppState::new().view().health, HealthStatus::Unknown);

    let (state, _) = update(
        AppState::new(),
        Msg::HealthChecked(Ok(ServiceHealth {
            status: "ok".to_string(),
            model: Some("gemini-flash-latest".to_string()),
        })),
    );
    assert_eq!(
        state.view().health,
        HealthStatus::Online {
            model: Some("gemini-flash-latest".to_string())
        }
    );

    let (state, _) = update(state, Msg::HealthChecked(Err("refused".to_string())));
    assert_eq!(state.view().health, HealthStatus::Offline);
}

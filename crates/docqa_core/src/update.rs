use crate::{
    AppState, Effect, MessageDraft, Msg, QueryPolicy, UploadError, ERROR_REPLY_TEXT,
    PLACEHOLDER_TEXT,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => vec![Effect::CheckHealth, Effect::FetchDocuments],
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SendClicked => send_message(&mut state),
        Msg::FilesSelected(paths) => {
            // Each file becomes its own upload; nothing here waits on another.
            paths
                .into_iter()
                .map(|path| {
                    let upload_id = state.begin_upload(&path);
                    Effect::UploadFile { upload_id, path }
                })
                .collect()
        }
        Msg::RefreshRequested => vec![Effect::FetchDocuments],
        Msg::DeleteDocumentClicked { document_id } => {
            if document_id.trim().is_empty() {
                Vec::new()
            } else {
                vec![Effect::DeleteDocument { document_id }]
            }
        }
        Msg::DownloadSourceClicked { source_file } => {
            if source_file.trim().is_empty() {
                Vec::new()
            } else {
                vec![Effect::DownloadSource { source_file }]
            }
        }
        Msg::DocumentsFetched(result) => {
            // A failed refresh keeps the last good list; the runner logs it.
            let _ = state.apply_documents(result);
            Vec::new()
        }
        Msg::UploadFinished { upload_id, result } => {
            let ok = result.is_ok();
            match state.finish_upload(upload_id, ok) {
                None => Vec::new(),
                Some(_) if ok => vec![Effect::FetchDocuments],
                Some(row) => {
                    let err = UploadError {
                        filename: row.filename.clone(),
                        reason: result.err().unwrap_or_default(),
                    };
                    vec![Effect::NotifyUser {
                        message: err.to_string(),
                    }]
                }
            }
        }
        Msg::QueryResolved {
            placeholder_id,
            result,
        } => {
            let still_pending = state
                .transcript()
                .get(placeholder_id)
                .is_some_and(|message| message.pending);
            if still_pending {
                match result {
                    Ok(answer) => state.resolve_with_answer(placeholder_id, answer),
                    Err(_) => state.resolve_placeholder(
                        placeholder_id,
                        MessageDraft::assistant_error(ERROR_REPLY_TEXT),
                    ),
                }
            }
            Vec::new()
        }
        Msg::DocumentDeleted {
            document_id,
            result,
        } => match result {
            Ok(()) => vec![Effect::FetchDocuments],
            Err(_) => vec![Effect::NotifyUser {
                message: format!("Failed to delete document {document_id}"),
            }],
        },
        Msg::DownloadFinished {
            source_file,
            result,
        } => {
            let message = match result {
                Ok(path) => format!("Saved {source_file} to {}", path.display()),
                Err(_) => format!("Failed to download {source_file}"),
            };
            vec![Effect::NotifyUser { message }]
        }
        Msg::HealthChecked(result) => {
            state.set_health(result);
            Vec::new()
        }
    };

    (state, effects)
}

fn send_message(state: &mut AppState) -> Vec<Effect> {
    let query = state.input().trim().to_string();
    if query.is_empty() {
        return Vec::new();
    }
    if state.policy() == QueryPolicy::RejectWhileInFlight && state.has_pending_query() {
        return vec![Effect::NotifyUser {
            message: "A question is already being answered".to_string(),
        }];
    }

    // Input is cleared before the query goes out so the next one can be typed.
    let raw = state.take_input();
    state.append(MessageDraft::user(raw));
    let placeholder_id = state.append(MessageDraft::placeholder(PLACEHOLDER_TEXT));

    vec![Effect::SubmitQuery {
        placeholder_id,
        query,
    }]
}

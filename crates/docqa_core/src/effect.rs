use std::path::PathBuf;

use crate::{MessageId, UploadId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the full document list; answered by `Msg::DocumentsFetched`.
    FetchDocuments,
    /// Upload one file; answered by `Msg::UploadFinished`.
    UploadFile { upload_id: UploadId, path: PathBuf },
    /// Ask the service; answered by `Msg::QueryResolved` for the same placeholder.
    SubmitQuery {
        placeholder_id: MessageId,
        query: String,
    },
    DeleteDocument { document_id: String },
    DownloadSource { source_file: String },
    CheckHealth,
    /// Show a blocking notice to the user.
    NotifyUser { message: String },
}

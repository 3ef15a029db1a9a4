use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};

use crate::client::{ClientSettings, ReqwestServiceClient, ServiceClient};
use crate::persist::AtomicFileWriter;
use crate::{ClientError, EngineEvent, FailureKind, QueryTicket, UploadId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client: ClientSettings,
    pub download_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            download_dir: PathBuf::from("downloads"),
        }
    }
}

enum EngineCommand {
    ListDocuments,
    Upload { upload_id: UploadId, path: PathBuf },
    Query { ticket: QueryTicket, query: String },
    Delete { document_id: String },
    Download { source_file: String },
    Health,
}

/// Runs service calls on a background tokio runtime. Every command becomes its
/// own task, so uploads and queries proceed independently and finish in any order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ClientError> {
        let client = ReqwestServiceClient::new(config.client)?;
        Self::with_client(Arc::new(client), config.download_dir)
    }

    /// Builds an engine around any [`ServiceClient`].
    pub fn with_client(
        client: Arc<dyn ServiceClient>,
        download_dir: PathBuf,
    ) -> Result<Self, ClientError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;
        let download_dir = Arc::new(download_dir);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                let download_dir = download_dir.clone();
                runtime.spawn(async move {
                    let event = handle_command(client.as_ref(), &download_dir, command).await;
                    let _ = event_tx.send(event);
                });
            }
            engine_info!("engine command channel closed; shutting down");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn list_documents(&self) {
        self.send(EngineCommand::ListDocuments);
    }

    pub fn upload(&self, upload_id: UploadId, path: impl Into<PathBuf>) {
        self.send(EngineCommand::Upload {
            upload_id,
            path: path.into(),
        });
    }

    pub fn query(&self, ticket: QueryTicket, query: impl Into<String>) {
        self.send(EngineCommand::Query {
            ticket,
            query: query.into(),
        });
    }

    pub fn delete_document(&self, document_id: impl Into<String>) {
        self.send(EngineCommand::Delete {
            document_id: document_id.into(),
        });
    }

    pub fn download(&self, source_file: impl Into<String>) {
        self.send(EngineCommand::Download {
            source_file: source_file.into(),
        });
    }

    pub fn check_health(&self) {
        self.send(EngineCommand::Health);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(
    client: &dyn ServiceClient,
    download_dir: &Path,
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::ListDocuments => {
            engine_debug!("listing documents");
            EngineEvent::DocumentsListed(client.list_documents().await)
        }
        EngineCommand::Upload { upload_id, path } => {
            engine_debug!("upload {} starting: {}", upload_id, path.display());
            let result = client.upload(&path).await;
            EngineEvent::UploadCompleted { upload_id, result }
        }
        EngineCommand::Query { ticket, query } => {
            engine_debug!("query {} dispatched", ticket);
            let result = client.query(&query).await;
            EngineEvent::QueryCompleted { ticket, result }
        }
        EngineCommand::Delete { document_id } => {
            let result = client.delete_document(&document_id).await;
            EngineEvent::DocumentDeleted {
                document_id,
                result,
            }
        }
        EngineCommand::Download { source_file } => {
            let result = download(client, download_dir, &source_file).await;
            EngineEvent::DownloadCompleted {
                source_file,
                result,
            }
        }
        EngineCommand::Health => EngineEvent::HealthChecked(client.health().await),
    }
}

async fn download(
    client: &dyn ServiceClient,
    download_dir: &Path,
    source_file: &str,
) -> Result<PathBuf, ClientError> {
    let bytes = client.fetch_source(source_file).await?;
    let writer = AtomicFileWriter::new(download_dir.to_path_buf());
    let name = source_file.to_string();
    tokio::task::spawn_blocking(move || writer.write(&name, &bytes))
        .await
        .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?
        .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))
}

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use docqa_engine::{
    ClientError, DocumentRecord, EngineEvent, EngineHandle, FailureKind, HealthReply,
    QueryReply, ServiceClient,
};

/// In-memory service: uploads of names containing "fail" are rejected, and
/// names containing "slow" take longer than the others.
#[derive(Default)]
struct FakeService {
    uploaded: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ServiceClient for FakeService {
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ClientError> {
        Ok(self
            .uploaded
            .lock()
            .unwrap()
            .iter()
            .map(|name| DocumentRecord {
                id: None,
                filename: name.clone(),
                content_type: None,
                upload_time: None,
                chunk_count: None,
            })
            .collect())
    }

    async fn upload(&self, path: &Path) -> Result<(), ClientError> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if name.contains("slow") {
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        if name.contains("fail") {
            return Err(ClientError::new(FailureKind::HttpStatus(500), "rejected"));
        }
        self.uploaded.lock().unwrap().push(name);
        Ok(())
    }

    async fn query(&self, query: &str) -> Result<QueryReply, ClientError> {
        Ok(QueryReply {
            answer: format!("echo: {query}"),
            citations: None,
            processing_time: None,
        })
    }

    async fn delete_document(&self, _document_id: &str) -> Result<(), ClientError> {
        Err(ClientError::new(FailureKind::HttpStatus(405), "not allowed"))
    }

    async fn fetch_source(&self, source_file: &str) -> Result<Vec<u8>, ClientError> {
        Ok(source_file.as_bytes().to_vec())
    }

    async fn health(&self) -> Result<HealthReply, ClientError> {
        Ok(HealthReply {
            status: "ok".to_string(),
            model: None,
        })
    }
}

fn collect(engine: &EngineHandle, count: usize) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while events.len() < count && Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            events.push(event);
        }
    }
    events
}

#[test]
fn uploads_run_independently_and_complete_out_of_order() {
    let service = Arc::new(FakeService::default());
    let engine = EngineHandle::with_client(service.clone(), PathBuf::from("unused")).unwrap();

    engine.upload(1, "/data/slow.pdf");
    engine.upload(2, "/data/fail.pdf");
    engine.upload(3, "/data/quick.pdf");

    let events = collect(&engine, 3);
    let order: Vec<_> = events
        .iter()
        .map(|event| match event {
            EngineEvent::UploadCompleted { upload_id, result } => (*upload_id, result.is_ok()),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();

    assert_eq!(order.len(), 3);
    // The slow upload started first but does not hold the others back.
    assert_eq!(order.last(), Some(&(1, true)));
    assert!(order.contains(&(2, false)));
    assert!(order.contains(&(3, true)));

    let mut uploaded = service.uploaded.lock().unwrap().clone();
    uploaded.sort();
    assert_eq!(uploaded, vec!["quick.pdf", "slow.pdf"]);
}

#[test]
fn query_completion_carries_its_ticket() {
    let engine =
        EngineHandle::with_client(Arc::new(FakeService::default()), PathBuf::from("unused"))
            .unwrap();
    engine.query(7, "hello");

    match collect(&engine, 1).pop() {
        Some(EngineEvent::QueryCompleted { ticket, result }) => {
            assert_eq!(ticket, 7);
            assert_eq!(result.unwrap().answer, "echo: hello");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn download_lands_in_the_download_dir() {
    let dir = tempfile::tempdir().unwrap();
    let engine = EngineHandle::with_client(
        Arc::new(FakeService::default()),
        dir.path().to_path_buf(),
    )
    .unwrap();
    engine.download("notes.txt");

    match collect(&engine, 1).pop() {
        Some(EngineEvent::DownloadCompleted {
            source_file,
            result,
        }) => {
            assert_eq!(source_file, "notes.txt");
            let path = result.unwrap();
            assert_eq!(path, dir.path().join("notes.txt"));
            assert_eq!(std::fs::read(path).unwrap(), b"notes.txt");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn delete_failure_is_reported() {
    let engine =
        EngineHandle::with_client(Arc::new(FakeService::default()), PathBuf::from("unused"))
            .unwrap();
    engine.delete_document("d1");

    match collect(&engine, 1).pop() {
        Some(EngineEvent::DocumentDeleted {
            document_id,
            result,
        }) => {
            assert_eq!(document_id, "d1");
            assert_eq!(result.unwrap_err().kind, FailureKind::HttpStatus(405));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

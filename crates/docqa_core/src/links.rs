use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("invalid service url: {0}")]
    InvalidBase(String),
    #[error("service url cannot carry a path: {0}")]
    CannotBeABase(String),
}

/// Stable URL under which the service serves an uploaded source file
/// (`{base}/uploads/{source_file}`), usable for viewing or downloading.
pub fn source_file_url(base: &str, source_file: &str) -> Result<Url, LinkError> {
    let mut url = Url::parse(base).map_err(|err| LinkError::InvalidBase(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| LinkError::CannotBeABase(base.to_string()))?
        .pop_if_empty()
        .push("uploads")
        .push(source_file);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_under_uploads() {
        let url = source_file_url("http://127.0.0.1:8000", "policy.pdf").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/uploads/policy.pdf");
    }

    #[test]
    fn keeps_base_path_and_escapes_name() {
        let url = source_file_url("https://example.com/api/", "my report?.pdf").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/uploads/my%20report%3F.pdf"
        );
    }

    #[test]
    fn rejects_non_hierarchical_base() {
        assert!(matches!(
            source_file_url("mailto:someone@example.com", "a.pdf"),
            Err(LinkError::CannotBeABase(_))
        ));
        assert!(matches!(
            source_file_url("not a url", "a.pdf"),
            Err(LinkError::InvalidBase(_))
        ));
    }
}

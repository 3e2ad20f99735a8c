use std::path::PathBuf;

use super::AssemblyError;

/// Where attachment bytes come from
#[derive(Debug, Clone)]
pub enum AttachmentSource {
    /// Bytes already in memory (e.g. an uploaded payment proof)
    Inline(Vec<u8>),
    /// File read at assembly time
    Path(PathBuf),
}

/// An attachment as requested by the composer
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub source: AttachmentSource,
    pub content_type: String,
    /// Set for parts embedded in the body via `cid:` references
    pub content_id: Option<String>,
}

impl Attachment {
    pub fn from_path(
        filename: impl Into<String>,
        path: impl Into<PathBuf>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            source: AttachmentSource::Path(path.into()),
            content_type: content_type.into(),
            content_id: None,
        }
    }

    pub fn from_bytes(
        filename: impl Into<String>,
        content: Vec<u8>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            source: AttachmentSource::Inline(content),
            content_type: content_type.into(),
            content_id: None,
        }
    }

    /// Embed the attachment inline under `content_id`
    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    /// Read the bytes now. A missing file is fatal for the message.
    pub async fn resolve(self) -> Result<ResolvedAttachment, AssemblyError> {
        let content = match self.source {
            AttachmentSource::Inline(bytes) => bytes,
            AttachmentSource::Path(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(source) => {
                    return Err(AssemblyError::AttachmentUnavailable {
                        filename: self.filename,
                        path,
                        source,
                    })
                }
            },
        };

        Ok(ResolvedAttachment {
            filename: self.filename,
            content,
            content_type: self.content_type,
            content_id: self.content_id,
        })
    }
}

/// Attachment with its bytes loaded, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub content_id: Option<String>,
}

impl ResolvedAttachment {
    pub fn is_inline(&self) -> bool {
        self.content_id.is_some()
    }
}

/// Guess a MIME type from a file extension
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_inline_bytes() {
        let resolved = Attachment::from_bytes("proof.png", vec![1, 2, 3], "image/png")
            .resolve()
            .await
            .unwrap();
        assert_eq!(resolved.content, vec![1, 2, 3]);
        assert!(!resolved.is_inline());
    }

    #[tokio::test]
    async fn test_resolve_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BankDetails.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let resolved = Attachment::from_path("BankDetails.pdf", &path, "application/pdf")
            .with_content_id("bank")
            .resolve()
            .await
            .unwrap();
        assert_eq!(resolved.content, b"%PDF-1.4");
        assert!(resolved.is_inline());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let err = Attachment::from_path("logo.png", "/nonexistent/logo.png", "image/png")
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::AttachmentUnavailable { ref filename, .. } if filename == "logo.png"
        ));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("BankDetails.PDF"), "application/pdf");
        assert_eq!(content_type_for("proof.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}

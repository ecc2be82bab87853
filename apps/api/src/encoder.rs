//! Encoder — turns an uploaded byte source into a base64 payload.
//!
//! The source is drained through one suspension point (`encode`), so callers
//! see a single completion: the encoded document, or a `ReadError`.

use async_trait::async_trait;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::models::document::{EncodedDocument, MediaType};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error while reading upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload stream interrupted: {0}")]
    Stream(String),

    #[error("Upload exceeds the size limit")]
    TooLarge,

    #[error("Uploaded file is empty")]
    Empty,
}

impl From<MultipartError> for ReadError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ReadError::TooLarge
        } else {
            ReadError::Stream(e.body_text())
        }
    }
}

/// Anything the encoder can drain chunk by chunk.
#[async_trait]
pub trait ByteSource: Send {
    /// Returns the next chunk, or `None` once the source is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ReadError>;
}

#[async_trait]
impl<'a> ByteSource for Field<'a> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ReadError> {
        Ok(self.chunk().await?)
    }
}

/// An in-memory body, yielded as a single chunk.
#[async_trait]
impl ByteSource for Option<Bytes> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ReadError> {
        Ok(self.take())
    }
}

/// Drains `source` and base64-encodes its contents.
pub async fn encode<S>(source: &mut S, media_type: MediaType) -> Result<EncodedDocument, ReadError>
where
    S: ByteSource + ?Sized,
{
    let mut raw = Vec::new();
    while let Some(chunk) = source.next_chunk().await? {
        raw.extend_from_slice(&chunk);
    }

    if raw.is_empty() {
        return Err(ReadError::Empty);
    }

    debug!("Encoded {} bytes of {media_type}", raw.len());

    Ok(EncodedDocument {
        payload: STANDARD.encode(&raw),
        media_type,
        byte_len: raw.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncReadExt;

    const READ_CHUNK_BYTES: usize = 64 * 1024;

    /// Reads a file in fixed-size chunks.
    struct FileSource {
        file: tokio::fs::File,
    }

    #[async_trait]
    impl ByteSource for FileSource {
        async fn next_chunk(&mut self) -> Result<Option<Bytes>, ReadError> {
            let mut buf = vec![0u8; READ_CHUNK_BYTES];
            let n = self.file.read(&mut buf).await?;
            if n == 0 {
                return Ok(None);
            }
            buf.truncate(n);
            Ok(Some(Bytes::from(buf)))
        }
    }

    /// Yields one chunk, then fails as if the connection dropped.
    struct BrokenSource {
        served: bool,
    }

    #[async_trait]
    impl ByteSource for BrokenSource {
        async fn next_chunk(&mut self) -> Result<Option<Bytes>, ReadError> {
            if self.served {
                return Err(ReadError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "peer went away",
                )));
            }
            self.served = true;
            Ok(Some(Bytes::from_static(b"%PDF-1.7")))
        }
    }

    #[tokio::test]
    async fn test_encode_in_memory() {
        let mut source = Some(Bytes::from_static(b"hello"));
        let doc = encode(&mut source, MediaType::PlainText).await.unwrap();
        assert_eq!(doc.payload, "aGVsbG8=");
        assert_eq!(doc.media_type, MediaType::PlainText);
        assert_eq!(doc.byte_len, 5);
    }

    #[tokio::test]
    async fn test_encode_file_across_chunks() {
        let data: Vec<u8> = (0..(READ_CHUNK_BYTES * 2 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();

        let mut source = FileSource {
            file: tokio::fs::File::open(file.path()).await.unwrap(),
        };
        let doc = encode(&mut source, MediaType::Pdf).await.unwrap();

        assert_eq!(doc.byte_len, data.len());
        assert_eq!(STANDARD.decode(doc.payload).unwrap(), data);
    }

    #[tokio::test]
    async fn test_encode_interrupted_source_is_read_error() {
        let mut source = BrokenSource { served: false };
        let err = encode(&mut source, MediaType::Pdf).await.unwrap_err();
        assert!(matches!(err, ReadError::Io(_)));
    }

    #[tokio::test]
    async fn test_encode_empty_source_is_read_error() {
        let mut source: Option<Bytes> = None;
        let err = encode(&mut source, MediaType::Png).await.unwrap_err();
        assert!(matches!(err, ReadError::Empty));
    }
}

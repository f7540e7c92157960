//! HTTP transfer port.
//!
//! Streams the file as one part of a multipart POST, reporting progress
//! after each chunk leaves the reader. Status 200-299 is success;
//! anything else is a rejection carrying the status code.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode, Url};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::TransferPort;
use crate::error::{Result, TransferError, UploadError};
use crate::queue::FileHandle;
use crate::scheduler::channel::ProgressFeed;

/// Read size per chunk of request body.
const UPLOAD_CHUNK_SIZE: usize = 256 * 1024;

/// Multipart field name the endpoint reads files from.
const FIELD_NAME: &str = "files";

/// Uploads files to a fixed endpoint over HTTP.
pub struct HttpPort {
    client: Client,
    endpoint: Url,
}

impl HttpPort {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| UploadError::Config(format!("invalid endpoint {endpoint}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn classify(status: StatusCode) -> std::result::Result<(), TransferError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(TransferError::Rejected {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl TransferPort for HttpPort {
    async fn transfer(
        &self,
        handle: FileHandle,
        progress: ProgressFeed,
    ) -> std::result::Result<(), TransferError> {
        let file = File::open(&handle.path)
            .await
            .map_err(|e| TransferError::Network {
                reason: format!("open {}: {e}", handle.path.display()),
            })?;

        let total = handle.size;
        let body = stream::unfold((file, 0u64), move |(mut file, sent)| {
            let progress = progress.clone();
            async move {
                let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
                match file.read(&mut buf).await {
                    Ok(0) => None,
                    Ok(n) => {
                        buf.truncate(n);
                        let sent = sent + n as u64;
                        if total > 0 {
                            progress.report(sent as f64 / total as f64);
                        }
                        Some((Ok(Bytes::from(buf)), (file, sent)))
                    }
                    Err(e) => Some((Err(e), (file, sent))),
                }
            }
        });

        let part = Part::stream_with_length(Body::wrap_stream(body), total)
            .file_name(handle.name.clone());
        let form = Form::new().part(FIELD_NAME, part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransferError::Network {
                reason: e.to_string(),
            })?;

        classify(response.status())
    }
}

// Storage backend: uploads image files and JSON metadata to IPFS through a
// Pinata-compatible pinning service and hands back gateway URIs.
//
// The HTTP client is blocking; the mint flow is strictly sequential so
// there is nothing to gain from async here.

use crate::config::StorageConfig;
use crate::nft::JsonMetadata;
use anyhow::{bail, Context, Result};
use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use std::path::Path;

/// A file ready to be uploaded: bytes plus the name and content type the
/// storage service should record.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageFile {
    pub buffer: Vec<u8>,
    pub file_name: String,
    pub content_type: &'static str,
}

impl StorageFile {
    /// Wrap a buffer, guessing the content type from the file extension.
    pub fn new(buffer: Vec<u8>, file_name: &str) -> Self {
        StorageFile {
            buffer,
            file_name: file_name.to_string(),
            content_type: content_type_for(file_name),
        }
    }

    /// Read a file from disk. The stored name is the file name without its
    /// directory.
    pub fn read(path: &Path) -> Result<Self> {
        let buffer = std::fs::read(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("file");
        Ok(StorageFile::new(buffer, file_name))
    }
}

/// Content type from a file extension; unknown extensions are sent as raw
/// bytes.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Anything that can store a file and return a URI for it.
pub trait Storage {
    fn upload(&self, file: &StorageFile) -> Result<String>;

    /// Serialize the metadata document and upload it as `metadata.json`.
    fn upload_json(&self, metadata: &JsonMetadata) -> Result<String> {
        let buffer = serde_json::to_vec(metadata).context("Serializing metadata json")?;
        self.upload(&StorageFile::new(buffer, "metadata.json"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PinataResponse {
    pub data: PinataFileData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PinataFileData {
    pub name: String,
    pub cid: String,
    pub size: Option<u64>,
}

/// Blocking client for the Pinata upload API.
#[derive(Clone)]
pub struct PinataStorage {
    client: Client,
    upload_url: String,
    gateway_url: String,
    jwt: String,
}

impl PinataStorage {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(PinataStorage {
            client,
            upload_url: config.upload_url.clone(),
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            jwt: config.jwt.clone(),
        })
    }

    /// Public gateway URI of a pinned content id.
    pub fn gateway_uri(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }
}

impl Storage for PinataStorage {
    fn upload(&self, file: &StorageFile) -> Result<String> {
        let part = multipart::Part::bytes(file.buffer.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type)
            .context("Invalid content type")?;
        let form = multipart::Form::new()
            .text("network", "public")
            .part("file", part);

        let res = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .with_context(|| format!("Failed to send upload request for {}", file.file_name))?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            bail!("Upload of {} failed: {} - {}", file.file_name, status, txt);
        }

        let body: PinataResponse = res.json().context("Parsing upload response json")?;
        if body.data.size == Some(0) {
            bail!("Storage accepted {} as an empty file", body.data.name);
        }
        Ok(self.gateway_uri(&body.data.cid))
    }
}

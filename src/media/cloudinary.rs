use rocket::fs::TempFile;
use rocket::tokio::io::AsyncReadExt;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{upload_extension, MediaStorage, StorageBackend, StoredMedia};
use crate::config::CloudinaryConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Uploads hosted on Cloudinary (https://cloudinary.com/documentation/image_upload_api_reference)
pub struct CloudinaryStorage {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryStorage {
    pub fn new(config: CloudinaryConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;
        Ok(CloudinaryStorage { config, client })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.config.cloud_name, action)
    }

    /// Sign the non-file params: sorted `k=v` pairs joined by `&`, secret appended.
    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(params, &self.config.api_secret)
    }

    async fn post(&self, action: &str, form: reqwest::multipart::Form) -> Result<Value, String> {
        let resp = self
            .client
            .post(self.endpoint(action))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Cloudinary {} request failed: {}", action, e))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| format!("Cloudinary {} JSON parse error: {}", action, e))?;

        if !status.is_success() {
            let msg = body
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(format!("Cloudinary {} returned {}: {}", action, status, msg));
        }
        Ok(body)
    }
}

pub(crate) fn sign_params(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Public id from a delivery URL: the path after `/upload/`, minus an optional
/// `v<digits>/` version segment and the file extension.
pub(crate) fn public_id_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let path = parsed.path();
    let (_, rest) = path.split_once("/upload/")?;
    let rest = match rest.split_once('/') {
        Some((first, tail))
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            tail
        }
        _ => rest,
    };
    let id = match rest.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => rest,
    };
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[rocket::async_trait]
impl MediaStorage for CloudinaryStorage {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Cloudinary
    }

    async fn store(&self, file: &mut TempFile<'_>) -> Result<StoredMedia, String> {
        let mut bytes = Vec::new();
        let mut reader = Box::pin(
            file.open()
                .await
                .map_err(|e| format!("failed to read upload: {}", e))?,
        );
        reader
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| format!("failed to read upload: {}", e))?;

        let file_name = format!(
            "{}.{}",
            file.name().unwrap_or("upload"),
            upload_extension(file)
        );

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let folder = self.config.folder.clone().unwrap_or_default();
        let signature = self.sign(&[("folder", folder.clone()), ("timestamp", timestamp.clone())]);

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            )
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);
        if !folder.is_empty() {
            form = form.text("folder", folder);
        }

        let body = self.post("upload", form).await?;
        let url = body
            .get("secure_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "Cloudinary upload response has no secure_url".to_string())?;
        let public_id = body
            .get("public_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "Cloudinary upload response has no public_id".to_string())?;

        Ok(StoredMedia {
            reference: url.to_string(),
            public_id: Some(public_id.to_string()),
            backend: StorageBackend::Cloudinary,
        })
    }

    async fn delete(&self, media: &StoredMedia) -> Result<(), String> {
        let public_id = media
            .public_id
            .clone()
            .or_else(|| public_id_from_url(&media.reference))
            .ok_or_else(|| format!("no Cloudinary public id for {}", media.reference))?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id.clone()),
            ("timestamp", timestamp.clone()),
        ]);
        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.clone())
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let body = self.post("destroy", form).await?;
        match body.get("result").and_then(|r| r.as_str()) {
            Some("ok") | Some("not found") => Ok(()),
            other => Err(format!(
                "Cloudinary destroy of {} failed: {}",
                public_id,
                other.unwrap_or("no result")
            )),
        }
    }

    fn url(&self, media: &StoredMedia) -> String {
        media.reference.clone()
    }
}

use std::path::PathBuf;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use log::{error, info};
use thiserror::Error;

use super::composer::to_data_uri;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write QR image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to upload QR image: {0}")]
    Upload(String),
}

pub struct S3Sink {
    pub client: S3Client,
    pub bucket: String,
    pub region: String,
    pub key_prefix: String,
}

impl S3Sink {
    fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key)
    }
}

/// Where composed QR images end up. The returned string is the record's
/// `qr_image_reference`.
pub enum QrSink {
    /// `data:image/png;base64,...` kept on the record itself.
    Inline,
    /// `qr_code_{id}.png` under `dir`.
    Disk { dir: PathBuf },
    S3(S3Sink),
}

pub fn file_name(employee_id: &str) -> String {
    format!("qr_code_{}.png", employee_id)
}

impl QrSink {
    pub async fn store(&self, employee_id: &str, png: Vec<u8>) -> Result<String, SinkError> {
        match self {
            QrSink::Inline => Ok(to_data_uri(&png)),
            QrSink::Disk { dir } => {
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(file_name(employee_id));
                tokio::fs::write(&path, png).await?;
                info!("Saved QR code for {} to {}", employee_id, path.display());
                Ok(path.to_string_lossy().into_owned())
            }
            QrSink::S3(s3) => {
                let key = format!("{}{}", s3.key_prefix, file_name(employee_id));
                s3.client
                    .put_object()
                    .bucket(&s3.bucket)
                    .key(&key)
                    .content_type("image/png")
                    .acl(ObjectCannedAcl::PublicRead)
                    .body(ByteStream::from(png))
                    .send()
                    .await
                    .map_err(|err| {
                        error!("Error uploading {} to S3: {}", key, err);
                        SinkError::Upload(err.to_string())
                    })?;
                let url = s3.public_url(&key);
                info!("Uploaded QR code for {} to {}", employee_id, url);
                Ok(url)
            }
        }
    }

    /// Best-effort removal of a stored artifact whose record is gone or was never written.
    pub async fn discard(&self, employee_id: &str) -> Result<(), SinkError> {
        match self {
            QrSink::Inline => Ok(()),
            QrSink::Disk { dir } => {
                match tokio::fs::remove_file(dir.join(file_name(employee_id))).await {
                    Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
                    _ => Ok(()),
                }
            }
            QrSink::S3(s3) => {
                let key = format!("{}{}", s3.key_prefix, file_name(employee_id));
                s3.client
                    .delete_object()
                    .bucket(&s3.bucket)
                    .key(&key)
                    .send()
                    .await
                    .map_err(|err| SinkError::Upload(err.to_string()))?;
                Ok(())
            }
        }
    }
}

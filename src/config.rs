use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::qr::composer::QrSettings;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Memory,
    JsonFile(PathBuf),
    Postgres(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkKind {
    Inline,
    Disk(PathBuf),
    S3 {
        bucket: String,
        region: String,
        key_prefix: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub base_url: Url,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub storage: StorageBackend,
    pub sink: SinkKind,
    pub qr: QrSettings,
    pub logo_path: Option<PathBuf>,
    /// Username and password of an admin created at startup if absent.
    pub bootstrap_admin: Option<(String, String)>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let base_url_raw = get("BASE_URL").unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
        let base_url = Url::parse(&base_url_raw).map_err(|err| ConfigError::Invalid {
            key: "BASE_URL",
            value: base_url_raw.clone(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                key: "BASE_URL",
                value: base_url_raw,
                reason: "must be an absolute http(s) URL".to_string(),
            });
        }

        let storage = match get("STORAGE_BACKEND").as_deref().unwrap_or("json") {
            "memory" => StorageBackend::Memory,
            "json" => StorageBackend::JsonFile(PathBuf::from(
                get("DATA_FILE").unwrap_or_else(|| "data.json".to_string()),
            )),
            "postgres" => StorageBackend::Postgres(
                get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            ),
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: other.to_string(),
                    reason: "expected memory, json or postgres".to_string(),
                })
            }
        };

        let sink = match get("QR_SINK").as_deref().unwrap_or("inline") {
            "inline" => SinkKind::Inline,
            "disk" => SinkKind::Disk(PathBuf::from(
                get("QR_CODES_DIR").unwrap_or_else(|| "employee_qrcodes".to_string()),
            )),
            "s3" => SinkKind::S3 {
                bucket: get("AWS_S3_BUCKET").ok_or(ConfigError::Missing("AWS_S3_BUCKET"))?,
                region: get("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                key_prefix: lookup("S3_KEY_PREFIX").unwrap_or_else(|| "qrcodes/".to_string()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "QR_SINK",
                    value: other.to_string(),
                    reason: "expected inline, disk or s3".to_string(),
                })
            }
        };

        let defaults = QrSettings::default();
        let qr = QrSettings {
            box_size: parse(&get, "QR_BOX_SIZE", defaults.box_size)?,
            border: parse(&get, "QR_BORDER", defaults.border)?,
            logo_ratio: parse(&get, "LOGO_SIZE_RATIO", defaults.logo_ratio)?,
            padding_ratio: parse(&get, "WHITE_PADDING_RATIO", defaults.padding_ratio)?,
            pad_color: defaults.pad_color,
        };
        check_range("QR_BOX_SIZE", qr.box_size as f32, 1.0, 50.0)?;
        check_range("QR_BORDER", qr.border as f32, 0.0, 20.0)?;
        if !(qr.logo_ratio > 0.0 && qr.logo_ratio <= 0.3) {
            return Err(ConfigError::Invalid {
                key: "LOGO_SIZE_RATIO",
                value: qr.logo_ratio.to_string(),
                reason: "must be in (0, 0.3]".to_string(),
            });
        }
        check_range("WHITE_PADDING_RATIO", qr.padding_ratio, 1.0, 2.0)?;

        let bootstrap_admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        };

        Ok(AppConfig {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            base_url,
            jwt_secret,
            token_ttl_days: parse(&get, "TOKEN_TTL_DAYS", 7)?,
            storage,
            sink,
            qr,
            logo_path: get("LOGO_PATH").map(PathBuf::from),
            bootstrap_admin,
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}

fn check_range(key: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: format!("must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_secret() {
        let cfg = config(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(cfg.storage, StorageBackend::JsonFile(PathBuf::from("data.json")));
        assert_eq!(cfg.sink, SinkKind::Inline);
        assert_eq!(cfg.qr, QrSettings::default());
        assert_eq!(cfg.token_ttl_days, 7);
        assert!(cfg.logo_path.is_none());
        assert!(cfg.bootstrap_admin.is_none());
    }

    #[test]
    fn secret_is_required() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::Missing("JWT_SECRET"));
        assert_eq!(
            config(&[("JWT_SECRET", "  ")]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn postgres_needs_database_url() {
        let err = config(&[("JWT_SECRET", "s"), ("STORAGE_BACKEND", "postgres")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let cfg = config(&[
            ("JWT_SECRET", "s"),
            ("STORAGE_BACKEND", "postgres"),
            ("DATABASE_URL", "postgres://localhost/emergency"),
        ])
        .unwrap();
        assert_eq!(
            cfg.storage,
            StorageBackend::Postgres("postgres://localhost/emergency".to_string())
        );
    }

    #[test]
    fn s3_sink_reads_bucket_and_region() {
        let cfg = config(&[
            ("JWT_SECRET", "s"),
            ("QR_SINK", "s3"),
            ("AWS_S3_BUCKET", "qr-bucket"),
            ("AWS_REGION", "eu-west-1"),
        ])
        .unwrap();
        assert_eq!(
            cfg.sink,
            SinkKind::S3 {
                bucket: "qr-bucket".to_string(),
                region: "eu-west-1".to_string(),
                key_prefix: "qrcodes/".to_string(),
            }
        );
    }

    #[test]
    fn logo_ratio_is_bounded() {
        let err = config(&[("JWT_SECRET", "s"), ("LOGO_SIZE_RATIO", "0.5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOGO_SIZE_RATIO", .. }));

        let err = config(&[("JWT_SECRET", "s"), ("LOGO_SIZE_RATIO", "big")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOGO_SIZE_RATIO", .. }));

        let cfg = config(&[("JWT_SECRET", "s"), ("LOGO_SIZE_RATIO", "0.25")]).unwrap();
        assert_eq!(cfg.qr.logo_ratio, 0.25);
    }

    #[test]
    fn ratios_must_be_finite() {
        for (key, value) in [
            ("WHITE_PADDING_RATIO", "NaN"),
            ("WHITE_PADDING_RATIO", "inf"),
            ("LOGO_SIZE_RATIO", "NaN"),
        ] {
            let err = config(&[("JWT_SECRET", "s"), (key, value)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: k, .. } if k == key), "{}={}", key, value);
        }

        let cfg = config(&[("JWT_SECRET", "s"), ("WHITE_PADDING_RATIO", "2")]).unwrap();
        assert_eq!(cfg.qr.padding_ratio, 2.0);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = config(&[("JWT_SECRET", "s"), ("STORAGE_BACKEND", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_BACKEND", .. }));
    }

    #[test]
    fn bootstrap_admin_needs_both_values() {
        let cfg = config(&[("JWT_SECRET", "s"), ("ADMIN_USERNAME", "root")]).unwrap();
        assert!(cfg.bootstrap_admin.is_none());

        let cfg = config(&[
            ("JWT_SECRET", "s"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "changeme123"),
        ])
        .unwrap();
        assert_eq!(
            cfg.bootstrap_admin,
            Some(("root".to_string(), "changeme123".to_string()))
        );
    }
}

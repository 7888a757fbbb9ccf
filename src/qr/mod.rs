pub mod composer;
pub mod sink;

use log::info;
use url::Url;

use crate::errors::AppError;
use composer::QrComposer;
use sink::QrSink;

/// Turns an employee id into a stored QR artifact pointing at their public page.
pub struct QrService {
    base_url: Url,
    composer: QrComposer,
    sink: QrSink,
}

impl QrService {
    pub fn new(base_url: Url, composer: QrComposer, sink: QrSink) -> Self {
        Self { base_url, composer, sink }
    }

    /// `{base_url}/employee/{id}`, with the id percent-encoded as one path segment.
    pub fn employee_url(&self, employee_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("employee").push(employee_id);
        }
        url
    }

    pub fn render_png(&self, employee_id: &str) -> Result<Vec<u8>, AppError> {
        let url = self.employee_url(employee_id);
        Ok(self.composer.compose_png(url.as_str())?)
    }

    /// Compose and hand the PNG to the sink; returns the reference to store on the record.
    pub async fn publish(&self, employee_id: &str) -> Result<String, AppError> {
        let png = self.render_png(employee_id)?;
        let reference = self.sink.store(employee_id, png).await?;
        info!(
            "Generated QR code for {} (logo: {}), encoded URL: {}",
            employee_id,
            self.composer.has_logo(),
            self.employee_url(employee_id)
        );
        Ok(reference)
    }

    pub async fn discard(&self, employee_id: &str) -> Result<(), AppError> {
        Ok(self.sink.discard(employee_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::composer::QrSettings;

    fn service(base: &str) -> QrService {
        QrService::new(
            Url::parse(base).unwrap(),
            QrComposer::new(QrSettings::default(), None),
            QrSink::Inline,
        )
    }

    #[test]
    fn employee_url_appends_segments() {
        assert_eq!(
            service("http://192.168.0.139:5000").employee_url("E1").as_str(),
            "http://192.168.0.139:5000/employee/E1"
        );
        assert_eq!(
            service("https://example.org/directory/").employee_url("E1").as_str(),
            "https://example.org/directory/employee/E1"
        );
    }

    #[test]
    fn employee_url_escapes_id() {
        let url = service("http://localhost:8080").employee_url("a b/c");
        assert_eq!(url.as_str(), "http://localhost:8080/employee/a%20b%2Fc");
    }

    #[tokio::test]
    async fn published_inline_code_decodes_to_employee_url() {
        use base64::{engine::general_purpose, Engine as _};

        let qr = service("http://localhost:8080");
        let reference = qr.publish("E1").await.unwrap();
        let encoded = reference.strip_prefix("data:image/png;base64,").unwrap();
        let png = general_purpose::STANDARD.decode(encoded).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgb8();

        assert_eq!(composer::tests::decode(&img), "http://localhost:8080/employee/E1");
    }
}

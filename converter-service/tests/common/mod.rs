use converter_service::config::{ConverterConfig, StorageConfig};
use converter_service::services::Storage;
use converter_service::startup::Application;
use image::{ImageFormat, Rgba, RgbaImage};
use service_core::config::Config as CoreConfig;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub storage_root: PathBuf,
    pub uploads: Arc<dyn Storage>,
    pub outputs: Arc<dyn Storage>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let storage_root = PathBuf::from(format!("target/test-storage-{}", Uuid::new_v4()));

        let config = ConverterConfig {
            common: CoreConfig { port: 0 }, // Random port for testing
            storage: StorageConfig {
                upload_dir: storage_root.join("uploads").to_string_lossy().to_string(),
                output_dir: storage_root.join("output").to_string_lossy().to_string(),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let uploads = app.state().uploads.clone();
        let outputs = app.state().outputs.clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/api/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            storage_root,
            uploads,
            outputs,
            client,
        }
    }

    pub async fn post_convert(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.client
            .post(format!("{}/convert", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub fn upload_path(&self, key: &str) -> PathBuf {
        self.uploads.path(key)
    }

    pub fn output_path(&self, key: &str) -> PathBuf {
        self.outputs.path(key)
    }

    /// Cleanup test storage.
    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.storage_root).await;
    }
}

/// A solid-colour RGBA PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 180]))
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode PNG");
    out.into_inner()
}

/// Filenames are sent as raw UTF-8, the way browsers submit them.
pub fn image_form(filename: &str, data: Vec<u8>) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().percent_encode_noop().part(
        "image",
        reqwest::multipart::Part::bytes(data).file_name(filename.to_string()),
    )
}

/// Page count and the first page's MediaBox of a PDF.
pub fn inspect_pdf(bytes: &[u8]) -> (usize, Vec<i64>) {
    let doc = lopdf::Document::load_mem(bytes).expect("Response is not a valid PDF");
    let pages = doc.get_pages();
    let page_id = *pages.values().next().expect("PDF has no pages");
    let media_box = doc
        .get_object(page_id)
        .and_then(|page| page.as_dict())
        .and_then(|page| page.get(b"MediaBox"))
        .and_then(|media_box| media_box.as_array())
        .expect("Page has no MediaBox")
        .iter()
        .map(|value| value.as_i64().expect("MediaBox entry is not an integer"))
        .collect();

    (pages.len(), media_box)
}

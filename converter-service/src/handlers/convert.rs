use crate::error::ConverterError;
use crate::services::{convert_image_to_pdf, output_key};
use crate::startup::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use metrics::counter;
use tokio_util::io::ReaderStream;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

struct Upload {
    filename: String,
    data: Bytes,
}

/// `POST /convert`: store the uploaded image, convert it and send the PDF back
/// as an attachment.
pub async fn convert_to_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ConverterError> {
    let result = convert(&state, multipart).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    counter!("conversions_total", "outcome" => outcome).increment(1);

    result
}

async fn convert(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ConverterError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Request body is not multipart");
        ConverterError::MissingFile
    })?;
    let upload = read_image_field(&mut multipart).await?;
    let pdf_key = output_key(&upload.filename);

    tracing::info!(
        filename = %upload.filename,
        size = upload.data.len(),
        "Upload received"
    );

    // Held until the PDF is open so a concurrent upload of the same name
    // cannot swap either file underneath this request.
    let guard = state.locks.acquire(&pdf_key).await;

    state.uploads.upload(&upload.filename, &upload.data).await?;

    let source = state.uploads.path(&upload.filename);
    let destination = state.outputs.path(&pdf_key);
    let info =
        tokio::task::spawn_blocking(move || convert_image_to_pdf(&source, &destination)).await??;

    let file = state.outputs.open(&pdf_key).await?;
    drop(guard);

    tracing::info!(
        output_key = %pdf_key,
        width = info.width,
        height = info.height,
        pdf_size = info.bytes,
        "Conversion completed"
    );

    let download_name = pdf_key.rsplit('/').next().unwrap_or(&pdf_key);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_LENGTH, info.bytes.to_string()),
            (header::CONTENT_DISPOSITION, attachment_disposition(download_name)),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

/// `Content-Disposition` for downloading `filename`.
///
/// `filename` carries an ASCII rendition with non-ASCII characters replaced
/// by `_`. Names that are not pure ASCII also get an RFC 6266
/// `filename*=UTF-8''` parameter with the exact name.
pub fn attachment_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' => "\\\"".to_string(),
            '\\' => "\\\\".to_string(),
            c if c.is_ascii() && !c.is_ascii_control() => c.to_string(),
            _ => "_".to_string(),
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_ascii_control()) {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(filename)
        )
    }
}

/// Find the `image` file field.
///
/// A part without a filename parameter is an ordinary form value, not a file,
/// and is skipped. A file part whose filename is empty means the browser form
/// was submitted without choosing a file.
async fn read_image_field(multipart: &mut Multipart) -> Result<Upload, ConverterError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            None => continue,
            Some("") => return Err(ConverterError::NoSelectedFile),
            Some(name) => name.to_string(),
        };

        let data = field.bytes().await?;
        return Ok(Upload { filename, data });
    }

    Err(ConverterError::MissingFile)
}

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Everything that can go wrong while turning an upload into a PDF.
///
/// Client mistakes render as 400 with a fixed body. All other variants render
/// as `An error occurred: <description>`, and are kept apart so logs and
/// metrics can tell decode failures from storage or encoder failures.
#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("{0}")]
    Upload(#[from] MultipartError),

    #[error("{0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    Decode(image::ImageError),

    #[error("{0}")]
    Encode(anyhow::Error),

    #[error("conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ConverterError {
    /// Stable label used in logs and the `conversions_total` metric.
    pub fn kind(&self) -> &'static str {
        match self {
            ConverterError::MissingFile => "missing_file",
            ConverterError::NoSelectedFile => "no_selected_file",
            ConverterError::Upload(_) => "upload",
            ConverterError::Storage(_) => "storage",
            ConverterError::Decode(_) => "decode",
            ConverterError::Encode(_) => "encode",
            ConverterError::Task(_) => "task",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ConverterError::MissingFile | ConverterError::NoSelectedFile => {
                StatusCode::BAD_REQUEST
            }
            ConverterError::Upload(err) => err.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<image::ImageError> for ConverterError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => ConverterError::Storage(io),
            other => ConverterError::Decode(other),
        }
    }
}

impl From<lopdf::Error> for ConverterError {
    fn from(err: lopdf::Error) -> Self {
        ConverterError::Encode(anyhow::Error::new(err))
    }
}

impl IntoResponse for ConverterError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ConverterError::MissingFile | ConverterError::NoSelectedFile => self.to_string(),
            ref err => {
                tracing::error!(
                    error_kind = err.kind(),
                    error = %err,
                    "Conversion failed"
                );
                format!("An error occurred: {}", err)
            }
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_use_fixed_messages() {
        assert_eq!(ConverterError::MissingFile.to_string(), "No file uploaded");
        assert_eq!(ConverterError::NoSelectedFile.to_string(), "No selected file");
        assert_eq!(ConverterError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ConverterError::NoSelectedFile.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn io_failures_inside_image_errors_are_storage_errors() {
        let err = ConverterError::from(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        )));
        assert_eq!(err.kind(), "storage");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unsupported_formats_are_decode_errors() {
        let err = ConverterError::from(image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                image::error::ImageFormatHint::Unknown,
                image::error::UnsupportedErrorKind::Format(
                    image::error::ImageFormatHint::Unknown,
                ),
            ),
        ));
        assert_eq!(err.kind(), "decode");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

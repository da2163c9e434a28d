pub mod converter;
pub mod locks;
pub mod storage;

pub use converter::{convert_image_to_pdf, output_key, PdfInfo};
pub use locks::FileLocks;
pub use storage::{LocalStorage, Storage};

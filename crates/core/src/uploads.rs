//! Upload classification, content sniffing, and static URL mapping.
//!
//! Uploaded files live below the static directory in one sub-directory per
//! [`UploadKind`] and are addressed by clients as `/static/<subdir>/<name>`.

use image::ImageFormat;

use crate::error::CoreError;

/// Longest client extension carried over into a stored file name.
const MAX_EXTENSION_LEN: usize = 8;

/// URL prefix under which the static directory is served.
pub const STATIC_URL_PREFIX: &str = "/static/";

/// Leading bytes of every PDF file.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// What an uploaded file is used for; decides its directory and checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    CategoryIcon,
    RentalImage,
    RentalPdf,
    Document,
}

impl UploadKind {
    pub fn subdir(self) -> &'static str {
        match self {
            Self::CategoryIcon => "icons",
            Self::RentalImage => "rentals",
            Self::RentalPdf => "pdfs",
            Self::Document => "docs",
        }
    }
}

/// Lower-cased extension of a client-supplied file name.
///
/// Only short ASCII alphanumeric extensions are returned, so the result is
/// safe to splice into a path or URL segment.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Sniff a raster image and return the canonical extension to store it under.
///
/// The content decides the format; the client's file name is ignored.
pub fn sniff_image(data: &[u8]) -> Result<&'static str, CoreError> {
    let format = image::guess_format(data)
        .map_err(|_| CoreError::Validation("Uploaded file is not a recognised image".into()))?;
    match format {
        ImageFormat::Png => Ok("png"),
        ImageFormat::Jpeg => Ok("jpg"),
        ImageFormat::WebP => Ok("webp"),
        ImageFormat::Gif => Ok("gif"),
        other => Err(CoreError::Validation(format!(
            "Unsupported image format {other:?}. Supported: png, jpg, webp, gif"
        ))),
    }
}

/// Check an icon upload: any supported raster image, or an SVG document.
pub fn sniff_icon(file_name: &str, data: &[u8]) -> Result<&'static str, CoreError> {
    if extension_of(file_name).as_deref() == Some("svg") {
        let head = String::from_utf8_lossy(&data[..data.len().min(512)]);
        if head.trim_start().starts_with('<') && head.contains("<svg") {
            return Ok("svg");
        }
        return Err(CoreError::Validation("Icon is not a valid SVG file".into()));
    }
    sniff_image(data)
}

/// Check that an upload is a PDF document.
pub fn check_pdf(data: &[u8]) -> Result<(), CoreError> {
    if data.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(CoreError::Validation("pdf must be a PDF document".into()))
    }
}

/// Generate a collision-free stored file name.
pub fn stored_name(ext: &str) -> String {
    format!("{}.{ext}", uuid::Uuid::new_v4())
}

/// Public URL for a stored file.
pub fn public_url(kind: UploadKind, file_name: &str) -> String {
    format!("{STATIC_URL_PREFIX}{}/{file_name}", kind.subdir())
}

/// Path relative to the static directory for a URL produced by
/// [`public_url`]. Returns `None` for foreign URLs or traversal attempts.
pub fn relative_path_of(url: &str) -> Option<&str> {
    let rel = url.strip_prefix(STATIC_URL_PREFIX)?;
    if rel.is_empty() || rel.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return None;
    }
    Some(rel)
}

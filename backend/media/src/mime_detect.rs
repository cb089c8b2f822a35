//! Content-type detection for uploaded listing media.
//!
//! Uploads carry the type the browser would have sent; the console only
//! deals in images and short videos.

use std::path::Path;

/// Detect the upload content type from a file name's extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "svg"          => "image/svg+xml",
        "avif"         => "image/avif",
        "heic"         => "image/heic",

        "mp4"          => "video/mp4",
        "webm"         => "video/webm",
        "mov"          => "video/quicktime",

        _              => "application/octet-stream",
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Whether a MIME type is for video.
pub fn is_video(mime: &str) -> bool {
    mime.starts_with("video/")
}

/// Whether a file with this type can be attached to a listing.
pub fn is_listing_media(mime: &str) -> bool {
    is_image(mime) || is_video(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_jpeg() {
        assert_eq!(detect_mime_type(&PathBuf::from("sofa set.JPG")), "image/jpeg");
    }

    #[test]
    fn detects_mp4() {
        assert!(is_video(detect_mime_type(&PathBuf::from("walkthrough.mp4"))));
    }

    #[test]
    fn unknown_extension_fallback() {
        let mime = detect_mime_type(&PathBuf::from("invoice.pdf"));
        assert_eq!(mime, "application/octet-stream");
        assert!(!is_listing_media(mime));
    }
}

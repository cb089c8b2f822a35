//! Media handling for the Showroom console: the media reference codec,
//! upload naming, and content-type detection.

pub mod codec;
pub mod mime_detect;
pub mod upload;

pub use codec::{MediaCodec, MediaEntry, MediaKind, MediaReference, PersistedMediaField};
pub use mime_detect::{detect_mime_type, is_image, is_listing_media, is_video};
pub use upload::{sanitize_file_name, storage_path, upload_all, LocalFile};

//! Application-wide constants.

/// Content type every variant is encoded and uploaded as.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Key prefix under which uploads are filed in object storage.
pub const UPLOAD_KEY_PREFIX: &str = "uploads";

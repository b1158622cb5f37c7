use std::path::Path;

pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [_, _, _, _, b'f', b't', b'y', b'p', brand @ ..] if brand.len() >= 4 => {
            image_brand(&brand[..4])
        }
        _ => None,
    }
}

/// HEIF-family still images share the ISO-BMFF `ftyp` box with MP4.
fn image_brand(brand: &[u8]) -> Option<&'static str> {
    match brand {
        b"heic" | b"heix" | b"heim" | b"heis" | b"mif1" | b"msf1" => Some("image/heic"),
        b"avif" | b"avis" => Some("image/avif"),
        _ => None,
    }
}

pub fn detect_video_mime(bytes: &[u8]) -> Option<&'static str> {
    if detect_image_mime(bytes).is_some() {
        return None;
    }
    match bytes {
        [_, _, _, _, 0x66, 0x74, 0x79, 0x70, 0x71, 0x74, ..] => Some("video/quicktime"),
        [_, _, _, _, 0x66, 0x74, 0x79, 0x70, ..] => Some("video/mp4"),
        [0x1A, 0x45, 0xDF, 0xA3, ..] => Some("video/webm"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x41, 0x56, 0x49, 0x20, ..] => Some("video/x-msvideo"),
        _ => None,
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" | "heif" => Some("image/heic"),
        "avif" => Some("image/avif"),
        "mp4" | "m4v" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        "avi" => Some("video/x-msvideo"),
        _ => None,
    }
}

/// Best-effort MIME type for an uploaded file: magic bytes first, then extension.
pub fn detect_media_mime(bytes: &[u8], path: &Path) -> &'static str {
    if let Some(mime) = detect_image_mime(bytes).or_else(|| detect_video_mime(bytes)) {
        return mime;
    }
    mime_from_extension(path).unwrap_or_else(|| {
        tracing::warn!(
            "Unrecognized media format for {} (first 4 bytes: {:02X?}), falling back to application/octet-stream",
            path.display(),
            &bytes[..bytes.len().min(4)]
        );
        "application/octet-stream"
    })
}

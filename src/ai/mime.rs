/// Conventional extensions for the media types Gemini commonly streams back.
///
/// `mime_guess` lists extensions alphabetically (`image/jpeg` yields `jfif`
/// first), so common types are pinned here before falling back to its table.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("video/mp4", "mp4"),
    ("application/pdf", "pdf"),
    ("application/json", "json"),
    ("text/plain", "txt"),
];

/// Derive a file extension (including the leading dot) from a declared MIME
/// type. Parameters such as `;rate=24000` are ignored. Returns `None` when the
/// type is unknown.
pub fn extension_for_mime(mime_type: &str) -> Option<String> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence.is_empty() {
        return None;
    }

    if let Some((_, ext)) = PREFERRED_EXTENSIONS.iter().find(|(mime, _)| *mime == essence) {
        return Some(format!(".{}", ext));
    }

    match mime_guess::get_mime_extensions_str(&essence).and_then(|exts| exts.first()) {
        Some(ext) => Some(format!(".{}", ext)),
        None => {
            tracing::warn!("No file extension known for MIME type '{}'", mime_type);
            None
        }
    }
}

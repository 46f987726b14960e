use std::path::Path;

pub const FALLBACK_MIME_TYPE: &str = "text/plain";

/// Extensions the API should read as text even when mime_guess says otherwise.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("c", "text/plain"),
    ("h", "text/plain"),
    ("cpp", "text/plain"),
    ("hpp", "text/plain"),
    ("py", "text/plain"),
    ("js", "text/plain"),
    ("ts", "text/plain"),
    ("java", "text/plain"),
    ("cs", "text/plain"),
    ("go", "text/plain"),
    ("rs", "text/plain"),
    ("sh", "text/plain"),
    ("rb", "text/plain"),
    ("php", "text/plain"),
    ("css", "text/plain"),
    ("md", "text/plain"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
];

/// MIME type for an attachment path: fixed table, then mime_guess, then `text/plain`.
pub fn mime_type_for(path: &Path) -> String {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MIME_TYPE.to_string();
    };
    let extension = extension.to_ascii_lowercase();

    if let Some((_, mime)) = KNOWN_TYPES.iter().find(|(known, _)| *known == extension) {
        return (*mime).to_string();
    }

    mime_guess::from_ext(&extension)
        .first_raw()
        .unwrap_or(FALLBACK_MIME_TYPE)
        .to_string()
}

/// Turn a scraped reference into an absolute URL under `base_url`.
/// References carrying an `http://` or `https://` scheme are returned as is.
pub fn resolve(reference: &str, base_url: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if reference.starts_with('/') {
        format!("{}{}", base, reference)
    } else {
        format!("{}/{}", base, reference)
    }
}

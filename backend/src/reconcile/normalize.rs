/// Join key for document type names: trimmed and lowercased.
///
/// A missing name normalizes to the empty string. Callers treat the empty key as
/// unjoinable: it is never grouped and never matched against another empty key.
pub fn normalize<'a>(name: impl Into<Option<&'a str>>) -> String {
    name.into()
        .map(|name| name.trim().to_lowercase())
        .unwrap_or_default()
}

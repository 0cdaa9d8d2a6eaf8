use std::collections::HashSet;

/// Cleans raw header cells into unique column names.
///
/// Headers are trimmed. A blank header becomes `Unnamed: {index}` and a
/// repeated header gets a `.1`, `.2`, ... suffix in order of appearance.
pub fn normalize_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());

    for (index, header) in raw.iter().enumerate() {
        let trimmed = header.as_ref().trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {index}")
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }

    out
}

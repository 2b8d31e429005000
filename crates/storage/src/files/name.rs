/// Derive a display-ready movie name from a corpus file name.
///
/// `The.Matrix.1999.1080p.json` becomes `The Matrix (1999)`: the title is everything before the
/// first dot that is followed by four digits, with dots turned into spaces. Names without a
/// year lose one trailing extension and have their dots replaced.
#[must_use]
pub fn clean_movie_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".json").unwrap_or(file_name);

    if let Some((title, year)) = split_title_year(stem) {
        return format!("{} ({year})", title.replace('.', " ").trim());
    }

    let base = stem.rfind('.').map_or(stem, |i| &stem[..i]);
    base.replace('.', " ").trim().to_string()
}

fn split_title_year(stem: &str) -> Option<(&str, &str)> {
    let bytes = stem.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i] != b'.' {
            continue;
        }
        let digits = bytes.get(i + 1..i + 5)?;
        if digits.iter().all(u8::is_ascii_digit) {
            return Some((&stem[..i], &stem[i + 1..i + 5]));
        }
    }
    None
}

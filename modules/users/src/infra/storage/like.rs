/// Escape character used in every LIKE pattern this crate builds.
pub const LIKE_ESCAPE: char = '\\';

/// Build a LIKE pattern matching any value that contains `key` literally.
///
/// `%`, `_` and the escape character itself are escaped, so wildcards in
/// `key` never act as wildcards. The result is meant to be bound as a
/// parameter together with `ESCAPE '\'`.
pub fn contains_pattern(key: &str) -> String {
    let mut pattern = String::with_capacity(key.len() + 2);
    pattern.push('%');
    for c in key.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

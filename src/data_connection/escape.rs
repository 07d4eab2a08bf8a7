/*!
 * Search-term sanitization.
 *
 * User search terms are embedded into a pattern-match query, so every
 * character that is not a plain letter, digit, whitespace or one of the
 * German umlauts is prefixed with a backslash before the term reaches the
 * pattern compiler.
 */

/// Marker placed before every character that must match literally
pub const ESCAPE_MARKER: char = '\\';

/// Accented letters that pass through unescaped
const ALLOWED_ACCENTED: [char; 7] = ['Ö', 'Ü', 'Ä', 'ö', 'ü', 'ä', 'ß'];

/// Whether a character passes through the escaper unchanged
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || ALLOWED_ACCENTED.contains(&c)
}

/// Escape a raw search term
///
/// Scans left to right and consumes each character once, so inserted
/// markers are never themselves escaped. A backslash in the input is a
/// disallowed character and comes out as `\\`.
pub fn escape_special_characters(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + raw.len() / 4);
    for c in raw.chars() {
        if !is_allowed(c) {
            escaped.push(ESCAPE_MARKER);
        }
        escaped.push(c);
    }
    escaped
}

/// Turn an escaped fragment into regex source that matches it literally
///
/// The regex engine rejects escapes of non-ASCII characters and gives
/// `\<` and `\>` a word-boundary meaning, so each escaped character is
/// re-quoted instead of passed through with its marker.
pub fn literal_pattern(escaped: &str) -> String {
    let mut pattern = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE_MARKER {
            match chars.next() {
                Some(next) => pattern.push_str(&regex::escape(next.encode_utf8(&mut [0; 4]))),
                None => pattern.push_str(&regex::escape("\\")),
            }
        } else {
            pattern.push(c);
        }
    }
    pattern
}

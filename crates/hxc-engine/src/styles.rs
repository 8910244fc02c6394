//! Lexical position checks the completion triggers need before committing to
//! an expression scan: regex literals and string-interpolation blocks.

use hxc_model::{BufferCursor, LanguageFeatures};

/// Whether `pos` sits on the opening of a regex literal (`~/.../`).
pub fn is_regex_literal_at(buffer: &dyn BufferCursor, pos: usize) -> bool {
    !buffer.is_in_comment(pos)
        && buffer.char_at(pos) == '~'
        && buffer.char_at(pos + 1) == '/'
}

/// Whether the character at `pos` is escaped by an odd run of `escape_char`
/// immediately before it.
pub fn is_escaped_character(buffer: &dyn BufferCursor, pos: usize, escape_char: char) -> bool {
    let mut result = false;
    let mut i = pos as i64 - 1;
    while i >= 0 {
        if buffer.char_at(i as usize) != escape_char {
            break;
        }
        result = !result;
        i -= 1;
    }
    result
}

/// Whether `position` is inside an interpolation block (`'${expr}'`) of a
/// string literal whose quote kind supports interpolation.
///
/// Scans backward from the position: an unescaped closing quote means we left
/// the string; a `$` immediately followed by `{` (and not escaped as `$$`)
/// means we are inside a block; a `}` jumps to its matching `{` so completed
/// inner blocks are skipped, and stops the scan when that `{` is itself a
/// block opener.
pub fn is_string_interpolation_at(
    buffer: &dyn BufferCursor,
    position: usize,
    features: &LanguageFeatures,
) -> bool {
    if !features.has_string_interpolation || position == 0 {
        return false;
    }
    let Some(string_char) = buffer.string_quote_kind_at(position - 1) else {
        return false;
    };
    if !features.string_interpolation_quotes.contains(string_char) {
        return false;
    }
    let mut current = buffer.char_at(position);
    let mut i = position as i64 - 1;
    while i >= 0 {
        let next = current;
        current = buffer.char_at(i as usize);
        if current == string_char {
            if !is_escaped_character(buffer, i as usize, '\\') {
                break;
            }
        } else if current == '$' {
            if next == '{' && !is_escaped_character(buffer, i as usize, '$') {
                return true;
            }
        } else if current == '}' {
            match buffer.matching_brace(i as usize) {
                Some(open) => {
                    i = open as i64;
                    current = buffer.char_at(open);
                    if open > 0 && current == '{' && buffer.char_at(open - 1) == '$' {
                        break;
                    }
                }
                None => break,
            }
        }
        i -= 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxc_model::TextBuffer;

    fn features() -> LanguageFeatures {
        LanguageFeatures::default()
    }

    #[test]
    fn test_regex_literal_detection() {
        let buf = TextBuffer::new("var re = ~/abc/;");
        assert!(is_regex_literal_at(&buf, 9));
        assert!(!is_regex_literal_at(&buf, 10));
        assert!(!is_regex_literal_at(&buf, 0));
    }

    #[test]
    fn test_escaped_character_parity() {
        let buf = TextBuffer::new(r"a\\$x and \$y");
        // $ at 3 is preceded by two backslashes: not escaped
        assert!(!is_escaped_character(&buf, 3, '\\'));
        // $ at 11 is preceded by one: escaped
        assert!(is_escaped_character(&buf, 11, '\\'));
    }

    #[test]
    fn test_inside_interpolation_block() {
        //                      0123456789
        let buf = TextBuffer::new("var s = '${name}';");
        // position 12 is inside `name`
        assert!(is_string_interpolation_at(&buf, 12, &features()));
    }

    #[test]
    fn test_outside_block_in_same_string() {
        let buf = TextBuffer::new("var s = '${a} and b';");
        // position 17 is in the plain-text tail after the closed block
        assert!(!is_string_interpolation_at(&buf, 17, &features()));
    }

    #[test]
    fn test_double_quotes_do_not_interpolate() {
        let buf = TextBuffer::new("var s = \"${name}\";");
        assert!(!is_string_interpolation_at(&buf, 12, &features()));
    }

    #[test]
    fn test_escaped_sigil_is_literal() {
        let buf = TextBuffer::new("var s = '$${name}';");
        assert!(!is_string_interpolation_at(&buf, 13, &features()));
    }
}

//! Editor buffer point-queries.
//!
//! The engine never parses the whole file; it asks the host's text buffer
//! point questions (character, line mapping, lexical class, brace match) over
//! the live, possibly-syntactically-invalid text. `BufferCursor` is that
//! contract, and `TextBuffer` is a self-contained implementation over an
//! in-memory string, used by embedding hosts without a native buffer and by
//! the test suite.

/// Point-queries over the live text buffer.
///
/// All queries are pure; positions are character indices. Out-of-range
/// queries return neutral values (`'\0'`, empty strings) rather than failing,
/// since the engine routinely probes one or two characters past a scan
/// boundary.
pub trait BufferCursor {
    /// Total character count.
    fn length(&self) -> usize;

    /// Character at `pos`, `'\0'` when out of range.
    fn char_at(&self, pos: usize) -> char;

    /// Zero-based line containing `pos`.
    fn line_from_position(&self, pos: usize) -> i32;

    /// Position of the first character of `line`.
    fn position_from_line(&self, line: i32) -> usize;

    /// Position just past the last character of `line`, excluding the line
    /// terminator.
    fn line_end_position(&self, line: i32) -> usize;

    /// Text of `line` without its terminator; empty for out-of-range lines.
    fn line_text(&self, line: i32) -> String;

    /// Characters in `start..end`, clamped to the buffer.
    fn substring(&self, start: usize, end: usize) -> String;

    /// Whether `pos` is lexically inside a line or block comment.
    fn is_in_comment(&self, pos: usize) -> bool;

    /// Whether `pos` is lexically inside a string literal (quotes included).
    fn is_in_string(&self, pos: usize) -> bool;

    /// The quote character of the string literal covering `pos`, if any.
    fn string_quote_kind_at(&self, pos: usize) -> Option<char>;

    /// Position of the bracket matching the one at `pos`, skipping brackets
    /// inside comments and strings. `None` when `pos` is not on a bracket or
    /// the match is missing (mid-edit text).
    fn matching_brace(&self, pos: usize) -> Option<usize>;

    /// Identifier word ending at `pos` (inclusive), scanning left. With
    /// `skip_whitespace`, whitespace left of `pos` is skipped first.
    fn word_left_of(&self, pos: usize, skip_whitespace: bool) -> String;

    /// Identifier word starting at `pos`, scanning right. With
    /// `skip_whitespace`, whitespace at `pos` is skipped first.
    fn word_right_of(&self, pos: usize, skip_whitespace: bool) -> String;
}

/// Lexical class of a single character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexClass {
    Code,
    LineComment,
    BlockComment,
    Str(char),
}

/// In-memory `BufferCursor` implementation with a single-pass lexical
/// classifier for comments and strings.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    chars: Vec<char>,
    line_starts: Vec<usize>,
    classes: Vec<LexClass>,
}

impl TextBuffer {
    pub fn new(text: &str) -> TextBuffer {
        let chars: Vec<char> = text.chars().collect();
        let mut line_starts = vec![0];
        for (i, &c) in chars.iter().enumerate() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        let classes = classify(&chars);
        TextBuffer {
            chars,
            line_starts,
            classes,
        }
    }

    fn class_at(&self, pos: usize) -> LexClass {
        self.classes.get(pos).copied().unwrap_or(LexClass::Code)
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }
}

/// Single forward pass marking every character as code, comment, or string.
/// Tolerates unterminated literals: an open string or block comment simply
/// runs to end of buffer (or end of line, for strings).
fn classify(chars: &[char]) -> Vec<LexClass> {
    let mut classes = vec![LexClass::Code; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            while i < chars.len() && chars[i] != '\n' {
                classes[i] = LexClass::LineComment;
                i += 1;
            }
        } else if c == '/' && i + 1 < chars.len() && chars[i + 1] == '*' {
            classes[i] = LexClass::BlockComment;
            classes[i + 1] = LexClass::BlockComment;
            i += 2;
            while i < chars.len() {
                classes[i] = LexClass::BlockComment;
                if chars[i] == '/' && chars[i - 1] == '*' {
                    i += 1;
                    break;
                }
                i += 1;
            }
        } else if c == '"' || c == '\'' {
            let quote = c;
            classes[i] = LexClass::Str(quote);
            i += 1;
            while i < chars.len() && chars[i] != '\n' {
                classes[i] = LexClass::Str(quote);
                if chars[i] == '\\' {
                    if i + 1 < chars.len() {
                        classes[i + 1] = LexClass::Str(quote);
                    }
                    i += 2;
                    continue;
                }
                if chars[i] == quote {
                    i += 1;
                    break;
                }
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    classes
}

impl BufferCursor for TextBuffer {
    fn length(&self) -> usize {
        self.chars.len()
    }

    fn char_at(&self, pos: usize) -> char {
        self.chars.get(pos).copied().unwrap_or('\0')
    }

    fn line_from_position(&self, pos: usize) -> i32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as i32,
            Err(line) => line as i32 - 1,
        }
    }

    fn position_from_line(&self, line: i32) -> usize {
        if line < 0 {
            return 0;
        }
        self.line_starts
            .get(line as usize)
            .copied()
            .unwrap_or(self.chars.len())
    }

    fn line_end_position(&self, line: i32) -> usize {
        if line < 0 {
            return 0;
        }
        match self.line_starts.get(line as usize + 1) {
            Some(&next) => next - 1,
            None => self.chars.len(),
        }
    }

    fn line_text(&self, line: i32) -> String {
        if line < 0 || line as usize >= self.line_starts.len() {
            return String::new();
        }
        self.substring(self.position_from_line(line), self.line_end_position(line))
    }

    fn substring(&self, start: usize, end: usize) -> String {
        let start = start.min(self.chars.len());
        let end = end.clamp(start, self.chars.len());
        self.chars[start..end].iter().collect()
    }

    fn is_in_comment(&self, pos: usize) -> bool {
        matches!(
            self.class_at(pos),
            LexClass::LineComment | LexClass::BlockComment
        )
    }

    fn is_in_string(&self, pos: usize) -> bool {
        matches!(self.class_at(pos), LexClass::Str(_))
    }

    fn string_quote_kind_at(&self, pos: usize) -> Option<char> {
        match self.class_at(pos) {
            LexClass::Str(quote) => Some(quote),
            _ => None,
        }
    }

    fn matching_brace(&self, pos: usize) -> Option<usize> {
        let (open, close, forward) = match self.char_at(pos) {
            '(' => ('(', ')', true),
            '[' => ('[', ']', true),
            '{' => ('{', '}', true),
            ')' => ('(', ')', false),
            ']' => ('[', ']', false),
            '}' => ('{', '}', false),
            _ => return None,
        };
        if self.class_at(pos) != LexClass::Code {
            return None;
        }
        let mut depth = 0i32;
        let mut i = pos as i64;
        loop {
            if i < 0 || i as usize >= self.chars.len() {
                return None;
            }
            let at = i as usize;
            if self.class_at(at) == LexClass::Code {
                let c = self.chars[at];
                if c == open {
                    depth += if forward { 1 } else { -1 };
                } else if c == close {
                    depth += if forward { -1 } else { 1 };
                }
                if depth == 0 && at != pos {
                    return Some(at);
                }
            }
            i += if forward { 1 } else { -1 };
        }
    }

    fn word_left_of(&self, pos: usize, skip_whitespace: bool) -> String {
        if self.chars.is_empty() {
            return String::new();
        }
        let mut i = pos.min(self.chars.len() - 1) as i64;
        if skip_whitespace {
            while i >= 0 && self.chars[i as usize].is_whitespace() {
                i -= 1;
            }
        }
        let end = i;
        while i >= 0 && Self::is_word_char(self.chars[i as usize]) {
            i -= 1;
        }
        if end < 0 {
            return String::new();
        }
        self.substring((i + 1) as usize, (end + 1) as usize)
    }

    fn word_right_of(&self, pos: usize, skip_whitespace: bool) -> String {
        let mut i = pos;
        if skip_whitespace {
            while i < self.chars.len() && self.chars[i].is_whitespace() {
                i += 1;
            }
        }
        let start = i;
        while i < self.chars.len() && Self::is_word_char(self.chars[i]) {
            i += 1;
        }
        self.substring(start, i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_mapping() {
        let buf = TextBuffer::new("var a = 1;\nvar b = 2;\n");
        assert_eq!(buf.line_from_position(0), 0);
        assert_eq!(buf.line_from_position(12), 1);
        assert_eq!(buf.position_from_line(1), 11);
        assert_eq!(buf.line_end_position(0), 10);
        assert_eq!(buf.line_text(1), "var b = 2;");
    }

    #[test]
    fn test_comment_and_string_classification() {
        let buf = TextBuffer::new("var a = \"x // y\"; // trailing\nvar b = 1; /* block */ var c;");
        // inside the string literal
        assert!(buf.is_in_string(9));
        assert!(!buf.is_in_comment(11));
        // the trailing line comment
        assert!(buf.is_in_comment(20));
        // the block comment on line 1
        let block = buf.position_from_line(1) + 12;
        assert!(buf.is_in_comment(block));
        assert_eq!(buf.string_quote_kind_at(9), Some('"'));
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        let buf = TextBuffer::new("var a = \"oops\nvar b = 1;");
        assert!(buf.is_in_string(10));
        assert!(!buf.is_in_string(buf.position_from_line(1)));
    }

    #[test]
    fn test_matching_brace_skips_strings() {
        let buf = TextBuffer::new("foo(\")\", bar(1));");
        assert_eq!(buf.matching_brace(3), Some(15));
        assert_eq!(buf.matching_brace(15), Some(3));
        assert_eq!(buf.matching_brace(0), None);
    }

    #[test]
    fn test_word_queries() {
        let buf = TextBuffer::new("for (item in items)");
        assert_eq!(buf.word_left_of(8, false), "item");
        assert_eq!(buf.word_left_of(9, true), "item");
        assert_eq!(buf.word_right_of(13, true), "items");
        assert_eq!(buf.word_left_of(4, false), "");
    }

    #[test]
    fn test_word_queries_on_empty_buffer() {
        let buf = TextBuffer::new("");
        assert_eq!(buf.word_left_of(0, true), "");
        assert_eq!(buf.word_left_of(7, false), "");
        assert_eq!(buf.word_right_of(0, true), "");
        assert_eq!(buf.word_right_of(5, true), "");
    }
}

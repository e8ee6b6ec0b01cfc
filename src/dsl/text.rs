//! Lexical helpers shared by the extractor and the expander.
//!
//! All positions are byte offsets into the scanned text. The model language
//! is ASCII in practice, but offsets stay valid for any UTF-8 input.

/// A word delimited by spaces, commas or an `=` sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    /// Offset of the first character
    pub start: usize,
    /// Offset one past the last character
    pub end: usize,
}

impl Word {
    /// Text of the word.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// The character following the word, if any.
    pub fn delimiter(&self, text: &str) -> Option<char> {
        text[self.end..].chars().next()
    }
}

/// An identifier or numeric literal inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand<'a> {
    pub offset: usize,
    pub text: &'a str,
    pub is_number: bool,
}

/// Check if `ch` may be part of an identifier.
pub fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Check if `name` is a valid definition name: a letter or underscore
/// followed by letters, digits and underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}

/// Find the next word starting at or after `from`, skipping leading spaces
/// and commas. The word ends before the next space or `=`.
pub fn next_word(text: &str, from: usize) -> Option<Word> {
    let rest = text.get(from..)?;
    let skipped = rest.find(|c: char| c != ' ' && c != ',')?;
    let start = from + skipped;
    let end = text[start..]
        .find([' ', '='])
        .map(|i| start + i)
        .unwrap_or(text.len());
    Some(Word { start, end })
}

/// Split `text` from `from` on any of `delims`, skipping empty pieces.
/// Returns each piece with its offset.
pub fn split_words<'a>(text: &'a str, from: usize, delims: &[char]) -> Vec<(usize, &'a str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, ch) in text[from..].char_indices() {
        let pos = from + i;
        match (delims.contains(&ch), start) {
            (true, Some(s)) => {
                words.push((s, &text[s..pos]));
                start = None;
            }
            (false, None) => start = Some(pos),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}

/// Extract the expression following position `after` (usually an `=` sign)
/// up to the next comma outside of brackets.
///
/// Returns the expression with all whitespace removed, and the offset of the
/// terminating comma if there is one.
pub fn next_expression(text: &str, after: usize) -> (String, Option<usize>) {
    let begin = (after + 1).min(text.len());
    let mut depth = 0usize;
    let mut comma = None;
    for (i, ch) in text[begin..].char_indices() {
        match ch {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                comma = Some(begin + i);
                break;
            }
            _ => {}
        }
    }
    let end = comma.unwrap_or(text.len());
    (strip_whitespace(&text[begin..end]), comma)
}

/// Offset of the bracket closing the one at `open`.
pub fn matching_bracket(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in text[open..].char_indices() {
        match ch {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split the bracket-enclosed list starting at `open` into its elements.
///
/// Elements are separated by any of `delims` at the top nesting level. On
/// success returns each element with its offset, plus the offset of the
/// closing bracket (or the end of the text if it is unclosed). An empty
/// element yields `Err` with its offset.
pub fn split_list<'a>(
    text: &'a str,
    open: usize,
    delims: &[char],
) -> Result<(Vec<(usize, &'a str)>, usize), usize> {
    let close = matching_bracket(text, open).unwrap_or(text.len());
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut item_start = open + 1;

    let body = text.get(open + 1..close).unwrap_or("");
    for (i, ch) in body.char_indices() {
        let pos = open + 1 + i;
        match ch {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && delims.contains(&c) => {
                push_item(&mut items, text, item_start, pos)?;
                item_start = pos + c.len_utf8();
            }
            _ => {}
        }
    }
    push_item(&mut items, text, item_start, close)?;
    Ok((items, close))
}

fn push_item<'a>(
    items: &mut Vec<(usize, &'a str)>,
    text: &'a str,
    start: usize,
    end: usize,
) -> Result<(), usize> {
    let item = text[start..end].trim();
    if item.is_empty() {
        return Err(start);
    }
    let offset = start + (text[start..end].len() - text[start..end].trim_start().len());
    items.push((offset, item));
    Ok(())
}

/// Remove every whitespace character.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Check if a string is a plain numeric literal such as `1`, `-2.5` or `.3e-4`.
pub fn is_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') && text.parse::<f64>().is_ok()
}

/// Check if the byte range `start..end` of `text` is not glued to identifier
/// characters on either side.
pub fn is_delimited(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
}

/// Check if an expression can be spliced into another one without
/// parentheses: a name, an unsigned number, a call, or a parenthesized group.
pub fn is_atomic(expr: &str) -> bool {
    if expr.is_empty() {
        return false;
    }
    if expr.chars().all(is_ident_char) {
        return true;
    }
    if is_numeric(expr) && !expr.starts_with(['+', '-']) {
        return true;
    }
    let open = match expr.find('(') {
        Some(open) => open,
        None => return false,
    };
    expr[..open].chars().all(is_ident_char) && matching_bracket(expr, open) == Some(expr.len() - 1)
}

/// Iterate over the identifiers and numeric literals of an expression.
pub fn operands(expr: &str) -> Vec<Operand<'_>> {
    let bytes = expr.as_bytes();
    let mut result = Vec::new();
    let mut i = 0;
    while i < expr.len() {
        let ch = match expr[i..].chars().next() {
            Some(ch) => ch,
            None => break,
        };
        if ch.is_alphabetic() || ch == '_' {
            let end = expr[i..]
                .find(|c: char| !is_ident_char(c))
                .map(|n| i + n)
                .unwrap_or(expr.len());
            result.push(Operand {
                offset: i,
                text: &expr[i..end],
                is_number: false,
            });
            i = end;
        } else if ch.is_ascii_digit() || (ch == '.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            let end = number_end(bytes, i);
            result.push(Operand {
                offset: i,
                text: &expr[i..end],
                is_number: true,
            });
            i = end;
        } else {
            i += ch.len_utf8();
        }
    }
    result
}

fn number_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_word() {
        let text = "par a=1, b=2";
        let word = next_word(text, 0).unwrap();
        assert_eq!(word.text(text), "par");
        assert_eq!(word.delimiter(text), Some(' '));
        let word = next_word(text, word.end).unwrap();
        assert_eq!(word.text(text), "a");
        assert_eq!(word.delimiter(text), Some('='));
        let word = next_word(text, 7).unwrap();
        assert_eq!(word.text(text), "b");
        assert!(next_word(text, text.len()).is_none());
    }

    #[test]
    fn test_split_words() {
        let words = split_words("wiener w1, w2 w3", 6, &[' ', ',']);
        assert_eq!(words, vec![(7, "w1"), (11, "w2"), (14, "w3")]);
    }

    #[test]
    fn test_next_expression_stops_at_top_level_comma() {
        let text = "par a=max(1,2), b=2";
        let (expr, comma) = next_expression(text, 5);
        assert_eq!(expr, "max(1,2)");
        assert_eq!(comma, Some(14));
        let (expr, comma) = next_expression(text, 17);
        assert_eq!(expr, "2");
        assert_eq!(comma, None);
    }

    #[test]
    fn test_split_list() {
        let text = "f(x,{1,2},g(y,z))";
        let (items, close) = split_list(text, 1, &[',']).unwrap();
        let items: Vec<&str> = items.iter().map(|(_, s)| *s).collect();
        assert_eq!(items, vec!["x", "{1,2}", "g(y,z)"]);
        assert_eq!(close, text.len() - 1);
    }

    #[test]
    fn test_split_list_rejects_empty_element() {
        assert_eq!(split_list("{a,,b}", 0, &[',']), Err(3));
        assert_eq!(split_list("()", 0, &[',']), Err(1));
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("1"));
        assert!(is_numeric("-2.5"));
        assert!(is_numeric(".3e-4"));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric("1+2"));
        assert!(!is_numeric("a"));
    }

    #[test]
    fn test_is_atomic() {
        assert!(is_atomic("x"));
        assert!(is_atomic("2.5"));
        assert!(is_atomic("sin(x+1)"));
        assert!(is_atomic("(a+b)"));
        assert!(!is_atomic("-2"));
        assert!(!is_atomic("a+b"));
        assert!(!is_atomic("(a)+(b)"));
    }

    #[test]
    fn test_operands() {
        let ops = operands("-k1*x^2+1.5e-3*sin(y)");
        let texts: Vec<&str> = ops.iter().map(|o| o.text).collect();
        assert_eq!(texts, vec!["k1", "x", "2", "1.5e-3", "sin", "y"]);
        assert!(ops[3].is_number);
        assert_eq!(ops[5].offset, 19);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("x"));
        assert!(is_identifier("_k2"));
        assert!(!is_identifier("10"));
        assert!(!is_identifier("a+b"));
        assert!(!is_identifier("x'"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_is_delimited() {
        assert!(is_delimited("k*x", 0, 1));
        assert!(!is_delimited("kappa*x", 0, 1));
        assert!(!is_delimited("a_k", 2, 3));
    }
}

//! Line preprocessing: comments, bracket balance, whitespace and arrays.

use crate::dsl::arith::{Evaluator, Value};
use crate::dsl::parser::ParseConfig;
use crate::dsl::text;
use crate::error::{ErrorKind, Result, XodeError};

/// Marker ending the statement part of a model file.
pub const TERMINATOR: &str = "done";

/// A line of the model source with its original line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Text of the line (rewritten by the preprocessing steps)
    pub text: String,
    /// Line number in the model file (1-indexed)
    pub number: usize,
}

impl SourceLine {
    /// Create a new source line.
    pub fn new(text: impl Into<String>, number: usize) -> Self {
        Self {
            text: text.into(),
            number,
        }
    }
}

/// Run every preprocessing step on a model source.
///
/// `name` is only used to report an empty model.
pub fn preprocess(input: &str, name: &str, config: &ParseConfig) -> Result<Vec<SourceLine>> {
    let mut lines = read_lines(input, name)?;
    remove_comments(&mut lines);
    check_brackets(&lines)?;
    normalize_whitespace(&mut lines);
    let lines = expand_arrays(lines, &config.array_variable)?;
    log::debug!("preprocessed {} statement lines of '{}'", lines.len(), name);
    Ok(lines)
}

/// Split the input into numbered lines, stopping at the `done` marker.
///
/// Blank lines are dropped. Fails with [`XodeError::EmptyModel`] when no
/// statement is left.
pub fn read_lines(input: &str, name: &str) -> Result<Vec<SourceLine>> {
    let mut lines = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed == TERMINATOR {
            break;
        }
        if !trimmed.is_empty() {
            lines.push(SourceLine::new(trimmed, index + 1));
        }
    }

    if lines.iter().all(|line| line.text.starts_with('#')) {
        return Err(XodeError::EmptyModel {
            name: name.to_string(),
        });
    }
    Ok(lines)
}

/// Drop `#` comment lines and cut trailing comments.
///
/// A `#` inside `{...}` does not start a comment. Lines that only held a
/// comment, and trailing `,` or `;` left behind, are removed as well.
pub fn remove_comments(lines: &mut Vec<SourceLine>) {
    for line in lines.iter_mut() {
        let mut depth = 0usize;
        let comment = line.text.char_indices().find(|&(_, ch)| {
            match ch {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            ch == '#' && depth == 0
        });
        if let Some((pos, _)) = comment {
            line.text.truncate(pos);
        }
        let kept = line.text.trim_end().trim_end_matches([',', ';']).trim_end().len();
        line.text.truncate(kept);
    }
    lines.retain(|line| !line.text.is_empty());
}

/// Check that `()`, `[]` and `{}` are balanced on every line.
pub fn check_brackets(lines: &[SourceLine]) -> Result<()> {
    for line in lines {
        let mut open: Vec<(usize, char)> = Vec::new();
        for (pos, ch) in line.text.char_indices() {
            match ch {
                '(' | '[' | '{' => open.push((pos, ch)),
                ')' | ']' | '}' => {
                    let expected = match ch {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match open.pop() {
                        Some((_, opening)) if opening == expected => {}
                        Some((start, _)) => {
                            return Err(XodeError::source(ErrorKind::MissingClosingBracket, line, start))
                        }
                        None => {
                            return Err(XodeError::source(ErrorKind::MissingOpeningBracket, line, pos))
                        }
                    }
                }
                _ => {}
            }
        }
        if let Some((start, _)) = open.pop() {
            return Err(XodeError::source(ErrorKind::MissingClosingBracket, line, start));
        }
    }
    Ok(())
}

/// Collapse runs of whitespace, drop whitespace inside brackets and around
/// `=` signs.
pub fn normalize_whitespace(lines: &mut [SourceLine]) {
    for line in lines {
        let mut result = String::with_capacity(line.text.len());
        let mut depth = 0usize;
        let mut pending_space = false;

        for ch in line.text.chars() {
            if ch.is_whitespace() {
                pending_space = depth == 0;
                continue;
            }
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            if pending_space && ch != '=' && !result.ends_with('=') && !result.is_empty() {
                result.push(' ');
            }
            pending_space = false;
            result.push(ch);
        }
        line.text = result;
    }
}

/// Expand array declarations into one line per index.
///
/// A line whose first `[...]` holds a `lo..hi` range is a header. In the
/// single line form `x[1..3]=a[j]` the header itself is the template. With
/// `%[1..3]` the following lines up to a line containing `%` are the
/// template. Every other `[...]` of a template is evaluated with the index
/// bound to `variable`, and free occurrences of `variable` are replaced by
/// the index.
pub fn expand_arrays(lines: Vec<SourceLine>, variable: &str) -> Result<Vec<SourceLine>> {
    let mut result = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter();

    while let Some(line) = iter.next() {
        let (open, dots, close) = match array_range(&line) {
            Some(range) => range,
            None => {
                result.push(line);
                continue;
            }
        };

        let lo = parse_bound(&line, open + 1, dots)?;
        let hi = parse_bound(&line, dots + 2, close)?;
        if hi < lo {
            return Err(XodeError::source(ErrorKind::WrongArrayAssignment, &line, dots));
        }

        let templates = if open > 0 && line.text[..open].ends_with('%') {
            let mut block = Vec::new();
            loop {
                match iter.next() {
                    Some(next) if next.text.contains('%') => break,
                    Some(next) => block.push(next),
                    None => {
                        return Err(XodeError::source(
                            ErrorKind::WrongArrayAssignment,
                            &line,
                            open - 1,
                        ))
                    }
                }
            }
            block
        } else {
            let mut template = line.clone();
            template.text.replace_range(open + 1..close, variable);
            vec![template]
        };

        log::trace!(
            "line {}: expanding {} template line(s) for {}..{}",
            line.number,
            templates.len(),
            lo,
            hi
        );
        for index in lo..=hi {
            for template in &templates {
                result.push(instantiate(template, variable, index)?);
            }
        }
    }

    Ok(result)
}

/// Positions of `[`, `..` and `]` if the first bracket of the line is a range.
fn array_range(line: &SourceLine) -> Option<(usize, usize, usize)> {
    let open = line.text.find('[')?;
    let close = open + line.text[open..].find(']')?;
    let dots = open + line.text[open..close].find("..")?;
    Some((open, dots, close))
}

fn parse_bound(line: &SourceLine, start: usize, end: usize) -> Result<i64> {
    let bound = line.text[start..end].trim();
    Evaluator::new()
        .eval(bound)
        .ok()
        .and_then(|value| value.as_int())
        .ok_or_else(|| XodeError::source(ErrorKind::ExpectedNumber, line, start))
}

fn instantiate(template: &SourceLine, variable: &str, index: i64) -> Result<SourceLine> {
    let evaluator = Evaluator::new().with_var(variable, Value::Int(index));
    let source = &template.text;
    let mut text = String::with_capacity(source.len());
    let mut pos = 0;

    while let Some(found) = source[pos..].find('[') {
        let open = pos + found;
        let close = text::matching_bracket(source, open)
            .ok_or_else(|| XodeError::source(ErrorKind::MissingClosingBracket, template, open))?;
        let value = evaluator
            .eval(&source[open + 1..close])
            .ok()
            .and_then(|value| value.as_int())
            .ok_or_else(|| XodeError::source(ErrorKind::WrongArrayAssignment, template, open + 1))?;
        text.push_str(&replace_variable(&source[pos..open], variable, index));
        text.push_str(&value.to_string());
        pos = close + 1;
    }
    text.push_str(&replace_variable(&source[pos..], variable, index));

    Ok(SourceLine::new(text, template.number))
}

fn replace_variable(segment: &str, variable: &str, index: i64) -> String {
    let mut result = String::with_capacity(segment.len());
    let mut last = 0;
    for operand in text::operands(segment) {
        if !operand.is_number && operand.text == variable {
            result.push_str(&segment[last..operand.offset]);
            result.push_str(&index.to_string());
            last = operand.offset + operand.text.len();
        }
    }
    result.push_str(&segment[last..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str) -> Vec<SourceLine> {
        read_lines(input, "test").unwrap()
    }

    fn texts(lines: &[SourceLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_read_lines_stops_at_done() {
        let lines = lines("x'=-x\n\n  init x=1  \ndone\npar ignored=1");
        assert_eq!(texts(&lines), vec!["x'=-x", "init x=1"]);
        assert_eq!(lines[1].number, 3);
    }

    #[test]
    fn test_empty_model() {
        assert!(matches!(
            read_lines("# only a comment\n\ndone", "empty.ode"),
            Err(XodeError::EmptyModel { .. })
        ));
        assert!(matches!(read_lines("", "empty.ode"), Err(XodeError::EmptyModel { .. })));
    }

    #[test]
    fn test_remove_comments() {
        let mut lines = lines("# header\npar a=1, b=2, # trailing\nx'=a*x;\nset s {a=#1} # note");
        remove_comments(&mut lines);
        assert_eq!(texts(&lines), vec!["par a=1, b=2", "x'=a*x", "set s {a=#1}"]);
        assert_eq!(lines[0].number, 2);
    }

    #[test]
    fn test_check_brackets() {
        assert!(check_brackets(&lines("f(x,{1,2})=x")).is_ok());

        let err = check_brackets(&lines("f(x,{1,2)=x")).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingClosingBracket));
        assert_eq!(err.location().unwrap().column, 4);

        let err = check_brackets(&lines("x'=a)")).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingOpeningBracket));
        assert_eq!(err.location().unwrap().column, 4);

        let err = check_brackets(&lines("x'=(a")).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingClosingBracket));
        assert_eq!(err.location().unwrap().column, 3);
    }

    #[test]
    fn test_normalize_whitespace() {
        let mut lines = lines("par  a = 1,\tb=2\nf( x , y ) = x + y\nx[1 .. 3] = 0");
        normalize_whitespace(&mut lines);
        assert_eq!(texts(&lines), vec!["par a=1, b=2", "f(x,y)=x + y", "x[1..3]=0"]);
    }

    #[test]
    fn test_expand_single_line_array() {
        let lines = expand_arrays(lines("x[1..3]=a[j]*j"), "j").unwrap();
        assert_eq!(texts(&lines), vec!["x1=a1*1", "x2=a2*2", "x3=a3*3"]);
    }

    #[test]
    fn test_expand_index_arithmetic() {
        let lines = expand_arrays(lines("u[0..1]'=u[j+1]-u[j-1]+jump"), "j").unwrap();
        assert_eq!(texts(&lines), vec!["u0'=u1-u-1+jump", "u1'=u2-u0+jump"]);
    }

    #[test]
    fn test_expand_block_array() {
        let input = "%[1..2]\nx[j]'=-x[j]\ninit x[j]=j\n%\npar a=1";
        let lines = expand_arrays(lines(input), "j").unwrap();
        assert_eq!(
            texts(&lines),
            vec!["x1'=-x1", "init x1=1", "x2'=-x2", "init x2=2", "par a=1"]
        );
        assert_eq!(lines[0].number, 2);
    }

    #[test]
    fn test_expand_errors() {
        let err = expand_arrays(lines("x[1..n]=0"), "j").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ExpectedNumber));

        let err = expand_arrays(lines("x[1..2]=a[j/2]"), "j").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::WrongArrayAssignment));

        let err = expand_arrays(lines("%[1..2]\nx[j]'=0"), "j").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::WrongArrayAssignment));
    }

    #[test]
    fn test_plain_brackets_are_not_arrays() {
        let lines = expand_arrays(lines("x'=a[2]"), "j").unwrap();
        assert_eq!(texts(&lines), vec!["x'=a[2]"]);
    }
}

//! Definition extractor for preprocessed model lines.

use std::path::PathBuf;
use std::vec::IntoIter;

use super::arith::{Evaluator, Value};
use super::ast::{Category, Definition, SymbolTable};
use super::keywords::Keyword;
use super::registry::NameRegistry;
use super::source::SourceLine;
use super::text::{self, Word};
use crate::error::{ErrorKind, Result, XodeError};
use crate::trie::Match;

/// Default loop variable of array declarations.
pub const DEFAULT_ARRAY_VARIABLE: &str = "j";

/// Configuration for preprocessing and extraction.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Directory that relative lookup-table file names are resolved against.
    pub table_dir: PathBuf,
    /// Loop variable of array declarations.
    pub array_variable: String,
    /// Reject defined names that collide with an option name.
    pub reserve_option_names: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            table_dir: PathBuf::from("."),
            array_variable: DEFAULT_ARRAY_VARIABLE.to_string(),
            reserve_option_names: true,
        }
    }
}

impl ParseConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory for lookup-table files.
    pub fn with_table_dir(mut self, table_dir: impl Into<PathBuf>) -> Self {
        self.table_dir = table_dir.into();
        self
    }

    /// Set the loop variable of array declarations.
    pub fn with_array_variable(mut self, variable: impl Into<String>) -> Self {
        self.array_variable = variable.into();
        self
    }

    /// Set whether option names are reserved.
    pub fn with_reserve_option_names(mut self, flag: bool) -> Self {
        self.reserve_option_names = flag;
        self
    }
}

/// Symbol table before substitution, with the names it defines.
#[derive(Debug, Clone)]
pub struct ParsedModel {
    pub symbols: SymbolTable,
    pub registry: NameRegistry,
}

/// A name-bearing assignment located on a line.
#[derive(Debug)]
struct Assignment {
    keyword: Keyword,
    name: String,
    name_col: usize,
    args: Vec<(usize, String)>,
    /// Offset the expression starts after
    eq: usize,
}

/// Extracts definitions from preprocessed lines.
pub struct Parser {
    lines: Vec<SourceLine>,
    registry: NameRegistry,
    symbols: SymbolTable,
    config: ParseConfig,
}

impl Parser {
    /// Create a parser over preprocessed lines.
    pub fn new(lines: Vec<SourceLine>, config: ParseConfig) -> Result<Self> {
        Ok(Self {
            lines,
            registry: NameRegistry::new(config.reserve_option_names)?,
            symbols: SymbolTable::new(),
            config,
        })
    }

    /// Run every extraction pass.
    ///
    /// Multi-line and list statements are pulled out first, then every
    /// remaining line is classified on its own.
    pub fn parse(mut self) -> Result<ParsedModel> {
        self.extract_blocks("export", Self::extract_export)?;
        self.extract_blocks("markov", Self::extract_markov)?;
        self.extract_blocks("table", Self::extract_table)?;
        self.extract_blocks("wiener", Self::extract_wiener)?;
        self.extract_blocks("global", Self::extract_global)?;

        let lines = std::mem::take(&mut self.lines);
        for line in &lines {
            self.extract_line(line)?;
        }
        log::debug!(
            "extracted {} definitions from {} lines",
            self.symbols.len(),
            lines.len()
        );

        Ok(ParsedModel {
            symbols: self.symbols,
            registry: self.registry,
        })
    }

    /// Remove every line led by `keyword` and hand it to `extract`, which
    /// may consume the lines that follow.
    fn extract_blocks<F>(&mut self, keyword: &str, mut extract: F) -> Result<()>
    where
        F: FnMut(&mut Self, &SourceLine, &mut IntoIter<SourceLine>) -> Result<()>,
    {
        let lines = std::mem::take(&mut self.lines);
        let mut remaining = Vec::with_capacity(lines.len());
        let mut iter = lines.into_iter();
        let mut count = 0;

        while let Some(line) = iter.next() {
            if leading_word(&line.text) == Some(keyword) {
                extract(self, &line, &mut iter)?;
                count += 1;
            } else {
                remaining.push(line);
            }
        }

        if count > 0 {
            log::debug!("extracted {count} {keyword} statement(s)");
        }
        self.lines = remaining;
        Ok(())
    }

    /// `export {in1,in2} {out1}`
    fn extract_export(&mut self, line: &SourceLine, _rest: &mut IntoIter<SourceLine>) -> Result<()> {
        let text = &line.text;
        let open = find_from(text, 0, '{').ok_or_else(|| missing_bracket(line))?;
        let (inputs, close) = line_list(line, open, &[','])?;
        let open = find_from(text, close + 1, '{').ok_or_else(|| missing_bracket(line))?;
        let (outputs, _) = line_list(line, open, &[','])?;

        let mut def = Definition::new(line.number);
        def.expr = inputs.len().to_string();
        def.args = inputs.into_iter().chain(outputs).map(|(_, s)| s).collect();
        self.symbols.push(Category::Exports, def);
        Ok(())
    }

    /// `markov name nstates` followed by `nstates` rows of `{prob}` entries.
    fn extract_markov(&mut self, line: &SourceLine, rest: &mut IntoIter<SourceLine>) -> Result<()> {
        let text = &line.text;
        let keyword = first_word(line)?;
        let name = word_after(line, keyword.end, ErrorKind::UnknownAssignment)?;
        let states = word_after(line, name.end, ErrorKind::ExpectedNumber)?;
        let nstates: usize = states
            .text(text)
            .parse()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| XodeError::source(ErrorKind::ExpectedNumber, line, states.start))?;
        self.reserve(line, name.text(text), name.start)?;

        let mut def = Definition::named(line.number, name.text(text), nstates.to_string());
        for _ in 0..nstates {
            let row = rest
                .next()
                .ok_or_else(|| XodeError::source(ErrorKind::MissingMarkovAssignment, line, text.len()))?;
            let mut pos = 0;
            for _ in 0..nstates {
                let open = find_from(&row.text, pos, '{').ok_or_else(|| {
                    XodeError::source(ErrorKind::MissingMarkovAssignment, &row, pos)
                })?;
                let close = text::matching_bracket(&row.text, open)
                    .ok_or_else(|| XodeError::source(ErrorKind::MissingClosingBracket, &row, open))?;
                let entry = text::strip_whitespace(&row.text[open + 1..close]);
                if entry.is_empty() {
                    return Err(XodeError::source(
                        ErrorKind::MissingMarkovAssignment,
                        &row,
                        open + 1,
                    ));
                }
                def.args.push(entry);
                pos = close + 1;
            }
            let trailing = row.text[pos..].trim_start();
            if !trailing.is_empty() {
                let column = row.text.len() - trailing.len();
                return Err(XodeError::source(ErrorKind::WrongMarkovAssignment, &row, column));
            }
        }

        self.symbols.push(Category::Markovs, def);
        Ok(())
    }

    /// `table name % npts xlo xhi expr` or `table name file`
    fn extract_table(&mut self, line: &SourceLine, _rest: &mut IntoIter<SourceLine>) -> Result<()> {
        let text = &line.text;
        let keyword = first_word(line)?;
        let name = word_after(line, keyword.end, ErrorKind::UnknownAssignment)?;
        let source = word_after(line, name.end, ErrorKind::ExpectedTableAssignment)?;
        self.reserve(line, name.text(text), name.start)?;

        let mut def = Definition::named(line.number, name.text(text), "");
        if source.text(text) == "%" {
            let count_word = word_after(line, source.end, ErrorKind::ExpectedTableAssignment)?;
            let low_word = word_after(line, count_word.end, ErrorKind::ExpectedTableAssignment)?;
            let high_word = word_after(line, low_word.end, ErrorKind::ExpectedTableAssignment)?;
            let npts = parse_count(line, count_word)?;
            let low = eval_number(line, low_word)?;
            let high = eval_number(line, high_word)?;

            let expr = text::strip_whitespace(&text[high_word.end..]);
            if expr.is_empty() {
                return Err(XodeError::source(
                    ErrorKind::ExpectedTableAssignment,
                    line,
                    text.len(),
                ));
            }
            let column = high_word.end + 1;
            def.args = table_values(&expr, npts, low, high)
                .map_err(|_| XodeError::source(ErrorKind::WrongTableAssignment, line, column))?;
            def.expr = expr;
        } else {
            def.args = self.read_table_file(line, source)?;
            def.expr = source.text(text).to_string();
        }

        self.symbols.push(Category::Tables, def);
        Ok(())
    }

    /// Read a table file: point count, lower and upper bound, then one value
    /// per line.
    fn read_table_file(&self, line: &SourceLine, file: Word) -> Result<Vec<String>> {
        let path = self.config.table_dir.join(file.text(&line.text));
        let content = std::fs::read_to_string(&path).map_err(|source| XodeError::TableReadError {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("reading lookup table from {}", path.display());

        let mut rows = content
            .lines()
            .enumerate()
            .map(|(i, row)| SourceLine::new(row.trim(), i + 1))
            .filter(|row| !row.text.is_empty());
        let mut next_row = || {
            rows.next().ok_or_else(|| {
                XodeError::source(ErrorKind::ExpectedTableAssignment, line, line.text.len())
            })
        };

        let header = next_row()?;
        let npts: usize = header
            .text
            .parse()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| XodeError::source(ErrorKind::ExpectedNumber, &header, 0))?;
        for _ in 0..2 {
            let bound = next_row()?;
            row_number(&bound)?;
        }

        let mut values = Vec::with_capacity(npts);
        for _ in 0..npts {
            let row = next_row()?;
            values.push(format_value(row_number(&row)?));
        }
        Ok(values)
    }

    /// `wiener w1 w2, w3`
    fn extract_wiener(&mut self, line: &SourceLine, _rest: &mut IntoIter<SourceLine>) -> Result<()> {
        let keyword = first_word(line)?;
        let names = text::split_words(&line.text, keyword.end, &[' ', ',']);
        if names.is_empty() {
            return Err(XodeError::source(ErrorKind::UnknownAssignment, line, line.text.len()));
        }
        for (column, name) in names {
            self.reserve(line, name, column)?;
            self.symbols
                .push(Category::Wieners, Definition::named(line.number, name, ""));
        }
        Ok(())
    }

    /// `global sign condition {reset1;reset2}`
    fn extract_global(&mut self, line: &SourceLine, _rest: &mut IntoIter<SourceLine>) -> Result<()> {
        let text = &line.text;
        let keyword = first_word(line)?;
        let sign = word_after(line, keyword.end, ErrorKind::ExpectedNumber)?;
        let value: i32 = sign
            .text(text)
            .parse()
            .ok()
            .filter(|s| (-1..=1).contains(s))
            .ok_or_else(|| XodeError::source(ErrorKind::ExpectedNumber, line, sign.start))?;

        let open = find_from(text, sign.end, '{').ok_or_else(|| missing_bracket(line))?;
        let condition = text::strip_whitespace(&text[sign.end..open]);
        if condition.is_empty() {
            return Err(XodeError::source(ErrorKind::UnknownAssignment, line, sign.end));
        }
        let (resets, _) = line_list(line, open, &[';'])?;

        let mut def = Definition::named(line.number, value.to_string(), condition);
        def.args = resets.into_iter().map(|(_, s)| s).collect();
        self.symbols.push(Category::Globals, def);
        Ok(())
    }

    /// Classify a single-line statement and record each of its assignments.
    fn extract_line(&mut self, line: &SourceLine) -> Result<()> {
        let text = &line.text;
        let first = first_word(line)?;
        let leading = match first.delimiter(text) {
            Some('=') => None,
            Some(_) => {
                let keyword = self
                    .registry
                    .leading_keyword(first.text(text))
                    .filter(|k| k.is_leading() || *k == Keyword::Constant)
                    .ok_or_else(|| XodeError::source(ErrorKind::UnknownAssignment, line, first.start))?;
                Some(keyword)
            }
            None => return Err(XodeError::source(ErrorKind::UnknownAssignment, line, first.end)),
        };

        let mut from = if leading.is_some() { first.end } else { 0 };
        loop {
            let assignment = self.assignment(line, from, leading)?;
            let (expr, next) = text::next_expression(text, assignment.eq);
            self.record(line, assignment, expr)?;
            match next {
                Some(comma) => from = comma,
                None => return Ok(()),
            }
        }
    }

    /// Locate the next assignment on a line, starting at `from`.
    fn assignment(&self, line: &SourceLine, from: usize, leading: Option<Keyword>) -> Result<Assignment> {
        let text = &line.text;
        if leading == Some(Keyword::Bdry) {
            return Ok(Assignment {
                keyword: Keyword::Bdry,
                name: String::new(),
                name_col: from,
                args: Vec::new(),
                eq: from,
            });
        }

        let word = text::next_word(text, from)
            .ok_or_else(|| XodeError::source(ErrorKind::UnknownAssignment, line, from))?;
        let delimiter = word.delimiter(text);

        if leading == Some(Keyword::Set) {
            if delimiter != Some(' ') {
                return Err(XodeError::source(ErrorKind::MissingOpeningBracket, line, word.end));
            }
            return Ok(Assignment {
                keyword: Keyword::Set,
                name: word.text(text).to_string(),
                name_col: word.start,
                args: Vec::new(),
                eq: word.end,
            });
        }

        if delimiter != Some('=') {
            return Err(XodeError::source(ErrorKind::UnknownAssignment, line, word.end));
        }
        match leading {
            Some(keyword) => Ok(Assignment {
                keyword,
                name: word.text(text).to_string(),
                name_col: word.start,
                args: Vec::new(),
                eq: word.end,
            }),
            None => self.classify(line, word),
        }
    }

    /// Classify a `token=` by the keyword fragments it contains.
    fn classify(&self, line: &SourceLine, word: Word) -> Result<Assignment> {
        let text = &line.text;
        let token = &text[word.start..=word.end];
        let name_len = word.end - word.start;

        let mut best: Option<(Keyword, Match)> = None;
        for m in self.registry.keyword_matches(token) {
            let keyword = Keyword::from_id(m.id);
            let valid = match keyword {
                Keyword::Constraint => m.start == 0 && m.end == name_len,
                Keyword::Constant | Keyword::Option => m.start == 0 && name_len > 1,
                Keyword::Derivative => {
                    m.start > 1 && m.end + 1 == name_len && token.starts_with('d')
                }
                Keyword::Function => {
                    m.start > 0
                        && token.find('(') == Some(m.start)
                        && token[..name_len].ends_with(')')
                }
                // suffix forms: `x'`, `x(t)`, `x(t+1)`, `x(0)`
                k if k.is_name_integrated() => m.start > 0 && m.end + 1 == name_len,
                _ => false,
            };
            let better = best
                .as_ref()
                .map_or(true, |(current, _)| precedence(keyword) < precedence(*current));
            if valid && better {
                best = Some((keyword, m));
            }
        }

        let (keyword, m) = match best {
            Some(found) => found,
            None => {
                return Ok(Assignment {
                    keyword: Keyword::Temporary,
                    name: word.text(text).to_string(),
                    name_col: word.start,
                    args: Vec::new(),
                    eq: word.end,
                })
            }
        };

        let (name_start, name_end) = match keyword {
            Keyword::Constant | Keyword::Option => (word.start + 1, word.end),
            Keyword::Derivative => (word.start + 1, word.start + m.start),
            Keyword::Constraint => (word.start, word.start),
            _ => (word.start, word.start + m.start),
        };
        let args = if keyword == Keyword::Function {
            let (items, _) = line_list(line, word.start + m.start, &[','])?;
            items
        } else {
            Vec::new()
        };

        Ok(Assignment {
            keyword,
            name: text[name_start..name_end].to_string(),
            name_col: name_start,
            args,
            eq: word.end,
        })
    }

    /// Validate an assignment and store it in its category.
    fn record(&mut self, line: &SourceLine, assignment: Assignment, expr: String) -> Result<()> {
        let Assignment {
            keyword,
            name,
            name_col,
            args,
            eq,
        } = assignment;
        let expr_col = (eq + 1).min(line.text.len());
        if expr.is_empty() {
            return Err(XodeError::source(ErrorKind::UnknownAssignment, line, expr_col));
        }

        let mut def = Definition::named(line.number, name, expr);
        match keyword {
            Keyword::Init | Keyword::InitIndex => {
                if !self.registry.is_used(&def.name) {
                    return Err(XodeError::source(ErrorKind::UnknownVariable, line, name_col));
                }
            }
            Keyword::Option => match self.registry.option(&def.name) {
                Some(canonical) => def.name = canonical,
                None => return Err(XodeError::source(ErrorKind::UnknownOption, line, name_col)),
            },
            Keyword::Bdry | Keyword::Constraint => {}
            _ => {
                if def.name.is_empty() {
                    return Err(XodeError::source(ErrorKind::UnknownAssignment, line, name_col));
                }
                self.reserve(line, &def.name, name_col)?;
            }
        }

        match keyword {
            Keyword::Number if !text::is_numeric(&def.expr) => {
                return Err(XodeError::source(ErrorKind::ExpectedNumber, line, expr_col));
            }
            Keyword::Function => {
                for (i, (column, arg)) in args.iter().enumerate() {
                    if args[..i].iter().any(|(_, other)| other == arg) {
                        return Err(XodeError::source(ErrorKind::DuplicatedName, line, *column));
                    }
                    let used = text::operands(&def.expr)
                        .iter()
                        .any(|op| !op.is_number && op.text == arg);
                    if !used {
                        return Err(XodeError::source(ErrorKind::MissingArgument, line, *column));
                    }
                }
                def.args = args.into_iter().map(|(_, s)| s).collect();
            }
            Keyword::Special => {
                let open = def
                    .expr
                    .find('(')
                    .ok_or_else(|| XodeError::source(ErrorKind::MissingOpeningBracket, line, expr_col))?;
                let (items, _) = text::split_list(&def.expr, open, &[',']).map_err(|offset| {
                    XodeError::source(ErrorKind::ExpectedListArgument, line, expr_col + offset)
                })?;
                def.args = items.into_iter().map(|(_, s)| s.to_string()).collect();
                def.expr.truncate(open);
            }
            Keyword::Set => {
                if !def.expr.starts_with('{') {
                    return Err(XodeError::source(ErrorKind::MissingOpeningBracket, line, expr_col));
                }
                let (items, _) = text::split_list(&def.expr, 0, &[',']).map_err(|offset| {
                    XodeError::source(ErrorKind::ExpectedListArgument, line, expr_col + offset)
                })?;
                def.args = items.into_iter().map(|(_, s)| s.to_string()).collect();
                def.expr.clear();
            }
            _ => {}
        }

        self.symbols.push(keyword.category(), def);
        Ok(())
    }

    fn reserve(&mut self, line: &SourceLine, name: &str, column: usize) -> Result<()> {
        self.registry
            .reserve(name)
            .map_err(|kind| XodeError::source(kind, line, column))
    }
}

/// Lower value wins when several keyword fragments fit a token.
fn precedence(keyword: Keyword) -> u8 {
    match keyword {
        Keyword::Constraint => 0,
        Keyword::Constant | Keyword::Option => 1,
        Keyword::Prime | Keyword::Derivative => 3,
        k if k.is_time_indexed() => 2,
        _ => 4,
    }
}

/// The first word of a line if it is followed by a space.
fn leading_word(text: &str) -> Option<&str> {
    let word = text::next_word(text, 0)?;
    (word.delimiter(text) == Some(' ')).then(|| word.text(text))
}

fn first_word(line: &SourceLine) -> Result<Word> {
    text::next_word(&line.text, 0)
        .ok_or_else(|| XodeError::source(ErrorKind::UnknownAssignment, line, 0))
}

fn word_after(line: &SourceLine, from: usize, kind: ErrorKind) -> Result<Word> {
    text::next_word(&line.text, from).ok_or_else(|| XodeError::source(kind, line, line.text.len()))
}

fn find_from(text: &str, from: usize, ch: char) -> Option<usize> {
    text.get(from..)?.find(ch).map(|i| from + i)
}

fn missing_bracket(line: &SourceLine) -> XodeError {
    XodeError::source(ErrorKind::MissingOpeningBracket, line, line.text.len())
}

/// Split a bracketed list of a source line into owned elements.
fn line_list(line: &SourceLine, open: usize, delims: &[char]) -> Result<(Vec<(usize, String)>, usize)> {
    let (items, close) = text::split_list(&line.text, open, delims)
        .map_err(|offset| XodeError::source(ErrorKind::ExpectedListArgument, line, offset))?;
    let items = items
        .into_iter()
        .map(|(offset, item)| (offset, text::strip_whitespace(item)))
        .collect();
    Ok((items, close))
}

fn parse_count(line: &SourceLine, word: Word) -> Result<usize> {
    word.text(&line.text)
        .parse()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| XodeError::source(ErrorKind::ExpectedNumber, line, word.start))
}

fn eval_number(line: &SourceLine, word: Word) -> Result<f64> {
    Evaluator::new()
        .eval(word.text(&line.text))
        .map(|value| value.as_f64())
        .map_err(|_| XodeError::source(ErrorKind::ExpectedNumber, line, word.start))
}

fn row_number(row: &SourceLine) -> Result<f64> {
    Evaluator::new()
        .eval(&row.text)
        .map(|value| value.as_f64())
        .map_err(|_| XodeError::source(ErrorKind::ExpectedNumber, row, 0))
}

/// Sample `expr` in `t` at `npts` evenly spaced points of `[low, high]`.
fn table_values(expr: &str, npts: usize, low: f64, high: f64) -> std::result::Result<Vec<String>, super::arith::ArithError> {
    let step = if npts > 1 {
        (high - low) / (npts - 1) as f64
    } else {
        0.0
    };
    let mut evaluator = Evaluator::new();
    (0..npts)
        .map(|i| {
            evaluator.set_var("t", Value::Float(low + step * i as f64));
            evaluator.eval(expr).map(|value| format_value(value.as_f64()))
        })
        .collect()
}

fn format_value(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::source::preprocess;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Result<ParsedModel> {
        let config = ParseConfig::default();
        let lines = preprocess(input, "test", &config)?;
        Parser::new(lines, config)?.parse()
    }

    fn kind(input: &str) -> Option<ErrorKind> {
        parse(input).err().and_then(|e| e.kind())
    }

    #[test]
    fn test_classify_statement_forms() {
        let model = parse(
            "!k=2\n\
             par a=1, b=2\n\
             x'=-k*x\n\
             dy/dt=a*y\n\
             z(t+1)=z/2\n\
             v(t)=int{exp(-t)#x}\n\
             init x=1\n\
             y(0)=0.5\n\
             aux e=x^2\n\
             number n=3\n\
             f(u,w)=u+w\n\
             bdry x-1\n\
             0=x+y-q\n\
             solve q=x+y\n\
             special s=mmult(n,x)\n\
             set fast {a=10,b=20}\n\
             @ dt=.01, total=20\n\
             tmp=x+y",
        )
        .unwrap();
        let s = &model.symbols;
        assert_eq!(s.constants, vec![Definition::named(1, "k", "2")]);
        assert_eq!(s.parameters.len(), 2);
        assert_eq!(s.parameters[1].name, "b");
        let equations: Vec<&str> = s.equations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(equations, vec!["x", "y", "z"]);
        assert_eq!(s.volterra[0].name, "v");
        assert_eq!(s.initial_conditions[1], Definition::named(8, "y", "0.5"));
        assert_eq!(s.auxiliary[0].expr, "x^2");
        assert_eq!(s.numbers[0].expr, "3");
        assert_eq!(s.functions[0].args, vec!["u", "w"]);
        assert_eq!(s.boundaries[0].expr, "x-1");
        assert_eq!(s.algebraic[0].name, "");
        assert_eq!(s.algebraic[1].name, "q");
        assert_eq!(s.special[0].expr, "mmult");
        assert_eq!(s.special[0].args, vec!["n", "x"]);
        assert_eq!(s.sets[0].args, vec!["a=10", "b=20"]);
        let options: Vec<&str> = s.options.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(options, vec!["DT", "TOTAL"]);
        assert_eq!(s.temporaries[0].name, "tmp");
        assert!(model.registry.is_used("tmp"));
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = parse("par a=1,a=2").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::DuplicatedName));
        assert_eq!(err.location().unwrap().column, 8);
    }

    #[test]
    fn test_name_errors() {
        assert_eq!(kind("sin=1"), Some(ErrorKind::ReservedFunction));
        assert_eq!(kind("par par=1"), Some(ErrorKind::ReservedKeyword));
        assert_eq!(kind("par dt=1"), Some(ErrorKind::ReservedOption));
        assert_eq!(kind("init w=1"), Some(ErrorKind::UnknownVariable));
        assert_eq!(kind("@ speed=2"), Some(ErrorKind::UnknownOption));
        assert_eq!(kind("param a=1"), Some(ErrorKind::UnknownAssignment));
        assert_eq!(kind("x'="), Some(ErrorKind::UnknownAssignment));
        assert_eq!(kind("number n=a"), Some(ErrorKind::ExpectedNumber));
        assert_eq!(kind("f(a,b)=a*2"), Some(ErrorKind::MissingArgument));
        assert_eq!(kind("f(a,)=a"), Some(ErrorKind::ExpectedListArgument));
        assert_eq!(kind("f(a,a)=a"), Some(ErrorKind::DuplicatedName));
    }

    #[test]
    fn test_names_must_be_identifiers() {
        let err = parse("10=x\nx'=10*x").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnknownAssignment));
        assert_eq!(err.location().unwrap().column, 0);
        assert_eq!(kind("par a=1\na+b=3"), Some(ErrorKind::UnknownAssignment));
        assert_eq!(kind("x''=-x"), Some(ErrorKind::UnknownAssignment));
        assert_eq!(kind("d/dt=1"), Some(ErrorKind::UnknownAssignment));
    }

    #[test]
    fn test_option_names_allowed_when_configured() {
        let config = ParseConfig::new().with_reserve_option_names(false);
        let lines = preprocess("par phi=1", "test", &config).unwrap();
        let model = Parser::new(lines, config).unwrap().parse().unwrap();
        assert_eq!(model.symbols.parameters[0].name, "phi");
    }

    #[test]
    fn test_markov() {
        let model = parse("markov z 2\n{0} {alpha}\n{beta} {0}\npar alpha=1,beta=2").unwrap();
        let markov = &model.symbols.markovs[0];
        assert_eq!(markov.name, "z");
        assert_eq!(markov.expr, "2");
        assert_eq!(markov.args, vec!["0", "alpha", "beta", "0"]);
        assert_eq!(model.symbols.parameters.len(), 2);
    }

    #[test]
    fn test_markov_errors() {
        assert_eq!(
            kind("markov z 2\n{0} {1}"),
            Some(ErrorKind::MissingMarkovAssignment)
        );
        assert_eq!(
            kind("markov z 2\n{0}\n{1} {0}"),
            Some(ErrorKind::MissingMarkovAssignment)
        );
        assert_eq!(
            kind("markov z 1\n{0} {1}"),
            Some(ErrorKind::WrongMarkovAssignment)
        );
        assert_eq!(kind("markov z two\n{0}"), Some(ErrorKind::ExpectedNumber));
    }

    #[test]
    fn test_function_table() {
        let model = parse("table sq % 3 0 2 t^2").unwrap();
        let table = &model.symbols.tables[0];
        assert_eq!(table.name, "sq");
        assert_eq!(table.expr, "t^2");
        let values: Vec<f64> = table.args.iter().map(|v| v.parse().unwrap()).collect();
        assert_eq!(values.len(), 3);
        assert_relative_eq!(values[1], 1.0);
        assert_relative_eq!(values[2], 4.0);
    }

    #[test]
    fn test_table_errors() {
        assert_eq!(kind("table f % x 0 1 t"), Some(ErrorKind::ExpectedNumber));
        assert_eq!(kind("table f % 3 0 1"), Some(ErrorKind::ExpectedTableAssignment));
        assert_eq!(kind("table f % 3 0 1 q*t"), Some(ErrorKind::WrongTableAssignment));
        assert!(matches!(
            parse("table f missing_table_file.tab"),
            Err(XodeError::TableReadError { .. })
        ));
    }

    #[test]
    fn test_wiener_global_export() {
        let model = parse(
            "wiener w1, w2 w3\n\
             x'=-x\n\
             global 1 x-1 {x=0;w1=1}\n\
             export {x,w1} {w2}",
        )
        .unwrap();
        let s = &model.symbols;
        assert_eq!(s.wieners.len(), 3);
        assert_eq!(s.wieners[2].name, "w3");
        assert_eq!(s.globals[0].name, "1");
        assert_eq!(s.globals[0].expr, "x-1");
        assert_eq!(s.globals[0].args, vec!["x=0", "w1=1"]);
        assert_eq!(s.exports[0].expr, "2");
        assert_eq!(s.exports[0].args, vec!["x", "w1", "w2"]);

        assert_eq!(kind("global 2 x {x=0}"), Some(ErrorKind::ExpectedNumber));
        assert_eq!(kind("global 1 x x=0"), Some(ErrorKind::MissingOpeningBracket));
        assert_eq!(kind("export {x,} {y}"), Some(ErrorKind::ExpectedListArgument));
    }

    #[test]
    fn test_array_lines_are_extracted() {
        let model = parse("par a1=1,a2=2\nx[1..2]'=-a[j]*x[j]").unwrap();
        let equations: Vec<(&str, &str)> = model
            .symbols
            .equations
            .iter()
            .map(|d| (d.name.as_str(), d.expr.as_str()))
            .collect();
        assert_eq!(equations, vec![("x1", "-a1*x1"), ("x2", "-a2*x2")]);
    }
}

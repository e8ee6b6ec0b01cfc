//! Front end for XPP-style ODE model files.
//!
//! A model file is line oriented. Each line holds one statement or a comma
//! separated list of assignments of the same kind. Everything after a line
//! reading `done` is ignored.
//!
//! # Statement Forms
//!
//! | Form | Category | Syntax |
//! |------|----------|--------|
//! | Constant | Constants | `!name=expr` |
//! | ODE | Equations | `name'=expr`, `dname/dt=expr`, `name(t+1)=expr` |
//! | Volterra | Volterra | `name(t)=expr`, `volt name=expr` |
//! | Auxiliary | Auxiliary | `aux name=expr` |
//! | Parameter | Parameters | `par name=value, ...` |
//! | Number | Numbers | `number name=value` |
//! | Function | Functions | `name(arg1,arg2)=expr` |
//! | Initial condition | InitialConditions | `init name=value`, `name(0)=value` |
//! | Boundary | Boundaries | `bdry expr` |
//! | Algebraic | Algebraic | `0=expr`, `solve name=expr` |
//! | Special | Special | `special name=call(args)` |
//! | Set | Sets | `set name {a=1,b=2}` |
//! | Option | Options | `@ option=value, ...` |
//! | Temporary | Temporaries | `name=expr` |
//!
//! # Block Statements
//!
//! | Keyword | Syntax |
//! |---------|--------|
//! | export | `export {in1,in2} {out1}` |
//! | markov | `markov name n` followed by `n` rows of `n` `{prob}` entries |
//! | table | `table name % npts xlo xhi expr` or `table name file` |
//! | wiener | `wiener w1 w2, w3` |
//! | global | `global sign condition {reset1;reset2}` |
//!
//! # Arrays
//!
//! `x[1..3]'=-x[j]` expands to one line per index with `j` bound to it.
//! `%[1..3]` applies the same to the lines up to the next `%`.
//!
//! # Example
//!
//! ```text
//! # damped oscillator
//! !omega=2*pi
//! par damping=0.1
//! f(a,b)=a*b
//! x'=y
//! y'=-f(omega,omega)*x-damping*y
//! init x=1, y=0
//! @ total=20, dt=0.01
//! done
//! ```

pub mod arith;
mod ast;
pub mod keywords;
mod parser;
mod registry;
mod source;
pub mod text;

pub use ast::*;
pub use parser::{ParseConfig, ParsedModel, Parser, DEFAULT_ARRAY_VARIABLE};
pub use registry::NameRegistry;
pub use source::{
    check_brackets, expand_arrays, normalize_whitespace, preprocess, read_lines, remove_comments,
    SourceLine, TERMINATOR,
};

use std::path::Path;

use crate::error::{Result, XodeError};

/// Parse a model string into a symbol table.
pub fn parse(input: &str) -> Result<ParsedModel> {
    parse_with_config(input, &ParseConfig::default())
}

/// Parse a model string with a custom configuration.
pub fn parse_with_config(input: &str, config: &ParseConfig) -> Result<ParsedModel> {
    parse_named(input, "<input>", config)
}

/// Parse a model file. Lookup tables are read relative to its directory.
pub fn parse_file(path: &Path) -> Result<ParsedModel> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = ParseConfig::default().with_table_dir(dir);
    parse_file_with_config(path, &config)
}

/// Parse a model file with a custom configuration.
pub fn parse_file_with_config(path: &Path, config: &ParseConfig) -> Result<ParsedModel> {
    let content = std::fs::read_to_string(path).map_err(|e| XodeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_named(&content, &path.display().to_string(), config)
}

fn parse_named(input: &str, name: &str, config: &ParseConfig) -> Result<ParsedModel> {
    let lines = preprocess(input, name, config)?;
    Parser::new(lines, config.clone())?.parse()
}

//! Final operand check of the expanded model.

use crate::dsl::text;
use crate::dsl::{Category, NameRegistry, SymbolTable};
use crate::error::{ErrorKind, Result, XodeError};

/// Categories whose expressions are handed to the integrator.
pub const CHECKED_CATEGORIES: [Category; 4] = [
    Category::Equations,
    Category::Volterra,
    Category::Auxiliary,
    Category::Algebraic,
];

/// Check that every identifier in the integrated expressions and markov
/// transitions is a defined name or a built-in.
pub fn validate_symbols(symbols: &SymbolTable, registry: &NameRegistry) -> Result<()> {
    let mut checked = 0;
    for category in CHECKED_CATEGORIES {
        for def in symbols.get(category) {
            check_expression(&def.expr, def.line, registry)?;
            checked += 1;
        }
    }
    for markov in &symbols.markovs {
        for entry in &markov.args {
            check_expression(entry, markov.line, registry)?;
            checked += 1;
        }
    }
    log::debug!("validated {checked} expression(s)");
    Ok(())
}

fn check_expression(expr: &str, line: usize, registry: &NameRegistry) -> Result<()> {
    match text::operands(expr)
        .into_iter()
        .find(|op| !op.is_number && !registry.is_known(op.text))
    {
        Some(unknown) => Err(XodeError::at(ErrorKind::UnknownName, line, expr, unknown.offset)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;
    use crate::expand::SubstitutionEngine;

    fn check(input: &str) -> Result<()> {
        let parsed = dsl::parse(input)?;
        let mut symbols = parsed.symbols;
        SubstitutionEngine::new(&parsed.registry, true).expand(&mut symbols)?;
        validate_symbols(&symbols, &parsed.registry)
    }

    #[test]
    fn test_known_names_pass() {
        assert!(check("par a=1\nx'=-a*x+sin(t)\naux e=x^2\n0=x-q\nsolve q=x").is_ok());
    }

    #[test]
    fn test_unknown_name_is_reported() {
        let err = check("par a=1\nx'=-a*x+b").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnknownName));
        let location = err.location().unwrap();
        assert_eq!(location.line, 2);
        assert_eq!(location.text, "-a*x+b");
        assert_eq!(location.column, 5);
    }

    #[test]
    fn test_markov_entries_are_checked() {
        let err = check("markov z 2\n{0} {r}\n{0.1} {0}\nx'=-x").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnknownName));
    }
}

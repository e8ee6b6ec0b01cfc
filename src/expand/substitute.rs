//! Inlining of constants, temporaries, numbers and function calls.

use crate::dsl::text;
use crate::dsl::{Category, Definition, NameRegistry, SymbolTable};
use crate::error::{ErrorKind, Result, XodeError};
use crate::trie::{Match, Trie, TrieBuilder};

/// Categories in the order substitution visits them. Every source category
/// is inlined into the categories that follow it. Parameters, initial
/// conditions, globals, sets and exports are left as written.
pub const EXPANSION_ORDER: [Category; 10] = [
    Category::Constants,
    Category::Temporaries,
    Category::Numbers,
    Category::Functions,
    Category::Algebraic,
    Category::Auxiliary,
    Category::Boundaries,
    Category::Equations,
    Category::Special,
    Category::Volterra,
];

/// Categories whose names are replaced by their expression.
const NAME_SOURCES: [Category; 3] = [Category::Constants, Category::Temporaries, Category::Numbers];

/// A resolved function body with its parameter occurrences.
#[derive(Debug)]
struct FunctionTemplate {
    body: String,
    params: usize,
    /// Parameter occurrences in the body, last first
    occurrences: Vec<Match>,
}

impl FunctionTemplate {
    fn new(def: &Definition) -> Result<Self> {
        let params = TrieBuilder::new().build_from(&def.args)?;
        let mut occurrences = delimited_matches(&params, &def.expr);
        occurrences.reverse();
        Ok(Self {
            body: def.expr.clone(),
            params: def.args.len(),
            occurrences,
        })
    }

    /// The body with every parameter replaced by the matching actual.
    fn instantiate(&self, actuals: &[&str], parenthesize: bool) -> String {
        let mut body = self.body.clone();
        for occurrence in &self.occurrences {
            let actual = actuals[occurrence.id];
            let replacement = if parenthesize && !text::is_atomic(actual) {
                format!("({actual})")
            } else {
                actual.to_string()
            };
            body.replace_range(occurrence.range(), &replacement);
        }
        body
    }
}

/// Expands the cross references of a symbol table.
#[derive(Debug)]
pub struct SubstitutionEngine<'a> {
    registry: &'a NameRegistry,
    parenthesize: bool,
}

impl<'a> SubstitutionEngine<'a> {
    /// Create an engine checking call arguments against `registry`.
    pub fn new(registry: &'a NameRegistry, parenthesize: bool) -> Self {
        Self {
            registry,
            parenthesize,
        }
    }

    /// Run both phases: names first, then function calls.
    pub fn expand(&self, symbols: &mut SymbolTable) -> Result<()> {
        self.inline_names(symbols)?;
        self.inline_functions(symbols)
    }

    /// Phase 1: replace constant, temporary and number names by their
    /// expressions in every later category and in markov transitions.
    pub fn inline_names(&self, symbols: &mut SymbolTable) -> Result<()> {
        for (index, &source) in NAME_SOURCES.iter().enumerate() {
            let mut defs = std::mem::take(symbols.get_mut(source));
            if defs.is_empty() {
                continue;
            }
            let trie = name_trie(&defs)?;

            let order = dependency_order(&defs, |expr| {
                delimited_matches(&trie, expr).into_iter().map(|m| m.id).collect()
            })?;
            for i in order {
                let mut expr = std::mem::take(&mut defs[i].expr);
                self.replace_names(&trie, &defs, &mut expr, &[]);
                defs[i].expr = expr;
            }

            let mut replaced = 0;
            for &target in &EXPANSION_ORDER[index + 1..] {
                for def in symbols.get_mut(target) {
                    let exclude: &[String] = if target == Category::Functions {
                        def.args.as_slice()
                    } else {
                        &[]
                    };
                    replaced += self.replace_names(&trie, &defs, &mut def.expr, exclude);
                }
            }
            for markov in &mut symbols.markovs {
                for entry in &mut markov.args {
                    replaced += self.replace_names(&trie, &defs, entry, &[]);
                }
            }
            log::debug!(
                "inlined {} {} name(s) at {} site(s)",
                defs.len(),
                source.label(),
                replaced
            );

            *symbols.get_mut(source) = defs;
        }
        Ok(())
    }

    /// Phase 2: inline every call of a user function.
    pub fn inline_functions(&self, symbols: &mut SymbolTable) -> Result<()> {
        if symbols.functions.is_empty() {
            return Ok(());
        }
        let trie = name_trie(&symbols.functions)?;

        let order = dependency_order(&symbols.functions, |expr| {
            call_matches(&trie, expr).into_iter().map(|m| m.id).collect()
        })?;
        let mut templates: Vec<Option<FunctionTemplate>> =
            (0..symbols.functions.len()).map(|_| None).collect();
        for i in order {
            let def = &symbols.functions[i];
            let mut expr = def.expr.clone();
            self.inline_calls(&trie, &templates, &mut expr, def.line, &def.args)?;
            symbols.functions[i].expr = expr;
            templates[i] = Some(FunctionTemplate::new(&symbols.functions[i])?);
        }

        let mut inlined = 0;
        let function_index = EXPANSION_ORDER
            .iter()
            .position(|&c| c == Category::Functions)
            .unwrap_or(EXPANSION_ORDER.len());
        for &target in &EXPANSION_ORDER[function_index + 1..] {
            for def in symbols.get_mut(target) {
                inlined += self.inline_calls(&trie, &templates, &mut def.expr, def.line, &[])?;
            }
        }
        for markov in &mut symbols.markovs {
            for entry in &mut markov.args {
                inlined += self.inline_calls(&trie, &templates, entry, markov.line, &[])?;
            }
        }
        log::debug!(
            "inlined {} function(s) at {} call site(s)",
            symbols.functions.len(),
            inlined
        );
        Ok(())
    }

    /// Replace delimited occurrences of source names in `expr`. Names in
    /// `exclude` are left alone. Returns the number of replacements.
    fn replace_names(&self, trie: &Trie, defs: &[Definition], expr: &mut String, exclude: &[String]) -> usize {
        let matches: Vec<Match> = delimited_matches(trie, expr)
            .into_iter()
            .filter(|m| !exclude.contains(&m.keyword))
            .collect();
        let whole = matches.len() == 1 && matches[0].range() == (0..expr.len());

        for m in matches.iter().rev() {
            let replacement = self.wrap(&defs[m.id].expr, whole);
            expr.replace_range(m.range(), &replacement);
        }
        matches.len()
    }

    /// Replace every call of a resolved function in `expr`, innermost and
    /// rightmost first. `locals` are the formal parameters in scope.
    fn inline_calls(
        &self,
        trie: &Trie,
        templates: &[Option<FunctionTemplate>],
        expr: &mut String,
        line: usize,
        locals: &[String],
    ) -> Result<usize> {
        let calls = call_matches(trie, expr);
        for call in calls.iter().rev() {
            let template = match &templates[call.id] {
                Some(template) => template,
                None => continue,
            };
            let open = call.end + 1;
            let (items, close) = text::split_list(expr, open, &[',']).map_err(|offset| {
                XodeError::at(ErrorKind::ExpectedListArgument, line, expr.as_str(), offset)
            })?;
            if items.len() != template.params {
                return Err(XodeError::at(ErrorKind::MissingArgument, line, expr.as_str(), open));
            }
            for &(offset, item) in &items {
                self.check_argument(item, locals)
                    .map_err(|column| XodeError::at(ErrorKind::UnknownName, line, expr.as_str(), offset + column))?;
            }

            let actuals: Vec<&str> = items.iter().map(|&(_, item)| item).collect();
            let body = template.instantiate(&actuals, self.parenthesize);
            let whole = call.start == 0 && close + 1 == expr.len();
            let replacement = self.wrap(&body, whole);
            log::trace!("line {}: {} -> {}", line, &expr[call.start..=close], replacement);
            expr.replace_range(call.start..close + 1, &replacement);
        }
        Ok(calls.len())
    }

    /// Check that an actual argument only uses known names. Returns the
    /// offset of the first unknown one.
    fn check_argument(&self, arg: &str, locals: &[String]) -> std::result::Result<(), usize> {
        for operand in text::operands(arg) {
            let known = operand.is_number
                || self.registry.is_known(operand.text)
                || locals.iter().any(|l| l == operand.text);
            if !known {
                return Err(operand.offset);
            }
        }
        Ok(())
    }

    fn wrap(&self, expr: &str, whole: bool) -> String {
        if !self.parenthesize || whole || text::is_atomic(expr) {
            expr.to_string()
        } else {
            format!("({expr})")
        }
    }
}

fn name_trie(defs: &[Definition]) -> Result<Trie> {
    Ok(TrieBuilder::new().build_from(defs.iter().map(|d| d.name.as_str()))?)
}

/// Matches that form a complete identifier.
fn delimited_matches(trie: &Trie, expr: &str) -> Vec<Match> {
    trie.scan(expr)
        .into_iter()
        .filter(|m| text::is_delimited(expr, m.start, m.end + 1))
        .collect()
}

/// Matches that form a complete identifier directly followed by `(`.
fn call_matches(trie: &Trie, expr: &str) -> Vec<Match> {
    delimited_matches(trie, expr)
        .into_iter()
        .filter(|m| expr[m.end + 1..].starts_with('('))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    Active,
    Done,
}

/// Order definitions so every definition comes after the ones it refers
/// to. `references` lists the indices an expression refers to.
fn dependency_order<F>(defs: &[Definition], references: F) -> Result<Vec<usize>>
where
    F: Fn(&str) -> Vec<usize>,
{
    fn visit<F: Fn(&str) -> Vec<usize>>(
        i: usize,
        defs: &[Definition],
        references: &F,
        state: &mut [Visit],
        order: &mut Vec<usize>,
    ) -> Result<()> {
        match state[i] {
            Visit::Done => return Ok(()),
            Visit::Active => {
                let def = &defs[i];
                return Err(XodeError::at(
                    ErrorKind::CircularReference,
                    def.line,
                    format!("{}={}", def.name, def.expr),
                    0,
                ));
            }
            Visit::Pending => {}
        }
        state[i] = Visit::Active;
        for j in references(&defs[i].expr) {
            visit(j, defs, references, state, order)?;
        }
        state[i] = Visit::Done;
        order.push(i);
        Ok(())
    }

    let mut state = vec![Visit::Pending; defs.len()];
    let mut order = Vec::with_capacity(defs.len());
    for i in 0..defs.len() {
        visit(i, defs, &references, &mut state, &mut order)?;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;

    fn expand(input: &str) -> Result<SymbolTable> {
        let parsed = dsl::parse(input)?;
        let mut symbols = parsed.symbols;
        SubstitutionEngine::new(&parsed.registry, true).expand(&mut symbols)?;
        Ok(symbols)
    }

    fn equation(symbols: &SymbolTable, name: &str) -> String {
        symbols
            .equations
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.expr.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_constant_is_inlined() {
        let symbols = expand("!k=2\ndx/dt=k*x").unwrap();
        assert_eq!(equation(&symbols, "x"), "2*x");
    }

    #[test]
    fn test_function_call_is_inlined() {
        let symbols = expand("f(a,b)=a+b*2\ny'=f(x,3)\nx'=0").unwrap();
        assert_eq!(equation(&symbols, "y"), "x+3*2");
    }

    #[test]
    fn test_names_match_whole_identifiers_only() {
        let symbols = expand("!k=2\npar kappa=1\nx'=kappa*k+k_1\npar k_1=0").unwrap();
        assert_eq!(equation(&symbols, "x"), "kappa*2+k_1");
    }

    #[test]
    fn test_compound_replacements_are_parenthesized() {
        let symbols = expand("!c=1+2\nf(u)=u*u\nx'=c*x+f(x-1)").unwrap();
        assert_eq!(equation(&symbols, "x"), "(1+2)*x+((x-1)*(x-1))");
    }

    #[test]
    fn test_constants_resolve_in_dependency_order() {
        let symbols = expand("!a=b*2\n!b=c+1\n!c=3\nx'=a").unwrap();
        assert_eq!(symbols.constants[1].expr, "3+1");
        assert_eq!(equation(&symbols, "x"), "(3+1)*2");
    }

    #[test]
    fn test_temporaries_and_numbers() {
        let symbols = expand("number n=4\ns=x+y\nx'=s/n\ny'=-s").unwrap();
        assert_eq!(equation(&symbols, "x"), "(x+y)/4");
        assert_eq!(equation(&symbols, "y"), "-(x+y)");
    }

    #[test]
    fn test_function_parameters_are_not_replaced() {
        let symbols = expand("!a=5\nf(a)=a*2\nx'=f(x)").unwrap();
        assert_eq!(symbols.functions[0].expr, "a*2");
        assert_eq!(equation(&symbols, "x"), "x*2");
    }

    #[test]
    fn test_nested_and_chained_functions() {
        let symbols = expand("g(u)=u+1\nf(v)=2*g(v)\nx'=f(g(x))").unwrap();
        assert_eq!(symbols.functions[1].expr, "2*(v+1)");
        assert_eq!(equation(&symbols, "x"), "2*((x+1)+1)");
    }

    #[test]
    fn test_markov_entries_are_expanded() {
        let symbols = expand("!r=0.1\nmarkov z 2\n{0} {r*x}\n{r} {0}\nx'=-x").unwrap();
        assert_eq!(symbols.markovs[0].args, vec!["0", "0.1*x", "0.1", "0"]);
    }

    #[test]
    fn test_unexpanded_categories_keep_their_text() {
        let symbols = expand("!k=2\nx'=-x\ninit x=k\nglobal 1 x-k {x=0}").unwrap();
        assert_eq!(equation(&symbols, "x"), "-x");
        assert_eq!(symbols.initial_conditions[0].expr, "k");
        assert_eq!(symbols.globals[0].expr, "x-k");
        assert_eq!(symbols.globals[0].args, vec!["x=0"]);
    }

    #[test]
    fn test_circular_references() {
        let err = expand("!a=b\n!b=a\nx'=a").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::CircularReference));

        let err = expand("f(u)=g(u)\ng(u)=f(u)\nx'=f(x)").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::CircularReference));
    }

    #[test]
    fn test_unknown_call_argument() {
        let err = expand("f(u)=u\nx'=f(q)").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnknownName));
        assert_eq!(err.location().unwrap().column, 2);
    }

    #[test]
    fn test_wrong_argument_count() {
        let err = expand("f(u,v)=u*v\nx'=f(x)").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingArgument));
    }

    #[test]
    fn test_without_parentheses() {
        let parsed = dsl::parse("!c=1+2\nx'=c*x").unwrap();
        let mut symbols = parsed.symbols;
        SubstitutionEngine::new(&parsed.registry, false)
            .expand(&mut symbols)
            .unwrap();
        assert_eq!(equation(&symbols, "x"), "1+2*x");
    }
}

//! Definition records and the per-category symbol table.

use std::fmt;

use serde::Serialize;

/// A parsed statement: its name, expression text and optional argument list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Definition {
    /// Source line number for error reporting
    pub line: usize,
    /// Defined name (empty for unnamed forms such as boundaries)
    pub name: String,
    /// Expression text, rewritten in place by the expander
    pub expr: String,
    /// Argument names or list elements, depending on the category
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Definition {
    /// Create an empty definition for a source line.
    pub fn new(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    /// Create a definition with a name and expression.
    pub fn named(line: usize, name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            line,
            name: name.into(),
            expr: expr.into(),
            args: Vec::new(),
        }
    }
}

/// Categories of definitions, in the order the expander visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// `!name=expr`
    Constants,
    /// `name=expr`
    Temporaries,
    /// `number name=value`
    Numbers,
    /// `name(args)=expr`
    Functions,
    /// `0=expr` and `solve name=expr`
    Algebraic,
    /// `aux name=expr`
    Auxiliary,
    /// `bdry expr`
    Boundaries,
    /// `name'=expr`, `dname/dt=expr`, `name(t+1)=expr`
    Equations,
    /// `special name=call(args)`
    Special,
    /// `name(t)=expr` and `volt name=expr`
    Volterra,
    /// `par name=value`
    Parameters,
    /// `init name=value` and `name(0)=value`
    InitialConditions,
    /// `markov name nstates` with its transition rows
    Markovs,
    /// `table name ...`
    Tables,
    /// `wiener name ...`
    Wieners,
    /// `global sign condition {resets}`
    Globals,
    /// `set name {assignments}`
    Sets,
    /// `@ option=value`
    Options,
    /// `export {in} {out}`
    Exports,
}

impl Category {
    /// Every category in expansion order.
    pub const ALL: [Category; 19] = [
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
        Category::Parameters,
        Category::InitialConditions,
        Category::Markovs,
        Category::Tables,
        Category::Wieners,
        Category::Globals,
        Category::Sets,
        Category::Options,
        Category::Exports,
    ];

    /// Label used when summarizing a model.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Constants => "constant",
            Self::Temporaries => "temporary",
            Self::Numbers => "number",
            Self::Functions => "function",
            Self::Algebraic => "algebraic expression",
            Self::Auxiliary => "auxiliary variable",
            Self::Boundaries => "boundary condition",
            Self::Equations => "ODE",
            Self::Special => "special function",
            Self::Volterra => "differential ODE",
            Self::Parameters => "parameter",
            Self::InitialConditions => "initial condition",
            Self::Markovs => "markov process",
            Self::Tables => "lookup table",
            Self::Wieners => "wiener process",
            Self::Globals => "global flag",
            Self::Sets => "set",
            Self::Options => "option",
            Self::Exports => "export",
        }
    }
}

/// Ordered definition records, one table per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    pub constants: Vec<Definition>,
    pub temporaries: Vec<Definition>,
    pub numbers: Vec<Definition>,
    pub functions: Vec<Definition>,
    pub algebraic: Vec<Definition>,
    pub auxiliary: Vec<Definition>,
    pub boundaries: Vec<Definition>,
    pub equations: Vec<Definition>,
    pub special: Vec<Definition>,
    pub volterra: Vec<Definition>,
    pub parameters: Vec<Definition>,
    pub initial_conditions: Vec<Definition>,
    pub markovs: Vec<Definition>,
    pub tables: Vec<Definition>,
    pub wieners: Vec<Definition>,
    pub globals: Vec<Definition>,
    pub sets: Vec<Definition>,
    pub options: Vec<Definition>,
    pub exports: Vec<Definition>,
}

impl SymbolTable {
    /// Create a new empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The records of one category.
    pub fn get(&self, category: Category) -> &Vec<Definition> {
        match category {
            Category::Constants => &self.constants,
            Category::Temporaries => &self.temporaries,
            Category::Numbers => &self.numbers,
            Category::Functions => &self.functions,
            Category::Algebraic => &self.algebraic,
            Category::Auxiliary => &self.auxiliary,
            Category::Boundaries => &self.boundaries,
            Category::Equations => &self.equations,
            Category::Special => &self.special,
            Category::Volterra => &self.volterra,
            Category::Parameters => &self.parameters,
            Category::InitialConditions => &self.initial_conditions,
            Category::Markovs => &self.markovs,
            Category::Tables => &self.tables,
            Category::Wieners => &self.wieners,
            Category::Globals => &self.globals,
            Category::Sets => &self.sets,
            Category::Options => &self.options,
            Category::Exports => &self.exports,
        }
    }

    /// Mutable access to the records of one category.
    pub fn get_mut(&mut self, category: Category) -> &mut Vec<Definition> {
        match category {
            Category::Constants => &mut self.constants,
            Category::Temporaries => &mut self.temporaries,
            Category::Numbers => &mut self.numbers,
            Category::Functions => &mut self.functions,
            Category::Algebraic => &mut self.algebraic,
            Category::Auxiliary => &mut self.auxiliary,
            Category::Boundaries => &mut self.boundaries,
            Category::Equations => &mut self.equations,
            Category::Special => &mut self.special,
            Category::Volterra => &mut self.volterra,
            Category::Parameters => &mut self.parameters,
            Category::InitialConditions => &mut self.initial_conditions,
            Category::Markovs => &mut self.markovs,
            Category::Tables => &mut self.tables,
            Category::Wieners => &mut self.wieners,
            Category::Globals => &mut self.globals,
            Category::Sets => &mut self.sets,
            Category::Options => &mut self.options,
            Category::Exports => &mut self.exports,
        }
    }

    /// Append a record to a category.
    pub fn push(&mut self, category: Category, definition: Definition) {
        log::trace!(
            "line {}: {} '{}' = {}",
            definition.line,
            category.label(),
            definition.name,
            definition.expr
        );
        self.get_mut(category).push(definition);
    }

    /// Find a named record in any category.
    pub fn find(&self, name: &str) -> Option<(Category, &Definition)> {
        Category::ALL.iter().find_map(|&category| {
            self.get(category)
                .iter()
                .find(|def| !def.name.is_empty() && def.name == name)
                .map(|def| (category, def))
        })
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|&c| self.get(c).len()).sum()
    }

    /// Check if no record has been extracted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable listing of every record.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in Category::ALL {
            for def in self.get(category) {
                let label = category.label();
                match category {
                    Category::Functions => {
                        writeln!(f, "{label} {}({})={}", def.name, def.args.join(","), def.expr)?
                    }
                    Category::Equations => writeln!(f, "{label} {}'={}", def.name, def.expr)?,
                    Category::Boundaries => writeln!(f, "{label}: {}", def.expr)?,
                    Category::Algebraic if def.name.is_empty() => {
                        writeln!(f, "{label}: 0={}", def.expr)?
                    }
                    Category::Special => {
                        writeln!(f, "{label} {}={}({})", def.name, def.expr, def.args.join(","))?
                    }
                    Category::Markovs => writeln!(
                        f,
                        "{label} {} with {} states: {{{}}}",
                        def.name,
                        def.expr,
                        def.args.join("}{")
                    )?,
                    Category::Tables => writeln!(
                        f,
                        "{label} {} from {} ({} points)",
                        def.name,
                        def.expr,
                        def.args.len()
                    )?,
                    Category::Wieners => writeln!(f, "{label} {}", def.name)?,
                    Category::Globals => writeln!(
                        f,
                        "{label} {} when {}: {}",
                        def.name,
                        def.expr,
                        def.args.join(";")
                    )?,
                    Category::Sets => writeln!(f, "{label} {} {{{}}}", def.name, def.args.join(","))?,
                    Category::Exports => {
                        let inputs: usize = def.expr.parse().unwrap_or(0).min(def.args.len());
                        writeln!(
                            f,
                            "{label} {{{}}} -> {{{}}}",
                            def.args[..inputs].join(","),
                            def.args[inputs..].join(",")
                        )?
                    }
                    _ => writeln!(f, "{label} {}={}", def.name, def.expr)?,
                }
            }
        }
        Ok(())
    }
}

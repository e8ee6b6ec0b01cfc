//! Fixed vocabularies of the model language.

use super::ast::Category;

/// Statement forms recognized by the keyword trie.
///
/// The discriminant is the keyword's id in the trie, so the order of
/// [`Keyword::ALL`] is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `!name=expr`
    Constant,
    /// `name(t+1)=expr`
    Difference,
    /// `name'=expr`
    Prime,
    /// `dname/dt=expr`
    Derivative,
    /// `name(t)=expr`
    VolterraIndex,
    /// `volt name=expr`
    Volterra,
    /// `aux name=expr`
    Aux,
    /// `par name=value`
    Par,
    /// `number name=value`
    Number,
    /// `name(args)=expr`
    Function,
    /// `init name=value`
    Init,
    /// `name(0)=value`
    InitIndex,
    /// `bdry expr`
    Bdry,
    /// `0=expr`
    Constraint,
    /// `solve name=expr`
    Solve,
    /// `special name=call(args)`
    Special,
    /// `set name {a=1,b=2}`
    Set,
    /// `@ option=value`
    Option,
    /// `export {in} {out}`
    Export,
    /// `name=expr`, a plain temporary (never part of the dictionary)
    Temporary,
}

impl Keyword {
    /// Every dictionary keyword in id order.
    pub const ALL: [Keyword; 19] = [
        Keyword::Constant,
        Keyword::Difference,
        Keyword::Prime,
        Keyword::Derivative,
        Keyword::VolterraIndex,
        Keyword::Volterra,
        Keyword::Aux,
        Keyword::Par,
        Keyword::Number,
        Keyword::Function,
        Keyword::Init,
        Keyword::InitIndex,
        Keyword::Bdry,
        Keyword::Constraint,
        Keyword::Solve,
        Keyword::Special,
        Keyword::Set,
        Keyword::Option,
        Keyword::Export,
    ];

    /// Look up a keyword by its trie id. Ids past the dictionary denote a
    /// plain temporary.
    pub fn from_id(id: usize) -> Self {
        Self::ALL.get(id).copied().unwrap_or(Keyword::Temporary)
    }

    /// The trie id of this keyword.
    pub fn id(&self) -> usize {
        *self as usize
    }

    /// Text of the keyword as it appears in the source.
    pub fn text(&self) -> &'static str {
        match self {
            Self::Constant => "!",
            Self::Difference => "(t+1)",
            Self::Prime => "'",
            Self::Derivative => "/dt",
            Self::VolterraIndex => "(t)",
            Self::Volterra => "volt",
            Self::Aux => "aux",
            Self::Par => "par",
            Self::Number => "number",
            Self::Function => "(",
            Self::Init => "init",
            Self::InitIndex => "(0)",
            Self::Bdry => "bdry",
            Self::Constraint => "0=",
            Self::Solve => "solve",
            Self::Special => "special",
            Self::Set => "set",
            Self::Option => "@",
            Self::Export => "export",
            Self::Temporary => "",
        }
    }

    /// Forms where the keyword is fused with the defined name.
    pub fn is_name_integrated(&self) -> bool {
        matches!(
            self,
            Self::Constant | Self::Prime | Self::Derivative | Self::Function
        ) || self.is_time_indexed()
    }

    /// `(t)`, `(t+1)` and `(0)`, which shadow the function-call form.
    pub fn is_time_indexed(&self) -> bool {
        matches!(self, Self::Difference | Self::VolterraIndex | Self::InitIndex)
    }

    /// The symbol table category a definition of this form goes to.
    pub fn category(&self) -> Category {
        match self {
            Self::Constant => Category::Constants,
            Self::Difference | Self::Prime | Self::Derivative => Category::Equations,
            Self::VolterraIndex | Self::Volterra => Category::Volterra,
            Self::Aux => Category::Auxiliary,
            Self::Par => Category::Parameters,
            Self::Number => Category::Numbers,
            Self::Function => Category::Functions,
            Self::Init | Self::InitIndex => Category::InitialConditions,
            Self::Bdry => Category::Boundaries,
            Self::Constraint | Self::Solve => Category::Algebraic,
            Self::Special => Category::Special,
            Self::Set => Category::Sets,
            Self::Option => Category::Options,
            Self::Export => Category::Exports,
            Self::Temporary => Category::Temporaries,
        }
    }

    /// Forms introduced by a leading word followed by a space.
    pub fn is_leading(&self) -> bool {
        matches!(
            self,
            Self::Volterra
                | Self::Aux
                | Self::Par
                | Self::Number
                | Self::Init
                | Self::Bdry
                | Self::Solve
                | Self::Special
                | Self::Set
                | Self::Option
                | Self::Export
        )
    }
}

/// Leading words of the statements extracted by dedicated multi-line passes.
pub const BLOCK_KEYWORDS: [&str; 5] = ["export", "markov", "table", "wiener", "global"];

/// Reserved names of built-in functions and constants.
pub const RESERVED_NAMES: &[&str] = &[
    "sin", "cos", "tan", "atan", "atan2", "sinh", "cosh", "tanh", "exp", "delay", "ln", "log",
    "log10", "t", "pi", "if", "then", "else", "asin", "acos", "heav", "sign", "mod", "flr",
    "ran", "abs", "del_shft", "max", "min", "normal", "besselj", "bessely", "besseli", "erf",
    "erfc", "poisson", "lgamma", "shift", "sum", "int", "not", "sqrt",
];

/// Options that may be set with `@` lines (matched case insensitively).
pub const OPTION_NAMES: &[&str] = &[
    "QUIET", "LOGFILE", "OUTPUT", "MAXSTOR", "SMC", "UMC", "XNC", "YNC", "SEC", "UEC", "SPC",
    "UPC", "COLORMAP", "COLORIZE", "COLORVIA", "COLORLO", "COLORHI", "LT", "NPLOT", "MULTIWIN",
    "SIMPLOT", "XP", "YP", "ZP", "XP2", "YP2", "ZP2", "XP3", "YP3", "ZP3", "XP4", "YP4", "ZP4",
    "XP5", "YP5", "ZP5", "XP6", "YP6", "ZP6", "XP7", "YP7", "ZP7", "XP8", "YP8", "ZP8", "XLO",
    "YLO", "XHI", "YHI", "XLO2", "YLO2", "XHI2", "YHI2", "XLO3", "YLO3", "XHI3", "YHI3", "XLO4",
    "YLO4", "XHI4", "YHI4", "XLO5", "YLO5", "XHI5", "YHI5", "XLO6", "YLO6", "XHI6", "YHI6",
    "XLO7", "YLO7", "XHI7", "YHI7", "XLO8", "YLO8", "XHI8", "YHI8", "XMAX", "XMIN", "YMAX",
    "YMIN", "ZMAX", "ZMIN", "AXES", "PHI", "THETA", "SEED", "TOTAL", "DT", "DTMIN", "DTMAX",
    "NJMP", "NOUT", "T0", "TRANS", "NMESH", "DFGRID", "METH", "BANDUP", "BANDLO", "VMAXPTS",
    "JAC_EPS", "NEWT_TOL", "NEWT_ITER", "ATOLER", "TOLER", "BOUND", "DELAY", "AUTOEVAL",
    "POIMAP", "POIVAR", "POIPLN", "POISGN", "POISTOP", "RANGE", "RANGEOVER", "RANGESTEP",
    "RANGELOW", "RANGEHIGH", "RANGERESET", "RANGEOLDIC", "TOR_PER", "FOLD", "NTST", "NMAX",
    "NPR", "DSMIN", "DSMAX", "DS", "EPSS", "EPSL", "EPSU", "PARMIN", "PARMAX", "NORMMIN",
    "NORMMAX", "AUTOXMIN", "AUTOXMAX", "AUTOYMIN", "AUTOYMAX", "AUTOVAR", "BELL",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_ids_follow_dictionary_order() {
        for (id, keyword) in Keyword::ALL.iter().enumerate() {
            assert_eq!(keyword.id(), id);
            assert_eq!(Keyword::from_id(id), *keyword);
        }
        assert_eq!(Keyword::from_id(Keyword::ALL.len()), Keyword::Temporary);
    }

    #[test]
    fn test_routing() {
        assert_eq!(Keyword::Derivative.category(), Category::Equations);
        assert_eq!(Keyword::Volterra.category(), Category::Volterra);
        assert_eq!(Keyword::InitIndex.category(), Category::InitialConditions);
        assert_eq!(Keyword::Constraint.category(), Category::Algebraic);
        assert_eq!(Keyword::Temporary.category(), Category::Temporaries);
    }

    #[test]
    fn test_name_integrated_forms() {
        assert!(Keyword::Prime.is_name_integrated());
        assert!(Keyword::InitIndex.is_name_integrated());
        assert!(Keyword::VolterraIndex.is_time_indexed());
        assert!(!Keyword::Function.is_time_indexed());
        assert!(!Keyword::Par.is_name_integrated());
        assert!(!Keyword::Option.is_name_integrated());
    }

    #[test]
    fn test_option_names_are_unique() {
        let mut names: Vec<&str> = OPTION_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), OPTION_NAMES.len());
    }
}

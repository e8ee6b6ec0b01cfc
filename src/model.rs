//! Expanded model: the symbol table after substitution.

use serde::Serialize;

use crate::dsl::{Category, Definition, NameRegistry, ParsedModel, SymbolTable};
use crate::error::Result;
use crate::expand::{self, SubstitutionEngine};

/// Configuration for building a [`Model`].
#[derive(Debug, Clone, Copy)]
pub struct ModelConfig {
    /// Check the operands of the expanded expressions.
    pub validate_operands: bool,
    /// Parenthesize compound text spliced into a larger expression.
    pub parenthesize: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            validate_operands: true,
            parenthesize: true,
        }
    }
}

impl ModelConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether operands are validated after expansion.
    pub fn with_validate_operands(mut self, flag: bool) -> Self {
        self.validate_operands = flag;
        self
    }

    /// Set whether spliced compound text is parenthesized.
    ///
    /// Without parentheses `!c=1+2` turns `c*x` into `1+2*x`, which changes
    /// the meaning. Only disable this for models that already parenthesize
    /// their definitions.
    pub fn with_parenthesize(mut self, flag: bool) -> Self {
        self.parenthesize = flag;
        self
    }
}

/// A model with every constant and function call inlined.
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    symbols: SymbolTable,
    #[serde(skip)]
    registry: NameRegistry,
}

impl Model {
    /// Expand a parsed model with the default configuration.
    pub fn from_ast(parsed: ParsedModel) -> Result<Self> {
        Self::with_config(parsed, ModelConfig::default())
    }

    /// Expand a parsed model.
    pub fn with_config(parsed: ParsedModel, config: ModelConfig) -> Result<Self> {
        let ParsedModel {
            mut symbols,
            registry,
        } = parsed;
        SubstitutionEngine::new(&registry, config.parenthesize).expand(&mut symbols)?;

        let model = Self { symbols, registry };
        if config.validate_operands {
            expand::validate_model(&model)?;
        }
        log::debug!("built model with {} definitions", model.symbols.len());
        Ok(model)
    }

    /// The expanded symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The names defined by the model.
    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Consume the model, returning its symbol table.
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    /// Look up a named definition.
    pub fn definition(&self, name: &str) -> Option<(Category, &Definition)> {
        self.symbols.find(name)
    }

    /// The expanded expression of a named definition.
    pub fn expression(&self, name: &str) -> Option<&str> {
        self.definition(name).map(|(_, def)| def.expr.as_str())
    }

    /// Human-readable listing of every definition.
    pub fn summary(&self) -> String {
        self.symbols.summary()
    }

    /// The expanded symbol table as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.symbols)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;
    use crate::error::ErrorKind;

    const OSCILLATOR: &str = "\
# damped oscillator
!omega=2
par damping=0.1
f(a,b)=a*b
x'=y
y'=-f(omega,omega)*x-damping*y
init x=1, y=0
@ total=20
done";

    #[test]
    fn test_from_ast() {
        let model = Model::from_ast(dsl::parse(OSCILLATOR).unwrap()).unwrap();
        assert_eq!(model.expression("y"), Some("-(2*2)*x-damping*y"));
        assert_eq!(model.expression("x"), Some("y"));
        let (category, _) = model.definition("damping").unwrap();
        assert_eq!(category, Category::Parameters);
        assert!(model.summary().contains("ODE y'=-(2*2)*x-damping*y"));
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let parsed = dsl::parse("x'=-x*unknown").unwrap();
        let err = Model::from_ast(parsed.clone()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnknownName));

        let config = ModelConfig::new().with_validate_operands(false);
        let model = Model::with_config(parsed, config).unwrap();
        assert_eq!(model.expression("x"), Some("-x*unknown"));
    }

    #[test]
    fn test_to_json() {
        let model = Model::from_ast(dsl::parse(OSCILLATOR).unwrap()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
        assert_eq!(json["parameters"][0]["name"], "damping");
        assert_eq!(json["functions"][0]["args"][1], "b");
        assert!(json["equations"][0].get("args").is_none());
    }
}

//! Expansion of cross references between definitions.
//!
//! Substitution runs in two phases over the categories in
//! [`EXPANSION_ORDER`]:
//!
//! 1. Constant, temporary and number names are replaced by their
//!    expressions in every category that follows them.
//! 2. Calls of user functions are inlined, with the actual arguments put in
//!    place of the formal ones.
//!
//! References inside a category are resolved in dependency order, so a
//! constant may use another constant and a function may call another
//! function. A cycle is reported as [`ErrorKind::CircularReference`].
//!
//! Replacements only touch complete identifiers, and compound replacement
//! text is parenthesized unless it forms the whole expression:
//!
//! ```
//! use xode_core::{dsl, expand::SubstitutionEngine};
//!
//! let parsed = dsl::parse("!c=1+2\nf(u)=u*u\nx'=c*f(x)").unwrap();
//! let mut symbols = parsed.symbols;
//! SubstitutionEngine::new(&parsed.registry, true)
//!     .expand(&mut symbols)
//!     .unwrap();
//! assert_eq!(symbols.equations[0].expr, "(1+2)*(x*x)");
//! ```
//!
//! [`ErrorKind::CircularReference`]: crate::error::ErrorKind::CircularReference

mod substitute;
mod validate;

pub use substitute::{SubstitutionEngine, EXPANSION_ORDER};
pub use validate::{validate_symbols, CHECKED_CATEGORIES};

use crate::error::Result;
use crate::model::Model;

/// Check the operands of an expanded model.
pub fn validate_model(model: &Model) -> Result<()> {
    validate_symbols(model.symbols(), model.registry())
}

//! WASM bindings for Xode Core.
//!
//! This module provides JavaScript-friendly bindings for parsing and
//! expanding model files in the browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmOdeModel } from 'xode_core';
//!
//! await init();
//!
//! const source = `
//!   !k=2
//!   x'=-k*x
//!   init x=1
//! `;
//!
//! const model = new WasmOdeModel(source);
//! console.log(model.summary());
//! console.log(model.expression('x'));  // "-2*x"
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl;
use crate::error::XodeError;
use crate::model::{Model, ModelConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: XodeError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible expanded model.
///
/// This struct wraps the native `Model` and exposes its definitions as
/// strings.
#[wasm_bindgen]
pub struct WasmOdeModel {
    model: Model,
}

#[wasm_bindgen]
impl WasmOdeModel {
    /// Parse and expand a model.
    ///
    /// # Arguments
    /// * `source` - The model text
    ///
    /// # Returns
    /// A new `WasmOdeModel` instance or the formatted error message.
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str) -> Result<WasmOdeModel, JsValue> {
        Self::with_config(source, true)
    }

    /// Parse and expand a model, optionally skipping the operand check.
    #[wasm_bindgen]
    pub fn with_config(source: &str, validate: bool) -> Result<WasmOdeModel, JsValue> {
        let parsed = dsl::parse(source).map_err(to_js)?;
        let config = ModelConfig::new().with_validate_operands(validate);
        let model = Model::with_config(parsed, config).map_err(to_js)?;
        Ok(WasmOdeModel { model })
    }

    /// Human-readable listing of every definition.
    #[wasm_bindgen]
    pub fn summary(&self) -> String {
        self.model.summary()
    }

    /// The expanded symbol table as JSON.
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.model.to_json().map_err(to_js)
    }

    /// The expanded expression of a named definition, or `undefined`.
    #[wasm_bindgen]
    pub fn expression(&self, name: &str) -> Option<String> {
        self.model.expression(name).map(str::to_string)
    }

    /// Number of definitions in the model.
    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.model.symbols().len()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

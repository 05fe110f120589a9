//! Unboxed literal values, used for interned constants and for
//! constant-folded initializers carried in `NodeInfo::params`.

use serde::{Deserialize, Serialize};

/// A uC literal value after unboxing from its AST `Constant` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Int(i64),
    /// Stored as `f64` internally to avoid `f32` equality/NaN pitfalls when
    /// this value is later compared during constant folding.
    Float(f64),
    Char(char),
    Str(String),
}

//! Typed field values.
//!
//! Component order follows the wire layout:
//! - `Mat3Sym`: xx, yy, zz, xy, yz, xz
//! - `Mat3General`: row major
//! - `Mat3Diagonal`: xx, yy, zz
//! - `Tens4Sym`: the 21 independent components of a symmetric 6x6 matrix

use super::error::{Result, XpltError};
use super::models::ValueType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Float(f32),
    Vec3([f32; 3]),
    Mat3Sym([f32; 6]),
    Mat3Diagonal([f32; 3]),
    Tens4Sym([f32; 21]),
    Mat3General([f32; 9]),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Float(_) => ValueType::Float,
            Value::Vec3(_) => ValueType::Vec3,
            Value::Mat3Sym(_) => ValueType::Mat3Sym,
            Value::Mat3Diagonal(_) => ValueType::Mat3Diagonal,
            Value::Tens4Sym(_) => ValueType::Tens4Sym,
            Value::Mat3General(_) => ValueType::Mat3General,
        }
    }

    /// Builds a value from exactly `value_type.components()` floats.
    pub fn from_components(value_type: ValueType, c: &[f32]) -> Result<Self> {
        if c.len() != value_type.components() {
            return Err(XpltError::SizeMismatch {
                context: format!("{} value", value_type),
                expected: (value_type.components() * 4) as u64,
                found: (c.len() * 4) as u64,
            });
        }
        Ok(match value_type {
            ValueType::Float => Value::Float(c[0]),
            ValueType::Vec3 => Value::Vec3([c[0], c[1], c[2]]),
            ValueType::Mat3Diagonal => Value::Mat3Diagonal([c[0], c[1], c[2]]),
            ValueType::Mat3Sym => {
                let mut m = [0.0; 6];
                m.copy_from_slice(c);
                Value::Mat3Sym(m)
            }
            ValueType::Mat3General => {
                let mut m = [0.0; 9];
                m.copy_from_slice(c);
                Value::Mat3General(m)
            }
            ValueType::Tens4Sym => {
                let mut t = [0.0; 21];
                t.copy_from_slice(c);
                Value::Tens4Sym(t)
            }
        })
    }

    pub fn components(&self) -> &[f32] {
        match self {
            Value::Float(v) => std::slice::from_ref(v),
            Value::Vec3(v) => v,
            Value::Mat3Sym(m) => m,
            Value::Mat3Diagonal(m) => m,
            Value::Tens4Sym(t) => t,
            Value::Mat3General(m) => m,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// A value of the given type with every component set to zero.
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Float => Value::Float(0.0),
            ValueType::Vec3 => Value::Vec3([0.0; 3]),
            ValueType::Mat3Sym => Value::Mat3Sym([0.0; 6]),
            ValueType::Mat3Diagonal => Value::Mat3Diagonal([0.0; 3]),
            ValueType::Tens4Sym => Value::Tens4Sym([0.0; 21]),
            ValueType::Mat3General => Value::Mat3General([0.0; 9]),
        }
    }
}

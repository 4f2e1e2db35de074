use crate::value::{PrimitiveValue, Value};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Underlying scalar of a primitive wrapper or a plain scalar annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
    /// Any JSON value, no validation
    Any,
}

impl ScalarKind {
    /// JSON-Schema `type` keyword for this scalar (`None` for [`ScalarKind::Any`])
    #[must_use]
    pub fn json_type(self) -> Option<&'static str> {
        match self {
            ScalarKind::String => Some("string"),
            ScalarKind::Integer => Some("integer"),
            ScalarKind::Float => Some("number"),
            ScalarKind::Boolean => Some("boolean"),
            ScalarKind::Any => None,
        }
    }

    /// Check a value against this scalar, widening integers to floats.
    ///
    /// Returns the accepted value or a message describing the mismatch.
    pub fn accept(self, value: Value) -> Result<Value, String> {
        match (self, value) {
            (ScalarKind::Any, v) => Ok(v),
            (ScalarKind::String, v @ Value::Str(_)) => Ok(v),
            (ScalarKind::Integer, v @ Value::Int(_)) => Ok(v),
            (ScalarKind::Float, v @ Value::Float(_)) => Ok(v),
            (ScalarKind::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (ScalarKind::Boolean, v @ Value::Bool(_)) => Ok(v),
            (kind, other) => Err(format!(
                "input should be a valid {kind}, got {}",
                other.kind_name()
            )),
        }
    }

    /// Parse a raw string (path or query segment) into a scalar value
    pub fn parse_str(self, raw: &str) -> Result<Value, String> {
        match self {
            ScalarKind::String | ScalarKind::Any => Ok(Value::Str(raw.to_string())),
            ScalarKind::Integer => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| "input should be a valid integer, unable to parse string as an integer".to_string()),
            ScalarKind::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| "input should be a valid number, unable to parse string as a number".to_string()),
            ScalarKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err("input should be a valid boolean, unable to interpret input".to_string()),
            },
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Any => "any",
        };
        write!(f, "{s}")
    }
}

/// Bounds a primitive wrapper enforces on its scalar.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
}

impl Constraints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
    }
}

impl PartialEq for Constraints {
    fn eq(&self, other: &Self) -> bool {
        self.minimum == other.minimum
            && self.maximum == other.maximum
            && self.min_length == other.min_length
            && self.max_length == other.max_length
            && self.pattern.as_ref().map(Regex::as_str) == other.pattern.as_ref().map(Regex::as_str)
    }
}

/// A strict primitive wrapper: a scalar carrying its own validation rules.
///
/// ```rust
/// use routebridge::types::{PrimitiveType, ScalarKind};
/// use routebridge::value::Value;
///
/// let user_id = PrimitiveType::new("UserId", ScalarKind::Integer).minimum(1.0).build();
/// assert!(user_id.validate(Value::Int(7)).is_ok());
/// assert!(user_id.validate(Value::Int(0)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PrimitiveType {
    pub name: String,
    pub base: ScalarKind,
    pub constraints: Constraints,
    pub description: Option<String>,
}

impl PrimitiveType {
    /// Start building a wrapper over `base`
    pub fn new(name: impl Into<String>, base: ScalarKind) -> PrimitiveTypeBuilder {
        PrimitiveTypeBuilder {
            inner: PrimitiveType {
                name: name.into(),
                base,
                constraints: Constraints::default(),
                description: None,
            },
        }
    }

    /// Same name, base scalar and bounds
    #[must_use]
    pub fn same_rules(self: &Arc<Self>, other: &Arc<Self>) -> bool {
        Arc::ptr_eq(self, other)
            || (self.name == other.name && self.base == other.base && self.constraints == other.constraints)
    }

    /// Coerce a raw value into this wrapper, enforcing base type and bounds.
    ///
    /// A value already wrapped by a type with the same rules is accepted as is;
    /// any other wrapped value is unwrapped and validated again.
    pub fn validate(self: &Arc<Self>, raw: Value) -> Result<Value, String> {
        let raw = match raw {
            Value::Primitive(p) if p.ty.same_rules(self) => return Ok(Value::Primitive(p)),
            Value::Primitive(p) => *p.value,
            other => other,
        };
        let scalar = self.base.accept(raw)?;
        self.check_bounds(&scalar)?;
        Ok(Value::Primitive(PrimitiveValue {
            ty: Arc::clone(self),
            value: Box::new(scalar),
        }))
    }

    fn check_bounds(&self, scalar: &Value) -> Result<(), String> {
        let c = &self.constraints;
        let number = match scalar {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        };
        if let Some(n) = number {
            if let Some(min) = c.minimum {
                if n < min {
                    return Err(format!("input should be greater than or equal to {min}"));
                }
            }
            if let Some(max) = c.maximum {
                if n > max {
                    return Err(format!("input should be less than or equal to {max}"));
                }
            }
        }
        if let Value::Str(s) = scalar {
            let len = s.chars().count();
            if let Some(min) = c.min_length {
                if len < min {
                    return Err(format!("string should have at least {min} characters"));
                }
            }
            if let Some(max) = c.max_length {
                if len > max {
                    return Err(format!("string should have at most {max} characters"));
                }
            }
            if let Some(re) = &c.pattern {
                if !re.is_match(s) {
                    return Err(format!("string should match pattern '{}'", re.as_str()));
                }
            }
        }
        Ok(())
    }
}

/// Builder returned by [`PrimitiveType::new`].
#[derive(Debug, Clone)]
pub struct PrimitiveTypeBuilder {
    inner: PrimitiveType,
}

impl PrimitiveTypeBuilder {
    #[must_use]
    pub fn minimum(mut self, v: f64) -> Self {
        self.inner.constraints.minimum = Some(v);
        self
    }

    #[must_use]
    pub fn maximum(mut self, v: f64) -> Self {
        self.inner.constraints.maximum = Some(v);
        self
    }

    #[must_use]
    pub fn min_length(mut self, v: usize) -> Self {
        self.inner.constraints.min_length = Some(v);
        self
    }

    #[must_use]
    pub fn max_length(mut self, v: usize) -> Self {
        self.inner.constraints.max_length = Some(v);
        self
    }

    /// Anchor-free regex the string must match
    #[must_use]
    pub fn pattern(mut self, re: Regex) -> Self {
        self.inner.constraints.pattern = Some(re);
        self
    }

    #[must_use]
    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.inner.description = Some(d.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<PrimitiveType> {
        Arc::new(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;

    #[test]
    fn test_int_bounds() {
        let age = PrimitiveType::new("Age", ScalarKind::Integer)
            .minimum(0.0)
            .maximum(150.0)
            .build();
        assert!(age.validate(Value::Int(42)).is_ok());
        let err = age.validate(Value::Int(200)).unwrap_err();
        assert!(err.contains("less than or equal to 150"), "{err}");
        let err = age.validate(Value::Str("42".into())).unwrap_err();
        assert!(err.contains("valid integer"), "{err}");
    }

    #[test]
    fn test_string_length_and_pattern() {
        let slug = PrimitiveType::new("Slug", ScalarKind::String)
            .max_length(8)
            .pattern(Regex::new("^[a-z-]+$").unwrap())
            .build();
        assert!(slug.validate(Value::Str("ok-slug".into())).is_ok());
        assert!(slug.validate(Value::Str("much-too-long".into())).is_err());
        assert!(slug.validate(Value::Str("Bad".into())).is_err());
    }

    #[test]
    fn test_float_accepts_int() {
        let score = PrimitiveType::new("Score", ScalarKind::Float).build();
        let Value::Primitive(p) = score.validate(Value::Int(3)).unwrap() else {
            panic!("expected primitive");
        };
        assert_eq!(*p.value, Value::Float(3.0));
    }

    #[test]
    fn test_parse_str() {
        assert_eq!(ScalarKind::Integer.parse_str("12").unwrap(), Value::Int(12));
        assert_eq!(ScalarKind::Boolean.parse_str("TRUE").unwrap(), Value::Bool(true));
        assert!(ScalarKind::Float.parse_str("abc").is_err());
    }

    #[test]
    fn test_same_name_different_bounds_revalidates() {
        let loose = PrimitiveType::new("Quantity", ScalarKind::Integer).build();
        let tight = PrimitiveType::new("Quantity", ScalarKind::Integer).maximum(10.0).build();
        let wrapped = loose.validate(Value::Int(50)).unwrap();

        assert!(!loose.same_rules(&tight));
        let err = tight.validate(wrapped.clone()).unwrap_err();
        assert!(err.contains("less than or equal to 10"), "{err}");

        let twin = PrimitiveType::new("Quantity", ScalarKind::Integer).build();
        assert!(loose.same_rules(&twin));
        assert_eq!(twin.validate(wrapped.clone()).unwrap(), wrapped);
        assert_ne!(TypeRef::primitive(&loose), TypeRef::primitive(&tight));
        assert_eq!(TypeRef::primitive(&loose), TypeRef::primitive(&twin));
    }
}

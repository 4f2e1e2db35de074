use super::types::{ParameterDescriptor, ParameterKind, SignatureDescriptor};
use crate::bridge::{Direction, SchemaBridge};
use crate::error::{ClassConversionTypeError, ParameterConversionError, ValidationError};
use crate::types::{ModelKind, TypeRef};
use crate::value::{coerce, Instance, Value};
use std::sync::Arc;
use tracing::debug;

/// Fills a [`SignatureDescriptor`]'s conversion maps and converts values at call time.
#[derive(Debug, Clone)]
pub struct SignatureConverter {
    bridge: Arc<SchemaBridge>,
}

impl Default for SignatureConverter {
    fn default() -> Self {
        Self::new(SchemaBridge::global())
    }
}

impl SignatureConverter {
    #[must_use]
    pub fn new(bridge: Arc<SchemaBridge>) -> Self {
        Self { bridge }
    }

    #[must_use]
    pub fn bridge(&self) -> &Arc<SchemaBridge> {
        &self.bridge
    }

    /// Populate conversion maps and host-facing types.
    ///
    /// Domain-object parameters get their generated host class (nullability
    /// kept), containers of them the element-wise rewritten container; a
    /// converted return gets its host-facing annotation.
    pub fn enrich(&self, mut sig: SignatureDescriptor) -> Result<SignatureDescriptor, ClassConversionTypeError> {
        for param in &mut sig.parameters {
            let (inner, optional) = param.param_type.strip_optional();
            match (param.kind, inner) {
                (ParameterKind::Primitive { base }, TypeRef::Primitive(p)) => {
                    sig.primitive_conversions
                        .insert(param.name.clone(), (Arc::clone(p), base));
                }
                (ParameterKind::TypeSafe, TypeRef::Model(domain)) => {
                    let host = self.bridge.to_host_class(domain)?;
                    let host_ty = TypeRef::model(&host);
                    param.converted_type = Some(if optional { TypeRef::optional(host_ty) } else { host_ty });
                    sig.type_safe_conversions
                        .insert(param.name.clone(), (Arc::clone(domain), host));
                }
                (ParameterKind::TypeSafe, _) => {
                    param.converted_type = Some(self.host_annotation(&param.param_type)?);
                }
                _ => {}
            }
        }

        if sig.return_needs_conversion {
            if let Some(ret) = &sig.return_type {
                sig.return_converted_type = Some(self.host_annotation(ret)?);
            }
        }

        debug!(
            function = %sig.function_name,
            primitive = sig.primitive_conversions.len(),
            type_safe = sig.type_safe_conversions.len(),
            "Enriched handler signature"
        );
        Ok(sig)
    }

    /// Type the host sees in place of `ty`: primitive wrappers become their base
    /// scalar, domain classes their generated host class, recursively.
    pub fn host_annotation(&self, ty: &TypeRef) -> Result<TypeRef, ClassConversionTypeError> {
        Ok(match ty {
            TypeRef::Primitive(p) => TypeRef::Scalar(p.base),
            TypeRef::Model(c) if c.kind == ModelKind::Domain => TypeRef::model(&self.bridge.to_host_class(c)?),
            TypeRef::List(t) => TypeRef::list(self.host_annotation(t)?),
            TypeRef::Set(t) => TypeRef::set(self.host_annotation(t)?),
            TypeRef::Map(t) => TypeRef::map(self.host_annotation(t)?),
            TypeRef::Optional(t) => TypeRef::optional(self.host_annotation(t)?),
            TypeRef::Union(ts) => TypeRef::Union(
                ts.iter()
                    .map(|t| self.host_annotation(t))
                    .collect::<Result<_, _>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Convert one incoming argument into the handler's declared type.
    ///
    /// `null` and unknown parameters pass through untouched.
    pub fn convert_parameter_value(
        &self,
        name: &str,
        raw: Value,
        sig: &SignatureDescriptor,
    ) -> Result<Value, ParameterConversionError> {
        let Some(param) = sig.find_parameter(name) else {
            return Ok(raw);
        };
        if raw.is_null() {
            return Ok(raw);
        }

        match param.kind {
            ParameterKind::PassThrough => Ok(raw),
            ParameterKind::Primitive { .. } => {
                let Some(ty) = sig
                    .primitive_conversions
                    .get(name)
                    .map(|(ty, _)| ty)
                    .or_else(|| param.param_type.as_primitive())
                else {
                    return Ok(raw);
                };
                let input = raw.to_json();
                ty.validate(raw).map_err(|message| ParameterConversionError {
                    parameter: name.to_string(),
                    message,
                    input,
                })
            }
            ParameterKind::TypeSafe if sig.type_safe_conversions.contains_key(name) => {
                self.convert_object(param, raw, sig)
            }
            ParameterKind::TypeSafe => self.convert_collection(param, raw),
        }
    }

    /// Containers of domain objects: host instances are converted back, then
    /// the whole value is validated against the declared type
    fn convert_collection(&self, param: &ParameterDescriptor, raw: Value) -> Result<Value, ParameterConversionError> {
        let input = raw.to_json();
        let fail = |message: String| ParameterConversionError {
            parameter: param.name.clone(),
            message,
            input: input.clone(),
        };

        let domain_side = self
            .bridge
            .convert_value(raw, Direction::HostToDomain)
            .map_err(|e| fail(e.to_string()))?;
        coerce(&param.param_type, domain_side).map_err(|issues| {
            fail(
                ValidationError {
                    model: param.param_type.to_string(),
                    issues,
                }
                .to_string(),
            )
        })
    }

    fn convert_object(
        &self,
        param: &ParameterDescriptor,
        raw: Value,
        sig: &SignatureDescriptor,
    ) -> Result<Value, ParameterConversionError> {
        let Some((domain, host)) = sig.type_safe_conversions.get(&param.name) else {
            return Ok(raw);
        };
        let input = raw.to_json();
        let fail = |message: String| ParameterConversionError {
            parameter: param.name.clone(),
            message,
            input: input.clone(),
        };

        match raw {
            Value::Object(inst) if inst.class().id() == host.id() => self
                .bridge
                .to_domain_instance(Value::Object(inst))
                .map_err(|e| fail(e.to_string())),
            Value::Map(fields) => Instance::new(domain, fields)
                .map(Value::Object)
                .map_err(|e| fail(e.to_string())),
            other => Ok(other),
        }
    }

    /// Project a converted return value into plain data.
    ///
    /// Unconverted returns come back as the same value.
    #[must_use]
    pub fn convert_return_value(&self, result: Value, sig: &SignatureDescriptor) -> Value {
        if !sig.return_needs_conversion {
            return result;
        }
        result.into_plain()
    }

    #[must_use]
    pub fn find_parameter<'s>(&self, sig: &'s SignatureDescriptor, name: &str) -> Option<&'s ParameterDescriptor> {
        sig.find_parameter(name)
    }
}

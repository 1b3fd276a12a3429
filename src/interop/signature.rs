//! Method descriptors - parsing `(params)ret` strings and building them
//! from reflective class names

use super::types::{JValue, TypeTag};
use crate::error::{InteropError, Result};
use std::fmt;

/// Parsed method descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub params: Vec<TypeTag>,
    pub ret: TypeTag,
}

impl MethodSignature {
    /// Parse a descriptor such as `(ILjava/lang/String;[J)Z`
    pub fn parse(descriptor: &str) -> Result<Self> {
        let invalid = || InteropError::InvalidSignature {
            signature: descriptor.to_string(),
        };

        let mut rest = descriptor.strip_prefix('(').ok_or_else(invalid)?;

        // Class names may contain ')', so parameters are consumed one by one
        let mut params = Vec::new();
        let ret = loop {
            if let Some(ret) = rest.strip_prefix(')') {
                break ret;
            }
            let (tag, tail) = field_type(rest).ok_or_else(invalid)?;
            params.push(tag);
            rest = tail;
        };

        let ret = match ret {
            "V" => TypeTag::Void,
            _ => match field_type(ret) {
                Some((tag, "")) => tag,
                _ => return Err(invalid()),
            },
        };

        Ok(Self { params, ret })
    }

    /// Check a typed argument list against the parameter list
    pub fn check_args(&self, args: &[JValue]) -> Result<()> {
        let matches = self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(&param, arg)| accepts(param, arg));

        if matches {
            Ok(())
        } else {
            Err(InteropError::ArgumentMismatch {
                expected: tag_list(self.params.iter().copied()),
                found: tag_list(args.iter().map(JValue::tag)),
            })
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})->{:?}", tag_list(self.params.iter().copied()), self.ret)
    }
}

/// Build a full method descriptor from reflective names,
/// e.g. `(["int", "java.lang.String"], "void")` -> `(ILjava/lang/String;)V`
pub fn method_descriptor(params: &[&str], ret: &str) -> Result<String> {
    let mut out = String::from("(");
    for param in params {
        if TypeTag::from_class_name(param) == TypeTag::Void {
            return Err(InteropError::InvalidName {
                name: param.to_string(),
            });
        }
        out.push_str(&field_descriptor(param)?);
    }
    out.push(')');
    out.push_str(&field_descriptor(ret)?);
    Ok(out)
}

/// Descriptor for a single reflective type name (`int` -> `I`,
/// `java.lang.String` -> `Ljava/lang/String;`, `[I` -> `[I`)
pub fn field_descriptor(class_name: &str) -> Result<String> {
    let invalid = || InteropError::InvalidName {
        name: class_name.to_string(),
    };

    match TypeTag::from_class_name(class_name) {
        TypeTag::Invalid => Err(invalid()),
        TypeTag::Object => Ok(format!(
            "{}{};",
            TypeTag::Object.signature(),
            class_name.replace('.', "/")
        )),
        TypeTag::Array => {
            let descriptor = class_name.replace('.', "/");
            let complete = matches!(field_type(&descriptor), Some((TypeTag::Array, "")));
            if complete {
                Ok(descriptor)
            } else {
                Err(invalid())
            }
        }
        tag => Ok(tag.signature().to_string()),
    }
}

/// Whether an argument can be passed where `param` is declared
fn accepts(param: TypeTag, arg: &JValue) -> bool {
    if param.is_reference() {
        matches!(arg, JValue::Object(_))
    } else {
        arg.tag() == param
    }
}

/// Consume one field type from the front of `input`
fn field_type(input: &str) -> Option<(TypeTag, &str)> {
    let code = input.chars().next()?;
    let rest = &input[code.len_utf8()..];

    match TypeTag::from_primitive_code(code) {
        TypeTag::Object => {
            let end = rest.find(';')?;
            if end == 0 {
                return None;
            }
            Some((TypeTag::Object, &rest[end + 1..]))
        }
        TypeTag::Array => {
            let (_, tail) = field_type(rest)?;
            Some((TypeTag::Array, tail))
        }
        TypeTag::Invalid | TypeTag::Void => None,
        tag => Some((tag, rest)),
    }
}

fn tag_list(tags: impl Iterator<Item = TypeTag>) -> String {
    tags.map(|tag| format!("{:?}", tag))
        .collect::<Vec<_>>()
        .join(", ")
}

//! Type definitions for values crossing the JNI boundary
//!
//! `TypeTag` is the marshalling category, `ReturnKind` the dispatch
//! category, and `JValue` the tagged value both sides agree on.

use jni_sys::{jboolean, jobject, jvalue, JNI_FALSE, JNI_TRUE};
use serde::{Deserialize, Serialize};

/// Marshalling category of a value.
///
/// Ordinals are shared with native code on other platforms and must never
/// be renumbered. New tags go at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TypeTag {
    Invalid = 0,
    Void = 1,
    Object = 2,
    Boolean = 3,
    Byte = 4,
    Char = 5,
    Short = 6,
    Int = 7,
    Long = 8,
    Float = 9,
    Double = 10,
    Array = 11,
}

impl TypeTag {
    /// Every tag in ordinal order
    pub const ALL: [TypeTag; 12] = [
        Self::Invalid,
        Self::Void,
        Self::Object,
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Array,
    ];

    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Classify a name in the runtime's reflective format (`Class.getName()`).
    ///
    /// Primitive keywords map to their tag, `[`-prefixed names are arrays,
    /// any other binary class name is an object. Empty names, empty
    /// segments and names containing `;` or `[` are `Invalid`.
    pub fn from_class_name(name: &str) -> Self {
        match name {
            "void" => Self::Void,
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            _ if name.starts_with('[') => Self::Array,
            _ if is_binary_class_name(name) => Self::Object,
            _ => Self::Invalid,
        }
    }

    /// Classify a single signature code (`I`, `Z`, `L`, `[`, ...)
    pub const fn from_primitive_code(code: char) -> Self {
        match code {
            'V' => Self::Void,
            'L' => Self::Object,
            '[' => Self::Array,
            'Z' => Self::Boolean,
            'B' => Self::Byte,
            'C' => Self::Char,
            'S' => Self::Short,
            'I' => Self::Int,
            'J' => Self::Long,
            'F' => Self::Float,
            'D' => Self::Double,
            _ => Self::Invalid,
        }
    }

    /// Signature encoding used when building method descriptors.
    ///
    /// Object and array yield only their leading character; the caller
    /// appends the class name.
    pub const fn signature(self) -> &'static str {
        match self {
            Self::Invalid => "",
            Self::Void => "V",
            Self::Object => "L",
            Self::Boolean => "Z",
            Self::Byte => "B",
            Self::Char => "C",
            Self::Short => "S",
            Self::Int => "I",
            Self::Long => "J",
            Self::Float => "F",
            Self::Double => "D",
            Self::Array => "[",
        }
    }

    /// Dispatch category used to read or return a value of this tag
    pub const fn return_kind(self) -> Option<ReturnKind> {
        match self {
            Self::Invalid => None,
            Self::Void => Some(ReturnKind::Void),
            Self::Object | Self::Array => Some(ReturnKind::Object),
            Self::Boolean => Some(ReturnKind::Boolean),
            Self::Byte => Some(ReturnKind::Byte),
            Self::Char => Some(ReturnKind::Char),
            Self::Short => Some(ReturnKind::Short),
            Self::Int => Some(ReturnKind::Int),
            Self::Long => Some(ReturnKind::Long),
            Self::Float => Some(ReturnKind::Float),
            Self::Double => Some(ReturnKind::Double),
        }
    }

    #[inline]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        !matches!(self, Self::Invalid | Self::Void | Self::Object | Self::Array)
    }
}

fn is_binary_class_name(name: &str) -> bool {
    // Hidden classes mix both separators (`Main$$Lambda$14/0x0000000800c03000`)
    !name.is_empty()
        && name
            .split(['.', '/'])
            .all(|segment| !segment.is_empty() && !segment.contains([';', '[']))
}

/// The ten return categories of the dispatch table.
///
/// Each variant is bound to one `Call<Type>MethodA`, one
/// `CallStatic<Type>MethodA` and (except `Void`) one `Get<Type>Field`
/// entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    Void,
    Object,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl ReturnKind {
    pub const fn tag(self) -> TypeTag {
        match self {
            Self::Void => TypeTag::Void,
            Self::Object => TypeTag::Object,
            Self::Boolean => TypeTag::Boolean,
            Self::Byte => TypeTag::Byte,
            Self::Char => TypeTag::Char,
            Self::Short => TypeTag::Short,
            Self::Int => TypeTag::Int,
            Self::Long => TypeTag::Long,
            Self::Float => TypeTag::Float,
            Self::Double => TypeTag::Double,
        }
    }
}

/// Tagged value (the safe counterpart of the raw `jvalue` union)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JValue {
    Void,
    Object(jobject),
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl JValue {
    /// Null object reference
    #[inline]
    pub const fn null() -> Self {
        Self::Object(core::ptr::null_mut())
    }

    pub const fn tag(&self) -> TypeTag {
        match self {
            Self::Void => TypeTag::Void,
            Self::Object(_) => TypeTag::Object,
            Self::Boolean(_) => TypeTag::Boolean,
            Self::Byte(_) => TypeTag::Byte,
            Self::Char(_) => TypeTag::Char,
            Self::Short(_) => TypeTag::Short,
            Self::Int(_) => TypeTag::Int,
            Self::Long(_) => TypeTag::Long,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
        }
    }

    /// Default value substituted for `tag` on failure.
    ///
    /// Arrays are objects, so they default to a null reference. `Invalid`
    /// has no value and yields `Void`.
    pub const fn zero(tag: TypeTag) -> Self {
        match tag.return_kind() {
            Some(kind) => Self::zero_of(kind),
            None => Self::Void,
        }
    }

    pub const fn zero_of(kind: ReturnKind) -> Self {
        match kind {
            ReturnKind::Void => Self::Void,
            ReturnKind::Object => Self::null(),
            ReturnKind::Boolean => Self::Boolean(false),
            ReturnKind::Byte => Self::Byte(0),
            ReturnKind::Char => Self::Char(0),
            ReturnKind::Short => Self::Short(0),
            ReturnKind::Int => Self::Int(0),
            ReturnKind::Long => Self::Long(0),
            ReturnKind::Float => Self::Float(0.0),
            ReturnKind::Double => Self::Double(0.0),
        }
    }

    /// Lower to the raw union passed to `Call*MethodA`
    pub fn to_raw(&self) -> jvalue {
        match *self {
            Self::Void => jvalue { j: 0 },
            Self::Object(l) => jvalue { l },
            Self::Boolean(z) => jvalue { z: to_jboolean(z) },
            Self::Byte(b) => jvalue { b },
            Self::Char(c) => jvalue { c },
            Self::Short(s) => jvalue { s },
            Self::Int(i) => jvalue { i },
            Self::Long(j) => jvalue { j },
            Self::Float(f) => jvalue { f },
            Self::Double(d) => jvalue { d },
        }
    }

    /// Read the member of `raw` selected by `kind`.
    ///
    /// # Safety
    /// `raw` must have been produced by an entry point of the same kind.
    pub unsafe fn from_raw(kind: ReturnKind, raw: jvalue) -> Self {
        match kind {
            ReturnKind::Void => Self::Void,
            ReturnKind::Object => Self::Object(raw.l),
            ReturnKind::Boolean => Self::Boolean(raw.z != JNI_FALSE),
            ReturnKind::Byte => Self::Byte(raw.b),
            ReturnKind::Char => Self::Char(raw.c),
            ReturnKind::Short => Self::Short(raw.s),
            ReturnKind::Int => Self::Int(raw.i),
            ReturnKind::Long => Self::Long(raw.j),
            ReturnKind::Float => Self::Float(raw.f),
            ReturnKind::Double => Self::Double(raw.d),
        }
    }

    pub fn as_object(&self) -> Option<jobject> {
        match *self {
            Self::Object(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Boolean(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Self::Long(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Self::Double(d) => Some(d),
            _ => None,
        }
    }
}

#[inline]
pub(crate) const fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

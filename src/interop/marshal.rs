//! Marshalling - managed strings to native text, fields to tagged values
//!
//! String buffers are pinned by a guard and released exactly once when the
//! guard is dropped or consumed by `release`.

use super::call::{c_names, report_failure, with_object_class};
use super::env::RuntimeEnv;
use super::stats;
use super::types::{JValue, ReturnKind, TypeTag};
use crate::config;
use crate::error::{InteropError, Result};
use crate::logging;
use jni_sys::{jchar, jobject, jstring};
use std::borrow::Cow;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr::NonNull;

/// Modified UTF-8 characters of a managed string (`GetStringUTFChars`)
pub struct Utf8Chars<'env, E: RuntimeEnv + ?Sized> {
    env: &'env E,
    string: jstring,
    chars: NonNull<c_char>,
}

impl<'env, E: RuntimeEnv + ?Sized> Utf8Chars<'env, E> {
    /// Pin the characters of `string`.
    ///
    /// # Safety
    /// `string` must be a valid `java.lang.String` reference for `env` and
    /// must outlive the guard.
    pub unsafe fn new(env: &'env E, string: jstring) -> Result<Self> {
        if string.is_null() {
            return Err(InteropError::NullHandle);
        }

        let chars = NonNull::new(env.get_string_utf_chars(string) as *mut c_char)
            .ok_or(InteropError::StringUnavailable)?;

        stats::record_pin();
        logging::log_string_pin(string as *const (), false);
        Ok(Self { env, string, chars })
    }

    /// NUL-terminated buffer as handed out by the runtime
    pub fn as_cstr(&self) -> &CStr {
        unsafe { CStr::from_ptr(self.chars.as_ptr()) }
    }

    /// Decode the buffer. Modified UTF-8 differs from UTF-8 only for NUL and
    /// supplementary characters, which decode lossily.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        self.as_cstr().to_string_lossy()
    }

    /// Release the buffer now
    pub fn release(self) {
        drop(self);
    }
}

impl<E: RuntimeEnv + ?Sized> Drop for Utf8Chars<'_, E> {
    fn drop(&mut self) {
        unsafe {
            self.env
                .release_string_utf_chars(self.string, self.chars.as_ptr());
        }
        stats::record_release();
        logging::log_string_release(self.string as *const (), false);
    }
}

/// UTF-16 characters of a managed string (`GetStringChars`)
pub struct Utf16Chars<'env, E: RuntimeEnv + ?Sized> {
    env: &'env E,
    string: jstring,
    chars: NonNull<jchar>,
    len: usize,
}

impl<'env, E: RuntimeEnv + ?Sized> Utf16Chars<'env, E> {
    /// Pin the characters of `string`.
    ///
    /// # Safety
    /// See [`Utf8Chars::new`].
    pub unsafe fn new(env: &'env E, string: jstring) -> Result<Self> {
        if string.is_null() {
            return Err(InteropError::NullHandle);
        }

        let len = env.get_string_length(string).max(0) as usize;
        let chars = NonNull::new(env.get_string_chars(string) as *mut jchar)
            .ok_or(InteropError::StringUnavailable)?;

        stats::record_pin();
        logging::log_string_pin(string as *const (), true);
        Ok(Self {
            env,
            string,
            chars,
            len,
        })
    }

    pub fn as_slice(&self) -> &[u16] {
        unsafe { std::slice::from_raw_parts(self.chars.as_ptr(), self.len) }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.as_slice())
    }

    /// Release the buffer now
    pub fn release(self) {
        drop(self);
    }
}

impl<E: RuntimeEnv + ?Sized> Drop for Utf16Chars<'_, E> {
    fn drop(&mut self) {
        unsafe {
            self.env.release_string_chars(self.string, self.chars.as_ptr());
        }
        stats::record_release();
        logging::log_string_release(self.string as *const (), true);
    }
}

/// Copy a managed string into an owned `String`, releasing the pinned
/// characters before returning.
///
/// # Safety
/// See [`Utf8Chars::new`].
pub unsafe fn string_to_owned<E: RuntimeEnv + ?Sized>(env: &E, string: jstring) -> Result<String> {
    let chars = Utf16Chars::new(env, string)?;
    Ok(chars.to_string_lossy())
}

/// Read a field as a tagged value.
///
/// Resolution failures are logged once, the pending exception is
/// described and cleared, and the zero value for `tag` is returned.
///
/// # Safety
/// `obj` must be a valid reference for `env`.
pub unsafe fn get_field<E: RuntimeEnv + ?Sized>(
    env: &E,
    obj: jobject,
    tag: TypeTag,
    name: &str,
    sig: &str,
) -> JValue {
    match read_field(env, obj, tag, name, sig) {
        Ok(value) => value,
        Err(err) => {
            report_failure(env, "get_field", obj, name, sig, &err);
            JValue::zero(tag)
        }
    }
}

/// Like [`get_field`], returning failures.
///
/// # Safety
/// `obj` must be a valid reference for `env`.
pub unsafe fn try_get_field<E: RuntimeEnv + ?Sized>(
    env: &E,
    obj: jobject,
    tag: TypeTag,
    name: &str,
    sig: &str,
) -> Result<JValue> {
    read_field(env, obj, tag, name, sig).map_err(|err| {
        report_failure(env, "try_get_field", obj, name, sig, &err);
        err
    })
}

unsafe fn read_field<E: RuntimeEnv + ?Sized>(
    env: &E,
    obj: jobject,
    tag: TypeTag,
    name: &str,
    sig: &str,
) -> Result<JValue> {
    let kind = match tag.return_kind() {
        Some(ReturnKind::Void) | None => return Err(InteropError::InvalidFieldType(tag)),
        Some(kind) => kind,
    };

    if config::current().check_arguments {
        let declared = sig
            .chars()
            .next()
            .map_or(TypeTag::Invalid, TypeTag::from_primitive_code);
        if declared.return_kind() != Some(kind) {
            return Err(InteropError::ReturnMismatch {
                expected: tag,
                found: declared,
            });
        }
    }

    let (c_name, c_sig) = c_names(name, sig)?;
    with_object_class(env, obj, |cls| {
        let fid = env.get_field_id(cls, &c_name, &c_sig);
        if fid.is_null() {
            return Err(InteropError::FieldNotFound {
                name: name.to_string(),
                signature: sig.to_string(),
            });
        }
        Ok(JValue::from_raw(kind, env.get_field(obj, fid, kind)))
    })
}

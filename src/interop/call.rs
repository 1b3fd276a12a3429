//! Typed dispatch - invoke managed methods with the return type chosen by
//! a generic parameter
//!
//! `JniReturn` is implemented for exactly the ten Rust types with a JNI
//! return category. Any other return type fails to compile.

use super::env::RuntimeEnv;
use super::signature::MethodSignature;
use super::stats;
use super::types::{JValue, ReturnKind};
use crate::config;
use crate::error::{InteropError, Result};
use crate::logging;
use jni_sys::{jclass, jmethodID, jobject, jvalue, JNI_FALSE};
use smallvec::SmallVec;
use std::ffi::CString;
use std::ptr;

/// Lowered argument buffer; most calls fit on the stack
pub(crate) type RawArgs = SmallVec<[jvalue; 8]>;

mod sealed {
    pub trait Sealed {}
}

/// Return type of a dispatched call
pub trait JniReturn: Copy + sealed::Sealed {
    /// Entry point family this type is returned by
    const KIND: ReturnKind;
    /// Value substituted when resolution fails
    const ZERO: Self;

    /// # Safety
    /// `raw` must come from an entry point of `Self::KIND`.
    unsafe fn from_raw(raw: jvalue) -> Self;
}

macro_rules! jni_return {
    ($($ty:ty => $kind:ident, $zero:expr, |$raw:ident| $convert:expr;)*) => {$(
        impl sealed::Sealed for $ty {}

        impl JniReturn for $ty {
            const KIND: ReturnKind = ReturnKind::$kind;
            const ZERO: Self = $zero;

            #[inline]
            unsafe fn from_raw($raw: jvalue) -> Self {
                $convert
            }
        }
    )*};
}

jni_return! {
    () => Void, (), |_raw| ();
    jobject => Object, ptr::null_mut(), |raw| raw.l;
    bool => Boolean, false, |raw| raw.z != JNI_FALSE;
    i8 => Byte, 0, |raw| raw.b;
    u16 => Char, 0, |raw| raw.c;
    i16 => Short, 0, |raw| raw.s;
    i32 => Int, 0, |raw| raw.i;
    i64 => Long, 0, |raw| raw.j;
    f32 => Float, 0.0, |raw| raw.f;
    f64 => Double, 0.0, |raw| raw.d;
}

/// Apply a pre-built argument array to a resolved instance method
///
/// # Safety
/// `obj` and `mid` must be valid for `env`, and `args` must match the
/// method's parameter list.
#[inline]
pub unsafe fn call_method_id_a<T: JniReturn, E: RuntimeEnv + ?Sized>(
    env: &E,
    obj: jobject,
    mid: jmethodID,
    args: &[jvalue],
) -> T {
    stats::record_call();
    T::from_raw(env.call_method_a(obj, mid, T::KIND, args))
}

/// Apply a pre-built argument array to a resolved static method
///
/// # Safety
/// See [`call_method_id_a`].
#[inline]
pub unsafe fn call_static_method_id_a<T: JniReturn, E: RuntimeEnv + ?Sized>(
    env: &E,
    cls: jclass,
    mid: jmethodID,
    args: &[jvalue],
) -> T {
    stats::record_call();
    T::from_raw(env.call_static_method_a(cls, mid, T::KIND, args))
}

/// Invoke an instance method by name and descriptor.
///
/// Resolution failures are logged once, the pending exception is
/// described and cleared, and `T::ZERO` is returned. An exception thrown
/// by the callee is left pending for the caller to inspect.
///
/// # Safety
/// `obj` must be a valid reference for `env`. With argument checking
/// disabled, `args` must match `sig`.
pub unsafe fn call_method<T: JniReturn, E: RuntimeEnv + ?Sized>(
    env: &E,
    obj: jobject,
    name: &str,
    sig: &str,
    args: &[JValue],
) -> T {
    match resolve_instance::<T, E>(env, obj, name, sig, args) {
        Ok((mid, raw)) => {
            logging::log_call("call_method", name, T::KIND, raw.len());
            call_method_id_a(env, obj, mid, &raw)
        }
        Err(err) => {
            report_failure(env, "call_method", obj, name, sig, &err);
            T::ZERO
        }
    }
}

/// Invoke a static method by name and descriptor. Same failure policy as
/// [`call_method`].
///
/// # Safety
/// `cls` must be a valid class reference for `env`.
pub unsafe fn call_static_method<T: JniReturn, E: RuntimeEnv + ?Sized>(
    env: &E,
    cls: jclass,
    name: &str,
    sig: &str,
    args: &[JValue],
) -> T {
    match resolve_static::<T, E>(env, cls, name, sig, args) {
        Ok((mid, raw)) => {
            logging::log_call("call_static_method", name, T::KIND, raw.len());
            call_static_method_id_a(env, cls, mid, &raw)
        }
        Err(err) => {
            report_failure(env, "call_static_method", cls, name, sig, &err);
            T::ZERO
        }
    }
}

/// Like [`call_method`], but failures are returned instead of replaced by
/// a zero value. An exception thrown by the callee is described, cleared
/// and reported as [`InteropError::JavaException`].
///
/// # Safety
/// See [`call_method`].
pub unsafe fn try_call_method<T: JniReturn, E: RuntimeEnv + ?Sized>(
    env: &E,
    obj: jobject,
    name: &str,
    sig: &str,
    args: &[JValue],
) -> Result<T> {
    let (mid, raw) = resolve_instance::<T, E>(env, obj, name, sig, args).map_err(|err| {
        report_failure(env, "try_call_method", obj, name, sig, &err);
        err
    })?;

    logging::log_call("try_call_method", name, T::KIND, raw.len());
    let result = call_method_id_a(env, obj, mid, &raw);
    check_thrown(env).map(|()| result)
}

/// Like [`call_static_method`], returning failures.
///
/// # Safety
/// See [`call_static_method`].
pub unsafe fn try_call_static_method<T: JniReturn, E: RuntimeEnv + ?Sized>(
    env: &E,
    cls: jclass,
    name: &str,
    sig: &str,
    args: &[JValue],
) -> Result<T> {
    let (mid, raw) = resolve_static::<T, E>(env, cls, name, sig, args).map_err(|err| {
        report_failure(env, "try_call_static_method", cls, name, sig, &err);
        err
    })?;

    logging::log_call("try_call_static_method", name, T::KIND, raw.len());
    let result = call_static_method_id_a(env, cls, mid, &raw);
    check_thrown(env).map(|()| result)
}

/// Resolve an instance method id from an object's class.
///
/// Returns `None` after logging and clearing the exception when the
/// method does not exist.
///
/// # Safety
/// `obj` must be a valid reference for `env`.
pub unsafe fn get_method_id<E: RuntimeEnv + ?Sized>(
    env: &E,
    obj: jobject,
    name: &str,
    sig: &str,
) -> Option<jmethodID> {
    let resolved = c_names(name, sig).and_then(|(c_name, c_sig)| {
        with_object_class(env, obj, |cls| {
            let mid = env.get_method_id(cls, &c_name, &c_sig);
            non_null_method(mid, name, sig)
        })
    });

    match resolved {
        Ok(mid) => Some(mid),
        Err(err) => {
            report_failure(env, "get_method_id", obj, name, sig, &err);
            None
        }
    }
}

unsafe fn resolve_instance<T: JniReturn, E: RuntimeEnv + ?Sized>(
    env: &E,
    obj: jobject,
    name: &str,
    sig: &str,
    args: &[JValue],
) -> Result<(jmethodID, RawArgs)> {
    if obj.is_null() {
        return Err(InteropError::NullHandle);
    }
    let (c_name, c_sig) = c_names(name, sig)?;
    check_call::<T>(sig, args)?;

    let mid = with_object_class(env, obj, |cls| {
        non_null_method(env.get_method_id(cls, &c_name, &c_sig), name, sig)
    })?;

    Ok((mid, lower(args)))
}

unsafe fn resolve_static<T: JniReturn, E: RuntimeEnv + ?Sized>(
    env: &E,
    cls: jclass,
    name: &str,
    sig: &str,
    args: &[JValue],
) -> Result<(jmethodID, RawArgs)> {
    if cls.is_null() {
        return Err(InteropError::NullHandle);
    }
    let (c_name, c_sig) = c_names(name, sig)?;
    check_call::<T>(sig, args)?;

    let mid = non_null_method(env.get_static_method_id(cls, &c_name, &c_sig), name, sig)?;
    Ok((mid, lower(args)))
}

/// Run `f` with the object's class, deleting the class local reference
/// before returning.
pub(crate) unsafe fn with_object_class<E, R, F>(env: &E, obj: jobject, f: F) -> Result<R>
where
    E: RuntimeEnv + ?Sized,
    F: FnOnce(jclass) -> Result<R>,
{
    if obj.is_null() {
        return Err(InteropError::NullHandle);
    }

    let cls = env.get_object_class(obj);
    if cls.is_null() {
        return Err(InteropError::ClassNotFound);
    }

    let result = f(cls);
    env.delete_local_ref(cls);
    result
}

fn check_call<T: JniReturn>(sig: &str, args: &[JValue]) -> Result<()> {
    if !config::current().check_arguments {
        return Ok(());
    }

    let parsed = MethodSignature::parse(sig)?;
    if parsed.ret.return_kind() != Some(T::KIND) {
        return Err(InteropError::ReturnMismatch {
            expected: T::KIND.tag(),
            found: parsed.ret,
        });
    }
    parsed.check_args(args)
}

pub(crate) fn c_names(name: &str, sig: &str) -> Result<(CString, CString)> {
    let c_name = CString::new(name).map_err(|_| InteropError::InvalidName {
        name: name.to_string(),
    })?;
    let c_sig = CString::new(sig).map_err(|_| InteropError::InvalidSignature {
        signature: sig.to_string(),
    })?;
    Ok((c_name, c_sig))
}

fn non_null_method(mid: jmethodID, name: &str, sig: &str) -> Result<jmethodID> {
    if mid.is_null() {
        Err(InteropError::MethodNotFound {
            name: name.to_string(),
            signature: sig.to_string(),
        })
    } else {
        Ok(mid)
    }
}

#[inline]
fn lower(args: &[JValue]) -> RawArgs {
    args.iter().map(JValue::to_raw).collect()
}

/// Describe and clear an exception the callee left pending
fn check_thrown<E: RuntimeEnv + ?Sized>(env: &E) -> Result<()> {
    if !env.exception_check() {
        return Ok(());
    }
    if config::current().describe_exceptions {
        env.exception_describe();
    }
    env.exception_clear();
    Err(InteropError::JavaException)
}

/// Failure policy shared by every best-effort operation: one diagnostic,
/// then drain the pending exception.
pub(crate) fn report_failure<E: RuntimeEnv + ?Sized>(
    env: &E,
    function: &str,
    target: jobject,
    name: &str,
    sig: &str,
    err: &InteropError,
) {
    stats::record_failure();
    logging::log_resolution_failure(function, target as *const (), name, sig, &err.to_string());

    if env.exception_check() {
        if config::current().describe_exceptions {
            env.exception_describe();
        }
        env.exception_clear();
    }
}

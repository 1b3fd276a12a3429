//! ABI binding - the dispatch table over the raw JNI function table
//!
//! Each `ReturnKind` is bound to its fixed entry point here and nowhere
//! else.

use super::env::RuntimeEnv;
use super::types::ReturnKind;
use jni_sys::{jchar, jclass, jfieldID, jmethodID, jobject, jsize, jstring, jvalue, JNIEnv, JNI_FALSE};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr::{self, NonNull};

/// Invoke a function-table entry on a raw `*mut JNIEnv`
macro_rules! jni_call {
    ($env:expr, $name:ident $(, $arg:expr)* $(,)?) => {{
        let env: *mut JNIEnv = $env;
        match (**env).$name {
            Some(f) => f(env $(, $arg)*),
            None => panic!(concat!("JNI function table has no ", stringify!($name))),
        }
    }};
}

/// Environment handle of a thread attached to the VM.
///
/// The pointer is only meaningful on the thread that produced it, so this
/// type is neither `Send` nor `Sync`.
#[derive(Debug)]
pub struct AttachedEnv {
    raw: NonNull<JNIEnv>,
}

impl AttachedEnv {
    /// Wrap a raw environment pointer.
    ///
    /// # Safety
    /// `raw` must be a valid `JNIEnv*` for the calling thread.
    #[inline]
    pub unsafe fn from_raw(raw: *mut JNIEnv) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw })
    }

    #[inline]
    pub fn as_raw(&self) -> *mut JNIEnv {
        self.raw.as_ptr()
    }
}

unsafe impl RuntimeEnv for AttachedEnv {
    unsafe fn get_object_class(&self, obj: jobject) -> jclass {
        jni_call!(self.as_raw(), GetObjectClass, obj)
    }

    unsafe fn get_method_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jmethodID {
        jni_call!(self.as_raw(), GetMethodID, cls, name.as_ptr(), sig.as_ptr())
    }

    unsafe fn get_static_method_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jmethodID {
        jni_call!(self.as_raw(), GetStaticMethodID, cls, name.as_ptr(), sig.as_ptr())
    }

    unsafe fn get_field_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jfieldID {
        jni_call!(self.as_raw(), GetFieldID, cls, name.as_ptr(), sig.as_ptr())
    }

    unsafe fn delete_local_ref(&self, obj: jobject) {
        jni_call!(self.as_raw(), DeleteLocalRef, obj)
    }

    unsafe fn call_method_a(
        &self,
        obj: jobject,
        mid: jmethodID,
        kind: ReturnKind,
        args: &[jvalue],
    ) -> jvalue {
        let env = self.as_raw();
        let args = args.as_ptr();
        match kind {
            ReturnKind::Void => {
                jni_call!(env, CallVoidMethodA, obj, mid, args);
                jvalue { j: 0 }
            }
            ReturnKind::Object => jvalue { l: jni_call!(env, CallObjectMethodA, obj, mid, args) },
            ReturnKind::Boolean => jvalue { z: jni_call!(env, CallBooleanMethodA, obj, mid, args) },
            ReturnKind::Byte => jvalue { b: jni_call!(env, CallByteMethodA, obj, mid, args) },
            ReturnKind::Char => jvalue { c: jni_call!(env, CallCharMethodA, obj, mid, args) },
            ReturnKind::Short => jvalue { s: jni_call!(env, CallShortMethodA, obj, mid, args) },
            ReturnKind::Int => jvalue { i: jni_call!(env, CallIntMethodA, obj, mid, args) },
            ReturnKind::Long => jvalue { j: jni_call!(env, CallLongMethodA, obj, mid, args) },
            ReturnKind::Float => jvalue { f: jni_call!(env, CallFloatMethodA, obj, mid, args) },
            ReturnKind::Double => jvalue { d: jni_call!(env, CallDoubleMethodA, obj, mid, args) },
        }
    }

    unsafe fn call_static_method_a(
        &self,
        cls: jclass,
        mid: jmethodID,
        kind: ReturnKind,
        args: &[jvalue],
    ) -> jvalue {
        let env = self.as_raw();
        let args = args.as_ptr();
        match kind {
            ReturnKind::Void => {
                jni_call!(env, CallStaticVoidMethodA, cls, mid, args);
                jvalue { j: 0 }
            }
            ReturnKind::Object => {
                jvalue { l: jni_call!(env, CallStaticObjectMethodA, cls, mid, args) }
            }
            ReturnKind::Boolean => {
                jvalue { z: jni_call!(env, CallStaticBooleanMethodA, cls, mid, args) }
            }
            ReturnKind::Byte => jvalue { b: jni_call!(env, CallStaticByteMethodA, cls, mid, args) },
            ReturnKind::Char => jvalue { c: jni_call!(env, CallStaticCharMethodA, cls, mid, args) },
            ReturnKind::Short => {
                jvalue { s: jni_call!(env, CallStaticShortMethodA, cls, mid, args) }
            }
            ReturnKind::Int => jvalue { i: jni_call!(env, CallStaticIntMethodA, cls, mid, args) },
            ReturnKind::Long => jvalue { j: jni_call!(env, CallStaticLongMethodA, cls, mid, args) },
            ReturnKind::Float => {
                jvalue { f: jni_call!(env, CallStaticFloatMethodA, cls, mid, args) }
            }
            ReturnKind::Double => {
                jvalue { d: jni_call!(env, CallStaticDoubleMethodA, cls, mid, args) }
            }
        }
    }

    unsafe fn get_field(&self, obj: jobject, fid: jfieldID, kind: ReturnKind) -> jvalue {
        let env = self.as_raw();
        match kind {
            ReturnKind::Void => jvalue { j: 0 },
            ReturnKind::Object => jvalue { l: jni_call!(env, GetObjectField, obj, fid) },
            ReturnKind::Boolean => jvalue { z: jni_call!(env, GetBooleanField, obj, fid) },
            ReturnKind::Byte => jvalue { b: jni_call!(env, GetByteField, obj, fid) },
            ReturnKind::Char => jvalue { c: jni_call!(env, GetCharField, obj, fid) },
            ReturnKind::Short => jvalue { s: jni_call!(env, GetShortField, obj, fid) },
            ReturnKind::Int => jvalue { i: jni_call!(env, GetIntField, obj, fid) },
            ReturnKind::Long => jvalue { j: jni_call!(env, GetLongField, obj, fid) },
            ReturnKind::Float => jvalue { f: jni_call!(env, GetFloatField, obj, fid) },
            ReturnKind::Double => jvalue { d: jni_call!(env, GetDoubleField, obj, fid) },
        }
    }

    unsafe fn get_string_utf_chars(&self, s: jstring) -> *const c_char {
        jni_call!(self.as_raw(), GetStringUTFChars, s, ptr::null_mut())
    }

    unsafe fn release_string_utf_chars(&self, s: jstring, chars: *const c_char) {
        jni_call!(self.as_raw(), ReleaseStringUTFChars, s, chars)
    }

    unsafe fn get_string_chars(&self, s: jstring) -> *const jchar {
        jni_call!(self.as_raw(), GetStringChars, s, ptr::null_mut())
    }

    unsafe fn get_string_length(&self, s: jstring) -> jsize {
        jni_call!(self.as_raw(), GetStringLength, s)
    }

    unsafe fn release_string_chars(&self, s: jstring, chars: *const jchar) {
        jni_call!(self.as_raw(), ReleaseStringChars, s, chars)
    }

    fn exception_check(&self) -> bool {
        unsafe { jni_call!(self.as_raw(), ExceptionCheck) != JNI_FALSE }
    }

    fn exception_describe(&self) {
        unsafe { jni_call!(self.as_raw(), ExceptionDescribe) }
    }

    fn exception_clear(&self) {
        unsafe { jni_call!(self.as_raw(), ExceptionClear) }
    }
}

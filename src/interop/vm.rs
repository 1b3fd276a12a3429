//! Runtime handles - the process-wide VM and per-thread environments
//!
//! The VM is registered once by the embedder. Environments are produced on
//! demand by attaching the calling thread and never cross threads.

use super::abi::AttachedEnv;
use super::marshal::string_to_owned;
use crate::error::{InteropError, Result};
use crate::logging;
use jni_sys::{jstring, JNIEnv, JavaVM, JNI_ERR, JNI_OK};
use once_cell::sync::OnceCell;
use std::ffi::c_void;
use std::ptr::{self, NonNull};

static JAVA_VM: VmSlot = VmSlot::new();

/// Explicit handle to a Java VM. Pass it to whatever needs an environment
/// instead of reaching for the global.
#[derive(Debug)]
pub struct JniContext {
    vm: NonNull<JavaVM>,
}

// A JavaVM pointer is valid on every thread for the life of the VM.
unsafe impl Send for JniContext {}
unsafe impl Sync for JniContext {}

impl JniContext {
    /// # Safety
    /// `vm` must point to a live `JavaVM` that outlives the context.
    pub unsafe fn from_raw(vm: *mut JavaVM) -> Result<Self> {
        NonNull::new(vm)
            .map(|vm| Self { vm })
            .ok_or(InteropError::NullHandle)
    }

    #[inline]
    pub fn as_raw(&self) -> *mut JavaVM {
        self.vm.as_ptr()
    }

    /// Attach the calling thread (a no-op if already attached) and return
    /// its environment
    pub fn attach(&self) -> Result<AttachedEnv> {
        let vm = self.as_raw();
        let mut env: *mut c_void = ptr::null_mut();

        let code = match unsafe { (**vm).AttachCurrentThread } {
            Some(attach) => unsafe { attach(vm, &mut env, ptr::null_mut()) },
            None => JNI_ERR,
        };

        if code != JNI_OK {
            logging::log_attach_failed(code);
            return Err(InteropError::AttachFailed { code });
        }

        unsafe { AttachedEnv::from_raw(env as *mut JNIEnv) }
            .ok_or(InteropError::AttachFailed { code })
    }
}

/// Set-once holder for a [`JniContext`]
pub struct VmSlot {
    cell: OnceCell<JniContext>,
}

impl VmSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Register `vm`. Registering the same pointer again succeeds; a
    /// different pointer is rejected.
    ///
    /// # Safety
    /// See [`JniContext::from_raw`].
    pub unsafe fn set(&self, vm: *mut JavaVM) -> Result<()> {
        let context = JniContext::from_raw(vm)?;

        match self.cell.set(context) {
            Ok(()) => {
                logging::log_vm_set(vm as *const ());
                Ok(())
            }
            Err(_) if self.get()?.as_raw() == vm => Ok(()),
            Err(_) => Err(InteropError::VmAlreadySet),
        }
    }

    pub fn get(&self) -> Result<&JniContext> {
        self.cell.get().ok_or(InteropError::Uninitialized)
    }

    pub fn env(&self) -> Result<AttachedEnv> {
        self.get()?.attach()
    }
}

impl Default for VmSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the process-wide VM
///
/// # Safety
/// `vm` must point to a live `JavaVM` for the rest of the process.
pub unsafe fn set_java_vm(vm: *mut JavaVM) -> Result<()> {
    JAVA_VM.set(vm)
}

/// The process-wide VM, or [`InteropError::Uninitialized`]
pub fn java_vm() -> Result<&'static JniContext> {
    JAVA_VM.get()
}

/// Environment of the calling thread, attaching it if needed
pub fn jni_env() -> Result<AttachedEnv> {
    JAVA_VM.env()
}

/// Copy a managed string using the calling thread's environment
///
/// # Safety
/// `string` must be a valid `java.lang.String` reference on this thread.
pub unsafe fn string_from_java(string: jstring) -> Result<String> {
    let env = jni_env()?;
    string_to_owned(&env, string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jni_sys::{jint, JNIInvokeInterface_};

    const FAKE_ENV: usize = 0xE000;

    unsafe extern "system" fn attach_ok(
        _vm: *mut JavaVM,
        penv: *mut *mut c_void,
        _args: *mut c_void,
    ) -> jint {
        *penv = FAKE_ENV as *mut c_void;
        JNI_OK
    }

    unsafe extern "system" fn attach_err(
        _vm: *mut JavaVM,
        _penv: *mut *mut c_void,
        _args: *mut c_void,
    ) -> jint {
        JNI_ERR
    }

    type AttachFn = unsafe extern "system" fn(*mut JavaVM, *mut *mut c_void, *mut c_void) -> jint;

    fn leak_vm(attach: AttachFn) -> *mut JavaVM {
        leak_table(Some(attach))
    }

    fn leak_table(attach: Option<AttachFn>) -> *mut JavaVM {
        let table: &'static JNIInvokeInterface_ = Box::leak(Box::new(JNIInvokeInterface_ {
            reserved0: ptr::null_mut(),
            reserved1: ptr::null_mut(),
            reserved2: ptr::null_mut(),
            DestroyJavaVM: None,
            AttachCurrentThread: attach,
            DetachCurrentThread: None,
            GetEnv: None,
            AttachCurrentThreadAsDaemon: None,
        }));
        Box::leak(Box::new(table as *const JNIInvokeInterface_))
    }

    #[test]
    fn test_never_set_is_uninitialized() {
        let slot = VmSlot::new();
        assert!(matches!(slot.get(), Err(InteropError::Uninitialized)));
        assert!(matches!(slot.env(), Err(InteropError::Uninitialized)));
    }

    #[test]
    fn test_set_once_then_attach() {
        let slot = VmSlot::new();
        let vm = leak_vm(attach_ok);

        unsafe { slot.set(vm).unwrap() };
        assert_eq!(slot.get().unwrap().as_raw(), vm);

        let env = slot.env().unwrap();
        assert_eq!(env.as_raw() as usize, FAKE_ENV);
    }

    #[test]
    fn test_set_same_vm_is_idempotent() {
        let slot = VmSlot::new();
        let vm = leak_vm(attach_ok);

        unsafe {
            slot.set(vm).unwrap();
            slot.set(vm).unwrap();
            slot.set(vm).unwrap();
        }
        assert_eq!(slot.get().unwrap().as_raw(), vm);
    }

    #[test]
    fn test_set_different_vm_rejected() {
        let slot = VmSlot::new();
        let first = leak_vm(attach_ok);
        let second = leak_vm(attach_ok);

        unsafe {
            slot.set(first).unwrap();
            assert_eq!(slot.set(second), Err(InteropError::VmAlreadySet));
        }
        assert_eq!(slot.get().unwrap().as_raw(), first);
    }

    #[test]
    fn test_set_null_rejected() {
        let slot = VmSlot::new();
        assert_eq!(unsafe { slot.set(ptr::null_mut()) }, Err(InteropError::NullHandle));
        assert!(matches!(slot.get(), Err(InteropError::Uninitialized)));
    }

    #[test]
    fn test_attach_failure_reported() {
        let slot = VmSlot::new();
        unsafe { slot.set(leak_vm(attach_err)).unwrap() };

        assert_eq!(
            slot.env().unwrap_err(),
            InteropError::AttachFailed { code: JNI_ERR }
        );
    }

    #[test]
    fn test_missing_attach_entry_reported() {
        let slot = VmSlot::new();
        unsafe { slot.set(leak_table(None)).unwrap() };

        assert_eq!(
            slot.env().unwrap_err(),
            InteropError::AttachFailed { code: JNI_ERR }
        );
    }

    #[test]
    fn test_global_accessors_before_registration() {
        // Nothing in the test suite registers the process-wide VM
        assert!(matches!(java_vm(), Err(InteropError::Uninitialized)));
        assert!(matches!(jni_env(), Err(InteropError::Uninitialized)));
        assert_eq!(
            unsafe { string_from_java(ptr::null_mut()) },
            Err(InteropError::Uninitialized)
        );
    }
}

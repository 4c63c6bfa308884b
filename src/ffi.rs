//! C ABI for embedding the dictionary in a host runtime.
//!
//! Keys are NUL-terminated strings and values are opaque non-null pointers.
//! The host passes a release callback at creation; it is invoked once for
//! every value still stored when the dictionary is destroyed. Overwriting a
//! key does not invoke it: the displaced pointer stays the host's
//! responsibility.
//!
//! All functions accept a null dictionary pointer: mutators report failure,
//! queries report "not found" or zero, and `strdict_destroy` does nothing.

use alloc::boxed::Box;
use core::ffi::CStr;
use core::ffi::c_char;
use core::ffi::c_void;
use core::ptr;
use core::ptr::NonNull;

use crate::dict::Dict;
use crate::release::Release;

/// Host callback that frees a value payload.
pub type ReleaseFn = unsafe extern "C" fn(*mut c_void);

/// Forwards released values to the host's callback. Without a callback the
/// host keeps ownership of every payload.
#[derive(Debug, Clone, Copy)]
pub struct ForeignRelease(Option<ReleaseFn>);

impl Release<NonNull<c_void>> for ForeignRelease {
    fn release(&mut self, value: NonNull<c_void>) {
        if let Some(release) = self.0 {
            // SAFETY: the host registered `release` for the payloads it stores
            // and each stored payload is released once.
            unsafe { release(value.as_ptr()) }
        }
    }
}

/// Opaque dictionary handle handed to C callers.
pub type StrDict = Dict<NonNull<c_void>, ForeignRelease>;

/// Reads a C key, mapping null to an absent key.
///
/// # Safety
///
/// `key` must be null or point to a NUL-terminated string that stays valid
/// for `'a`.
unsafe fn key_bytes<'a>(key: *const c_char) -> Option<&'a [u8]> {
    if key.is_null() {
        return None;
    }
    // SAFETY: caller guarantees a valid NUL-terminated string.
    Some(unsafe { CStr::from_ptr(key) }.to_bytes())
}

/// Creates an empty dictionary. Returns null if it cannot be allocated.
#[unsafe(no_mangle)]
pub extern "C" fn strdict_create(release: Option<ReleaseFn>) -> *mut StrDict {
    match StrDict::try_with_release(ForeignRelease(release)) {
        Ok(dict) => Box::into_raw(Box::new(dict)),
        Err(_) => ptr::null_mut(),
    }
}

/// Destroys `dict`, releasing every stored value.
///
/// # Safety
///
/// `dict` must be null or a pointer returned by [`strdict_create`] that has
/// not been destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strdict_destroy(dict: *mut StrDict) {
    if dict.is_null() {
        return;
    }
    // SAFETY: caller guarantees `dict` came from `strdict_create` and is
    // destroyed once.
    drop(unsafe { Box::from_raw(dict) });
}

/// Stores `value` under a copy of `key`.
///
/// Returns `false` if `dict`, `key`, or `value` is null, or if an allocation
/// fails; the dictionary is unchanged in that case.
///
/// # Safety
///
/// `dict` must be null or a live dictionary not accessed concurrently. `key`
/// must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strdict_put(
    dict: *mut StrDict,
    key: *const c_char,
    value: *mut c_void,
) -> bool {
    // SAFETY: caller guarantees `dict` is null or live and exclusively ours.
    let Some(dict) = (unsafe { dict.as_mut() }) else {
        return false;
    };
    // SAFETY: caller guarantees `key` is null or a valid C string.
    let key = unsafe { key_bytes(key) };
    dict.put(key, NonNull::new(value)).is_ok()
}

/// Returns the value stored under `key`, or null if there is none.
///
/// # Safety
///
/// Same requirements as [`strdict_put`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strdict_get(dict: *const StrDict, key: *const c_char) -> *mut c_void {
    // SAFETY: caller guarantees `dict` is null or live.
    let Some(dict) = (unsafe { dict.as_ref() }) else {
        return ptr::null_mut();
    };
    // SAFETY: caller guarantees `key` is null or a valid C string.
    let Some(key) = (unsafe { key_bytes(key) }) else {
        return ptr::null_mut();
    };
    dict.get(key).map_or(ptr::null_mut(), |value| value.as_ptr())
}

/// Returns the cumulative number of probe steps, or 0 for a null `dict`.
///
/// # Safety
///
/// `dict` must be null or a live dictionary.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strdict_probe_count(dict: *const StrDict) -> u64 {
    // SAFETY: caller guarantees `dict` is null or live.
    unsafe { dict.as_ref() }.map_or(0, StrDict::probe_count)
}

/// Returns the number of stored keys, or 0 for a null `dict`.
///
/// # Safety
///
/// `dict` must be null or a live dictionary.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strdict_len(dict: *const StrDict) -> usize {
    // SAFETY: caller guarantees `dict` is null or live.
    unsafe { dict.as_ref() }.map_or(0, StrDict::len)
}

/// Returns the slot count, or 0 for a null `dict`.
///
/// # Safety
///
/// `dict` must be null or a live dictionary.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strdict_capacity(dict: *const StrDict) -> usize {
    // SAFETY: caller guarantees `dict` is null or live.
    unsafe { dict.as_ref() }.map_or(0, StrDict::capacity)
}

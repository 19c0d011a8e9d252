//! FFI handle ownership for Python-side blocks.
//!
//! An [`OwnedHandle`] pairs a block handle with the host object whose memory
//! the block may alias. The handle is always destroyed before the keepalive
//! is released, and views derived by slicing share the same keepalive.

use std::ffi::c_void;

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use tessel_ffi::block::{tessel_block_destroy, tessel_block_wrap};

use crate::block::Kind;
use crate::error::check_status;

pub(crate) struct OwnedHandle<K> {
    handle: Option<u64>,
    keepalive: Option<K>,
}

impl<K> OwnedHandle<K> {
    pub(crate) fn new(handle: u64, keepalive: Option<K>) -> Self {
        Self {
            handle: Some(handle),
            keepalive,
        }
    }

    /// The live handle, or RuntimeError once released.
    pub(crate) fn get(&self) -> PyResult<u64> {
        self.handle
            .ok_or_else(|| PyRuntimeError::new_err("Block already destroyed"))
    }

    pub(crate) fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    /// Adopt `handle`, a view derived from this one, sharing its keepalive.
    pub(crate) fn derive(&self, handle: u64, share: impl FnOnce(&K) -> K) -> Self {
        Self::new(handle, self.keepalive.as_ref().map(share))
    }

    /// Destroy the handle, then drop the keepalive. Idempotent.
    pub(crate) fn release(&mut self) {
        if let Some(h) = self.handle.take() {
            let _ = tessel_block_destroy(h);
        }
        self.keepalive = None;
    }
}

impl<K> Drop for OwnedHandle<K> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Alias `len` elements of `kind` at `ptr`, holding `owner` until the last
/// handle derived from the result is released.
///
/// `ptr` must stay valid for as long as `owner` is alive.
pub(crate) fn wrap_region<K>(
    kind: Kind,
    ptr: *mut c_void,
    len: usize,
    writable: bool,
    owner: K,
) -> PyResult<OwnedHandle<K>> {
    let mut h: u64 = 0;
    check_status(tessel_block_wrap(
        kind as i32,
        ptr,
        len,
        u8::from(writable),
        &mut h,
    ))?;
    Ok(OwnedHandle::new(h, Some(owner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tessel_ffi::block::{
        tessel_block_get, tessel_block_is_writable, tessel_block_len, tessel_block_set,
        tessel_block_slice,
    };
    use tessel_ffi::TesselStatus;

    fn shared(values: &[f64]) -> (Rc<[f64]>, *mut c_void) {
        let owner: Rc<[f64]> = Rc::from(values);
        let ptr = owner.as_ptr() as *mut c_void;
        (owner, ptr)
    }

    fn read(h: u64, index: i64) -> f64 {
        let mut value = 0.0;
        assert_eq!(tessel_block_get(h, index, &mut value), 0);
        value
    }

    #[test]
    fn slices_keep_the_owner_alive() {
        let (owner, ptr) = shared(&[1.0, 2.0, 3.0, 4.0]);
        let base = wrap_region(Kind::Float64, ptr, 4, false, Rc::clone(&owner)).unwrap();
        let mut out = 0u64;
        assert_eq!(tessel_block_slice(base.get().unwrap(), 1, 2, 2, &mut out), 0);
        let view = base.derive(out, Rc::clone);
        assert_eq!(Rc::strong_count(&owner), 3);

        let base_handle = base.get().unwrap();
        drop(base);
        assert_eq!(Rc::strong_count(&owner), 2);
        let mut len = 0usize;
        assert_eq!(
            tessel_block_len(base_handle, &mut len),
            TesselStatus::InvalidHandle as i32
        );
        assert_eq!(read(view.get().unwrap(), 1), 4.0);

        drop(view);
        assert_eq!(Rc::strong_count(&owner), 1);
    }

    #[test]
    fn read_only_owner_yields_read_only_block() {
        let (owner, ptr) = shared(&[5.0, 6.0]);
        let block = wrap_region(Kind::Float64, ptr, 2, false, Rc::clone(&owner)).unwrap();
        let h = block.get().unwrap();
        let mut flag = 1u8;
        assert_eq!(tessel_block_is_writable(h, &mut flag), 0);
        assert_eq!(flag, 0);
        assert_eq!(
            tessel_block_set(h, 0, 1.0),
            TesselStatus::ImmutableBuffer as i32
        );
        assert_eq!(owner[0], 5.0);
    }

    #[test]
    fn writable_owner_sees_writes() {
        let mut data = vec![0i32; 3];
        let ptr = data.as_mut_ptr().cast::<c_void>();
        {
            let block = wrap_region(Kind::Int32, ptr, 3, true, ()).unwrap();
            assert_eq!(tessel_block_set(block.get().unwrap(), 2, 9.0), 0);
        }
        assert_eq!(data, vec![0, 0, 9]);
    }

    #[test]
    fn release_is_idempotent() {
        let (owner, ptr) = shared(&[1.0]);
        let mut block = wrap_region(Kind::Float64, ptr, 1, false, Rc::clone(&owner)).unwrap();
        block.release();
        assert!(!block.is_live());
        assert!(block.get().is_err());
        assert_eq!(Rc::strong_count(&owner), 1);
        block.release();
        let orphan = block.derive(0, Rc::clone);
        assert!(orphan.keepalive.is_none());
    }
}

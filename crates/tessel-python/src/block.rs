//! PyBlock: Python wrapper around block and view handles.
//!
//! Handles live in the FFI layer's thread-local table, so the class is
//! `unsendable`: a Block may only be used on the thread that created it.

use std::ffi::c_void;

use numpy::{PyArray1, PyArrayMethods, PyUntypedArrayMethods};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::IntoPyObjectExt;

use tessel_ffi::block::{
    tessel_block_alloc, tessel_block_cast, tessel_block_copy_to_f64, tessel_block_fill,
    tessel_block_from_f64, tessel_block_get, tessel_block_is_writable, tessel_block_len,
    tessel_block_set, tessel_block_slice,
};

use crate::error::check_status;
use crate::handle::{wrap_region, OwnedHandle};

/// Element kind of a block.
#[pyclass(eq, eq_int, from_py_object)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    /// IEEE-754 binary64.
    Float64 = 0,
    /// Signed 32-bit integer.
    Int32 = 1,
    /// Unsigned 8-bit integer.
    UInt8 = 2,
}

impl Kind {
    fn is_integer(self) -> bool {
        !matches!(self, Self::Float64)
    }
}

/// A typed numeric block, or a strided view into one.
///
/// Views created with `slice` share storage with their source: writes
/// through either are visible through both. Storage is released when the
/// last Block referring to it is destroyed or garbage-collected.
#[pyclass(unsendable)]
pub(crate) struct Block {
    /// Keeps alive the NumPy array a wrapped block aliases.
    inner: OwnedHandle<Py<PyAny>>,
    kind: Kind,
}

#[pymethods]
impl Block {
    /// Allocate a zero-filled block of `count` elements.
    #[staticmethod]
    fn alloc(kind: Kind, count: usize) -> PyResult<Self> {
        let mut h: u64 = 0;
        check_status(tessel_block_alloc(kind as i32, count, &mut h))?;
        Ok(Self::from_handle(h, kind))
    }

    /// Build an owned block from a sequence of numbers.
    ///
    /// Integer kinds accept only whole numbers inside their range; anything
    /// else raises TypeError and no block is created.
    #[staticmethod]
    fn from_list(kind: Kind, values: Vec<f64>) -> PyResult<Self> {
        Self::from_f64s(kind, &values)
    }

    /// Copy a 1-D float64, int32 or uint8 NumPy array into an owned block.
    #[staticmethod]
    fn from_numpy(array: &Bound<'_, PyAny>) -> PyResult<Self> {
        if let Some(arr) = typed::<f64>(array) {
            return Self::from_f64s(Kind::Float64, &widen(&arr));
        }
        if let Some(arr) = typed::<i32>(array) {
            return Self::from_f64s(Kind::Int32, &widen(&arr));
        }
        if let Some(arr) = typed::<u8>(array) {
            return Self::from_f64s(Kind::UInt8, &widen(&arr));
        }
        Err(unsupported_array())
    }

    /// Alias the memory of a C-contiguous 1-D NumPy array without copying.
    ///
    /// The array is kept alive while any Block derived from it exists. A
    /// read-only array yields a read-only block. Writes made through the
    /// array, or an array it views, show through the block.
    #[staticmethod]
    fn wrap_numpy(array: &Bound<'_, PyAny>) -> PyResult<Self> {
        if let Some(arr) = typed::<f64>(array) {
            return wrap_typed(&arr, Kind::Float64, array);
        }
        if let Some(arr) = typed::<i32>(array) {
            return wrap_typed(&arr, Kind::Int32, array);
        }
        if let Some(arr) = typed::<u8>(array) {
            return wrap_typed(&arr, Kind::UInt8, array);
        }
        Err(unsupported_array())
    }

    /// The element kind.
    #[getter]
    fn kind(&self) -> Kind {
        self.kind
    }

    /// Whether writes through this block are permitted.
    #[getter]
    fn writable(&self) -> PyResult<bool> {
        let h = self.require_handle()?;
        let mut flag: u8 = 0;
        check_status(tessel_block_is_writable(h, &mut flag))?;
        Ok(flag != 0)
    }

    fn __len__(&self) -> PyResult<usize> {
        self.len()
    }

    fn __getitem__(&self, py: Python<'_>, index: i64) -> PyResult<Py<PyAny>> {
        let h = self.require_handle()?;
        let mut value = 0.0;
        check_status(tessel_block_get(h, index, &mut value))?;
        if self.kind.is_integer() {
            (value as i64).into_py_any(py)
        } else {
            value.into_py_any(py)
        }
    }

    fn __setitem__(&self, index: i64, value: f64) -> PyResult<()> {
        let h = self.require_handle()?;
        check_status(tessel_block_set(h, index, value))
    }

    /// Create a zero-copy view of `length` elements starting at `start`,
    /// stepping by `stride` (negative strides walk backwards).
    #[pyo3(signature = (start, length, stride=1))]
    fn slice(&self, py: Python<'_>, start: i64, length: usize, stride: isize) -> PyResult<Self> {
        let h = self.require_handle()?;
        let mut out: u64 = 0;
        check_status(tessel_block_slice(h, start, length, stride, &mut out))?;
        Ok(Self {
            inner: self.inner.derive(out, |k| k.clone_ref(py)),
            kind: self.kind,
        })
    }

    /// Elements as a list of int (integer kinds) or float (Float64).
    fn to_list(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let values = self.read_all()?;
        if self.kind.is_integer() {
            values.into_iter().map(|v| v as i64).collect::<Vec<_>>().into_py_any(py)
        } else {
            values.into_py_any(py)
        }
    }

    /// Copy the elements into a new NumPy array of the matching dtype.
    fn to_numpy(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let values = self.read_all()?;
        let array = match self.kind {
            Kind::Float64 => PyArray1::from_vec(py, values).into_any(),
            Kind::Int32 => {
                PyArray1::from_vec(py, values.into_iter().map(|v| v as i32).collect()).into_any()
            }
            Kind::UInt8 => {
                PyArray1::from_vec(py, values.into_iter().map(|v| v as u8).collect()).into_any()
            }
        };
        Ok(array.unbind())
    }

    /// Convert into a new owned block of `kind`.
    ///
    /// Float to integer truncates toward zero and saturates at the target
    /// range; NaN becomes 0.
    fn cast(&self, kind: Kind) -> PyResult<Self> {
        let h = self.require_handle()?;
        let mut out: u64 = 0;
        check_status(tessel_block_cast(h, kind as i32, &mut out))?;
        Ok(Self::from_handle(out, kind))
    }

    /// Set every element to `value`.
    fn fill(&self, value: f64) -> PyResult<()> {
        let h = self.require_handle()?;
        check_status(tessel_block_fill(h, value))
    }

    fn __repr__(&self) -> String {
        if !self.inner.is_live() {
            return format!("Block(kind={:?}, <destroyed>)", self.kind);
        }
        match self.len() {
            Ok(n) => format!("Block(kind={:?}, len={n})", self.kind),
            Err(_) => format!("Block(kind={:?}, <invalid>)", self.kind),
        }
    }

    /// Release this handle. Further use raises RuntimeError.
    ///
    /// Storage shared with other live Blocks stays valid.
    fn destroy(&mut self) {
        self.inner.release();
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type=None, _exc_val=None, _exc_tb=None))]
    fn __exit__(
        &mut self,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_val: Option<&Bound<'_, PyAny>>,
        _exc_tb: Option<&Bound<'_, PyAny>>,
    ) {
        self.destroy();
    }
}

impl Block {
    fn from_handle(handle: u64, kind: Kind) -> Self {
        Self {
            inner: OwnedHandle::new(handle, None),
            kind,
        }
    }

    fn from_f64s(kind: Kind, values: &[f64]) -> PyResult<Self> {
        let mut h: u64 = 0;
        check_status(tessel_block_from_f64(
            kind as i32,
            values.as_ptr(),
            values.len(),
            &mut h,
        ))?;
        Ok(Self::from_handle(h, kind))
    }

    fn require_handle(&self) -> PyResult<u64> {
        self.inner.get()
    }

    fn len(&self) -> PyResult<usize> {
        let h = self.require_handle()?;
        let mut n: usize = 0;
        check_status(tessel_block_len(h, &mut n))?;
        Ok(n)
    }

    fn read_all(&self) -> PyResult<Vec<f64>> {
        let h = self.require_handle()?;
        let mut values = vec![0.0; self.len()?];
        check_status(tessel_block_copy_to_f64(h, values.as_mut_ptr(), values.len()))?;
        Ok(values)
    }
}

fn typed<'py, T: numpy::Element>(array: &Bound<'py, PyAny>) -> Option<Bound<'py, PyArray1<T>>> {
    array.extract::<Bound<'py, PyArray1<T>>>().ok()
}

fn widen<T: numpy::Element + Copy + Into<f64>>(array: &Bound<'_, PyArray1<T>>) -> Vec<f64> {
    array.readonly().as_array().iter().map(|&x| x.into()).collect()
}

fn unsupported_array() -> PyErr {
    PyTypeError::new_err("expected a 1-D NumPy array of dtype float64, int32 or uint8")
}

fn wrap_typed<T: numpy::Element>(
    array: &Bound<'_, PyArray1<T>>,
    kind: Kind,
    owner: &Bound<'_, PyAny>,
) -> PyResult<Block> {
    if !array.is_c_contiguous() {
        return Err(PyValueError::new_err(
            "wrap_numpy requires a C-contiguous array; use from_numpy to copy",
        ));
    }
    let writable: bool = array.getattr("flags")?.getattr("writeable")?.extract()?;
    let inner = wrap_region(
        kind,
        array.data().cast::<c_void>(),
        array.len(),
        writable,
        owner.clone().unbind(),
    )?;
    Ok(Block { inner, kind })
}

//! # Python Bindings
//!
//! PyO3 bindings exposing the native sapf library to Python.
//!
//! ## Python API
//!
//! ```python
//! from sapf import Library
//!
//! lib = Library("./sapf.so")
//! print(lib.add(1))
//!
//! lib.init("config")
//! result = lib.reset()
//! while not result.done:
//!     result = lib.step(result.node)
//!     print(f"{result.node}: {result.reward}")
//!
//! print(lib.graph())
//! ```

use pyo3::exceptions::{PyAttributeError, PyOSError, PyValueError};
use pyo3::prelude::*;

use crate::adapters::native::NativeLibrary;
use crate::core::{Export, SapfError, StepResult};
use crate::ports::{Accumulator, Environment};

impl From<SapfError> for PyErr {
    fn from(err: SapfError) -> Self {
        match err {
            SapfError::Library { .. } | SapfError::Io(_) => PyOSError::new_err(err.to_string()),
            SapfError::MissingSymbol(_) => PyAttributeError::new_err(err.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Python wrapper for a step result
#[pyclass(name = "StepResult")]
#[derive(Clone)]
pub struct PyStepResult {
    #[pyo3(get)]
    pub reward: f32,

    #[pyo3(get)]
    pub done: bool,

    #[pyo3(get)]
    pub node: i64,
}

impl From<StepResult> for PyStepResult {
    fn from(result: StepResult) -> Self {
        Self {
            reward: result.reward,
            done: result.is_done(),
            node: result.node,
        }
    }
}

#[pymethods]
impl PyStepResult {
    fn __repr__(&self) -> String {
        format!(
            "StepResult(reward={:.4}, done={}, node={})",
            self.reward,
            if self.done { "True" } else { "False" },
            self.node
        )
    }
}

/// Python wrapper for the native library
#[pyclass(name = "Library")]
pub struct PyLibrary {
    inner: NativeLibrary,
}

#[pymethods]
impl PyLibrary {
    /// Load the shared object
    ///
    /// Args:
    ///     path: Path to sapf.so
    #[new]
    #[pyo3(signature = (path = "./sapf.so"))]
    fn new(path: &str) -> PyResult<Self> {
        Ok(Self {
            inner: NativeLibrary::open(path)?,
        })
    }

    fn add(&mut self, value: i32) -> PyResult<i32> {
        Ok(self.inner.add(value)?)
    }

    fn init(&mut self, config: &str) -> PyResult<()> {
        Ok(self.inner.init(config)?)
    }

    fn reset(&mut self) -> PyResult<PyStepResult> {
        Ok(self.inner.reset()?.into())
    }

    /// Step to a node
    ///
    /// Args:
    ///     node: Node id (int64)
    fn step(&mut self, node: i64) -> PyResult<PyStepResult> {
        Ok(self.inner.step(node)?.into())
    }

    fn graph(&mut self) -> PyResult<String> {
        Ok(self.inner.graph()?)
    }

    /// Names of the exports the library provides
    fn exports(&self) -> Vec<&'static str> {
        self.inner.exports().iter().map(Export::name).collect()
    }

    fn __repr__(&self) -> String {
        format!("Library(path='{}')", self.inner.path().display())
    }
}

/// sapf Python module
#[pymodule]
fn sapf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyLibrary>()?;
    m.add_class::<PyStepResult>()?;

    m.add("__doc__", "sapf: runtime bindings to the sapf native environment")?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}

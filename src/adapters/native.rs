//! # Native Library Adapter
//!
//! Loads `sapf.so` at runtime with `libloading` and serves the `Environment`
//! and `Accumulator` ports from its exports.
//!
//! Each export is resolved once at open time. An absent export is recorded,
//! not fatal; calling it later yields `SapfError::MissingSymbol`. Use
//! `open_requiring` to fail at open time instead.
//!
//! Strings returned by `graph` stay owned by the library and are copied out
//! before the call returns.

use std::ffi::{c_char, CStr, CString};
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, trace};

use crate::core::{Export, NodeId, SapfError, SapfResult, StepResult};
use crate::ports::{Accumulator, Environment};

type AddFn = unsafe extern "C" fn(i32) -> i32;
type InitFn = unsafe extern "C" fn(*const c_char);
type ResetFn = unsafe extern "C" fn() -> StepResult;
type StepFn = unsafe extern "C" fn(i64) -> StepResult;
type GraphFn = unsafe extern "C" fn() -> *const c_char;

/// The sapf shared object and its resolved exports
pub struct NativeLibrary {
    path: PathBuf,

    add: Option<AddFn>,
    init: Option<InitFn>,
    reset: Option<ResetFn>,
    step: Option<StepFn>,
    graph: Option<GraphFn>,

    /// Keeps the mapping alive for the function pointers above
    _library: Library,
}

impl NativeLibrary {
    /// Load the library, resolving whatever exports it has
    pub fn open(path: impl AsRef<Path>) -> SapfResult<Self> {
        Self::open_requiring(path, &[])
    }

    /// Load the library and fail unless every export in `required` resolves
    pub fn open_requiring(path: impl AsRef<Path>, required: &[Export]) -> SapfResult<Self> {
        let path = path.as_ref().to_path_buf();

        // SAFETY: loading runs the library's initialisers. sapf is trusted
        // native code supplied by the caller.
        let library = unsafe { Library::new(&path) }.map_err(|source| SapfError::Library {
            path: path.clone(),
            source,
        })?;

        // SAFETY: each pointer type matches the declared export signature, and
        // `_library` outlives every copy we hold.
        let native = unsafe {
            Self {
                add: resolve::<AddFn>(&library, Export::Add),
                init: resolve::<InitFn>(&library, Export::Init),
                reset: resolve::<ResetFn>(&library, Export::Reset),
                step: resolve::<StepFn>(&library, Export::Step),
                graph: resolve::<GraphFn>(&library, Export::Graph),
                path,
                _library: library,
            }
        };

        if let Some(missing) = required.iter().find(|e| !native.has(**e)) {
            return Err(SapfError::MissingSymbol(*missing));
        }

        debug!(
            path = %native.path.display(),
            exports = ?native.exports(),
            "loaded sapf library"
        );

        Ok(native)
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an export resolved
    pub fn has(&self, export: Export) -> bool {
        match export {
            Export::Add => self.add.is_some(),
            Export::Init => self.init.is_some(),
            Export::Reset => self.reset.is_some(),
            Export::Step => self.step.is_some(),
            Export::Graph => self.graph.is_some(),
        }
    }
}

/// # Safety
///
/// `T` must be the function pointer type of the export.
unsafe fn resolve<T: Copy>(library: &Library, export: Export) -> Option<T> {
    match library.get::<T>(export.symbol()) {
        Ok(symbol) => Some(*symbol),
        Err(err) => {
            trace!(export = export.name(), error = %err, "export not found");
            None
        }
    }
}

fn require<T: Copy>(f: Option<T>, export: Export) -> SapfResult<T> {
    f.ok_or(SapfError::MissingSymbol(export))
}

/// Convert a string argument for `export` into a C string
fn c_argument(export: Export, value: &str) -> SapfResult<CString> {
    CString::new(value).map_err(|e| {
        SapfError::InvalidArgument(format!(
            "{export} argument has a NUL byte at {}",
            e.nul_position()
        ))
    })
}

/// Copy a string returned by `export` into an owned `String`
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated buffer that stays valid
/// for the duration of the call.
unsafe fn copy_c_string(ptr: *const c_char, export: Export) -> SapfResult<String> {
    if ptr.is_null() {
        return Err(SapfError::NullString(export));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(str::to_owned)
        .map_err(|source| SapfError::InvalidUtf8 { export, source })
}

impl Environment for NativeLibrary {
    fn init(&mut self, config: &str) -> SapfResult<()> {
        let init = require(self.init, Export::Init)?;
        let arg = c_argument(Export::Init, config)?;

        trace!(len = config.len(), "init");
        // SAFETY: `arg` is NUL-terminated and lives across the call.
        unsafe { init(arg.as_ptr()) };
        Ok(())
    }

    fn reset(&mut self) -> SapfResult<StepResult> {
        let reset = require(self.reset, Export::Reset)?;
        // SAFETY: signature matches the export; no arguments.
        let result = unsafe { reset() };
        trace!(?result, "reset");
        Ok(result)
    }

    fn step(&mut self, node: NodeId) -> SapfResult<StepResult> {
        let step = require(self.step, Export::Step)?;
        // SAFETY: signature matches the export.
        let result = unsafe { step(node) };
        trace!(node, ?result, "step");
        Ok(result)
    }

    fn graph(&mut self) -> SapfResult<String> {
        let graph = require(self.graph, Export::Graph)?;
        // SAFETY: signature matches the export.
        let ptr = unsafe { graph() };
        // SAFETY: the export returns null or a NUL-terminated string that stays
        // valid until the next call into the library.
        let text = unsafe { copy_c_string(ptr, Export::Graph) }?;

        trace!(len = text.len(), "graph");
        Ok(text)
    }

    fn exports(&self) -> Vec<Export> {
        Export::ALL.into_iter().filter(|e| self.has(*e)).collect()
    }
}

impl Accumulator for NativeLibrary {
    fn add(&mut self, value: i32) -> SapfResult<i32> {
        let add = require(self.add, Export::Add)?;
        // SAFETY: signature matches the export.
        let result = unsafe { add(value) };
        trace!(value, result, "add");
        Ok(result)
    }
}

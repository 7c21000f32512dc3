// -----------------------------------------------------------------------------
// Modules

mod debug_unwrap;
mod dense_id;
mod dropper;

// -----------------------------------------------------------------------------
// Exports

pub use debug_unwrap::DebugCheckedUnwrap;
pub(crate) use dense_id::dense_id;
pub use dropper::{DefaultFn, Dropper};

// -----------------------------------------------------------------------------
// AbortOnPanic

/// Terminates the process if dropped, i.e. when a panic unwinds through a
/// section that would otherwise leave a column half-written.
pub(crate) struct AbortOnPanic(pub &'static str);

impl Drop for AbortOnPanic {
    #[cold]
    #[inline(never)]
    fn drop(&mut self) {
        #[cfg(feature = "std")]
        {
            std::eprintln!("Aborting: {}", self.0);
            std::process::abort();
        }
        #[cfg(not(feature = "std"))]
        panic!("Aborting: {}", self.0);
    }
}

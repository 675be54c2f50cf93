pub mod context;
pub mod diagnostic;
pub mod path;

pub mod prelude {
    pub use crate::context::{DiagnosticContext, DiagnosticContextMut};
    pub use crate::diagnostic::{Diagnostic, DiagnosticLevel};
    pub use crate::path::{DiagnosticPath, DiagnosticPathSegment};
}

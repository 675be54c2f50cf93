#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum DiagnosticLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl From<miette::Severity> for DiagnosticLevel {
    fn from(value: miette::Severity) -> Self {
        match value {
            miette::Severity::Advice => DiagnosticLevel::Info,
            miette::Severity::Warning => DiagnosticLevel::Warning,
            miette::Severity::Error => DiagnosticLevel::Error,
        }
    }
}

#[derive(Debug)]
pub struct Diagnostic {
    pub info: miette::Report,
    pub level: DiagnosticLevel,
}

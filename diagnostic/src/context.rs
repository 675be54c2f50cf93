use crate::diagnostic::{Diagnostic, DiagnosticLevel};
use crate::path::{DiagnosticPath, DiagnosticPathSegment};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::BTreeMap;

type Reports = BTreeMap<DiagnosticPath, SmallVec<[Diagnostic; 1]>>;

#[derive(Debug, Default)]
pub struct DiagnosticContext {
    pub diagnostics: BTreeMap<String, Reports>,
    path: DiagnosticPath,
}

impl DiagnosticContext {
    pub fn merge(&mut self, other: DiagnosticContext) {
        for (ident, diagnostics) in other.diagnostics {
            let entry = self.diagnostics.entry(ident).or_default();
            for (path, reports) in diagnostics {
                entry.entry(path).or_default().extend(reports);
            }
        }
    }

    pub fn enter<'a>(&'a mut self, ident: &'a str) -> DiagnosticContextMut<'a> {
        let entry = self.diagnostics.entry(ident.to_string()).or_default();
        DiagnosticContextMut {
            diagnostics: entry,
            path: &mut self.path,
            ident,
            pop_on_exit: false,
        }
    }

    /// Checks if there are any diagnostics of the specified level or higher
    pub fn has_diagnostics(&self, level: DiagnosticLevel) -> bool {
        self.diagnostics
            .iter()
            .flat_map(|x| x.1.iter())
            .flat_map(|x| x.1.iter())
            .any(|x| x.level >= level)
    }

    /// Total number of reports stored under the given ident
    pub fn count(&self, ident: &str) -> usize {
        self.diagnostics
            .get(ident)
            .map(|reports| reports.values().map(|v| v.len()).sum())
            .unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct DiagnosticContextMut<'a> {
    diagnostics: &'a mut Reports,
    path: &'a mut DiagnosticPath,
    ident: &'a str,
    pop_on_exit: bool,
}

impl DiagnosticContextMut<'_> {
    pub fn enter(&mut self, segment: impl Into<DiagnosticPathSegment>) -> DiagnosticContextMut<'_> {
        self.path.push(segment);
        DiagnosticContextMut {
            diagnostics: &mut *self.diagnostics,
            path: &mut *self.path,
            ident: self.ident,
            pop_on_exit: true,
        }
    }

    pub fn enter_index(&mut self, index: i64) -> DiagnosticContextMut<'_> {
        self.enter(DiagnosticPathSegment::Index(index))
    }

    pub fn enter_map_key(
        &mut self,
        key: impl Into<Cow<'static, str>>,
    ) -> DiagnosticContextMut<'_> {
        self.enter(DiagnosticPathSegment::MapKey(key.into()))
    }

    pub fn emit(&mut self, info: miette::Report, level: DiagnosticLevel) {
        self.diagnostics
            .entry(self.path.clone())
            .or_default()
            .push(Diagnostic { info, level });
    }

    pub fn emit_error(&mut self, info: miette::Report) {
        self.emit(info, DiagnosticLevel::Error);
    }

    pub fn emit_warning(&mut self, info: miette::Report) {
        self.emit(info, DiagnosticLevel::Warning);
    }

    /// Emits a typed diagnostic, deriving the level from its severity.
    ///
    /// Diagnostics without an explicit severity are treated as errors
    pub fn emit_diagnostic<D>(&mut self, diagnostic: D)
    where
        D: miette::Diagnostic + Send + Sync + 'static,
    {
        let level = diagnostic
            .severity()
            .map(DiagnosticLevel::from)
            .unwrap_or(DiagnosticLevel::Error);
        self.emit(miette::Report::new(diagnostic), level);
    }

    /// Clears all warnings originating from the current context or its children.
    pub fn clear_downstream(&mut self) {
        let prefix = &*self.path;
        self.diagnostics.retain(|path, _| !path.starts_with(prefix));
    }

    pub fn path(&self) -> &DiagnosticPath {
        self.path
    }

    pub fn ident(&self) -> &str {
        self.ident
    }

    pub fn full_path(&self) -> String {
        format!("{}@{}", self.ident, self.path)
    }

    /// Returns reports of the current context only.
    pub fn get_reports_shallow(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .get(&*self.path)
            .into_iter()
            .flat_map(|v| v.iter())
    }

    /// Returns reports of the current context and all its children.
    pub fn get_reports_deep(
        &self,
    ) -> impl Iterator<Item = (&DiagnosticPath, impl IntoIterator<Item = &Diagnostic>)> {
        let p = &*self.path;
        self.diagnostics
            .range(p..)
            .take_while(move |i| i.0.starts_with(p))
    }
}

impl Drop for DiagnosticContextMut<'_> {
    fn drop(&mut self) {
        if self.pop_on_exit {
            self.path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use miette::{miette, MietteDiagnostic, Severity};

    #[test]
    fn nested_paths_are_popped_on_exit() {
        let mut ctx = DiagnosticContext::default();
        {
            let mut root = ctx.enter("flip");
            {
                let mut item = root.enter_index(2);
                item.emit_warning(miette!("first"));
                assert_eq!(item.full_path(), "flip@[2]");
            }
            assert_eq!(root.full_path(), "flip@$");
            root.enter_map_key("name").emit_error(miette!("second"));
        }

        assert_eq!(ctx.count("flip"), 2);
        assert_eq!(ctx.count("other"), 0);
        assert!(ctx.has_diagnostics(DiagnosticLevel::Error));
    }

    #[test]
    fn typed_diagnostics_use_their_severity() {
        let mut ctx = DiagnosticContext::default();
        ctx.enter("typed").emit_diagnostic(
            MietteDiagnostic::new("dropped value").with_severity(Severity::Warning),
        );

        assert!(ctx.has_diagnostics(DiagnosticLevel::Warning));
        assert!(!ctx.has_diagnostics(DiagnosticLevel::Error));
    }

    #[test]
    fn deep_and_shallow_reports() {
        let mut ctx = DiagnosticContext::default();
        let mut root = ctx.enter("reports");
        root.emit_warning(miette!("root"));
        root.enter_index(0).emit_warning(miette!("child"));
        root.enter_index(1).enter_index(0).emit_warning(miette!("grandchild"));

        assert_eq!(root.get_reports_shallow().count(), 1);
        assert_eq!(root.get_reports_deep().count(), 3);

        {
            let mut child = root.enter_index(1);
            assert_eq!(child.get_reports_deep().count(), 1);
            child.clear_downstream();
        }
        assert_eq!(root.get_reports_deep().count(), 2);
    }

    #[test]
    fn merge_combines_reports() {
        let mut a = DiagnosticContext::default();
        let mut b = DiagnosticContext::default();
        a.enter("x").emit_warning(miette!("a"));
        b.enter("x").emit_warning(miette!("b"));
        b.enter("y").emit_error(miette!("c"));

        a.merge(b);
        assert_eq!(a.count("x"), 2);
        assert_eq!(a.count("y"), 1);
    }
}

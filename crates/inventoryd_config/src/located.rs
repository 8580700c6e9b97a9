use std::ops::Deref;
use std::ops::Range;
use std::sync::Arc;

use serde::Deserialize;

use crate::MergeConflictLocation;
use crate::SourceInfo;
use crate::ValidationError;

/// A config value together with where it was written.
///
/// Deserializing goes through `toml::Spanned<T>`, so only the byte span is
/// known at parse time. The loader attaches the file afterwards with
/// [`Located::attach_source`].
#[derive(Debug, Clone)]
pub struct Located<T> {
    value: T,
    span: Range<usize>,
    source: Option<Arc<SourceInfo>>,
}

impl<T> Located<T> {
    pub fn new(value: T, span: Range<usize>, source: Option<Arc<SourceInfo>>) -> Self {
        Self {
            value,
            span,
            source,
        }
    }

    /// Wrap a value that did not come from any file (defaults, CLI flags).
    pub fn detached(value: T) -> Self {
        Self::new(value, 0..0, None)
    }

    pub fn get_ref(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn span(&self) -> &Range<usize> {
        &self.span
    }

    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_deref()
    }

    pub fn attach_source(&mut self, source: &Arc<SourceInfo>) {
        self.source = Some(Arc::clone(source));
    }

    /// Point a validation error at this value.
    pub fn error(&self, field_path: impl Into<String>, message: impl Into<String>) -> ValidationError {
        ValidationError {
            field_path: field_path.into(),
            message: message.into(),
            span: self.source.as_ref().map(|_| self.span.clone()),
            source: self.source.as_deref().cloned(),
        }
    }

    pub fn to_conflict_location(&self) -> MergeConflictLocation {
        let (file_path, content) = match self.source.as_deref() {
            Some(source) => (source.file_path.clone(), source.content.clone()),
            None => ("<unknown>".into(), String::new()),
        };
        MergeConflictLocation {
            file_path,
            span: self.span.clone(),
            content,
        }
    }
}

impl<T> Deref for Located<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<'de, T> Deserialize<'de> for Located<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let spanned = toml::Spanned::<T>::deserialize(deserializer)?;
        let span = spanned.span();

        Ok(Located {
            value: spanned.into_inner(),
            span,
            source: None,
        })
    }
}

// Location is metadata; two values written in different places are still equal.
impl<T: PartialEq> PartialEq for Located<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Located<T> {}

use crate::source::FieldOptions;

/// Decides per field path whether a field is left out of both schemas.
///
/// Excluding an array-of-subdocument field also drops everything beneath it.
pub trait ExclusionPolicy {
    fn exclude(&self, path: &str, options: &FieldOptions) -> bool;
}

/// Excludes a field iff its `exclude` option is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExclusion;

impl ExclusionPolicy for DefaultExclusion {
    fn exclude(&self, _path: &str, options: &FieldOptions) -> bool {
        options.exclude
    }
}

impl<F> ExclusionPolicy for F
where
    F: Fn(&str, &FieldOptions) -> bool,
{
    fn exclude(&self, path: &str, options: &FieldOptions) -> bool {
        self(path, options)
    }
}

use crate::attributes::Attributes;

/// Per-leaf context available while a stage is being constructed.
///
/// Carries the effective attributes for the leaf: ancestor attributes merged
/// with the leaf's own, innermost winning.
#[derive(Debug, Clone)]
pub struct MaterializationContext {
  attributes: Attributes,
}

impl MaterializationContext {
  pub(crate) const fn new(attributes: Attributes) -> Self {
    Self { attributes }
  }

  /// Returns the resolved attributes.
  #[must_use]
  pub const fn attributes(&self) -> &Attributes {
    &self.attributes
  }

  /// Returns the resolved stage name, or `default` when none is configured.
  #[must_use]
  pub fn name_or<'a>(&'a self, default: &'a str) -> &'a str {
    self.attributes.name().unwrap_or(default)
  }

  /// Returns the resolved input buffer bounds, or the provided defaults.
  #[must_use]
  pub fn buffer_bounds_or(&self, initial: usize, max: usize) -> (usize, usize) {
    self.attributes.input_buffer_bounds().unwrap_or((initial, max))
  }
}

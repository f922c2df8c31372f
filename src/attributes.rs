//! Stream attributes used to annotate stages and graphs.

#[cfg(test)]
mod tests;

/// One configuration facet attached to a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
  /// Display name used for debugging and logging.
  Name(String),
  /// Input buffer bounds hint for stages that prefetch.
  InputBuffer {
    /// Number of elements requested up front.
    initial: usize,
    /// Largest number of elements retained at once.
    max:     usize,
  },
}

/// Ordered, append-only collection of attributes.
///
/// Lookup returns the last (innermost) value for a facet; merging appends and
/// never destroys earlier entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
  entries: Vec<Attribute>,
}

impl Attributes {
  /// Creates an empty attributes collection.
  #[must_use]
  pub const fn new() -> Self {
    Self { entries: Vec::new() }
  }

  /// Creates attributes containing a single stage name.
  #[must_use]
  pub fn named(name: impl Into<String>) -> Self {
    Self { entries: vec![Attribute::Name(name.into())] }
  }

  /// Creates attributes containing input buffer bounds.
  #[must_use]
  pub fn input_buffer(initial: usize, max: usize) -> Self {
    Self { entries: vec![Attribute::InputBuffer { initial, max }] }
  }

  /// Appends the entries of `other` after this collection's entries.
  ///
  /// `other` is the more specific (inner) set, so its facets win on lookup.
  #[must_use]
  pub fn and(mut self, other: Self) -> Self {
    self.entries.extend(other.entries);
    self
  }

  /// Returns the innermost configured name, if any.
  #[must_use]
  pub fn name(&self) -> Option<&str> {
    self.entries.iter().rev().find_map(|entry| match entry {
      | Attribute::Name(name) => Some(name.as_str()),
      | Attribute::InputBuffer { .. } => None,
    })
  }

  /// Returns the innermost input buffer bounds, if any.
  #[must_use]
  pub fn input_buffer_bounds(&self) -> Option<(usize, usize)> {
    self.entries.iter().rev().find_map(|entry| match entry {
      | Attribute::InputBuffer { initial, max } => Some((*initial, *max)),
      | Attribute::Name(_) => None,
    })
  }

  /// Returns every recorded entry, outermost first.
  #[must_use]
  pub fn entries(&self) -> &[Attribute] {
    &self.entries
  }

  /// Returns `true` when no attributes have been configured.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl Default for Attributes {
  fn default() -> Self {
    Self::new()
  }
}

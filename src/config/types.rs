//! Small configuration enums shared across the resolver and launch gate.

/// What to do when `ec2_size` does not parse as a non-negative integer.
///
/// Historically ambiguous behavior, so it is an explicit policy choice:
/// `Reject` fails validation; `Zero` logs and falls back to the
/// instance-type default size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizePolicy {
    /// Refuse to launch on an invalid size (default).
    #[default]
    Reject,
    /// Coerce an invalid size to 0 (use the instance-type default).
    Zero,
}

impl SizePolicy {
    /// Parse a size policy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "reject" => Some(Self::Reject),
            "zero" => Some(Self::Zero),
            _ => None,
        }
    }
}

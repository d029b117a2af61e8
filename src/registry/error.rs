//! Registry faults.

use std::error::Error as StdError;
use std::fmt;

/// A failure to resolve or tag services.
///
/// These describe wiring mistakes rather than domain failures. The
/// `try_*` methods of [`Environment`](crate::Environment) and
/// [`Layer`](crate::Layer) return them; the panicking variants (`expect`,
/// `bind`, `provide`) panic with their `Display` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No service is registered under the tag.
    MissingService {
        /// Name of the tag that was looked up.
        tag: &'static str,
    },
    /// A service is registered under the tag's name but with another type.
    TypeMismatch {
        /// Name of the tag that was looked up.
        tag: &'static str,
        /// Type the tag declares.
        expected: &'static str,
        /// Type of the registered service.
        found: &'static str,
    },
    /// A layer produced a different number of services than it declared.
    ServiceCountMismatch {
        /// Number of declared service tags.
        declared: usize,
        /// Number of services the acquisition produced.
        produced: usize,
    },
    /// One declaration names the same tag twice.
    DuplicateTag {
        /// The repeated tag name.
        tag: &'static str,
    },
}

impl RegistryError {
    /// The tag the fault concerns, if it concerns a single tag.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            RegistryError::MissingService { tag }
            | RegistryError::TypeMismatch { tag, .. }
            | RegistryError::DuplicateTag { tag } => Some(*tag),
            RegistryError::ServiceCountMismatch { .. } => None,
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::MissingService { tag } => {
                write!(f, "no service registered under tag `{}`", tag)
            }
            RegistryError::TypeMismatch {
                tag,
                expected,
                found,
            } => write!(
                f,
                "service under tag `{}` has type `{}`, expected `{}`",
                tag, found, expected
            ),
            RegistryError::ServiceCountMismatch { declared, produced } => write!(
                f,
                "layer declared {} service tag(s) but produced {} service(s)",
                declared, produced
            ),
            RegistryError::DuplicateTag { tag } => {
                write!(f, "tag `{}` declared more than once", tag)
            }
        }
    }
}

impl StdError for RegistryError {}

/// Panic with `error` after logging it.
pub(crate) fn fault(error: RegistryError) -> ! {
    #[cfg(feature = "tracing")]
    tracing::error!(%error, "registry fault");
    panic!("{}", error)
}

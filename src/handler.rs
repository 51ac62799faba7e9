//! Handler references and registration-time validation.
//!
//! A route names its handler either as a closure or as a spec string in the
//! `"Class"` / `"Class@method"` form. Spec strings are resolved exactly once,
//! when the route is registered, by checking them against the host's
//! [`TypeRegistry`](crate::registry::TypeRegistry); dispatch works with the
//! already-resolved [`ResolvedHandler`] and never re-parses the string.
//!
//! Validation is fail-fast: an unresolvable handler aborts the registration
//! call with [`InvalidHandler`] and nothing is written to the route table.

use crate::registry::TypeRegistry;
use crate::request::Request;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Callable handler signature.
///
/// Invocation itself belongs to the host's dispatcher; this crate only
/// stores the callable.
pub type HandlerFn = Arc<dyn Fn(&Request) -> Value + Send + Sync>;

/// Unresolved description of what code should run for a route.
#[derive(Clone)]
pub enum HandlerRef {
    /// A directly invocable closure or function value.
    Callable(HandlerFn),
    /// A `"Class"` or `"Class@method"` spec string, resolved at registration.
    Spec(String),
}

impl HandlerRef {
    /// Wrap a closure as a handler reference.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&Request) -> Value + Send + Sync + 'static,
    {
        HandlerRef::Callable(Arc::new(f))
    }
}

impl From<&str> for HandlerRef {
    fn from(spec: &str) -> Self {
        HandlerRef::Spec(spec.to_string())
    }
}

impl From<String> for HandlerRef {
    fn from(spec: String) -> Self {
        HandlerRef::Spec(spec)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Callable(_) => f.write_str("HandlerRef::Callable(..)"),
            HandlerRef::Spec(s) => f.debug_tuple("HandlerRef::Spec").field(s).finish(),
        }
    }
}

/// Handler reference resolved against the host's type registry.
#[derive(Clone)]
pub enum ResolvedHandler {
    /// Directly invocable value; passed through untouched.
    Callable(HandlerFn),
    /// A named method on a known class.
    ClassMethod {
        class: String,
        method: String,
    },
    /// A class callable through its invoke convention.
    ClassInvocable {
        class: String,
    },
}

impl fmt::Debug for ResolvedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedHandler::Callable(_) => f.write_str("ResolvedHandler::Callable(..)"),
            ResolvedHandler::ClassMethod { class, method } => f
                .debug_struct("ResolvedHandler::ClassMethod")
                .field("class", class)
                .field("method", method)
                .finish(),
            ResolvedHandler::ClassInvocable { class } => f
                .debug_struct("ResolvedHandler::ClassInvocable")
                .field("class", class)
                .finish(),
        }
    }
}

/// Handler validation failure, raised at registration time only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidHandler {
    /// The class segment does not resolve to a known class.
    ClassNotFound {
        class: String,
    },
    /// The method segment does not exist on the class.
    MethodNotFound {
        class: String,
        method: String,
    },
    /// No method segment was given and the class is not invocable.
    NotInvocable {
        class: String,
    },
}

impl fmt::Display for InvalidHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidHandler::ClassNotFound { class } => {
                write!(f, "invalid handler: class '{}' not found", class)
            }
            InvalidHandler::MethodNotFound { class, method } => {
                write!(
                    f,
                    "invalid handler: method '{}' not found on class '{}'",
                    method, class
                )
            }
            InvalidHandler::NotInvocable { class } => {
                write!(
                    f,
                    "invalid handler: class '{}' is not invocable and no method was specified",
                    class
                )
            }
        }
    }
}

impl std::error::Error for InvalidHandler {}

/// Validate a handler reference and resolve it into a concrete target.
///
/// Callables are always valid. Spec strings are split on `@`: the first
/// segment must name a known class; if a second segment is present it must
/// name a method on that class, otherwise the class itself must be invocable.
/// Segments past the second are ignored.
///
/// Pure: only read-only registry queries, no side effects.
pub fn validate(
    handler: &HandlerRef,
    registry: &dyn TypeRegistry,
) -> Result<ResolvedHandler, InvalidHandler> {
    let spec = match handler {
        HandlerRef::Callable(f) => return Ok(ResolvedHandler::Callable(f.clone())),
        HandlerRef::Spec(spec) => spec,
    };

    let mut parts = spec.split('@');
    let class = parts.next().unwrap_or_default();
    let method = parts.next();

    if !registry.has_class(class) {
        debug!(handler = %spec, class = %class, "Handler class not found");
        return Err(InvalidHandler::ClassNotFound {
            class: class.to_string(),
        });
    }

    if let Some(method) = method {
        if !registry.has_method(class, method) {
            debug!(handler = %spec, class = %class, method = %method, "Handler method not found");
            return Err(InvalidHandler::MethodNotFound {
                class: class.to_string(),
                method: method.to_string(),
            });
        }
        return Ok(ResolvedHandler::ClassMethod {
            class: class.to_string(),
            method: method.to_string(),
        });
    }

    if registry.is_invocable(class) {
        Ok(ResolvedHandler::ClassInvocable {
            class: class.to_string(),
        })
    } else {
        debug!(handler = %spec, class = %class, "Handler class not invocable");
        Err(InvalidHandler::NotInvocable {
            class: class.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticTypeRegistry;
    use serde_json::json;

    fn registry() -> StaticTypeRegistry {
        StaticTypeRegistry::new()
            .class("PetController", ["index", "show"])
            .invocable_class("HealthCheck")
    }

    #[test]
    fn test_callable_always_validates() {
        let reg = registry();
        let handler = HandlerRef::callable(|_req| json!({"ok": true}));
        assert!(matches!(
            validate(&handler, &reg),
            Ok(ResolvedHandler::Callable(_))
        ));
    }

    #[test]
    fn test_unknown_class_fails() {
        let reg = registry();
        let err = validate(&"NoSuchClass".into(), &reg).unwrap_err();
        assert_eq!(
            err,
            InvalidHandler::ClassNotFound {
                class: "NoSuchClass".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_method_fails() {
        let reg = registry();
        let err = validate(&"PetController@destroy".into(), &reg).unwrap_err();
        assert_eq!(
            err,
            InvalidHandler::MethodNotFound {
                class: "PetController".to_string(),
                method: "destroy".to_string()
            }
        );
    }

    #[test]
    fn test_known_method_resolves() {
        let reg = registry();
        let resolved = validate(&"PetController@show".into(), &reg).unwrap();
        assert!(matches!(
            resolved,
            ResolvedHandler::ClassMethod { ref class, ref method }
                if class == "PetController" && method == "show"
        ));
    }

    #[test]
    fn test_bare_class_requires_invoke() {
        let reg = registry();
        let err = validate(&"PetController".into(), &reg).unwrap_err();
        assert_eq!(
            err,
            InvalidHandler::NotInvocable {
                class: "PetController".to_string()
            }
        );
        assert!(matches!(
            validate(&"HealthCheck".into(), &reg).unwrap(),
            ResolvedHandler::ClassInvocable { ref class } if class == "HealthCheck"
        ));
    }

    #[test]
    fn test_extra_at_segments_ignored() {
        let reg = registry();
        let resolved = validate(&"PetController@show@extra".into(), &reg).unwrap();
        assert!(matches!(resolved, ResolvedHandler::ClassMethod { .. }));
    }

    #[test]
    fn test_empty_spec_is_class_not_found() {
        let reg = registry();
        let err = validate(&"".into(), &reg).unwrap_err();
        assert!(matches!(err, InvalidHandler::ClassNotFound { .. }));
    }
}

//! Access control gate
//!
//! Compares a caller's level against the descriptor requirement for a verb.
//! Runs before any cluster I/O so a denial never reaches a client.

use kubegate_common::{AccessLevel, Principal, Verb};
use std::sync::Arc;

use super::descriptors::{DescriptorRegistry, ResourceDescriptor};
use super::error::{GatewayError, GatewayResult};

#[derive(Debug, Clone)]
pub struct AccessGate {
    registry: Arc<DescriptorRegistry>,
}

impl AccessGate {
    pub fn new(registry: Arc<DescriptorRegistry>) -> Self {
        Self { registry }
    }

    /// Authorize `verb` on `kind`, returning the descriptor on success
    pub fn authorize(
        &self,
        principal: &Principal,
        kind: &str,
        verb: Verb,
    ) -> GatewayResult<&ResourceDescriptor> {
        let descriptor = self.registry.lookup(kind)?;

        let required = descriptor.access.required(verb).ok_or_else(|| {
            GatewayError::VerbUnsupportedForKind {
                kind: descriptor.kind.to_string(),
                verb,
            }
        })?;

        if !principal.has_level(required) {
            tracing::debug!(
                principal = %principal.id,
                kind = descriptor.kind,
                %verb,
                %required,
                actual = %principal.access_level,
                "Access denied"
            );
            return Err(GatewayError::InsufficientAccess {
                kind: descriptor.kind.to_string(),
                verb,
                required,
                actual: principal.access_level,
            });
        }

        Ok(descriptor)
    }

    /// Kind-independent check, used by the catalog endpoints
    pub fn require(&self, principal: &Principal, level: AccessLevel) -> GatewayResult<()> {
        if principal.has_level(level) {
            Ok(())
        } else {
            Err(GatewayError::InsufficientAccess {
                kind: "*".to_string(),
                verb: Verb::List,
                required: level,
                actual: principal.access_level,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubegate_common::ErrorKind;

    fn gate() -> AccessGate {
        AccessGate::new(Arc::new(DescriptorRegistry::builtin().unwrap()))
    }

    fn principal(level: AccessLevel) -> Principal {
        Principal::new(format!("{}-caller", level), level)
    }

    #[test]
    fn test_allow_iff_level_meets_requirement() {
        let gate = gate();
        let registry = DescriptorRegistry::builtin().unwrap();

        for descriptor in registry.iter() {
            for verb in Verb::ALL {
                for level in AccessLevel::ALL {
                    let outcome = gate.authorize(&principal(level), descriptor.kind, verb);
                    match descriptor.access.required(verb) {
                        None => assert_eq!(
                            outcome.unwrap_err().kind(),
                            ErrorKind::VerbUnsupportedForKind
                        ),
                        Some(required) if level >= required => {
                            assert_eq!(outcome.unwrap().kind, descriptor.kind)
                        }
                        Some(_) => assert_eq!(
                            outcome.unwrap_err().kind(),
                            ErrorKind::InsufficientAccess
                        ),
                    }
                }
            }
        }
    }

    #[test]
    fn test_allow_is_monotonic_in_level() {
        let gate = gate();
        let registry = DescriptorRegistry::builtin().unwrap();

        for descriptor in registry.iter() {
            for verb in Verb::ALL {
                let allowed: Vec<bool> = AccessLevel::ALL
                    .iter()
                    .map(|&level| gate.authorize(&principal(level), descriptor.kind, verb).is_ok())
                    .collect();
                // once allowed, every higher level stays allowed
                assert!(
                    allowed.windows(2).all(|w| !w[0] || w[1]),
                    "{} {} not monotonic: {:?}",
                    descriptor.kind,
                    verb,
                    allowed
                );
            }
        }
    }

    #[test]
    fn test_reader_denied_admin_delete() {
        let err = gate()
            .authorize(&principal(AccessLevel::Reader), "cluster_role", Verb::Delete)
            .unwrap_err();
        match err {
            GatewayError::InsufficientAccess { required, actual, .. } => {
                assert_eq!(required, AccessLevel::Admin);
                assert_eq!(actual, AccessLevel::Reader);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_denied() {
        let err = gate()
            .authorize(&principal(AccessLevel::Admin), "gizmo", Verb::Get)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKind);
    }

    #[test]
    fn test_unsupported_verb_reported_even_for_admin() {
        let err = gate()
            .authorize(&principal(AccessLevel::Admin), "volume_snapshot", Verb::Update)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VerbUnsupportedForKind);
    }

    #[test]
    fn test_require_level() {
        let gate = gate();
        assert!(gate.require(&principal(AccessLevel::User), AccessLevel::User).is_ok());
        assert!(gate.require(&principal(AccessLevel::Reader), AccessLevel::User).is_err());
    }
}

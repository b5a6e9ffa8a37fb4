//! The authorization (role/scope) gate.
//!
//! Pure decision logic over the endpoint's resolved policy: the principal
//! must hold at least one required role, and, when scopes are also
//! required, at least one required scope.

use crate::auth::principal::Principal;
use crate::routing::endpoint::Endpoint;

/// Returns true when the principal satisfies the endpoint's role/scope
/// requirements. Endpoints without a role requirement always pass.
pub fn authorize(principal: Option<&Principal>, endpoint: &Endpoint) -> bool {
    let Some(required_roles) = &endpoint.role_required else {
        return true;
    };
    let Some(principal) = principal else {
        return false;
    };

    if !required_roles.iter().any(|role| principal.roles.contains(role)) {
        return false;
    }

    match &endpoint.scope_required {
        Some(required_scopes) => required_scopes
            .iter()
            .any(|scope| principal.scopes.contains(scope)),
        None => true,
    }
}

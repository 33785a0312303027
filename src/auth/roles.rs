use super::IdentityContext;

/// Role code granting account administration.
pub const ADMIN: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

/// Allowed when `required` is empty or the identity holds any one of the
/// required role codes. "No roles" and "wrong roles" are both plain `Denied`.
pub fn authorize(ctx: &IdentityContext, required: &[&str]) -> Decision {
    if required.is_empty() || ctx.role_codes().any(|code| required.contains(&code)) {
        Decision::Allowed
    } else {
        Decision::Denied
    }
}

/// Router Module Index
///
/// Splits the routes by who can meaningfully use them. Neither group sits behind an
/// authentication layer: every handler resolves an optional `AuthUser` and the
/// Visibility Policy inside the workflow decides. That keeps "not allowed" and
/// "does not exist" on the same 404 path.

/// Read-only routes open to everyone (list, detail, health).
pub mod public;

/// Create/edit routes. Anonymous requests reach the handlers and are answered with 404.
pub mod authoring;

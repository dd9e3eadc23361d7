//! Procedure name rewriting.

/// Replace a literal prefix of a procedure name.
///
/// Returns `None` when `name` does not start with `prefix`. Matching is exact
/// and byte-wise.
///
/// ```
/// use connect_options::replace_prefix;
///
/// assert_eq!(
///     replace_prefix("grpc.health.v1.Health/Check", "grpc.health.v1", "connect.health.v1"),
///     Some("connect.health.v1.Health/Check".to_string())
/// );
/// assert_eq!(replace_prefix("pkg.Svc/Method", "PKG", "x"), None);
/// ```
pub fn replace_prefix(name: &str, prefix: &str, replacement: &str) -> Option<String> {
    let rest = name.strip_prefix(prefix)?;
    let mut rewritten = String::with_capacity(replacement.len() + rest.len());
    rewritten.push_str(replacement);
    rewritten.push_str(rest);
    Some(rewritten)
}

/// True when every space-delimited scope in `requested` is present in `available`.
pub fn validate_scopes(requested: &str, available: &str) -> bool {
    let available_scopes: Vec<&str> = available.split_whitespace().collect();

    requested
        .split_whitespace()
        .all(|s| available_scopes.contains(&s))
}

/// Trim, turn inner whitespace into underscores and strip underscores off both ends.
/// Runs of separators collapse into a single underscore.
pub fn sanitize_token(token: &str) -> String {
	token
		.split(|c: char| c.is_whitespace() || c == '_')
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join("_")
}

pub fn format_prefix(prefix: &str) -> String {
	sanitize_token(prefix).to_uppercase()
}

pub fn format_base(base_name: &str) -> String {
	sanitize_token(base_name)
}

pub fn format_suffix(suffix: &str) -> String {
	sanitize_token(suffix).to_lowercase()
}

/// `[PREFIX]_[base]_[suffix]_[index]`. Empty tokens are left out, the index is always last.
pub fn compose_name(prefix: &str, base_name: &str, suffix: &str, index: u32, padding: usize) -> String {
	let mut tokens = [format_prefix(prefix), format_base(base_name), format_suffix(suffix)]
		.into_iter()
		.filter(|token| !token.is_empty())
		.collect::<Vec<_>>();

	tokens.push(format!("{index:0width$}", width = padding.max(1)));
	tokens.join("_")
}

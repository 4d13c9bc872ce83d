/// A single `Accept-Encoding` token with its quality weight.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EncodingPreference {
    pub name: String,
    pub weight: f32,
}

/// Parse an `Accept-Encoding` header into codings ranked by descending
/// quality. A token without a stated weight defaults to 1.0; weight 0
/// means "not acceptable" and is discarded. Input order is preserved
/// on ties.
pub(crate) fn parse_accept_encoding(header: &str) -> Vec<EncodingPreference> {
    let mut preferences: Vec<EncodingPreference> = Vec::new();

    for part in header.split(',') {
        let part = part.trim();
        let name = part.split(';').next().unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }

        let weight = part
            .split(';')
            .nth(1)
            .and_then(|s| s.trim().strip_prefix("q="))
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(1.0);

        if weight == 0.0 {
            continue;
        }

        preferences.push(EncodingPreference {
            name: name.to_string(),
            weight,
        });
    }

    // Stable sort keeps input order for equal weights.
    preferences.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    preferences
}

/// `identity` and `*` are never acted upon.
pub(crate) fn is_inert(name: &str) -> bool {
    name == "*" || name.eq_ignore_ascii_case("identity")
}

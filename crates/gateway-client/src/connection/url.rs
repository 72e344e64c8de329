//! Gateway URL resolution

use std::fmt;

/// The gateway URL with protocol version and encoding applied, resolved once per process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayUrl(String);

impl GatewayUrl {
    /// Append `v` and `encoding` query parameters unless `base` already carries a version,
    /// in which case it is used verbatim.
    #[must_use]
    pub fn resolve(base: &str, version: u8, encoding: &str) -> Self {
        if has_query_param(base, "v") {
            return Self(base.to_string());
        }

        let separator = if base.contains('?') {
            if base.ends_with('?') || base.ends_with('&') {
                ""
            } else {
                "&"
            }
        } else {
            "?"
        };
        Self(format!("{base}{separator}v={version}&encoding={encoding}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn has_query_param(url: &str, name: &str) -> bool {
    url.split_once('?').is_some_and(|(_, query)| {
        query
            .split('&')
            .any(|pair| pair.split('=').next() == Some(name))
    })
}

impl fmt::Display for GatewayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

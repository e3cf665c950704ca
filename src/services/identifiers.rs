use std::str::FromStr;

use crate::error::ProvisionError;

/// How tenant values are treated before they are interpolated into SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Identifiers must be plain lowercase PostgreSQL identifiers; the password
    /// literal is escaped.
    #[default]
    Strict,
    /// Values are interpolated verbatim. Only for callers that already
    /// sanitise their input.
    Trusted,
}

impl FromStr for IdentifierPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(IdentifierPolicy::Strict),
            "trusted" => Ok(IdentifierPolicy::Trusted),
            other => Err(anyhow::anyhow!(
                "unknown identifier policy {other:?} (expected `strict` or `trusted`)"
            )),
        }
    }
}

impl IdentifierPolicy {
    /// Returns `value` ready to be embedded as an unquoted identifier.
    pub fn identifier<'a>(
        self,
        field: &'static str,
        value: &'a str,
    ) -> Result<&'a str, ProvisionError> {
        if self == IdentifierPolicy::Strict && !is_plain_identifier(value) {
            return Err(ProvisionError::InvalidIdentifier {
                field,
                value: value.to_owned(),
            });
        }
        Ok(value)
    }

    /// Returns `value` as a quoted string literal.
    ///
    /// Strict mode switches to an escape string (`E'...'`) whenever a backslash
    /// is present, so the literal means the same thing whatever
    /// `standard_conforming_strings` is set to.
    pub fn literal(self, value: &str) -> String {
        match self {
            IdentifierPolicy::Strict if value.contains('\\') => {
                format!("E'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
            }
            IdentifierPolicy::Strict => format!("'{}'", value.replace('\'', "''")),
            IdentifierPolicy::Trusted => format!("'{value}'"),
        }
    }
}

/// Lowercase letter or underscore first, then lowercase letters, digits,
/// underscores or dollar signs, at most 63 bytes (NAMEDATALEN - 1).
/// Uppercase is refused because the server folds unquoted names to lowercase.
fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    first_ok
        && s.len() <= 63
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
}

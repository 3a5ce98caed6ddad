//! Credential gating: decides whether a platform entry can be queried at all.

use crate::config::{CredentialField, PlatformConfig};
use crate::logging::mask_secret;
use serde_json::Value;

/// A token that passed validation, along with the field it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential<'a> {
    pub field: CredentialField,
    pub token: &'a str,
}

/// Returns the trimmed token when `value` is a non-blank JSON string.
pub fn usable_token(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// First usable credential among `fields`, in priority order.
pub fn usable_credential<'a>(
    config: &'a PlatformConfig,
    fields: &[CredentialField],
) -> Option<Credential<'a>> {
    for field in fields {
        if let Some(token) = usable_token(config.credential(*field)) {
            tracing::trace!(
                platform = %config.id,
                field = field.as_str(),
                token = %mask_secret(token),
                "using credential"
            );
            return Some(Credential {
                field: *field,
                token,
            });
        }
    }

    let checked: Vec<&str> = fields.iter().map(CredentialField::as_str).collect();
    tracing::trace!(
        platform = %config.id,
        fields = %checked.join(","),
        "no usable credential, all recognized fields empty or non-string"
    );
    None
}

/// Whether any of `fields` holds a usable credential.
pub fn is_valid(config: &PlatformConfig, fields: &[CredentialField]) -> bool {
    usable_credential(config, fields).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORDER: [CredentialField; 3] = [
        CredentialField::ApiKey,
        CredentialField::AuthToken,
        CredentialField::LoginToken,
    ];

    fn config_with(api_key: Option<Value>, login_token: Option<Value>) -> PlatformConfig {
        PlatformConfig {
            id: "deepseek".to_string(),
            api_key,
            login_token,
            enabled: true,
            ..PlatformConfig::default()
        }
    }

    #[test]
    fn test_absent_empty_and_non_string_are_invalid() {
        assert!(!is_valid(&config_with(None, None), &ORDER));
        assert!(!is_valid(&config_with(Some(json!("   ")), None), &ORDER));
        assert!(!is_valid(&config_with(Some(json!(42)), None), &ORDER));
        assert!(!is_valid(&config_with(Some(Value::Null), Some(json!(""))), &ORDER));
    }

    #[test]
    fn test_first_usable_field_wins() {
        let config = config_with(Some(json!("")), Some(json!(" sk-login ")));
        let credential = usable_credential(&config, &ORDER).unwrap();
        assert_eq!(credential.field, CredentialField::LoginToken);
        assert_eq!(credential.token, "sk-login");

        let both = config_with(Some(json!("sk-api")), Some(json!("sk-login")));
        assert_eq!(usable_credential(&both, &ORDER).unwrap().token, "sk-api");
    }

    #[test]
    fn test_fields_outside_the_list_are_ignored() {
        let config = config_with(Some(json!("sk-api")), None);
        assert!(!is_valid(&config, &[CredentialField::BalanceToken]));
    }
}

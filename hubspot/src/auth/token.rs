//! Payload de credenciais devolvido pelo token endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HubSpotError, Result};

/// JSON opaco do token endpoint (access_token, refresh_token, expires_in...).
///
/// Guardado e devolvido sem alterações; só `access_token` é interpretado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPayload(Value);

impl TokenPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Aceita a forma já serializada (o frontend envia as credenciais como string)
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(raw)?))
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Extrai o access token; ausente, vazio ou não-string é erro
    pub fn access_token(&self) -> Result<&str> {
        self.0
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or(HubSpotError::MissingAccessToken)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for TokenPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_token() {
        let payload = TokenPayload::new(json!({ "access_token": "tok1", "expires_in": 1800 }));
        assert_eq!(payload.access_token().unwrap(), "tok1");
    }

    #[test]
    fn test_missing_access_token() {
        for value in [
            json!({}),
            json!({ "access_token": "" }),
            json!({ "access_token": 12 }),
            json!({ "access_token": null }),
            json!("tok"),
        ] {
            let payload = TokenPayload::new(value);
            assert!(matches!(payload.access_token(), Err(HubSpotError::MissingAccessToken)));
        }
    }

    #[test]
    fn test_from_json_str() {
        let payload = TokenPayload::from_json_str(r#"{"access_token":"tok1"}"#).unwrap();
        assert_eq!(payload.as_value(), &json!({ "access_token": "tok1" }));

        let err = TokenPayload::from_json_str("not json").unwrap_err();
        assert_eq!(err.kind(), "invalid_payload");
    }

    #[test]
    fn test_serializes_transparently() {
        let payload = TokenPayload::new(json!({ "access_token": "tok1" }));
        assert_eq!(payload.to_json_string().unwrap(), r#"{"access_token":"tok1"}"#);
    }
}

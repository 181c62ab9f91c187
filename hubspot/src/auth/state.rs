//! State anti-CSRF do fluxo OAuth2
//!
//! O state viaja pelo navegador como base64url do JSON. Não há assinatura:
//! a única proteção é o nonce bater com o que foi guardado no store.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{HubSpotError, Result};

/// Bytes aleatórios do nonce
const NONCE_BYTES: usize = 32;

/// base64url com padding na saída e padding opcional na entrada
const STATE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    /// Nonce aleatório
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

impl OAuthState {
    /// Cria um state com nonce novo
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            state: generate_nonce(),
            user_id: user_id.into(),
            org_id: org_id.into(),
        }
    }

    /// Serializa para JSON (formato guardado no store)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Codifica para transporte na query string
    pub fn encode(&self) -> Result<String> {
        Ok(STATE_ENGINE.encode(self.to_json()?))
    }

    /// Decodifica o parâmetro `state` do callback.
    ///
    /// Qualquer falha vira `StateMismatch`, igual às demais falhas de validação.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = STATE_ENGINE.decode(encoded.trim()).map_err(|e| {
            tracing::debug!("state não é base64url válido: {}", e);
            HubSpotError::StateMismatch
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!("state não é um JSON válido: {}", e);
            HubSpotError::StateMismatch
        })
    }

    /// Compara o nonce com o state guardado
    pub fn matches(&self, stored: &OAuthState) -> bool {
        self.state == stored.state
    }
}

/// Nonce de 32 bytes de um CSPRNG, em base64url sem padding
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

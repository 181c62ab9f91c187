//! Parâmetros do redirect OAuth2 e página de retorno do popup

use serde::Deserialize;

/// Query string recebida no callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code (sucesso)
    pub code: Option<String>,
    /// State codificado, devolvido sem alterações pelo provedor
    pub state: Option<String>,
    /// Erro retornado pela HubSpot (ex.: `access_denied`)
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Mensagem de erro do provedor, preferindo a descrição
    pub fn provider_error(&self) -> Option<String> {
        let error = self.error.as_deref().filter(|e| !e.is_empty())?;

        Some(
            self.error_description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(error)
                .to_string(),
        )
    }
}

/// Fases do callback, registradas em debug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPhase {
    AwaitingRedirect,
    StateValidated,
    TokenExchanged,
    Done,
    Failed,
}

impl CallbackPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingRedirect => "awaiting_redirect",
            Self::StateValidated => "state_validated",
            Self::TokenExchanged => "token_exchanged",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// Página mínima que só fecha o popup que hospedou o fluxo
pub const CLOSE_WINDOW_PAGE: &str = r#"
<html>
    <script>
        window.close();
    </script>
</html>
"#;

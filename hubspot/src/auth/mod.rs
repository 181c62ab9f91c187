pub mod callback;
pub mod oauth;
pub mod state;
pub mod token;

pub use callback::{CallbackParams, CallbackPhase, CLOSE_WINDOW_PAGE};
pub use oauth::HubSpotOAuth;
pub use state::OAuthState;
pub use token::TokenPayload;

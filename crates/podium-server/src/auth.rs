use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use podium_core::caller::{Caller, Identity};

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Mints and verifies the opaque bearer tokens handed out once the external
/// login flow has produced an [`Identity`].
///
/// Token format: `hex(json(identity)).hex(hmac_sha256(json(identity)))`.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Arc<[u8]>,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }

    /// A signer with a freshly generated key. Tokens it issues die with the
    /// process.
    pub fn random() -> Self {
        let key: [u8; 32] = rand::random();
        Self::new(key)
    }

    fn mac(&self) -> Option<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(&self.secret).ok()
    }

    /// Issue a session token for a logged-in player.
    pub fn issue(&self, identity: &Identity) -> Option<String> {
        let payload = serde_json::to_vec(identity).ok()?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let sig = mac.finalize().into_bytes();
        Some(format!("{}.{}", hex::encode(&payload), hex::encode(sig)))
    }

    /// Verify a token and recover its identity. Any malformed, tampered or
    /// foreign token yields `None`.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let (payload_hex, sig_hex) = token.split_once('.')?;
        let payload = hex::decode(payload_hex).ok()?;
        let sig = hex::decode(sig_hex).ok()?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&sig).ok()?;

        let identity: Identity = serde_json::from_slice(&payload).ok()?;
        if identity.player_id.is_empty() {
            return None;
        }
        Some(identity)
    }
}

/// The authentication gate: who is calling, based on the `Authorization:
/// Bearer` header.
pub fn current_caller(headers: &HeaderMap, signer: &SessionSigner) -> Caller {
    let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    else {
        return Caller::Anonymous;
    };

    match signer.verify(token.trim()) {
        Some(identity) => Caller::Authenticated(identity),
        None => {
            tracing::warn!("Rejected invalid session token");
            Caller::Anonymous
        },
    }
}

/// The credentials of a `Bearer` authorization value. The scheme name is
/// case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

/// Middleware that resolves the caller once per request and stores it in the
/// request extensions. It never rejects: handlers that need an authenticated
/// caller decide that themselves.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = current_caller(request.headers(), &state.sessions);
    request.extensions_mut().insert(caller);
    next.run(request).await
}

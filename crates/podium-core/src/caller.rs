use serde::{Deserialize, Serialize};

/// The identity handed over by the external login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub player_id: String,
    pub display_name: String,
}

/// Who is making a request, as far as the authentication gate can tell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    Authenticated(Identity),
    #[default]
    Anonymous,
}

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }
}

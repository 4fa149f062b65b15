use serde::{Deserialize, Serialize};

/// Claims carried by an access token. `sub` is the user id; `exp`/`iat` are
/// seconds since the Unix epoch, validated by `jsonwebtoken` on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AccessClaims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

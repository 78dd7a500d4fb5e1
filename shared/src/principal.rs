use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;

/// Header carrying the verified identity, set by the authentication proxy.
pub const SUBJECT_HEADER: &str = "X-Auth-Subject";
/// Header carrying the verified roles as a comma-separated list.
pub const ROLES_HEADER: &str = "X-Auth-Roles";

/// An authenticated caller. Credentials are checked upstream; the identity is
/// only used as the one-vote-per-election key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub identity: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<R: Into<String>>(identity: impl Into<String>, roles: impl IntoIterator<Item = R>) -> Self {
        Self {
            identity: identity.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `None` when no usable subject is present.
    pub fn from_headers(subject: Option<&str>, roles: Option<&str>) -> Option<Self> {
        let identity = subject.map(str::trim).filter(|s| !s.is_empty())?;
        let roles = roles
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty());
        Some(Self::new(identity, roles))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::http::Status;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MissingPrincipal;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for Principal {
        type Error = MissingPrincipal;

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let headers = req.headers();
            match Principal::from_headers(headers.get_one(SUBJECT_HEADER), headers.get_one(ROLES_HEADER)) {
                Some(principal) => Outcome::Success(principal),
                None => Outcome::Error((Status::Unauthorized, MissingPrincipal)),
            }
        }
    }
}

#[cfg(feature = "backend")]
pub use backend_impl::MissingPrincipal;

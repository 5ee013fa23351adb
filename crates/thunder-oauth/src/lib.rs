//! OAuth application validation engine.
//!
//! Stateless predicates and transforms over a processed OAuth application
//! configuration, consumed by the authorization endpoints and the
//! application service:
//!
//! - [`redirect`]: strict redirect-URI validation (byte equality against the
//!   registered list, fragments rejected)
//! - [`credentials`]: client-secret thumbprints with constant-time
//!   comparison
//! - [`pkce`]: code-challenge derivation and verifier checking (RFC 7636)
//! - [`validator`]: grant/response-type/auth-method allow-lists and the
//!   PKCE-requirement predicate
//! - [`authorize`]: ordered validation of a whole authorization request
//!
//! Everything here is side-effect free and safe to call concurrently.

pub mod authorize;
pub mod credentials;
pub mod pkce;
pub mod redirect;
pub mod validator;

pub use authorize::{validate_authorization_request, AuthorizationRequest, AuthorizeError};
pub use redirect::{validate_redirect_uri, RedirectUriError};
pub use validator::OAuthAppConfigExt;

//! Domain records for organization units, applications, and token
//! configuration.

mod application;
mod ou;
mod token;

pub use application::{
    Application, Certificate, CertificateType, InboundAuthConfig, InboundAuthType,
    OAuthAppConfig, OAuthAppConfigRequest,
};
pub use ou::{OrganizationUnit, OrganizationUnitBasic};
pub use token::{AccessTokenConfig, IdTokenConfig, OAuthTokenConfig, TokenConfig};

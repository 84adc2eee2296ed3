//! Cloud Service APIs
//!
//! One async trait per cloud service, with small typed request and response
//! models. Handlers only ever talk to these traits; the simulator in
//! [`crate::cloud`] implements all of them.

pub mod dax;
pub mod ec2;
pub mod fsx;
pub mod gamelift;
pub mod route53resolver;
pub mod securityhub;
pub mod servicecatalog;
pub mod ses;

pub use dax::DaxApi;
pub use ec2::Ec2Api;
pub use fsx::FsxApi;
pub use gamelift::GameLiftApi;
pub use route53resolver::Route53ResolverApi;
pub use securityhub::SecurityHubApi;
pub use servicecatalog::ServiceCatalogApi;
pub use ses::SesApi;

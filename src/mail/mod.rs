pub mod message;
pub mod requests;
pub mod service;
pub mod templates;
pub mod transport;

pub use message::{EmailAddress, MailMessage};
pub use requests::{ContactSupportRequest, ReportPackageRequest};
pub use service::MailService;
pub use transport::{
    transport_from_config, HttpRelayTransport, MailTransport, PickupDirectoryTransport,
};

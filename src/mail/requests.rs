use crate::entities::{Package, User};
use crate::mail::message::EmailAddress;

/// A package report raised from the gallery UI, either by an outside
/// user (abuse) or by one of the package's own owners.
#[derive(Debug, Clone)]
pub struct ReportPackageRequest {
    pub package: Package,
    /// Address of the person filing the report
    pub from_address: EmailAddress,
    pub reason: String,
    pub message: String,
    /// Free-text sign-off the reporter typed
    pub signature: String,
    /// The signed-in account, when the reporter was signed in
    pub requesting_user: Option<User>,
    pub package_url: String,
    pub already_contacted_owner: bool,
    pub copy_sender: bool,
}

/// A support request not tied to any package
#[derive(Debug, Clone)]
pub struct ContactSupportRequest {
    pub requesting_user: User,
    pub from_address: EmailAddress,
    pub reason: String,
    pub message: String,
    pub copy_sender: bool,
}

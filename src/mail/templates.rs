//! Subject and body templates for every notification the gallery
//! sends. Wording lives here, recipient logic lives in the service.
//!
//! Placeholders use `{Name}` form; `render` leaves unknown
//! placeholders intact so a template change cannot silently eat text.

/// How long a password reset link stays valid
pub const PASSWORD_RESET_EXPIRATION_HOURS: u32 = 24;

/// Appended to the subject of a sender copy
pub const SENDER_COPY_SUFFIX: &str = " [Sender Copy]";

pub const BODY_SENDER_COPY: &str = r#"You sent the following message via {GalleryName}:

{Body}"#;

pub const SUBJECT_REPORT_ABUSE: &str =
    "[{GalleryName}] Support Request for '{PackageId}' version {PackageVersion} (Reason: {Reason})";
pub const BODY_REPORT_ABUSE: &str = r#"Email: {ReporterEmail}
Signature: {Signature}
Package: {PackageId} {PackageVersion}
{PackageUrl}
User: {User}
Reason: {Reason}
Has the package owner been contacted: {AlreadyContactedOwner}

Message:
{Message}"#;

pub const SUBJECT_REPORT_MY_PACKAGE: &str =
    "[{GalleryName}] Owner Support Request for '{PackageId}' version {PackageVersion} (Reason: {Reason})";
pub const BODY_REPORT_MY_PACKAGE: &str = r#"Email: {ReporterEmail}
Package: {PackageId} {PackageVersion}
{PackageUrl}
Owner: {User}
Reason: {Reason}

Message:
{Message}"#;

pub const SUBJECT_CONTACT_OWNERS: &str =
    "[{GalleryName}] Message for owners of the package '{PackageId}'";
pub const BODY_CONTACT_OWNERS: &str = r#"User {SenderEmail} sends the following message to the owners of package '{PackageId}':

{Message}

To stop receiving contact emails, sign in to {GalleryName} and change your email notification settings: {SettingsUrl}"#;

pub const SUBJECT_NEW_ACCOUNT: &str = "[{GalleryName}] Please verify your account";
pub const BODY_NEW_ACCOUNT: &str = r#"Thank you for registering with {GalleryName}.
We can't wait to see what packages you publish.

So we can be sure to contact you, please verify your email address using the following link:

{ConfirmationUrl}"#;

pub const SUBJECT_EMAIL_CHANGE_CONFIRMATION: &str =
    "[{GalleryName}] Please verify your new email address";
pub const BODY_EMAIL_CHANGE_CONFIRMATION: &str = r#"You recently changed the email address on your {GalleryName} account.

To verify your new email address, please use the following link:

{ConfirmationUrl}"#;

pub const SUBJECT_EMAIL_CHANGED_NOTICE: &str = "[{GalleryName}] Recent changes to your account";
pub const BODY_EMAIL_CHANGED_NOTICE: &str = r#"Hi {User},

The email address associated with your {GalleryName} account was recently changed from {OldEmail} to {NewEmail}.

If you did not make this change, please reply to this message so we can look into it."#;

pub const SUBJECT_PASSWORD_FORGOT: &str = "[{GalleryName}] Please reset your password";
pub const BODY_PASSWORD_FORGOT: &str = r#"The word on the wire is you lost your password. Sorry to hear it!

Click the following link within the next {Hours} hours to reset your password:

{ResetUrl}"#;

pub const SUBJECT_PASSWORD_SET: &str = "[{GalleryName}] Please set your password";
pub const BODY_PASSWORD_SET: &str = r#"Your account now supports signing in with a password.

Click the following link within the next {Hours} hours to choose one:

{ResetUrl}"#;

pub const SUBJECT_OWNER_REQUEST: &str =
    "[{GalleryName}] The user '{RequestingUser}' wants to add you as an owner of the package '{PackageId}'";
pub const BODY_OWNER_REQUEST: &str = r#"The user '{RequestingUser}' wants to add you as an owner of the package '{PackageId}'.

If you do not want to be listed as an owner, simply ignore this message.
To accept the request, use the following link:

{ConfirmationUrl}"#;

pub const SUBJECT_OWNER_REMOVED: &str =
    "[{GalleryName}] The user '{RequestingUser}' removed you as an owner of the package '{PackageId}'";
pub const BODY_OWNER_REMOVED: &str = r#"The user '{RequestingUser}' removed you as an owner of the package '{PackageId}'.

If this was done in error, please contact the remaining owners or gallery support."#;

pub const SUBJECT_CREDENTIAL_ADDED: &str = "[{GalleryName}] {CredentialName} added to your account";
pub const BODY_CREDENTIAL_ADDED: &str = r#"A {CredentialName} was added to your {GalleryName} account and can now be used to sign in.

If you did not request this change, please reply to this message."#;

pub const SUBJECT_CREDENTIAL_REMOVED: &str =
    "[{GalleryName}] {CredentialName} removed from your account";
pub const BODY_CREDENTIAL_REMOVED: &str = r#"A {CredentialName} was removed from your {GalleryName} account and can no longer be used to sign in.

If you did not request this change, please reply to this message."#;

pub const SUBJECT_CONTACT_SUPPORT: &str = "[{GalleryName}] Support Request (Reason: {Reason})";
pub const BODY_CONTACT_SUPPORT: &str = r#"Email: {ReporterEmail}
User: {User}
Reason: {Reason}

Message:
{Message}"#;

pub const SUBJECT_PACKAGE_ADDED: &str =
    "[{GalleryName}] Package published - {PackageId} {PackageVersion}";
pub const BODY_PACKAGE_ADDED: &str = r#"The package {PackageId} {PackageVersion} was just published on {GalleryName}:

{PackageUrl}

If this was not intended, contact support: {SupportUrl}
To stop receiving publish notices, change your email notification settings: {SettingsUrl}"#;

/// Substitute `{Name}` placeholders; unknown placeholders stay as-is
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in values {
        rendered = rendered.replace(&format!("{{{}}}", name), value);
    }
    rendered
}

use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

use crate::config::{AppConfiguration, ConfigurationService};
use crate::di::traits::{CredentialDescriber, ErrorReporter};
use crate::entities::{Credential, Package, PackageRegistration, User};
use crate::mail::message::{EmailAddress, MailMessage};
use crate::mail::requests::{ContactSupportRequest, ReportPackageRequest};
use crate::mail::templates;
use crate::mail::transport::{transport_from_config, MailTransport};
use gantry_core::GantryResult;

/// Sends every notification the gallery produces.
///
/// Operations render and gate recipients synchronously, then hand the
/// message to a spawned send task: a slow or broken transport never
/// blocks the caller. A failed delivery is reported through the
/// `ErrorReporter`, once per operation. The transport is built from
/// configuration on the first send.
pub struct MailService {
    config: Arc<ConfigurationService>,
    describer: Arc<dyn CredentialDescriber>,
    reporter: Arc<dyn ErrorReporter>,
    transport: Arc<OnceCell<Arc<dyn MailTransport>>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

fn gallery_owner(config: &AppConfiguration) -> EmailAddress {
    EmailAddress::new(&config.gallery.display_name, &config.gallery.owner_address)
}

fn no_reply(config: &AppConfiguration) -> EmailAddress {
    EmailAddress::new(&config.gallery.display_name, &config.gallery.no_reply_address)
}

/// The sender copy goes to the primary's reply-to address and embeds
/// the primary body verbatim.
fn sender_copy_of(primary: &MailMessage, gallery_name: &str) -> Option<MailMessage> {
    let recipient = primary.reply_to.first()?.clone();
    Some(MailMessage {
        from: primary.from.clone(),
        to: vec![recipient],
        cc: Vec::new(),
        reply_to: Vec::new(),
        subject: format!("{}{}", primary.subject, templates::SENDER_COPY_SUFFIX),
        body: templates::render(
            templates::BODY_SENDER_COPY,
            &[("GalleryName", gallery_name), ("Body", primary.body.as_str())],
        ),
    })
}

impl MailService {
    pub fn new(
        config: Arc<ConfigurationService>,
        describer: Arc<dyn CredentialDescriber>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            config,
            describer,
            reporter,
            transport: Arc::new(OnceCell::new()),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Use a pre-built transport instead of building one from
    /// configuration on first send.
    pub fn new_with_transport(
        config: Arc<ConfigurationService>,
        describer: Arc<dyn CredentialDescriber>,
        reporter: Arc<dyn ErrorReporter>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            config,
            describer,
            reporter,
            transport: Arc::new(OnceCell::new_with(Some(transport))),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub async fn report_abuse(&self, request: &ReportPackageRequest) -> GantryResult<()> {
        let config = self.config.current();
        let subject = templates::render(
            templates::SUBJECT_REPORT_ABUSE,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("PackageId", request.package.id()),
                ("PackageVersion", request.package.version.as_str()),
                ("Reason", request.reason.as_str()),
            ],
        );
        let user = request
            .requesting_user
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("anonymous");
        let body = templates::render(
            templates::BODY_REPORT_ABUSE,
            &[
                ("ReporterEmail", request.from_address.address.as_str()),
                ("Signature", request.signature.as_str()),
                ("PackageId", request.package.id()),
                ("PackageVersion", request.package.version.as_str()),
                ("PackageUrl", request.package_url.as_str()),
                ("User", user),
                ("Reason", request.reason.as_str()),
                (
                    "AlreadyContactedOwner",
                    if request.already_contacted_owner { "Yes" } else { "No" },
                ),
                ("Message", request.message.as_str()),
            ],
        );
        let owner = gallery_owner(&config);
        let mut builder = MailMessage::builder(owner.clone())
            .to(owner)
            .reply_to(request.from_address.clone())
            .subject(subject)
            .body(body);
        if request.copy_sender {
            // The gallery is already the receiver, so the reporter is
            // kept on the same thread with a CC instead of a copy.
            builder = builder.cc(request.from_address.clone());
        }
        self.dispatch(&config, builder.build()?, false);
        Ok(())
    }

    pub async fn report_my_package(&self, request: &ReportPackageRequest) -> GantryResult<()> {
        let config = self.config.current();
        let subject = templates::render(
            templates::SUBJECT_REPORT_MY_PACKAGE,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("PackageId", request.package.id()),
                ("PackageVersion", request.package.version.as_str()),
                ("Reason", request.reason.as_str()),
            ],
        );
        let user = request
            .requesting_user
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("anonymous");
        let body = templates::render(
            templates::BODY_REPORT_MY_PACKAGE,
            &[
                ("ReporterEmail", request.from_address.address.as_str()),
                ("PackageId", request.package.id()),
                ("PackageVersion", request.package.version.as_str()),
                ("PackageUrl", request.package_url.as_str()),
                ("User", user),
                ("Reason", request.reason.as_str()),
                ("Message", request.message.as_str()),
            ],
        );
        let owner = gallery_owner(&config);
        let mut builder = MailMessage::builder(owner.clone())
            .to(owner)
            .reply_to(request.from_address.clone())
            .subject(subject)
            .body(body);
        if request.copy_sender {
            builder = builder.cc(request.from_address.clone());
        }
        self.dispatch(&config, builder.build()?, false);
        Ok(())
    }

    /// Message to the owners who allow being contacted. Skipped
    /// silently when no owner does.
    pub async fn send_contact_owners_message(
        &self,
        from: &EmailAddress,
        registration: &PackageRegistration,
        message: &str,
        settings_url: &str,
        copy_sender: bool,
    ) -> GantryResult<()> {
        let config = self.config.current();
        let recipients: Vec<EmailAddress> = registration
            .owners
            .iter()
            .filter(|owner| owner.email_allowed)
            .filter_map(EmailAddress::from_user)
            .collect();
        if recipients.is_empty() {
            return Ok(());
        }
        let subject = templates::render(
            templates::SUBJECT_CONTACT_OWNERS,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("PackageId", registration.id.as_str()),
            ],
        );
        let body = templates::render(
            templates::BODY_CONTACT_OWNERS,
            &[
                ("SenderEmail", from.address.as_str()),
                ("PackageId", registration.id.as_str()),
                ("Message", message),
                ("GalleryName", config.gallery.display_name.as_str()),
                ("SettingsUrl", settings_url),
            ],
        );
        let mail = MailMessage::builder(gallery_owner(&config))
            .to_all(recipients)
            .reply_to(from.clone())
            .subject(subject)
            .body(body)
            .build()?;
        self.dispatch(&config, mail, copy_sender);
        Ok(())
    }

    pub async fn send_new_account_email(
        &self,
        user: &User,
        confirmation_url: &str,
    ) -> GantryResult<()> {
        let config = self.config.current();
        let to = match EmailAddress::from_user(user) {
            Some(to) => to,
            None => return Ok(()),
        };
        let subject = templates::render(
            templates::SUBJECT_NEW_ACCOUNT,
            &[("GalleryName", config.gallery.display_name.as_str())],
        );
        let body = templates::render(
            templates::BODY_NEW_ACCOUNT,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("ConfirmationUrl", confirmation_url),
            ],
        );
        let mail = MailMessage::builder(no_reply(&config))
            .to(to)
            .subject(subject)
            .body(body)
            .build()?;
        self.dispatch(&config, mail, false);
        Ok(())
    }

    /// Verification mail to a newly entered, not yet confirmed address
    pub async fn send_email_change_confirmation(
        &self,
        new_address: &EmailAddress,
        confirmation_url: &str,
    ) -> GantryResult<()> {
        let config = self.config.current();
        let subject = templates::render(
            templates::SUBJECT_EMAIL_CHANGE_CONFIRMATION,
            &[("GalleryName", config.gallery.display_name.as_str())],
        );
        let body = templates::render(
            templates::BODY_EMAIL_CHANGE_CONFIRMATION,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("ConfirmationUrl", confirmation_url),
            ],
        );
        let mail = MailMessage::builder(no_reply(&config))
            .to(new_address.clone())
            .subject(subject)
            .body(body)
            .build()?;
        self.dispatch(&config, mail, false);
        Ok(())
    }

    /// Heads-up to the address that just lost control of the account
    pub async fn send_email_change_notice_to_previous_address(
        &self,
        user: &User,
        old_address: &str,
    ) -> GantryResult<()> {
        let config = self.config.current();
        let new_address = user.email_address.as_deref().unwrap_or_default();
        let subject = templates::render(
            templates::SUBJECT_EMAIL_CHANGED_NOTICE,
            &[("GalleryName", config.gallery.display_name.as_str())],
        );
        let body = templates::render(
            templates::BODY_EMAIL_CHANGED_NOTICE,
            &[
                ("User", user.username.as_str()),
                ("GalleryName", config.gallery.display_name.as_str()),
                ("OldEmail", old_address),
                ("NewEmail", new_address),
            ],
        );
        let mail = MailMessage::builder(no_reply(&config))
            .to(EmailAddress::new(&user.username, old_address))
            .subject(subject)
            .body(body)
            .build()?;
        self.dispatch(&config, mail, false);
        Ok(())
    }

    pub async fn send_password_reset_instructions(
        &self,
        user: &User,
        reset_url: &str,
        forgot_password: bool,
    ) -> GantryResult<()> {
        let config = self.config.current();
        let to = match EmailAddress::from_user(user) {
            Some(to) => to,
            None => return Ok(()),
        };
        let (subject_template, body_template) = if forgot_password {
            (templates::SUBJECT_PASSWORD_FORGOT, templates::BODY_PASSWORD_FORGOT)
        } else {
            (templates::SUBJECT_PASSWORD_SET, templates::BODY_PASSWORD_SET)
        };
        let hours = templates::PASSWORD_RESET_EXPIRATION_HOURS.to_string();
        let subject = templates::render(
            subject_template,
            &[("GalleryName", config.gallery.display_name.as_str())],
        );
        let body = templates::render(
            body_template,
            &[("Hours", hours.as_str()), ("ResetUrl", reset_url)],
        );
        let mail = MailMessage::builder(no_reply(&config))
            .to(to)
            .subject(subject)
            .body(body)
            .build()?;
        self.dispatch(&config, mail, false);
        Ok(())
    }

    /// Skipped when the prospective owner does not allow gallery mail
    pub async fn send_package_owner_request(
        &self,
        from_user: &User,
        to_user: &User,
        registration: &PackageRegistration,
        confirmation_url: &str,
    ) -> GantryResult<()> {
        let config = self.config.current();
        if !to_user.email_allowed {
            return Ok(());
        }
        let to = match EmailAddress::from_user(to_user) {
            Some(to) => to,
            None => return Ok(()),
        };
        let subject = templates::render(
            templates::SUBJECT_OWNER_REQUEST,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("RequestingUser", from_user.username.as_str()),
                ("PackageId", registration.id.as_str()),
            ],
        );
        let body = templates::render(
            templates::BODY_OWNER_REQUEST,
            &[
                ("RequestingUser", from_user.username.as_str()),
                ("PackageId", registration.id.as_str()),
                ("ConfirmationUrl", confirmation_url),
            ],
        );
        let mut builder = MailMessage::builder(no_reply(&config))
            .to(to)
            .subject(subject)
            .body(body);
        if let Some(reply) = EmailAddress::from_user(from_user) {
            builder = builder.reply_to(reply);
        }
        self.dispatch(&config, builder.build()?, false);
        Ok(())
    }

    /// Same gate as the owner request
    pub async fn send_package_owner_removed_notice(
        &self,
        from_user: &User,
        to_user: &User,
        registration: &PackageRegistration,
    ) -> GantryResult<()> {
        let config = self.config.current();
        if !to_user.email_allowed {
            return Ok(());
        }
        let to = match EmailAddress::from_user(to_user) {
            Some(to) => to,
            None => return Ok(()),
        };
        let subject = templates::render(
            templates::SUBJECT_OWNER_REMOVED,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("RequestingUser", from_user.username.as_str()),
                ("PackageId", registration.id.as_str()),
            ],
        );
        let body = templates::render(
            templates::BODY_OWNER_REMOVED,
            &[
                ("RequestingUser", from_user.username.as_str()),
                ("PackageId", registration.id.as_str()),
            ],
        );
        let mut builder = MailMessage::builder(no_reply(&config))
            .to(to)
            .subject(subject)
            .body(body);
        if let Some(reply) = EmailAddress::from_user(from_user) {
            builder = builder.reply_to(reply);
        }
        self.dispatch(&config, builder.build()?, false);
        Ok(())
    }

    pub async fn send_credential_added_notice(
        &self,
        user: &User,
        credential: &Credential,
    ) -> GantryResult<()> {
        self.send_credential_notice(
            user,
            credential,
            templates::SUBJECT_CREDENTIAL_ADDED,
            templates::BODY_CREDENTIAL_ADDED,
        )
        .await
    }

    pub async fn send_credential_removed_notice(
        &self,
        user: &User,
        credential: &Credential,
    ) -> GantryResult<()> {
        self.send_credential_notice(
            user,
            credential,
            templates::SUBJECT_CREDENTIAL_REMOVED,
            templates::BODY_CREDENTIAL_REMOVED,
        )
        .await
    }

    /// Credential notices only go to confirmed accounts. Providers
    /// with a sign-in surface are named by their account noun.
    async fn send_credential_notice(
        &self,
        user: &User,
        credential: &Credential,
        subject_template: &str,
        body_template: &str,
    ) -> GantryResult<()> {
        let config = self.config.current();
        if !user.is_confirmed() {
            return Ok(());
        }
        let to = match EmailAddress::from_user(user) {
            Some(to) => to,
            None => return Ok(()),
        };
        let description = self.describer.describe(credential);
        let credential_name = description.display_name();
        let subject = templates::render(
            subject_template,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("CredentialName", credential_name),
            ],
        );
        let body = templates::render(
            body_template,
            &[
                ("CredentialName", credential_name),
                ("GalleryName", config.gallery.display_name.as_str()),
            ],
        );
        let mail = MailMessage::builder(gallery_owner(&config))
            .to(to)
            .subject(subject)
            .body(body)
            .build()?;
        self.dispatch(&config, mail, false);
        Ok(())
    }

    pub async fn send_contact_support_email(
        &self,
        request: &ContactSupportRequest,
    ) -> GantryResult<()> {
        let config = self.config.current();
        let subject = templates::render(
            templates::SUBJECT_CONTACT_SUPPORT,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("Reason", request.reason.as_str()),
            ],
        );
        let body = templates::render(
            templates::BODY_CONTACT_SUPPORT,
            &[
                ("ReporterEmail", request.from_address.address.as_str()),
                ("User", request.requesting_user.username.as_str()),
                ("Reason", request.reason.as_str()),
                ("Message", request.message.as_str()),
            ],
        );
        let owner = gallery_owner(&config);
        let mut builder = MailMessage::builder(owner.clone())
            .to(owner)
            .reply_to(request.from_address.clone())
            .subject(subject)
            .body(body);
        if request.copy_sender {
            builder = builder.cc(request.from_address.clone());
        }
        self.dispatch(&config, builder.build()?, false);
        Ok(())
    }

    /// Publish notice to the owners who opted in. The contact-mail
    /// preference does not apply here, only `notify_package_pushed`.
    pub async fn send_package_added_notice(
        &self,
        package: &Package,
        package_url: &str,
        support_url: &str,
        settings_url: &str,
    ) -> GantryResult<()> {
        let config = self.config.current();
        let recipients: Vec<EmailAddress> = package
            .registration
            .owners
            .iter()
            .filter(|owner| owner.notify_package_pushed)
            .filter_map(EmailAddress::from_user)
            .collect();
        if recipients.is_empty() {
            return Ok(());
        }
        let subject = templates::render(
            templates::SUBJECT_PACKAGE_ADDED,
            &[
                ("GalleryName", config.gallery.display_name.as_str()),
                ("PackageId", package.id()),
                ("PackageVersion", package.version.as_str()),
            ],
        );
        let body = templates::render(
            templates::BODY_PACKAGE_ADDED,
            &[
                ("PackageId", package.id()),
                ("PackageVersion", package.version.as_str()),
                ("GalleryName", config.gallery.display_name.as_str()),
                ("PackageUrl", package_url),
                ("SupportUrl", support_url),
                ("SettingsUrl", settings_url),
            ],
        );
        let mail = MailMessage::builder(no_reply(&config))
            .to_all(recipients)
            .subject(subject)
            .body(body)
            .build()?;
        self.dispatch(&config, mail, false);
        Ok(())
    }

    /// Fire and forget: the caller never observes delivery. The task
    /// initializes the transport on first use, sends the primary and,
    /// when requested, a sender copy. A primary failure skips the copy
    /// and both failure kinds produce exactly one reporter entry.
    fn dispatch(&self, config: &Arc<AppConfiguration>, message: MailMessage, copy_sender: bool) {
        let copy = if copy_sender {
            sender_copy_of(&message, &config.gallery.display_name)
        } else {
            None
        };
        let transport = Arc::clone(&self.transport);
        let reporter = Arc::clone(&self.reporter);
        let config = Arc::clone(config);
        let handle = tokio::spawn(async move {
            let transport = match transport
                .get_or_try_init(|| async { transport_from_config(&config) })
                .await
            {
                Ok(transport) => Arc::clone(transport),
                Err(e) => {
                    reporter
                        .report(
                            "mail.transport",
                            &format!("failed to initialize mail transport: {}", e),
                        )
                        .await;
                    return;
                }
            };
            if let Err(e) = transport.send(&message).await {
                reporter
                    .report(
                        "mail.send",
                        &format!("failed to send '{}': {}", message.subject, e),
                    )
                    .await;
                return;
            }
            if let Some(copy) = copy {
                if let Err(e) = transport.send(&copy).await {
                    reporter
                        .report(
                            "mail.send",
                            &format!("failed to send '{}': {}", copy.subject, e),
                        )
                        .await;
                }
            }
        });
        match self.in_flight.lock() {
            Ok(mut guard) => guard.push(handle),
            Err(poisoned) => poisoned.into_inner().push(handle),
        }
    }

    /// Await every spawned send. Called at shutdown so late sends are
    /// not torn down with the runtime; also what tests synchronize on.
    pub async fn drain(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut guard = match self.in_flight.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticationService;
    use crate::config::ExternalProvider;
    use crate::di::mocks::{MockErrorReporter, MockMailTransport};
    use crate::entities::credential_kinds;

    fn provider() -> ExternalProvider {
        ExternalProvider {
            id: "github".to_string(),
            caption: "GitHub".to_string(),
            account_noun: "GitHub account".to_string(),
        }
    }

    fn service(
        transport: &Arc<MockMailTransport>,
        reporter: &Arc<MockErrorReporter>,
    ) -> MailService {
        let config = Arc::new(ConfigurationService::from_snapshot(
            AppConfiguration::default(),
        ));
        let describer: Arc<dyn CredentialDescriber> =
            Arc::new(AuthenticationService::new(vec![provider()]));
        MailService::new_with_transport(
            config,
            describer,
            Arc::clone(reporter) as Arc<dyn ErrorReporter>,
            Arc::clone(transport) as Arc<dyn MailTransport>,
        )
    }

    fn owners_registration() -> PackageRegistration {
        let allowed = User::new("allowed", "allowed@example.com");
        let mut opted_out = User::new("optedout", "optedout@example.com");
        opted_out.email_allowed = false;
        PackageRegistration::with_owners("urn.core", vec![allowed, opted_out])
    }

    fn report_request(copy_sender: bool) -> ReportPackageRequest {
        ReportPackageRequest {
            package: Package::new(PackageRegistration::new("urn.core"), "1.0.0"),
            from_address: EmailAddress::new("Reporter", "reporter@example.com"),
            reason: "Contains malware".to_string(),
            message: "Please take this down.".to_string(),
            signature: "A concerned user".to_string(),
            requesting_user: Some(User::new("reporter", "reporter@example.com")),
            package_url: "http://localhost:8080/packages/urn.core/1.0.0".to_string(),
            already_contacted_owner: true,
            copy_sender,
        }
    }

    #[tokio::test]
    async fn test_contact_owners_filters_by_email_allowed() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.send_contact_owners_message(
            &EmailAddress::new("Sender", "sender@example.com"),
            &owners_registration(),
            "Is 2.0 coming?",
            "http://localhost:8080/account",
            false,
        )
        .await
        .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.len(), 1);
        assert_eq!(sent[0].to[0].address, "allowed@example.com");
        assert_eq!(sent[0].reply_to[0].address, "sender@example.com");
        assert_eq!(sent[0].from.address, "support@gantry.local");
        assert!(sent[0].subject.contains("urn.core"));
    }

    #[tokio::test]
    async fn test_contact_owners_skips_silently_when_no_owner_allows_mail() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        let mut owner = User::new("quiet", "quiet@example.com");
        owner.email_allowed = false;
        let registration = PackageRegistration::with_owners("urn.core", vec![owner]);

        mail.send_contact_owners_message(
            &EmailAddress::new("Sender", "sender@example.com"),
            &registration,
            "hello?",
            "http://localhost:8080/account",
            true,
        )
        .await
        .unwrap();
        mail.drain().await;

        assert!(transport.sent().is_empty());
        assert!(reporter.entries().is_empty());
    }

    #[tokio::test]
    async fn test_contact_owners_copy_sender_sends_two_messages() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.send_contact_owners_message(
            &EmailAddress::new("Sender", "sender@example.com"),
            &owners_registration(),
            "Is 2.0 coming?",
            "http://localhost:8080/account",
            true,
        )
        .await
        .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);

        let primary = &sent[0];
        let copy = &sent[1];
        assert_eq!(copy.subject, format!("{} [Sender Copy]", primary.subject));
        assert_eq!(copy.to.len(), 1);
        assert_eq!(copy.to[0].address, "sender@example.com");
        assert!(copy.body.starts_with("You sent the following message via Gantry Gallery:"));
        assert!(copy.body.contains(&primary.body));
        assert!(copy.cc.is_empty());
    }

    #[tokio::test]
    async fn test_report_abuse_copy_sender_is_a_cc_not_a_copy() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.report_abuse(&report_request(true)).await.unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to[0].address, "support@gantry.local");
        assert_eq!(sent[0].from.address, "support@gantry.local");
        assert_eq!(sent[0].cc.len(), 1);
        assert_eq!(sent[0].cc[0].address, "reporter@example.com");
        assert_eq!(sent[0].reply_to[0].address, "reporter@example.com");
        assert!(sent[0].subject.contains("Contains malware"));
        assert!(sent[0]
            .body
            .contains("Has the package owner been contacted: Yes"));
    }

    #[tokio::test]
    async fn test_report_abuse_without_copy_has_no_cc() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.report_abuse(&report_request(false)).await.unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].cc.is_empty());
    }

    #[tokio::test]
    async fn test_report_my_package_subject() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.report_my_package(&report_request(false)).await.unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert!(sent[0].subject.contains("Owner Support Request"));
    }

    #[tokio::test]
    async fn test_new_account_email_comes_from_no_reply() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        let mut user = User::new("newcomer", "");
        user.email_address = None;
        user.unconfirmed_email_address = Some("newcomer@example.com".to_string());

        mail.send_new_account_email(&user, "http://localhost:8080/confirm?token=abc")
            .await
            .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from.address, "noreply@gantry.local");
        assert_eq!(sent[0].to[0].address, "newcomer@example.com");
        assert!(sent[0].body.contains("http://localhost:8080/confirm?token=abc"));
    }

    #[tokio::test]
    async fn test_password_reset_forgot_vs_set() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);
        let user = User::new("maintainer", "maintainer@example.com");

        mail.send_password_reset_instructions(&user, "http://localhost:8080/reset", true)
            .await
            .unwrap();
        mail.send_password_reset_instructions(&user, "http://localhost:8080/reset", false)
            .await
            .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].subject.contains("reset your password"));
        assert!(sent[0].body.contains("24 hours"));
        assert!(sent[1].subject.contains("set your password"));
    }

    #[tokio::test]
    async fn test_owner_request_respects_email_allowed_gate() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        let requester = User::new("current", "current@example.com");
        let mut prospect = User::new("prospect", "prospect@example.com");
        prospect.email_allowed = false;

        mail.send_package_owner_request(
            &requester,
            &prospect,
            &PackageRegistration::new("urn.core"),
            "http://localhost:8080/owners/confirm",
        )
        .await
        .unwrap();
        mail.drain().await;
        assert!(transport.sent().is_empty());

        prospect.email_allowed = true;
        mail.send_package_owner_request(
            &requester,
            &prospect,
            &PackageRegistration::new("urn.core"),
            "http://localhost:8080/owners/confirm",
        )
        .await
        .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to[0].address, "prospect@example.com");
        assert_eq!(sent[0].reply_to[0].address, "current@example.com");
        assert!(sent[0].body.contains("http://localhost:8080/owners/confirm"));
        assert!(sent[0].subject.contains("'current'"));
    }

    #[tokio::test]
    async fn test_owner_removed_notice() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.send_package_owner_removed_notice(
            &User::new("remover", "remover@example.com"),
            &User::new("removed", "removed@example.com"),
            &PackageRegistration::new("urn.core"),
        )
        .await
        .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("removed you as an owner"));
    }

    #[tokio::test]
    async fn test_credential_notice_skips_unconfirmed_accounts() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        let mut user = User::new("newcomer", "");
        user.email_address = None;
        user.unconfirmed_email_address = Some("newcomer@example.com".to_string());

        mail.send_credential_added_notice(&user, &Credential::new(credential_kinds::PASSWORD))
            .await
            .unwrap();
        mail.drain().await;

        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_credential_notice_uses_provider_account_noun() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);
        let user = User::new("maintainer", "maintainer@example.com");

        mail.send_credential_added_notice(&user, &Credential::external("github", "octocat"))
            .await
            .unwrap();
        mail.send_credential_removed_notice(&user, &Credential::new(credential_kinds::API_KEY))
            .await
            .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].subject.contains("GitHub account added"));
        assert!(sent[0].from.address.contains("support@gantry.local"));
        assert!(sent[1].subject.contains("API key removed"));
    }

    #[tokio::test]
    async fn test_contact_support_goes_to_gallery_owner() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.send_contact_support_email(&ContactSupportRequest {
            requesting_user: User::new("member", "member@example.com"),
            from_address: EmailAddress::new("Member", "member@example.com"),
            reason: "Account locked".to_string(),
            message: "Please help.".to_string(),
            copy_sender: true,
        })
        .await
        .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to[0].address, "support@gantry.local");
        assert_eq!(sent[0].cc[0].address, "member@example.com");
        assert!(sent[0].subject.contains("Account locked"));
    }

    #[tokio::test]
    async fn test_package_added_gates_on_publish_preference_only() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        // Contact preference off but publish notices on: still notified
        let mut no_contact = User::new("nocontact", "nocontact@example.com");
        no_contact.email_allowed = false;
        let mut unsubscribed = User::new("unsub", "unsub@example.com");
        unsubscribed.notify_package_pushed = false;
        let registration =
            PackageRegistration::with_owners("urn.core", vec![no_contact, unsubscribed]);

        mail.send_package_added_notice(
            &Package::new(registration, "1.2.0"),
            "http://localhost:8080/packages/urn.core/1.2.0",
            "http://localhost:8080/support",
            "http://localhost:8080/account",
        )
        .await
        .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.len(), 1);
        assert_eq!(sent[0].to[0].address, "nocontact@example.com");
        assert_eq!(sent[0].from.address, "noreply@gantry.local");
        assert!(sent[0].subject.contains("urn.core 1.2.0"));
    }

    #[tokio::test]
    async fn test_package_added_skips_when_all_owners_unsubscribed() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        let mut owner = User::new("unsub", "unsub@example.com");
        owner.notify_package_pushed = false;
        let registration = PackageRegistration::with_owners("urn.core", vec![owner]);

        mail.send_package_added_notice(
            &Package::new(registration, "1.2.0"),
            "http://localhost:8080/packages/urn.core/1.2.0",
            "http://localhost:8080/support",
            "http://localhost:8080/account",
        )
        .await
        .unwrap();
        mail.drain().await;

        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_email_changed_notice_names_both_addresses() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        let user = User::new("mover", "new@example.com");
        mail.send_email_change_notice_to_previous_address(&user, "old@example.com")
            .await
            .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent[0].to[0].address, "old@example.com");
        assert!(sent[0].body.contains("old@example.com"));
        assert!(sent[0].body.contains("new@example.com"));
    }

    #[tokio::test]
    async fn test_failed_primary_reports_once_and_skips_copy() {
        let transport = Arc::new(MockMailTransport::failing());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.send_contact_owners_message(
            &EmailAddress::new("Sender", "sender@example.com"),
            &owners_registration(),
            "hello",
            "http://localhost:8080/account",
            true,
        )
        .await
        .unwrap();
        mail.drain().await;

        // One failure entry despite the requested copy: the copy is
        // skipped after a failed primary.
        let entries = reporter.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "mail.send");
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_caller_is_not_failed_by_a_broken_transport() {
        let transport = Arc::new(MockMailTransport::failing());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        let result = mail
            .send_new_account_email(
                &User::new("newcomer", "newcomer@example.com"),
                "http://localhost:8080/confirm",
            )
            .await;
        assert!(result.is_ok());
        mail.drain().await;
        assert_eq!(reporter.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_email_change_confirmation_goes_to_new_address() {
        let transport = Arc::new(MockMailTransport::new());
        let reporter = Arc::new(MockErrorReporter::new());
        let mail = service(&transport, &reporter);

        mail.send_email_change_confirmation(
            &EmailAddress::new("mover", "pending@example.com"),
            "http://localhost:8080/confirm?token=xyz",
        )
        .await
        .unwrap();
        mail.drain().await;

        let sent = transport.sent();
        assert_eq!(sent[0].to[0].address, "pending@example.com");
        assert_eq!(sent[0].from.address, "noreply@gantry.local");
        assert!(sent[0].subject.contains("verify your new email address"));
    }
}

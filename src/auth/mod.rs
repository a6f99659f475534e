use crate::config::ExternalProvider;
use crate::di::traits::CredentialDescriber;
use crate::entities::{credential_kinds, Credential};

/// Sign-in surface an external provider brings along
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUi {
    /// Noun used when talking about the account ("GitHub account")
    pub account_noun: String,
}

/// User-facing description of a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDescription {
    pub kind: String,
    pub type_caption: String,
    pub auth_ui: Option<ProviderUi>,
}

impl CredentialDescription {
    /// Providers with a sign-in surface are named by their account
    /// noun, everything else by the caption.
    pub fn display_name(&self) -> &str {
        match &self.auth_ui {
            Some(ui) => &ui.account_noun,
            None => &self.type_caption,
        }
    }
}

/// Knows the built-in credential types and the configured external
/// providers.
pub struct AuthenticationService {
    providers: Vec<ExternalProvider>,
}

impl AuthenticationService {
    pub fn new(providers: Vec<ExternalProvider>) -> Self {
        Self { providers }
    }

    fn provider(&self, id: &str) -> Option<&ExternalProvider> {
        self.providers.iter().find(|p| p.id == id)
    }
}

impl CredentialDescriber for AuthenticationService {
    fn describe(&self, credential: &Credential) -> CredentialDescription {
        let kind = credential.kind.clone();
        if credential_kinds::is_password(&credential.kind) {
            return CredentialDescription {
                kind,
                type_caption: "Password".to_string(),
                auth_ui: None,
            };
        }
        if credential_kinds::is_api_key(&credential.kind) {
            return CredentialDescription {
                kind,
                type_caption: "API key".to_string(),
                auth_ui: None,
            };
        }
        match credential_kinds::external_provider_id(&credential.kind)
            .and_then(|id| self.provider(id))
        {
            Some(provider) => CredentialDescription {
                kind,
                type_caption: provider.caption.clone(),
                auth_ui: Some(ProviderUi {
                    account_noun: provider.account_noun.clone(),
                }),
            },
            None => CredentialDescription {
                kind,
                type_caption: "External credential".to_string(),
                auth_ui: None,
            },
        }
    }
}

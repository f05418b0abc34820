//! External collaborator adapters.
//!
//! Each adapter converts the failure modes of a remote service into tagged
//! result values at the boundary, so the lifecycle engine branches on data
//! rather than on error type:
//!
//! - [`form`] — creates remote forms over HTTP ([`HttpFormProvider`]).
//! - [`mail`] — delivers one email per recipient over SMTP ([`SmtpMailer`]).
//! - [`generative`] — drafts email bodies via a text-generation API
//!   ([`GenerativeContent`]), falling back to the deterministic template.
//!
//! All adapters are capability-checked: configuration is loaded from the
//! environment via `from_env() -> Option<Config>`, and an absent
//! configuration routes callers to the degraded/fallback path instead of
//! failing at call time (except form creation, where missing credentials are
//! a hard, client-actionable error).

pub mod form;
pub mod generative;
pub mod mail;

pub use form::{
    CreateFormOutcome, CreateFormRequest, CreatedForm, FormProvider, FormProviderConfig,
    FormProviderError, HttpFormProvider,
};
pub use generative::{GenAiConfig, GenerativeContent};
pub use mail::{MailProvider, MailProviderError, SendOutcome, SmtpConfig, SmtpMailer};

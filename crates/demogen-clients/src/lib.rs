//! Clients for the external pipeline stages.
//!
//! This crate provides:
//! - `RecorderClient`: browser-recording service (URL in, video URL out)
//! - `ClipsClient`: clip provider with an async submit/poll lifecycle
//! - `MailerClient`: completion email delivery
//! - `wait_until`: bounded polling with a timeout sentinel

pub mod clips;
pub mod error;
pub mod mailer;
pub mod poll;
pub mod recorder;

pub use clips::{ClipsClient, ClipsConfig, ShortsOptions};
pub use error::{ClientError, ClientResult};
pub use mailer::{MailerClient, MailerConfig};
pub use poll::{wait_until, Waited};
pub use recorder::{RecorderClient, RecorderConfig};

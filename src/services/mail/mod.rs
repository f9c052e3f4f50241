pub mod activation_mailer;

pub use activation_mailer::{ActivationMailer, ActivationMessage, LogMailer};

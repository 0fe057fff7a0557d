//! Ticket form: local anti-spam checks, then one POST to a form backend.

mod form;

pub use form::{
    COOLDOWN_KEY, ContactForm, Field, Fields, FormError, FormStatus, Rejected, Submission, server_message,
};

#[cfg(test)]
mod tests;

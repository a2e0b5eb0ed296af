//! External collaborators: AI text generation and outbound mail

pub mod ai;
pub mod mailer;

pub use ai::AiService;
pub use mailer::Mailer;

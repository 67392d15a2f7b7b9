//! Services
//!
//! Business logic between the HTTP handlers and the repositories.

pub mod comment;
pub mod mailer;
pub mod post;
pub mod search;

pub use comment::CommentService;
pub use mailer::{Mailer, SmtpMailer};
pub use post::{PostDetail, PostService};
pub use search::SearchService;

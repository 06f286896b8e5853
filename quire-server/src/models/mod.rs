//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod username;
pub mod password;
pub mod post;
pub mod comment;
pub mod category;
pub mod pagination;

pub use validation::ValidationError;
pub use username::Username;
pub use password::NewPassword;
pub use post::{PostContent, PostTitle};
pub use comment::CommentContent;
pub use category::CategoryTitle;
pub use pagination::{PageNav, Pagination, Paginated, PaginationParams, DEFAULT_PER_PAGE};

//! Application services: one per record family.
//!
//! Each service enforces its family's business rules on top of
//! [`crate::crud::Crud`] and reports failures with [`crate::Error`].
//! Repository errors are boxed into [`crate::Error::Store`] untouched.

mod books;
mod follows;
mod reviews;
mod users;

pub use books::BookService;
pub use follows::FollowService;
pub use reviews::ReviewService;
pub use users::UserService;

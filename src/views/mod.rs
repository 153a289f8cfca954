pub mod form;
pub mod list;
pub mod prompt;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use form::FormModal;
pub use list::{ListView, LoadState};
pub use prompt::{Confirm, Notifier};
pub use router::{guard, Navigation, Route, Router};

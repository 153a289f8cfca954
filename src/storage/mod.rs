pub mod session;

pub use session::{FileSessionStore, MemorySessionStore, SessionStore};

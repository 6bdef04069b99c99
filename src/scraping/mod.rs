pub mod browser_manager;
pub mod pacing;
pub mod selectors;
pub mod session;
pub mod text;

pub use session::{BrowserSession, SessionFactory, SessionTimeouts};

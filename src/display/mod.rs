//! Status-line presentation: session input, git state, coloring and layout.

pub mod colors;
pub mod formatter;
pub mod git;
pub mod session;

pub use formatter::{display_time, render, FormatContext};
pub use git::{git_info, GitInfo};
pub use session::SessionInfo;

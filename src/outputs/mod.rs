//! Output generation: rendering posts and merging them into site files.
//!
//! # Submodules
//!
//! - [`markdown`]: Converts a ranked selection of posts into a document body
//! - [`document`]: Splits destination files into metadata block and body, and
//!   writes the regenerated file
//!
//! # Output Structure
//!
//! ```text
//! content/
//! ├── news.md            # posts tagged #news
//! └── announcements.md   # posts tagged #announcement / #announce
//! ```

pub mod document;
pub mod markdown;

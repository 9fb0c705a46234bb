pub mod directory;

pub use directory::{DirectoryError, InMemoryUserDirectory, UserDirectory};

pub mod delete;
pub mod download;
pub mod list;
pub mod types;
pub mod upload;

pub use types::*;

pub use delete::delete_file;
pub use download::download_file;
pub use list::list_files;
pub use upload::upload_file;

pub mod proxy;
pub mod upload;

pub use proxy::handle_file_proxy;
pub use upload::handle_upload;

pub mod dropbox;
pub mod error;
pub mod files;
pub mod oauth;
pub mod tokens;


pub use dropbox::{DropboxApi, DropboxClient};
pub use error::{ServiceError, ServiceResult};
pub use files::FileService;
pub use oauth::AuthorizationFlow;
pub use tokens::{FileTokenStore, MemoryTokenStore, TokenManager, TokenSet, TokenStore};

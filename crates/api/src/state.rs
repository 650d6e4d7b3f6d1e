use boxgate_config::Settings;
use boxgate_services::{
    AuthorizationFlow, DropboxApi, DropboxClient, FileService, FileTokenStore, TokenManager,
    TokenStore,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub tokens: Arc<TokenManager>,
    pub auth: Arc<AuthorizationFlow>,
    pub files: Arc<FileService>,
}

impl AppState {
    /// Production wiring: token file on disk, live Dropbox endpoints.
    pub fn new(settings: Settings) -> Self {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&settings.tokens.path));
        let api: Arc<dyn DropboxApi> = Arc::new(DropboxClient::new(&settings.dropbox));
        Self::with_parts(settings, store, api)
    }

    pub fn with_parts(
        settings: Settings,
        store: Arc<dyn TokenStore>,
        api: Arc<dyn DropboxApi>,
    ) -> Self {
        let tokens = Arc::new(TokenManager::new(
            Arc::clone(&store),
            Arc::clone(&api),
            settings.dropbox.clone(),
        ));
        let auth = Arc::new(AuthorizationFlow::new(
            settings.dropbox.clone(),
            Arc::clone(&api),
            store,
        ));
        let files = Arc::new(FileService::new(Arc::clone(&tokens), api));

        Self {
            settings,
            tokens,
            auth,
            files,
        }
    }
}

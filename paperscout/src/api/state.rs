use std::sync::Arc;

use crate::archive::{PaperArchive, PaperCatalog};
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::llm::LlmProvider;
use crate::services::{
    ConversationService, PageCache, PageService, RecommenderService, SessionStore,
};
use crate::vector::VectorIndex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<PaperCatalog>,
    pub index: Arc<dyn VectorIndex>,
    pub archive: Arc<dyn PaperArchive>,
    pub embeddings: EmbeddingProvider,
    pub llm: LlmProvider,
    pub recommender: RecommenderService,
    pub conversation: ConversationService,
    pub pages: PageService,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<PaperCatalog>,
        index: Arc<dyn VectorIndex>,
        archive: Arc<dyn PaperArchive>,
        embeddings: EmbeddingProvider,
        llm: LlmProvider,
    ) -> Self {
        let config = Arc::new(config);
        let recommender = RecommenderService::new(
            index.clone(),
            embeddings.clone(),
            llm.clone(),
            catalog.clone(),
            &config,
        );
        let conversation =
            ConversationService::new(index.clone(), embeddings.clone(), llm.clone(), &config);
        let page_cache = PageCache::new(config.session.page_cache_capacity);
        let pages = PageService::new(archive.clone(), &config.archive, page_cache);
        let sessions = SessionStore::new(&config.session);

        Self {
            config,
            catalog,
            index,
            archive,
            embeddings,
            llm,
            recommender,
            conversation,
            pages,
            sessions,
        }
    }
}

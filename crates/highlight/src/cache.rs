use crate::error::{HighlightError, Result};
use crate::lexer::{self, Language};
use crate::source::{LocalFs, SourceProvider};
use crate::token::Token;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<[Token]>>>>;

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Arc<[Token]>>,
    in_flight: HashMap<String, SharedLoad>,
}

/// Tokenized source files, loaded once per path.
///
/// Concurrent requests for a path that is not cached yet attach to a single
/// shared load; all of them observe its result. Failed loads are not cached.
/// Entries are never evicted.
pub struct TokenCache {
    provider: Arc<dyn SourceProvider>,
    state: Arc<Mutex<CacheState>>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn SourceProvider>) -> Self {
        Self {
            provider,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Cache backed by the local filesystem
    pub fn local() -> Self {
        Self::new(Arc::new(LocalFs::new()))
    }

    /// Tokens of the file at `path`, reading and tokenizing it on first use
    pub async fn get_tokens(&self, path: &str) -> Result<Arc<[Token]>> {
        let load = {
            let mut state = self.state.lock();
            if let Some(tokens) = state.entries.get(path) {
                return Ok(Arc::clone(tokens));
            }
            match state.in_flight.get(path).cloned() {
                Some(load) => {
                    log::debug!("token cache: joining in-flight load of {path}");
                    load
                }
                None => {
                    log::debug!("token cache miss: {path}");
                    let load = load_tokens(
                        Arc::clone(&self.provider),
                        Arc::clone(&self.state),
                        path.to_string(),
                    )
                    .boxed()
                    .shared();
                    state.in_flight.insert(path.to_string(), load.clone());
                    load
                }
            }
        };
        load.await
    }

    /// Number of published entries
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.lock().entries.contains_key(path)
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::local()
    }
}

async fn load_tokens(
    provider: Arc<dyn SourceProvider>,
    state: Arc<Mutex<CacheState>>,
    path: String,
) -> Result<Arc<[Token]>> {
    let result = read_and_tokenize(provider.as_ref(), &path).await;

    let mut guard = state.lock();
    guard.in_flight.remove(&path);
    match &result {
        Ok(tokens) => {
            guard.entries.insert(path, Arc::clone(tokens));
        }
        Err(err) => log::warn!("token cache: {err}"),
    }
    result
}

async fn read_and_tokenize(provider: &dyn SourceProvider, path: &str) -> Result<Arc<[Token]>> {
    let bytes = provider
        .read(path)
        .await
        .map_err(|err| HighlightError::io(path, err))?;
    let language = Language::from_path(path);
    let owned_path = path.to_string();
    tokio::task::spawn_blocking(move || {
        let text = String::from_utf8(bytes).map_err(|err| {
            HighlightError::tokenize(&owned_path, format!("invalid UTF-8: {err}"))
        })?;
        let tokens = lexer::tokenize(language, &text)
            .map_err(|err| HighlightError::tokenize(&owned_path, err.to_string()))?;
        Ok(Arc::<[Token]>::from(tokens))
    })
    .await
    .map_err(|err| HighlightError::Task(err.to_string()))?
}

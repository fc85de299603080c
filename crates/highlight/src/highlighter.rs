use crate::cache::TokenCache;
use crate::config::RenderOptions;
use crate::error::Result;
use crate::window;
use stackscope_dump::{Environment, FileLocation, Highlight};
use std::sync::Arc;

/// Highlights call sites of classified locations against local source trees
pub struct Highlighter {
    env: Environment,
    cache: Arc<TokenCache>,
    options: RenderOptions,
}

impl Highlighter {
    /// `env` holds the local roots that classified locations resolve against
    pub fn new(env: Environment, cache: Arc<TokenCache>) -> Self {
        Self {
            env,
            cache,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    /// Render the window around `location`.
    ///
    /// A negative `wrap_size` returns an empty highlight without touching
    /// the cache or the filesystem.
    pub async fn highlight(&self, location: &FileLocation, wrap_size: i32) -> Result<Highlight> {
        if wrap_size < 0 {
            return Ok(Highlight::default());
        }
        let path = self.env.resolve(location);
        let tokens = self.cache.get_tokens(&path).await?;
        window::render_with(&tokens, location.line, wrap_size, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HighlightError;
    use crate::source::{MemorySource, SourceProvider};
    use async_trait::async_trait;
    use stackscope_dump::RootKind;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every read request
    struct SpySource {
        inner: MemorySource,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl SourceProvider for SpySource {
        async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read(path).await
        }
    }

    fn spy() -> Arc<SpySource> {
        Arc::new(SpySource {
            inner: [
                ("/local/proj/main.go", "package main\n\nfunc main() {\n\trun()\n}\n"),
                ("/usr/go/src/runtime/proc.go", "package runtime\n"),
            ]
            .into_iter()
            .collect(),
            reads: AtomicUsize::new(0),
        })
    }

    fn env() -> Environment {
        Environment::new("/local/proj", "/usr/go", "/home/me/go")
    }

    #[tokio::test]
    async fn negative_wrap_never_reads() {
        let source = spy();
        let highlighter = Highlighter::new(env(), Arc::new(TokenCache::new(source.clone())));
        let location = FileLocation::new(RootKind::Project, "main.go", 4);

        let hl = highlighter.highlight(&location, -1).await.unwrap();
        assert!(hl.is_empty());
        assert_eq!(source.reads.load(Ordering::SeqCst), 0);
        assert!(highlighter.cache().is_empty());
    }

    #[tokio::test]
    async fn resolves_against_local_roots() {
        let source = spy();
        let highlighter = Highlighter::new(env(), Arc::new(TokenCache::new(source.clone())));

        let project = FileLocation::new(RootKind::Project, "main.go", 4);
        let hl = highlighter.highlight(&project, 1).await.unwrap();
        assert!(hl.prefix.contains("run"));
        assert!(hl.suffix.contains('}'));

        let runtime = FileLocation::new(RootKind::Runtime, "src/runtime/proc.go", 1);
        let hl = highlighter.highlight(&runtime, 0).await.unwrap();
        assert!(hl.prefix.contains("runtime"));
        assert!(highlighter.cache().contains("/usr/go/src/runtime/proc.go"));
        assert_eq!(source.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn repeated_highlights_are_identical_and_cached() {
        let source = spy();
        let highlighter = Highlighter::new(env(), Arc::new(TokenCache::new(source.clone())));
        let location = FileLocation::new(RootKind::Project, "main.go", 3);

        let first = highlighter.highlight(&location, 2).await.unwrap();
        let second = highlighter.highlight(&location, 2).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_library_file_is_io_error() {
        let highlighter = Highlighter::new(env(), Arc::new(TokenCache::new(spy())));
        let location = FileLocation::new(RootKind::Library, "pkg/mod/x/y.go", 1);
        let err = highlighter.highlight(&location, 1).await.unwrap_err();
        assert!(
            matches!(err, HighlightError::Io { ref path, .. } if path == "/home/me/go/pkg/mod/x/y.go")
        );
    }

    #[tokio::test]
    async fn render_options_apply() {
        let options = RenderOptions {
            tab_width: 8,
            line_numbers: false,
        };
        let highlighter =
            Highlighter::new(env(), Arc::new(TokenCache::new(spy()))).with_options(options);
        let location = FileLocation::new(RootKind::Project, "main.go", 4);
        let hl = highlighter.highlight(&location, 0).await.unwrap();
        assert!(hl.prefix.contains("tab-size:8"));
        assert!(!hl.prefix.contains("lntable"));
    }
}

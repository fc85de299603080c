//! # Stackscope Highlight
//!
//! Syntax-highlighted source windows around goroutine call sites.
//!
//! ## Features
//!
//! - **Coalesced loading**: concurrent requests for one file share a single
//!   read and tokenize
//! - **Line windows**: marked call line plus configurable context, rendered
//!   as chroma-compatible HTML
//! - **Bounded markup**: goroutines enriched in parallel, cancellable, all or
//!   nothing
//!
//! ## Architecture
//!
//! ```text
//! FileLocation (root, file, line)
//!     │
//!     ├──> Environment::resolve ──> local path
//!     │
//!     ├──> TokenCache
//!     │      ├─> SourceProvider (LocalFs / MemorySource)
//!     │      └─> Go lexer ──> Arc<[Token]>
//!     │
//!     └──> window::render ──> Highlight { prefix, suffix }
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use stackscope_dump::{parse, Environment};
//! use stackscope_highlight::{enrich_markup, CancelFlag, Highlighter, MarkupOptions, TokenCache};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let env = Environment::project("/proj");
//!     let mut goroutines = parse(&std::fs::read_to_string("dump.txt")?, &env)?;
//!
//!     let highlighter = Arc::new(Highlighter::new(env, Arc::new(TokenCache::local())));
//!     enrich_markup(highlighter, &mut goroutines, MarkupOptions::new(10, 5), &CancelFlag::new())
//!         .await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&goroutines)?);
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod error;
mod highlighter;
mod html;
mod lexer;
mod markup;
mod source;
mod token;
mod window;

pub use cache::TokenCache;
pub use config::{MarkupOptions, RenderOptions};
pub use error::{HighlightError, Result};
pub use highlighter::Highlighter;
pub use html::html_escape;
pub use lexer::{tokenize, Language, LexError};
pub use markup::{enrich_markup, CancelFlag};
pub use source::{LocalFs, MemorySource, SourceProvider};
pub use token::{Token, TokenClass};
pub use window::{render, render_with};

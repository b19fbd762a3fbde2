//! `mdref_core` is the core library for [mdref](https://github.com/ifiokjr/mdref). It expands directive comments in markdown into code excerpts read from git history, and flags excerpts whose file has changed since the cited revision.
//!
//! ## Directive Syntax
//!
//! ```markdown
//! <!-- {{rust|git|v1.2.0|src/lib.rs:10:24}} -->
//! ```
//!
//! The fields are the code block language, the revision, and the repository path with an optional `:line` or `:from:to` suffix. Each directive is followed by a generated block:
//!
//! ````markdown
//! <!-- Begin generated code reference. DO NOT EDIT -->
//! ```rust
//! ...
//! ```
//! > Commit: v1.2.0
//! > File: src/lib.rs
//! > Lines: 10 to 24
//! <!-- End generated code reference. -->
//! ````
//!
//! A generated block directly after a directive is replaced on every run, so running mdref over its own output is idempotent.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown document
//!   → Rewriter (streams lines, classifies each with the directive parser)
//!   → VCS gateway (memoized `show` / `diff --name-only` per document)
//!   → Excerpt (line range selection, common indentation removal)
//!   → Renderer (fenced block, provenance annotations, stale warning)
//!   → Rewriter (drops the previously generated block, resumes the stream)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: [`RefOptions`] passed to every entry point, and [`MdrefConfig`] loaded from `mdref.toml`.
//! - [`vcs`]: the [`VcsRunner`] subprocess seam and the memoizing [`VcsGateway`].
//! - [`workspace`]: markdown discovery and one task per file in directory mode.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdref_core::GitCommand;
//! use mdref_core::RefOptions;
//! use mdref_core::VcsGateway;
//! use mdref_core::rewrite_document;
//!
//! let options = RefOptions::default();
//! let mut gateway = VcsGateway::new(GitCommand::from_options(&options));
//! let input = "<!-- {{rust|git|main|src/lib.rs:1:5}} -->\n";
//! let document = rewrite_document(input.as_bytes(), &mut gateway, &options).unwrap();
//! print!("{}", document.content);
//! ```

pub use config::*;
pub use directive::*;
pub use error::*;
pub use excerpt::*;
pub use render::*;
pub use rewriter::*;
pub use vcs::*;
pub use workspace::*;

pub mod config;
mod directive;
#[allow(unused_assignments)]
mod error;
mod excerpt;
mod render;
mod rewriter;
pub mod vcs;
pub mod workspace;

#[cfg(test)]
mod __fixtures;

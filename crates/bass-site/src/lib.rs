//! Site tree, events and rendering pipeline for Bass.
//!
//! This crate provides:
//! - [`SiteTree`]: arena of folders, pages and assets
//! - [`EventBus`]: label-keyed handlers fired while generating and rendering
//! - [`TreeBuilder`] and [`Renderer`]: the two passes of a build
//! - [`MetaNormalizer`]: completion of page front matter
//! - [`add_toc`] and [`resolve_idref`]: helpers for index pages and links
//! - [`Project`]: the configured pipeline behind `bass build`
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bass_config::Config;
//! use bass_site::{Layout, NodeId, Project, SiteError, SiteTree};
//!
//! struct Plain;
//!
//! impl Layout for Plain {
//!     fn contains(&self, _skin: &str) -> bool {
//!         true
//!     }
//!
//!     fn render(&self, _skin: &str, tree: &SiteTree, node: NodeId) -> Result<String, SiteError> {
//!         Ok(tree.page(node).map(|p| p.content.clone()).unwrap_or_default())
//!     }
//! }
//!
//! let config = Config::load(None, None)?;
//! let project = Project::from_config(&config);
//! let tree = project.build(&Plain)?;
//! println!("{} nodes rendered", tree.len());
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod event;
mod handlers;
mod idref;
mod layout;
mod metadata;
mod processor;
mod project;
mod renderer;
mod source;
mod toc;
mod tree;
mod view;

pub use bass_config::SortKey;
pub use builder::TreeBuilder;
pub use error::SiteError;
pub use event::{EventBus, EventContext, Handler, HandlerResult, PAGE_EXTENSION_PREFIX};
pub use handlers::{register_hooks, register_tocs, table_class};
pub use idref::resolve_idref;
pub use layout::Layout;
pub use metadata::{
    DEFAULT_SKIN, FrontMatter, MetaNormalizer, MetadataError, PageMeta, fix_date_time,
    parse_front_matter, title_from_path,
};
pub use processor::{Processor, register_converters};
pub use project::{DEFAULT_TEMPLATE, Project, SiteSettings, create_project, prepare_output, verify_project};
pub use renderer::Renderer;
pub use source::PageSource;
pub use toc::{TocItem, TocOptions, add_toc, partition};
pub use tree::{Asset, Node, NodeId, NodeKind, Page, PageQuery, SiteTree, split_extension};
pub use view::{KindName, LinkView, NodeView};

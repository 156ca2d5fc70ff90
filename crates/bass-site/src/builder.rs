//! Site tree construction by filesystem walking.
//!
//! The builder walks the input directory depth-first. Every node fires its
//! `generate:post:*` events as soon as it is complete: pages and assets right
//! after they are created, folders after all their children (sub-folders
//! included) are attached. The root folder fires `generate:post:root` last.

use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::error::SiteError;
use crate::event::{EventBus, EventContext};
use crate::metadata::parse_front_matter;
use crate::source::PageSource;
use crate::tree::{Asset, NodeId, NodeKind, Page, SiteTree, split_extension};

/// Builds a [`SiteTree`] from an input directory.
pub struct TreeBuilder<'a> {
    bus: &'a EventBus,
    input: PathBuf,
    ignore: Vec<glob::Pattern>,
    follow_links: bool,
    root_url: String,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder for `input` that fires events on `bus`.
    ///
    /// Defaults: nothing ignored, symbolic links skipped, root URL `/`.
    pub fn new(bus: &'a EventBus, input: impl Into<PathBuf>) -> Self {
        Self {
            bus,
            input: input.into(),
            ignore: Vec::new(),
            follow_links: false,
            root_url: "/".to_owned(),
        }
    }

    /// Skip entries matching any of the shell-style `patterns`.
    ///
    /// A pattern matches an entry if it matches either the entry's path
    /// relative to the input directory or its bare name.
    pub fn with_ignore(mut self, patterns: &[String]) -> Result<Self, SiteError> {
        self.ignore = patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|e| SiteError::Pattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Follow symbolic links instead of skipping them.
    #[must_use]
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Prefix every page and asset URL with `root_url`.
    #[must_use]
    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = root_url.into();
        self
    }

    /// Walk the input directory and build the tree.
    ///
    /// # Errors
    ///
    /// Fails on unreadable directories or files, malformed front matter,
    /// and any error raised by a generation handler.
    pub fn build(&self) -> Result<SiteTree, SiteError> {
        let patterns: Vec<&str> = self.ignore.iter().map(glob::Pattern::as_str).collect();
        let extensions = self.bus.page_extensions();
        tracing::info!(patterns = %patterns.join(" "), "Ignore files/directories");
        tracing::info!(follow_links = self.follow_links, "Follow symbolic links");
        tracing::info!(extensions = %extensions.join(" "), "Valid page extensions");

        let mut tree = SiteTree::new(self.root_url.clone());
        let root = tree.root();
        self.scan_directory(&mut tree, root, &self.input, "", &extensions)?;
        self.bus
            .fire("generate:post:root", &mut EventContext::new(&mut tree, root))?;
        Ok(tree)
    }

    fn scan_directory(
        &self,
        tree: &mut SiteTree,
        folder: NodeId,
        dir_path: &Path,
        rel_prefix: &str,
        extensions: &[String],
    ) -> Result<(), SiteError> {
        let mut entries = fs::read_dir(dir_path)
            .and_then(|entries| entries.collect::<Result<Vec<DirEntry>, _>>())
            .map_err(SiteError::io(dir_path))?;
        entries.sort_by_key(DirEntry::file_name);

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel_path = if rel_prefix.is_empty() {
                name.clone()
            } else {
                format!("{rel_prefix}/{name}")
            };
            let path = entry.path();

            if self.is_ignored(&name, &rel_path) {
                tracing::debug!(path = %rel_path, "Ignore entry");
                continue;
            }

            let file_type = entry.file_type().map_err(SiteError::io(&path))?;
            let is_dir = if file_type.is_symlink() {
                if !self.follow_links {
                    tracing::debug!(path = %rel_path, "Skip symbolic link");
                    continue;
                }
                fs::metadata(&path).map_err(SiteError::io(&path))?.is_dir()
            } else {
                file_type.is_dir()
            };

            if is_dir {
                let child = tree.add_child(folder, name, rel_path.as_str(), NodeKind::Folder);
                self.scan_directory(tree, child, &path, &rel_path, extensions)?;
                let label = format!("generate:post:folder:path:{rel_path}");
                self.bus.fire(&label, &mut EventContext::new(tree, child))?;
                continue;
            }

            let (stem, extension) = split_extension(&rel_path);
            let extension = extension.trim_start_matches('.');
            if extensions.iter().any(|e| e == extension) {
                let source = PageSource::read(&path)?;
                let front_matter =
                    parse_front_matter(&source.front_matter).map_err(|source| {
                        SiteError::Metadata {
                            path: rel_path.clone(),
                            source,
                        }
                    })?;
                let url = format!("{}{stem}.html", self.root_url);
                let page = Page::new(
                    front_matter,
                    source.preview,
                    source.content,
                    url,
                    creation_time(&path)?,
                );
                let child = tree.add_child(folder, name, rel_path.as_str(), NodeKind::Page(Box::new(page)));
                self.fire_ready(tree, child, "page", &rel_path, extension)?;
            } else {
                let url = format!("{}{rel_path}", self.root_url);
                let child = tree.add_child(folder, name, rel_path.as_str(), NodeKind::Asset(Asset { url }));
                self.fire_ready(tree, child, "asset", &rel_path, extension)?;
            }
        }
        Ok(())
    }

    fn fire_ready(
        &self,
        tree: &mut SiteTree,
        node: NodeId,
        kind: &str,
        rel_path: &str,
        extension: &str,
    ) -> Result<(), SiteError> {
        let mut ctx = EventContext::new(tree, node);
        self.bus
            .fire(&format!("generate:post:{kind}:path:{rel_path}"), &mut ctx)?;
        self.bus
            .fire(&format!("generate:post:{kind}:extension:{extension}"), &mut ctx)
    }

    fn is_ignored(&self, name: &str, rel_path: &str) -> bool {
        self.ignore
            .iter()
            .any(|pattern| pattern.matches(rel_path) || pattern.matches(name))
    }
}

/// Creation time of `path` in local time.
///
/// Falls back to the modification time where the filesystem does not
/// record creation.
fn creation_time(path: &Path) -> Result<NaiveDateTime, SiteError> {
    let metadata = fs::metadata(path).map_err(SiteError::io(path))?;
    let time: SystemTime = metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_err(SiteError::io(path))?;
    Ok(DateTime::<Local>::from(time).naive_local())
}

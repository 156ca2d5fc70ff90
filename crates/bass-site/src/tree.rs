//! Site tree of folders, pages and assets.
//!
//! # Architecture
//!
//! Nodes are stored in a flat `Vec<Node>` owned by [`SiteTree`]. Parent and
//! child links are [`NodeId`] indices into that arena, so a node never owns
//! its parent and there are no reference cycles. The root folder is always
//! the first node and is the only node with an empty path.
//!
//! The tree only grows: the builder appends nodes while scanning the input
//! directory, and the TOC helper appends sub-pages during rendering.

use std::cmp::Ordering;

use bass_config::SortKey;
use chrono::NaiveDateTime;

use crate::metadata::{DEFAULT_SKIN, FrontMatter, PageMeta};

/// Index of a node in a [`SiteTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element of the site tree.
#[derive(Clone, Debug)]
pub struct Node {
    /// Last path segment.
    pub name: String,
    /// Path relative to the input directory (empty for the root).
    pub path: String,
    /// Identifier for `idref:` links (empty if none).
    pub id: String,
    /// Tags (empty if none).
    pub tags: Vec<String>,
    /// Kind-specific data.
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Kind of a node with the data only that kind carries.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Directory in the input tree.
    Folder,
    /// Content file rendered through a template.
    Page(Box<Page>),
    /// File copied verbatim.
    Asset(Asset),
}

/// Page data.
#[derive(Clone, Debug)]
pub struct Page {
    /// Front matter as read from the source file.
    pub front_matter: FrontMatter,
    /// Completed metadata (set by the page processor).
    pub meta: Option<PageMeta>,
    /// Teaser text (may be empty).
    pub preview: String,
    /// Body text.
    pub content: String,
    /// Template name.
    pub skin: String,
    /// Site-relative URL.
    pub url: String,
    /// Creation time of the source file.
    pub created: NaiveDateTime,
    /// Previous page in a TOC chain.
    pub prev: Option<NodeId>,
    /// Next page in a TOC chain.
    pub next: Option<NodeId>,
    /// Rendered table of contents (set by the TOC helper).
    pub toc: Option<String>,
}

impl Page {
    /// Create a page from the parts of its source file.
    #[must_use]
    pub fn new(
        front_matter: FrontMatter,
        preview: String,
        content: String,
        url: String,
        created: NaiveDateTime,
    ) -> Self {
        Self {
            front_matter,
            meta: None,
            preview,
            content,
            skin: DEFAULT_SKIN.to_owned(),
            url,
            created,
            prev: None,
            next: None,
            toc: None,
        }
    }

    /// Page title, empty until metadata has been completed.
    #[must_use]
    pub fn title(&self) -> &str {
        self.meta.as_ref().map_or("", |m| m.title.as_str())
    }

    /// Publication date and time, or the file creation time before metadata
    /// has been completed.
    #[must_use]
    pub fn datetime(&self) -> NaiveDateTime {
        self.meta.as_ref().map_or(self.created, |m| m.datetime)
    }
}

/// Asset data.
#[derive(Clone, Debug)]
pub struct Asset {
    /// Site-relative URL.
    pub url: String,
}

impl Node {
    /// Parent node (`None` for the root).
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in discovery order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder)
    }

    /// Page data, if this node is a page.
    #[must_use]
    pub fn as_page(&self) -> Option<&Page> {
        match &self.kind {
            NodeKind::Page(page) => Some(page),
            _ => None,
        }
    }

    /// Mutable page data, if this node is a page.
    pub fn as_page_mut(&mut self) -> Option<&mut Page> {
        match &mut self.kind {
            NodeKind::Page(page) => Some(page),
            _ => None,
        }
    }

    /// URL of a page or asset.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Folder => None,
            NodeKind::Page(page) => Some(&page.url),
            NodeKind::Asset(asset) => Some(&asset.url),
        }
    }

    /// File extension of the node's path, without the dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        split_extension(&self.path).1.trim_start_matches('.')
    }
}

/// Filter and order for [`SiteTree::pages`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PageQuery<'a> {
    /// Keep only pages carrying this tag.
    pub tag: Option<&'a str>,
    /// Keep only pages with this id (ignored when `tag` is set).
    pub idref: Option<&'a str>,
    /// Include pages of all sub-folders.
    pub deep: bool,
    /// Attribute to sort by (ascending).
    pub sort: SortKey,
}

/// Arena of site nodes.
#[derive(Clone, Debug)]
pub struct SiteTree {
    nodes: Vec<Node>,
    root_url: String,
}

impl SiteTree {
    /// Create a tree holding only the root folder.
    #[must_use]
    pub fn new(root_url: impl Into<String>) -> Self {
        let root = Node {
            name: String::new(),
            path: String::new(),
            id: String::new(),
            tags: Vec::new(),
            kind: NodeKind::Folder,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root_url: root_url.into(),
        }
    }

    /// Root folder.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Prefix of every URL in this tree.
    #[must_use]
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Page data of `id`, if it is a page.
    #[must_use]
    pub fn page(&self, id: NodeId) -> Option<&Page> {
        self.node(id).as_page()
    }

    /// Mutable page data of `id`, if it is a page.
    pub fn page_mut(&mut self, id: NodeId) -> Option<&mut Page> {
        self.node_mut(id).as_page_mut()
    }

    /// All node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Root of the tree `id` lives in.
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            current = parent;
        }
        current
    }

    /// Append a child to `parent` and return its id.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        path: impl Into<String>,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            path: path.into(),
            id: String::new(),
            tags: Vec::new(),
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Find a node by its path relative to the input directory.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.ids().find(|&id| self.node(id).path == path)
    }

    /// First child folder of `folder` called `name`.
    #[must_use]
    pub fn folder(&self, folder: NodeId, name: &str) -> Option<NodeId> {
        self.child_where(folder, |node| node.is_folder() && node.name == name)
    }

    /// First child page of `folder` called `name`.
    #[must_use]
    pub fn page_named(&self, folder: NodeId, name: &str) -> Option<NodeId> {
        self.child_where(folder, |node| node.as_page().is_some() && node.name == name)
    }

    /// First child asset of `folder` called `name`.
    #[must_use]
    pub fn asset(&self, folder: NodeId, name: &str) -> Option<NodeId> {
        self.child_where(folder, |node| {
            matches!(node.kind, NodeKind::Asset(_)) && node.name == name
        })
    }

    /// Child folders of `folder`.
    #[must_use]
    pub fn folders(&self, folder: NodeId) -> Vec<NodeId> {
        self.children_where(folder, Node::is_folder)
    }

    /// Child assets of `folder`.
    #[must_use]
    pub fn assets(&self, folder: NodeId) -> Vec<NodeId> {
        self.children_where(folder, |node| matches!(node.kind, NodeKind::Asset(_)))
    }

    /// Pages of `folder` matching `query`, sorted by `query.sort`.
    ///
    /// A deep query descends into sub-folders but not into the sub-pages
    /// of a page.
    #[must_use]
    pub fn pages(&self, folder: NodeId, query: &PageQuery<'_>) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.collect_pages(folder, query.deep, &mut result);

        if let Some(tag) = query.tag {
            result.retain(|&id| self.node(id).tags.iter().any(|t| t == tag));
        } else if let Some(idref) = query.idref {
            result.retain(|&id| self.node(id).id == idref);
        }

        result.sort_by(|&a, &b| self.compare(a, b, query.sort));
        result
    }

    /// Append a copy of page `original` as its own child.
    ///
    /// The copy's name gets `suffix` appended and its path and URL are
    /// derived from the new name. It has an empty id, no children, no TOC
    /// and no chain links; everything else is copied from `original`.
    /// Returns `None` if `original` is not a page.
    pub fn add_subpage(&mut self, original: NodeId, suffix: &str) -> Option<NodeId> {
        let source = self.node(original);
        let page = source.as_page()?;

        let (stem, extension) = split_extension(&source.path);
        let path = format!("{stem}{suffix}{extension}");
        let name = format!("{}{suffix}", source.name);
        let subpage = Page {
            front_matter: page.front_matter.clone(),
            meta: page.meta.clone(),
            preview: page.preview.clone(),
            content: page.content.clone(),
            skin: page.skin.clone(),
            url: format!("{}{stem}{suffix}.html", self.root_url),
            created: page.created,
            prev: None,
            next: None,
            toc: None,
        };
        let tags = source.tags.clone();

        let id = self.add_child(original, name, path, NodeKind::Page(Box::new(subpage)));
        self.node_mut(id).tags = tags;
        Some(id)
    }

    fn child_where(&self, folder: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        self.node(folder)
            .children
            .iter()
            .copied()
            .find(|&id| pred(self.node(id)))
    }

    fn children_where(&self, folder: NodeId, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.node(folder)
            .children
            .iter()
            .copied()
            .filter(|&id| pred(self.node(id)))
            .collect()
    }

    fn collect_pages(&self, folder: NodeId, deep: bool, out: &mut Vec<NodeId>) {
        for &child in &self.node(folder).children {
            let node = self.node(child);
            if node.as_page().is_some() {
                out.push(child);
            }
        }
        if deep {
            for sub in self.folders(folder) {
                self.collect_pages(sub, true, out);
            }
        }
    }

    fn compare(&self, a: NodeId, b: NodeId, key: SortKey) -> Ordering {
        let (na, nb) = (self.node(a), self.node(b));
        fn meta(node: &Node) -> Option<&PageMeta> {
            node.as_page().and_then(|p| p.meta.as_ref())
        }

        match key {
            SortKey::Name => na.name.cmp(&nb.name),
            SortKey::Path => na.path.cmp(&nb.path),
            SortKey::Id => na.id.cmp(&nb.id),
            SortKey::Url => na.url().cmp(&nb.url()),
            SortKey::Title => {
                let title = |node: &Node| node.as_page().map_or("", Page::title).to_owned();
                title(na).cmp(&title(nb))
            }
            SortKey::Datetime => {
                let datetime = |node: &Node| node.as_page().map(Page::datetime);
                datetime(na).cmp(&datetime(nb))
            }
            SortKey::Date => meta(na).map(|m| m.date).cmp(&meta(nb).map(|m| m.date)),
            SortKey::Time => meta(na).map(|m| m.time).cmp(&meta(nb).map(|m| m.time)),
        }
    }
}

/// Split `path` into stem and extension (with its dot).
///
/// A leading dot of the file name does not start an extension, so
/// `.htaccess` has none.
#[must_use]
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let name = &path[name_start..];
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => {
            path.split_at(name_start + dot)
        }
        _ => (path, ""),
    }
}

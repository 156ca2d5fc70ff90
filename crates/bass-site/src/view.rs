//! Serializable view of a node, handed to templates as `this`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use serde_yaml::Value;

use crate::tree::{NodeId, NodeKind, SiteTree};

/// Kind of node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KindName {
    Folder,
    Page,
    Asset,
}

/// Link to another node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkView<'a> {
    /// Node name.
    pub name: &'a str,
    /// Page title (empty for folders and assets).
    pub title: &'a str,
    /// Node URL (empty for folders).
    pub url: &'a str,
}

impl<'a> LinkView<'a> {
    fn new(tree: &'a SiteTree, id: NodeId) -> Self {
        let node = tree.node(id);
        Self {
            name: &node.name,
            title: node.as_page().map_or("", |p| p.title()),
            url: node.url().unwrap_or(""),
        }
    }
}

/// Names of the fixed [`NodeView`] fields; front matter keys with these
/// names are left out of [`NodeView::extra`].
const VIEW_FIELDS: [&str; 17] = [
    "kind", "name", "path", "id", "tags", "url", "title", "skin", "date", "time", "datetime",
    "preview", "content", "toc", "prev", "next", "children",
];

/// Everything a template can read about a node.
///
/// Extra front matter keys appear as top-level fields next to the standard
/// ones, unless they would shadow one.
#[derive(Debug, Serialize)]
pub struct NodeView<'a> {
    pub kind: KindName,
    pub name: &'a str,
    pub path: &'a str,
    pub id: &'a str,
    pub tags: &'a [String],
    pub url: Option<&'a str>,
    pub title: &'a str,
    pub skin: Option<&'a str>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub datetime: Option<NaiveDateTime>,
    pub preview: Option<&'a str>,
    pub content: Option<&'a str>,
    pub toc: Option<&'a str>,
    pub prev: Option<LinkView<'a>>,
    pub next: Option<LinkView<'a>>,
    /// Children in tree order (sub-pages for a page).
    pub children: Vec<LinkView<'a>>,
    #[serde(flatten)]
    pub extra: BTreeMap<&'a str, &'a Value>,
}

impl<'a> NodeView<'a> {
    /// Build the view of `id`.
    #[must_use]
    pub fn new(tree: &'a SiteTree, id: NodeId) -> Self {
        let node = tree.node(id);
        let children = node
            .children()
            .iter()
            .map(|&child| LinkView::new(tree, child))
            .collect();

        let mut view = Self {
            kind: KindName::Folder,
            name: &node.name,
            path: &node.path,
            id: &node.id,
            tags: &node.tags,
            url: node.url(),
            title: "",
            skin: None,
            date: None,
            time: None,
            datetime: None,
            preview: None,
            content: None,
            toc: None,
            prev: None,
            next: None,
            children,
            extra: BTreeMap::new(),
        };

        match &node.kind {
            NodeKind::Folder => {}
            NodeKind::Asset(_) => view.kind = KindName::Asset,
            NodeKind::Page(page) => {
                view.kind = KindName::Page;
                view.title = page.title();
                view.skin = Some(&page.skin);
                view.preview = Some(&page.preview);
                view.content = Some(&page.content);
                view.toc = page.toc.as_deref();
                view.prev = page.prev.map(|prev| LinkView::new(tree, prev));
                view.next = page.next.map(|next| LinkView::new(tree, next));
                if let Some(meta) = &page.meta {
                    view.date = Some(meta.date);
                    view.time = Some(meta.time);
                    view.datetime = Some(meta.datetime);
                    view.extra = meta
                        .extra
                        .iter()
                        .filter(|(key, _)| !VIEW_FIELDS.contains(&key.as_str()))
                        .map(|(key, value)| (key.as_str(), value))
                        .collect();
                }
            }
        }
        view
    }
}

//! Tables of contents with pagination.
//!
//! [`add_toc`] renders one HTML fragment per listed node and stores them on
//! an index page. When there are more fragments than fit on one page, the
//! rest go to sub-pages that are appended as children of the index page and
//! chained through `prev`/`next`:
//!
//! ```text
//! index.md (1-10) <-> index.md_1 (11-20) <-> index.md_2 (21-25)
//! ```

use crate::error::SiteError;
use crate::event::{EventContext, HandlerResult};
use crate::tree::{NodeId, SiteTree};

/// How one listed node becomes an HTML fragment.
#[derive(Clone, Copy)]
pub enum TocItem<'a> {
    /// Render with the named template.
    Skin(&'a str),
    /// Render with a function.
    Render(&'a dyn Fn(&SiteTree, NodeId) -> String),
}

/// Pagination settings.
#[derive(Clone, Debug)]
pub struct TocOptions {
    /// Inserted between page name and sub-page number.
    pub separator: String,
    /// Fragments per page.
    pub page_size: usize,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            separator: "_".to_owned(),
            page_size: 10,
        }
    }
}

/// Split `items` into chunks of at most `size` items.
#[must_use]
pub fn partition<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}

/// Add a table of contents listing `nodes` to the page of `ctx`.
///
/// The first chunk of fragments becomes the page's `toc`; each further chunk
/// becomes a sub-page named `<name><separator><k>` (k counting from 1).
/// Does nothing if the page already has a table of contents, so firing the
/// same event twice creates no duplicate sub-pages.
///
/// # Errors
///
/// Fails if the node is not a page, a template is missing or fails, or a
/// template is requested outside of rendering.
pub fn add_toc(
    ctx: &mut EventContext<'_>,
    nodes: &[NodeId],
    item: TocItem<'_>,
    options: &TocOptions,
) -> HandlerResult {
    let page_id = ctx.node;
    let tree: &SiteTree = ctx.tree;
    let layout = ctx.layout();
    let node = tree.node(page_id);
    let page = node
        .as_page()
        .ok_or_else(|| SiteError::NotAPage(node.path.clone()))?;
    if page.toc.is_some() {
        tracing::debug!(path = %node.path, "TOC already present");
        return Ok(());
    }

    let fragments = nodes
        .iter()
        .map(|&listed| match item {
            TocItem::Render(render) => Ok(render(tree, listed)),
            TocItem::Skin(skin) => layout
                .ok_or_else(|| SiteError::NoLayout(node.path.clone()))?
                .render(skin, tree, listed),
        })
        .collect::<Result<Vec<String>, SiteError>>()?;
    let chunks = partition(&fragments, options.page_size);
    tracing::debug!(
        name = %node.name,
        path = %node.path,
        entries = fragments.len(),
        parts = chunks.len(),
        "TOC main page"
    );

    let mut chunks = chunks.into_iter().map(|chunk| chunk.join("\n"));
    if let Some(page) = ctx.tree.page_mut(page_id) {
        page.toc = Some(chunks.next().unwrap_or_default());
        page.prev = None;
        page.next = None;
    }

    let mut previous = page_id;
    for (k, toc) in chunks.enumerate() {
        let suffix = format!("{}{}", options.separator, k + 1);
        let Some(current) = ctx.tree.add_subpage(page_id, &suffix) else {
            break;
        };
        tracing::debug!(path = %ctx.tree.node(current).path, "TOC sub-page");
        if let Some(page) = ctx.tree.page_mut(current) {
            page.toc = Some(toc);
            page.prev = Some(previous);
        }
        if let Some(page) = ctx.tree.page_mut(previous) {
            page.next = Some(current);
        }
        previous = current;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout::Layout;
    use crate::metadata::FrontMatter;
    use crate::tree::{NodeKind, Page};

    fn page_kind(url: &str) -> NodeKind {
        let created = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        NodeKind::Page(Box::new(Page::new(
            FrontMatter::new(),
            String::new(),
            String::new(),
            url.to_owned(),
            created,
        )))
    }

    /// Tree with `blog/index.md` and `count` posts `n01.md`, `n02.md`, ...
    fn blog(count: usize) -> (SiteTree, NodeId, Vec<NodeId>) {
        let mut tree = SiteTree::new("/");
        let blog = tree.add_child(tree.root(), "blog", "blog", NodeKind::Folder);
        let index = tree.add_child(blog, "index.md", "blog/index.md", page_kind("/blog/index.html"));
        let posts = (1..=count)
            .map(|i| {
                let name = format!("n{i:02}.md");
                let path = format!("blog/{name}");
                tree.add_child(blog, name, path, page_kind(""))
            })
            .collect();
        (tree, index, posts)
    }

    fn name_of(tree: &SiteTree, id: NodeId) -> String {
        tree.node(id).name.trim_end_matches(".md").to_owned()
    }

    fn expected(range: std::ops::RangeInclusive<usize>) -> String {
        range.map(|i| format!("n{i:02}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_partition() {
        assert_eq!(partition(&[1, 2, 3, 4, 5], 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert!(partition::<u8>(&[], 3).is_empty());
    }

    #[test]
    fn test_add_toc_paginates() {
        let (mut tree, index, posts) = blog(25);
        let render = name_of;
        let mut ctx = EventContext::new(&mut tree, index);

        add_toc(&mut ctx, &posts, TocItem::Render(&render), &TocOptions::default()).unwrap();

        let subpages = tree.node(index).children().to_vec();
        assert_eq!(subpages.len(), 2);
        let (sub1, sub2) = (subpages[0], subpages[1]);

        assert_eq!(tree.node(sub1).name, "index.md_1");
        assert_eq!(tree.node(sub2).name, "index.md_2");
        assert_eq!(tree.node(sub2).path, "blog/index_2.md");
        assert_eq!(tree.page(sub2).unwrap().url, "/blog/index_2.html");

        let main = tree.page(index).unwrap();
        assert_eq!(main.toc.as_deref(), Some(expected(1..=10).as_str()));
        assert_eq!(main.prev, None);
        assert_eq!(main.next, Some(sub1));

        let first = tree.page(sub1).unwrap();
        assert_eq!(first.toc.as_deref(), Some(expected(11..=20).as_str()));
        assert_eq!(first.prev, Some(index));
        assert_eq!(first.next, Some(sub2));

        let second = tree.page(sub2).unwrap();
        assert_eq!(second.toc.as_deref(), Some(expected(21..=25).as_str()));
        assert_eq!(second.prev, Some(sub1));
        assert_eq!(second.next, None);
    }

    #[test]
    fn test_add_toc_empty_list() {
        let (mut tree, index, _) = blog(0);
        let render = name_of;
        let mut ctx = EventContext::new(&mut tree, index);

        add_toc(&mut ctx, &[], TocItem::Render(&render), &TocOptions::default()).unwrap();

        assert_eq!(tree.page(index).unwrap().toc.as_deref(), Some(""));
        assert!(tree.node(index).children().is_empty());
    }

    #[test]
    fn test_add_toc_exact_page_size() {
        let (mut tree, index, posts) = blog(10);
        let render = name_of;
        let mut ctx = EventContext::new(&mut tree, index);

        add_toc(&mut ctx, &posts, TocItem::Render(&render), &TocOptions::default()).unwrap();

        assert!(tree.node(index).children().is_empty());
        assert_eq!(tree.page(index).unwrap().next, None);
    }

    #[test]
    fn test_add_toc_not_reentrant() {
        let (mut tree, index, posts) = blog(15);
        let render = name_of;
        let options = TocOptions {
            separator: "-".to_owned(),
            page_size: 5,
        };

        let mut ctx = EventContext::new(&mut tree, index);
        add_toc(&mut ctx, &posts, TocItem::Render(&render), &options).unwrap();
        add_toc(&mut ctx, &posts, TocItem::Render(&render), &options).unwrap();

        let names: Vec<String> = tree
            .node(index)
            .children()
            .iter()
            .map(|&id| tree.node(id).name.clone())
            .collect();
        assert_eq!(names, vec!["index.md-1", "index.md-2"]);
    }

    #[test]
    fn test_add_toc_with_skin_needs_layout() {
        let (mut tree, index, posts) = blog(3);
        let mut ctx = EventContext::new(&mut tree, index);

        let err = add_toc(&mut ctx, &posts, TocItem::Skin("item"), &TocOptions::default()).unwrap_err();
        assert!(matches!(err, SiteError::NoLayout(_)));
    }

    struct ItemLayout;

    impl Layout for ItemLayout {
        fn contains(&self, skin: &str) -> bool {
            skin == "item"
        }

        fn render(&self, skin: &str, tree: &SiteTree, node: NodeId) -> Result<String, SiteError> {
            if skin != "item" {
                return Err(SiteError::MissingTemplate {
                    skin: skin.to_owned(),
                    path: tree.node(node).path.clone(),
                });
            }
            Ok(format!("<li>{}</li>", tree.node(node).name))
        }
    }

    #[test]
    fn test_add_toc_with_skin() {
        let (mut tree, index, posts) = blog(2);
        let layout = ItemLayout;
        let mut ctx = EventContext::with_layout(&mut tree, index, &layout);

        add_toc(&mut ctx, &posts, TocItem::Skin("item"), &TocOptions::default()).unwrap();

        assert_eq!(
            tree.page(index).unwrap().toc.as_deref(),
            Some("<li>n01.md</li>\n<li>n02.md</li>")
        );
    }

    #[test]
    fn test_add_toc_on_folder_fails() {
        let (mut tree, _, posts) = blog(1);
        let folder = tree.find("blog").unwrap();
        let render = name_of;
        let mut ctx = EventContext::new(&mut tree, folder);

        let err = add_toc(&mut ctx, &posts, TocItem::Render(&render), &TocOptions::default()).unwrap_err();
        assert!(matches!(err, SiteError::NotAPage(_)));
    }
}

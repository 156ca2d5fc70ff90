//! Rendering of a built site tree into the output directory.
//!
//! The renderer walks the tree top-down. Each node is bracketed by its
//! `render:pre:*` and `render:post:*` events:
//!
//! - folder: create the output directory (not for the root), render children
//! - page: render the page's skin, write it to its URL, render sub-pages
//! - asset: copy the file byte for byte
//!
//! Page events fire in a fixed order: `any`, `path`, `id` (only for a
//! non-empty id), then one per tag. Sub-pages are read from the tree after
//! the pre-events ran, so pages added by a pre-event handler are rendered
//! too.

use std::fs;
use std::path::PathBuf;

use crate::error::SiteError;
use crate::event::{EventBus, EventContext};
use crate::layout::Layout;
use crate::tree::{NodeId, NodeKind, SiteTree};

/// Renders a [`SiteTree`].
pub struct Renderer<'a> {
    bus: &'a EventBus,
    layout: &'a dyn Layout,
    input: PathBuf,
    output: PathBuf,
}

impl<'a> Renderer<'a> {
    /// Create a renderer that reads assets from `input` and writes to `output`.
    pub fn new(
        bus: &'a EventBus,
        layout: &'a dyn Layout,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bus,
            layout,
            input: input.into(),
            output: output.into(),
        }
    }

    /// Render the whole tree.
    ///
    /// # Errors
    ///
    /// Fails on the first I/O error, missing template, template error or
    /// handler error; the output directory may be incomplete afterwards.
    pub fn render(&self, tree: &mut SiteTree) -> Result<(), SiteError> {
        let root = tree.root();
        self.render_node(tree, root)
    }

    fn render_node(&self, tree: &mut SiteTree, id: NodeId) -> Result<(), SiteError> {
        let (is_folder, is_page) = match &tree.node(id).kind {
            NodeKind::Folder => (true, false),
            NodeKind::Page(_) => (false, true),
            NodeKind::Asset(_) => (false, false),
        };
        if is_folder {
            self.render_folder(tree, id)
        } else if is_page {
            self.render_page(tree, id)
        } else {
            self.render_asset(tree, id)
        }
    }

    fn render_folder(&self, tree: &mut SiteTree, id: NodeId) -> Result<(), SiteError> {
        let node = tree.node(id);
        let path = node.path.clone();
        let is_root = node.parent().is_none();

        if is_root {
            self.fire(tree, id, "render:pre:root")?;
        } else {
            self.fire(tree, id, &format!("render:pre:folder:path:{path}"))?;
            let dir = self.output.join(&path);
            fs::create_dir(&dir).map_err(SiteError::io(dir))?;
        }

        let children = tree.node(id).children().to_vec();
        for child in children {
            self.render_node(tree, child)?;
        }

        if is_root {
            self.fire(tree, id, "render:post:root")
        } else {
            self.fire(tree, id, &format!("render:post:folder:path:{path}"))
        }
    }

    fn render_page(&self, tree: &mut SiteTree, id: NodeId) -> Result<(), SiteError> {
        self.fire_page_events(tree, id, "pre")?;

        let node = tree.node(id);
        let page = node
            .as_page()
            .ok_or_else(|| SiteError::NotAPage(node.path.clone()))?;
        if !self.layout.contains(&page.skin) {
            return Err(SiteError::MissingTemplate {
                skin: page.skin.clone(),
                path: node.path.clone(),
            });
        }
        let html = self.layout.render(&page.skin, tree, id)?;

        let rel = page
            .url
            .strip_prefix(tree.root_url())
            .unwrap_or_else(|| page.url.trim_start_matches('/'));
        let target = self.output.join(rel);
        tracing::debug!(path = %node.path, target = %target.display(), "Write page");
        fs::write(&target, html).map_err(SiteError::io(target))?;

        let children = node.children().to_vec();
        for child in children {
            self.render_node(tree, child)?;
        }

        self.fire_page_events(tree, id, "post")
    }

    fn render_asset(&self, tree: &mut SiteTree, id: NodeId) -> Result<(), SiteError> {
        let node = tree.node(id);
        let path = node.path.clone();
        let extension = node.extension().to_owned();

        self.fire(tree, id, &format!("render:pre:asset:path:{path}"))?;
        self.fire(tree, id, &format!("render:pre:asset:extension:{extension}"))?;

        let source = self.input.join(&path);
        fs::copy(&source, self.output.join(&path)).map_err(SiteError::io(source))?;

        self.fire(tree, id, &format!("render:post:asset:path:{path}"))?;
        self.fire(tree, id, &format!("render:post:asset:extension:{extension}"))
    }

    /// Fire the `any`, `path`, `id` and `tag` events of a page in order.
    ///
    /// The id and tags are read after the preceding events ran.
    fn fire_page_events(&self, tree: &mut SiteTree, id: NodeId, stage: &str) -> Result<(), SiteError> {
        self.fire(tree, id, &format!("render:{stage}:page:any"))?;

        let path = tree.node(id).path.clone();
        self.fire(tree, id, &format!("render:{stage}:page:path:{path}"))?;

        let page_id = tree.node(id).id.clone();
        if !page_id.is_empty() {
            self.fire(tree, id, &format!("render:{stage}:page:id:{page_id}"))?;
        }

        let tags = tree.node(id).tags.clone();
        for tag in tags {
            self.fire(tree, id, &format!("render:{stage}:page:tag:{tag}"))?;
        }
        Ok(())
    }

    fn fire(&self, tree: &mut SiteTree, id: NodeId, label: &str) -> Result<(), SiteError> {
        self.bus
            .fire(label, &mut EventContext::with_layout(tree, id, self.layout))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::builder::TreeBuilder;
    use crate::metadata::MetaNormalizer;
    use crate::processor::register_converters;

    /// Layout with a fixed set of skins rendering `skin:name:content`.
    struct StubLayout(Vec<&'static str>);

    impl Layout for StubLayout {
        fn contains(&self, skin: &str) -> bool {
            self.0.iter().any(|s| *s == skin)
        }

        fn render(&self, skin: &str, tree: &SiteTree, node: NodeId) -> Result<String, SiteError> {
            let node = tree.node(node);
            let content = node.as_page().map_or("", |p| p.content.as_str());
            let toc = node.as_page().and_then(|p| p.toc.as_deref()).unwrap_or("");
            Ok(format!("{skin}:{}:{content}{toc}", node.name))
        }
    }

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site_bus() -> EventBus {
        let mut bus = EventBus::new();
        register_converters(&mut bus, bass_markup::default_converters(), &MetaNormalizer::new());
        bus
    }

    fn output_entries(dir: &Path) -> Vec<String> {
        let mut result = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(current) = stack.pop() {
            for entry in fs::read_dir(&current).unwrap() {
                let path = entry.unwrap().path();
                let rel = path.strip_prefix(dir).unwrap().to_string_lossy().into_owned();
                if path.is_dir() {
                    result.push(format!("{rel}/"));
                    stack.push(path);
                } else {
                    result.push(rel);
                }
            }
        }
        result.sort();
        result
    }

    #[test]
    fn test_render_site() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&output).unwrap();
        write(&input, "index.md", "Home");
        write(&input, "blog/post.txt", "skin: post\n---\nHello");
        write(&input, "blog/img/logo.png", "PNG");
        write(&input, "empty/.keep", "");

        let bus = site_bus();
        let mut tree = TreeBuilder::new(&bus, &input)
            .with_ignore(&[".?*".to_owned()])
            .unwrap()
            .build()
            .unwrap();
        let layout = StubLayout(vec!["default", "post"]);
        Renderer::new(&bus, &layout, &input, &output)
            .render(&mut tree)
            .unwrap();

        assert_eq!(
            output_entries(&output),
            vec![
                "blog/",
                "blog/img/",
                "blog/img/logo.png",
                "blog/post.html",
                "empty/",
                "index.html",
            ]
        );
        assert_eq!(
            fs::read_to_string(output.join("index.html")).unwrap(),
            "default:index.md:<p>Home</p>\n"
        );
        assert_eq!(
            fs::read_to_string(output.join("blog/post.html")).unwrap(),
            "post:post.txt:<p>Hello</p>"
        );
        assert_eq!(fs::read(output.join("blog/img/logo.png")).unwrap(), b"PNG");
    }

    #[test]
    fn test_one_output_directory_per_folder() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&output).unwrap();
        for folder in ["a", "a/b", "a/b/c", "d"] {
            fs::create_dir_all(input.join(folder)).unwrap();
        }

        let bus = site_bus();
        let mut tree = TreeBuilder::new(&bus, &input).build().unwrap();
        let layout = StubLayout(vec!["default"]);
        Renderer::new(&bus, &layout, &input, &output)
            .render(&mut tree)
            .unwrap();

        let folders = tree.ids().filter(|&id| tree.node(id).is_folder()).count() - 1;
        let entries = output_entries(&output);
        assert_eq!(entries, vec!["a/", "a/b/", "a/b/c/", "d/"]);
        assert_eq!(entries.len(), folders);
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&output).unwrap();
        write(&input, "page.md", "skin: fancy\n---\nBody");

        let bus = site_bus();
        let mut tree = TreeBuilder::new(&bus, &input).build().unwrap();
        let layout = StubLayout(vec!["default"]);
        let err = Renderer::new(&bus, &layout, &input, &output)
            .render(&mut tree)
            .unwrap_err();

        assert!(
            matches!(err, SiteError::MissingTemplate { ref skin, ref path } if skin == "fancy" && path == "page.md")
        );
    }

    #[test]
    fn test_existing_output_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir_all(input.join("sub")).unwrap();
        fs::create_dir_all(output.join("sub")).unwrap();

        let bus = site_bus();
        let mut tree = TreeBuilder::new(&bus, &input).build().unwrap();
        let layout = StubLayout(vec!["default"]);
        let err = Renderer::new(&bus, &layout, &input, &output)
            .render(&mut tree)
            .unwrap_err();

        assert!(matches!(err, SiteError::Io { .. }));
    }

    #[test]
    fn test_page_event_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&output).unwrap();
        write(&input, "p.md", "id: home\ntags: x y\n---\nBody");

        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = site_bus();
        for stage in ["pre", "post"] {
            for suffix in ["any", "path:p.md", "id:home", "tag:x", "tag:y"] {
                let label = format!("render:{stage}:page:{suffix}");
                let log = Arc::clone(&log);
                let entry = label.clone();
                bus.register(label, move |_| {
                    log.lock().unwrap().push(entry.clone());
                    Ok(())
                });
            }
        }

        let mut tree = TreeBuilder::new(&bus, &input).build().unwrap();
        let layout = StubLayout(vec!["default"]);
        Renderer::new(&bus, &layout, &input, &output)
            .render(&mut tree)
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "render:pre:page:any",
                "render:pre:page:path:p.md",
                "render:pre:page:id:home",
                "render:pre:page:tag:x",
                "render:pre:page:tag:y",
                "render:post:page:any",
                "render:post:page:path:p.md",
                "render:post:page:id:home",
                "render:post:page:tag:x",
                "render:post:page:tag:y",
            ]
        );
    }

    #[test]
    fn test_root_folder_and_asset_event_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&output).unwrap();
        write(&input, "d/logo.png", "PNG");

        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = site_bus();
        let labels = [
            ("render:pre:root", ""),
            ("render:pre:folder:path:d", "d"),
            ("render:pre:asset:path:d/logo.png", "d/logo.png"),
            ("render:pre:asset:extension:png", "d/logo.png"),
            ("render:post:asset:path:d/logo.png", "d/logo.png"),
            ("render:post:asset:extension:png", "d/logo.png"),
            ("render:post:folder:path:d", "d"),
            ("render:post:root", ""),
        ];
        for (label, target) in labels {
            let log = Arc::clone(&log);
            let target = output.join(target);
            bus.register(label, move |_| {
                log.lock().unwrap().push(format!("{label} {}", target.exists()));
                Ok(())
            });
        }

        let mut tree = TreeBuilder::new(&bus, &input).build().unwrap();
        let layout = StubLayout(vec!["default"]);
        Renderer::new(&bus, &layout, &input, &output)
            .render(&mut tree)
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "render:pre:root true",
                "render:pre:folder:path:d false",
                "render:pre:asset:path:d/logo.png false",
                "render:pre:asset:extension:png false",
                "render:post:asset:path:d/logo.png true",
                "render:post:asset:extension:png true",
                "render:post:folder:path:d true",
                "render:post:root true",
            ]
        );
    }

    #[test]
    fn test_subpages_added_by_pre_event_are_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&output).unwrap();
        write(&input, "list.md", "List");

        let mut bus = site_bus();
        bus.register("render:pre:page:path:list.md", |ctx| {
            ctx.tree.add_subpage(ctx.node, "_1");
            Ok(())
        });

        let mut tree = TreeBuilder::new(&bus, &input).build().unwrap();
        let layout = StubLayout(vec!["default"]);
        Renderer::new(&bus, &layout, &input, &output)
            .render(&mut tree)
            .unwrap();

        assert_eq!(output_entries(&output), vec!["list.html", "list_1.html"]);
    }

    #[test]
    fn test_root_url_stripped_from_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&output).unwrap();
        write(&input, "docs/a.md", "A");

        let bus = site_bus();
        let mut tree = TreeBuilder::new(&bus, &input)
            .with_root_url("/project/")
            .build()
            .unwrap();
        // the processor derives the URL from the tree's root URL
        let a = tree.find("docs/a.md").unwrap();
        assert_eq!(tree.page(a).unwrap().url, "/project/docs/a.html");

        let layout = StubLayout(vec!["default"]);
        Renderer::new(&bus, &layout, &input, &output)
            .render(&mut tree)
            .unwrap();

        assert!(output.join("docs/a.html").is_file());
    }
}

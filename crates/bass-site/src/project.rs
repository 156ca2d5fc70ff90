//! Project lifecycle: create, verify, build and rebuild.

use std::fs;
use std::path::{Path, PathBuf};

use bass_config::{CONFIG_FILENAME, Config};
use bass_markup::default_converters;

use crate::builder::TreeBuilder;
use crate::error::SiteError;
use crate::event::EventBus;
use crate::handlers::{register_hooks, register_tocs};
use crate::layout::Layout;
use crate::metadata::MetaNormalizer;
use crate::processor::register_converters;
use crate::renderer::Renderer;
use crate::tree::SiteTree;

/// Template written to `layout/default.html` of a new project.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{{ this.title }}</title>
</head>
<body>
  <h1>{{ this.title }}</h1>
  {{ this.content | safe }}
  {% if this.toc %}<ul>{{ this.toc | safe }}</ul>{% endif %}
  {% if this.prev %}<a href="{{ this.prev.url }}">Previous</a>{% endif %}
  {% if this.next %}<a href="{{ this.next.url }}">Next</a>{% endif %}
</body>
</html>
"#;

/// Settings the build pipeline needs.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    /// Content directory.
    pub input: PathBuf,
    /// Output directory.
    pub output: PathBuf,
    /// Template directory.
    pub layout: PathBuf,
    /// Prefix of every generated URL.
    pub root_url: String,
    /// Ignore patterns for the tree builder.
    pub ignore: Vec<String>,
    /// Whether symbolic links are followed.
    pub follow_links: bool,
}

impl SiteSettings {
    /// Extract the site settings from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            input: config.paths_resolved.input.clone(),
            output: config.paths_resolved.output.clone(),
            layout: config.paths_resolved.layout.clone(),
            root_url: config.site.root_url.clone(),
            ignore: config.build.ignore(),
            follow_links: config.build.follow_links,
        }
    }
}

/// A site project: its settings and the event bus of its build pipeline.
#[derive(Debug)]
pub struct Project {
    settings: SiteSettings,
    bus: EventBus,
}

impl Project {
    /// Create a project with an empty event bus.
    #[must_use]
    pub fn new(settings: SiteSettings) -> Self {
        Self {
            settings,
            bus: EventBus::new(),
        }
    }

    /// Create a project from configuration.
    ///
    /// Registers page processors for the default converters, the configured
    /// hooks and the configured tables of contents.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut project = Self::new(SiteSettings::from_config(config));
        let normalizer = MetaNormalizer::new().with_tag_separator(config.build.tag_separator.as_str());
        register_converters(&mut project.bus, default_converters(), &normalizer);
        register_hooks(&mut project.bus, &config.hooks);
        register_tocs(&mut project.bus, &config.toc);
        project
    }

    /// Project settings.
    #[must_use]
    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Event bus of the build pipeline.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Mutable event bus, for registering extra handlers.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Build a fresh site tree from the input directory.
    pub fn generate(&self) -> Result<SiteTree, SiteError> {
        tracing::info!(input = %self.settings.input.display(), "Building site tree");
        TreeBuilder::new(&self.bus, &self.settings.input)
            .with_ignore(&self.settings.ignore)?
            .with_follow_links(self.settings.follow_links)
            .with_root_url(self.settings.root_url.as_str())
            .build()
    }

    /// Verify the project directories, then [`rebuild`](Self::rebuild).
    pub fn build(&self, layout: &dyn Layout) -> Result<SiteTree, SiteError> {
        verify_project(&self.settings)?;
        self.rebuild(layout)
    }

    /// Generate the tree, clean the output directory and render.
    ///
    /// Returns the rendered tree.
    pub fn rebuild(&self, layout: &dyn Layout) -> Result<SiteTree, SiteError> {
        let mut tree = self.generate()?;
        prepare_output(&self.settings.output)?;
        tracing::info!(output = %self.settings.output.display(), "Rendering site tree");
        Renderer::new(&self.bus, layout, &self.settings.input, &self.settings.output)
            .render(&mut tree)?;
        Ok(tree)
    }
}

/// Create a new project in `dir`.
///
/// Writes a default `bass.toml`, the `input`, `output` and `layout`
/// directories and `layout/default.html`. `dir` is created if needed and
/// must be empty otherwise.
pub fn create_project(dir: &Path) -> Result<(), SiteError> {
    tracing::info!(dir = %dir.display(), "Creating project");
    if dir.exists() {
        let mut entries = fs::read_dir(dir).map_err(SiteError::io(dir))?;
        if entries.next().is_some() {
            return Err(SiteError::NotEmpty(dir.to_path_buf()));
        }
    } else {
        fs::create_dir_all(dir).map_err(SiteError::io(dir))?;
    }

    let config_path = dir.join(CONFIG_FILENAME);
    fs::write(&config_path, Config::default_toml()).map_err(SiteError::io(config_path))?;
    for name in ["input", "output", "layout"] {
        let path = dir.join(name);
        fs::create_dir(&path).map_err(SiteError::io(path))?;
    }
    let template = dir.join("layout").join("default.html");
    fs::write(&template, DEFAULT_TEMPLATE).map_err(SiteError::io(template))?;
    Ok(())
}

/// Check that the input, output and layout directories exist.
pub fn verify_project(settings: &SiteSettings) -> Result<(), SiteError> {
    for dir in [&settings.input, &settings.output, &settings.layout] {
        if !dir.is_dir() {
            return Err(SiteError::MissingDirectory(dir.clone()));
        }
    }
    Ok(())
}

/// Remove everything from `output` except entries whose name starts with a dot.
pub fn prepare_output(output: &Path) -> Result<(), SiteError> {
    tracing::debug!(output = %output.display(), "Clean output directory");
    let entries = fs::read_dir(output).map_err(SiteError::io(output))?;
    for entry in entries {
        let entry = entry.map_err(SiteError::io(output))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        let is_dir = entry.file_type().map_err(SiteError::io(&path))?.is_dir();
        let result = if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(SiteError::io(path))?;
    }
    Ok(())
}

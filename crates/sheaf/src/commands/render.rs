//! `sheaf render` command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use sheaf_config::{AffordanceSetting, CliSettings, Config, PlaceholderSetting, RenderModeSetting};
use sheaf_diagrams::{DiagramLanguage, DiagramPlaceholder, DiagramPlugin};
use sheaf_document::{Document, NodeId};
use sheaf_links::{HashtagPlugin, WikilinkPlugin};
use sheaf_renderer::{Affordance, DocumentRenderer, Plugin, RenderMode, RenderResult};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// JSON document map (node id to node).
    document: PathBuf,

    /// Id of the node to render.
    #[arg(short, long)]
    root: String,

    /// Path to configuration file (default: auto-discover sheaf.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render in interactive mode: start diagram loads and re-render once
    /// they settle.
    #[arg(long)]
    interactive: bool,

    /// Hide unknown-block placeholders (overrides config).
    #[arg(long)]
    production: bool,

    /// Seconds to wait for lazy renderers before the second interactive pass.
    #[arg(long, default_value_t = 10)]
    wait: u64,

    /// Write HTML to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output (render timing and plugin logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the document cannot be loaded, or
    /// the root node does not exist.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            mode: self.interactive.then_some(RenderModeSetting::Interactive),
            production: self.production.then_some(true),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }

        let json = std::fs::read_to_string(&self.document)?;
        let document = Document::from_json(&json)?;
        let root = NodeId::from(self.root);
        if !document.contains(&root) {
            return Err(CliError::Validation(format!(
                "Node {root} not found in {}",
                self.document.display()
            )));
        }

        let pipeline = Pipeline::from_config(&config)?;
        let result = pipeline.render(&document, &root, Duration::from_secs(self.wait));

        output.diagnostics(&result.diagnostics);

        match self.output {
            Some(path) => {
                std::fs::write(&path, &result.html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => output.html(&result.html)?,
        }

        Ok(())
    }
}

/// Renderer plus the diagram plugin handle needed for a second pass.
struct Pipeline {
    renderer: DocumentRenderer,
    diagrams: Option<Arc<DiagramPlugin>>,
    interactive: bool,
}

impl Pipeline {
    fn from_config(config: &Config) -> Result<Self, CliError> {
        let mut plugins: Vec<Arc<dyn Plugin>> = Vec::new();

        let diagrams = if config.diagrams.enabled {
            let plugin = Arc::new(diagram_plugin(config)?);
            let shared = Arc::clone(&plugin);
            plugins.push(shared);
            Some(plugin)
        } else {
            None
        };

        // Wikilinks before hashtags so `#` inside a link label stays literal.
        if config.links.wikilinks {
            plugins.push(Arc::new(
                WikilinkPlugin::new(config.links.wikilink_base.as_str())
                    .with_priority(config.links.priority),
            ));
        }
        if config.links.hashtags {
            plugins.push(Arc::new(
                HashtagPlugin::new(config.links.hashtag_base.as_str())
                    .with_priority(config.links.priority),
            ));
        }

        let interactive = config.render.mode == RenderModeSetting::Interactive;
        let renderer = DocumentRenderer::new(plugins)
            .with_mode(if interactive {
                RenderMode::Interactive
            } else {
                RenderMode::Server
            })
            .with_production(config.render.production)
            .with_parallel(config.render.parallel)
            .with_max_depth(config.render.max_depth)
            .with_hidden(config.render.hidden.iter().map(String::as_str))
            .with_affordance(affordance(&config.render.affordance));

        tracing::info!(plugins = ?renderer.chain().names(), "Plugin chain ready");

        Ok(Self {
            renderer,
            diagrams,
            interactive,
        })
    }

    /// Render `root`. In interactive mode, wait up to `timeout` for started
    /// loads and render a second pass with whatever has settled.
    fn render(&self, document: &Document, root: &NodeId, timeout: Duration) -> RenderResult {
        let first = self.renderer.render(document, root);
        let Some(diagrams) = self.diagrams.as_ref().filter(|_| self.interactive) else {
            return first;
        };
        if !diagrams.wait(timeout) {
            tracing::warn!(?timeout, "Diagram renderers still loading");
        }
        self.renderer.render(document, root)
    }
}

fn diagram_plugin(config: &Config) -> Result<DiagramPlugin, CliError> {
    let placeholder = match config.diagrams.placeholder {
        PlaceholderSetting::Skeleton => DiagramPlaceholder::Skeleton,
        PlaceholderSetting::Source => DiagramPlaceholder::Source,
    };
    let mut plugin = DiagramPlugin::new()
        .with_priority(config.diagrams.priority)
        .with_placeholder(placeholder);
    if let Some(names) = &config.diagrams.languages {
        plugin = plugin.with_languages(parse_languages(names)?);
    }
    Ok(plugin)
}

fn parse_languages(names: &[String]) -> Result<Vec<DiagramLanguage>, CliError> {
    names
        .iter()
        .map(|name| {
            DiagramLanguage::parse(name).ok_or_else(|| {
                CliError::Validation(format!("Unknown diagram language in diagrams.languages: {name}"))
            })
        })
        .collect()
}

fn affordance(setting: &AffordanceSetting) -> Affordance {
    match setting {
        AffordanceSetting::Enabled(enabled) => Affordance::from(*enabled),
        AffordanceSetting::Types(types) => Affordance::types(types.iter().map(String::as_str)),
    }
}

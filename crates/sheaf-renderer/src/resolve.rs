//! Renderer resolution.
//!
//! Precedence, highest first:
//!
//! 1. caller override registered for the node's type tag
//! 2. first plugin override, in chain order
//! 3. built-in renderer for a known [`BlockType`]
//! 4. unknown-block placeholder

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Map;
use sheaf_document::{Node, NodeId};

use crate::blocks::{BlockType, UnknownBlock, builtin_renderer};
use crate::chain::PluginChain;
use crate::diagnostics::{Diagnostics, Stage};
use crate::plugin::OverrideResult;
use crate::renderer::BlockRenderer;

/// A plugin override together with the plugin that produced it.
#[derive(Clone, Debug)]
pub struct OverrideMatch {
    pub plugin: String,
    pub result: OverrideResult,
}

/// Ask each plugin in order for an override; the first `Some` wins.
///
/// A failing plugin is logged and treated as "no match".
pub fn resolve_override(
    node: &Node,
    id: &NodeId,
    chain: &PluginChain,
    diagnostics: &Diagnostics,
) -> Option<OverrideMatch> {
    chain.iter().find_map(|plugin| {
        diagnostics
            .run_hook(Stage::Override, plugin, || plugin.override_block(node, id))
            .flatten()
            .map(|result| OverrideMatch {
                plugin: plugin.name().to_owned(),
                result,
            })
    })
}

/// Which tier supplied the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RendererSource {
    Caller,
    Plugin(String),
    Builtin(BlockType),
    Unknown,
}

/// Outcome of resolution for one node.
#[derive(Clone)]
pub struct Resolved {
    pub renderer: Arc<dyn BlockRenderer>,
    pub extra: Map<String, serde_json::Value>,
    pub source: RendererSource,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("source", &self.source)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

/// Caller overrides plus the built-in type table.
pub struct RendererTable {
    overrides: HashMap<String, Arc<dyn BlockRenderer>>,
    builtins: HashMap<BlockType, Arc<dyn BlockRenderer>>,
    unknown: Arc<dyn BlockRenderer>,
}

impl Default for RendererTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
            builtins: BlockType::ALL
                .iter()
                .map(|&kind| (kind, builtin_renderer(kind)))
                .collect(),
            unknown: Arc::new(UnknownBlock),
        }
    }

    /// Register a caller override for a type tag. Replaces any earlier one.
    pub fn set_override(&mut self, node_type: impl Into<String>, renderer: Arc<dyn BlockRenderer>) {
        self.overrides.insert(node_type.into(), renderer);
    }

    /// Resolve the renderer for a (transformed) node.
    pub fn resolve(
        &self,
        node: &Node,
        id: &NodeId,
        chain: &PluginChain,
        diagnostics: &Diagnostics,
    ) -> Resolved {
        if let Some(renderer) = self.overrides.get(&node.node_type) {
            return Resolved {
                renderer: Arc::clone(renderer),
                extra: Map::new(),
                source: RendererSource::Caller,
            };
        }

        if let Some(found) = resolve_override(node, id, chain, diagnostics) {
            return Resolved {
                renderer: found.result.renderer,
                extra: found.result.props,
                source: RendererSource::Plugin(found.plugin),
            };
        }

        if let Some(kind) = BlockType::parse(&node.node_type)
            && let Some(renderer) = self.builtins.get(&kind)
        {
            return Resolved {
                renderer: Arc::clone(renderer),
                extra: Map::new(),
                source: RendererSource::Builtin(kind),
            };
        }

        Resolved {
            renderer: Arc::clone(&self.unknown),
            extra: Map::new(),
            source: RendererSource::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Plugin, PluginError, priority};
    use crate::renderer::render_fn;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    struct CodeOverride {
        name: &'static str,
        priority: i32,
    }

    impl Plugin for CodeOverride {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn override_block(
            &self,
            node: &Node,
            _id: &NodeId,
        ) -> Result<Option<OverrideResult>, PluginError> {
            if node.node_type != "code" {
                return Ok(None);
            }
            let name = self.name;
            let renderer = render_fn(move |_| Ok(Some(name.to_owned())));
            Ok(Some(OverrideResult::new(Arc::new(renderer)).with_prop("by", name)))
        }
    }

    struct Panicking;

    impl Plugin for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn priority(&self) -> i32 {
            priority::FIRST
        }

        fn override_block(
            &self,
            _node: &Node,
            _id: &NodeId,
        ) -> Result<Option<OverrideResult>, PluginError> {
            panic!("override exploded")
        }
    }

    fn chain(plugins: Vec<Arc<dyn Plugin>>) -> PluginChain {
        PluginChain::new(plugins)
    }

    #[test]
    fn test_lower_priority_plugin_wins() {
        let node = Node::new("c", "code");
        let found = resolve_override(
            &node,
            &node.id,
            &chain(vec![
                Arc::new(CodeOverride {
                    name: "second",
                    priority: 50,
                }),
                Arc::new(CodeOverride {
                    name: "first",
                    priority: 0,
                }),
            ]),
            &Diagnostics::new(),
        )
        .unwrap();
        assert_eq!(found.plugin, "first");
        assert_eq!(found.result.props.get("by"), Some(&Value::from("first")));
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let node = Node::new("c", "code");
        let plugins = |first: &'static str, second: &'static str| {
            chain(vec![
                Arc::new(CodeOverride {
                    name: first,
                    priority: priority::DEFAULT,
                }),
                Arc::new(CodeOverride {
                    name: second,
                    priority: priority::DEFAULT,
                }),
            ])
        };

        let found = resolve_override(&node, &node.id, &plugins("a", "b"), &Diagnostics::new());
        assert_eq!(found.unwrap().plugin, "a");

        let found = resolve_override(&node, &node.id, &plugins("b", "a"), &Diagnostics::new());
        assert_eq!(found.unwrap().plugin, "b");
    }

    #[test]
    fn test_no_match_returns_none() {
        let node = Node::new("t", "text");
        let found = resolve_override(
            &node,
            &node.id,
            &chain(vec![Arc::new(CodeOverride {
                name: "code",
                priority: 50,
            })]),
            &Diagnostics::new(),
        );
        assert!(found.is_none());
    }

    #[test]
    fn test_panicking_plugin_treated_as_no_match() {
        let node = Node::new("c", "code");
        let diagnostics = Diagnostics::new();
        let found = resolve_override(
            &node,
            &node.id,
            &chain(vec![
                Arc::new(Panicking),
                Arc::new(CodeOverride {
                    name: "fallback",
                    priority: 50,
                }),
            ]),
            &diagnostics,
        )
        .unwrap();
        assert_eq!(found.plugin, "fallback");
        assert_eq!(
            diagnostics.entries()[0].to_string(),
            "plugin override error: panicking panicked: override exploded"
        );
    }

    #[test]
    fn test_caller_override_beats_plugin() {
        let mut table = RendererTable::new();
        table.set_override("code", Arc::new(render_fn(|_| Ok(None))));
        let node = Node::new("c", "code");
        let resolved = table.resolve(
            &node,
            &node.id,
            &chain(vec![Arc::new(CodeOverride {
                name: "plugin",
                priority: 0,
            })]),
            &Diagnostics::new(),
        );
        assert_eq!(resolved.source, RendererSource::Caller);
    }

    #[test]
    fn test_plugin_beats_builtin() {
        let table = RendererTable::new();
        let node = Node::new("c", "code");
        let resolved = table.resolve(
            &node,
            &node.id,
            &chain(vec![Arc::new(CodeOverride {
                name: "plugin",
                priority: 0,
            })]),
            &Diagnostics::new(),
        );
        assert_eq!(resolved.source, RendererSource::Plugin("plugin".to_owned()));
        assert_eq!(resolved.extra.get("by"), Some(&Value::from("plugin")));
    }

    #[test]
    fn test_builtin_beats_unknown() {
        let table = RendererTable::new();
        let node = Node::new("c", "code");
        let resolved = table.resolve(&node, &node.id, &PluginChain::empty(), &Diagnostics::new());
        assert_eq!(resolved.source, RendererSource::Builtin(BlockType::Code));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let table = RendererTable::new();
        let node = Node::new("x", "kanban_board");
        let resolved = table.resolve(&node, &node.id, &PluginChain::empty(), &Diagnostics::new());
        assert_eq!(resolved.source, RendererSource::Unknown);
    }

    #[test]
    fn test_caller_override_for_unknown_type() {
        let mut table = RendererTable::new();
        table.set_override("kanban_board", Arc::new(render_fn(|_| Ok(None))));
        let node = Node::new("x", "kanban_board");
        let resolved = table.resolve(&node, &node.id, &PluginChain::empty(), &Diagnostics::new());
        assert_eq!(resolved.source, RendererSource::Caller);
    }
}

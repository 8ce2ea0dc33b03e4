//! Priority-ordered plugin chain.

use std::fmt;
use std::sync::Arc;

use crate::plugin::Plugin;

/// Sort plugins ascending by priority, keeping registration order among equals.
#[must_use]
pub fn sort_by_priority(plugins: &[Arc<dyn Plugin>]) -> Vec<Arc<dyn Plugin>> {
    let mut sorted = plugins.to_vec();
    // `sort_by_key` is stable
    sorted.sort_by_key(|plugin| plugin.priority());
    sorted
}

/// Plugins in the order every pipeline stage consults them.
///
/// Built once per render pass so that a plugin has the same position in the
/// block transform, override and text transform stages.
#[derive(Clone, Default)]
pub struct PluginChain {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginChain {
    /// Create a chain from plugins in registration order.
    #[must_use]
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Self {
            plugins: sort_by_priority(&plugins),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(Arc::as_ref)
    }

    /// Plugin names in chain order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(Plugin::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

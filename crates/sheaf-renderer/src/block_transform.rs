//! Block transform pipeline.

use std::borrow::Cow;

use sheaf_document::{Node, NodeId};

use crate::chain::PluginChain;
use crate::diagnostics::{Diagnostics, Stage};

/// Fold every plugin's block transform over `node`, left to right.
///
/// The input is never mutated; the result borrows it when no plugin made a
/// change. A failing plugin is logged and skipped, and the fold continues
/// with the working copy it was given.
pub fn transform_block<'a>(
    node: &'a Node,
    id: &NodeId,
    chain: &PluginChain,
    diagnostics: &Diagnostics,
) -> Cow<'a, Node> {
    chain.iter().fold(Cow::Borrowed(node), |working, plugin| {
        match diagnostics.run_hook(Stage::BlockTransform, plugin, || {
            plugin.transform_block(&working, id)
        }) {
            Some(Some(next)) => Cow::Owned(next),
            _ => working,
        }
    })
}

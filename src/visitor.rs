//! Mutable traversal over the arena IR.
//!
//! Traversal is pre-order in source order. A node's children are read after
//! `enter` returns, so a pass that rewrites a node and keeps going sees the new
//! shape. Passes return [`VisitAction::Skip`] after a replacement so that the
//! nodes they just built are never visited again.

use crate::ast::{Module, NodeId};
use crate::validate::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    Continue,
    Skip,
}

pub trait Visitor {
    fn enter(&mut self, module: &mut Module, node: NodeId) -> Result<VisitAction, TransformError>;
}

pub fn walk<V: Visitor + ?Sized>(
    visitor: &mut V,
    module: &mut Module,
    node: NodeId,
) -> Result<(), TransformError> {
    match visitor.enter(module, node)? {
        VisitAction::Skip => Ok(()),
        VisitAction::Continue => walk_children(visitor, module, node),
    }
}

/// Siblings inserted while the children are being walked are not visited.
pub fn walk_children<V: Visitor + ?Sized>(
    visitor: &mut V,
    module: &mut Module,
    node: NodeId,
) -> Result<(), TransformError> {
    for child in module.tree.children(node) {
        walk(visitor, module, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::parse::parse_module;

    struct Collect {
        seen: Vec<String>,
        skip_calls: bool,
    }

    impl Visitor for Collect {
        fn enter(&mut self, module: &mut Module, node: NodeId) -> Result<VisitAction, TransformError> {
            match module.tree.kind(node) {
                NodeKind::Identifier { name } => self.seen.push(name.clone()),
                NodeKind::CallExpression { .. } if self.skip_calls => return Ok(VisitAction::Skip),
                _ => {}
            }
            Ok(VisitAction::Continue)
        }
    }

    #[test]
    fn visits_in_source_order_and_honors_skip() {
        let mut module = parse_module("a + f(b); c;", false).unwrap();
        let root = module.root();

        let mut all = Collect { seen: vec![], skip_calls: false };
        walk(&mut all, &mut module, root).unwrap();
        assert_eq!(all.seen, vec!["a", "f", "b", "c"]);

        let mut pruned = Collect { seen: vec![], skip_calls: true };
        walk(&mut pruned, &mut module, root).unwrap();
        assert_eq!(pruned.seen, vec!["a", "c"]);
    }
}

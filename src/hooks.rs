//! Runtime helper resolution.
//!
//! Rewrites emit calls to runtime helpers (`splitProps`, `createSignal`). A
//! [`HookResolver`] maps a helper name to the local identifier that refers to
//! it, adding whatever import that requires. The default resolver emits one
//! aliased import per helper and module: `import { splitProps as _splitProps } from "solid-js";`.

use std::collections::HashMap;
use tracing::debug;

use crate::ast::{ImportSpecifier, Module, NodeKind};
use crate::validate::TransformError;
use oxc_span::SPAN;

pub const DEFAULT_HOOK_SOURCE: &str = "solid-js";

pub trait HookResolver {
    /// Local name bound to the runtime helper `name`.
    fn hook_identifier(&mut self, module: &mut Module, name: &str) -> Result<String, TransformError>;
}

/// Imports helpers from a fixed module, once per helper.
#[derive(Debug, Clone)]
pub struct ImportHooks {
    source: String,
    imported: HashMap<String, String>,
}

impl ImportHooks {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            imported: HashMap::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Default for ImportHooks {
    fn default() -> Self {
        Self::new(DEFAULT_HOOK_SOURCE)
    }
}

impl HookResolver for ImportHooks {
    fn hook_identifier(&mut self, module: &mut Module, name: &str) -> Result<String, TransformError> {
        if let Some(local) = self.imported.get(name) {
            return Ok(local.clone());
        }
        let root_scope = module.scopes.root();
        let local = module.scopes.generate_uid(root_scope, name);
        let import = module.tree.alloc(
            NodeKind::ImportDeclaration {
                specifiers: vec![ImportSpecifier::Named {
                    imported: name.to_string(),
                    local: local.clone(),
                }],
                source: self.source.clone(),
            },
            SPAN,
        );
        let root = module.root();
        module.tree.prepend_statement(root, import)?;
        debug!(helper = name, local = %local, source = %self.source, "imported runtime helper");
        self.imported.insert(name.to_string(), local.clone());
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print;
    use crate::parse::parse_module;

    #[test]
    fn helper_is_imported_once() {
        let mut module = parse_module("foo();", false).unwrap();
        let mut hooks = ImportHooks::default();
        assert_eq!(hooks.hook_identifier(&mut module, "splitProps").unwrap(), "_splitProps");
        assert_eq!(hooks.hook_identifier(&mut module, "splitProps").unwrap(), "_splitProps");
        assert_eq!(
            print(&module.tree, module.root()),
            "import { splitProps as _splitProps } from \"solid-js\";\nfoo();\n"
        );
    }

    #[test]
    fn local_name_avoids_collisions() {
        let mut module = parse_module("const _splitProps = 1;", false).unwrap();
        let mut hooks = ImportHooks::new("my-runtime");
        assert_eq!(hooks.source(), "my-runtime");
        assert_eq!(hooks.hook_identifier(&mut module, "splitProps").unwrap(), "_splitProps2");
    }
}

//! # Labels Native Transform
//!
//! Compile-time expansion of reactive labels into plain accessor calls.
//!
//! ## Rewrite Invariants
//!
//! 1. **Scoped Rewrites**: A pass only touches references that resolve to the binding
//!    it was started for. A nested function or block declaring its own binding of the
//!    same name is skipped entirely, including its descendants.
//!
//! 2. **Accessor Form**: After `deref_signal`, a signal `count` is never read bare.
//!    - `count` → `_count()`
//!    - `count = v` → `_setCount(() => v)`
//!    - `count += v` → `_setCount(_current => _current + v)`
//!    - `$refSignal(count)` → `[_count, _setCount]`
//!
//! 3. **Lazy Destructuring**: Every leaf of a flattened pattern becomes a zero-argument
//!    accessor re-reading its source on each call. Only the rest partition
//!    (`_splitProps(source, keys)[1]`) is evaluated where the declaration stood.
//!
//! 4. **Declaration Order**: Generated declarators for a pattern appear before the rest
//!    binding, in pattern order; nested patterns follow their parent accessor.
//!
//! 5. **Hygiene**: Generated names never collide with a binding visible from the
//!    insertion point or with any name spelled in the module.
//!
//! 6. **Hooks Once**: Each runtime helper is imported at most once per module.
//!
//! 7. **Fatal Errors**: A malformed directive, a member-expression pattern target or a
//!    write through a read-only accessor aborts the module with a stable error code
//!    (`L-ERR-*`). No partial output is produced.
//!
//! 8. **Pass-through**: A module without labels is returned byte-for-byte.

pub mod ast;
pub mod codegen;
pub mod deref;
pub mod destructure;
pub mod hooks;
pub mod normalize;
pub mod parse;
pub mod scope;
pub mod transform;
pub mod validate;
pub mod visitor;

#[cfg(test)]
mod deref_tests;
#[cfg(test)]
mod destructure_tests;
#[cfg(test)]
mod transform_tests;

pub use ast::{Module, NodeId, NodeKind, Tree};
pub use deref::{deref_signal, Directive};
pub use destructure::{destructure_variable, PatternElement};
pub use hooks::{HookResolver, ImportHooks};
pub use normalize::{normalize_bindings, BindingNormalizer, BindingTarget, Substitution};
pub use parse::parse_module;
#[cfg(feature = "napi")]
pub use transform::transform_labels_native;
pub use transform::{
    expand_labels, transform_batch, transform_module, SourceFile, TransformOptions,
    TransformOutput,
};
pub use validate::{CompilerError, TransformError};

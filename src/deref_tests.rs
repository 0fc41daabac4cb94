//! Deref Rewriter Tests
//!
//! Every use of a signal binding becomes an accessor call:
//! - bare reads, directives and accessor properties
//! - assignments, compound assignments and updates
//! - L-ERR-DIRECTIVE-*: malformed or misplaced directives

#[cfg(test)]
mod tests {
    use crate::ast::NodeKind;
    use crate::codegen::print;
    use crate::deref::deref_signal;
    use crate::parse::parse_module;
    use crate::validate::TransformError;
    use pretty_assertions::assert_eq;

    fn deref(source: &str) -> Result<String, TransformError> {
        let mut module = parse_module(source, false)?;
        let root = module.root();
        deref_signal(&mut module, root, "count", "_count", "_setCount")?;
        Ok(print(&module.tree, root))
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // READS & SCOPING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_bare_reads_become_accessor_calls() {
        assert_eq!(
            deref("log(count, count.value, { count });").unwrap(),
            "log(_count(), _count().value, { count: _count() });\n"
        );
    }

    #[test]
    fn test_shadowing_function_is_skipped() {
        assert_eq!(
            deref("function f(count) { return count; }\nconst g = () => count;").unwrap(),
            "function f(count) {\n  return count;\n}\nconst g = () => _count();\n"
        );
    }

    #[test]
    fn test_rewrite_is_bounded_by_declaring_scope() {
        let mut module =
            parse_module("function f() { let count = 0; return () => count; }\ncount;", false)
                .unwrap();
        let root = module.root();
        let NodeKind::Program { body } = module.tree.kind(root).clone() else {
            panic!("expected program");
        };
        deref_signal(&mut module, body[0], "count", "_count", "_setCount").unwrap();
        assert_eq!(
            print(&module.tree, root),
            "function f() {\n  let count = 0;\n  return () => _count();\n}\ncount;\n"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DIRECTIVES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_value_directives() {
        assert_eq!(
            deref("const pair = $refSignal(count);\nconst value = $get(count);\nconst setter = $set(count);")
                .unwrap(),
            "const pair = [_count, _setCount];\nconst value = _count();\nconst setter = _setCount;\n"
        );
    }

    #[test]
    fn test_directive_for_another_binding_is_left_alone() {
        assert_eq!(deref("$get(other);").unwrap(), "$get(other);\n");
    }

    #[test]
    fn test_accessor_directives_rewrite_properties() {
        assert_eq!(
            deref("const o = { a: $getter(count), b: $setter(count), c: $property(count) };")
                .unwrap(),
            "const o = {\n  get a() {\n    return _count();\n  },\n  set b(_value) {\n    return _setCount(() => _value);\n  },\n  get c() {\n    return _count();\n  },\n  set c(_value2) {\n    return _setCount(() => _value2);\n  }\n};\n"
        );
    }

    #[test]
    fn test_property_directive_keeps_computed_key() {
        assert_eq!(
            deref("const o = { [k]: $property(count) };").unwrap(),
            "const o = {\n  get [k]() {\n    return _count();\n  },\n  set [k](_value) {\n    return _setCount(() => _value);\n  }\n};\n"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // WRITES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_updates() {
        assert_eq!(
            deref("++count;\ncount--;").unwrap(),
            "_setCount(_current => _current + 1);\n(() => {\n  const _current2 = _count();\n  _setCount(() => _current2 - 1);\n  return _current2;\n})();\n"
        );
    }

    #[test]
    fn test_assignments() {
        assert_eq!(
            deref("count = count + 1;\ncount += 2;\ncount ??= 5;").unwrap(),
            "_setCount(() => _count() + 1);\n_setCount(_current => _current + 2);\n_setCount(_current2 => _current2 ?? 5);\n"
        );
    }

    #[test]
    fn test_loop_head_and_pattern_writes_are_rejected() {
        let err = deref("for (count of xs) {}").unwrap_err();
        assert!(matches!(err, TransformError::ReadOnlyBinding { ref name, .. } if name == "count"));

        let err = deref("[count] = pair;").unwrap_err();
        assert!(matches!(err, TransformError::ReadOnlyBinding { .. }));
    }

    #[test]
    fn test_ref_signal_alongside_postfix_update() {
        assert_eq!(
            deref("let [x, setX] = $refSignal(count);\ncount++;").unwrap(),
            "let [x, setX] = [_count, _setCount];\n(() => {\n  const _current = _count();\n  _setCount(() => _current + 1);\n  return _current;\n})();\n"
        );
    }

    #[test]
    fn test_generated_names_avoid_existing_ones() {
        assert_eq!(
            deref("const _current = 1;\ncount *= _current;").unwrap(),
            "const _current = 1;\n_setCount(_current2 => _current2 * _current);\n"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // L-ERR-DIRECTIVE-*
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_directive_without_argument_is_malformed() {
        let err = deref("$get();").unwrap_err();
        assert!(matches!(
            err,
            TransformError::MalformedArgument { directive: "$get", ref found, .. } if found == "no argument"
        ));
        assert_eq!(err.code(), "L-ERR-DIRECTIVE-001");
    }

    #[test]
    fn test_directive_with_member_argument_is_malformed() {
        let err = deref("$set(count.value);").unwrap_err();
        assert!(matches!(
            err,
            TransformError::MalformedArgument { directive: "$set", ref found, .. } if found == "MemberExpression"
        ));
    }

    #[test]
    fn test_accessor_directive_outside_property() {
        let err = deref("f($getter(count));").unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingEnclosingContext { ref found, .. } if found == "CallExpression"
        ));
        assert_eq!(err.code(), "L-ERR-DIRECTIVE-002");
    }
}

//! Pattern Flattening Tests
//!
//! Destructuring declarators become lazy accessors plus one partition binding.
//! - L-ERR-PATTERN-001: member-expression targets are rejected
//! - L-ERR-BINDING-001: flattened leaves are read-only

#[cfg(test)]
mod tests {
    use crate::ast::{Module, NodeId, NodeKind, PropertyKey};
    use crate::codegen::print;
    use crate::destructure::{classify_element, destructure_variable, PatternElement};
    use crate::hooks::ImportHooks;
    use crate::parse::parse_module;
    use crate::validate::TransformError;
    use pretty_assertions::assert_eq;

    /// `(declarator, pattern, init)` of the first statement.
    fn first_declarator(module: &Module) -> (NodeId, NodeId, NodeId) {
        let NodeKind::Program { body } = module.tree.kind(module.root()) else {
            panic!("expected program");
        };
        let NodeKind::VariableDeclaration { declarations, .. } = module.tree.kind(body[0]) else {
            panic!("expected declaration");
        };
        let declarator = declarations[0];
        let NodeKind::VariableDeclarator { id, init: Some(init) } = module.tree.kind(declarator)
        else {
            panic!("expected initialized declarator");
        };
        (declarator, *id, *init)
    }

    fn flatten_module(mut module: Module) -> Result<String, TransformError> {
        let (declarator, pattern, init) = first_declarator(&module);
        let mut hooks = ImportHooks::default();
        destructure_variable(&mut hooks, &mut module, declarator, init, pattern, true)?;
        Ok(print(&module.tree, module.root()))
    }

    fn flatten(source: &str) -> Result<String, TransformError> {
        flatten_module(parse_module(source, false)?)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // OBJECT PATTERNS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_flat_object_pattern() {
        assert_eq!(
            flatten("const { a, b } = props;\nlog(a, b);").unwrap(),
            "import { splitProps as _splitProps } from \"solid-js\";\n\
             const _prop = () => props.a,\n  \
             _prop2 = () => props.b,\n  \
             _other = _splitProps(props, [\"a\", \"b\"])[1];\n\
             log(_prop(), _prop2());\n"
        );
    }

    #[test]
    fn test_nested_pattern_and_default() {
        assert_eq!(
            flatten("const { a: { b }, c = 1 } = props;\nlog(b, c);").unwrap(),
            "import { splitProps as _splitProps } from \"solid-js\";\n\
             const _prop = () => props.a,\n  \
             _prop2 = () => _prop().b,\n  \
             _prop3 = () => {\n    \
             const _value = props.c;\n    \
             return _value == null ? 1 : _value;\n  \
             },\n  \
             _other = _splitProps(props, [\"a\", \"c\"])[1],\n  \
             _other2 = _splitProps(_prop(), [\"b\"])[1];\n\
             log(_prop2(), _prop3());\n"
        );
    }

    #[test]
    fn test_nested_rest() {
        assert_eq!(
            flatten("const { a: { b, ...inner } } = props;\nlog(inner);").unwrap(),
            "import { splitProps as _splitProps } from \"solid-js\";\n\
             const _prop = () => props.a,\n  \
             _prop2 = () => _prop().b,\n  \
             _other = _splitProps(props, [\"a\"])[1],\n  \
             _other2 = _splitProps(_prop(), [\"b\"])[1];\n\
             log(_other2);\n"
        );
    }

    #[test]
    fn test_computed_key() {
        assert_eq!(
            flatten("const { [key]: value } = props;\nlog(value);").unwrap(),
            "import { splitProps as _splitProps } from \"solid-js\";\n\
             const _prop = () => props[key],\n  \
             _other = _splitProps(props, [key])[1];\n\
             log(_prop());\n"
        );
    }

    #[test]
    fn test_quoted_and_numeric_keys() {
        assert_eq!(
            flatten("const { \"a-b\": x, 0: y } = p;\nlog(x, y);").unwrap(),
            "import { splitProps as _splitProps } from \"solid-js\";\n\
             const _prop = () => p[\"a-b\"],\n  \
             _prop2 = () => p[\"0\"],\n  \
             _other = _splitProps(p, [\"a-b\", \"0\"])[1];\n\
             log(_prop(), _prop2());\n"
        );
    }

    #[test]
    fn test_rest_only_needs_no_helper() {
        assert_eq!(
            flatten("const { ...rest } = props;\nlog(rest);").unwrap(),
            "const _other = props;\nlog(_other);\n"
        );
    }

    #[test]
    fn test_shadowed_leaf_is_untouched() {
        assert_eq!(
            flatten("const { a } = props;\nfunction f(a) { return a; }\nconst g = () => a;").unwrap(),
            "import { splitProps as _splitProps } from \"solid-js\";\n\
             const _prop = () => props.a,\n  \
             _other = _splitProps(props, [\"a\"])[1];\n\
             function f(a) {\n  return a;\n}\n\
             const g = () => _prop();\n"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ARRAY PATTERNS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_array_pattern_with_hole_and_rest() {
        assert_eq!(
            flatten("const [first, , third, ...others] = list;\nlog(first, third, others);").unwrap(),
            "import { splitProps as _splitProps } from \"solid-js\";\n\
             const _prop = () => list[0],\n  \
             _prop2 = () => list[2],\n  \
             _other = _splitProps(list, [0, 2])[1];\n\
             log(_prop(), _prop2(), _other);\n"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ELEMENT CLASSIFICATION
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_classify_elements() {
        let module = parse_module("const { a, b: { c }, d = 1, ...e } = p;", false).unwrap();
        let (_, pattern, _) = first_declarator(&module);
        let NodeKind::ObjectPattern { properties, rest } = module.tree.kind(pattern) else {
            panic!("expected object pattern");
        };
        let values: Vec<NodeId> = properties
            .iter()
            .map(|property| match module.tree.kind(*property) {
                NodeKind::BindingProperty { value, .. } => *value,
                other => panic!("unexpected {}", other.type_name()),
            })
            .collect();

        assert_eq!(
            classify_element(&module, values[0]).unwrap(),
            PatternElement::Identifier("a".into())
        );
        assert_eq!(
            classify_element(&module, values[1]).unwrap(),
            PatternElement::Nested(values[1])
        );
        assert!(matches!(
            classify_element(&module, values[2]).unwrap(),
            PatternElement::Defaulted(inner, _) if *inner == PatternElement::Identifier("d".into())
        ));
        assert_eq!(
            classify_element(&module, rest.unwrap()).unwrap(),
            PatternElement::Rest("e".into())
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // L-ERR-PATTERN-001 / L-ERR-BINDING-001
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_member_target_is_rejected() {
        let mut module = parse_module("const { a } = props;", false).unwrap();
        let (_, pattern, _) = first_declarator(&module);
        let NodeKind::ObjectPattern { properties, .. } = module.tree.kind(pattern).clone() else {
            panic!("expected object pattern");
        };
        let NodeKind::BindingProperty { key, value, .. } = module.tree.kind(properties[0]).clone()
        else {
            panic!("expected binding property");
        };
        assert_eq!(key, PropertyKey::Static("a".into()));

        // { a: obj.x }
        let object = module.tree.identifier("obj");
        let member = module.tree.member_static(object, "x");
        let member_kind = module.tree.kind(member).clone();
        module.tree.replace(value, member_kind);

        let err = flatten_module(module).unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedPatternTarget { .. }));
        assert_eq!(err.code(), "L-ERR-PATTERN-001");
    }

    #[test]
    fn test_writing_a_leaf_is_rejected() {
        let err = flatten("const { a } = props;\na = 1;").unwrap_err();
        assert!(matches!(err, TransformError::ReadOnlyBinding { ref name, .. } if name == "a"));
        assert_eq!(err.code(), "L-ERR-BINDING-001");
    }
}

//! Label Driver Tests
//!
//! End-to-end expansion of `$signal` and `$destructure`, pass-through of
//! label-free modules, and the `CompilerError` surface.

#[cfg(test)]
mod tests {
    use crate::transform::{
        transform_batch, transform_module, SourceFile, TransformOptions, TransformOutput,
    };
    use pretty_assertions::assert_eq;

    fn expand(source: &str) -> TransformOutput {
        transform_module(source, &TransformOptions::default()).unwrap()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // EXPANSION
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_signal_label() {
        let output = expand("let count = $signal(0);\nconst double = () => count * 2;\ncount++;\n");
        assert_eq!(
            output.code,
            "import { createSignal as _createSignal } from \"solid-js\";\n\
             let [_count, _setCount] = _createSignal(0);\n\
             const double = () => _count() * 2;\n\
             (() => {\n  \
             const _current = _count();\n  \
             _setCount(() => _current + 1);\n  \
             return _current;\n\
             })();\n"
        );
        assert!(output.changed);
        assert_eq!(output.labels, 1);
    }

    #[test]
    fn test_destructure_label_in_component() {
        let output = expand(
            "function Comp(props) {\n  const { title, ...rest } = $destructure(props);\n  return [title, rest];\n}\n",
        );
        assert_eq!(
            output.code,
            "import { splitProps as _splitProps } from \"solid-js\";\n\
             function Comp(props) {\n  \
             const _prop = () => props.title,\n    \
             _other = _splitProps(props, [\"title\"])[1];\n  \
             return [_prop(), _other];\n\
             }\n"
        );
    }

    #[test]
    fn test_signal_feeds_destructure() {
        let options = TransformOptions {
            hook_source: "my-runtime".into(),
            ..TransformOptions::default()
        };
        let output = transform_module(
            "let user = $signal({ name: \"a\" });\nconst { name } = $destructure(user);\nlog(name);",
            &options,
        )
        .unwrap();
        assert_eq!(
            output.code,
            "import { splitProps as _splitProps } from \"my-runtime\";\n\
             import { createSignal as _createSignal } from \"my-runtime\";\n\
             let [_user, _setUser] = _createSignal({ name: \"a\" });\n\
             const _prop = () => _user().name,\n  \
             _other = _splitProps(_user(), [\"name\"])[1];\n\
             log(_prop());\n"
        );
        assert_eq!(output.labels, 2);
    }

    #[test]
    fn test_generated_names_are_hygienic() {
        let output = expand("const _count = 1;\nlet count = $signal(0);\nlog(count, _count);");
        assert_eq!(
            output.code,
            "import { createSignal as _createSignal } from \"solid-js\";\n\
             const _count = 1;\n\
             let [_count2, _setCount] = _createSignal(0);\n\
             log(_count2(), _count);\n"
        );
    }

    #[test]
    fn test_typescript_wrappers_are_erased() {
        let options = TransformOptions {
            typescript: true,
            ..TransformOptions::default()
        };
        let output =
            transform_module("let count = $signal<number>(0);\nlog(count as number);", &options)
                .unwrap();
        assert_eq!(
            output.code,
            "import { createSignal as _createSignal } from \"solid-js\";\n\
             let [_count, _setCount] = _createSignal(0);\n\
             log(_count());\n"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // STATEMENTS & CLASSES
    // ═══════════════════════════════════════════════════════════════════════════════

    const SIGNAL_PRELUDE: &str = "import { createSignal as _createSignal } from \"solid-js\";\n\
                                  let [_count, _setCount] = _createSignal(0);\n";

    #[test]
    fn test_signal_updated_in_for_body() {
        let output = expand("let count = $signal(0);\nfor (let i = 0; i < 3; i++) count++;\n");
        assert_eq!(
            output.code,
            format!(
                "{}for (let i = 0; i < 3; i++) (() => {{\n  \
                 const _current = _count();\n  \
                 _setCount(() => _current + 1);\n  \
                 return _current;\n\
                 }})();\n",
                SIGNAL_PRELUDE
            )
        );
    }

    #[test]
    fn test_signal_in_while_test_and_body() {
        let output = expand("let count = $signal(0);\nwhile (count < 3) count++;\n");
        assert_eq!(
            output.code,
            format!(
                "{}while (_count() < 3) (() => {{\n  \
                 const _current = _count();\n  \
                 _setCount(() => _current + 1);\n  \
                 return _current;\n\
                 }})();\n",
                SIGNAL_PRELUDE
            )
        );
    }

    #[test]
    fn test_signal_written_inside_try() {
        let output = expand("let count = $signal(0);\ntry { count = 1; } catch (e) {}\n");
        assert_eq!(
            output.code,
            format!("{}try {{\n  _setCount(() => 1);\n}} catch (e) {{}}\n", SIGNAL_PRELUDE)
        );
    }

    #[test]
    fn test_signal_read_from_class_method() {
        let output = expand("let count = $signal(0);\nclass A { m() { return count; } }\n");
        assert_eq!(
            output.code,
            format!(
                "{}class A {{\n  m() {{\n    return _count();\n  }}\n}}\n",
                SIGNAL_PRELUDE
            )
        );
    }

    #[test]
    fn test_signal_beside_optional_chain_and_regex() {
        let output = expand(
            "let count = $signal(0);\nconst v = count?.b;\nconst r = /a/.test(count);\n",
        );
        assert_eq!(
            output.code,
            format!(
                "{}const v = _count()?.b;\nconst r = /a/.test(_count());\n",
                SIGNAL_PRELUDE
            )
        );
    }

    #[test]
    fn test_signal_written_in_async_function() {
        let output =
            expand("let count = $signal(0);\nasync function f() { await g(); count = 1; }\n");
        assert_eq!(
            output.code,
            format!(
                "{}async function f() {{\n  await g();\n  _setCount(() => 1);\n}}\n",
                SIGNAL_PRELUDE
            )
        );
    }

    #[test]
    fn test_catch_parameter_shadows_signal() {
        let output =
            expand("let count = $signal(0);\ntry {} catch (count) { log(count); }\nlog(count);\n");
        assert_eq!(
            output.code,
            format!(
                "{}try {{}} catch (count) {{\n  log(count);\n}}\nlog(_count());\n",
                SIGNAL_PRELUDE
            )
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PASS-THROUGH
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_module_without_labels_is_returned_verbatim() {
        let source = "const a = 1;   // keep me\nlog( a )\n";
        let output = expand(source);
        assert_eq!(output.code, source);
        assert!(!output.changed);
        assert_eq!(output.labels, 0);

        // directives alone do nothing without a signal to resolve against
        assert_eq!(expand("$get(x);").code, "$get(x);");
    }

    #[test]
    fn test_local_function_named_like_a_label() {
        let source = "function $signal(v) { return v; }\nlet a = $signal(1);\nlog(a);";
        let output = expand(source);
        assert_eq!(output.code, source);
        assert!(!output.changed);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ERRORS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_error_carries_location() {
        let err = transform_module(
            "let count = $signal(0);\nconst o = { a: 1 };\nlog($getter(count));\n",
            &TransformOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, "L-ERR-DIRECTIVE-002");
        assert_eq!(err.error_type, "TRANSFORM_ERROR");
        assert_eq!(err.file, "input.js");
        assert_eq!((err.line, err.column), (3, 5));
        assert_eq!(err.context.as_deref(), Some("log($getter(count));"));
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let options = TransformOptions {
            filename: "broken.js".into(),
            ..TransformOptions::default()
        };
        let err = transform_module("const a = 1;\nconst b = ;", &options).unwrap_err();
        assert_eq!(err.code, "L-ERR-SYNTAX-001");
        assert_eq!(err.error_type, "SYNTAX_ERROR");
        assert_eq!(err.file, "broken.js");
        assert_eq!((err.line, err.column), (2, 11));
    }

    #[test]
    fn test_label_outside_declarator() {
        let err = transform_module("$signal(0);", &TransformOptions::default()).unwrap_err();
        assert_eq!(err.code, "L-ERR-DIRECTIVE-002");
        assert!(err.message.contains("ExpressionStatement"));
    }

    #[test]
    fn test_label_shape_errors() {
        let options = TransformOptions::default();
        let err = transform_module("const [a] = $signal(0);", &options).unwrap_err();
        assert_eq!(err.code, "L-ERR-PATTERN-002");

        let err = transform_module("const a = $destructure(props);", &options).unwrap_err();
        assert_eq!(err.code, "L-ERR-PATTERN-002");

        let err = transform_module("const { a } = $destructure();", &options).unwrap_err();
        assert_eq!(err.code, "L-ERR-DIRECTIVE-001");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // BATCH & OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_batch_keeps_order_and_filenames() {
        let files = vec![
            SourceFile {
                filename: "a.js".into(),
                code: "let a = $signal(1);\nlog(a);".into(),
            },
            SourceFile {
                filename: "b.js".into(),
                code: "$signal(0);".into(),
            },
            SourceFile {
                filename: "c.js".into(),
                code: "log(1);".into(),
            },
        ];
        let results = transform_batch(&files, &TransformOptions::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().is_ok_and(|output| output.changed));
        assert_eq!(results[1].as_ref().unwrap_err().file, "b.js");
        assert_eq!(results[2].as_ref().unwrap().code, "log(1);");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: TransformOptions =
            serde_json::from_str(r#"{ "hookSource": "solid-js/web" }"#).unwrap();
        assert_eq!(options.hook_source, "solid-js/web");
        assert_eq!(options.filename, "input.js");
        assert!(!options.typescript);
        assert!(options.verify);
    }
}

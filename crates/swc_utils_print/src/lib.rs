use swc_common::comments::Comments;
use swc_common::sync::Lrc;
use swc_common::SourceMap;
use swc_compiler_base::PrintArgs;
use swc_ecma_ast::Module;

/// Prints `module` back to source text.
pub fn ast_to_str(
    cm: &Lrc<SourceMap>,
    module: &Module,
    print_args: PrintArgs<'_>,
) -> Result<String, anyhow::Error> {
    let out = swc_compiler_base::print(cm.clone(), module, print_args)?;
    Ok(out.code)
}

/// Prints `module`, carrying over the comments collected while parsing it.
pub fn module_to_string(
    cm: &Lrc<SourceMap>,
    module: &Module,
    comments: Option<&dyn Comments>,
) -> Result<String, anyhow::Error> {
    ast_to_str(
        cm,
        module,
        PrintArgs {
            comments,
            ..Default::default()
        },
    )
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use swc_common::comments::{Comments, SingleThreadedComments};

    use crate::module_to_string;

    #[test]
    fn test_module_to_string_keeps_comments() {
        let comments = SingleThreadedComments::default();
        let comments_ref: &dyn Comments = &comments;
        let (cm, module) = swc_utils_parse::parse_module(
            Path::new("/src/run.js"),
            r#"
            import { helper } from "./helper.js";
            // comments should be retained!
            export   function   run() { return helper( ) }
            "#,
            Some(comments_ref),
        )
        .unwrap();

        assert_eq!(
            module_to_string(&cm, &module, Some(comments_ref)).unwrap(),
            r#"import { helper } from "./helper.js";
// comments should be retained!
export function run() {
    return helper();
}
"#
        );
    }
}

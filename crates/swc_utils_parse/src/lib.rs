use std::path::Path;

use swc_common::comments::Comments;
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceFile, SourceMap, Span, Spanned};
use swc_ecma_ast::Module;
use swc_ecma_parser::{lexer::Lexer, StringInput, Syntax};
use swc_ecma_parser::{Capturing, EsSyntax, Parser, TsSyntax};

/// A module that failed to parse, with the position of the first error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{file}:{line}:{col} :: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl ParseError {
    fn new(cm: &SourceMap, span: Span, message: impl Into<String>) -> Self {
        let loc = cm.lookup_char_pos(span.lo);
        Self {
            file: loc.file.name.to_string(),
            line: loc.line,
            col: loc.col_display,
            message: message.into(),
        }
    }
}

/// Picks the grammar from the file extension: typescript for `.ts`-family
/// files, ecmascript with JSX for everything else.
pub fn syntax_for_filename(filename: &str) -> Syntax {
    let is_ts = [".ts", ".tsx", ".mts", ".cts"]
        .iter()
        .any(|ext| filename.ends_with(ext));
    if is_ts {
        Syntax::Typescript(TsSyntax {
            tsx: filename.ends_with(".tsx"),
            decorators: true,
            ..Default::default()
        })
    } else {
        Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        })
    }
}

pub fn create_lexer<'a>(fm: &'a SourceFile, comments: Option<&'a dyn Comments>) -> Lexer<'a> {
    let filename = fm.name.to_string();
    Lexer::new(
        syntax_for_filename(&filename),
        Default::default(),
        StringInput::from(fm),
        comments,
    )
}

pub fn create_parser<'a>(
    fm: &'a Lrc<SourceFile>,
    comments: Option<&'a dyn Comments>,
) -> Parser<Capturing<Lexer<'a>>> {
    let lexer = create_lexer(fm, comments);
    let capturing = Capturing::new(lexer);

    Parser::new_from(capturing)
}

/// Parses `body` as a module, naming the source file after `path`.
///
/// Errors the parser recovers from are still reported as failures: a
/// module that only parses with recovery is not rewritten.
pub fn parse_module(
    path: &Path,
    body: impl Into<String>,
    comments: Option<&dyn Comments>,
) -> Result<(Lrc<SourceMap>, Module), ParseError> {
    let cm = Lrc::<SourceMap>::default();
    let fname: Lrc<FileName> = Lrc::new(FileName::Real(path.to_path_buf()));
    let fm = cm.new_source_file(fname, body.into());

    let mut parser = create_parser(&fm, comments);
    let parsed = parser.parse_module();
    let mut recovered = parser.take_errors();

    let module = match parsed {
        Ok(module) => module,
        Err(err) => return Err(ParseError::new(&cm, err.span(), err.kind().msg())),
    };
    if !recovered.is_empty() {
        let err = recovered.remove(0);
        return Err(ParseError::new(&cm, err.span(), err.kind().msg()));
    }

    Ok((cm, module))
}

/// Test helper: parses `body` and panics on failure.
pub fn parse_ecma_src<TName, TBody>(name_str: TName, body: TBody) -> (Lrc<SourceMap>, Module)
where
    TName: Into<String>,
    TBody: ToString,
{
    let name: String = name_str.into();
    parse_module(Path::new(&name), body.to_string(), None)
        .unwrap_or_else(|err| panic!("failed to parse {name}: {err}"))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_jsx_in_js_files() {
        let (_, module) = parse_module(
            Path::new("/src/component.js"),
            "export const App = () => <div />;",
            None,
        )
        .unwrap();
        assert_eq!(module.body.len(), 1);
    }

    #[test]
    fn reports_position_of_syntax_error() {
        let err = parse_module(Path::new("/src/broken.js"), "const a = ;\n", None).err().unwrap();
        assert_eq!(err.file, "/src/broken.js");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn typescript_is_chosen_by_extension() {
        assert!(matches!(syntax_for_filename("a.tsx"), Syntax::Typescript(_)));
        assert!(matches!(syntax_for_filename("a.mjs"), Syntax::Es(_)));
    }
}

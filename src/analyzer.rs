use crate::lexer::token::{Token, TokenKind, TokenType};
use crate::lexer::{Lexer, LexerError};
use crate::parser::{compile_class_with_tree, ParseResult, TreeSink};
use crate::vm::Instruction;

fn tag(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword => "keyword",
        TokenKind::Symbol => "symbol",
        TokenKind::Identifier => "identifier",
        TokenKind::IntConst => "integerConstant",
        TokenKind::StringConst => "stringConstant",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// One terminal as `<kind> text </kind>`, without indentation or newline.
fn element(token: &Token) -> String {
    let text = match &token.tok_type {
        TokenType::StringConst(s) => escape(s),
        tt => escape(&tt.to_string()),
    };
    let tag = tag(token.kind());
    format!("<{tag}> {text} </{tag}>")
}

/// Renders the token stream of `input` as a `<tokens>` XML document.
pub fn tokenize_xml(input: &str) -> Result<String, LexerError> {
    let mut out = String::from("<tokens>\n");
    for token in Lexer::new(input) {
        out.push_str(&element(&token?));
        out.push('\n');
    }
    out.push_str("</tokens>\n");
    Ok(out)
}

/// Parse-tree XML, two spaces of indentation per nesting level.
#[derive(Debug, Default)]
pub struct XmlTree {
    out: String,
    depth: usize,
}

impl XmlTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(&"  ".repeat(self.depth));
        self.out.push_str(text);
        self.out.push('\n');
    }
}

impl TreeSink for XmlTree {
    fn open(&mut self, node: &'static str) {
        self.line(&format!("<{node}>"));
        self.depth += 1;
    }

    fn close(&mut self, node: &'static str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{node}>"));
    }

    fn terminal(&mut self, token: &Token) {
        self.line(&element(token));
    }
}

/// Compiles `input` and renders its parse tree. The class must compile
/// cleanly; the generated code is discarded.
pub fn parse_tree_xml(input: &str) -> ParseResult<String> {
    let (_, tree) = compile_class_with_tree(input, Vec::<Instruction>::new(), XmlTree::new())?;
    Ok(tree.into_string())
}

use super::*;
use token::TokenKind;

fn match_expected(input: &str, expected: Vec<TokenType>) {
    let mut lexer = Lexer::new(input);
    let tokens = lexer.tokenize().unwrap();
    assert_eq!(tokens.len(), expected.len());

    tokens
        .iter()
        .zip(expected.iter())
        .for_each(|(t, e)| assert_eq!(t.tok_type, *e));
}

fn ident(name: &str) -> TokenType {
    TokenType::Identifier(name.to_string())
}

#[test]
fn test_simple_syntax() {
    let input = "let x = 1;\n// hello\nlet y;";
    let mut lexer = Lexer::new(input);
    let tokens = lexer.tokenize().unwrap();
    let expected = vec![
        Token {
            tok_type: TokenType::Keyword(Keyword::Let),
            span: Span(0, 3),
            line: 1,
        },
        Token {
            tok_type: ident("x"),
            span: Span(4, 5),
            line: 1,
        },
        Token {
            tok_type: TokenType::Symbol('='),
            span: Span(6, 7),
            line: 1,
        },
        Token {
            tok_type: TokenType::IntConst(1),
            span: Span(8, 9),
            line: 1,
        },
        Token {
            tok_type: TokenType::Symbol(';'),
            span: Span(9, 10),
            line: 1,
        },
        Token {
            tok_type: TokenType::Keyword(Keyword::Let),
            span: Span(20, 23),
            line: 3,
        },
        Token {
            tok_type: ident("y"),
            span: Span(24, 25),
            line: 3,
        },
        Token {
            tok_type: TokenType::Symbol(';'),
            span: Span(25, 26),
            line: 3,
        },
    ];

    assert_eq!(tokens, expected);
}

#[test]
fn test_symbols() {
    let input = "{ } ( ) [ ] . , ; + - * / & | < > = ~";
    let expected = SYMBOLS.iter().map(|c| TokenType::Symbol(*c)).collect();

    match_expected(input, expected);
}

#[test]
fn test_symbols_are_single_characters() {
    match_expected(
        "a<=b",
        vec![
            ident("a"),
            TokenType::Symbol('<'),
            TokenType::Symbol('='),
            ident("b"),
        ],
    );
}

#[test]
fn test_keywords() {
    let input = "class constructor function method field static var int char boolean \
                 void true false null this let do if else while return";
    let expected = KEYWORDS_IN_ORDER
        .iter()
        .map(|kw| TokenType::Keyword(*kw))
        .collect();

    match_expected(input, expected);
}

const KEYWORDS_IN_ORDER: [Keyword; 21] = [
    Keyword::Class,
    Keyword::Constructor,
    Keyword::Function,
    Keyword::Method,
    Keyword::Field,
    Keyword::Static,
    Keyword::Var,
    Keyword::Int,
    Keyword::Char,
    Keyword::Boolean,
    Keyword::Void,
    Keyword::True,
    Keyword::False,
    Keyword::Null,
    Keyword::This,
    Keyword::Let,
    Keyword::Do,
    Keyword::If,
    Keyword::Else,
    Keyword::While,
    Keyword::Return,
];

#[test]
fn test_keyword_prefix_is_identifier() {
    match_expected(
        "classy _do if2 While",
        vec![ident("classy"), ident("_do"), ident("if2"), ident("While")],
    );
}

#[test]
fn test_unicode_identifiers() {
    let input = "größe été2 _ñ";
    match_expected(input, vec![ident("größe"), ident("été2"), ident("_ñ")]);

    let tokens = Lexer::new(input).tokenize().unwrap();
    assert_eq!(tokens[1].span, Span(8, 14));
    assert_eq!(tokens[1].lexeme(input), "été2");
}

#[test]
fn test_strings() {
    let input = r#""hello" "a // not a comment" """#;
    let expected = vec![
        TokenType::StringConst("hello".to_string()),
        TokenType::StringConst("a // not a comment".to_string()),
        TokenType::StringConst(String::new()),
    ];

    match_expected(input, expected);
}

#[test]
fn test_string_lexeme_keeps_quotes() {
    let input = "x \"hi\"";
    let tokens = Lexer::new(input).tokenize().unwrap();
    assert_eq!(tokens[1].lexeme(input), "\"hi\"");
    assert_eq!(tokens[1].kind(), TokenKind::StringConst);
}

#[test]
fn test_number_literals() {
    match_expected(
        "0 123 32767 7x",
        vec![
            TokenType::IntConst(0),
            TokenType::IntConst(123),
            TokenType::IntConst(32767),
            TokenType::IntConst(7),
            ident("x"),
        ],
    );
}

#[test]
fn test_number_out_of_range() {
    let err = Lexer::new("32768").advance().unwrap_err();
    assert_eq!(
        err.error,
        LexerErrorType::IntegerOutOfRange("32768".to_string())
    );

    let err = Lexer::new("99999999999").advance().unwrap_err();
    assert!(matches!(err.error, LexerErrorType::IntegerOutOfRange(_)));
}

#[test]
fn test_comments_are_skipped() {
    let input = "/** doc\n * comment */ a /* inline */ b // trailing\n/**/c";
    let tokens = Lexer::new(input).tokenize().unwrap();
    let types: Vec<_> = tokens.iter().map(|t| t.tok_type.clone()).collect();
    assert_eq!(types, vec![ident("a"), ident("b"), ident("c")]);
    assert_eq!(tokens[0].line, 2);
    assert_eq!(tokens[2].line, 3);
}

#[test]
fn test_has_more_skips_trailing_trivia() {
    let mut lexer = Lexer::new("x  // done\n  /* end */  \n");
    assert!(lexer.has_more());
    lexer.advance().unwrap();
    assert!(!lexer.has_more());
}

#[test]
fn test_unclosed_block_comment_runs_to_end() {
    let mut lexer = Lexer::new("x /* never closed");
    lexer.advance().unwrap();
    assert!(!lexer.has_more());
}

#[test]
fn test_advance_past_end_fails() {
    let mut lexer = Lexer::new("  // nothing\n");
    assert!(!lexer.has_more());
    let err = lexer.advance().unwrap_err();
    assert_eq!(err.error, LexerErrorType::UnexpectedEOF);
    assert_eq!(err.line, 2);
}

#[test]
fn test_unterminated_string() {
    let mut lexer = Lexer::new("\"abc");
    let err = lexer.advance().unwrap_err();
    assert_eq!(err.error, LexerErrorType::UnexpectedEOF);
}

#[test]
fn test_unexpected_char() {
    let mut lexer = Lexer::new("a # b");
    lexer.advance().unwrap();
    let err = lexer.advance().unwrap_err();
    assert_eq!(err.error, LexerErrorType::UnexpectedChar('#'));
    assert_eq!(err.span, Span(2, 3));
}

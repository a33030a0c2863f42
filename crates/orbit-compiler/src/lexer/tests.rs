// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(src);
    let mut out = Vec::new();
    loop {
        let tok = lexer.next_token().unwrap();
        if tok.kind == TokenKind::Eof {
            break;
        }
        out.push(tok.kind);
    }
    out
}

#[test]
fn keywords_and_idents() {
    assert_eq!(
        kinds("object state fun foo"),
        vec![TokenKind::Object, TokenKind::State, TokenKind::Fun, TokenKind::Ident("foo".into())]
    );
}

#[test]
fn numbers() {
    assert_eq!(kinds("42 3.5 0"), vec![TokenKind::Number(42.0), TokenKind::Number(3.5), TokenKind::Number(0.0)]);
}

#[test]
fn strings_with_escapes() {
    assert_eq!(kinds(r#""a\nb""#), vec![TokenKind::Str("a\nb".to_string())]);
}

#[test]
fn operators() {
    assert_eq!(
        kinds("+= ++ == != <= && ||"),
        vec![
            TokenKind::PlusAssign,
            TokenKind::Inc,
            TokenKind::Eq,
            TokenKind::Ne,
            TokenKind::Le,
            TokenKind::AndAnd,
            TokenKind::OrOr,
        ]
    );
}

#[test]
fn comments_are_skipped() {
    assert_eq!(kinds("1 // trailing\n2 /* block\ncomment */ 3"), vec![
        TokenKind::Number(1.0),
        TokenKind::Number(2.0),
        TokenKind::Number(3.0),
    ]);
}

#[test]
fn unscan_replays_the_same_token() {
    let mut lexer = Lexer::new("a b c");
    let a = lexer.next_token().unwrap();
    let b = lexer.next_token().unwrap();
    lexer.unscan(b.clone());
    let b_again = lexer.next_token().unwrap();
    assert_eq!(b.kind, b_again.kind);
    let c = lexer.next_token().unwrap();
    assert_eq!(c.kind, TokenKind::Ident("c".into()));
    let _ = a;
}

#[test]
fn dot_followed_by_ident_is_two_tokens() {
    assert_eq!(kinds("a.length"), vec![TokenKind::Ident("a".into()), TokenKind::Dot, TokenKind::Ident("length".into())]);
}

#[test]
fn unterminated_string_is_an_error() {
    let mut lexer = Lexer::new("\"abc");
    assert_eq!(lexer.next_token(), Err(LexError::UnterminatedString));
}

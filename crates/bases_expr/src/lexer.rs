use chumsky::prelude::*;

use crate::tokens::{Number, Token};

pub(crate) fn lexer(
) -> impl Parser<char, Vec<(Token, std::ops::Range<usize>)>, Error = Simple<char>> {
    let number = text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .try_map(|(int_part, frac), span| {
            let mut s = int_part;
            if let Some((dot, frac)) = frac {
                s.push(dot);
                s.push_str(&frac);
            }
            s.parse::<f64>()
                .map_err(|_| Simple::custom(span, "invalid number literal"))
        })
        .map(|value| Token::Number(Number(value)));

    let escape = just('\\').ignore_then(any().map(|c| match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }));
    let quoted = |quote: char| {
        just(quote)
            .ignore_then(
                filter(move |c: &char| *c != quote && *c != '\\')
                    .or(escape.clone())
                    .repeated()
                    .collect::<String>(),
            )
            .then_ignore(just(quote))
            .map(Token::Str)
    };
    let string = quoted('"').or(quoted('\''));

    let word = filter(|c: &char| c.is_alphabetic() || matches!(*c, '_' | '$'))
        .then(
            filter(|c: &char| c.is_alphanumeric() || matches!(*c, '_' | '$'))
                .repeated()
                .collect::<String>(),
        )
        .map(|(first, rest)| {
            let mut s = String::with_capacity(rest.len() + 1);
            s.push(first);
            s.push_str(&rest);
            s
        })
        .map(|raw| match raw.as_str() {
            "true" => Token::True,
            "false" => Token::False,
            "null" | "undefined" => Token::Null,
            _ => Token::Ident(raw),
        });

    let op = choice::<_, Simple<char>>(vec![
        just("===").to(Token::CmpEq).boxed(),
        just("!==").to(Token::CmpNeq).boxed(),
        just("==").to(Token::CmpEq).boxed(),
        just("!=").to(Token::CmpNeq).boxed(),
        just("=>").to(Token::FatArrow).boxed(),
        just(">=").to(Token::CmpGte).boxed(),
        just("<=").to(Token::CmpLte).boxed(),
        just("&&").to(Token::AndAnd).boxed(),
        just("||").to(Token::OrOr).boxed(),
        just(">").to(Token::CmpGt).boxed(),
        just("<").to(Token::CmpLt).boxed(),
        just("!").to(Token::Bang).boxed(),
        just("+").to(Token::Plus).boxed(),
        just("-").to(Token::Minus).boxed(),
        just(".").to(Token::Dot).boxed(),
        just(",").to(Token::Comma).boxed(),
        just("(").to(Token::LParen).boxed(),
        just(")").to(Token::RParen).boxed(),
        just("[").to(Token::LBracket).boxed(),
        just("]").to(Token::RBracket).boxed(),
    ]);

    choice::<_, Simple<char>>((number, string, word, op))
        .map_with_span(|tok, span| (tok, span))
        .padded()
        .repeated()
        .then_ignore(end())
}

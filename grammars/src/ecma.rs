// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! A subset of ECMAScript.
//!
//! Covers statements, functions, arrow functions, object and array literals, template literals
//! and the operator precedence ladder. Automatic semicolon insertion follows the line-break
//! rule: a missing `;` is accepted before `}`, at the end of input and before a token that
//! starts a new line. Classes, modules, destructuring and generators are not part of it.
//!
//! The lexer side shows every context-sensitive feature of the engine:
//! * a hashbang comment only at the very start,
//! * regular expression literals only where a division cannot appear,
//! * `?.` never directly before a digit, so `a?.5:1` stays a conditional,
//! * template middles and tails only inside an open template substitution.

use std::sync::Arc;

use once_cell::sync::Lazy;
use pegcst::{
    parse, CstNode, Error, Expected, Lexicon, LexiconError, ParseFailure, ParseResult, Parser,
    ParserConfig, ParserState, Pattern, TemplatePart, TokenDefinition,
};

static LEXICON: Lazy<Lexicon> =
    Lazy::new(|| build_lexicon().expect("ECMAScript token patterns are valid"));

/// Reserved words, each a token category of its own.
const KEYWORDS: &[(&str, &str)] = &[
    ("Break", "break"),
    ("Case", "case"),
    ("Catch", "catch"),
    ("Const", "const"),
    ("Continue", "continue"),
    ("Default", "default"),
    ("Delete", "delete"),
    ("Do", "do"),
    ("Else", "else"),
    ("False", "false"),
    ("Finally", "finally"),
    ("For", "for"),
    ("Function", "function"),
    ("If", "if"),
    ("In", "in"),
    ("Instanceof", "instanceof"),
    ("Let", "let"),
    ("New", "new"),
    ("Null", "null"),
    ("Return", "return"),
    ("Switch", "switch"),
    ("This", "this"),
    ("Throw", "throw"),
    ("True", "true"),
    ("Try", "try"),
    ("Typeof", "typeof"),
    ("Var", "var"),
    ("Void", "void"),
    ("While", "while"),
];

const PUNCTUATORS: &[(&str, &str)] = &[
    ("LBrace", "{"),
    ("RBrace", "}"),
    ("LParen", "("),
    ("RParen", ")"),
    ("LBracket", "["),
    ("RBracket", "]"),
    ("Ellipsis", "..."),
    ("Dot", "."),
    ("Semicolon", ";"),
    ("Comma", ","),
    ("Arrow", "=>"),
    ("EqEqEq", "==="),
    ("NotEqEq", "!=="),
    ("EqEq", "=="),
    ("NotEq", "!="),
    ("LtEq", "<="),
    ("GtEq", ">="),
    ("Lt", "<"),
    ("Gt", ">"),
    ("PlusPlus", "++"),
    ("MinusMinus", "--"),
    ("PlusEq", "+="),
    ("MinusEq", "-="),
    ("StarEq", "*="),
    ("SlashEq", "/="),
    ("PercentEq", "%="),
    ("Plus", "+"),
    ("Minus", "-"),
    ("Star", "*"),
    ("Slash", "/"),
    ("Percent", "%"),
    ("AmpAmp", "&&"),
    ("PipePipe", "||"),
    ("QuestionQuestion", "??"),
    ("Question", "?"),
    ("Colon", ":"),
    ("Eq", "="),
    ("Bang", "!"),
    ("Tilde", "~"),
];

// Tokens after which a `/` divides instead of starting a regular expression.
const DIVISION_CONTEXT: &[&str] = &[
    "Identifier",
    "NumericLiteral",
    "StringLiteral",
    "RegularExpressionLiteral",
    "NoSubstitutionTemplate",
    "TemplateTail",
    "RParen",
    "RBracket",
    "This",
    "Null",
    "True",
    "False",
    "PlusPlus",
    "MinusMinus",
];

const LINE_TERMINATOR: &str = r"\r\n|[\n\r\u{2028}\u{2029}]";
const IDENTIFIER: &str = r"[\p{ID_Start}$_][\p{ID_Continue}$\u{200C}\u{200D}]*";
const NUMERIC_LITERAL: &str = r"0[xX][0-9a-fA-F]+|0[bB][01]+|0[oO][0-7]+|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?";
const STRING_LITERAL: &str = r#""(?:[^"\\\n\r]|\\[\s\S])*"|'(?:[^'\\\n\r]|\\[\s\S])*'"#;
// Template text up to, not including, the closing backtick or `${`.
const TEMPLATE_CHARACTERS: &str = r"(?:[^`\\$]|\\[\s\S]|\$+(?:[^`\\${]|\\[\s\S]))*\$*";
const REGULAR_EXPRESSION_LITERAL: &str = r"/(?:[^*/\\\[\n\r]|\\[^\n\r]|\[(?:[^\]\\\n\r]|\\[^\n\r])*\])(?:[^/\\\[\n\r]|\\[^\n\r]|\[(?:[^\]\\\n\r]|\\[^\n\r])*\])*/[A-Za-z]*";

fn build_lexicon() -> Result<Lexicon, LexiconError> {
    let mut definitions = vec![
        TokenDefinition::regex("HashbangComment", r"#![^\n\r\u{2028}\u{2029}]*")?
            .only_at_start()
            .skip(),
        TokenDefinition::regex("MultiLineComment", r"/\*[\s\S]*?\*/")?.skip(),
        TokenDefinition::regex("SingleLineComment", r"//[^\n\r\u{2028}\u{2029}]*")?.skip(),
        TokenDefinition::regex("WhiteSpace", r"[\t\x0B\x0C\u{FEFF}\p{Zs}]+")?.skip(),
        TokenDefinition::regex("LineTerminator", LINE_TERMINATOR)?.skip(),
    ];

    definitions.extend(
        KEYWORDS
            .iter()
            .map(|&(name, text)| TokenDefinition::literal(name, text).keyword()),
    );

    definitions.extend(vec![
        TokenDefinition::regex("Identifier", IDENTIFIER)?,
        TokenDefinition::regex("NumericLiteral", NUMERIC_LITERAL)?,
        TokenDefinition::regex("StringLiteral", STRING_LITERAL)?,
        TokenDefinition::regex(
            "NoSubstitutionTemplate",
            &["`", TEMPLATE_CHARACTERS, "`"].concat(),
        )?,
        TokenDefinition::regex("TemplateHead", &["`", TEMPLATE_CHARACTERS, r"\$\{"].concat())?
            .template(TemplatePart::Head),
        TokenDefinition::regex(
            "TemplateMiddle",
            &[r"\}", TEMPLATE_CHARACTERS, r"\$\{"].concat(),
        )?
        .template(TemplatePart::Middle),
        TokenDefinition::regex("TemplateTail", &[r"\}", TEMPLATE_CHARACTERS, "`"].concat())?
            .template(TemplatePart::Tail),
        TokenDefinition::regex("RegularExpressionLiteral", REGULAR_EXPRESSION_LITERAL)?
            .not_after(DIVISION_CONTEXT),
    ]);

    definitions.extend(
        PUNCTUATORS
            .iter()
            .map(|&(name, text)| TokenDefinition::literal(name, text)),
    );

    let digit = Pattern::regex("[0-9]").map_err(|source| LexiconError::InvalidPattern {
        name: "QuestionDot",
        source,
    })?;
    definitions.push(TokenDefinition::literal("QuestionDot", "?.").lookahead_after(digit));

    Ok(Lexicon::new(definitions))
}

/// The ECMAScript token categories.
pub fn lexicon() -> &'static Lexicon {
    &LEXICON
}

/// Parser for ECMAScript scripts.
#[derive(Clone, Debug, Default)]
pub struct EcmaParser {
    config: ParserConfig,
}

impl EcmaParser {
    pub fn new() -> EcmaParser {
        EcmaParser::default()
    }

    pub fn with_config(config: ParserConfig) -> EcmaParser {
        EcmaParser { config }
    }
}

impl Parser for EcmaParser {
    fn parse(&self, source: &str) -> Result<Arc<CstNode>, Error> {
        parse(lexicon(), source, &self.config, program)
    }
}

/// Consumes the next token if it belongs to one of `names`.
fn one_of(s: &mut ParserState<'_>, names: &[&'static str]) -> ParseResult {
    match names.iter().copied().find(|name| s.peek_is(name)) {
        Some(name) => s.consume(name),
        None => {
            for name in names.iter().copied() {
                s.fail(Expected::Token(name));
            }
            Err(ParseFailure::Mismatch)
        }
    }
}

/// An identifier or a reserved word, as allowed after `.` and as a property key.
fn identifier_name(s: &mut ParserState<'_>) -> ParseResult {
    match s.peek() {
        Some(token)
            if token.name == "Identifier"
                || KEYWORDS.iter().any(|&(name, _)| name == token.name) =>
        {
            s.consume(token.name)
        }
        _ => Err(s.fail(Expected::Token("Identifier"))),
    }
}

/// A `;`, or an inserted one.
fn semicolon(s: &mut ParserState<'_>) -> ParseResult {
    if s.peek_is("Semicolon") {
        return s.consume("Semicolon");
    }
    if s.at_end() || s.peek_is("RBrace") || s.line_break_before() {
        return Ok(());
    }

    Err(s.fail(Expected::Token("Semicolon")))
}

pub fn program(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("program", |s| s.many(statement))
}

fn statement(s: &mut ParserState<'_>) -> ParseResult {
    s.or(&mut [
        &mut block,
        &mut variable_statement,
        &mut function_declaration,
        &mut if_statement,
        &mut while_statement,
        &mut do_while_statement,
        &mut for_statement,
        &mut return_statement,
        &mut break_statement,
        &mut continue_statement,
        &mut throw_statement,
        &mut try_statement,
        &mut switch_statement,
        &mut empty_statement,
        &mut expression_statement,
    ])
}

fn block(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("block", |s| {
        s.consume("LBrace")?;
        s.many(statement)?;
        s.consume("RBrace")
    })
}

fn declaration_kind(s: &mut ParserState<'_>) -> ParseResult {
    one_of(s, &["Var", "Let", "Const"])
}

fn variable_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("variable_statement", |s| {
        declaration_kind(s)?;
        variable_declaration_list(s)?;
        semicolon(s)
    })
}

fn variable_declaration_list(s: &mut ParserState<'_>) -> ParseResult {
    variable_declaration(s)?;
    s.many(|s| {
        s.consume("Comma")?;
        variable_declaration(s)
    })
}

fn variable_declaration(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("variable_declaration", |s| {
        s.consume("Identifier")?;
        s.option(|s| {
            s.consume("Eq")?;
            assignment_expression(s)
        })
    })
}

fn function_declaration(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("function_declaration", |s| {
        s.consume("Function")?;
        s.consume("Identifier")?;
        formal_parameters(s)?;
        function_body(s)
    })
}

fn formal_parameters(s: &mut ParserState<'_>) -> ParseResult {
    fn parameter(s: &mut ParserState<'_>) -> ParseResult {
        s.option(|s| s.consume("Ellipsis"))?;
        s.consume("Identifier")?;
        s.option(|s| {
            s.consume("Eq")?;
            assignment_expression(s)
        })
    }

    s.rule("formal_parameters", |s| {
        s.consume("LParen")?;
        s.option(|s| {
            parameter(s)?;
            s.many(|s| {
                s.consume("Comma")?;
                parameter(s)
            })
        })?;
        s.consume("RParen")
    })
}

fn function_body(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("function_body", |s| {
        s.consume("LBrace")?;
        s.many(statement)?;
        s.consume("RBrace")
    })
}

fn if_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("if_statement", |s| {
        s.consume("If")?;
        s.consume("LParen")?;
        expression(s)?;
        s.consume("RParen")?;
        statement(s)?;
        s.option(|s| {
            s.consume("Else")?;
            statement(s)
        })
    })
}

fn while_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("while_statement", |s| {
        s.consume("While")?;
        s.consume("LParen")?;
        expression(s)?;
        s.consume("RParen")?;
        statement(s)
    })
}

fn do_while_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("do_while_statement", |s| {
        s.consume("Do")?;
        statement(s)?;
        s.consume("While")?;
        s.consume("LParen")?;
        expression(s)?;
        s.consume("RParen")?;
        // The `;` after `do ... while (...)` may always be left out.
        s.option(|s| s.consume("Semicolon"))
    })
}

fn for_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("for_statement", |s| {
        s.consume("For")?;
        s.consume("LParen")?;
        s.or(&mut [&mut for_in_of_head, &mut for_head])?;
        s.consume("RParen")?;
        statement(s)
    })
}

fn for_in_of_head(s: &mut ParserState<'_>) -> ParseResult {
    s.option(declaration_kind)?;
    s.consume("Identifier")?;
    s.or(&mut [
        &mut |s| s.consume("In"),
        &mut |s| s.consume_value("Identifier", "of"),
    ])?;
    expression(s)
}

fn for_head(s: &mut ParserState<'_>) -> ParseResult {
    s.option(|s| {
        s.or(&mut [
            &mut |s| {
                declaration_kind(s)?;
                variable_declaration_list(s)
            },
            &mut expression,
        ])
    })?;
    s.consume("Semicolon")?;
    s.option(expression)?;
    s.consume("Semicolon")?;
    s.option(expression)
}

fn return_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("return_statement", |s| {
        s.consume("Return")?;
        if !s.line_break_before() {
            s.option(expression)?;
        }
        semicolon(s)
    })
}

fn break_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("break_statement", |s| {
        s.consume("Break")?;
        if !s.line_break_before() {
            s.option(|s| s.consume("Identifier"))?;
        }
        semicolon(s)
    })
}

fn continue_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("continue_statement", |s| {
        s.consume("Continue")?;
        if !s.line_break_before() {
            s.option(|s| s.consume("Identifier"))?;
        }
        semicolon(s)
    })
}

fn throw_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("throw_statement", |s| {
        s.consume("Throw")?;
        if s.line_break_before() {
            return Err(ParseFailure::Mismatch);
        }
        expression(s)?;
        semicolon(s)
    })
}

fn try_statement(s: &mut ParserState<'_>) -> ParseResult {
    fn catch_clause(s: &mut ParserState<'_>) -> ParseResult {
        s.rule("catch_clause", |s| {
            s.consume("Catch")?;
            s.option(|s| {
                s.consume("LParen")?;
                s.consume("Identifier")?;
                s.consume("RParen")
            })?;
            block(s)
        })
    }

    fn finally_clause(s: &mut ParserState<'_>) -> ParseResult {
        s.rule("finally_clause", |s| {
            s.consume("Finally")?;
            block(s)
        })
    }

    s.rule("try_statement", |s| {
        s.consume("Try")?;
        block(s)?;
        s.or(&mut [
            &mut |s| {
                catch_clause(s)?;
                s.option(finally_clause)
            },
            &mut finally_clause,
        ])
    })
}

fn switch_statement(s: &mut ParserState<'_>) -> ParseResult {
    fn case_clause(s: &mut ParserState<'_>) -> ParseResult {
        s.rule("case_clause", |s| {
            s.or(&mut [
                &mut |s| {
                    s.consume("Case")?;
                    expression(s)
                },
                &mut |s| s.consume("Default"),
            ])?;
            s.consume("Colon")?;
            s.many(statement)
        })
    }

    s.rule("switch_statement", |s| {
        s.consume("Switch")?;
        s.consume("LParen")?;
        expression(s)?;
        s.consume("RParen")?;
        s.consume("LBrace")?;
        s.many(case_clause)?;
        s.consume("RBrace")
    })
}

fn empty_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("empty_statement", |s| s.consume("Semicolon"))
}

fn expression_statement(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("expression_statement", |s| {
        s.lookahead(false, |s| one_of(s, &["LBrace", "Function"]))?;
        expression(s)?;
        semicolon(s)
    })
}

pub fn expression(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("expression", |s| {
        assignment_expression(s)?;
        s.many(|s| {
            s.consume("Comma")?;
            assignment_expression(s)
        })
    })
}

fn assignment_expression(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("assignment_expression", |s| {
        s.or(&mut [
            &mut arrow_function,
            &mut |s| {
                left_hand_side(s)?;
                one_of(
                    s,
                    &["Eq", "PlusEq", "MinusEq", "StarEq", "SlashEq", "PercentEq"],
                )?;
                assignment_expression(s)
            },
            &mut conditional_expression,
        ])
    })
}

fn arrow_function(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("arrow_function", |s| {
        s.or(&mut [&mut |s| s.consume("Identifier"), &mut formal_parameters])?;
        if s.line_break_before() {
            return Err(s.fail(Expected::Token("Arrow")));
        }
        s.consume("Arrow")?;
        s.or(&mut [&mut function_body, &mut assignment_expression])
    })
}

fn conditional_expression(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("conditional_expression", |s| {
        logical_or(s)?;
        s.option(|s| {
            s.consume("Question")?;
            assignment_expression(s)?;
            s.consume("Colon")?;
            assignment_expression(s)
        })
    })
}

/// One level of left-associative binary operators.
fn binary(
    s: &mut ParserState<'_>,
    name: &'static str,
    operators: &[&'static str],
    operand: fn(&mut ParserState<'_>) -> ParseResult,
) -> ParseResult {
    s.rule(name, |s| {
        operand(s)?;
        s.many(|s| {
            one_of(s, operators)?;
            operand(s)
        })
    })
}

fn logical_or(s: &mut ParserState<'_>) -> ParseResult {
    binary(s, "logical_or", &["PipePipe", "QuestionQuestion"], logical_and)
}

fn logical_and(s: &mut ParserState<'_>) -> ParseResult {
    binary(s, "logical_and", &["AmpAmp"], equality)
}

fn equality(s: &mut ParserState<'_>) -> ParseResult {
    binary(
        s,
        "equality",
        &["EqEqEq", "NotEqEq", "EqEq", "NotEq"],
        relational,
    )
}

fn relational(s: &mut ParserState<'_>) -> ParseResult {
    binary(
        s,
        "relational",
        &["LtEq", "GtEq", "Lt", "Gt", "Instanceof", "In"],
        additive,
    )
}

fn additive(s: &mut ParserState<'_>) -> ParseResult {
    binary(s, "additive", &["Plus", "Minus"], multiplicative)
}

fn multiplicative(s: &mut ParserState<'_>) -> ParseResult {
    binary(s, "multiplicative", &["Star", "Slash", "Percent"], unary)
}

fn unary(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("unary", |s| {
        s.or(&mut [
            &mut |s| {
                one_of(
                    s,
                    &[
                        "Bang",
                        "Minus",
                        "Plus",
                        "Tilde",
                        "Typeof",
                        "Void",
                        "Delete",
                        "PlusPlus",
                        "MinusMinus",
                    ],
                )?;
                unary(s)
            },
            &mut postfix,
        ])
    })
}

fn postfix(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("postfix", |s| {
        left_hand_side(s)?;
        if !s.line_break_before() {
            s.option(|s| one_of(s, &["PlusPlus", "MinusMinus"]))?;
        }
        Ok(())
    })
}

fn left_hand_side(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("left_hand_side", |s| {
        s.or(&mut [&mut new_expression, &mut primary])?;
        s.many(|s| {
            s.or(&mut [
                &mut |s| {
                    s.consume("Dot")?;
                    identifier_name(s)
                },
                &mut |s| {
                    s.consume("QuestionDot")?;
                    identifier_name(s)
                },
                &mut |s| {
                    s.consume("LBracket")?;
                    expression(s)?;
                    s.consume("RBracket")
                },
                &mut arguments,
                &mut template_literal,
            ])
        })
    })
}

fn new_expression(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("new_expression", |s| {
        s.consume("New")?;
        s.or(&mut [&mut new_expression, &mut primary])?;
        s.many(|s| {
            s.or(&mut [
                &mut |s| {
                    s.consume("Dot")?;
                    identifier_name(s)
                },
                &mut |s| {
                    s.consume("LBracket")?;
                    expression(s)?;
                    s.consume("RBracket")
                },
            ])
        })?;
        s.option(arguments)
    })
}

fn element(s: &mut ParserState<'_>) -> ParseResult {
    s.option(|s| s.consume("Ellipsis"))?;
    assignment_expression(s)
}

fn arguments(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("arguments", |s| {
        s.consume("LParen")?;
        s.option(|s| {
            element(s)?;
            s.many(|s| {
                s.consume("Comma")?;
                element(s)
            })?;
            s.option(|s| s.consume("Comma"))
        })?;
        s.consume("RParen")
    })
}

fn primary(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("primary", |s| {
        s.or(&mut [
            &mut |s| {
                one_of(
                    s,
                    &[
                        "This",
                        "Identifier",
                        "Null",
                        "True",
                        "False",
                        "NumericLiteral",
                        "StringLiteral",
                        "RegularExpressionLiteral",
                    ],
                )
            },
            &mut array_literal,
            &mut object_literal,
            &mut function_expression,
            &mut template_literal,
            &mut parenthesized,
        ])
    })
}

fn parenthesized(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("parenthesized", |s| {
        s.consume("LParen")?;
        expression(s)?;
        s.consume("RParen")
    })
}

fn array_literal(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("array_literal", |s| {
        s.consume("LBracket")?;
        s.many(|s| {
            s.or(&mut [
                // Elision.
                &mut |s| s.consume("Comma"),
                &mut |s| {
                    element(s)?;
                    s.or(&mut [
                        &mut |s| s.consume("Comma"),
                        &mut |s| s.lookahead(true, |s| s.consume("RBracket")),
                    ])
                },
            ])
        })?;
        s.consume("RBracket")
    })
}

fn object_literal(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("object_literal", |s| {
        s.consume("LBrace")?;
        s.option(|s| {
            property(s)?;
            s.many(|s| {
                s.consume("Comma")?;
                property(s)
            })?;
            s.option(|s| s.consume("Comma"))
        })?;
        s.consume("RBrace")
    })
}

fn property(s: &mut ParserState<'_>) -> ParseResult {
    fn property_name(s: &mut ParserState<'_>) -> ParseResult {
        s.or(&mut [
            &mut identifier_name,
            &mut |s| one_of(s, &["StringLiteral", "NumericLiteral"]),
            &mut |s| {
                s.consume("LBracket")?;
                assignment_expression(s)?;
                s.consume("RBracket")
            },
        ])
    }

    s.rule("property", |s| {
        s.or(&mut [
            &mut |s| {
                property_name(s)?;
                s.consume("Colon")?;
                assignment_expression(s)
            },
            &mut |s| {
                s.consume("Ellipsis")?;
                assignment_expression(s)
            },
            &mut |s| s.consume("Identifier"),
        ])
    })
}

fn function_expression(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("function_expression", |s| {
        s.consume("Function")?;
        s.option(|s| s.consume("Identifier"))?;
        formal_parameters(s)?;
        function_body(s)
    })
}

fn template_literal(s: &mut ParserState<'_>) -> ParseResult {
    s.rule("template_literal", |s| {
        s.or(&mut [
            &mut |s| s.consume("NoSubstitutionTemplate"),
            &mut |s| {
                s.consume("TemplateHead")?;
                expression(s)?;
                s.many(|s| {
                    s.consume("TemplateMiddle")?;
                    expression(s)
                })?;
                s.consume("TemplateTail")
            },
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_builds() {
        let lexicon = lexicon();

        assert!(lexicon.get("QuestionDot").is_some());
        assert!(lexicon.get("If").map_or(false, |definition| definition.is_keyword()));
        assert_eq!(
            lexicon.len(),
            5 + KEYWORDS.len() + 8 + PUNCTUATORS.len() + 1
        );
    }

    #[test]
    fn keyword_names_are_unique() {
        let mut names: Vec<_> = KEYWORDS
            .iter()
            .chain(PUNCTUATORS)
            .map(|&(name, _)| name)
            .collect();
        let count = names.len();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), count);
    }
}

//! Parsing critter program text.
//!
//! ```text
//! program     := rule*
//! rule        := condition '-->' update* action? ';'
//! condition   := conjunction ('or' conjunction)*
//! conjunction := relation ('and' relation)*
//! relation    := expr relop expr | '{' condition '}'
//! expr        := term (('+' | '-') term)*
//! term        := factor (('*' | '/' | 'mod') factor)*
//! factor      := NUM | '-' NUM | '-' factor | mem | '(' expr ')' | sensor
//! ```
//!
//! `//` starts a comment running to the end of the line.

mod lexer;
mod parser;

use crate::ast::Program;
use crate::error::ParseResult;

/// Parse a whole program.
///
/// # Errors
///
/// Returns a [`ParseError`](crate::error::ParseError) on the first structural
/// problem; nothing is built from a malformed input.
pub fn parse(input: &str) -> ParseResult<Program> {
    parser::Parser::parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{MemAddr, NodeKind, Sugar};
    use crate::error::ParseError;

    fn reprint(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn test_simple_rule() {
        let program = parse("mem[0] > 5 --> mem[7] := mem[7] + 1 forward;").unwrap();
        assert_eq!(program.rule_count(), 1);
        assert_eq!(
            program.to_string(),
            "mem[0] > 5 --> mem[7] := mem[7] + 1\n               forward;\n"
        );
    }

    #[test]
    fn test_rules_separated_by_blank_line() {
        let text = reprint("1 = 1 --> wait; 2 = 2 --> eat;");
        assert_eq!(text, "1 = 1 --> wait;\n\n2 = 2 --> eat;\n");
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(reprint("1 + 2 * 3 < 4 --> wait;"), "1 + (2 * 3) < 4 --> wait;\n");
        assert_eq!(reprint("(1 + 2) * 3 < 4 --> wait;"), "(1 + 2) * 3 < 4 --> wait;\n");
        assert_eq!(reprint("1 - 2 - 3 = 0 --> wait;"), "(1 - 2) - 3 = 0 --> wait;\n");
    }

    #[test]
    fn test_connectives_are_braced_when_nested() {
        let text = reprint("1 < 2 or 3 < 4 and 5 < 6 --> wait;");
        assert_eq!(text, "1 < 2 or {3 < 4 and 5 < 6} --> wait;\n");
        let braced = reprint("{1 < 2} and 3 < 4 --> wait;");
        assert_eq!(braced, "1 < 2 and 3 < 4 --> wait;\n");
    }

    #[test]
    fn test_negation() {
        let program = parse("-5 < -(size) --> wait;").unwrap();
        assert_eq!(program.to_string(), "-5 < -(size) --> wait;\n");
        assert!(
            program
                .descendants(program.root())
                .iter()
                .any(|&id| *program.kind(id) == NodeKind::Num(-5))
        );
        assert_eq!(reprint("-2147483648 < 0 --> wait;"), "-2147483648 < 0 --> wait;\n");
    }

    #[test]
    fn test_tag_is_sugar_or_action() {
        let program = parse("tag = 0 --> tag := 5 tag[3];").unwrap();
        let kinds: Vec<_> = program
            .descendants(program.root())
            .into_iter()
            .map(|id| program.kind(id).clone())
            .collect();
        assert!(kinds.contains(&NodeKind::Mem(MemAddr::Sugar(Sugar::Tag))));
        assert!(
            kinds
                .iter()
                .any(|k| matches!(k, NodeKind::Action { kind: crate::ast::ActionKind::Tag, .. }))
        );
        assert_eq!(program.to_string(), "tag = 0 --> tag := 5\n            tag[3];\n");
    }

    #[test]
    fn test_empty_rule_body() {
        assert_eq!(reprint("smell > 0 --> ;"), "smell > 0 --> ;\n");
    }

    #[test]
    fn test_sensors_and_mod() {
        let text = "nearby[0] mod 2 != ahead[1] / random[10] --> serve[energy / 2];\n";
        assert_eq!(reprint(text), text);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("1 < 2 --> wait"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse("1 < 2 --> 3 := 4;"),
            Err(ParseError::InvalidUpdateTarget { line: 1 })
        ));
        assert!(matches!(
            parse("1 < 2\n--> wait; 3 --> wait;"),
            Err(ParseError::UnexpectedToken { line: 2, .. })
        ));
        assert!(matches!(
            parse("2147483648 > 0 --> wait;"),
            Err(ParseError::NumberOutOfRange { .. })
        ));
        assert!(matches!(
            parse("1 < 2 --> wait eat;"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| {
            format!("{}1{} = 1 --> wait;", "(".repeat(depth), ")".repeat(depth))
        };
        assert!(parse(&nested(parser::MAX_DEPTH)).is_ok());
        assert!(matches!(
            parse(&nested(parser::MAX_DEPTH + 1)),
            Err(ParseError::TooDeep { line: 1, .. })
        ));
        assert!(matches!(
            parse(&nested(100_000)),
            Err(ParseError::TooDeep { .. })
        ));
        let braces = format!("{}1 = 1{} --> wait;", "{".repeat(100_000), "}".repeat(100_000));
        assert!(matches!(parse(&braces), Err(ParseError::TooDeep { .. })));
        let negations = format!("{}mem[8] = 0 --> wait;", "-".repeat(100_000));
        assert!(matches!(parse(&negations), Err(ParseError::TooDeep { .. })));
    }

    #[test]
    fn test_reprint_is_stable() {
        let text = "posture != 17 and {mem[8] = 0 or energy > size * 400} --> mem[8] := 1\n\
                    mem[9] := -(mem[8]) mod 3\n\
                    bud;\n\
                    ahead[1] < -1 --> eat;";
        let once = reprint(text);
        let twice = reprint(&once);
        assert_eq!(once, twice);
    }
}

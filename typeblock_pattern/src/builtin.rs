// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in recognizers for literals, binary arithmetic and variable assignment.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::instruction::BlockCreationInstruction;
use crate::pattern::{InputPattern, PatternMatch};

bitflags::bitflags! {
    /// Selects which built-in patterns an engine registers.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct BuiltinPatterns: u8 {
        /// Numeric literals: `42`, `-3.14`.
        const NUMBER = 1 << 0;
        /// Quoted text: `"hello"`, `'hi'`.
        const TEXT = 1 << 1;
        /// `true` / `false`, any case.
        const BOOLEAN = 1 << 2;
        /// `<number> <op> <number>` with `+ - * /`.
        const MATH_EXPRESSION = 1 << 3;
        /// `set <name> to <value>`.
        const ASSIGNMENT = 1 << 4;
    }
}

impl Default for BuiltinPatterns {
    fn default() -> Self {
        Self::all()
    }
}

const NUMBER_SRC: &str = r"^-?\d+(?:\.\d+)?$";

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(NUMBER_SRC).expect("valid regex"));
static TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?:"([^"]*)"|'([^']*)')$"#).expect("valid regex"));
static BOOLEAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(true|false)$").expect("valid regex"));
static MATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?)\s*([-+*/])\s*(-?\d+(?:\.\d+)?)$").expect("valid regex")
});
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^set\s+([A-Za-z_]\w*)\s+to\s+(.+)$").expect("valid regex")
});
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*$").expect("valid regex"));

fn number_block(text: &str) -> BlockCreationInstruction {
    BlockCreationInstruction::new("math_number").with_field("NUM", text)
}

fn text_block(text: &str) -> BlockCreationInstruction {
    BlockCreationInstruction::new("text").with_field("TEXT", text)
}

fn boolean_block(text: &str) -> BlockCreationInstruction {
    let value = if text.eq_ignore_ascii_case("true") {
        "TRUE"
    } else {
        "FALSE"
    };
    BlockCreationInstruction::new("logic_boolean").with_field("BOOL", value)
}

/// Parses a literal or bare identifier on the right-hand side of an assignment.
fn value_block(text: &str) -> Option<BlockCreationInstruction> {
    let text = text.trim();
    if NUMBER.is_match(text) {
        return Some(number_block(text));
    }
    if let Some(m) = PatternMatch::find(&TEXT, text) {
        return TextPattern.parse_input(&m);
    }
    if BOOLEAN.is_match(text) {
        return Some(boolean_block(text));
    }
    if IDENTIFIER.is_match(text) {
        return Some(BlockCreationInstruction::new("variables_get").with_field("VAR", text));
    }
    None
}

/// Returns `true` if `prefix` is a non-empty, case-insensitive prefix of `word`.
pub(crate) fn is_word_prefix(prefix: &str, word: &str) -> bool {
    !prefix.is_empty()
        && prefix.len() <= word.len()
        && word.is_char_boundary(prefix.len())
        && word[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Numeric literal → `math_number`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumberPattern;

impl InputPattern for NumberPattern {
    fn name(&self) -> &str {
        "number"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn description(&self) -> &str {
        "Number literal"
    }

    fn grammar(&self) -> &Regex {
        &NUMBER
    }

    fn parse_input(&self, m: &PatternMatch) -> Option<BlockCreationInstruction> {
        Some(number_block(m.matched()))
    }
}

/// Quoted text → `text`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextPattern;

impl InputPattern for TextPattern {
    fn name(&self) -> &str {
        "text"
    }

    fn priority(&self) -> i32 {
        95
    }

    fn description(&self) -> &str {
        "Quoted text"
    }

    fn grammar(&self) -> &Regex {
        &TEXT
    }

    fn parse_input(&self, m: &PatternMatch) -> Option<BlockCreationInstruction> {
        let content = m.group(1).or_else(|| m.group(2))?;
        Some(text_block(content))
    }

    fn generate_suggestions(&self, input: &str) -> Vec<String> {
        let t = input.trim();
        let Some(quote) = t.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            return Vec::new();
        };
        if t.len() > 1 && t.ends_with(quote) {
            return Vec::new();
        }
        vec![format!("{t}{quote}")]
    }
}

/// `true` / `false` → `logic_boolean`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanPattern;

impl InputPattern for BooleanPattern {
    fn name(&self) -> &str {
        "boolean"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn description(&self) -> &str {
        "Boolean literal"
    }

    fn grammar(&self) -> &Regex {
        &BOOLEAN
    }

    fn parse_input(&self, m: &PatternMatch) -> Option<BlockCreationInstruction> {
        Some(boolean_block(m.group(1)?))
    }

    fn generate_suggestions(&self, input: &str) -> Vec<String> {
        let t = input.trim();
        ["true", "false"]
            .into_iter()
            .filter(|word| is_word_prefix(t, word) && t.len() < word.len())
            .map(str::to_owned)
            .collect()
    }
}

/// `<number> <op> <number>` → `math_arithmetic` with two `math_number` operands.
#[derive(Clone, Copy, Debug, Default)]
pub struct MathExpressionPattern;

impl MathExpressionPattern {
    fn operator_code(op: &str) -> Option<&'static str> {
        match op {
            "+" => Some("ADD"),
            "-" => Some("MINUS"),
            "*" => Some("MULTIPLY"),
            "/" => Some("DIVIDE"),
            _ => None,
        }
    }
}

impl InputPattern for MathExpressionPattern {
    fn name(&self) -> &str {
        "math_expression"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn description(&self) -> &str {
        "Binary arithmetic on two numbers"
    }

    fn grammar(&self) -> &Regex {
        &MATH
    }

    fn parse_input(&self, m: &PatternMatch) -> Option<BlockCreationInstruction> {
        let op = Self::operator_code(m.group(2)?)?;
        Some(
            BlockCreationInstruction::new("math_arithmetic")
                .with_field("OP", op)
                .with_child("A", number_block(m.group(1)?))
                .with_child("B", number_block(m.group(3)?)),
        )
    }

    fn generate_suggestions(&self, input: &str) -> Vec<String> {
        let t = input.trim();
        let Some(lhs) = t.strip_suffix(['+', '-', '*', '/']) else {
            return Vec::new();
        };
        if NUMBER.is_match(lhs.trim_end()) {
            vec![format!("{t} 1")]
        } else {
            Vec::new()
        }
    }
}

/// `set <name> to <value>` → `variables_set` with the parsed value in `VALUE`.
///
/// The value is a number, quoted text, boolean, or a bare identifier read through
/// `variables_get`. Anything else yields an assignment with an empty `VALUE`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssignmentPattern;

impl InputPattern for AssignmentPattern {
    fn name(&self) -> &str {
        "variable_assignment"
    }

    fn priority(&self) -> i32 {
        85
    }

    fn description(&self) -> &str {
        "Assign a value to a variable"
    }

    fn grammar(&self) -> &Regex {
        &ASSIGNMENT
    }

    fn parse_input(&self, m: &PatternMatch) -> Option<BlockCreationInstruction> {
        let set = BlockCreationInstruction::new("variables_set").with_field("VAR", m.group(1)?);
        Some(match value_block(m.group(2)?) {
            Some(value) => set.with_child("VALUE", value),
            None => set,
        })
    }

    fn generate_suggestions(&self, input: &str) -> Vec<String> {
        let t = input.trim();
        if !t.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("set ")) {
            return Vec::new();
        }
        let name = t[4..].trim();
        if IDENTIFIER.is_match(name) {
            vec![format!("set {name} to 0")]
        } else {
            Vec::new()
        }
    }
}

/// The built-in patterns selected by `which`.
#[must_use]
pub fn builtin_patterns(which: BuiltinPatterns) -> Vec<Arc<dyn InputPattern>> {
    let mut out: Vec<Arc<dyn InputPattern>> = Vec::new();
    if which.contains(BuiltinPatterns::NUMBER) {
        out.push(Arc::new(NumberPattern));
    }
    if which.contains(BuiltinPatterns::TEXT) {
        out.push(Arc::new(TextPattern));
    }
    if which.contains(BuiltinPatterns::BOOLEAN) {
        out.push(Arc::new(BooleanPattern));
    }
    if which.contains(BuiltinPatterns::MATH_EXPRESSION) {
        out.push(Arc::new(MathExpressionPattern));
    }
    if which.contains(BuiltinPatterns::ASSIGNMENT) {
        out.push(Arc::new(AssignmentPattern));
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(p: &dyn InputPattern, input: &str) -> Option<BlockCreationInstruction> {
        p.parse_input(&PatternMatch::find(p.grammar(), input)?)
    }

    #[test]
    fn number_keeps_text_verbatim() {
        for input in ["42", "-3.14", "0", "007"] {
            let i = parse(&NumberPattern, input).unwrap();
            assert_eq!(i.block_type, "math_number");
            assert_eq!(i.field("NUM"), Some(input));
        }
        assert!(parse(&NumberPattern, "4.").is_none());
        assert!(parse(&NumberPattern, "1e3").is_none());
    }

    #[test]
    fn text_strips_either_quote() {
        assert_eq!(
            parse(&TextPattern, "\"hi there\"").unwrap().field("TEXT"),
            Some("hi there")
        );
        assert_eq!(parse(&TextPattern, "''").unwrap().field("TEXT"), Some(""));
        assert!(parse(&TextPattern, "\"mixed'").is_none());
    }

    #[test]
    fn boolean_is_canonicalized() {
        assert_eq!(
            parse(&BooleanPattern, "True").unwrap().field("BOOL"),
            Some("TRUE")
        );
        assert_eq!(
            parse(&BooleanPattern, "FALSE").unwrap().field("BOOL"),
            Some("FALSE")
        );
        assert!(parse(&BooleanPattern, "truth").is_none());
    }

    #[test]
    fn math_builds_operands() {
        let i = parse(&MathExpressionPattern, "2 + 3").unwrap();
        let expected = BlockCreationInstruction::new("math_arithmetic")
            .with_field("OP", "ADD")
            .with_child("A", number_block("2"))
            .with_child("B", number_block("3"));
        assert_eq!(i, expected);

        let i = parse(&MathExpressionPattern, "-1.5/4").unwrap();
        assert_eq!(i.field("OP"), Some("DIVIDE"));
        assert_eq!(i.children[0].instruction.field("NUM"), Some("-1.5"));
    }

    #[test]
    fn math_accepts_subtracting_a_negative() {
        let i = parse(&MathExpressionPattern, "5 - -2").unwrap();
        assert_eq!(i.field("OP"), Some("MINUS"));
        assert_eq!(i.children[1].instruction.field("NUM"), Some("-2"));
    }

    #[test]
    fn assignment_child_matches_standalone_parse() {
        let cases: [(&str, &dyn InputPattern, &str); 3] = [
            ("set x to 5", &NumberPattern, "5"),
            ("set x to 'hi'", &TextPattern, "'hi'"),
            ("SET x TO false", &BooleanPattern, "false"),
        ];
        for (input, pattern, literal) in cases {
            let i = parse(&AssignmentPattern, input).unwrap();
            assert_eq!(i.block_type, "variables_set");
            assert_eq!(i.field("VAR"), Some("x"));
            assert_eq!(i.children.len(), 1);
            assert_eq!(i.children[0].input, "VALUE");
            assert_eq!(
                i.children[0].instruction,
                parse(pattern, literal).unwrap()
            );
        }
    }

    #[test]
    fn assignment_of_identifier_reads_variable() {
        let i = parse(&AssignmentPattern, "set total to count").unwrap();
        let child = &i.children[0].instruction;
        assert_eq!(child.block_type, "variables_get");
        assert_eq!(child.field("VAR"), Some("count"));
    }

    #[test]
    fn assignment_of_unparsed_value_has_no_child() {
        let i = parse(&AssignmentPattern, "set x to 1 + 2").unwrap();
        assert!(i.children.is_empty());
    }

    #[test]
    fn suggestions_complete_partial_input() {
        assert_eq!(TextPattern.generate_suggestions("\"abc"), vec!["\"abc\""]);
        assert!(TextPattern.generate_suggestions("\"abc\"").is_empty());
        assert_eq!(BooleanPattern.generate_suggestions("tr"), vec!["true"]);
        assert!(BooleanPattern.generate_suggestions("true").is_empty());
        assert_eq!(MathExpressionPattern.generate_suggestions("4 +"), vec!["4 + 1"]);
        assert_eq!(
            AssignmentPattern.generate_suggestions("set n"),
            vec!["set n to 0"]
        );
    }

    #[test]
    fn selection_respects_flags() {
        let names: Vec<String> = builtin_patterns(BuiltinPatterns::all() - BuiltinPatterns::BOOLEAN)
            .iter()
            .map(|p| p.name().to_owned())
            .collect();
        assert_eq!(
            names,
            vec!["number", "text", "math_expression", "variable_assignment"]
        );
    }
}

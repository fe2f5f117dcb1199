//! Diagnostic records produced by the parser and the checker.

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const IDENTIFIER_EXPECTED: u32 = 1003;
    pub const EXPECTED: u32 = 1005;
    pub const UNEXPECTED_TOKEN: u32 = 1012;
    pub const UNTERMINATED_REGULAR_EXPRESSION_LITERAL: u32 = 1161;
    pub const EXPRESSION_EXPECTED: u32 = 1109;
    pub const DECLARATION_OR_STATEMENT_EXPECTED: u32 = 1128;
    pub const PROPERTY_ASSIGNMENT_EXPECTED: u32 = 1136;
    pub const TYPE_EXPECTED: u32 = 1110;
    pub const UNTERMINATED_TEMPLATE_LITERAL: u32 = 1160;
    pub const UNTERMINATED_COMMENT: u32 = 1010;
    pub const INVALID_CHARACTER: u32 = 1127;
    pub const EXPRESSION_TOO_DEEPLY_NESTED: u32 = 1450;
    pub const THIS_IMPLICITLY_HAS_TYPE_ANY: u32 = 2683;
}

pub mod diagnostic_messages {
    pub const UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const IDENTIFIER_EXPECTED: &str = "Identifier expected.";
    pub const EXPECTED: &str = "'{0}' expected.";
    pub const UNEXPECTED_TOKEN: &str = "Unexpected token.";
    pub const UNTERMINATED_REGULAR_EXPRESSION_LITERAL: &str =
        "Unterminated regular expression literal.";
    pub const EXPRESSION_EXPECTED: &str = "Expression expected.";
    pub const DECLARATION_OR_STATEMENT_EXPECTED: &str = "Declaration or statement expected.";
    pub const PROPERTY_ASSIGNMENT_EXPECTED: &str = "Property assignment expected.";
    pub const TYPE_EXPECTED: &str = "Type expected.";
    pub const UNTERMINATED_TEMPLATE_LITERAL: &str = "Unterminated template literal.";
    pub const UNTERMINATED_COMMENT: &str = "'*/' expected.";
    pub const INVALID_CHARACTER: &str = "Invalid character.";
    pub const EXPRESSION_TOO_DEEPLY_NESTED: &str = "Expression is too deeply nested.";
    pub const THIS_IMPLICITLY_HAS_TYPE_ANY: &str =
        "'this' implicitly has type 'any' because it does not have a type annotation.";
}

static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = {
    use DiagnosticCategory::Error;
    use diagnostic_codes as c;
    use diagnostic_messages as m;
    &[
        DiagnosticMessage { code: c::UNTERMINATED_STRING_LITERAL, category: Error, message: m::UNTERMINATED_STRING_LITERAL },
        DiagnosticMessage { code: c::IDENTIFIER_EXPECTED, category: Error, message: m::IDENTIFIER_EXPECTED },
        DiagnosticMessage { code: c::EXPECTED, category: Error, message: m::EXPECTED },
        DiagnosticMessage { code: c::UNEXPECTED_TOKEN, category: Error, message: m::UNEXPECTED_TOKEN },
        DiagnosticMessage { code: c::UNTERMINATED_REGULAR_EXPRESSION_LITERAL, category: Error, message: m::UNTERMINATED_REGULAR_EXPRESSION_LITERAL },
        DiagnosticMessage { code: c::EXPRESSION_EXPECTED, category: Error, message: m::EXPRESSION_EXPECTED },
        DiagnosticMessage { code: c::DECLARATION_OR_STATEMENT_EXPECTED, category: Error, message: m::DECLARATION_OR_STATEMENT_EXPECTED },
        DiagnosticMessage { code: c::PROPERTY_ASSIGNMENT_EXPECTED, category: Error, message: m::PROPERTY_ASSIGNMENT_EXPECTED },
        DiagnosticMessage { code: c::TYPE_EXPECTED, category: Error, message: m::TYPE_EXPECTED },
        DiagnosticMessage { code: c::UNTERMINATED_TEMPLATE_LITERAL, category: Error, message: m::UNTERMINATED_TEMPLATE_LITERAL },
        DiagnosticMessage { code: c::UNTERMINATED_COMMENT, category: Error, message: m::UNTERMINATED_COMMENT },
        DiagnosticMessage { code: c::INVALID_CHARACTER, category: Error, message: m::INVALID_CHARACTER },
        DiagnosticMessage { code: c::EXPRESSION_TOO_DEEPLY_NESTED, category: Error, message: m::EXPRESSION_TOO_DEEPLY_NESTED },
        DiagnosticMessage { code: c::THIS_IMPLICITLY_HAS_TYPE_ANY, category: Error, message: m::THIS_IMPLICITLY_HAS_TYPE_ANY },
    ]
};

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    #[must_use]
    pub fn error(file: impl Into<String>, start: u32, length: u32, message: impl Into<String>, code: u32) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            file: file.into(),
            start,
            length,
            message_text: message.into(),
        }
    }

    /// Build a diagnostic from its registered code, filling in `{N}` arguments.
    #[must_use]
    pub fn from_code(code: u32, file: &str, start: u32, length: u32, args: &[&str]) -> Self {
        let (category, message_text) = match get_diagnostic_message(code) {
            Some(message) => (message.category, format_message(message.message, args)),
            None => (DiagnosticCategory::Error, format!("TS{code}")),
        };
        Self {
            category,
            code,
            file: file.to_string(),
            start,
            length,
            message_text,
        }
    }

    #[must_use]
    pub const fn end(&self) -> u32 {
        self.start + self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_formats_arguments() {
        let diag = Diagnostic::from_code(diagnostic_codes::EXPECTED, "a.ts", 3, 1, &[";"]);
        assert_eq!(diag.message_text, "';' expected.");
        assert_eq!(diag.category, DiagnosticCategory::Error);
        assert_eq!(diag.end(), 4);
    }

    #[test]
    fn implicit_this_message() {
        let diag = Diagnostic::from_code(
            diagnostic_codes::THIS_IMPLICITLY_HAS_TYPE_ANY,
            "a.ts",
            0,
            4,
            &[],
        );
        assert_eq!(diag.code, 2683);
        assert!(diag.message_text.starts_with("'this' implicitly has type 'any'"));
    }
}

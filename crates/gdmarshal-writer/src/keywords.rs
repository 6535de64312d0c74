//! C# reserved keyword handling.

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "volatile", "void", "while",
];

/// Returns `true` if `identifier` is a reserved C# keyword.
pub fn is_csharp_keyword(identifier: &str) -> bool {
    CSHARP_KEYWORDS.contains(&identifier)
}

/// Prefix reserved keywords with `@` so they can be used as identifiers.
pub fn escape_identifier(identifier: &str) -> String {
    if is_csharp_keyword(identifier) {
        format!("@{identifier}")
    } else {
        identifier.to_string()
    }
}

/// How escape sequences in string literals end up in decoded strings.
///
/// Escapes are validated the same way in both modes: only `\b \f \n \r \t \/ \" \\`
/// and `\u` followed by exactly four hex digits are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapeMode {
    /// Replace every escape with the character it stands for. `\uXXXX` escapes
    /// forming a UTF-16 surrogate pair are combined into one character, and an
    /// unpaired surrogate is rejected.
    #[default]
    Resolve,
    /// Keep escapes as written, backslash included. `"a\nb"` decodes to the
    /// four characters `a`, `\`, `n`, `b`.
    Preserve,
}

/// Configuration for a [`Decoder`](crate::Decoder).
///
/// # Default
///
/// Escapes are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    pub escapes: EscapeMode,
}

impl DecoderOptions {
    pub fn with_escapes(mut self, escapes: EscapeMode) -> Self {
        self.escapes = escapes;
        self
    }
}

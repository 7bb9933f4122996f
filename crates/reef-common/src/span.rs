use serde::Serialize;

/// A 1-based (line, column) source position.
///
/// Reef diagnostics are rendered as `[Ln L, Col C]`, so positions are
/// tracked eagerly while scanning instead of being recomputed from byte
/// offsets. Column counts bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Create a new position. Both coordinates are 1-based.
    pub fn new(line: u32, column: u32) -> Self {
        debug_assert!(line >= 1 && column >= 1, "positions are 1-based");
        Self { line, column }
    }

    /// The position of the first byte of a source buffer.
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Ln {}, Col {}]", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_diagnostic_suffix() {
        assert_eq!(Position::new(1, 7).to_string(), "[Ln 1, Col 7]");
        assert_eq!(Position::new(12, 3).to_string(), "[Ln 12, Col 3]");
    }

    #[test]
    fn start_is_one_one() {
        assert_eq!(Position::start(), Position::new(1, 1));
    }
}

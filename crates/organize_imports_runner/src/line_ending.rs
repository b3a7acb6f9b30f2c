use organize_imports_core::NewLineKind;

/// Majority vote over the line endings of a group's files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineEndingVote {
    weight: i64,
}

impl LineEndingVote {
    /// Counts a file's original text: `+1` if it contains CRLF, `-1` otherwise.
    pub fn record(&mut self, text: &str) {
        if text.contains("\r\n") {
            self.weight += 1;
        } else {
            self.weight -= 1;
        }
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// `None` on a tie, leaving the workspace's configured default in place.
    pub fn decision(&self) -> Option<NewLineKind> {
        match self.weight {
            0 => None,
            w if w > 0 => Some(NewLineKind::CarriageReturnLineFeed),
            _ => Some(NewLineKind::LineFeed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_crlf() {
        let mut vote = LineEndingVote::default();
        for text in ["a\r\n", "b\r\n", "c\r\n", "d\n"] {
            vote.record(text);
        }
        assert_eq!(vote.weight(), 2);
        assert_eq!(vote.decision(), Some(NewLineKind::CarriageReturnLineFeed));
    }

    #[test]
    fn test_majority_lf() {
        let mut vote = LineEndingVote::default();
        vote.record("a\n");
        assert_eq!(vote.decision(), Some(NewLineKind::LineFeed));
    }

    #[test]
    fn test_tie_keeps_default() {
        let mut vote = LineEndingVote::default();
        for text in ["a\r\n", "b\r\n", "c\n", "d\n"] {
            vote.record(text);
        }
        assert_eq!(vote.decision(), None);
        assert_eq!(LineEndingVote::default().decision(), None);
    }

    #[test]
    fn test_file_without_newlines_counts_as_lf() {
        let mut vote = LineEndingVote::default();
        vote.record("import a from 'a';");
        assert_eq!(vote.weight(), -1);
    }
}

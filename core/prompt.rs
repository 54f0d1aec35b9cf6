use std::fmt;

pub const BLOCK_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn build_prompt<S: AsRef<str>>(question: &str, blocks: &[S]) -> Prompt {
    let mut prompt = String::from(question);
    for block in blocks {
        prompt.push_str(BLOCK_SEPARATOR);
        prompt.push_str(block.as_ref());
    }
    Prompt(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::format_block;

    #[test]
    fn test_question_only() {
        let prompt = build_prompt::<String>("Summarize", &[]);
        assert_eq!(prompt.as_str(), "Summarize");
    }

    #[test]
    fn test_blocks_follow_question() {
        let blocks = vec![format_block("a.txt", "hello\n"), format_block("b.txt", "x")];
        let prompt = build_prompt("Explain", &blocks);
        assert_eq!(
            prompt.as_str(),
            "Explain\n\nFile: a.txt\n\"\"\"\nhello\n\"\"\"\n\nFile: b.txt\n\"\"\"\nx\n\"\"\""
        );
    }

    #[test]
    fn test_deterministic() {
        let blocks = vec![format_block("a.txt", "1")];
        assert_eq!(build_prompt("q", &blocks), build_prompt("q", &blocks));
    }
}

//! Bibliographic field extraction prompt.
//!
//! Instructs the generation service to return plain text with exactly 14
//! fields separated by '|||', substituting 'NA' for unavailable fields.

/// Extraction prompt template for a single paper.
/// Placeholders: {link}, {text}
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract the following fields from the provided paper details and return the answer as plain text with exactly 14 fields separated by '|||'. The fields, in order, are:
1. LINKS OF THE PAPER
2. TITLE OF THE PAPER
3. AUTHOR
4. YEAR OF PAPER
5. JOURNAL NAME
6. IMPACT FACTOR
7. PURPOSE OF THE PAPER
8. TECHNIQUES USED AND PROPOSED IN THE PAPER
9. DATASET USED
10. ACCURACY OF THE TECHNIQUES
11. ADVANTAGES OVER OTHER TECHNIQUES
12. DRAWBACK OF PROPOSED TECHNIQUES
13. CONCLUSION OF PAPER
14. FUTURE WORK

Link: {link}

Text: {text}

For any field that is not available or mentioned, return 'NA'. Return only the plain text result with fields separated by '|||'."#;

/// Build the extraction prompt for one (link, text) pair
pub fn build_extraction_prompt(link: &str, text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{link}", link)
        .replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_extraction_prompt() {
        let prompt = build_extraction_prompt("http://a", "Paper about X");
        assert!(prompt.contains("Link: http://a"));
        assert!(prompt.contains("Text: Paper about X"));
        assert!(prompt.contains("exactly 14 fields"));
        assert!(prompt.contains("'|||'"));
        assert!(prompt.contains("'NA'"));
    }
}

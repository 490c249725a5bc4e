//! The two fixed prompt templates.

/// Asks for a bulleted list of problems on one page, or `sentinel` when there are none.
pub fn scrutinize_prompt(text: &str, page_number: u32, sentinel: &str) -> String {
    format!(
        "You are a meticulous editor. Carefully scrutinize this document for:
- typos
- unsourced statements of fact
- overwritten or inelegant passages.

Text:
{text}

Please return a bulleted list of errors you found on page {page_number}, specifying what's wrong with each line.
If you find nothing worth changing, reply with exactly: {sentinel}
"
    )
}

/// Asks for the page rewritten with `corrections` applied.
pub fn edit_prompt(text: &str, corrections: &str) -> String {
    format!(
        "You are a meticulous editor. Here are some corrections that need to be applied:
{corrections}
Note: You may ignore citations, simply place [citation needed] where a citation may belong
Text:
{text}

Please return the corrected version of the text.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrutinize_prompt_carries_page_and_text() {
        let p = scrutinize_prompt("Teh cat.", 3, "NO ISSUES");
        assert!(p.contains("Teh cat."));
        assert!(p.contains("on page 3"));
        assert!(p.contains("reply with exactly: NO ISSUES"));
    }

    #[test]
    fn braces_in_page_text_are_left_alone() {
        let p = edit_prompt("f(x) = {page_number}", "- fix");
        assert!(p.contains("f(x) = {page_number}"));
        assert!(p.contains("[citation needed]"));
    }
}

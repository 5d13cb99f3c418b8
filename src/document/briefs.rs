//! News brief parser
//!
//! Each brief is one bullet of the form `- **Title**: summary`. Lines that
//! are not bullets are ignored; bullets without a bold title are skipped
//! and reported back to the caller.

use super::model::NewsBrief;

/// Parses the text of the news section into briefs
pub fn parse_news_briefs(section: &str) -> Vec<NewsBrief> {
    scan(section).0
}

/// Parses the news section, also returning the bullets that were skipped
pub(crate) fn scan(section: &str) -> (Vec<NewsBrief>, Vec<String>) {
    let mut briefs = Vec::new();
    let mut dropped = Vec::new();

    for line in section.lines() {
        let Some(content) = line.trim().strip_prefix("- ") else {
            continue;
        };

        match parse_bullet(content) {
            Some(brief) => briefs.push(brief),
            None => dropped.push(content.trim().to_string()),
        }
    }

    (briefs, dropped)
}

fn parse_bullet(content: &str) -> Option<NewsBrief> {
    let open = content.find("**")?;
    let after_open = &content[open + 2..];
    let close = after_open.find("**")?;

    let title = after_open[..close].trim();
    if title.is_empty() {
        return None;
    }

    let summary = after_open[close + 2..]
        .trim_matches(|c: char| c == ':' || c == '：' || c.is_whitespace());

    Some(NewsBrief::new(title, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bold_title_and_summary() {
        let briefs = parse_news_briefs("- **GitHub Update**: shipped a new feature");
        assert_eq!(
            briefs,
            vec![NewsBrief {
                title: "GitHub Update".to_string(),
                summary: "shipped a new feature".to_string(),
                url: String::new(),
            }]
        );
    }

    #[test]
    fn non_bullet_lines_are_ignored() {
        let text = "Intro paragraph\n\n- **A**: first\nnot a bullet\n- **B**: second";
        let titles: Vec<_> = parse_news_briefs(text).into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn bullets_without_bold_title_are_dropped() {
        let (briefs, dropped) = scan("- plain bullet\n- **Kept**: yes\n- **unclosed title");
        assert_eq!(briefs.len(), 1);
        assert_eq!(dropped, vec!["plain bullet", "**unclosed title"]);
    }

    #[test]
    fn colon_inside_bold_and_full_width_separator() {
        let briefs = parse_news_briefs("- **Title:** summary one\n- **标题**：摘要");
        assert_eq!(briefs[0].title, "Title:");
        assert_eq!(briefs[0].summary, "summary one");
        assert_eq!(briefs[1].title, "标题");
        assert_eq!(briefs[1].summary, "摘要");
    }

    #[test]
    fn indented_bullets_are_accepted() {
        let briefs = parse_news_briefs("   - **X**: y");
        assert_eq!(briefs[0].title, "X");
    }

    #[test]
    fn missing_summary_is_empty() {
        let briefs = parse_news_briefs("- **Only Title**");
        assert_eq!(briefs[0].summary, "");
    }
}

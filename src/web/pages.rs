//! HTML for the drill, answer and error pages.
//!
//! Pages are small enough to assemble with `format!`; every interpolated value
//! goes through [`escape_html`].

use crate::drill::{AnswerReport, DrillPrompt};
use axum::http::StatusCode;

pub(super) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

pub(super) fn drill_page(clue: &DrillPrompt, error: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Clue Drill</h1>\n");
    if let Some(error) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(error)));
    }
    body.push_str(&format!(
        "<p class=\"clue\">{clue}</p>\n\
         <form method=\"post\" action=\"/drill/\">\n\
         <input type=\"hidden\" name=\"clue_id\" value=\"{id}\">\n\
         <input type=\"text\" name=\"answer\" autofocus autocomplete=\"off\">\n\
         <button type=\"submit\">Submit</button>\n\
         </form>",
        clue = escape_html(&clue.clue_text),
        id = clue.clue_id,
    ));
    layout("Clue Drill", &body)
}

pub(super) fn answer_page(report: &AnswerReport) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n<p class=\"message\">{}</p>\n<p class=\"puzzle\">{}</p>\n",
        escape_html(&report.clue.clue_text),
        escape_html(&report.message),
        escape_html(&report.clue.puzzle.to_string())
    );
    if report.is_unique {
        body.push_str("<p class=\"unique\">This clue appears only once.</p>\n");
    } else {
        body.push_str("<p class=\"shared\">This clue has appeared for:</p>\n<ul>\n");
        for group in &report.similar_clues {
            body.push_str(&format!(
                "<li>{} ({})</li>\n",
                escape_html(&group.entry_text),
                group.count
            ));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("<p><a href=\"/drill/\">Next clue</a></p>");
    layout("Answer", &body)
}

pub(super) fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/drill/\">Back to the drill</a></p>",
        status,
        escape_html(message)
    );
    layout(&status.to_string(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ClueDetail, EntryCount, Puzzle};
    use chrono::NaiveDate;

    fn report(similar: Vec<EntryCount>, is_unique: bool) -> AnswerReport {
        AnswerReport {
            clue: ClueDetail {
                id: 9,
                clue_text: "Fish & chips <side>".into(),
                theme: false,
                entry_text: "SLAW".into(),
                puzzle: Puzzle {
                    id: 1,
                    title: Some("Friday".into()),
                    date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
                    byline: "C. Maker".into(),
                    publisher: "wsj".into(),
                },
            },
            similar_clues: similar,
            is_unique,
            correct_answers: 1,
            total_drills: 2,
            message: "SLAW is the correct answer! You have now answered 1 (of 2) clues correctly."
                .into(),
        }
    }

    #[test]
    fn escape_html_escapes_markup() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom's & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom&#x27;s &amp; Jerry&#x27;s&lt;/a&gt;"
        );
    }

    #[test]
    fn drill_page_contains_form_and_error() {
        let clue = DrillPrompt {
            clue_id: 17,
            clue_text: "Sea eagle".into(),
        };
        let html = drill_page(&clue, Some("Your answer is not correct"));
        assert!(html.contains("Sea eagle"));
        assert!(html.contains("name=\"clue_id\" value=\"17\""));
        assert!(html.contains("Your answer is not correct"));
        assert!(!drill_page(&clue, None).contains("class=\"error\""));
    }

    #[test]
    fn answer_page_escapes_clue_and_lists_groups() {
        let html = answer_page(&report(
            vec![
                EntryCount {
                    entry_text: "SLAW".into(),
                    count: 2,
                },
                EntryCount {
                    entry_text: "FRIES".into(),
                    count: 1,
                },
            ],
            false,
        ));
        assert!(html.contains("Fish &amp; chips &lt;side&gt;"));
        assert!(html.contains("<li>SLAW (2)</li>"));
        assert!(html.contains("<li>FRIES (1)</li>"));
        assert!(html.contains("answered 1 (of 2)"));
        assert!(html.contains("Friday (2024-05-03) - wsj"));
    }

    #[test]
    fn answer_page_marks_unique_clue() {
        let html = answer_page(&report(
            vec![EntryCount {
                entry_text: "SLAW".into(),
                count: 1,
            }],
            true,
        ));
        assert!(html.contains("appears only once"));
        assert!(!html.contains("<ul>"));
    }
}

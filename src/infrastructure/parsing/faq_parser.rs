//! FAQ extraction
//!
//! Strategies in priority order, first non-empty result wins:
//! 1. accordion/collapsible containers
//! 2. headings phrased as questions, answered by a following sibling
//! 3. list items alternating question/answer
//! 4. loose Q/A patterns over the page text

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector, node::Node};

use super::document::{
    char_len, collapse_whitespace, compile_pattern, compile_patterns, compile_selector,
    compile_selectors, normalized_text, page_text, text_lines,
};
use super::strategy::StrategyChain;
use crate::domain::Faq;
use crate::infrastructure::config::defaults::MAX_FAQS;

const QUESTION_WORDS: &[&str] = &[
    "what", "when", "where", "who", "why", "how", "can", "could", "would", "should", "will", "do",
    "does", "did", "is", "are", "was", "were",
];

/// Answers must be longer than this in the structural strategies
const MIN_ANSWER_CHARS: usize = 10;
/// Loose text strategy thresholds
const MIN_LOOSE_QUESTION_CHARS: usize = 10;
const MIN_LOOSE_ANSWER_CHARS: usize = 20;
/// Following siblings inspected for a heading's answer
const HEADING_ANSWER_WINDOW: usize = 5;

static ACCORDION_CONTAINERS: Lazy<Option<Selector>> = Lazy::new(|| {
    compile_selector(
        r#"[class*="accordion"], [class*="faq"], [class*="collapse"], [data-toggle="collapse"], [aria-expanded]"#,
    )
});

static QUESTION_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&[
        r#"[class*="question"]"#,
        r#"[class*="title"]"#,
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "strong",
        "b",
    ])
});

static ANSWER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&[
        r#"[class*="answer"]"#,
        r#"[class*="content"]"#,
        r#"[class*="body"]"#,
        "p",
        "div",
    ])
});

static HEADINGS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("h1, h2, h3, h4, h5, h6"));
static LISTS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("ul, ol, dl"));
static LIST_ITEMS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("li, dt, dd"));

static LOOSE_QA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        // "Q: ..." line followed by an "A: ..." line
        r"(?im)^[ \t]*Q(?:uestion)?[ \t]*[:.)\-][ \t]*(.+)\n[ \t]*A(?:nswer)?[ \t]*[:.)\-][ \t]*(.+)$",
        // a line ending in '?' followed by a plain line
        r"(?m)^([^\n]+\?)[ \t]*\n([^\n?]+)$",
    ])
});

static QA_MARKER: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern(r"(?i)^(?:Q(?:uestion)?|A(?:nswer)?)\s*[:.)\-]\s*"));

fn strip_marker(text: &str) -> String {
    let text = collapse_whitespace(text);
    match QA_MARKER.as_ref() {
        Some(marker) => marker.replace(&text, "").into_owned(),
        None => text,
    }
}

/// True when text reads as a question
pub fn is_question(text: &str) -> bool {
    let text = text.trim();
    if text.contains('?') {
        return true;
    }
    let lower = text.to_lowercase();
    QUESTION_WORDS.iter().any(|word| {
        lower
            .strip_prefix(word)
            .is_some_and(|rest| rest.starts_with(' '))
    })
}

fn faq_chain() -> StrategyChain<Vec<Faq>> {
    StrategyChain::new("faq")
        .then("accordion", accordion_strategy)
        .then("heading", heading_strategy)
        .then("list_alternation", list_strategy)
        .then("loose_text", loose_text_strategy)
}

/// FAQs from one page, capped
pub fn extract_faqs(html: &str) -> Vec<Faq> {
    let document = Html::parse_document(html);
    extract_faqs_from_document(&document)
}

pub fn extract_faqs_from_document(document: &Html) -> Vec<Faq> {
    let mut faqs = faq_chain().run(document);
    faqs.truncate(MAX_FAQS);
    faqs
}

fn push_unique(faqs: &mut Vec<Faq>, faq: Faq) {
    if !faqs.contains(&faq) {
        faqs.push(faq);
    }
}

fn accordion_strategy(document: &Html) -> Vec<Faq> {
    let mut faqs = Vec::new();
    let Some(containers) = ACCORDION_CONTAINERS.as_ref() else {
        return faqs;
    };
    for container in document.select(containers) {
        if let Some(faq) = faq_from_container(container) {
            push_unique(&mut faqs, faq);
        }
    }
    faqs
}

fn faq_from_container(container: ElementRef<'_>) -> Option<Faq> {
    let lines = text_lines(container);

    let question = QUESTION_SELECTORS
        .iter()
        .filter_map(|selector| container.select(selector).next())
        .map(normalized_text)
        .find(|text| is_question(text))
        .or_else(|| lines.iter().find(|line| is_question(line)).cloned())?;

    let answer = ANSWER_SELECTORS
        .iter()
        .filter_map(|selector| container.select(selector).next())
        .map(normalized_text)
        .find(|text| char_len(text) > MIN_ANSWER_CHARS && *text != question)
        .or_else(|| {
            lines
                .iter()
                .find(|line| !is_question(line) && char_len(line) > MIN_ANSWER_CHARS)
                .cloned()
        })?;

    Some(Faq::new(question, answer))
}

fn heading_strategy(document: &Html) -> Vec<Faq> {
    let mut faqs = Vec::new();
    let Some(headings) = HEADINGS.as_ref() else {
        return faqs;
    };
    for heading in document.select(headings) {
        let question = normalized_text(heading);
        if !is_question(&question) {
            continue;
        }
        let answer = heading
            .next_siblings()
            .take(HEADING_ANSWER_WINDOW)
            .filter_map(|sibling| match sibling.value() {
                Node::Text(text) => Some(collapse_whitespace(text)),
                Node::Element(_) => ElementRef::wrap(sibling).map(normalized_text),
                _ => None,
            })
            .find(|text| char_len(text) > MIN_ANSWER_CHARS);
        if let Some(answer) = answer {
            push_unique(&mut faqs, Faq::new(question, answer));
        }
    }
    faqs
}

fn list_strategy(document: &Html) -> Vec<Faq> {
    let mut faqs = Vec::new();
    let (Some(lists), Some(items)) = (LISTS.as_ref(), LIST_ITEMS.as_ref()) else {
        return faqs;
    };
    for list in document.select(lists) {
        let texts: Vec<String> = list.select(items).map(normalized_text).collect();
        for pair in texts.chunks_exact(2) {
            let (question, answer) = (&pair[0], &pair[1]);
            if is_question(question) && char_len(answer) > MIN_ANSWER_CHARS {
                push_unique(&mut faqs, Faq::new(question.clone(), answer.clone()));
            }
        }
    }
    faqs
}

fn loose_text_strategy(document: &Html) -> Vec<Faq> {
    let text = page_text(document);
    let mut faqs = Vec::new();
    for pattern in LOOSE_QA_PATTERNS.iter() {
        for captures in pattern.captures_iter(&text) {
            let (Some(question), Some(answer)) = (captures.get(1), captures.get(2)) else {
                continue;
            };
            let question = strip_marker(question.as_str());
            let answer = strip_marker(answer.as_str());
            if char_len(&question) > MIN_LOOSE_QUESTION_CHARS
                && char_len(&answer) > MIN_LOOSE_ANSWER_CHARS
            {
                push_unique(&mut faqs, Faq::new(question, answer));
            }
        }
    }
    faqs
}

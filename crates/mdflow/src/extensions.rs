//! Text rewrites applied to the event stream before it reaches the AST builder.
//!
//! - emoji: `:shortcode:` names and free-standing smileys (`:)`, `<3`) become emoji.
//! - autolinks: bare `http(s)://` URLs in text become links.
//!
//! Text inside code blocks and front matter is left alone. URLs inside existing links and
//! images are not linked again.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::iter::Peekable;

use linkify::LinkFinder;
use linkify::LinkKind;
use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::LinkType;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;

/// Smileys and the shortcode each one stands for.
const SMILEYS: &[(&str, &str)] = &[
    (":-)", "slightly_smiling_face"),
    (":)", "slightly_smiling_face"),
    (":-(", "slightly_frowning_face"),
    (":(", "slightly_frowning_face"),
    (":-D", "smiley"),
    (":D", "smiley"),
    (";-)", "wink"),
    (";)", "wink"),
    (":-P", "stuck_out_tongue"),
    (":P", "stuck_out_tongue"),
    (":-O", "open_mouth"),
    (":O", "open_mouth"),
    (":'(", "cry"),
    ("</3", "broken_heart"),
    ("<3", "heart"),
];

/// Replaces `:shortcode:` names and smileys with emoji.
///
/// Shortcodes match anywhere. Smileys only match as separate words: after whitespace (or
/// at the start) and before whitespace, `.`, `,`, `!`, `?` (or at the end).
pub fn replace_emoji(text: &str) -> Cow<'_, str> {
    if !text.contains([':', ';', '<']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    let mut prev: Option<char> = None;
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        if let Some((len, emoji)) = emoji_at(rest, prev) {
            out.push_str(emoji);
            prev = rest[..len].chars().last();
            rest = &rest[len..];
            changed = true;
            continue;
        }
        out.push(ch);
        prev = Some(ch);
        rest = &rest[ch.len_utf8()..];
    }
    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

fn emoji_at(rest: &str, prev: Option<char>) -> Option<(usize, &'static str)> {
    if let Some(name) = shortcode_at(rest)
        && let Some(emoji) = emojis::get_by_shortcode(name)
    {
        return Some((name.len() + 2, emoji.as_str()));
    }
    if prev.is_some_and(|c| !c.is_whitespace()) {
        return None;
    }
    SMILEYS.iter().find_map(|(smiley, name)| {
        let tail = rest.strip_prefix(smiley)?;
        let ends_word = tail
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?'));
        if !ends_word {
            return None;
        }
        emojis::get_by_shortcode(name).map(|e| (smiley.len(), e.as_str()))
    })
}

fn shortcode_at(rest: &str) -> Option<&str> {
    let body = rest.strip_prefix(':')?;
    let name = &body[..body.find(':')?];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'));
    valid.then_some(name)
}

/// Iterator adapter applying the enabled rewrites to `Event::Text`.
///
/// Adjacent text events are joined first so a URL or shortcode split by the parser is
/// still seen whole.
pub struct TextExtensions<'a, I: Iterator<Item = Event<'a>>> {
    inner: Peekable<I>,
    emoji: bool,
    autolinks: bool,
    finder: LinkFinder,
    pending: VecDeque<Event<'a>>,
    verbatim: usize,
    links: usize,
}

impl<'a, I: Iterator<Item = Event<'a>>> TextExtensions<'a, I> {
    pub fn new(inner: I, emoji: bool, autolinks: bool) -> Self {
        let mut finder = LinkFinder::new();
        finder.kinds(&[LinkKind::Url]);
        Self {
            inner: inner.peekable(),
            emoji,
            autolinks,
            finder,
            pending: VecDeque::new(),
            verbatim: 0,
            links: 0,
        }
    }

    fn track(&mut self, event: &Event<'a>) {
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::MetadataBlock(_)) => self.verbatim += 1,
            Event::End(TagEnd::CodeBlock | TagEnd::MetadataBlock(_)) => {
                self.verbatim = self.verbatim.saturating_sub(1)
            }
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => self.links += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => self.links = self.links.saturating_sub(1),
            _ => {}
        }
    }

    fn coalesce(&mut self, first: CowStr<'a>) -> CowStr<'a> {
        if !matches!(self.inner.peek(), Some(Event::Text(_))) {
            return first;
        }
        let mut buf = first.into_string();
        while let Some(Event::Text(next)) = self.inner.next_if(|e| matches!(e, Event::Text(_))) {
            buf.push_str(&next);
        }
        buf.into()
    }

    fn rewrite(&mut self, text: CowStr<'a>) {
        if self.verbatim > 0 {
            self.pending.push_back(Event::Text(text));
            return;
        }
        if !self.autolinks || self.links > 0 {
            self.push_text(text);
            return;
        }
        let pieces: Vec<(String, bool)> = self
            .finder
            .spans(&text)
            .map(|span| (span.as_str().to_string(), span.kind().is_some()))
            .collect();
        if !pieces.iter().any(|(_, is_link)| *is_link) {
            self.push_text(text);
            return;
        }
        for (piece, is_link) in pieces {
            if !is_link {
                self.push_text(piece.into());
                continue;
            }
            self.pending.push_back(Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url: piece.clone().into(),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            }));
            self.pending.push_back(Event::Text(piece.into()));
            self.pending.push_back(Event::End(TagEnd::Link));
        }
    }

    fn push_text(&mut self, text: CowStr<'a>) {
        let replaced = match self.emoji.then(|| replace_emoji(&text)) {
            Some(Cow::Owned(s)) => Some(s),
            _ => None,
        };
        let text = replaced.map(CowStr::from).unwrap_or(text);
        self.pending.push_back(Event::Text(text));
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for TextExtensions<'a, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            match self.inner.next()? {
                Event::Text(text) if self.emoji || self.autolinks => {
                    let text = self.coalesce(text);
                    self.rewrite(text);
                }
                event => {
                    self.track(&event);
                    return Some(event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::Options;
    use pulldown_cmark::Parser;

    fn events(md: &str, emoji: bool, autolinks: bool) -> Vec<Event<'_>> {
        TextExtensions::new(Parser::new_ext(md, Options::empty()), emoji, autolinks).collect()
    }

    fn texts(events: &[Event<'_>]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Text(t) => Some(t.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn shortcodes_and_smileys_become_emoji() {
        assert_eq!(replace_emoji(":smile: hi :)"), "😄 hi 🙂");
        let heart = emojis::get_by_shortcode("heart").map(|e| e.as_str()).unwrap_or_default();
        assert_eq!(replace_emoji("<3 ;)."), format!("{heart} 😉."));
        assert_eq!(replace_emoji(":rocket::rocket:"), "🚀🚀");
    }

    #[test]
    fn smileys_need_word_boundaries() {
        assert!(matches!(replace_emoji("f(x:)"), Cow::Borrowed(_)));
        assert!(matches!(replace_emoji(":)x"), Cow::Borrowed(_)));
        assert!(matches!(replace_emoji("at 10:30:45"), Cow::Borrowed(_)));
        assert!(matches!(replace_emoji(":not_a_real_emoji:"), Cow::Borrowed(_)));
    }

    #[test]
    fn bare_urls_become_autolinks() {
        let evs = events("see https://example.com/a.", false, true);
        let dest = evs.iter().find_map(|e| match e {
            Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url,
                ..
            }) => Some(dest_url.to_string()),
            _ => None,
        });
        assert_eq!(dest.as_deref(), Some("https://example.com/a"));
        assert_eq!(texts(&evs), vec!["see ", "https://example.com/a", "."]);
    }

    #[test]
    fn existing_links_and_code_are_left_alone() {
        let evs = events("[https://a.io](https://a.io) `:smile:`\n\n```\n:smile: https://b.io\n```\n", true, true);
        let links = evs
            .iter()
            .filter(|e| matches!(e, Event::Start(Tag::Link { .. })))
            .count();
        assert_eq!(links, 1);
        assert!(texts(&evs).contains(&":smile: https://b.io\n".to_string()));
        assert!(evs.iter().any(|e| matches!(e, Event::Code(c) if c.as_ref() == ":smile:")));
    }

    #[test]
    fn disabled_rewrites_pass_text_through() {
        let evs = events(":smile: https://example.com", false, false);
        assert_eq!(texts(&evs), vec![":smile: https://example.com"]);
    }
}

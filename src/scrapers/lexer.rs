//! Tag/text event stream over raw, possibly broken, HTML

use lol_html::html_content::TextType;
use lol_html::{doc_text, element, HtmlRewriter, Settings};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::log::log_error;

/// One lexical event, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlEvent {
    Open {
        name: String,
        attrs: HashMap<String, String>,
    },
    Text(String),
    Close(String),
}

/// Events gathered by the rewriter handlers. Text arrives in chunks and is
/// joined until the tokenizer marks the end of the text node.
#[derive(Default)]
struct EventBuffer {
    events: Vec<HtmlEvent>,
    text: String,
}

impl EventBuffer {
    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let decoded = html_escape::decode_html_entities(&self.text).into_owned();
        self.text.clear();
        self.events.push(HtmlEvent::Text(decoded));
    }
}

/// Split `html` into open/text/close events.
///
/// Tokenization is HTML5 (lol_html), without tree construction: close events
/// appear only for end tags actually present, comments are dropped and
/// script/style bodies yield no text. Never fails; a tokenizer error ends
/// the stream early.
pub fn lex(html: &str) -> Vec<HtmlEvent> {
    let buffer = Rc::new(RefCell::new(EventBuffer::default()));
    let on_element = Rc::clone(&buffer);
    let on_text = Rc::clone(&buffer);

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("*", move |el| {
                let name = el.tag_name().to_ascii_lowercase();
                let attrs = el
                    .attributes()
                    .iter()
                    .map(|a| {
                        let value = html_escape::decode_html_entities(&a.value()).into_owned();
                        (a.name().to_ascii_lowercase(), value)
                    })
                    .collect();

                let mut buf = on_element.borrow_mut();
                buf.flush_text();
                buf.events.push(HtmlEvent::Open {
                    name: name.clone(),
                    attrs,
                });

                match el.end_tag_handlers() {
                    Some(handlers) => {
                        let on_close = Rc::clone(&on_element);
                        handlers.push(Box::new(move |_end: &mut lol_html::html_content::EndTag<'_>| {
                            let mut buf = on_close.borrow_mut();
                            buf.flush_text();
                            buf.events.push(HtmlEvent::Close(name));
                            Ok(())
                        }) as _);
                    }
                    // void element, no end tag will follow
                    None => buf.events.push(HtmlEvent::Close(name)),
                }
                Ok(())
            })],
            document_content_handlers: vec![doc_text!(move |chunk| {
                if matches!(chunk.text_type(), TextType::ScriptData | TextType::RawText) {
                    return Ok(());
                }
                let mut buf = on_text.borrow_mut();
                buf.text.push_str(chunk.as_str());
                if chunk.last_in_text_node() {
                    buf.flush_text();
                }
                Ok(())
            })],
            ..Settings::default()
        },
        |_: &[u8]| {},
    );

    let written = rewriter.write(html.as_bytes()).and_then(|_| rewriter.end());
    if let Err(e) = written {
        log_error("lexer", &format!("HTML tokenizer stopped early: {}", e));
    }

    let mut buf = buffer.borrow_mut();
    buf.flush_text();
    std::mem::take(&mut buf.events)
}

#[cfg(test)]
pub(crate) fn open(name: &str, attrs: &[(&str, &str)]) -> HtmlEvent {
    HtmlEvent::Open {
        name: name.to_string(),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

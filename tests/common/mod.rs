#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use proofread::llm::{Completer, LlmError};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

type Responder = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

/// Answers prompts with a closure and records every prompt it saw.
pub struct ScriptedCompleter {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompleter {
    pub fn new(f: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(f),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn edit_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| is_edit_prompt(p))
            .collect()
    }
}

impl Completer for ScriptedCompleter {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }
}

pub fn is_edit_prompt(prompt: &str) -> bool {
    prompt.contains("corrections that need to be applied")
}

/// Proofreader stand-in: flags "Teh", passes everything else, rewrites by fixing "Teh".
pub fn typo_model() -> ScriptedCompleter {
    ScriptedCompleter::new(|prompt| {
        if is_edit_prompt(prompt) {
            let text = prompt
                .split("Text:\n")
                .nth(1)
                .and_then(|rest| rest.split("\n\nPlease return").next())
                .unwrap_or_default();
            Ok(text.replace("Teh", "The"))
        } else if prompt.contains("Teh") {
            Ok("- \"Teh\" is a typo for \"The\"".to_string())
        } else {
            Ok("NO ISSUES".to_string())
        }
    })
}

/// Writes a PDF with one Helvetica text line per page.
pub fn write_pdf(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
    let contents: Vec<Content> = pages.iter().map(|t| text_page(t)).collect();
    write_pdf_contents(dir, name, contents)
}

/// Page 1 holds `text`; page 2 selects its font with a non-name operand, so
/// text extraction fails on it.
pub fn write_pdf_with_unreadable_page(dir: &Path, name: &str, text: &str) -> PathBuf {
    let broken = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Integer(1), Object::Integer(12)]),
            Operation::new(
                "Tj",
                vec![Object::String(b"lost".to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    write_pdf_contents(dir, name, vec![text_page(text), broken])
}

fn text_page(text: &str) -> Content {
    Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
            Operation::new(
                "Tj",
                vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
    }
}

fn write_pdf_contents(dir: &Path, name: &str, contents: Vec<Content>) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]));

    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(count)),
            ("Kids", Object::Array(kids)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

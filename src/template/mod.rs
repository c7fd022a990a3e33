//! The templating codec: `extract` turns a rendered document into a
//! [`Template`], `generate` renders a template plus data back into a document.

pub mod apportion;
pub mod error;
pub mod fields;
pub mod layout;
pub mod model;
pub mod placeholder;
pub mod render;
pub mod resolve;
pub mod validate;

pub use apportion::{PageTextSource, TextSourceKind};
pub use error::TemplateError;
pub use model::{
    DEFAULT_FONT_KEY, ElementKind, FontWeight, MissingFieldPolicy, Template, TemplateColor,
    TemplateDefaults, TemplateElement, TemplateField, TemplateFont, TemplateMetadata,
    TemplatePage, TemplateVersion,
};
pub use resolve::{DataMap, resolve};
pub use validate::{validate, validate_value};

use crate::engine::{DocumentEngine, EngineError, SourceDocument};
use chrono::Utc;
use fields::FieldAggregator;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub text_source: TextSourceKind,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub template: Template,
    /// Fail-soft notes, e.g. text that could not be extracted.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Overrides the template's `missingFieldBehavior` default.
    pub missing_field_behavior: Option<MissingFieldPolicy>,
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Placeholder names that had no data value and were resolved by policy.
    pub unresolved_fields: Vec<String>,
}

/// Derives a template from document bytes.
///
/// Fails only when the engine cannot read the document. Missing text never
/// fails extraction; affected pages simply have no elements.
#[instrument(skip_all, fields(bytes = bytes.len(), text_source = options.text_source.as_str()))]
pub fn extract(
    engine: &dyn DocumentEngine,
    bytes: &[u8],
    options: &ExtractOptions,
) -> Result<Extraction, TemplateError> {
    let document = engine.load(bytes)?;
    extract_from(document.as_ref(), options.text_source.strategy(), options)
}

/// Builds a template from an already loaded document with an explicit text
/// source.
pub fn extract_from(
    document: &dyn SourceDocument,
    text_source: &dyn PageTextSource,
    options: &ExtractOptions,
) -> Result<Extraction, TemplateError> {
    let sizes = document.page_sizes();
    if sizes.is_empty() {
        return Err(EngineError::NoPages.into());
    }

    let page_texts = text_source.page_texts(document);
    let mut aggregator = FieldAggregator::new();
    let mut pages = Vec::with_capacity(sizes.len());

    for (index, size) in sizes.iter().enumerate() {
        let page_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let text = page_texts.texts.get(index).map_or("", String::as_str);
        let lines = layout::layout_lines(text, size.height);
        for line in &lines {
            aggregator.scan_line(page_number, &line.text);
        }
        let elements: Vec<TemplateElement> = lines.iter().map(placeholder::recognize).collect();
        debug!(page = page_number, elements = elements.len(), "extracted page");
        pages.push(TemplatePage {
            width: size.width,
            height: size.height,
            elements,
        });
    }

    let fields = aggregator.finish();
    info!(pages = pages.len(), fields = fields.len(), "template extracted");

    let template = Template {
        version: TemplateVersion::CURRENT,
        metadata: TemplateMetadata {
            name: options.name.clone(),
            description: options.description.clone(),
            created_at: Utc::now(),
            source_page_count: u32::try_from(pages.len()).unwrap_or(u32::MAX),
        },
        pages,
        fields,
        fonts: BTreeMap::from([(DEFAULT_FONT_KEY.to_string(), TemplateFont::default())]),
        defaults: None,
    };

    Ok(Extraction {
        template,
        warnings: page_texts.warnings,
    })
}

/// Renders a new document from `template` and `data`.
///
/// The template is validated first and is never modified. Unknown or missing
/// placeholders are resolved by policy, never rejected.
#[instrument(skip_all, fields(pages = template.pages.len()))]
pub fn generate(
    engine: &dyn DocumentEngine,
    template: &Template,
    data: &DataMap,
    options: &GenerateOptions,
) -> Result<Generation, TemplateError> {
    validate(template)?;

    let policy = render::effective_policy(options.missing_field_behavior, template.defaults.as_ref());
    let plan = render::render(template, data, policy);
    let bytes = engine.build(&plan.pages)?;
    info!(
        pages = plan.pages.len(),
        bytes = bytes.len(),
        policy = policy.as_str(),
        unresolved = plan.unresolved.len(),
        "document generated"
    );

    Ok(Generation {
        bytes,
        page_count: plan.pages.len(),
        unresolved_fields: plan.unresolved.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PageDraw, PageSize};
    use std::sync::Mutex;

    struct FakeDocument {
        sizes: Vec<PageSize>,
        text: Result<String, String>,
    }

    impl SourceDocument for FakeDocument {
        fn page_sizes(&self) -> &[PageSize] {
            &self.sizes
        }

        fn full_text(&self) -> Result<String, EngineError> {
            self.text.clone().map_err(EngineError::Text)
        }

        fn page_text(&self, index: usize) -> Result<String, EngineError> {
            Err(EngineError::PageOutOfRange(index))
        }
    }

    /// Loads any bytes as a fixed document and records what it is asked to build.
    struct FakeEngine {
        sizes: Vec<PageSize>,
        text: Result<String, String>,
        built: Mutex<Vec<PageDraw>>,
    }

    impl FakeEngine {
        fn new(pages: usize, text: Result<&str, &str>) -> Self {
            Self {
                sizes: vec![
                    PageSize {
                        width: 612.0,
                        height: 792.0
                    };
                    pages
                ],
                text: text.map(str::to_string).map_err(str::to_string),
                built: Mutex::new(Vec::new()),
            }
        }
    }

    impl DocumentEngine for FakeEngine {
        fn load(&self, bytes: &[u8]) -> Result<Box<dyn SourceDocument>, EngineError> {
            if bytes.is_empty() {
                return Err(EngineError::Load("empty input".to_string()));
            }
            Ok(Box::new(FakeDocument {
                sizes: self.sizes.clone(),
                text: self.text.clone(),
            }))
        }

        fn build(&self, pages: &[PageDraw]) -> Result<Vec<u8>, EngineError> {
            let mut built = self.built.lock().expect("lock");
            built.clear();
            built.extend_from_slice(pages);
            Ok(format!("{} pages", pages.len()).into_bytes())
        }
    }

    fn field_pages(template: &Template) -> Vec<(&str, Vec<u32>)> {
        template
            .fields
            .iter()
            .map(|field| (field.name.as_str(), field.pages.clone()))
            .collect()
    }

    #[test]
    fn aggregates_fields_across_pages() {
        // 19 chars + newline per line, so each page gets exactly one line.
        let engine = FakeEngine::new(2, Ok("Name: {{firstName}}\nMail: {{emailAddr}}\n"));
        let extraction = extract(&engine, b"pdf", &ExtractOptions::default()).expect("extract");
        let template = extraction.template;
        assert_eq!(
            field_pages(&template),
            vec![("firstName", vec![1]), ("emailAddr", vec![2])]
        );
        assert_eq!(template.pages[0].elements[0].content, "Name: {{firstName}}");
        assert_eq!(template.pages[1].elements[0].content, "Mail: {{emailAddr}}");
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn whole_line_and_embedded_tokens() {
        let engine = FakeEngine::new(1, Ok("{{name}}\nHello {{name}}, welcome\nPlain"));
        let template = extract(&engine, b"pdf", &ExtractOptions::default())
            .expect("extract")
            .template;
        let elements = &template.pages[0].elements;
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].field_name.as_deref(), Some("name"));
        assert_eq!(elements[1].kind, ElementKind::Placeholder);
        assert_eq!(elements[1].field_name, None);
        assert_eq!(elements[2].kind, ElementKind::Text);
        assert_eq!(field_pages(&template), vec![("name", vec![1])]);
        assert_eq!((elements[0].x, elements[0].y), (40.0, 752.0));
        assert_eq!(elements[2].y, 724.0);
    }

    #[test]
    fn text_failure_still_yields_template() {
        let engine = FakeEngine::new(3, Err("no text layer"));
        let options = ExtractOptions {
            name: Some("Scan".to_string()),
            ..ExtractOptions::default()
        };
        let extraction = extract(&engine, b"pdf", &options).expect("extract");
        let template = &extraction.template;
        assert_eq!(template.pages.len(), 3);
        assert!(template.pages.iter().all(|page| page.elements.is_empty()));
        assert!(template.fields.is_empty());
        assert_eq!(template.metadata.source_page_count, 3);
        assert_eq!(template.metadata.name.as_deref(), Some("Scan"));
        assert_eq!(extraction.warnings.len(), 1);
        assert!(validate(template).is_ok());
    }

    #[test]
    fn unreadable_document_is_an_error() {
        let engine = FakeEngine::new(1, Ok("text"));
        let err = extract(&engine, b"", &ExtractOptions::default()).expect_err("error");
        assert!(matches!(err, TemplateError::Engine(EngineError::Load(_))));
    }

    #[test]
    fn extracted_template_has_default_font_entry() {
        let engine = FakeEngine::new(1, Ok(""));
        let template = extract(&engine, b"pdf", &ExtractOptions::default())
            .expect("extract")
            .template;
        assert_eq!(template.fonts.get(DEFAULT_FONT_KEY), Some(&TemplateFont::default()));
        assert_eq!(template.version, TemplateVersion::V1);
    }

    #[test]
    fn extracted_template_survives_json_round_trip() {
        let engine = FakeEngine::new(1, Ok("Dear {{who}}"));
        let template = extract(&engine, b"pdf", &ExtractOptions::default())
            .expect("extract")
            .template;
        let value = template.to_json().expect("json");
        let parsed = Template::from_json(&value).expect("parse");
        assert_eq!(parsed, template);
    }

    #[test]
    fn generate_builds_every_page_with_resolved_text() {
        let engine = FakeEngine::new(2, Ok("Hi {{name}}\nAt {{city}}\n"));
        let template = extract(&engine, b"pdf", &ExtractOptions::default())
            .expect("extract")
            .template;
        let data = DataMap::from([("name".to_string(), "Ada".to_string())]);

        let generation =
            generate(&engine, &template, &data, &GenerateOptions::default()).expect("generate");
        assert_eq!(generation.page_count, 2);
        assert_eq!(generation.bytes, b"2 pages");
        assert_eq!(generation.unresolved_fields, vec!["city"]);

        let built = engine.built.lock().expect("lock");
        assert_eq!(built.len(), template.pages.len());
        assert_eq!(built[0].commands[0].text, "Hi Ada");
        assert_eq!(built[1].commands[0].text, "At {{city}}");
    }

    #[test]
    fn generate_honours_policy_override() {
        let engine = FakeEngine::new(1, Ok("[{{gone}}]"));
        let template = extract(&engine, b"pdf", &ExtractOptions::default())
            .expect("extract")
            .template;
        let options = GenerateOptions {
            missing_field_behavior: Some(MissingFieldPolicy::EmptyString),
        };
        generate(&engine, &template, &DataMap::new(), &options).expect("generate");
        let built = engine.built.lock().expect("lock");
        assert_eq!(built[0].commands[0].text, "[]");
    }

    #[test]
    fn generate_rejects_invalid_template_before_building() {
        let engine = FakeEngine::new(1, Ok("x"));
        let mut template = extract(&engine, b"pdf", &ExtractOptions::default())
            .expect("extract")
            .template;
        template.pages.clear();
        let err = generate(&engine, &template, &DataMap::new(), &GenerateOptions::default())
            .expect_err("error");
        assert!(matches!(err, TemplateError::NoPages));
        assert!(engine.built.lock().expect("lock").is_empty());
    }

    #[test]
    fn generate_does_not_modify_template() {
        let engine = FakeEngine::new(1, Ok("{{a}}"));
        let template = extract(&engine, b"pdf", &ExtractOptions::default())
            .expect("extract")
            .template;
        let before = template.clone();
        generate(&engine, &template, &DataMap::new(), &GenerateOptions::default())
            .expect("generate");
        assert_eq!(template, before);
    }
}

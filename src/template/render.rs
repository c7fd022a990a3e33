use super::model::{
    ElementKind, MissingFieldPolicy, Template, TemplateColor, TemplateDefaults, TemplateElement,
    TemplateFont,
};
use super::resolve::{DataMap, resolve_tracked};
use crate::engine::{DrawText, FontFace, PageDraw, PageSize, Rgb};
use std::collections::BTreeSet;

/// Draw instructions for every page, plus the placeholder names that had no
/// data value.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub pages: Vec<PageDraw>,
    pub unresolved: BTreeSet<String>,
}

/// Three-level lookup: the element's own value, else the template default,
/// else `fallback`.
pub fn cascade<T: Clone>(own: Option<&T>, template_default: Option<&T>, fallback: T) -> T {
    own.or(template_default).cloned().unwrap_or(fallback)
}

pub fn effective_font(element: &TemplateElement, defaults: Option<&TemplateDefaults>) -> TemplateFont {
    cascade(
        element.font.as_ref(),
        defaults.and_then(|defaults| defaults.font.as_ref()),
        TemplateFont::default(),
    )
}

pub fn effective_color(
    element: &TemplateElement,
    defaults: Option<&TemplateDefaults>,
) -> TemplateColor {
    cascade(
        element.color.as_ref(),
        defaults.and_then(|defaults| defaults.color.as_ref()),
        TemplateColor::default(),
    )
}

/// The caller's policy, else the template default, else `LeavePlaceholder`.
pub fn effective_policy(
    requested: Option<MissingFieldPolicy>,
    defaults: Option<&TemplateDefaults>,
) -> MissingFieldPolicy {
    cascade(
        requested.as_ref(),
        defaults.and_then(|defaults| defaults.missing_field_behavior.as_ref()),
        MissingFieldPolicy::default(),
    )
}

/// Turns a template into draw instructions. Elements are emitted in order at
/// their own coordinates; nothing is wrapped, clipped or moved.
pub fn render(template: &Template, data: &DataMap, policy: MissingFieldPolicy) -> RenderPlan {
    let defaults = template.defaults.as_ref();
    let mut unresolved = BTreeSet::new();

    let pages = template
        .pages
        .iter()
        .map(|page| PageDraw {
            size: PageSize {
                width: page.width,
                height: page.height,
            },
            commands: page
                .elements
                .iter()
                .map(|element| {
                    let font = effective_font(element, defaults);
                    let color = effective_color(element, defaults);
                    let text = match element.kind {
                        ElementKind::Placeholder => resolve_tracked(
                            &element.content,
                            data,
                            policy,
                            &template.fields,
                            &mut unresolved,
                        ),
                        ElementKind::Text => element.content.clone(),
                    };
                    DrawText {
                        x: element.x,
                        y: element.y,
                        size: font.size,
                        face: if font.is_bold() {
                            FontFace::Bold
                        } else {
                            FontFace::Regular
                        },
                        color: Rgb {
                            r: color.r,
                            g: color.g,
                            b: color.b,
                        },
                        text,
                    }
                })
                .collect(),
        })
        .collect();

    RenderPlan { pages, unresolved }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::model::{
        FontWeight, TemplateField, TemplateMetadata, TemplatePage, TemplateVersion,
    };
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn element(kind: ElementKind, content: &str) -> TemplateElement {
        TemplateElement {
            kind,
            content: content.to_string(),
            field_name: None,
            x: 40.0,
            y: 700.0,
            font: None,
            color: None,
        }
    }

    fn template(elements: Vec<TemplateElement>, defaults: Option<TemplateDefaults>) -> Template {
        Template {
            version: TemplateVersion::V1,
            metadata: TemplateMetadata {
                name: None,
                description: None,
                created_at: Utc::now(),
                source_page_count: 1,
            },
            pages: vec![
                TemplatePage {
                    width: 612.0,
                    height: 792.0,
                    elements,
                },
                TemplatePage {
                    width: 300.0,
                    height: 200.0,
                    elements: Vec::new(),
                },
            ],
            fields: vec![TemplateField {
                name: "name".to_string(),
                default_value: "friend".to_string(),
                pages: vec![1],
            }],
            fonts: BTreeMap::new(),
            defaults,
        }
    }

    fn bold(size: f64) -> TemplateFont {
        TemplateFont {
            name: "Helvetica".to_string(),
            size,
            weight: Some(FontWeight::Bold),
        }
    }

    #[test]
    fn cascade_prefers_element_then_default_then_fallback() {
        assert_eq!(cascade(Some(&1), Some(&2), 3), 1);
        assert_eq!(cascade(None, Some(&2), 3), 2);
        assert_eq!(cascade::<i32>(None, None, 3), 3);
    }

    #[test]
    fn font_falls_back_to_helvetica_12() {
        let plain = element(ElementKind::Text, "a");
        assert_eq!(effective_font(&plain, None), TemplateFont::default());

        let defaults = TemplateDefaults {
            font: Some(bold(9.0)),
            ..TemplateDefaults::default()
        };
        assert_eq!(effective_font(&plain, Some(&defaults)).size, 9.0);

        let mut own = element(ElementKind::Text, "a");
        own.font = Some(bold(20.0));
        assert_eq!(effective_font(&own, Some(&defaults)).size, 20.0);
    }

    #[test]
    fn policy_prefers_caller_then_template() {
        let defaults = TemplateDefaults {
            missing_field_behavior: Some(MissingFieldPolicy::UseDefault),
            ..TemplateDefaults::default()
        };
        assert_eq!(
            effective_policy(Some(MissingFieldPolicy::EmptyString), Some(&defaults)),
            MissingFieldPolicy::EmptyString
        );
        assert_eq!(effective_policy(None, Some(&defaults)), MissingFieldPolicy::UseDefault);
        assert_eq!(effective_policy(None, None), MissingFieldPolicy::LeavePlaceholder);
    }

    #[test]
    fn renders_one_page_per_template_page() {
        let plan = render(&template(Vec::new(), None), &DataMap::new(), MissingFieldPolicy::default());
        assert_eq!(plan.pages.len(), 2);
        assert_eq!(plan.pages[1].size, PageSize { width: 300.0, height: 200.0 });
    }

    #[test]
    fn resolves_only_placeholder_elements() {
        let elements = vec![
            element(ElementKind::Placeholder, "Hi {{name}}"),
            element(ElementKind::Text, "Literal {{name}}"),
        ];
        let plan = render(
            &template(elements, None),
            &DataMap::new(),
            MissingFieldPolicy::UseDefault,
        );
        let texts: Vec<&str> = plan.pages[0]
            .commands
            .iter()
            .map(|command| command.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Hi friend", "Literal {{name}}"]);
        assert!(plan.unresolved.contains("name"));
    }

    #[test]
    fn applies_face_size_and_color() {
        let mut styled = element(ElementKind::Text, "Title");
        styled.font = Some(bold(18.0));
        styled.color = Some(TemplateColor { r: 1.0, g: 0.5, b: 0.0 });
        let defaults = TemplateDefaults {
            color: Some(TemplateColor { r: 0.0, g: 0.0, b: 1.0 }),
            ..TemplateDefaults::default()
        };
        let plain = element(ElementKind::Text, "Body");
        let plan = render(
            &template(vec![styled, plain], Some(defaults)),
            &DataMap::new(),
            MissingFieldPolicy::default(),
        );
        let commands = &plan.pages[0].commands;
        assert_eq!(commands[0].face, FontFace::Bold);
        assert_eq!(commands[0].size, 18.0);
        assert_eq!(commands[0].color, Rgb { r: 1.0, g: 0.5, b: 0.0 });
        assert_eq!(commands[1].face, FontFace::Regular);
        assert_eq!(commands[1].size, 12.0);
        assert_eq!(commands[1].color, Rgb { r: 0.0, g: 0.0, b: 1.0 });
    }

    #[test]
    fn keeps_off_page_coordinates() {
        let mut far = element(ElementKind::Text, "far");
        far.x = -50.0;
        far.y = 5000.0;
        let plan = render(&template(vec![far], None), &DataMap::new(), MissingFieldPolicy::default());
        assert_eq!((plan.pages[0].commands[0].x, plan.pages[0].commands[0].y), (-50.0, 5000.0));
    }
}

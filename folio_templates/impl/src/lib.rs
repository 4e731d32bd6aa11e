use std::sync::Arc;

use folio_di::Build;
use folio_templates_contracts::{Template, TemplateService, BASE_TEMPLATE, TEMPLATES};
use tera::Tera;

#[derive(Debug, Clone, Build)]
pub struct TemplateServiceImpl {
    #[state]
    state: State,
}

#[derive(Debug, Clone)]
struct State(Arc<Tera>);

impl State {
    fn load() -> tera::Result<Self> {
        let mut tera = Tera::default();

        // parents must be registered before the templates extending them
        let (name, template) = BASE_TEMPLATE;
        tera.add_raw_template(name, template)?;
        tera.add_raw_templates(TEMPLATES.iter().copied())?;

        Ok(Self(tera.into()))
    }
}

impl Default for State {
    fn default() -> Self {
        Self::load().expect("built-in templates are valid")
    }
}

impl TemplateService for TemplateServiceImpl {
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<String> {
        let context = tera::Context::from_serialize(template)?;
        self.state.0.render(T::NAME, &context).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use folio_templates_contracts::ContactSubmissionTemplate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sut() -> TemplateServiceImpl {
        TemplateServiceImpl {
            state: Default::default(),
        }
    }

    #[test]
    fn load_templates() {
        let state = State::load().unwrap();
        let mut names = state.0.get_template_names().collect::<Vec<_>>();
        names.sort_unstable();
        assert_eq!(names, ["base.html", "contact_submission.html"]);
    }

    #[test]
    fn contact_submission() {
        // Arrange
        let template = ContactSubmissionTemplate {
            name: "Max Mustermann".into(),
            email: "max.mustermann@example.de".into(),
            subject: "Collaboration".into(),
            message: "Hello World!\nHow are you?".into(),
        };

        // Act
        let result = sut().render(&template).unwrap();

        // Assert
        assert!(result.contains("<h2>New Contact Form Submission</h2>"));
        assert!(result.contains("<p><strong>Name:</strong> Max Mustermann</p>"));
        assert!(result.contains("<p><strong>Email:</strong> max.mustermann@example.de</p>"));
        assert!(result.contains("<p><strong>Subject:</strong> Collaboration</p>"));
        assert!(result.contains("<p>Hello World!<br>How are you?</p>"));
    }

    #[test]
    fn contact_submission_escapes_input() {
        // Arrange
        let template = ContactSubmissionTemplate {
            name: "<b>Max</b>".into(),
            email: "max@example.de".into(),
            subject: "a & b".into(),
            message: "<script>alert(1)</script>\r\nbye".into(),
        };

        // Act
        let result = sut().render(&template).unwrap();

        // Assert
        assert!(!result.contains("<b>Max</b>"));
        assert!(!result.contains("<script>"));
        assert!(result.contains("&lt;b&gt;Max&lt;"));
        assert!(result.contains("a &amp; b"));
        assert!(result.contains("&lt;script&gt;alert(1)&lt;"));
        assert!(result.contains("<br>bye"));
    }
}

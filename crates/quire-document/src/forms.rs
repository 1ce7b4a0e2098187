//! The form model: forms, their named elements and submission encoding.

use std::fmt::Write as _;

use thiserror::Error;
use url::form_urlencoded;

/// How a form is sent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::EnumString, strum_macros::Display,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    /// Values go into the query string.
    #[default]
    Get,
    /// Values go into the request body.
    Post,
}

/// What kind of control a form element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ElementKind {
    /// A submit button. Only the button that was pressed is sent.
    Submit,
    /// A fixed value that is always sent.
    Hidden,
    /// A group of radio buttons sharing a name.
    Radio,
    /// A drop-down list.
    Select,
}

/// One named element of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormElement {
    /// Name the value is sent under.
    pub name: String,
    /// Kind of control.
    pub kind: ElementKind,
    /// `(value, label)` pairs. Submit and hidden elements have exactly one.
    pub options: Vec<(String, String)>,
    /// Index of the selected option.
    pub selected: Option<usize>,
}

impl FormElement {
    /// An element without options.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            options: Vec::new(),
            selected: None,
        }
    }

    /// Add an option and return its index. A `selected` option replaces the
    /// current selection; the first option of a list is selected by default.
    pub fn add_option(
        &mut self,
        value: impl Into<String>,
        label: impl Into<String>,
        selected: bool,
    ) -> usize {
        let index = self.options.len();
        self.options.push((value.into(), label.into()));
        if selected || (self.selected.is_none() && self.kind != ElementKind::Radio) {
            self.selected = Some(index);
        }
        index
    }

    /// Value of the selected option.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        let index = self.selected?;
        self.options.get(index).map(|(value, _)| value.as_str())
    }

    /// Label of the selected option.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        let index = self.selected?;
        self.options.get(index).map(|(_, label)| label.as_str())
    }
}

/// A form as declared by `<form>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Index of the form in its [`FormSet`].
    pub id: usize,
    /// Target location.
    pub action: String,
    /// Declared method.
    pub method: Method,
    /// Elements in document order.
    pub elements: Vec<FormElement>,
}

/// A request built from a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Method to send with.
    pub method: Method,
    /// Target, including the query string for GET.
    pub url: String,
    /// `application/x-www-form-urlencoded` body for POST.
    pub body: Option<String>,
}

impl Form {
    /// Add an element and return its index.
    pub fn add_element(&mut self, element: FormElement) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Index of the element called `name` of the given kind.
    #[must_use]
    pub fn find_element(&self, name: &str, kind: ElementKind) -> Option<usize> {
        self.elements
            .iter()
            .position(|element| element.kind == kind && element.name == name)
    }

    /// Encode the values of the form. Of the submit buttons only
    /// `submitter`, the element index of the pressed button, is included.
    #[must_use]
    pub fn query(&self, submitter: Option<usize>) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (index, element) in self.elements.iter().enumerate() {
            if element.name.is_empty()
                || (element.kind == ElementKind::Submit && submitter != Some(index))
            {
                continue;
            }
            if let Some(value) = element.value() {
                let _ = serializer.append_pair(&element.name, value);
            }
        }
        serializer.finish()
    }

    /// Build the request for submitting this form with its declared method.
    #[must_use]
    pub fn submission(&self, submitter: Option<usize>) -> Submission {
        let query = self.query(submitter);
        match self.method {
            Method::Get => {
                let mut url = self.action.clone();
                if !query.is_empty() {
                    let separator = if url.contains('?') { '&' } else { '?' };
                    let _ = write!(url, "{separator}{query}");
                }
                Submission {
                    method: Method::Get,
                    url,
                    body: None,
                }
            }
            Method::Post => Submission {
                method: Method::Post,
                url: self.action.clone(),
                body: Some(query),
            },
        }
    }
}

/// Problems changing a form element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// No form with this id.
    #[error("no form {0}")]
    UnknownForm(usize),
    /// No element with this index.
    #[error("form {form} has no element {element}")]
    UnknownElement {
        /// Form id.
        form: usize,
        /// Element index.
        element: usize,
    },
    /// The element has no option with this index.
    #[error("element '{name}' has no option {index}")]
    NoSuchOption {
        /// Element name.
        name: String,
        /// Requested option.
        index: usize,
    },
}

/// All forms of a document, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSet {
    forms: Vec<Form>,
}

impl FormSet {
    /// An empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { forms: Vec::new() }
    }

    /// Add a form and return its id.
    pub fn add(&mut self, action: impl Into<String>, method: Method) -> usize {
        let id = self.forms.len();
        self.forms.push(Form {
            id,
            action: action.into(),
            method,
            elements: Vec::new(),
        });
        id
    }

    /// The form with `id`.
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&Form> {
        self.forms.get(id)
    }

    /// Mutable access to the form with `id`.
    pub fn get_mut(&mut self, id: usize) -> Option<&mut Form> {
        self.forms.get_mut(id)
    }

    /// Number of forms.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.forms.len()
    }

    /// Check if the document has no forms.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Forms in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Form> {
        self.forms.iter()
    }

    /// Select option `index` of an element.
    ///
    /// # Errors
    ///
    /// Fails if the form, element or option does not exist.
    pub fn select(&mut self, form: usize, element: usize, index: usize) -> Result<(), FormError> {
        let target = self
            .forms
            .get_mut(form)
            .ok_or(FormError::UnknownForm(form))?
            .elements
            .get_mut(element)
            .ok_or(FormError::UnknownElement { form, element })?;
        if index >= target.options.len() {
            return Err(FormError::NoSuchOption {
                name: target.name.clone(),
                index,
            });
        }
        target.selected = Some(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(method: Method) -> Form {
        let mut forms = FormSet::new();
        let id = forms.add("/search", method);
        let form = forms.get_mut(id).unwrap();
        let mut hidden = FormElement::new("lang", ElementKind::Hidden);
        let _ = hidden.add_option("en", "", true);
        let _ = form.add_element(hidden);
        let mut query = FormElement::new("q", ElementKind::Select);
        let _ = query.add_option("a b", "A B", false);
        let _ = query.add_option("c&d", "C&D", false);
        let _ = form.add_element(query);
        let mut go = FormElement::new("go", ElementKind::Submit);
        let _ = go.add_option("Go", "Go", true);
        let _ = form.add_element(go);
        form.clone()
    }

    #[test]
    fn test_method_parses_case_insensitively() {
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert!("put".parse::<Method>().is_err());
    }

    #[test]
    fn test_first_select_option_is_default() {
        let form = sample(Method::Get);
        assert_eq!(form.elements[1].value(), Some("a b"));
    }

    #[test]
    fn test_get_submission_appends_query() {
        let form = sample(Method::Get);
        let submission = form.submission(Some(2));
        assert_eq!(submission.url, "/search?lang=en&q=a+b&go=Go");
        assert_eq!(submission.body, None);
    }

    #[test]
    fn test_post_submission_uses_body_and_skips_unpressed_buttons() {
        let form = sample(Method::Post);
        let submission = form.submission(None);
        assert_eq!(submission.method, Method::Post);
        assert_eq!(submission.url, "/search");
        assert_eq!(submission.body.as_deref(), Some("lang=en&q=a+b"));
    }

    #[test]
    fn test_select_validates_indices() {
        let mut forms = FormSet::new();
        let id = forms.add("/", Method::Get);
        let mut list = FormElement::new("n", ElementKind::Select);
        let _ = list.add_option("1", "one", false);
        let _ = list.add_option("2", "two", false);
        let _ = forms.get_mut(id).unwrap().add_element(list);

        forms.select(id, 0, 1).unwrap();
        assert_eq!(forms.get(id).unwrap().elements[0].value(), Some("2"));
        assert!(matches!(
            forms.select(id, 0, 5),
            Err(FormError::NoSuchOption { index: 5, .. })
        ));
        assert_eq!(forms.select(3, 0, 0), Err(FormError::UnknownForm(3)));
    }
}

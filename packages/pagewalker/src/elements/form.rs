//! HTML forms and their submission.

use url::Url;

use super::{Button, FormControl, FormField, TypedElement};
use crate::error::{BrowserError, Result};
use crate::navigation::{HttpRequest, Method, PageModel, PostValue, RequestBody};

/// `application/x-www-form-urlencoded`.
pub const URLENCODED: &str = "application/x-www-form-urlencoded";

/// `multipart/form-data`.
pub const MULTIPART: &str = "multipart/form-data";

element_wrapper! {
    /// `<form>`.
    Form => Form
}

impl Form {
    /// Submission method; anything but `post` submits as GET.
    #[must_use]
    pub fn method(&self) -> Method {
        parse_method(self.attribute("method").as_deref())
    }

    /// Absolute submission target; an empty action targets the page itself.
    pub fn action(&self) -> Result<Url> {
        resolve_action(self, self.attribute("action"))
    }

    /// Lower-cased `enctype`, urlencoded by default.
    #[must_use]
    pub fn enctype(&self) -> String {
        parse_enctype(self.attribute("enctype").as_deref())
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.enctype() == MULTIPART
    }

    /// Controls owned by this form, in document order.
    ///
    /// Includes controls outside the form that name it in their `form`
    /// attribute, and excludes nested controls that name another form.
    pub fn controls(&self) -> Result<Vec<FormField>> {
        let mut controls = Vec::new();
        for field in self.page().find().all::<FormField>()? {
            let field = field?;
            if field.form()?.is_some_and(|owner| owner.node() == self.node()) {
                controls.push(field);
            }
        }
        Ok(controls)
    }

    /// Name/value pairs submitted with `submitter`.
    ///
    /// Disabled controls are skipped, and so are buttons other than the
    /// submitter.
    pub fn post_data(&self, submitter: Option<&Button>) -> Result<Vec<(String, PostValue)>> {
        let mut data = Vec::new();
        for field in self.controls()? {
            if field.is_disabled() {
                continue;
            }
            if let TypedElement::Button(button) = field.typed() {
                if !submitter.is_some_and(|submitter| submitter.node() == button.node()) {
                    continue;
                }
            }
            data.extend(field.post_data()?);
        }
        Ok(data)
    }

    /// Build the request a submission sends.
    ///
    /// The submitter's `formaction`, `formmethod` and `formenctype` override
    /// the form's own attributes. GET submissions replace the action's query
    /// with the form data; files are sent by name.
    ///
    /// # Errors
    /// [`BrowserError::InvalidOperation`] when `submitter` belongs to another form.
    pub fn request(&self, submitter: Option<&Button>) -> Result<HttpRequest> {
        if let Some(button) = submitter {
            let owner = button.form()?;
            if !owner.is_some_and(|owner| owner.node() == self.node()) {
                return Err(BrowserError::InvalidOperation(format!(
                    "button {} does not belong to form {}",
                    button.summary(),
                    self.summary()
                )));
            }
        }

        let override_of = |name: &str| submitter.and_then(|button| button.attribute(name));
        let method = match override_of("formmethod") {
            Some(method) => parse_method(Some(&method)),
            None => self.method(),
        };
        let mut url = match override_of("formaction") {
            Some(action) => resolve_action(self, Some(action))?,
            None => self.action()?,
        };
        let multipart = match override_of("formenctype") {
            Some(enctype) => parse_enctype(Some(&enctype)) == MULTIPART,
            None => self.is_multipart(),
        };
        let data = self.post_data(submitter)?;

        Ok(match method {
            Method::Get => {
                url.set_fragment(None);
                url.set_query(None);
                if !data.is_empty() {
                    url.query_pairs_mut().extend_pairs(data.into_iter().map(|(name, value)| {
                        let value = match value {
                            PostValue::Text(text) => text,
                            PostValue::File(upload) => upload.file_name(),
                        };
                        (name, value)
                    }));
                }
                HttpRequest::get(url)
            }
            Method::Post => HttpRequest::post(url, RequestBody::from_fields(data, multipart)),
        })
    }

    /// Submit without a submitter.
    pub fn submit<P: PageModel>(&self) -> Result<P> {
        self.send(None)
    }

    /// Submit as if `submitter` had been clicked.
    pub fn submit_with<P: PageModel>(&self, submitter: &Button) -> Result<P> {
        self.send(Some(submitter))
    }

    fn send<P: PageModel>(&self, submitter: Option<&Button>) -> Result<P> {
        let browser = self.page().browser()?;
        let request = self.request(submitter)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            submitter = ?submitter.map(|button| button.summary()),
            "Submitting form"
        );
        browser.request(request, browser.config().expected_status())
    }
}

fn parse_method(method: Option<&str>) -> Method {
    match method.map(str::trim) {
        Some(method) if method.eq_ignore_ascii_case("post") => Method::Post,
        _ => Method::Get,
    }
}

fn parse_enctype(enctype: Option<&str>) -> String {
    enctype
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| URLENCODED.to_string())
}

fn resolve_action(form: &Form, action: Option<String>) -> Result<Url> {
    match action.as_deref().map(str::trim) {
        Some(action) if !action.is_empty() => form.page().resolve(action),
        _ => Ok(form.page().location().clone()),
    }
}

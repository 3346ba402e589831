// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form extraction
//!
//! A [`Form`] is read from a page element, edited by the caller and turned
//! into a [`Request`] that the browser navigates to.

use reqwest::Method;
use url::Url;

use crate::dom::Element;
use crate::error::{Error, Result};
use crate::http::Request;

/// Extracted form data
#[derive(Debug, Clone)]
pub struct Form {
    /// Form ID
    pub id: Option<String>,
    /// Form name
    pub name: Option<String>,
    /// Action as written in the page
    pub action: Option<String>,
    /// HTTP method (GET/POST)
    pub method: Method,
    /// Encoding type
    pub enctype: String,
    /// Successful controls, in document order
    pub fields: Vec<FormField>,
    /// Submit buttons, sent only when pressed
    pub buttons: Vec<FormField>,
    /// Where relative actions are resolved
    pub base_url: Option<Url>,
    pressed: Option<usize>,
}

/// Form field
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Field name
    pub name: String,
    /// Field type (text, password, hidden, etc.)
    pub field_type: String,
    /// Current value
    pub value: String,
    /// Select options (for select elements)
    pub options: Vec<String>,
}

impl Form {
    /// Create a form from a DOM element
    pub fn from_element(element: &Element) -> Self {
        let mut fields = Vec::new();
        let mut buttons = Vec::new();

        for input in element
            .query("input, textarea, select, button")
            .unwrap_or_default()
        {
            let Some(name) = input.attr("name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if input.has_attribute("disabled") {
                continue;
            }

            let field_type = match input.tag_name() {
                "textarea" => "textarea".to_string(),
                "select" => "select".to_string(),
                "button" => input.attr("type").unwrap_or("submit").to_lowercase(),
                _ => input.attr("type").unwrap_or("text").to_lowercase(),
            };

            let options = if field_type == "select" {
                input
                    .query("option")
                    .unwrap_or_default()
                    .iter()
                    .map(|o| o.attr("value").map(str::to_string).unwrap_or_else(|| o.text_content()))
                    .collect()
            } else {
                Vec::new()
            };

            let field = FormField {
                name: name.to_string(),
                value: input.value().unwrap_or_else(|| default_value(&field_type)),
                field_type,
                options,
            };

            match field.field_type.as_str() {
                "submit" | "image" => buttons.push(field),
                "button" | "reset" | "file" => {}
                "checkbox" | "radio" if !input.has_attribute("checked") => {}
                _ => fields.push(field),
            }
        }

        let method = match element.attr("method").map(|m| m.to_uppercase()).as_deref() {
            Some("POST") => Method::POST,
            _ => Method::GET,
        };

        Self {
            id: element.id().map(str::to_string),
            name: element.attr("name").map(str::to_string),
            action: element.attr("action").map(str::to_string),
            method,
            enctype: element
                .attr("enctype")
                .unwrap_or("application/x-www-form-urlencoded")
                .to_string(),
            fields,
            buttons,
            base_url: element.base_url(),
            pressed: None,
        }
    }

    /// Current value of a field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Set a field value, adding the field when the page did not have it
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(FormField {
                name: name.to_string(),
                field_type: "hidden".to_string(),
                value,
                options: Vec::new(),
            }),
        }
        self
    }

    /// Drop a field from the submission
    pub fn remove(&mut self, name: &str) -> &mut Self {
        self.fields.retain(|f| f.name != name);
        self
    }

    /// Send this submit button's name and value with the form
    pub fn press(&mut self, name: &str) -> Result<&mut Self> {
        let index = self
            .buttons
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| Error::not_found(format!("button[name={}]", name), self.describe()))?;
        self.pressed = Some(index);
        Ok(self)
    }

    /// Name-value pairs that would be submitted
    pub fn data(&self) -> Vec<(String, String)> {
        let mut data: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();
        if let Some(button) = self.pressed.and_then(|i| self.buttons.get(i)) {
            data.push((button.name.clone(), button.value.clone()));
        }
        data
    }

    /// Hidden field that looks like an anti-CSRF token
    pub fn csrf_token(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| {
                let name = f.name.to_lowercase();
                f.field_type == "hidden"
                    && (name.contains("csrf") || name.contains("token") || name == "authenticity_token")
            })
            .map(|f| f.value.as_str())
    }

    /// Absolute action URL
    pub fn action_url(&self) -> Result<Url> {
        let action = self.action.as_deref().unwrap_or("").trim();
        match (&self.base_url, action) {
            (Some(base), "") => Ok(base.clone()),
            (Some(base), action) => Ok(base.join(action)?),
            (None, "") => Err(Error::Config(format!("No URL to submit {}", self.describe()))),
            (None, action) => Url::parse(action).map_err(|_| {
                Error::Config(format!("Cannot resolve relative action '{}'", action))
            }),
        }
    }

    /// Request submitting this form
    pub fn request(&self) -> Result<Request> {
        let url = self.action_url()?;
        let data = self.data();

        Ok(if self.method == Method::POST {
            Request::new(Method::POST, url).form(data)
        } else {
            let mut url = url;
            url.set_query(None);
            Request::new(Method::GET, url).query(data)
        })
    }

    fn describe(&self) -> String {
        match (&self.id, &self.name) {
            (Some(id), _) => format!("form#{}", id),
            (None, Some(name)) => format!("form[name={}]", name),
            _ => "form".to_string(),
        }
    }
}

fn default_value(field_type: &str) -> String {
    match field_type {
        "checkbox" | "radio" => "on".to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html_with_url;

    const LOGIN: &str = r#"
        <form id="login" action="/login?step=1" method="post">
            <input type="hidden" name="_csrf" value="token123">
            <input type="text" name="user">
            <input type="password" name="pass">
            <input type="checkbox" name="remember">
            <input type="checkbox" name="terms" checked>
            <input type="text" name="gone" value="x" disabled>
            <select name="profile">
                <option value="part">Particulier</option>
                <option value="pro" selected>Professionnel</option>
            </select>
            <button type="submit" name="go" value="1">Login</button>
        </form>
    "#;

    fn login_form() -> Form {
        let url = Url::parse("https://bank.test/home").unwrap();
        let doc = parse_html_with_url(LOGIN, Some(url)).unwrap();
        let element = doc.query_first("form").unwrap().unwrap();
        Form::from_element(&element)
    }

    #[test]
    fn test_form_extraction() {
        let form = login_form();

        assert_eq!(form.id.as_deref(), Some("login"));
        assert_eq!(form.method, Method::POST);
        assert_eq!(form.csrf_token(), Some("token123"));
        assert_eq!(form.field("terms"), Some("on"));
        assert_eq!(form.field("remember"), None);
        assert_eq!(form.field("gone"), None);
        assert_eq!(form.field("profile"), Some("pro"));
        assert_eq!(form.buttons.len(), 1);
    }

    #[test]
    fn test_post_request() {
        let mut form = login_form();
        form.set("user", "jo").set("pass", "s3cr3t");
        form.press("go").unwrap();

        let request = form.request().unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "https://bank.test/login?step=1");
        assert_eq!(
            request.body_text().as_deref(),
            Some("_csrf=token123&user=jo&pass=s3cr3t&terms=on&profile=pro&go=1")
        );
        assert!(form.press("nope").unwrap_err().is_extraction());
    }

    #[test]
    fn test_get_request() {
        let html = r#"<form action="search?old=1"><input name="q" value="a b"></form>"#;
        let doc = parse_html_with_url(html, Url::parse("https://bank.test/x/").ok()).unwrap();
        let mut form = Form::from_element(&doc.query_first("form").unwrap().unwrap());
        form.remove("missing").set("page", "2");

        let request = form.request().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.as_str(), "https://bank.test/x/search?q=a+b&page=2");
    }

    #[test]
    fn test_action_without_base() {
        let doc = crate::dom::parse_html(r#"<form action="/rel"></form>"#).unwrap();
        let form = Form::from_element(&doc.query_first("form").unwrap().unwrap());
        assert!(matches!(form.request(), Err(Error::Config(_))));
    }
}

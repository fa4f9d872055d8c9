//! Test doubles shared by unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::BrowserConfig;
use crate::error::TransportError;
use crate::navigation::{Browser, HttpRequest, HttpResponse, Transport};

/// Requests seen by a [`Scripted`] transport.
pub(crate) type Requests = Rc<RefCell<Vec<HttpRequest>>>;

/// Replays canned responses and records requests.
pub(crate) struct Scripted {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: Requests,
}

impl Scripted {
    pub(crate) fn new(responses: Vec<HttpResponse>) -> (Self, Requests) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let transport = Self {
            responses: RefCell::new(responses.into()),
            requests: Rc::clone(&requests),
        };
        (transport, requests)
    }
}

impl Transport for Scripted {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| "no scripted response left".into())
    }

    fn clear_cookies(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Browser rooted at `http://app.test/` replaying `responses`.
pub(crate) fn scripted_browser(responses: Vec<HttpResponse>) -> (Browser, Requests) {
    let config = BrowserConfig::builder()
        .base_url("http://app.test/")
        .build()
        .unwrap();
    let (transport, requests) = Scripted::new(responses);
    (Browser::with_transport(config, transport), requests)
}

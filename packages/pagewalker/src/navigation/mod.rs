//! Navigation engine: requests, redirects, outcome history and pages.

mod browser;
mod http;
mod page;
mod result;

pub use browser::Browser;
pub use http::{
    canonical_reason, create_client, FileUpload, HttpRequest, HttpResponse, PostValue,
    RequestBody, ReqwestTransport, Transport,
};
pub use page::{Page, PageModel};
pub use result::{HttpOutcome, HttpResult, Method};

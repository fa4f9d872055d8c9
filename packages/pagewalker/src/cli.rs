//! Command-line page inspector.

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::{BrowserConfig, DEFAULT_EXPECTED_STATUS};
use crate::elements::{Anchor, Form, FormControl, FormField, TypedElement};
use crate::error::Result;
use crate::navigation::{Browser, HttpOutcome, Page};

/// Pagewalker - Fetch a page the way a test would and show what it contains.
#[derive(Parser)]
#[command(name = "pagewalker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a page, following redirects, and print its history.
    Get {
        /// Absolute URL to fetch
        url: String,

        /// Status code the final response must have
        #[arg(short, long, default_value_t = DEFAULT_EXPECTED_STATUS)]
        expect_status: u16,

        /// Elements to list from the final page
        #[arg(short, long, value_enum)]
        list: Option<Listing>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Fetch a page and resolve an element by id, name or text.
    Find {
        /// Absolute URL to fetch
        url: String,

        /// Id, name or visible text of the element
        key: String,
    },
}

/// Element listings for `get --list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Listing {
    Links,
    Forms,
    Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Yaml,
}

/// Serializable summary of a navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    pub location: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub elapsed_ms: u128,
    pub hops: Vec<HopReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopReport {
    pub method: String,
    pub location: String,
    pub status: u16,
    pub reason: String,
    pub elapsed_ms: u128,
}

impl From<&HttpOutcome> for HopReport {
    fn from(outcome: &HttpOutcome) -> Self {
        Self {
            method: outcome.method().to_string(),
            location: outcome.location().to_string(),
            status: outcome.status(),
            reason: outcome.reason().to_string(),
            elapsed_ms: outcome.elapsed().as_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementReport {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ElementReport {
    fn from_typed(element: &TypedElement) -> Self {
        Self {
            kind: element.kind().to_string(),
            name: element.element().attribute("name"),
            value: element.value(),
            text: non_empty(element.element().text()),
            target: None,
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Get {
            url,
            expect_status,
            list,
            format,
        } => get_command(&url, expect_status, list, format),
        Commands::Find { url, key } => find_command(&url, &key),
    }
}

/// Execute the get command.
fn get_command(url: &str, expect_status: u16, list: Option<Listing>, format: OutputFormat) -> Result<()> {
    let browser = create_browser()?;
    let page = match with_spinner(url, || browser.navigate_to_with_status::<Page>(url, expect_status)) {
        Ok(page) => page,
        Err(e) => {
            if let Some(history) = e.history() {
                print_history(history);
            }
            return Err(e);
        }
    };

    let report = build_report(&page, list)?;
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

/// Execute the find command.
fn find_command(url: &str, key: &str) -> Result<()> {
    let browser = create_browser()?;
    let page = with_spinner(url, || browser.navigate_dynamic(url))?;
    let element = page.member(key)?;

    println!(
        "{} {} {}",
        style("Found").green().bold(),
        style(element.kind()).cyan(),
        element.element().summary()
    );
    if let Some(value) = element.value() {
        println!("  Value: {}", style(value).green());
    }
    let text = element.element().text();
    if !text.is_empty() {
        println!("  Text: {text}");
    }
    Ok(())
}

fn create_browser() -> Result<Browser> {
    let config = BrowserConfig::builder()
        .cookies(true)
        .build()?;
    Browser::new(config)
}

fn with_spinner<T>(url: &str, fetch: impl FnOnce() -> Result<T>) -> Result<T> {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(format!("Fetching {url}..."));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    let result = fetch();
    pb.finish_and_clear();
    result
}

/// Summarize a page and the requested elements.
pub fn build_report(page: &Page, list: Option<Listing>) -> Result<PageReport> {
    let elements = match list {
        None => Vec::new(),
        Some(Listing::Links) => page
            .find()
            .all::<Anchor>()?
            .map(|anchor| -> Result<ElementReport> {
                let anchor = anchor?;
                Ok(ElementReport {
                    kind: "Anchor".to_string(),
                    name: None,
                    value: None,
                    text: non_empty(anchor.text()),
                    target: anchor
                        .href()
                        .map(|href| page.resolve(&href).map(String::from))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(Listing::Forms) => page
            .find()
            .all::<Form>()?
            .map(|form| -> Result<ElementReport> {
                let form = form?;
                Ok(ElementReport {
                    kind: "Form".to_string(),
                    name: form.attribute("name").or_else(|| form.id()),
                    value: Some(form.method().to_string()),
                    text: None,
                    target: Some(form.action()?.to_string()),
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(Listing::Fields) => page
            .find()
            .all::<FormField>()?
            .map(|field| -> Result<ElementReport> {
                let field = field?;
                let mut report = ElementReport::from_typed(field.typed());
                report.name = field.name();
                Ok(report)
            })
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(PageReport {
        location: page.location().to_string(),
        status: page.status(),
        title: page.title(),
        elapsed_ms: page.result().total_elapsed().as_millis(),
        hops: page.result().outcomes().iter().map(HopReport::from).collect(),
        elements,
    })
}

fn print_history(history: &[HttpOutcome]) {
    for outcome in history {
        let status = if outcome.status() < 400 {
            style(outcome.status()).green()
        } else {
            style(outcome.status()).red()
        };
        println!(
            "  {} {} -> {} {} ({} ms)",
            outcome.method(),
            outcome.location(),
            status,
            outcome.reason(),
            outcome.elapsed().as_millis()
        );
    }
}

fn print_report(report: &PageReport) {
    println!(
        "{} {} ({})",
        style("Loaded").bold(),
        style(&report.location).cyan(),
        style(report.status).green()
    );
    if let Some(title) = &report.title {
        println!("  Title: {}", style(title).green());
    }
    println!(
        "  Hops: {} in {} ms",
        report.hops.len(),
        report.elapsed_ms
    );
    for hop in &report.hops {
        println!(
            "    {} {} -> {} {} ({} ms)",
            hop.method, hop.location, hop.status, hop.reason, hop.elapsed_ms
        );
    }

    if report.elements.is_empty() {
        return;
    }
    println!();
    for element in &report.elements {
        let mut line = style(&element.kind).cyan().to_string();
        if let Some(name) = &element.name {
            line.push_str(&format!(" name={name}"));
        }
        if let Some(value) = &element.value {
            line.push_str(&format!(" value={value}"));
        }
        if let Some(text) = &element.text {
            line.push_str(&format!(" \"{text}\""));
        }
        if let Some(target) = &element.target {
            line.push_str(&format!(" -> {}", style(target).green()));
        }
        println!("  {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parse_get() {
        let cli = Cli::parse_from(["pagewalker", "get", "http://localhost/"]);

        let Commands::Get {
            url,
            expect_status,
            list,
            format,
        } = cli.command
        else {
            panic!("expected get command");
        };
        assert_eq!(url, "http://localhost/");
        assert_eq!(expect_status, 200);
        assert!(list.is_none());
        assert_eq!(format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_parse_get_with_options() {
        let cli = Cli::parse_from([
            "pagewalker",
            "get",
            "http://localhost/missing",
            "--expect-status",
            "404",
            "--list",
            "fields",
            "--format",
            "yaml",
        ]);

        let Commands::Get {
            expect_status,
            list,
            format,
            ..
        } = cli.command
        else {
            panic!("expected get command");
        };
        assert_eq!(expect_status, 404);
        assert_eq!(list, Some(Listing::Fields));
        assert_eq!(format, OutputFormat::Yaml);
    }

    #[test]
    fn test_cli_parse_find() {
        let cli = Cli::parse_from(["pagewalker", "find", "http://localhost/", "Sign in"]);
        let Commands::Find { url, key } = cli.command else {
            panic!("expected find command");
        };
        assert_eq!(url, "http://localhost/");
        assert_eq!(key, "Sign in");
    }

    const LOGIN: &str = r#"<title>Login</title>
        <a href="/help">Help</a>
        <form name="login" method="post" action="/session">
          <input name="user" value="bob"><input type="checkbox" name="remember">
        </form>"#;

    #[test]
    fn test_build_report_lists() {
        let page = Page::parse("http://localhost/login", LOGIN).unwrap();

        let links = build_report(&page, Some(Listing::Links)).unwrap();
        assert_eq!(links.title.as_deref(), Some("Login"));
        assert_eq!(links.hops.len(), 1);
        assert_eq!(links.elements[0].target.as_deref(), Some("http://localhost/help"));
        assert_eq!(links.elements[0].text.as_deref(), Some("Help"));

        let forms = build_report(&page, Some(Listing::Forms)).unwrap();
        assert_eq!(forms.elements[0].name.as_deref(), Some("login"));
        assert_eq!(forms.elements[0].value.as_deref(), Some("POST"));
        assert_eq!(forms.elements[0].target.as_deref(), Some("http://localhost/session"));

        let fields = build_report(&page, Some(Listing::Fields)).unwrap();
        let kinds: Vec<&str> = fields.elements.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["TextInput", "CheckBox"]);
        assert_eq!(fields.elements[0].value.as_deref(), Some("bob"));
    }

    #[test]
    fn test_report_yaml_skips_empty_fields() {
        let page = Page::parse("http://localhost/", "<p>x</p>").unwrap();
        let yaml = serde_yaml_ng::to_string(&build_report(&page, None).unwrap()).unwrap();
        assert!(yaml.contains("http://localhost/"));
        assert!(yaml.contains("status: 200"));
        assert!(!yaml.contains("title"));
        assert!(!yaml.contains("elements"));
    }
}

//! Prompt templates for extraction and email drafting.

use serde::{Deserialize, Serialize};

use crate::job::JobPosting;

/// Output format requested from the drafting model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStyle {
    #[default]
    Markdown,
    Plain,
}

/// Who the email is written as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(default = "default_sender_name")]
    pub name: String,
    #[serde(default = "default_sender_title")]
    pub title: String,
    #[serde(default = "default_company")]
    pub company: String,
}

fn default_sender_name() -> String {
    "Mohan".to_string()
}

fn default_sender_title() -> String {
    "BDE".to_string()
}

fn default_company() -> String {
    "AtliQ (AI & Software Consulting)".to_string()
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: default_sender_name(),
            title: default_sender_title(),
            company: default_company(),
        }
    }
}

/// Extraction prompt around the cleaned page text.
pub fn extraction_prompt(page_text: &str) -> String {
    format!(
        "### SCRAPED TEXT FROM WEBSITE:\n\
         {page_text}\n\
         ### INSTRUCTION:\n\
         The scraped text is from the careers page of a website.\n\
         Extract job postings and return JSON with keys: role, experience, skills, description.\n\
         Return only valid JSON (no preamble)."
    )
}

/// Drafting prompt for one job record and the portfolio links to cite.
pub fn email_prompt(job: &JobPosting, links: &[String], persona: &Persona, style: EmailStyle) -> String {
    let job_description = serde_json::Value::Object(job.fields().clone()).to_string();
    let link_list = if links.is_empty() {
        "none".to_string()
    } else {
        links.join(", ")
    };
    let format_rule = match style {
        EmailStyle::Markdown => "No preamble. Output only the email in Markdown.",
        EmailStyle::Plain => {
            "No preamble. Output only the email as plain text: no Markdown, \
             no bullet symbols, no headings, no bold or italics."
        }
    };

    format!(
        "### JOB DESCRIPTION:\n\
         {job_description}\n\
         \n\
         ### INSTRUCTION:\n\
         You are {name}, {title} at {company}. Write a concise, tailored cold email\n\
         showing how {short} can meet the needs above. If the job record carries a tone \
         or cta field, write in that tone and close with that call to action.\n\
         Include the most relevant portfolio links: {link_list}.\n\
         {format_rule}",
        name = persona.name,
        title = persona.title,
        company = persona.company,
        short = short_company(&persona.company),
    )
}

// "AtliQ (AI & Software Consulting)" -> "AtliQ"
fn short_company(company: &str) -> &str {
    company.split(" (").next().unwrap_or(company).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extraction_prompt_embeds_text_and_keys() {
        let p = extraction_prompt("Senior Rust Engineer - 5 years");
        assert!(p.contains("Senior Rust Engineer - 5 years"));
        assert!(p.contains("role, experience, skills, description"));
        assert!(p.contains("Return only valid JSON"));
    }

    #[test]
    fn email_prompt_with_no_links() {
        let job = JobPosting::from_value(json!({"role": "SWE"})).unwrap();
        let p = email_prompt(&job, &[], &Persona::default(), EmailStyle::Markdown);
        assert!(p.contains(r#"{"role":"SWE"}"#));
        assert!(p.contains("portfolio links: none."));
        assert!(p.contains("You are Mohan, BDE at AtliQ (AI & Software Consulting)"));
        assert!(p.contains("how AtliQ can meet"));
        assert!(p.contains("in Markdown"));
    }

    #[test]
    fn email_prompt_lists_links_and_plain_rule() {
        let job = JobPosting::from_value(json!({"role": "SWE", "tone": "Friendly"})).unwrap();
        let links = vec!["https://a.example/ml".to_string(), "https://b.example/web".to_string()];
        let p = email_prompt(&job, &links, &Persona::default(), EmailStyle::Plain);
        assert!(p.contains("https://a.example/ml, https://b.example/web"));
        assert!(p.contains(r#""tone":"Friendly""#));
        assert!(p.contains("plain text"));
        assert!(!p.contains("in Markdown"));
    }

    #[test]
    fn custom_persona() {
        let persona = Persona {
            name: "Ana".into(),
            title: "Founder".into(),
            company: "Rustacea".into(),
        };
        let p = email_prompt(&JobPosting::new(), &[], &persona, EmailStyle::Markdown);
        assert!(p.contains("You are Ana, Founder at Rustacea."));
        assert!(p.contains("how Rustacea can meet"));
    }

    #[test]
    fn style_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct W {
            style: EmailStyle,
        }
        let w: W = toml::from_str(r#"style = "plain""#).unwrap();
        assert_eq!(w.style, EmailStyle::Plain);
    }
}

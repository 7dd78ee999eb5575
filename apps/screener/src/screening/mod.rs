// CV screening: extract → score → look up email → notify → report.
// All model calls go through llm_client; all mail goes through notifier::Mailer.

pub mod directory;
pub mod extractor;
pub mod handlers;
pub mod notifier;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod scorer;
pub mod session;
pub mod views;

#[cfg(test)]
pub mod test_support;

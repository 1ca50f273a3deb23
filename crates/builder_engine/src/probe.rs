use std::sync::Arc;

use builder_logging::{builder_debug, builder_info};

use crate::{ApiError, BuilderApi, PrerequisiteState};

const DOCUMENT_MARKER: &str = "<!doctype";
const ERROR_MARKER: &str = "\"error\"";

/// Read-only queries about server state. Holds no state of its own.
#[derive(Clone)]
pub struct StatusProbe {
    api: Arc<dyn BuilderApi>,
}

impl StatusProbe {
    pub fn new(api: Arc<dyn BuilderApi>) -> Self {
        Self { api }
    }

    /// Fresh onboarding progress. Callers must treat an error as "not complete".
    pub async fn check_prerequisite(&self) -> Result<PrerequisiteState, ApiError> {
        let reply = self.api.progress().await?;
        Ok(reply.into())
    }

    /// A previously generated site, if the server has one. Never an error.
    pub async fn check_for_existing_preview(&self) -> Option<String> {
        match self.api.preview().await {
            Ok(body) if looks_like_document(&body) => {
                builder_info!("Existing preview found ({} bytes)", body.len());
                Some(body)
            }
            Ok(_) => {
                builder_debug!("Preview endpoint returned something other than a page");
                None
            }
            Err(err) => {
                builder_debug!("No existing preview: {}", err);
                None
            }
        }
    }
}

/// A full HTML page: starts with a doctype and carries no JSON error marker.
pub fn looks_like_document(body: &str) -> bool {
    let head = body.trim_start_matches('\u{feff}').trim_start();
    let starts_with_marker = head
        .get(..DOCUMENT_MARKER.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DOCUMENT_MARKER));
    starts_with_marker && !body.contains(ERROR_MARKER)
}

#[cfg(test)]
mod tests {
    use super::looks_like_document;

    #[test]
    fn full_page_is_a_document() {
        assert!(looks_like_document("<!DOCTYPE html><html></html>"));
        assert!(looks_like_document("\n  <!doctype html>\n<html></html>"));
        assert!(looks_like_document("\u{feff}<!DOCTYPE html>"));
    }

    #[test]
    fn error_payloads_are_not_documents() {
        assert!(!looks_like_document(r#"{"error": "No website yet"}"#));
        assert!(!looks_like_document(
            r#"<!DOCTYPE html><script>var x = {"error": 1}</script>"#
        ));
        assert!(!looks_like_document(""));
        assert!(!looks_like_document("<html><body>fragment</body></html>"));
    }

    #[test]
    fn doctype_must_lead_the_body() {
        assert!(!looks_like_document("<p>see</p><!DOCTYPE html>"));
        assert!(!looks_like_document("ééééé"));
    }
}

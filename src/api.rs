//! The JSON boundary spoken by the web front end: `{ "code" }` in, `{ "mermaid" }` out.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::Result,
    parser::parse,
    render::{RenderConfig, render_with},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub mermaid: String,
}

pub fn handle(request: &Request, config: &RenderConfig) -> Result<Response> {
    let ast = parse(&request.code).inspect_err(|err| {
        warn!(position = err.position(), "rejected source: {err}");
    })?;
    debug!(nodes = ast.size(), "parsed request");
    Ok(Response {
        mermaid: render_with(&ast, config),
    })
}

pub fn handle_json(body: &str, config: &RenderConfig) -> Result<String> {
    let request: Request = serde_json::from_str(body)?;
    let response = handle(&request, config)?;
    Ok(serde_json::to_string(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn renders_request_code() {
        let response = handle(
            &Request {
                code: "f 1".into(),
            },
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(
            response.mermaid,
            "graph TD\n  N0(\"call\")\n  N1(\"f\")\n  N0 -->|fun|N1\n  N2([\"1\"])\n  N0 -->|arg|N2\n"
        );
    }

    #[test]
    fn json_round_trip() {
        let body = handle_json(r#"{"code":"x"}"#, &RenderConfig::default()).unwrap();
        let response: Response = serde_json::from_str(&body).unwrap();
        assert_eq!(response.mermaid, "graph TD\n  N0(\"x\")\n");
    }

    #[test]
    fn syntax_errors_propagate() {
        let err = handle_json(r#"{"code":"let"}"#, &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let err = handle_json(r#"{"source":"x"}"#, &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}

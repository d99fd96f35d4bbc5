//! Test page generator.

use serde::{Deserialize, Serialize};

/// Options for [`generate_three_js_test_html`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlOptions {
    pub title: String,
    /// Version string of the rendering library the page loads.
    pub three_version: String,
    /// Run the script on `load` instead of leaving it to the test.
    pub auto_execute: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            title: "SceneSim Test".to_string(),
            three_version: "0.160.0".to_string(),
            auto_execute: true,
        }
    }
}

/// Build a test page that loads the rendering library and embeds `script`
/// verbatim.
///
/// The page publishes `window.threeJSLoaded` and `window.testResults`, the
/// globals the coordinator reads back.
pub fn generate_three_js_test_html(script: &str, options: &HtmlOptions) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&options.title)));
    html.push_str("<style>body { margin: 0; overflow: hidden; } canvas { display: block; }</style>\n");
    html.push_str(&format!(
        "<script src=\"https://unpkg.com/three@{}/build/three.min.js\"></script>\n",
        options.three_version
    ));
    html.push_str("</head>\n<body>\n<script>\n");
    html.push_str("window.threeJSLoaded = typeof THREE !== 'undefined';\n");
    html.push_str("window.testResults = null;\n");

    if options.auto_execute {
        html.push_str("window.addEventListener('load', function () {\n");
        html.push_str("  const start = performance.now();\n");
        html.push_str("  try {\n");
        html.push_str(script);
        html.push_str("\n    window.testResults = { success: true, duration: performance.now() - start, timestamp: new Date().toISOString() };\n");
        html.push_str("  } catch (error) {\n");
        html.push_str("    window.testResults = { success: false, duration: performance.now() - start, error: String(error), timestamp: new Date().toISOString() };\n");
        html.push_str("  }\n");
        html.push_str("});\n");
    } else {
        html.push_str(script);
        html.push('\n');
    }

    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

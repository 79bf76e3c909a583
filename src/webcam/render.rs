//! HTML fragments for the webcam results area.
//!
//! Markup follows the Bootstrap classes the analyzer's pages use. Text that
//! comes from the server is escaped before insertion.

use crate::emotion::DetectionResult;

pub const LOADING_HTML: &str = concat!(
    r#"<div class="text-center my-4"><div class="spinner-border text-primary" role="status">"#,
    r#"<span class="visually-hidden">Loading...</span></div>"#,
    r#"<p class="mt-2">Analyzing emotions...</p></div>"#,
);

pub const NO_FACES_HTML: &str = r#"<div class="alert alert-warning">No faces detected</div>"#;

/// Escape text for use in element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A score in [0, 1] as a percentage with two decimals.
///
/// Ties round away from zero (`0.125` shows as `0.13`), not to even.
pub fn percent(score: f64) -> String {
    let pct = score * 100.0;
    format!("{:.2}", (pct * 100.0).round() / 100.0)
}

/// Panel for an error the server reported.
pub fn server_error(message: &str) -> String {
    format!(r#"<div class="alert alert-warning">{}</div>"#, escape(message))
}

/// Panel for a failed round trip.
pub fn transport_error(message: &str) -> String {
    format!(
        r#"<div class="alert alert-danger">Error processing image: {}</div>"#,
        escape(message)
    )
}

/// The results card: a "no faces" notice, or the annotated image followed
/// by one card per face.
pub fn results(image_url: &str, results: &[DetectionResult]) -> String {
    let mut html = String::from(concat!(
        r#"<div class="card my-4"><div class="card-header bg-primary text-white">"#,
        r#"<h5 class="mb-0">Emotion Detection Results</h5></div><div class="card-body">"#,
    ));

    if results.is_empty() {
        html.push_str(NO_FACES_HTML);
    } else {
        html.push_str(&format!(
            r#"<div class="text-center mb-4"><img src="{}" alt="Processed image" class="img-fluid rounded" style="max-height: 400px;"></div>"#,
            escape(image_url)
        ));
        html.push_str(r#"<div class="row">"#);
        for (index, result) in results.iter().enumerate() {
            html.push_str(&face_card(index + 1, result));
        }
        html.push_str("</div>");
    }

    html.push_str("</div></div>");
    html
}

/// One face card. `ordinal` is 1-based.
fn face_card(ordinal: usize, result: &DetectionResult) -> String {
    let dominant = result.dominant();
    let mut html = format!(
        r#"
<div class="col-md-6 mb-4">
    <div class="card h-100">
        <div class="card-header">
            <h6 class="mb-0">Face {ordinal}</h6>
        </div>
        <div class="card-body">
            <h5 class="card-title">Dominant Emotion: <span class="badge bg-primary">{}</span></h5>
            <p class="card-text">Confidence: {}%</p>
            <h6>All Emotions:</h6>
            <ul class="list-group">
"#,
        escape(dominant),
        percent(result.confidence()),
    );

    for (emotion, score) in result.emotions.sorted_desc() {
        let active = if emotion == dominant { " active" } else { "" };
        html.push_str(&format!(
            r#"                <li class="list-group-item d-flex justify-content-between align-items-center{active}">
                    {}
                    <span class="badge bg-primary rounded-pill">{}%</span>
                </li>
"#,
            escape(emotion),
            percent(score),
        ));
    }

    html.push_str(
        r#"            </ul>
        </div>
    </div>
</div>
"#,
    );
    html
}

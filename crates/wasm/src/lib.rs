use js_sys::Function;
use qtiview_core::{
    CandidateResponse, Highlighted, ImageRewriteOptions, ReportOptions, ResponseOptions,
    ScoringOptions,
};
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

/// Renders an item for the scoring UI.
///
/// `options` is an optional plain object using the camelCase option names of
/// `ScoringOptions`; missing keys take their defaults.
#[wasm_bindgen(js_name = parseItemForScoring)]
pub fn parse_item_for_scoring(xml: &str, options: JsValue) -> Result<JsValue, JsError> {
    let options: ScoringOptions = from_optional(options)?;
    let item = qtiview_core::parse_item_for_scoring(xml, &options).map_err(to_js_error)?;
    to_js(&item)
}

/// Renders an item for reports.
///
/// `highlighter`, when given, is called as `highlighter(code, language)` and
/// must return `{ language, html }`. A throwing or malformed call keeps the
/// original code.
#[wasm_bindgen(js_name = parseItemForReport)]
pub fn parse_item_for_report(
    xml: &str,
    expected_identifier: &str,
    options: JsValue,
    highlighter: Option<Function>,
) -> Result<JsValue, JsError> {
    let mut options: ReportOptions = from_optional(options)?;
    if let Some(callback) = highlighter {
        options.highlighter = Some(Box::new(move |code: &str, language: Option<&str>| {
            call_highlighter(&callback, code, language)
        }));
    }

    let item = qtiview_core::parse_item_for_report(xml, expected_identifier, &options)
        .map_err(to_js_error)?;
    to_js(&item)
}

/// Fills rendered blanks with `response` (a string or an array of strings).
#[wasm_bindgen(js_name = applyResponsesToPromptHtml)]
pub fn apply_responses_to_prompt_html(
    html: &str,
    response: JsValue,
    options: JsValue,
) -> Result<String, JsError> {
    let response: Option<CandidateResponse> = if response.is_null() || response.is_undefined() {
        None
    } else {
        Some(serde_wasm_bindgen::from_value(response).map_err(to_js_error)?)
    };
    let options: ResponseOptions = from_optional(options)?;

    qtiview_core::apply_responses_to_prompt_html(html, response.as_ref(), &options)
        .map_err(to_js_error)
}

/// Rewrites relative image sources; `resolve_url(resolvedPath, originalSrc)`
/// returns the final URL. A throwing callback leaves that image untouched.
#[wasm_bindgen(js_name = rewriteHtmlImageSources)]
pub fn rewrite_html_image_sources(
    html: &str,
    base_path: &str,
    resolve_url: &Function,
) -> Result<String, JsError> {
    let options = ImageRewriteOptions::new(|resolved, original| {
        resolve_url
            .call2(
                &JsValue::UNDEFINED,
                &JsValue::from_str(resolved),
                &JsValue::from_str(original),
            )
            .ok()
            .and_then(|url| url.as_string())
            .unwrap_or_else(|| original.to_string())
    });

    qtiview_core::rewrite_html_image_sources(html, base_path, &options).map_err(to_js_error)
}

/// Returns the version string reported by the core crate.
#[wasm_bindgen]
pub fn version() -> String {
    qtiview_core::version().to_string()
}

fn call_highlighter(callback: &Function, code: &str, language: Option<&str>) -> Highlighted {
    let language_arg = language.map_or(JsValue::NULL, JsValue::from_str);
    callback
        .call2(&JsValue::UNDEFINED, &JsValue::from_str(code), &language_arg)
        .ok()
        .and_then(|value| serde_wasm_bindgen::from_value::<Highlighted>(value).ok())
        .unwrap_or_else(|| Highlighted {
            language: language.map(str::to_string),
            html: String::new(),
        })
}

fn from_optional<T>(value: JsValue) -> Result<T, JsError>
where
    T: Default + serde::de::DeserializeOwned,
{
    if value.is_null() || value.is_undefined() {
        Ok(T::default())
    } else {
        serde_wasm_bindgen::from_value(value).map_err(to_js_error)
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

fn to_js_error<E: ToString>(err: E) -> JsError {
    JsError::new(&err.to_string())
}

use super::{documentable_mut, PreProcess, Worker};
use crate::assemble::ParsedFile;
use crate::context::Context;
use crate::diagnostics::Diagnostics;
use serde_json::{json, Value};

/// Sample-request normalization.
///
/// Reads: `local.sampleRequest`, `local.url`, the package sample url.
/// Writes: `local.sampleRequest` with `off` entries removed and relative
/// urls prefixed; removed when empty; synthesized from `local.url` when the
/// block has none and a sample url is configured.
pub struct SampleRequestWorker;

fn is_absolute(url: &str) -> bool {
    url.get(..4).is_some_and(|scheme| scheme.eq_ignore_ascii_case("http"))
}

fn resolve(base: Option<&str>, url: &str) -> String {
    match base {
        Some(base) if !is_absolute(url) => format!("{}{}", base, url),
        _ => url.to_string(),
    }
}

impl Worker for SampleRequestWorker {
    fn name(&self) -> &'static str {
        "sample_request"
    }

    fn post_process(
        &self,
        files: &mut [ParsedFile],
        _pre: &PreProcess,
        ctx: &Context,
        _diagnostics: &mut Diagnostics,
    ) {
        let base = ctx.sample_url();
        for block in documentable_mut(files) {
            match block.local.remove("sampleRequest") {
                Some(Value::Array(entries)) => {
                    let kept: Vec<Value> = entries
                        .into_iter()
                        .filter_map(|entry| {
                            let url = entry.get("url").and_then(Value::as_str)?;
                            (url != "off").then(|| json!({ "url": resolve(base, url) }))
                        })
                        .collect();
                    if !kept.is_empty() {
                        block.local.insert("sampleRequest".into(), Value::Array(kept));
                    }
                }
                Some(other) => {
                    block.local.insert("sampleRequest".into(), other);
                }
                None => {
                    let url = block.str_field("url").unwrap_or("");
                    if base.is_some() && !url.is_empty() {
                        let entry = json!([{ "url": resolve(base, url) }]);
                        block.local.insert("sampleRequest".into(), entry);
                    }
                }
            }
        }
    }
}

//! Fuzz target for the template renderer.
//!
//! Renders arbitrary templates against a fixed record, both as a plain
//! template and as a per-record extract regex. Neither may panic.

#![no_main]

use jsonpipe::transform::render_template;
use jsonpipe::{OpArgs, Operation, TransformEngine};
use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(template) = std::str::from_utf8(data) {
        let record = json!({"id": "A", "name": "Office {x}", "n": 3, "nested": {"k": [1, 2]}})
            .as_object()
            .cloned()
            .unwrap_or_default();

        let _ = render_template(template, &record);

        let args = OpArgs::builder(Operation::Extract)
            .field("name")
            .regex_per_item(template)
            .target("out")
            .build();
        if let Ok(out) = TransformEngine::new().transform(vec![record], &args) {
            let _ = out.len();
        }
    }
});

//! zview-demo: runs the insertion scenarios and prints the rendered markup.

use serde_json::json;
use std::env;
use std::path::Path;
use std::process::ExitCode;

use zview::engine::{Condition, Result, Template, TemplateNode, ViewEngine};
use zview::services::{settings, EngineConfig};

mod logging;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let settings_path = args.iter().find(|a| !a.starts_with('-'));

    let logging_guard = logging::init(verbose);

    let config = match settings_path {
        Some(path) => match settings::load_settings(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("zview-demo: cannot load settings {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => settings::load_default_settings(),
    };

    let code = match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "demo failed");
            eprintln!("zview-demo: {}", e);
            ExitCode::FAILURE
        }
    };

    if let (true, Some(guard)) = (verbose, logging_guard.as_ref()) {
        eprintln!("logs: {}", guard.log_dir().display());
    }
    code
}

fn run(config: EngineConfig) -> Result<()> {
    let mut engine = ViewEngine::with_config(config);

    // Front, front again, end, middle.
    let root = engine.tree().root();
    let host = engine.tree_mut().create_element("div");
    engine.tree_mut().append_child(root, host)?;
    let container = engine.create_container(host)?;
    let simple = Template::new(
        "simple",
        vec![TemplateNode::element(
            "span",
            vec![TemplateNode::interpolate("created", "n")],
        )],
    );
    for (n, index) in [None, Some(0), None, Some(2)].into_iter().enumerate() {
        let view = engine.create_embedded_view(container, &simple, json!({ "n": n }), index)?;
        engine.detect_changes(view)?;
    }
    println!("{}", engine.tree().to_markup(host));
    println!("text: {}", engine.tree().text_content(host));

    // Insert before a view whose first root is an empty conditional.
    let section = engine.tree_mut().create_element("section");
    engine.tree_mut().append_child(root, section)?;
    let container = engine.create_container(section)?;
    let before = Template::new(
        "before",
        vec![
            TemplateNode::when(Condition::Field("show".into()), Template::empty("nothing")),
            TemplateNode::text("|before"),
        ],
    );
    let insert = Template::new("insert", vec![TemplateNode::text("insert")]);
    let before_view = engine.instantiate(&before, json!({ "show": true }))?;
    engine.detect_changes(before_view)?;
    engine.insert(container, before_view, Some(0))?;
    engine.create_embedded_view(container, &insert, json!({}), Some(0))?;
    println!("{}", engine.tree().to_markup(section));
    println!("text: {}", engine.tree().text_content(section));

    tracing::info!(nodes = engine.tree().len(), "demo finished");
    Ok(())
}

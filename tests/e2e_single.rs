mod support_single;

use std::fs;

use tempfile::tempdir;

use support_single::{run_burden, spawn_http_server_or_skip};

fn describe(output: &std::process::Output) -> String {
    format!(
        "status: {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn e2e_url_run_prints_summary() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(200)? else {
        return Ok(());
    };

    let output = run_burden(["-u", url.as_str(), "-U", "4", "-n", "40", "--detailed"])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    for needle in ["Throughput:", "Response time:", "Latency:", "Errors: 0", "Peak load:"] {
        if !stdout.contains(needle) {
            return Err(format!("Missing '{}'\n{}", needle, describe(&output)));
        }
    }
    Ok(())
}

#[test]
fn e2e_collection_run_exports_json() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(200)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let collection = dir.path().join("smoke.toml");
    fs::write(
        &collection,
        format!(
            "base_url = \"{}\"\n\n[[requests]]\npath = \"/a\"\n\n[[requests]]\nmethod = \"POST\"\npath = \"/b\"\nbody = \"x\"\n",
            url
        ),
    )
    .map_err(|err| format!("write collection failed: {}", err))?;
    let export = dir.path().join("metrics.json");

    let collection_arg = collection.to_string_lossy().into_owned();
    let export_arg = export.to_string_lossy().into_owned();
    let output = run_burden([
        "-C",
        collection_arg.as_str(),
        "-U",
        "2",
        "-n",
        "10",
        "--export-json",
        export_arg.as_str(),
    ])?;
    if !output.status.success() {
        return Err(describe(&output));
    }

    let content = fs::read_to_string(&export).map_err(|err| format!("read export failed: {}", err))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).map_err(|err| format!("parse export failed: {}", err))?;
    if json.get("issued").and_then(serde_json::Value::as_u64) != Some(10) {
        return Err(format!("Unexpected export: {}", content));
    }
    if json.get("errors").and_then(serde_json::Value::as_u64) != Some(0) {
        return Err(format!("Unexpected errors: {}", content));
    }
    Ok(())
}

#[test]
fn e2e_error_budget_stops_early() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(503)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let export = dir.path().join("metrics.json");
    let export_arg = export.to_string_lossy().into_owned();

    let output = run_burden([
        "-u",
        url.as_str(),
        "-U",
        "5",
        "-n",
        "100",
        "--max-errors",
        "10",
        "--export-json",
        export_arg.as_str(),
    ])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("Stopped early: error threshold reached") {
        return Err(describe(&output));
    }

    let content = fs::read_to_string(&export).map_err(|err| format!("read export failed: {}", err))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).map_err(|err| format!("parse export failed: {}", err))?;
    let errors = json
        .get("errors")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| format!("Missing errors: {}", content))?;
    let issued = json
        .get("issued")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| format!("Missing issued: {}", content))?;
    if !(10..=14).contains(&errors) || issued >= 100 {
        return Err(format!("Unexpected totals: {}", content));
    }
    Ok(())
}

#[test]
fn e2e_missing_target_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = dir.path().join("empty.toml");
    fs::write(&config, "users = 2\n").map_err(|err| format!("write config failed: {}", err))?;
    let config_arg = config.to_string_lossy().into_owned();

    let output = run_burden(["--config", config_arg.as_str()])?;
    if output.status.success() {
        return Err(format!("Expected failure\n{}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_zero_users_is_rejected() -> Result<(), String> {
    let output = run_burden(["-u", "http://127.0.0.1:9", "--users", "0"])?;
    if output.status.success() {
        return Err(format!("Expected failure\n{}", describe(&output)));
    }
    Ok(())
}

// Integration tests for the mcp-mysql binary's startup paths that need no database

use std::process::Command;

fn mcp_mysql() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_mcp-mysql"));
    // Keep a developer's .env or shell from leaking connection settings in
    for var in ["MYSQL_HOST", "MYSQL_USER", "MYSQL_PASSWORD", "MYSQL_DB", "MYSQL_PORT"] {
        command.env_remove(var);
    }
    command
}

#[test]
fn test_list_tools_prints_every_tool() {
    let output = mcp_mysql()
        .arg("--list-tools")
        .output()
        .expect("Failed to run mcp-mysql --list-tools");

    assert!(output.status.success(), "--list-tools should exit 0, got: {:?}", output.status);

    let stdout = String::from_utf8_lossy(&output.stdout);
    for tool in ["run_query", "describe_table", "describe_indexes_and_foreign_keys"] {
        assert!(stdout.contains(tool), "stdout should list {tool}. Got: {stdout}");
    }
}

#[test]
fn test_invalid_tool_name_fails_before_connecting() {
    // Port 1 is never a MySQL server; reaching the connect step would fail differently
    let output = mcp_mysql()
        .args([
            "--host", "127.0.0.1", "--port", "1", "--user", "u", "--password", "p", "--database",
            "d", "--tools", "run_query,drop_database",
        ])
        .output()
        .expect("Failed to run mcp-mysql");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid tool names specified") && stderr.contains("drop_database"),
        "stderr should name the invalid tool. Got: {stderr}"
    );
    assert!(!stderr.contains("Failed to connect"), "Got: {stderr}");
}

#[test]
fn test_unreachable_database_fails_startup() {
    let output = mcp_mysql()
        .args([
            "--host", "127.0.0.1", "--port", "1", "--user", "u", "--password", "p", "--database",
            "d", "--acquire-timeout", "1",
        ])
        .output()
        .expect("Failed to run mcp-mysql");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to connect to MySQL"), "Got: {stderr}");
}

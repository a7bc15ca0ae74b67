//! Generates the minimal host-config stanza a host would merge into its
//! own config to register this binary as an MCP server. Grounded on the
//! teacher's `McpServerConfig::new` shape, but generic: it targets the
//! `{mcpServers: {name: {command, args}}}` convention shared by common
//! hosts rather than any one host's full schema.

use serde_json::{json, Value};

pub fn install_stanza(binary_path: &str, server_name: &str) -> Value {
    json!({
        "mcpServers": {
            server_name: {
                "command": binary_path,
                "args": ["serve"]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stanza_nests_under_server_name() {
        let stanza = install_stanza("/usr/local/bin/llmgateway", "llmgateway");
        assert_eq!(stanza["mcpServers"]["llmgateway"]["command"], "/usr/local/bin/llmgateway");
    }
}
